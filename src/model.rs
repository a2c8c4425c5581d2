use serde::{Deserialize, Serialize};

/// Student profile held in the session scope under the `user` key
///
/// Field names are serialized in camelCase so the stored JSON keeps the
/// `{name, rollNumber, email, branch, year, phone}` layout.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Full name of the student
    pub name: String,

    /// College roll number, e.g. `21CS101`
    pub roll_number: String,

    /// College email address (`...@raghuenggcollege.in`)
    pub email: String,

    /// Branch of study
    pub branch: String,

    /// Year of study
    pub year: String,

    /// 10-digit phone number
    pub phone: String,
}

impl User {
    /// First word of the student's name, used for greetings
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("")
    }
}

/// A registered account
///
/// In demo mode nothing is stored and `password_hash` stays empty.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Profile shared with the session `User`
    #[serde(flatten)]
    pub user: User,

    /// Argon2 hash of the account password
    #[serde(default)]
    pub password_hash: String,
}

/// Registration form data
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub roll_number: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

impl RegisterForm {
    /// Profile described by this form
    pub fn to_user(&self) -> User {
        User {
            name: self.full_name.trim().to_string(),
            roll_number: self.roll_number.clone(),
            email: self.email.clone(),
            branch: self.branch.clone(),
            year: self.year.clone(),
            phone: self.phone_number.clone(),
        }
    }
}

/// Login form data
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    /// College email or roll number
    #[serde(default)]
    pub email_or_roll: String,

    #[serde(default)]
    pub password: String,
}

/// Branches offered on the registration form
pub const BRANCHES: [&str; 6] = [
    "Computer Science Engineering",
    "Electronics & Communication Engineering",
    "Mechanical Engineering",
    "Civil Engineering",
    "Electrical Engineering",
    "Information Technology",
];

/// Years offered on the registration form
pub const YEARS: [&str; 4] = ["1st Year", "2nd Year", "3rd Year", "4th Year"];

/// Development stage of a submitted startup
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StartupStage {
    Idea,
    Validated,
    Mvp,
    Launched,
}

impl StartupStage {
    pub const ALL: [StartupStage; 4] = [
        StartupStage::Idea,
        StartupStage::Validated,
        StartupStage::Mvp,
        StartupStage::Launched,
    ];

    pub fn from_strng(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "idea" => Some(StartupStage::Idea),
            "validated" => Some(StartupStage::Validated),
            "mvp" => Some(StartupStage::Mvp),
            "launched" => Some(StartupStage::Launched),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StartupStage::Idea => "idea",
            StartupStage::Validated => "validated",
            StartupStage::Mvp => "mvp",
            StartupStage::Launched => "launched",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StartupStage::Idea => "Idea",
            StartupStage::Validated => "Validated",
            StartupStage::Mvp => "MVP",
            StartupStage::Launched => "Launched",
        }
    }
}

/// Kind of a supporting link
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    #[default]
    Github,
    Drive,
    Figma,
    Other,
}

impl LinkType {
    /// Unknown values fall back to `Other`
    pub fn from_strng(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "github" => LinkType::Github,
            "drive" => LinkType::Drive,
            "figma" => LinkType::Figma,
            _ => LinkType::Other,
        }
    }
}

/// A supporting link attached to a submission. The url is never checked.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SupportingLink {
    #[serde(rename = "type")]
    pub link_type: LinkType,
    pub url: String,
}

/// Reference to an uploaded pitch deck; the file contents are not kept
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PitchDeckRef {
    pub file_name: String,
    pub content_type: Option<String>,
    pub size: u64,
}

/// Startup idea form as entered on the dashboard
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionForm {
    #[serde(default)]
    pub idea_title: String,
    #[serde(default)]
    pub problem_statement: String,
    #[serde(default)]
    pub proposed_solution: String,
    #[serde(default)]
    pub one_liner_pitch: String,
    #[serde(default)]
    pub detailed_explanation: String,
    #[serde(default)]
    pub startup_stage: Option<StartupStage>,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch_deck: Option<PitchDeckRef>,
    #[serde(default)]
    pub supporting_links: Vec<SupportingLink>,
}

/// Status recorded with every stored submission
pub const SUBMISSION_STATUS: &str = "submitted";

/// A completed submission, stored under the `submission` key
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(flatten)]
    pub form: SubmissionForm,

    /// RFC 3339 timestamp of the successful submit
    pub submitted_at: String,

    pub status: String,
}
