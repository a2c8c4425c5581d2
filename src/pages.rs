use handlebars::{Handlebars, RenderError, TemplateError};
use serde::Serialize;
use serde_json::json;

use crate::confirmation::ConfirmationView;
use crate::dashboard::{FormProgress, MIN_EXPLANATION_WORDS, TrackedFields};
use crate::model::{BRANCHES, LinkType, RegisterForm, StartupStage, SubmissionForm, User, YEARS};
use crate::validation::{FieldErrors, char_len};

/// Notification shown at the top of a page
#[derive(Debug, Serialize, Clone)]
pub struct Banner {
    /// `success` or `error`, used as a CSS class
    pub kind: &'static str,
    pub title: String,
    pub text: String,
}

impl Banner {
    pub fn success(title: &str, text: &str) -> Self {
        Banner {
            kind: "success",
            title: title.to_string(),
            text: text.to_string(),
        }
    }

    pub fn error(title: &str, text: &str) -> Self {
        Banner {
            kind: "error",
            title: title.to_string(),
            text: text.to_string(),
        }
    }
}

#[derive(Serialize)]
struct Choice {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

#[derive(Serialize)]
struct LinkRow {
    url: String,
    options: Vec<Choice>,
}

const LINK_OPTIONS: [(LinkType, &str, &str); 4] = [
    (LinkType::Github, "github", "GitHub"),
    (LinkType::Drive, "drive", "Google Drive"),
    (LinkType::Figma, "figma", "Figma"),
    (LinkType::Other, "other", "Other"),
];

/// Template registry for every portal page
///
/// Templates are compiled into the binary and registered once at start-up.
pub struct Pages {
    registry: Handlebars<'static>,
}

impl Pages {
    pub fn new() -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);

        registry.register_partial("header", include_str!("./static/header.hbs"))?;
        registry.register_partial("footer", include_str!("./static/footer.hbs"))?;
        registry.register_template_string("register", include_str!("./static/register.hbs"))?;
        registry.register_template_string("login", include_str!("./static/login.hbs"))?;
        registry.register_template_string("dashboard", include_str!("./static/dashboard.hbs"))?;
        registry.register_template_string("submitted", include_str!("./static/submitted.hbs"))?;
        registry.register_template_string(
            "confirmation",
            include_str!("./static/confirmation.hbs"),
        )?;
        registry.register_template_string("not_found", include_str!("./static/not_found.hbs"))?;

        Ok(Pages { registry })
    }

    pub fn register(
        &self,
        values: &RegisterForm,
        errors: &FieldErrors,
        banner: Option<&Banner>,
    ) -> Result<String, RenderError> {
        // never echo passwords back into the page
        let values = RegisterForm {
            password: String::new(),
            confirm_password: String::new(),
            ..values.clone()
        };
        let branches: Vec<Choice> = BRANCHES
            .iter()
            .map(|&b| Choice {
                value: b,
                label: b,
                selected: values.branch == b,
            })
            .collect();
        let years: Vec<Choice> = YEARS
            .iter()
            .map(|&y| Choice {
                value: y,
                label: y,
                selected: values.year == y,
            })
            .collect();

        self.registry.render(
            "register",
            &json!({
                "title": "Register",
                "banner": banner,
                "values": values,
                "errors": errors,
                "branches": branches,
                "years": years,
            }),
        )
    }

    pub fn login(
        &self,
        email_or_roll: &str,
        errors: &FieldErrors,
        banner: Option<&Banner>,
    ) -> Result<String, RenderError> {
        self.registry.render(
            "login",
            &json!({
                "title": "Login",
                "banner": banner,
                "values": { "emailOrRoll": email_or_roll },
                "errors": errors,
            }),
        )
    }

    pub fn dashboard(
        &self,
        user: &User,
        values: &SubmissionForm,
        errors: &FieldErrors,
        banner: Option<&Banner>,
    ) -> Result<String, RenderError> {
        let state: FormProgress = TrackedFields::from(values).evaluate(false);
        let stages: Vec<Choice> = StartupStage::ALL
            .iter()
            .map(|stage| Choice {
                value: stage.as_str(),
                label: stage.label(),
                selected: values.startup_stage == Some(*stage),
            })
            .collect();
        let links: Vec<LinkRow> = values
            .supporting_links
            .iter()
            .map(|link| LinkRow {
                url: link.url.clone(),
                options: LINK_OPTIONS
                    .iter()
                    .map(|&(kind, value, label)| Choice {
                        value,
                        label,
                        selected: link.link_type == kind,
                    })
                    .collect(),
            })
            .collect();
        let phone = if values.phone_number.is_empty() {
            user.phone.as_str()
        } else {
            values.phone_number.as_str()
        };

        self.registry.render(
            "dashboard",
            &json!({
                "title": "Startup Submission Portal",
                "banner": banner,
                "user": user,
                "values": values,
                "phone": phone,
                "errors": errors,
                "state": state,
                "minWords": MIN_EXPLANATION_WORDS,
                "pitchChars": char_len(&values.one_liner_pitch),
                "stages": stages,
                "links": links,
            }),
        )
    }

    pub fn submitted(&self, user: &User) -> Result<String, RenderError> {
        self.registry.render(
            "submitted",
            &json!({
                "title": "Startup Portal",
                "user": user,
            }),
        )
    }

    pub fn confirmation(
        &self,
        view: &ConfirmationView,
        banner: Option<&Banner>,
    ) -> Result<String, RenderError> {
        self.registry.render(
            "confirmation",
            &json!({
                "title": "Submission Confirmed",
                "banner": banner,
                "view": view,
            }),
        )
    }

    pub fn not_found(&self, path: &str) -> Result<String, RenderError> {
        self.registry.render(
            "not_found",
            &json!({
                "title": "Page Not Found",
                "path": path,
            }),
        )
    }
}
