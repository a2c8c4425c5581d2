use chrono::{DateTime, ParseError};
use serde::Serialize;

use crate::model::{Submission, User};

/// Review status shown for every submission. Nothing ever changes it.
pub const REVIEW_STATUS: &str = "Under Review";

/// A static outbound link on the confirmation page
#[derive(Debug, Serialize, Clone, Copy)]
pub struct ExternalLink {
    pub label: &'static str,
    pub href: &'static str,
}

pub const EXTERNAL_LINKS: [ExternalLink; 4] = [
    ExternalLink {
        label: "Join WhatsApp Group",
        href: "https://wa.me/919876543210?text=Hi!%20I%20just%20submitted%20my%20startup%20idea%20through%20the%20E-Cell%20portal.",
    },
    ExternalLink {
        label: "Follow on Instagram",
        href: "https://instagram.com/ecell_raghu",
    },
    ExternalLink {
        label: "Connect on LinkedIn",
        href: "https://linkedin.com/company/ecell-raghu",
    },
    ExternalLink {
        label: "Email Support",
        href: "mailto:ecell@raghuenggcollege.in",
    },
];

pub const NEXT_STEPS: [&str; 4] = [
    "Your submission will be reviewed by our expert panel",
    "You'll receive an email update within 7-10 business days",
    "Selected ideas will be invited for a pitch presentation",
    "Winners will receive mentorship and incubation support",
];

/// Public identifier of a submission
///
/// Roll number followed by the last six digits of the submit time in epoch
/// milliseconds, e.g. `21CS101-123456`.
///
/// # Arguments
/// * `roll_number` - Roll number of the submitting student
/// * `submitted_at` - RFC 3339 timestamp stored with the submission
///
/// # Errors
/// * `ParseError` if `submitted_at` is not RFC 3339
pub fn submission_id(roll_number: &str, submitted_at: &str) -> Result<String, ParseError> {
    let millis = DateTime::parse_from_rfc3339(submitted_at)?
        .timestamp_millis()
        .to_string();
    let tail = &millis[millis.len().saturating_sub(6)..];
    Ok(format!("{}-{}", roll_number, tail))
}

/// Everything the confirmation page renders
#[derive(Debug, Serialize)]
pub struct ConfirmationView {
    pub first_name: String,
    pub user: User,
    pub idea_title: String,
    pub one_liner_pitch: String,
    pub submission_id: String,
    pub status: &'static str,
    pub submitted_on: String,
    pub next_steps: &'static [&'static str],
    pub links: &'static [ExternalLink],
}

impl ConfirmationView {
    /// Build the view for `user` and their stored submission
    ///
    /// # Errors
    /// * `ParseError` if the stored timestamp cannot be read
    pub fn new(user: &User, submission: &Submission) -> Result<Self, ParseError> {
        let submitted = DateTime::parse_from_rfc3339(&submission.submitted_at)?;
        Ok(ConfirmationView {
            first_name: user.first_name().to_string(),
            user: user.clone(),
            idea_title: submission.form.idea_title.clone(),
            one_liner_pitch: submission.form.one_liner_pitch.clone(),
            submission_id: submission_id(&user.roll_number, &submission.submitted_at)?,
            status: REVIEW_STATUS,
            submitted_on: submitted.format("%d %b %Y").to_string(),
            next_steps: &NEXT_STEPS,
            links: &EXTERNAL_LINKS,
        })
    }
}
