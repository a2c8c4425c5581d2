//! Submission form state: word count, progress and the submit gate.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{SUBMISSION_STATUS, StartupStage, Submission, SubmissionForm};
use crate::validation::{FieldErrors, char_len, is_blank, is_valid_phone, word_count};

pub const MIN_EXPLANATION_WORDS: usize = 200;
pub const MAX_TITLE_CHARS: usize = 80;
pub const MAX_PITCH_CHARS: usize = 140;
const TRACKED_FIELDS: usize = 6;

/// The six fields that drive the progress bar
///
/// Sent by the dashboard script on every input change.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct TrackedFields {
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
    pub startup_stage: Option<String>,
}

impl From<&SubmissionForm> for TrackedFields {
    fn from(form: &SubmissionForm) -> Self {
        TrackedFields {
            idea_title: form.idea_title.clone(),
            problem_statement: form.problem_statement.clone(),
            proposed_solution: form.proposed_solution.clone(),
            one_liner_pitch: form.one_liner_pitch.clone(),
            detailed_explanation: form.detailed_explanation.clone(),
            startup_stage: form.startup_stage.map(|stage| stage.as_str().to_string()),
        }
    }
}

/// Derived state of the form
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FormProgress {
    pub word_count: usize,
    pub words_needed: usize,
    pub progress: u8,
    pub can_submit: bool,
}

impl TrackedFields {
    fn stage(&self) -> Option<StartupStage> {
        self.startup_stage.as_deref().and_then(StartupStage::from_strng)
    }

    /// How many of the six tracked fields hold something
    pub fn filled(&self) -> usize {
        let texts = [
            &self.idea_title,
            &self.problem_statement,
            &self.proposed_solution,
            &self.one_liner_pitch,
            &self.detailed_explanation,
        ];
        let filled_texts = texts.iter().filter(|text| !is_blank(text)).count();
        filled_texts + usize::from(self.stage().is_some())
    }

    /// Percentage of tracked fields filled, rounded to the nearest integer
    pub fn progress(&self) -> u8 {
        let filled = self.filled();
        // round-half-up in integer arithmetic
        ((filled * 200 + TRACKED_FIELDS) / (TRACKED_FIELDS * 2)) as u8
    }

    pub fn word_count(&self) -> usize {
        word_count(&self.detailed_explanation)
    }

    /// Compute everything the dashboard shows next to the form
    ///
    /// # Arguments
    /// * `is_submitting` - Whether a submit for this session is in flight
    ///
    /// # Returns
    /// * Word count, words still needed, progress percentage and the submit gate
    pub fn evaluate(&self, is_submitting: bool) -> FormProgress {
        let words = self.word_count();
        let progress = self.progress();
        FormProgress {
            word_count: words,
            words_needed: MIN_EXPLANATION_WORDS.saturating_sub(words),
            progress,
            can_submit: submit_enabled(is_submitting, words, self.stage(), progress),
        }
    }
}

/// Whether the submit control is enabled
///
/// # Arguments
/// * `is_submitting` - A submit is already in flight
/// * `words` - Word count of the detailed explanation
/// * `stage` - Selected startup stage, if any
/// * `progress` - Percentage of tracked fields filled
pub fn submit_enabled(
    is_submitting: bool,
    words: usize,
    stage: Option<StartupStage>,
    progress: u8,
) -> bool {
    !is_submitting && words >= MIN_EXPLANATION_WORDS && stage.is_some() && progress >= 100
}

/// Field-level checks, independent of the progress gate
///
/// # Returns
/// * `Ok(())` if every field passes
/// * `Err(FieldErrors)` with one message per failing field
pub fn validate_submission(form: &SubmissionForm) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if is_blank(&form.idea_title) {
        errors.add("ideaTitle", "Idea title is required");
    } else if char_len(&form.idea_title) > MAX_TITLE_CHARS {
        errors.add("ideaTitle", "Title must be 80 characters or less");
    }

    if is_blank(&form.problem_statement) {
        errors.add("problemStatement", "Problem statement is required");
    }

    if is_blank(&form.proposed_solution) {
        errors.add("proposedSolution", "Proposed solution is required");
    }

    if is_blank(&form.one_liner_pitch) {
        errors.add("oneLinerPitch", "One-liner pitch is required");
    } else if char_len(&form.one_liner_pitch) > MAX_PITCH_CHARS {
        errors.add("oneLinerPitch", "Pitch must be 140 characters or less");
    }

    if is_blank(&form.detailed_explanation) {
        errors.add("detailedExplanation", "Detailed explanation is required");
    } else if word_count(&form.detailed_explanation) < MIN_EXPLANATION_WORDS {
        errors.add(
            "detailedExplanation",
            "Please provide at least 200 words in the detailed explanation",
        );
    }

    let phone = form.phone_number.as_str();
    if phone.is_empty() {
        errors.add("phoneNumber", "Phone number is required");
    } else if !is_valid_phone(phone) {
        errors.add("phoneNumber", "Please enter a valid 10-digit phone number");
    }

    if form.startup_stage.is_none() {
        errors.add("startupStage", "Please select a startup stage");
    }

    errors.into_result()
}

/// Outcome of checking a submit attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitCheck {
    Ready,
    /// Field errors plus a banner explaining why submit was refused
    Rejected { errors: FieldErrors, banner: String },
}

/// Run the gate and the field checks for a submit attempt
///
/// # Returns
/// * `SubmitCheck::Ready` when the form may be stored
/// * `SubmitCheck::Rejected` with field errors and the banner text otherwise
pub fn check_submission(form: &SubmissionForm) -> SubmitCheck {
    let state = TrackedFields::from(form).evaluate(false);
    let errors = match validate_submission(form) {
        Ok(()) => FieldErrors::new(),
        Err(errors) => errors,
    };

    if state.can_submit && errors.is_empty() {
        return SubmitCheck::Ready;
    }

    let banner = if state.word_count < MIN_EXPLANATION_WORDS {
        "Detailed explanation too short: please provide at least 200 words.".to_string()
    } else if form.startup_stage.is_none() {
        "Startup stage required: please select your startup stage.".to_string()
    } else {
        "Complete all required fields to submit your idea".to_string()
    };

    SubmitCheck::Rejected { errors, banner }
}

/// Stamp a checked form as a stored submission
///
/// # Arguments
/// * `form` - Form that passed [`check_submission`]
/// * `now` - Submit time, written as RFC 3339 UTC with milliseconds
pub fn finalize(form: SubmissionForm, now: DateTime<Utc>) -> Submission {
    Submission {
        form,
        submitted_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        status: SUBMISSION_STATUS.to_string(),
    }
}
