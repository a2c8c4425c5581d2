use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::model::{BRANCHES, RegisterForm, YEARS};

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@raghuenggcollege\.in$").unwrap();
    static ref ROLL_REGEX: Regex = Regex::new(r"^[0-9]{2}[A-Z]{2}[0-9]{3}$").unwrap();
    static ref PHONE_REGEX: Regex = Regex::new(r"^[0-9]{10}$").unwrap();
}

pub const MIN_PASSWORD_LEN: usize = 6;

/// Validation messages keyed by form field name
///
/// Fields are kept in a sorted map so rendering order is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error; the first message for a field wins
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `Ok(())` when nothing was recorded
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

pub fn is_valid_college_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

pub fn is_valid_roll_number(roll: &str) -> bool {
    ROLL_REGEX.is_match(roll)
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_REGEX.is_match(phone)
}

/// Number of whitespace-delimited words, 0 for blank text
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Length in characters rather than bytes
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Check every registration field
///
/// Email, roll number and phone are matched exactly as entered; surrounding
/// whitespace is a format error.
///
/// Password confirmation equality is not checked here; a mismatch is a
/// separate business-rule failure reported after the fields pass.
pub fn validate_registration(form: &RegisterForm) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if is_blank(&form.full_name) {
        errors.add("fullName", "Full name is required");
    }

    let email = form.email.as_str();
    if email.is_empty() {
        errors.add("email", "Email is required");
    } else if !is_valid_college_email(email) {
        errors.add("email", "Email must end with @raghuenggcollege.in");
    }

    let roll = form.roll_number.as_str();
    if roll.is_empty() {
        errors.add("rollNumber", "Roll number is required");
    } else if !is_valid_roll_number(roll) {
        errors.add(
            "rollNumber",
            "Format: 21CS101 (2 digits + 2 letters + 3 digits)",
        );
    }

    if !BRANCHES.contains(&form.branch.as_str()) {
        errors.add("branch", "Branch is required");
    }

    if !YEARS.contains(&form.year.as_str()) {
        errors.add("year", "Year is required");
    }

    let phone = form.phone_number.as_str();
    if phone.is_empty() {
        errors.add("phoneNumber", "Phone number is required");
    } else if !is_valid_phone(phone) {
        errors.add("phoneNumber", "Please enter a valid 10-digit phone number");
    }

    if form.password.is_empty() {
        errors.add("password", "Password is required");
    } else if char_len(&form.password) < MIN_PASSWORD_LEN {
        errors.add("password", "Password must be at least 6 characters");
    }

    if form.confirm_password.is_empty() {
        errors.add("confirmPassword", "Please confirm your password");
    }

    errors.into_result()
}

pub fn passwords_match(form: &RegisterForm) -> bool {
    form.password == form.confirm_password
}
