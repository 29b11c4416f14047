//! Field checks run before login and registration.
//!
//! The rules live on the payload types as `validator` derives; this module
//! holds the custom rules and flattens `ValidationErrors` into the ordered
//! message list a form shows. The server stays authoritative and may still
//! reject the request with a 400.

use std::borrow::Cow;

use validator::{Validate, ValidationError, ValidationErrors};

use crate::types::{Credentials, RegisterUser};

const MIN_PHONE_DIGITS: usize = 7;

const REQUIRED: &str = "required";

const CREDENTIAL_FIELDS: [&str; 2] = ["username", "password"];

const REGISTER_FIELDS: [&str; 6] = [
    "username",
    "password",
    "email",
    "first_name",
    "last_name",
    "phone",
];

impl Credentials {
    pub fn check_fields(&self) -> Result<(), Vec<String>> {
        self.validate()
            .map_err(|errors| messages(&errors, &CREDENTIAL_FIELDS))
    }
}

impl RegisterUser {
    /// Collect every problem at once so a form can show them together, one
    /// message per field in form order.
    pub fn check_fields(&self) -> Result<(), Vec<String>> {
        self.validate()
            .map_err(|errors| messages(&errors, &REGISTER_FIELDS))
    }
}

/// Fails when the value is empty or only whitespace.
pub(crate) fn required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(REQUIRED));
    }
    Ok(())
}

/// Phone is optional; when given it may hold digits, spaces, `+`, `-` and
/// parentheses, with at least seven digits.
pub(crate) fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Ok(());
    }
    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'));
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if allowed && digits >= MIN_PHONE_DIGITS {
        return Ok(());
    }
    let mut error = ValidationError::new("phone");
    error.message = Some(Cow::from("Valid phone number is required"));
    Err(error)
}

/// One message per failing field, in `order`. A missing value wins over any
/// other rule on the same field.
fn messages(errors: &ValidationErrors, order: &[&str]) -> Vec<String> {
    let by_field = errors.field_errors();
    order
        .iter()
        .filter_map(|field| by_field.get(*field))
        .filter_map(|field_errors| {
            field_errors
                .iter()
                .find(|e| e.code == REQUIRED)
                .or_else(|| field_errors.first())
        })
        .map(|e| match &e.message {
            Some(message) => message.to_string(),
            None => e.code.to_string(),
        })
        .collect()
}
