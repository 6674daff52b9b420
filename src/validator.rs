// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact form submission validator.
//!
//! Turns an untyped JSON body into a [`Submission`], failing on the first
//! violated constraint:
//! - `name` present, at least 2 characters
//! - `email` present, a bare `local@domain.tld` address
//! - `subject` optional, at most 150 characters
//! - `message` present, at least 5 characters
//! - `_gotcha` (honeypot) optional, any content

use email_address::{EmailAddress, Options};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

pub const NAME_MIN_CHARS: usize = 2;
pub const SUBJECT_MAX_CHARS: usize = 150;
pub const MESSAGE_MIN_CHARS: usize = 5;

/// Wire name of the honeypot field. Never shown to legitimate clients.
pub const HONEYPOT_FIELD: &str = "_gotcha";

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{0} must be a string")]
    NotAString(&'static str),

    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("Valid email required")]
    InvalidEmail,
}

/// A validated contact form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub honeypot: Option<String>,
}

/// Contact form validator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContactValidator;

impl ContactValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate an untyped request body.
    pub fn validate(&self, body: &Value) -> Result<Submission, ValidationError> {
        let fields = body.as_object().ok_or_else(|| {
            debug!("Body is not a JSON object");
            ValidationError::NotAnObject
        })?;

        let name = required_string(fields, "name")?;
        min_chars("name", name, NAME_MIN_CHARS)?;

        let email = required_string(fields, "email")?;
        if !is_plain_email(email) {
            debug!("Email address rejected");
            return Err(ValidationError::InvalidEmail);
        }

        let subject = optional_string(fields, "subject")?;
        if let Some(subject) = subject {
            if subject.chars().count() > SUBJECT_MAX_CHARS {
                debug!(field = "subject", "Field too long");
                return Err(ValidationError::TooLong {
                    field: "subject",
                    max: SUBJECT_MAX_CHARS,
                });
            }
        }

        let message = required_string(fields, "message")?;
        min_chars("message", message, MESSAGE_MIN_CHARS)?;

        Ok(Submission {
            name: name.to_string(),
            email: email.to_string(),
            subject: subject.map(str::to_string),
            message: message.to_string(),
            honeypot: honeypot_value(fields.get(HONEYPOT_FIELD)),
        })
    }
}

fn required_string<'a>(
    fields: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    optional_string(fields, field)?.ok_or_else(|| {
        debug!(field, "Missing required field");
        ValidationError::MissingField(field)
    })
}

/// Absent and `null` are both treated as "not provided".
fn optional_string<'a>(
    fields: &'a Map<String, Value>,
    field: &'static str,
) -> Result<Option<&'a str>, ValidationError> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => {
            debug!(field, "Field is not a string");
            Err(ValidationError::NotAString(field))
        }
    }
}

fn min_chars(field: &'static str, value: &str, min: usize) -> Result<(), ValidationError> {
    if value.chars().count() < min {
        debug!(field, "Field too short");
        return Err(ValidationError::TooShort { field, min });
    }
    Ok(())
}

/// The address lands in `reply_to` and in the message body, so whitespace
/// and control characters are refused even inside a quoted local part.
fn is_plain_email(email: &str) -> bool {
    // Bare addresses only: no display text, no IP literals, a dotted domain
    let options = Options::default()
        .with_required_tld()
        .without_domain_literal()
        .without_display_text();

    !email.chars().any(|c| c.is_whitespace() || c.is_control())
        && EmailAddress::parse_with_options(email, options).is_ok()
}

/// Bots fill the honeypot with whatever they like, so any non-null value is
/// kept; non-strings as their JSON text.
fn honeypot_value(value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}
