//! Field validation shared by every write payload

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// A single offending field and the reason it was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

/// Structured validation failure listing every offending field
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a failure with exactly one issue
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut err = Self::new();
        err.push(field, message);
        err
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.issues.push(FieldIssue {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// `Ok(())` when nothing was collected, the error otherwise
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.issues.iter().map(|i| i.message.as_str()).collect();
        f.write_str(&messages.join(", "))
    }
}

/// Write payloads that check their own field rules before touching storage
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Record a "required" issue when the value is missing or blank
pub fn require(errors: &mut ValidationError, field: &str, value: Option<&str>, label: &str) {
    if value.map(str::trim).is_none_or(str::is_empty) {
        errors.push(field, format!("Please add {}", label));
    }
}

/// Exactly five ASCII digits
pub fn is_postal_code(value: &str) -> bool {
    value.len() == 5 && value.bytes().all(|b| b.is_ascii_digit())
}

/// Digits with an optional leading `+` and `-` or space separators, 9 to 15 digits
pub fn is_phone(value: &str) -> bool {
    let body = value.strip_prefix('+').unwrap_or(value);
    if body.is_empty() || body.starts_with(['-', ' ']) || body.ends_with(['-', ' ']) {
        return false;
    }
    if !body.chars().all(|c| c.is_ascii_digit() || c == '-' || c == ' ') {
        return false;
    }
    let digits = body.chars().filter(char::is_ascii_digit).count();
    (9..=15).contains(&digits)
}

/// Loose `local@domain.tld` check
pub fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || value.contains(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2,
        None => false,
    }
}
