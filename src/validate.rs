use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{ApiError, FieldError};

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Declarative per-endpoint rule set. Rules run in declaration order and
/// every failure is collected, so the client gets the full list in one
/// `400 {errors: [...]}` response before any store access happens.
#[derive(Default)]
pub struct RuleSet {
    errors: Vec<FieldError>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field must be present and not blank.
    pub fn require(mut self, value: Option<&str>, msg: &str) -> Self {
        if value.map_or(true, |v| v.trim().is_empty()) {
            self.errors.push(FieldError::new(msg));
        }
        self
    }

    /// Field must merely be present (blank allowed).
    pub fn exists(mut self, value: Option<&str>, msg: &str) -> Self {
        if value.is_none() {
            self.errors.push(FieldError::new(msg));
        }
        self
    }

    pub fn email(mut self, value: Option<&str>, msg: &str) -> Self {
        if !value.is_some_and(is_valid_email) {
            self.errors.push(FieldError::new(msg));
        }
        self
    }

    pub fn min_len(mut self, value: Option<&str>, min: usize, msg: &str) -> Self {
        if value.map_or(true, |v| v.chars().count() < min) {
            self.errors.push(FieldError::new(msg));
        }
        self
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.errors))
        }
    }
}
