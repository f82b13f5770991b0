//! Structured field validation for write payloads.
//!
//! Writes that violate schema constraints are rejected with a
//! [`ValidationError`] naming every offending field, before any database
//! statement runs.

use serde::Serialize;
use thiserror::Error;

/// A single field-level constraint violation.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldViolation {
    /// The offending field, in the wire-format (camelCase) spelling.
    pub field: &'static str,
    pub message: String,
}

/// Validation failure carrying one violation per offending field.
#[derive(Debug, Error, Serialize)]
#[error("validation failed: {}", self.summary())]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    fn summary(&self) -> String {
        self.violations
            .iter()
            .map(|v| format!("{}: {}", v.field, v.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Accumulator for building a [`ValidationError`] across many checks.
#[derive(Debug, Default)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Record a violation against `field`.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldViolation {
            field,
            message: message.into(),
        });
    }

    /// Finish validation: `Ok(())` if nothing was recorded.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing every recorded violation.
    pub fn finish(self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations: self.0 })
        }
    }
}

/// Validation of a write payload against its schema constraints.
pub trait Validate {
    /// Check every constraint, collecting all violations rather than
    /// stopping at the first.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming each offending field.
    fn validate(&self) -> Result<(), ValidationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_violations_is_ok() {
        assert!(Violations::new().finish().is_ok());
    }

    #[test]
    fn test_all_violations_collected() {
        let mut v = Violations::new();
        v.add("name", "must not be empty");
        v.add("price", "must not be negative");
        let err = v.finish().expect_err("must fail");
        assert_eq!(err.violations.len(), 2);
        assert!(err.to_string().contains("name"));
        assert!(err.to_string().contains("price"));
    }
}
