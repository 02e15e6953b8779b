//! Field-level validation for every intake entity.
//!
//! Each entity runs its base field checks first and then its cross-field
//! requirements, so errors come back in declaration order with a path that
//! points at the offending field (`vehicles[2].lienholder`,
//! `riskProfile.hazmatTypes`).

mod entities;
mod rules;

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use rules::{Checks, Requirement, Trigger};

/// Dotted path into the intake record, with `[n]` for list positions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    pub fn root() -> Self {
        Self(String::new())
    }

    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn field(&self, name: &str) -> Self {
        if self.0.is_empty() {
            Self(name.to_string())
        } else {
            Self(format!("{}.{}", self.0, name))
        }
    }

    pub fn index(&self, position: usize) -> Self {
        Self(format!("{}[{}]", self.0, position))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts to a JSON pointer (`vehicles[2].vin` becomes `/vehicles/2/vin`).
    ///
    /// Returns `None` when the path is empty or malformed.
    pub fn to_pointer(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }

        let mut pointer = String::new();
        for segment in self.0.split('.') {
            let (name, rest) = match segment.find('[') {
                Some(open) => segment.split_at(open),
                None => (segment, ""),
            };
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
                return None;
            }
            pointer.push('/');
            pointer.push_str(name);

            let mut rest = rest;
            while !rest.is_empty() {
                let close = rest.find(']')?;
                let digits = rest.get(1..close)?;
                if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                    return None;
                }
                pointer.push('/');
                pointer.push_str(digits);
                rest = &rest[close + 1..];
                if !rest.is_empty() && !rest.starts_with('[') {
                    return None;
                }
            }
        }
        Some(pointer)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldPath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub path: FieldPath,
    pub message: String,
}

/// Outcome of validating one entity or one stage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn from_errors(errors: Vec<FieldError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn passed() -> Self {
        Self::from_errors(Vec::new())
    }

    pub fn messages(&self) -> Vec<&str> {
        self.errors.iter().map(|error| error.message.as_str()).collect()
    }

    pub fn has_error_at(&self, path: &str) -> bool {
        self.errors.iter().any(|error| error.path.as_str() == path)
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.valid = self.errors.is_empty();
    }
}

/// Clock input for date-relative rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationContext {
    pub today: NaiveDate,
}

impl ValidationContext {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn current() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }
}

/// Entity that knows its own field rules.
pub trait Validate {
    fn check(&self, ctx: &ValidationContext, checks: &mut Checks);
}

/// Validates `entity` rooted at `path` and collects every failure.
pub fn validate_at<T: Validate + ?Sized>(
    entity: &T,
    path: FieldPath,
    ctx: &ValidationContext,
) -> ValidationReport {
    let mut checks = Checks::new(path);
    entity.check(ctx, &mut checks);
    ValidationReport::from_errors(checks.finish())
}

pub fn validate<T: Validate + ?Sized>(entity: &T, ctx: &ValidationContext) -> ValidationReport {
    validate_at(entity, FieldPath::root(), ctx)
}
