//! Company records domain model.
//!
//! # Responsibility
//! - Define the four stored records (employee, department, project, works-on
//!   assignment) and the draft shapes accepted by managers.
//! - Define the report projections returned by aggregation queries.
//! - Reject drafts with shape problems the store would silently accept.
//!
//! # Invariants
//! - Surrogate keys are assigned by the store; drafts never carry one.
//! - Names are compared case-sensitively, exactly as stored.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod assignment;
pub mod department;
pub mod employee;
pub mod project;
pub mod report;

/// Shape problems found in a draft before it reaches the store.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValidationError {
    /// Required text field is empty after trimming.
    BlankField(&'static str),
    /// Hours worked must be a finite, non-negative number.
    InvalidHours(f64),
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "`{field}` must not be blank"),
            Self::InvalidHours(hours) => {
                write!(f, "hours worked must be finite and non-negative, got {hours}")
            }
        }
    }
}

impl Error for RecordValidationError {}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), RecordValidationError> {
    if value.trim().is_empty() {
        return Err(RecordValidationError::BlankField(field));
    }
    Ok(())
}
