//! Employee record.
//!
//! # Invariants
//! - `(first_name, last_name)` is unique across all employees.
//! - `dept_no`, when set, points at an existing department.

use super::department::DeptNo;
use super::{require_text, RecordValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Surrogate key of an employee row.
pub type EmpNo = i64;

/// Position value that marks an employee as holding the manager role.
pub const MANAGER_POSITION: &str = "Manager";

/// Sex as recorded on the employee row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Storage spelling, shared with the `CHECK` constraint on `employees.sex`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Male" => Some(Self::Male),
            "Female" => Some(Self::Female),
            _ => None,
        }
    }
}

/// Stored employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub emp_no: EmpNo,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub birth_date: NaiveDate,
    pub sex: Sex,
    pub position: String,
    /// Home department. `None` for employees not attached to one.
    pub dept_no: Option<DeptNo>,
}

/// Input for creating or fully replacing an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeDraft {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub birth_date: NaiveDate,
    pub sex: Sex,
    pub position: String,
    pub dept_no: Option<DeptNo>,
}

impl EmployeeDraft {
    /// Checks required text fields.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        require_text("first_name", &self.first_name)?;
        require_text("last_name", &self.last_name)?;
        require_text("position", &self.position)?;
        Ok(())
    }

    /// Whether `position` denotes the manager role.
    ///
    /// Matching ignores surrounding whitespace and ASCII case.
    pub fn is_manager_position(&self) -> bool {
        self.position.trim().eq_ignore_ascii_case(MANAGER_POSITION)
    }

    pub(crate) fn into_employee(self, emp_no: EmpNo) -> Employee {
        Employee {
            emp_no,
            first_name: self.first_name,
            last_name: self.last_name,
            address: self.address,
            birth_date: self.birth_date,
            sex: self.sex,
            position: self.position,
            dept_no: self.dept_no,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EmployeeDraft, Sex};
    use crate::model::RecordValidationError;
    use chrono::NaiveDate;

    fn draft(position: &str) -> EmployeeDraft {
        EmployeeDraft {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            address: "London".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1985, 12, 10).unwrap(),
            sex: Sex::Female,
            position: position.to_string(),
            dept_no: None,
        }
    }

    #[test]
    fn sex_storage_spelling_round_trips() {
        for sex in [Sex::Male, Sex::Female] {
            assert_eq!(Sex::parse(sex.as_str()), Some(sex));
        }
        assert_eq!(Sex::parse("female"), None);
    }

    #[test]
    fn manager_position_ignores_case_and_padding() {
        assert!(draft("Manager").is_manager_position());
        assert!(draft("  manager ").is_manager_position());
        assert!(!draft("Engineering Manager").is_manager_position());
    }

    #[test]
    fn validate_rejects_blank_names() {
        let mut blank = draft("Engineer");
        blank.last_name = "   ".to_string();
        assert_eq!(
            blank.validate(),
            Err(RecordValidationError::BlankField("last_name"))
        );
    }
}
