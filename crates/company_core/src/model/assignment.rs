//! Works-on assignment record.
//!
//! One row per (employee, project, date) entry. Several rows may repeat the
//! same triple; the store does not deduplicate them.

use super::employee::EmpNo;
use super::project::ProjNo;
use super::RecordValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Surrogate key of a works-on row.
pub type WorkNo = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub work_no: WorkNo,
    pub emp_no: EmpNo,
    pub proj_no: ProjNo,
    pub date_worked: NaiveDate,
    pub hours_worked: f64,
}

/// Input for creating or fully replacing an assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentDraft {
    pub emp_no: EmpNo,
    pub proj_no: ProjNo,
    pub date_worked: NaiveDate,
    pub hours_worked: f64,
}

impl AssignmentDraft {
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if !self.hours_worked.is_finite() || self.hours_worked < 0.0 {
            return Err(RecordValidationError::InvalidHours(self.hours_worked));
        }
        Ok(())
    }

    pub(crate) fn into_assignment(self, work_no: WorkNo) -> Assignment {
        Assignment {
            work_no,
            emp_no: self.emp_no,
            proj_no: self.proj_no,
            date_worked: self.date_worked,
            hours_worked: self.hours_worked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AssignmentDraft;
    use chrono::NaiveDate;

    fn draft(hours_worked: f64) -> AssignmentDraft {
        AssignmentDraft {
            emp_no: 1,
            proj_no: 1,
            date_worked: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            hours_worked,
        }
    }

    #[test]
    fn zero_and_fractional_hours_are_valid() {
        assert!(draft(0.0).validate().is_ok());
        assert!(draft(7.5).validate().is_ok());
    }

    #[test]
    fn negative_and_nan_hours_are_rejected() {
        assert!(draft(-1.0).validate().is_err());
        assert!(draft(f64::NAN).validate().is_err());
        assert!(draft(f64::INFINITY).validate().is_err());
    }
}
