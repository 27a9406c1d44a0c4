//! Read models produced by reporting queries.

use super::department::DeptNo;
use super::employee::EmpNo;
use super::project::ProjNo;
use serde::{Deserialize, Serialize};

/// Department with its employee headcount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentHeadcount {
    pub dept_no: DeptNo,
    pub name: String,
    pub employee_count: i64,
}

/// Reduced project shape joined with its owning department's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub proj_no: ProjNo,
    pub dept_no: DeptNo,
    pub name: String,
    pub department_name: String,
}

/// Hours booked by one employee across all assignments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeHours {
    pub emp_no: EmpNo,
    /// `"first last"`.
    pub name: String,
    pub total_hours: f64,
    /// Distinct project names, sorted.
    pub projects: Vec<String>,
}
