//! Project record.
//!
//! # Invariants
//! - `name` is unique.
//! - `dept_no` points at an existing department.

use super::department::DeptNo;
use serde::{Deserialize, Serialize};

/// Surrogate key of a project row.
pub type ProjNo = i64;

/// Default department allow-list for the project-by-department report.
pub const DEFAULT_PROJECT_DEPARTMENTS: &[&str] = &["IT", "HR"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub proj_no: ProjNo,
    pub name: String,
    pub dept_no: DeptNo,
}
