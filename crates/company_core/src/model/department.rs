//! Department record.
//!
//! # Invariants
//! - `name` is unique.
//! - `manager_emp_no` points at an existing employee, and no employee heads
//!   more than one department.

use super::employee::EmpNo;
use serde::{Deserialize, Serialize};

/// Surrogate key of a department row.
pub type DeptNo = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub dept_no: DeptNo,
    pub name: String,
    pub manager_emp_no: EmpNo,
}
