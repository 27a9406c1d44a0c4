//! Department manager.
//!
//! # Responsibility
//! - Create, replace and delete departments under the manager-assignment and
//!   name-uniqueness rules.
//! - Department-centric reports: female heads, headcounts.
//!
//! # Invariants
//! - A department's manager is an existing employee.
//! - No employee heads two departments.
//! - Department names are unique.

use super::{logged_write, EntityKind, ServiceError, ServiceResult};
use crate::model::department::{Department, DeptNo};
use crate::model::employee::{EmpNo, Employee, Sex};
use crate::model::report::DepartmentHeadcount;
use crate::model::require_text;
use crate::repo::department_repo::{DepartmentRepository, SqliteDepartmentRepository};
use crate::repo::employee_repo::EmployeeFilter;
use crate::repo::reference::{RecordKey, ReferenceResolver, SqliteReferenceResolver};
use crate::repo::{PageWindow, RepoError, RepoResult};
use chrono::{Months, NaiveDate};
use rusqlite::Connection;

/// Departments must have strictly more employees than this to appear in the
/// headcount report.
pub const HEADCOUNT_REPORT_THRESHOLD: i64 = 10;

/// Use-case facade for departments.
pub struct DepartmentManager<R: DepartmentRepository, V: ReferenceResolver> {
    repo: R,
    refs: V,
}

impl<'conn> DepartmentManager<SqliteDepartmentRepository<'conn>, SqliteReferenceResolver<'conn>> {
    /// Builds a manager over one migrated SQLite connection.
    pub fn try_from_connection(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self::new(
            SqliteDepartmentRepository::try_new(conn)?,
            SqliteReferenceResolver::try_new(conn)?,
        ))
    }
}

impl<R: DepartmentRepository, V: ReferenceResolver> DepartmentManager<R, V> {
    pub fn new(repo: R, refs: V) -> Self {
        Self { repo, refs }
    }

    /// Creates a department headed by `manager_emp_no`.
    ///
    /// Checks run in order: manager exists, manager heads no other
    /// department, name is free.
    pub fn add_department(&self, name: &str, manager_emp_no: EmpNo) -> ServiceResult<Department> {
        logged_write(
            "department_add",
            |department: &Department| department.dept_no,
            || {
                require_text("name", name)?;
                self.ensure_manager_exists(manager_emp_no)?;
                if let Some(current) = self.refs.department_managed_by(manager_emp_no)? {
                    return Err(manager_already_assigned(manager_emp_no, current));
                }
                if self.refs.department_named(name)?.is_some() {
                    return Err(duplicate_name(name));
                }
                self.repo
                    .create_department(name, manager_emp_no)
                    .map_err(|err| manager_constraint(err, manager_emp_no))
            },
        )
    }

    /// Replaces name and manager of an existing department.
    ///
    /// Keeping the current name or the current manager is not a conflict.
    pub fn update_department(
        &self,
        dept_no: DeptNo,
        name: &str,
        manager_emp_no: EmpNo,
    ) -> ServiceResult<Department> {
        logged_write(
            "department_update",
            |department: &Department| department.dept_no,
            || {
                require_text("name", name)?;
                self.ensure_manager_exists(manager_emp_no)?;
                if !self.refs.department_exists(dept_no)? {
                    return Err(ServiceError::not_found(EntityKind::Department, dept_no));
                }
                if let Some(current) = self.refs.department_managed_by(manager_emp_no)? {
                    if current != dept_no {
                        return Err(manager_already_assigned(manager_emp_no, current));
                    }
                }
                if let Some(owner) = self.refs.department_named(name)? {
                    if owner != dept_no {
                        return Err(duplicate_name(name));
                    }
                }
                self.repo
                    .replace_department(dept_no, name, manager_emp_no)
                    .map_err(|err| manager_constraint(err, manager_emp_no))?
                    .ok_or_else(|| ServiceError::not_found(EntityKind::Department, dept_no))
            },
        )
    }

    /// Deletes a department that owns no projects.
    ///
    /// Employees whose home department it was are detached, not deleted.
    pub fn delete_department(&self, dept_no: DeptNo) -> ServiceResult<()> {
        logged_write(
            "department_delete",
            |_: &()| dept_no,
            || {
                if !self.refs.department_exists(dept_no)? {
                    return Err(ServiceError::not_found(EntityKind::Department, dept_no));
                }
                let blocking = self
                    .refs
                    .blocking_references(RecordKey::Department(dept_no))?;
                if let Some(rows) = blocking.first() {
                    return Err(ServiceError::ReferentialIntegrity(format!(
                        "department {dept_no} is still referenced by {} row(s) in `{}`",
                        rows.count, rows.table
                    )));
                }
                if !self.repo.delete_department(dept_no)? {
                    return Err(ServiceError::not_found(EntityKind::Department, dept_no));
                }
                Ok(())
            },
        )
    }

    pub fn get_by_id(&self, dept_no: DeptNo) -> ServiceResult<Option<Department>> {
        Ok(self.repo.get_department(dept_no)?)
    }

    /// Departments in key order.
    pub fn list_page(&self, page_number: i64) -> ServiceResult<Vec<Department>> {
        Ok(self.repo.list_departments(PageWindow::for_page(page_number))?)
    }

    /// Female department heads, sorted by last name then first name.
    pub fn get_female_managers(&self, page_number: i64) -> ServiceResult<Vec<Employee>> {
        Ok(self
            .repo
            .list_heads(&female_filter(), PageWindow::for_page(page_number))?)
    }

    pub fn count_female_managers(&self) -> ServiceResult<i64> {
        Ok(self.repo.count_heads(&female_filter())?)
    }

    /// Same rows as [`Self::get_female_managers`].
    ///
    /// No age comparison is applied here; callers wanting the age-limited
    /// list use [`Self::get_female_managers_under_age`].
    pub fn get_managers_under_forty(&self, page_number: i64) -> ServiceResult<Vec<Employee>> {
        self.get_female_managers(page_number)
    }

    /// Female department heads younger than `max_age_years` on `as_of`.
    pub fn get_female_managers_under_age(
        &self,
        page_number: i64,
        as_of: NaiveDate,
        max_age_years: u32,
    ) -> ServiceResult<Vec<Employee>> {
        let cutoff = as_of
            .checked_sub_months(Months::new(max_age_years.saturating_mul(12)))
            .unwrap_or(NaiveDate::MIN);
        let filter = EmployeeFilter {
            born_after: Some(cutoff),
            ..female_filter()
        };
        Ok(self
            .repo
            .list_heads(&filter, PageWindow::for_page(page_number))?)
    }

    /// Departments with more than ten employees, with their headcount.
    pub fn get_departments_over_ten_employees(
        &self,
        page_number: i64,
    ) -> ServiceResult<Vec<DepartmentHeadcount>> {
        Ok(self.repo.list_headcounts_above(
            HEADCOUNT_REPORT_THRESHOLD,
            PageWindow::for_page(page_number),
        )?)
    }

    fn ensure_manager_exists(&self, manager_emp_no: EmpNo) -> ServiceResult<()> {
        if !self.refs.employee_exists(manager_emp_no)? {
            return Err(ServiceError::ReferentialIntegrity(format!(
                "invalid manager employee id {manager_emp_no}"
            )));
        }
        Ok(())
    }
}

fn female_filter() -> EmployeeFilter {
    EmployeeFilter {
        sex: Some(Sex::Female),
        ..EmployeeFilter::default()
    }
}

fn manager_already_assigned(manager_emp_no: EmpNo, dept_no: DeptNo) -> ServiceError {
    ServiceError::ReferentialIntegrity(format!(
        "employee {manager_emp_no} already manages department {dept_no}"
    ))
}

/// A `UNIQUE` failure on `manager_emp_no` is a manager conflict that slipped
/// past the lookup, not a name clash.
fn manager_constraint(err: RepoError, manager_emp_no: EmpNo) -> ServiceError {
    match err {
        RepoError::UniqueConstraint(detail) if detail.contains("departments.manager_emp_no") => {
            ServiceError::ReferentialIntegrity(format!(
                "employee {manager_emp_no} already manages another department"
            ))
        }
        other => other.into(),
    }
}

fn duplicate_name(name: &str) -> ServiceError {
    ServiceError::Uniqueness(format!("department name `{name}` already exists"))
}
