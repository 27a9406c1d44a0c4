//! Employee manager.
//!
//! # Responsibility
//! - Create, replace and delete employees under the department-reference and
//!   name-pair uniqueness rules.
//! - Employee-centric reports (birth windows, non-managers, country list,
//!   department membership).
//!
//! # Invariants
//! - `(first_name, last_name)` is unique across employees.
//! - A sitting department head cannot be rewritten into the manager
//!   position through `update_employee`.

use super::{logged_write, EntityKind, ServiceError, ServiceResult};
use crate::model::department::DeptNo;
use crate::model::employee::{EmpNo, Employee, EmployeeDraft, Sex};
use crate::repo::employee_repo::{
    EmployeeFilter, EmployeeListQuery, EmployeeOrder, EmployeeRepository,
    SqliteEmployeeRepository,
};
use crate::repo::reference::{RecordKey, ReferenceResolver, SqliteReferenceResolver};
use crate::repo::{PageWindow, RepoResult};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use rusqlite::Connection;

/// Inclusive birth-date window of [`EmployeeManager::get_employees_born_in_range`].
pub static BORN_IN_RANGE_START: Lazy<NaiveDate> =
    Lazy::new(|| NaiveDate::from_ymd_opt(1980, 1, 1).expect("valid calendar date"));
pub static BORN_IN_RANGE_END: Lazy<NaiveDate> =
    Lazy::new(|| NaiveDate::from_ymd_opt(1990, 1, 1).expect("valid calendar date"));
/// Exclusive lower bound of [`EmployeeManager::get_female_employees_after`].
pub static FEMALE_BORN_AFTER: Lazy<NaiveDate> =
    Lazy::new(|| NaiveDate::from_ymd_opt(1990, 1, 1).expect("valid calendar date"));

/// BRICS allow-list matched against employee addresses.
pub const BRICS_COUNTRIES: &[&str] = &["Brazil", "China", "Russia", "India", "South Africa"];

/// Use-case facade for employees.
pub struct EmployeeManager<R: EmployeeRepository, V: ReferenceResolver> {
    repo: R,
    refs: V,
}

impl<'conn> EmployeeManager<SqliteEmployeeRepository<'conn>, SqliteReferenceResolver<'conn>> {
    /// Builds a manager over one migrated SQLite connection.
    pub fn try_from_connection(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self::new(
            SqliteEmployeeRepository::try_new(conn)?,
            SqliteReferenceResolver::try_new(conn)?,
        ))
    }
}

impl<R: EmployeeRepository, V: ReferenceResolver> EmployeeManager<R, V> {
    pub fn new(repo: R, refs: V) -> Self {
        Self { repo, refs }
    }

    /// Creates an employee, optionally attached to a home department.
    pub fn add_employee(&self, draft: &EmployeeDraft) -> ServiceResult<Employee> {
        logged_write(
            "employee_add",
            |employee: &Employee| employee.emp_no,
            || {
                draft.validate()?;
                self.ensure_department_exists(draft.dept_no)?;
                if self
                    .refs
                    .employee_named(&draft.first_name, &draft.last_name)?
                    .is_some()
                {
                    return Err(duplicate_name(draft));
                }
                Ok(self.repo.create_employee(draft)?)
            },
        )
    }

    /// Replaces every mutable field of an existing employee.
    ///
    /// Unlike [`Self::add_employee`], the draft must name a department.
    /// Checks run in order: department exists, manager-position rule,
    /// employee exists, name pair is free (the employee's own current name
    /// does not count).
    pub fn update_employee(&self, emp_no: EmpNo, draft: &EmployeeDraft) -> ServiceResult<Employee> {
        logged_write(
            "employee_update",
            |employee: &Employee| employee.emp_no,
            || {
                draft.validate()?;
                let dept_no = draft.dept_no.ok_or_else(|| {
                    ServiceError::ReferentialIntegrity(
                        "invalid department id: an updated employee needs a department"
                            .to_string(),
                    )
                })?;
                self.ensure_department_exists(Some(dept_no))?;
                if draft.is_manager_position() {
                    if let Some(dept_no) = self.refs.department_managed_by(emp_no)? {
                        return Err(ServiceError::BusinessRule(format!(
                            "employee {emp_no} is the assigned manager of department {dept_no}; \
                             cannot update employee position"
                        )));
                    }
                }
                if !self.refs.employee_exists(emp_no)? {
                    return Err(ServiceError::not_found(EntityKind::Employee, emp_no));
                }
                if let Some(owner) = self
                    .refs
                    .employee_named(&draft.first_name, &draft.last_name)?
                {
                    if owner != emp_no {
                        return Err(duplicate_name(draft));
                    }
                }
                self.repo
                    .replace_employee(emp_no, draft)?
                    .ok_or_else(|| ServiceError::not_found(EntityKind::Employee, emp_no))
            },
        )
    }

    /// Deletes an employee who heads no department and has no assignments.
    pub fn delete_employee(&self, emp_no: EmpNo) -> ServiceResult<()> {
        logged_write(
            "employee_delete",
            |_: &()| emp_no,
            || {
                if !self.refs.employee_exists(emp_no)? {
                    return Err(ServiceError::not_found(EntityKind::Employee, emp_no));
                }
                let blocking = self.refs.blocking_references(RecordKey::Employee(emp_no))?;
                if let Some(rows) = blocking.first() {
                    return Err(ServiceError::ReferentialIntegrity(format!(
                        "employee {emp_no} is still referenced by {} row(s) in `{}`",
                        rows.count, rows.table
                    )));
                }
                if !self.repo.delete_employee(emp_no)? {
                    return Err(ServiceError::not_found(EntityKind::Employee, emp_no));
                }
                Ok(())
            },
        )
    }

    pub fn get_by_id(&self, emp_no: EmpNo) -> ServiceResult<Option<Employee>> {
        Ok(self.repo.get_employee(emp_no)?)
    }

    /// Employees in key order.
    pub fn list_page(&self, page_number: i64) -> ServiceResult<Vec<Employee>> {
        self.list(EmployeeFilter::default(), EmployeeOrder::EmpNo, page_number)
    }

    /// Employees born between 1980-01-01 and 1990-01-01, both inclusive.
    pub fn get_employees_born_in_range(&self, page_number: i64) -> ServiceResult<Vec<Employee>> {
        let filter = EmployeeFilter {
            born_on_or_after: Some(*BORN_IN_RANGE_START),
            born_on_or_before: Some(*BORN_IN_RANGE_END),
            ..EmployeeFilter::default()
        };
        self.list(filter, EmployeeOrder::EmpNo, page_number)
    }

    /// Female employees born after 1990-01-01.
    pub fn get_female_employees_after(&self, page_number: i64) -> ServiceResult<Vec<Employee>> {
        let filter = EmployeeFilter {
            sex: Some(Sex::Female),
            born_after: Some(*FEMALE_BORN_AFTER),
            ..EmployeeFilter::default()
        };
        self.list(filter, EmployeeOrder::EmpNo, page_number)
    }

    /// Employees who head no department.
    pub fn get_non_manager_employees(&self, page_number: i64) -> ServiceResult<Vec<Employee>> {
        let filter = EmployeeFilter {
            heads_department: Some(false),
            ..EmployeeFilter::default()
        };
        self.list(filter, EmployeeOrder::EmpNo, page_number)
    }

    /// Employees whose address mentions a BRICS country, sorted by last name.
    pub fn get_employees_in_country_set(&self, page_number: i64) -> ServiceResult<Vec<Employee>> {
        let filter = EmployeeFilter {
            address_contains_any: BRICS_COUNTRIES
                .iter()
                .map(|country| (*country).to_string())
                .collect(),
            ..EmployeeFilter::default()
        };
        self.list(filter, EmployeeOrder::LastName, page_number)
    }

    /// Employees whose home department is named exactly `department_name`.
    pub fn get_employees_in_department_named(
        &self,
        page_number: i64,
        department_name: &str,
    ) -> ServiceResult<Vec<Employee>> {
        let filter = EmployeeFilter {
            department_name: Some(department_name.to_string()),
            ..EmployeeFilter::default()
        };
        self.list(filter, EmployeeOrder::EmpNo, page_number)
    }

    fn list(
        &self,
        filter: EmployeeFilter,
        order: EmployeeOrder,
        page_number: i64,
    ) -> ServiceResult<Vec<Employee>> {
        let query = EmployeeListQuery {
            filter,
            order,
            page: PageWindow::for_page(page_number),
        };
        Ok(self.repo.list_employees(&query)?)
    }

    fn ensure_department_exists(&self, dept_no: Option<DeptNo>) -> ServiceResult<()> {
        if let Some(dept_no) = dept_no {
            if !self.refs.department_exists(dept_no)? {
                return Err(ServiceError::ReferentialIntegrity(format!(
                    "invalid department id {dept_no}"
                )));
            }
        }
        Ok(())
    }
}

fn duplicate_name(draft: &EmployeeDraft) -> ServiceError {
    ServiceError::Uniqueness(format!(
        "employee `{} {}` already exists",
        draft.first_name, draft.last_name
    ))
}
