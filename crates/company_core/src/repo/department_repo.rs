//! Department repository contract and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over the `departments` table.
//! - Department-centric reads: heads of department and headcounts.
//!
//! # Invariants
//! - Department listings are ordered by `dept_no ASC`.
//! - Head-of-department listings are ordered by last name, first name, then
//!   `emp_no`.

use super::employee_repo::{
    count_matching_employees, query_employees, EmployeeFilter, EmployeeListQuery, EmployeeOrder,
};
use super::schema::ensure_schema_ready;
use super::{PageWindow, RepoResult};
use crate::model::department::{Department, DeptNo};
use crate::model::employee::{EmpNo, Employee};
use crate::model::report::DepartmentHeadcount;
use rusqlite::{params, Connection, OptionalExtension, Row};

const DEPARTMENT_SELECT_SQL: &str = "SELECT dept_no, name, manager_emp_no FROM departments";

/// Repository interface for department persistence.
pub trait DepartmentRepository {
    fn create_department(&self, name: &str, manager_emp_no: EmpNo) -> RepoResult<Department>;
    /// Replaces name and manager. `None` when the row does not exist.
    fn replace_department(
        &self,
        dept_no: DeptNo,
        name: &str,
        manager_emp_no: EmpNo,
    ) -> RepoResult<Option<Department>>;
    /// Removes one row. `false` when the row does not exist.
    fn delete_department(&self, dept_no: DeptNo) -> RepoResult<bool>;
    fn get_department(&self, dept_no: DeptNo) -> RepoResult<Option<Department>>;
    fn list_departments(&self, page: PageWindow) -> RepoResult<Vec<Department>>;
    /// Lists employees heading a department, narrowed by `filter`.
    fn list_heads(&self, filter: &EmployeeFilter, page: PageWindow) -> RepoResult<Vec<Employee>>;
    fn count_heads(&self, filter: &EmployeeFilter) -> RepoResult<i64>;
    /// Departments whose employee count is strictly greater than `more_than`.
    fn list_headcounts_above(
        &self,
        more_than: i64,
        page: PageWindow,
    ) -> RepoResult<Vec<DepartmentHeadcount>>;
}

/// SQLite-backed department repository.
pub struct SqliteDepartmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDepartmentRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, &["departments", "employees"])?;
        Ok(Self { conn })
    }
}

impl DepartmentRepository for SqliteDepartmentRepository<'_> {
    fn create_department(&self, name: &str, manager_emp_no: EmpNo) -> RepoResult<Department> {
        self.conn.execute(
            "INSERT INTO departments (name, manager_emp_no) VALUES (?1, ?2);",
            params![name, manager_emp_no],
        )?;

        Ok(Department {
            dept_no: self.conn.last_insert_rowid(),
            name: name.to_string(),
            manager_emp_no,
        })
    }

    fn replace_department(
        &self,
        dept_no: DeptNo,
        name: &str,
        manager_emp_no: EmpNo,
    ) -> RepoResult<Option<Department>> {
        let changed = self.conn.execute(
            "UPDATE departments SET name = ?2, manager_emp_no = ?3 WHERE dept_no = ?1;",
            params![dept_no, name, manager_emp_no],
        )?;

        if changed == 0 {
            return Ok(None);
        }
        Ok(Some(Department {
            dept_no,
            name: name.to_string(),
            manager_emp_no,
        }))
    }

    fn delete_department(&self, dept_no: DeptNo) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM departments WHERE dept_no = ?1;", [dept_no])?;
        Ok(changed > 0)
    }

    fn get_department(&self, dept_no: DeptNo) -> RepoResult<Option<Department>> {
        let department = self
            .conn
            .query_row(
                &format!("{DEPARTMENT_SELECT_SQL} WHERE dept_no = ?1;"),
                [dept_no],
                parse_department_row,
            )
            .optional()?;
        Ok(department)
    }

    fn list_departments(&self, page: PageWindow) -> RepoResult<Vec<Department>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DEPARTMENT_SELECT_SQL} ORDER BY dept_no ASC LIMIT ?1 OFFSET ?2;"
        ))?;
        let departments = stmt
            .query_map([page.limit, page.offset], parse_department_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(departments)
    }

    fn list_heads(&self, filter: &EmployeeFilter, page: PageWindow) -> RepoResult<Vec<Employee>> {
        let query = EmployeeListQuery {
            filter: heads_only(filter),
            order: EmployeeOrder::LastNameFirstName,
            page,
        };
        query_employees(self.conn, &query)
    }

    fn count_heads(&self, filter: &EmployeeFilter) -> RepoResult<i64> {
        count_matching_employees(self.conn, &heads_only(filter))
    }

    fn list_headcounts_above(
        &self,
        more_than: i64,
        page: PageWindow,
    ) -> RepoResult<Vec<DepartmentHeadcount>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                d.dept_no AS dept_no,
                d.name AS name,
                COUNT(e.emp_no) AS employee_count
             FROM departments d
             INNER JOIN employees e ON e.dept_no = d.dept_no
             GROUP BY d.dept_no, d.name
             HAVING COUNT(e.emp_no) > ?1
             ORDER BY d.dept_no ASC
             LIMIT ?2 OFFSET ?3;",
        )?;
        let headcounts = stmt
            .query_map(params![more_than, page.limit, page.offset], |row| {
                Ok(DepartmentHeadcount {
                    dept_no: row.get("dept_no")?,
                    name: row.get("name")?,
                    employee_count: row.get("employee_count")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(headcounts)
    }
}

fn heads_only(filter: &EmployeeFilter) -> EmployeeFilter {
    EmployeeFilter {
        heads_department: Some(true),
        ..filter.clone()
    }
}

fn parse_department_row(row: &Row<'_>) -> rusqlite::Result<Department> {
    Ok(Department {
        dept_no: row.get("dept_no")?,
        name: row.get("name")?,
        manager_emp_no: row.get("manager_emp_no")?,
    })
}
