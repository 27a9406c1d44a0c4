//! Cross-entity reference and uniqueness lookups.
//!
//! # Responsibility
//! - Answer the existence and name-ownership questions every manager asks
//!   before a write, so the checks are written once.
//! - Report which rows still point at a record before it is deleted.
//!
//! # Invariants
//! - Lookups are read-only.
//! - Name ownership is an exact, case-sensitive match.

use super::schema::ensure_schema_ready;
use super::RepoResult;
use crate::model::department::DeptNo;
use crate::model::employee::EmpNo;
use crate::model::project::ProjNo;
use rusqlite::{params, Connection, OptionalExtension};

/// Key of a record other rows can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKey {
    Employee(EmpNo),
    Department(DeptNo),
    Project(ProjNo),
}

/// Rows in one table that still reference a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferencingRows {
    pub table: &'static str,
    pub count: i64,
}

/// Shared existence/uniqueness capability used by all managers.
pub trait ReferenceResolver {
    fn employee_exists(&self, emp_no: EmpNo) -> RepoResult<bool>;
    fn department_exists(&self, dept_no: DeptNo) -> RepoResult<bool>;
    fn project_exists(&self, proj_no: ProjNo) -> RepoResult<bool>;
    /// Department headed by `emp_no`, if any.
    fn department_managed_by(&self, emp_no: EmpNo) -> RepoResult<Option<DeptNo>>;
    /// Department currently carrying `name`, if any.
    fn department_named(&self, name: &str) -> RepoResult<Option<DeptNo>>;
    /// Project currently carrying `name`, if any.
    fn project_named(&self, name: &str) -> RepoResult<Option<ProjNo>>;
    /// Employee currently carrying the `(first, last)` name pair, if any.
    fn employee_named(&self, first_name: &str, last_name: &str) -> RepoResult<Option<EmpNo>>;
    /// Rows that would block deleting `key`. Empty when nothing refers to it.
    ///
    /// The optional employee home-department reference is cleared on delete
    /// and never blocks.
    fn blocking_references(&self, key: RecordKey) -> RepoResult<Vec<ReferencingRows>>;
}

/// SQLite-backed reference resolver.
pub struct SqliteReferenceResolver<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReferenceResolver<'conn> {
    /// Creates resolver from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, &["employees", "departments", "projects", "works_on"])?;
        Ok(Self { conn })
    }

    fn exists(&self, sql: &str, key: i64) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(sql, [key], |row| row.get(0))?;
        Ok(exists == 1)
    }

    fn count(&self, table: &'static str, sql: &str, key: i64) -> RepoResult<ReferencingRows> {
        let count: i64 = self.conn.query_row(sql, [key], |row| row.get(0))?;
        Ok(ReferencingRows { table, count })
    }
}

impl ReferenceResolver for SqliteReferenceResolver<'_> {
    fn employee_exists(&self, emp_no: EmpNo) -> RepoResult<bool> {
        self.exists(
            "SELECT EXISTS(SELECT 1 FROM employees WHERE emp_no = ?1);",
            emp_no,
        )
    }

    fn department_exists(&self, dept_no: DeptNo) -> RepoResult<bool> {
        self.exists(
            "SELECT EXISTS(SELECT 1 FROM departments WHERE dept_no = ?1);",
            dept_no,
        )
    }

    fn project_exists(&self, proj_no: ProjNo) -> RepoResult<bool> {
        self.exists(
            "SELECT EXISTS(SELECT 1 FROM projects WHERE proj_no = ?1);",
            proj_no,
        )
    }

    fn department_managed_by(&self, emp_no: EmpNo) -> RepoResult<Option<DeptNo>> {
        let dept_no = self
            .conn
            .query_row(
                "SELECT dept_no FROM departments WHERE manager_emp_no = ?1;",
                [emp_no],
                |row| row.get(0),
            )
            .optional()?;
        Ok(dept_no)
    }

    fn department_named(&self, name: &str) -> RepoResult<Option<DeptNo>> {
        let dept_no = self
            .conn
            .query_row(
                "SELECT dept_no FROM departments WHERE name = ?1;",
                [name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(dept_no)
    }

    fn project_named(&self, name: &str) -> RepoResult<Option<ProjNo>> {
        let proj_no = self
            .conn
            .query_row(
                "SELECT proj_no FROM projects WHERE name = ?1;",
                [name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(proj_no)
    }

    fn employee_named(&self, first_name: &str, last_name: &str) -> RepoResult<Option<EmpNo>> {
        let emp_no = self
            .conn
            .query_row(
                "SELECT emp_no FROM employees WHERE first_name = ?1 AND last_name = ?2;",
                params![first_name, last_name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(emp_no)
    }

    fn blocking_references(&self, key: RecordKey) -> RepoResult<Vec<ReferencingRows>> {
        let counts = match key {
            RecordKey::Employee(emp_no) => vec![
                self.count(
                    "departments",
                    "SELECT COUNT(*) FROM departments WHERE manager_emp_no = ?1;",
                    emp_no,
                )?,
                self.count(
                    "works_on",
                    "SELECT COUNT(*) FROM works_on WHERE emp_no = ?1;",
                    emp_no,
                )?,
            ],
            RecordKey::Department(dept_no) => vec![self.count(
                "projects",
                "SELECT COUNT(*) FROM projects WHERE dept_no = ?1;",
                dept_no,
            )?],
            RecordKey::Project(proj_no) => vec![self.count(
                "works_on",
                "SELECT COUNT(*) FROM works_on WHERE proj_no = ?1;",
                proj_no,
            )?],
        };

        Ok(counts.into_iter().filter(|rows| rows.count > 0).collect())
    }
}
