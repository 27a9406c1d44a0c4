//! Works-on assignment repository contract and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over the `works_on` table.
//! - Hours aggregation per employee.
//!
//! # Invariants
//! - Listings are ordered by `work_no ASC`.
//! - Aggregated rows are ordered by `emp_no ASC`; project names inside one
//!   row are distinct and sorted.

use super::schema::ensure_schema_ready;
use super::{PageWindow, RepoResult};
use crate::model::assignment::{Assignment, AssignmentDraft, WorkNo};
use crate::model::employee::EmpNo;
use crate::model::report::EmployeeHours;
use rusqlite::{params, Connection, OptionalExtension, Row};

const ASSIGNMENT_SELECT_SQL: &str = "SELECT
    work_no,
    emp_no,
    proj_no,
    date_worked,
    hours_worked
FROM works_on";

/// Repository interface for works-on persistence.
pub trait AssignmentRepository {
    fn create_assignment(&self, draft: &AssignmentDraft) -> RepoResult<Assignment>;
    /// Replaces every field. `None` when the row does not exist.
    fn replace_assignment(
        &self,
        work_no: WorkNo,
        draft: &AssignmentDraft,
    ) -> RepoResult<Option<Assignment>>;
    /// Removes one row. `false` when the row does not exist.
    fn delete_assignment(&self, work_no: WorkNo) -> RepoResult<bool>;
    fn get_assignment(&self, work_no: WorkNo) -> RepoResult<Option<Assignment>>;
    fn list_assignments(&self, page: PageWindow) -> RepoResult<Vec<Assignment>>;
    /// One row per employee with at least one assignment.
    fn list_hours_by_employee(&self, page: PageWindow) -> RepoResult<Vec<EmployeeHours>>;
}

/// SQLite-backed works-on repository.
pub struct SqliteAssignmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAssignmentRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, &["works_on", "employees", "projects"])?;
        Ok(Self { conn })
    }
}

impl AssignmentRepository for SqliteAssignmentRepository<'_> {
    fn create_assignment(&self, draft: &AssignmentDraft) -> RepoResult<Assignment> {
        self.conn.execute(
            "INSERT INTO works_on (emp_no, proj_no, date_worked, hours_worked)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                draft.emp_no,
                draft.proj_no,
                draft.date_worked,
                draft.hours_worked,
            ],
        )?;

        Ok(draft.clone().into_assignment(self.conn.last_insert_rowid()))
    }

    fn replace_assignment(
        &self,
        work_no: WorkNo,
        draft: &AssignmentDraft,
    ) -> RepoResult<Option<Assignment>> {
        let changed = self.conn.execute(
            "UPDATE works_on
             SET
                emp_no = ?2,
                proj_no = ?3,
                date_worked = ?4,
                hours_worked = ?5
             WHERE work_no = ?1;",
            params![
                work_no,
                draft.emp_no,
                draft.proj_no,
                draft.date_worked,
                draft.hours_worked,
            ],
        )?;

        if changed == 0 {
            return Ok(None);
        }
        Ok(Some(draft.clone().into_assignment(work_no)))
    }

    fn delete_assignment(&self, work_no: WorkNo) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM works_on WHERE work_no = ?1;", [work_no])?;
        Ok(changed > 0)
    }

    fn get_assignment(&self, work_no: WorkNo) -> RepoResult<Option<Assignment>> {
        let assignment = self
            .conn
            .query_row(
                &format!("{ASSIGNMENT_SELECT_SQL} WHERE work_no = ?1;"),
                [work_no],
                parse_assignment_row,
            )
            .optional()?;
        Ok(assignment)
    }

    fn list_assignments(&self, page: PageWindow) -> RepoResult<Vec<Assignment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ASSIGNMENT_SELECT_SQL} ORDER BY work_no ASC LIMIT ?1 OFFSET ?2;"
        ))?;
        let assignments = stmt
            .query_map([page.limit, page.offset], parse_assignment_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(assignments)
    }

    fn list_hours_by_employee(&self, page: PageWindow) -> RepoResult<Vec<EmployeeHours>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                w.emp_no AS emp_no,
                e.first_name AS first_name,
                e.last_name AS last_name,
                SUM(w.hours_worked) AS total_hours
             FROM works_on w
             INNER JOIN employees e ON e.emp_no = w.emp_no
             GROUP BY w.emp_no, e.first_name, e.last_name
             ORDER BY w.emp_no ASC
             LIMIT ?1 OFFSET ?2;",
        )?;

        let mut rows = stmt.query([page.limit, page.offset])?;
        let mut report = Vec::new();
        while let Some(row) = rows.next()? {
            let emp_no: EmpNo = row.get("emp_no")?;
            let first_name: String = row.get("first_name")?;
            let last_name: String = row.get("last_name")?;
            report.push(EmployeeHours {
                emp_no,
                name: format!("{first_name} {last_name}"),
                total_hours: row.get("total_hours")?,
                projects: load_project_names_for_employee(self.conn, emp_no)?,
            });
        }

        Ok(report)
    }
}

fn load_project_names_for_employee(conn: &Connection, emp_no: EmpNo) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT p.name
         FROM works_on w
         INNER JOIN projects p ON p.proj_no = w.proj_no
         WHERE w.emp_no = ?1
         ORDER BY p.name ASC;",
    )?;
    let names = stmt
        .query_map([emp_no], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

fn parse_assignment_row(row: &Row<'_>) -> rusqlite::Result<Assignment> {
    Ok(Assignment {
        work_no: row.get("work_no")?,
        emp_no: row.get("emp_no")?,
        proj_no: row.get("proj_no")?,
        date_worked: row.get("date_worked")?,
        hours_worked: row.get("hours_worked")?,
    })
}
