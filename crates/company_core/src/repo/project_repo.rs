//! Project repository contract and SQLite implementation.
//!
//! # Invariants
//! - Listings are ordered by `proj_no ASC`.
//! - Department-name filtering is exact and case-sensitive.

use super::schema::ensure_schema_ready;
use super::{PageWindow, RepoResult};
use crate::model::department::DeptNo;
use crate::model::project::{ProjNo, Project};
use crate::model::report::ProjectSummary;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const PROJECT_SELECT_SQL: &str = "SELECT proj_no, name, dept_no FROM projects";

/// Repository interface for project persistence.
pub trait ProjectRepository {
    fn create_project(&self, name: &str, dept_no: DeptNo) -> RepoResult<Project>;
    /// Replaces name and department. `None` when the row does not exist.
    fn replace_project(
        &self,
        proj_no: ProjNo,
        name: &str,
        dept_no: DeptNo,
    ) -> RepoResult<Option<Project>>;
    /// Removes one row. `false` when the row does not exist.
    fn delete_project(&self, proj_no: ProjNo) -> RepoResult<bool>;
    fn get_project(&self, proj_no: ProjNo) -> RepoResult<Option<Project>>;
    fn list_projects(&self, page: PageWindow) -> RepoResult<Vec<Project>>;
    /// Projects owned by a department whose name is in `department_names`.
    fn list_by_department_names(
        &self,
        department_names: &[&str],
        page: PageWindow,
    ) -> RepoResult<Vec<ProjectSummary>>;
    /// Projects no works-on row points at.
    fn list_unassigned(&self, page: PageWindow) -> RepoResult<Vec<Project>>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, &["projects", "departments", "works_on"])?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, name: &str, dept_no: DeptNo) -> RepoResult<Project> {
        self.conn.execute(
            "INSERT INTO projects (name, dept_no) VALUES (?1, ?2);",
            params![name, dept_no],
        )?;

        Ok(Project {
            proj_no: self.conn.last_insert_rowid(),
            name: name.to_string(),
            dept_no,
        })
    }

    fn replace_project(
        &self,
        proj_no: ProjNo,
        name: &str,
        dept_no: DeptNo,
    ) -> RepoResult<Option<Project>> {
        let changed = self.conn.execute(
            "UPDATE projects SET name = ?2, dept_no = ?3 WHERE proj_no = ?1;",
            params![proj_no, name, dept_no],
        )?;

        if changed == 0 {
            return Ok(None);
        }
        Ok(Some(Project {
            proj_no,
            name: name.to_string(),
            dept_no,
        }))
    }

    fn delete_project(&self, proj_no: ProjNo) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE proj_no = ?1;", [proj_no])?;
        Ok(changed > 0)
    }

    fn get_project(&self, proj_no: ProjNo) -> RepoResult<Option<Project>> {
        let project = self
            .conn
            .query_row(
                &format!("{PROJECT_SELECT_SQL} WHERE proj_no = ?1;"),
                [proj_no],
                parse_project_row,
            )
            .optional()?;
        Ok(project)
    }

    fn list_projects(&self, page: PageWindow) -> RepoResult<Vec<Project>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PROJECT_SELECT_SQL} ORDER BY proj_no ASC LIMIT ?1 OFFSET ?2;"
        ))?;
        let projects = stmt
            .query_map([page.limit, page.offset], parse_project_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(projects)
    }

    fn list_by_department_names(
        &self,
        department_names: &[&str],
        page: PageWindow,
    ) -> RepoResult<Vec<ProjectSummary>> {
        if department_names.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; department_names.len()].join(", ");
        let sql = format!(
            "SELECT
                p.proj_no AS proj_no,
                p.dept_no AS dept_no,
                p.name AS name,
                d.name AS department_name
             FROM projects p
             INNER JOIN departments d ON d.dept_no = p.dept_no
             WHERE d.name IN ({placeholders})
             ORDER BY p.proj_no ASC
             LIMIT ? OFFSET ?;"
        );
        let mut bind_values: Vec<Value> = department_names
            .iter()
            .map(|name| Value::Text((*name).to_string()))
            .collect();
        bind_values.push(Value::Integer(page.limit));
        bind_values.push(Value::Integer(page.offset));

        let mut stmt = self.conn.prepare(&sql)?;
        let summaries = stmt
            .query_map(params_from_iter(bind_values), |row| {
                Ok(ProjectSummary {
                    proj_no: row.get("proj_no")?,
                    dept_no: row.get("dept_no")?,
                    name: row.get("name")?,
                    department_name: row.get("department_name")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(summaries)
    }

    fn list_unassigned(&self, page: PageWindow) -> RepoResult<Vec<Project>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PROJECT_SELECT_SQL}
             WHERE NOT EXISTS (
                SELECT 1 FROM works_on w WHERE w.proj_no = projects.proj_no
             )
             ORDER BY proj_no ASC
             LIMIT ?1 OFFSET ?2;"
        ))?;
        let projects = stmt
            .query_map([page.limit, page.offset], parse_project_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(projects)
    }
}

fn parse_project_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        proj_no: row.get("proj_no")?,
        name: row.get("name")?,
        dept_no: row.get("dept_no")?,
    })
}
