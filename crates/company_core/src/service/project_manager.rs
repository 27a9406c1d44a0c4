//! Project manager.
//!
//! # Invariants
//! - Every project belongs to an existing department.
//! - Project names are unique; renaming a project to its own name is allowed.

use super::{logged_write, EntityKind, ServiceError, ServiceResult};
use crate::model::department::DeptNo;
use crate::model::project::{ProjNo, Project};
use crate::model::report::ProjectSummary;
use crate::model::require_text;
use crate::repo::project_repo::{ProjectRepository, SqliteProjectRepository};
use crate::repo::reference::{RecordKey, ReferenceResolver, SqliteReferenceResolver};
use crate::repo::{PageWindow, RepoResult};
use rusqlite::Connection;

/// Use-case facade for projects.
pub struct ProjectManager<R: ProjectRepository, V: ReferenceResolver> {
    repo: R,
    refs: V,
}

impl<'conn> ProjectManager<SqliteProjectRepository<'conn>, SqliteReferenceResolver<'conn>> {
    /// Builds a manager over one migrated SQLite connection.
    pub fn try_from_connection(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self::new(
            SqliteProjectRepository::try_new(conn)?,
            SqliteReferenceResolver::try_new(conn)?,
        ))
    }
}

impl<R: ProjectRepository, V: ReferenceResolver> ProjectManager<R, V> {
    pub fn new(repo: R, refs: V) -> Self {
        Self { repo, refs }
    }

    pub fn add_project(&self, name: &str, dept_no: DeptNo) -> ServiceResult<Project> {
        logged_write(
            "project_add",
            |project: &Project| project.proj_no,
            || {
                require_text("name", name)?;
                self.ensure_department_exists(dept_no)?;
                if self.refs.project_named(name)?.is_some() {
                    return Err(duplicate_name(name));
                }
                Ok(self.repo.create_project(name, dept_no)?)
            },
        )
    }

    pub fn update_project(
        &self,
        proj_no: ProjNo,
        name: &str,
        dept_no: DeptNo,
    ) -> ServiceResult<Project> {
        logged_write(
            "project_update",
            |project: &Project| project.proj_no,
            || {
                require_text("name", name)?;
                self.ensure_department_exists(dept_no)?;
                if !self.refs.project_exists(proj_no)? {
                    return Err(ServiceError::not_found(EntityKind::Project, proj_no));
                }
                if let Some(owner) = self.refs.project_named(name)? {
                    if owner != proj_no {
                        return Err(duplicate_name(name));
                    }
                }
                self.repo
                    .replace_project(proj_no, name, dept_no)?
                    .ok_or_else(|| ServiceError::not_found(EntityKind::Project, proj_no))
            },
        )
    }

    /// Deletes a project nobody has booked hours on.
    pub fn delete_project(&self, proj_no: ProjNo) -> ServiceResult<()> {
        logged_write(
            "project_delete",
            |_: &()| proj_no,
            || {
                if !self.refs.project_exists(proj_no)? {
                    return Err(ServiceError::not_found(EntityKind::Project, proj_no));
                }
                let blocking = self.refs.blocking_references(RecordKey::Project(proj_no))?;
                if let Some(rows) = blocking.first() {
                    return Err(ServiceError::ReferentialIntegrity(format!(
                        "project {proj_no} is still referenced by {} row(s) in `{}`",
                        rows.count, rows.table
                    )));
                }
                if !self.repo.delete_project(proj_no)? {
                    return Err(ServiceError::not_found(EntityKind::Project, proj_no));
                }
                Ok(())
            },
        )
    }

    pub fn get_by_id(&self, proj_no: ProjNo) -> ServiceResult<Option<Project>> {
        Ok(self.repo.get_project(proj_no)?)
    }

    pub fn list_page(&self, page_number: i64) -> ServiceResult<Vec<Project>> {
        Ok(self.repo.list_projects(PageWindow::for_page(page_number))?)
    }

    /// Projects owned by any department named in `department_names`.
    ///
    /// See [`crate::model::project::DEFAULT_PROJECT_DEPARTMENTS`] for the
    /// usual allow-list.
    pub fn get_projects_by_department_names(
        &self,
        page_number: i64,
        department_names: &[&str],
    ) -> ServiceResult<Vec<ProjectSummary>> {
        Ok(self
            .repo
            .list_by_department_names(department_names, PageWindow::for_page(page_number))?)
    }

    /// Projects without a single works-on row.
    pub fn get_projects_with_no_assignments(
        &self,
        page_number: i64,
    ) -> ServiceResult<Vec<Project>> {
        Ok(self.repo.list_unassigned(PageWindow::for_page(page_number))?)
    }

    fn ensure_department_exists(&self, dept_no: DeptNo) -> ServiceResult<()> {
        if !self.refs.department_exists(dept_no)? {
            return Err(ServiceError::ReferentialIntegrity(format!(
                "invalid department id {dept_no}"
            )));
        }
        Ok(())
    }
}

fn duplicate_name(name: &str) -> ServiceError {
    ServiceError::Uniqueness(format!("project name `{name}` already exists"))
}
