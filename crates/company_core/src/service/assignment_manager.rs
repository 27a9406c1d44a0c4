//! Works-on assignment manager.
//!
//! Assignments only need both ends to exist; the same employee may book the
//! same project on the same date more than once.

use super::{logged_write, EntityKind, ServiceError, ServiceResult};
use crate::model::assignment::{Assignment, AssignmentDraft, WorkNo};
use crate::model::report::EmployeeHours;
use crate::repo::assignment_repo::{AssignmentRepository, SqliteAssignmentRepository};
use crate::repo::reference::{ReferenceResolver, SqliteReferenceResolver};
use crate::repo::{PageWindow, RepoResult};
use rusqlite::Connection;

/// Use-case facade for works-on assignments.
pub struct AssignmentManager<R: AssignmentRepository, V: ReferenceResolver> {
    repo: R,
    refs: V,
}

impl<'conn> AssignmentManager<SqliteAssignmentRepository<'conn>, SqliteReferenceResolver<'conn>> {
    /// Builds a manager over one migrated SQLite connection.
    pub fn try_from_connection(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self::new(
            SqliteAssignmentRepository::try_new(conn)?,
            SqliteReferenceResolver::try_new(conn)?,
        ))
    }
}

impl<R: AssignmentRepository, V: ReferenceResolver> AssignmentManager<R, V> {
    pub fn new(repo: R, refs: V) -> Self {
        Self { repo, refs }
    }

    pub fn add_assignment(&self, draft: &AssignmentDraft) -> ServiceResult<Assignment> {
        logged_write(
            "assignment_add",
            |assignment: &Assignment| assignment.work_no,
            || {
                draft.validate()?;
                self.ensure_references(draft)?;
                Ok(self.repo.create_assignment(draft)?)
            },
        )
    }

    pub fn update_assignment(
        &self,
        work_no: WorkNo,
        draft: &AssignmentDraft,
    ) -> ServiceResult<Assignment> {
        logged_write(
            "assignment_update",
            |assignment: &Assignment| assignment.work_no,
            || {
                draft.validate()?;
                self.ensure_references(draft)?;
                self.repo
                    .replace_assignment(work_no, draft)?
                    .ok_or_else(|| ServiceError::not_found(EntityKind::Assignment, work_no))
            },
        )
    }

    pub fn delete_assignment(&self, work_no: WorkNo) -> ServiceResult<()> {
        logged_write(
            "assignment_delete",
            |_: &()| work_no,
            || {
                if !self.repo.delete_assignment(work_no)? {
                    return Err(ServiceError::not_found(EntityKind::Assignment, work_no));
                }
                Ok(())
            },
        )
    }

    pub fn get_by_id(&self, work_no: WorkNo) -> ServiceResult<Option<Assignment>> {
        Ok(self.repo.get_assignment(work_no)?)
    }

    /// Assignments in `work_no` order.
    pub fn list_page(&self, page_number: i64) -> ServiceResult<Vec<Assignment>> {
        Ok(self
            .repo
            .list_assignments(PageWindow::for_page(page_number))?)
    }

    /// Total hours and distinct project names per employee, in `emp_no`
    /// order. Employees without assignments are not listed.
    pub fn get_total_hours_per_employee(
        &self,
        page_number: i64,
    ) -> ServiceResult<Vec<EmployeeHours>> {
        Ok(self
            .repo
            .list_hours_by_employee(PageWindow::for_page(page_number))?)
    }

    // Project first, then employee.
    fn ensure_references(&self, draft: &AssignmentDraft) -> ServiceResult<()> {
        if !self.refs.project_exists(draft.proj_no)? {
            return Err(ServiceError::ReferentialIntegrity(format!(
                "invalid project id {}",
                draft.proj_no
            )));
        }
        if !self.refs.employee_exists(draft.emp_no)? {
            return Err(ServiceError::ReferentialIntegrity(format!(
                "invalid employee id {}",
                draft.emp_no
            )));
        }
        Ok(())
    }
}
