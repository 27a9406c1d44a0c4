use super::assignment_manager::AssignmentManager;
use super::department_manager::DepartmentManager;
use super::employee_manager::EmployeeManager;
use super::project_manager::ProjectManager;
use crate::repo::assignment_repo::SqliteAssignmentRepository;
use crate::repo::department_repo::SqliteDepartmentRepository;
use crate::repo::employee_repo::SqliteEmployeeRepository;
use crate::repo::project_repo::SqliteProjectRepository;
use crate::repo::reference::SqliteReferenceResolver;
use crate::repo::RepoResult;
use rusqlite::Connection;

/// The four managers bound to one borrowed connection.
///
/// The session lives no longer than the connection it borrows; callers open
/// one connection per unit of work and build a session over it.
pub struct CompanySession<'conn> {
    pub employees: EmployeeManager<SqliteEmployeeRepository<'conn>, SqliteReferenceResolver<'conn>>,
    pub departments:
        DepartmentManager<SqliteDepartmentRepository<'conn>, SqliteReferenceResolver<'conn>>,
    pub projects: ProjectManager<SqliteProjectRepository<'conn>, SqliteReferenceResolver<'conn>>,
    pub assignments:
        AssignmentManager<SqliteAssignmentRepository<'conn>, SqliteReferenceResolver<'conn>>,
}

impl<'conn> CompanySession<'conn> {
    /// Binds all managers to `conn`. The connection must be fully migrated.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self {
            employees: EmployeeManager::try_from_connection(conn)?,
            departments: DepartmentManager::try_from_connection(conn)?,
            projects: ProjectManager::try_from_connection(conn)?,
            assignments: AssignmentManager::try_from_connection(conn)?,
        })
    }
}
