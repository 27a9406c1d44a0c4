//! Core domain logic for company records.
//! This crate is the single source of truth for referential and uniqueness
//! rules over employees, departments, projects and works-on assignments.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig, DatabaseLocation};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::assignment::{Assignment, AssignmentDraft, WorkNo};
pub use model::department::{Department, DeptNo};
pub use model::employee::{EmpNo, Employee, EmployeeDraft, Sex};
pub use model::project::{ProjNo, Project, DEFAULT_PROJECT_DEPARTMENTS};
pub use model::report::{DepartmentHeadcount, EmployeeHours, ProjectSummary};
pub use model::RecordValidationError;
pub use repo::{PageWindow, RepoError, RepoResult, PAGE_SIZE};
pub use service::assignment_manager::AssignmentManager;
pub use service::department_manager::DepartmentManager;
pub use service::employee_manager::EmployeeManager;
pub use service::project_manager::ProjectManager;
pub use service::{CompanySession, EntityKind, ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
