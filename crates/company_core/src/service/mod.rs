//! Entity managers: business rules over the persistence collaborator.
//!
//! # Responsibility
//! - Validate cross-entity references and name uniqueness before writes.
//! - Expose paginated listings and reports per entity.
//! - Report every failure through one `ServiceError` type.
//!
//! # Invariants
//! - Managers never talk to each other; shared checks go through
//!   `ReferenceResolver`.
//! - Every write is logged once, as `status=ok`, `status=rejected` or
//!   `status=error`.

pub mod assignment_manager;
pub mod department_manager;
pub mod employee_manager;
mod error;
pub mod project_manager;
mod session;

pub use error::{EntityKind, ServiceError, ServiceResult};
pub use session::CompanySession;

use log::{error, info, warn};

/// Runs one write and logs its outcome as a single event.
pub(crate) fn logged_write<T>(
    event: &'static str,
    key_of: impl FnOnce(&T) -> i64,
    write: impl FnOnce() -> ServiceResult<T>,
) -> ServiceResult<T> {
    let result = write();
    match &result {
        Ok(value) => info!("event={event} module=service status=ok key={}", key_of(value)),
        Err(ServiceError::Repo(err)) => {
            error!("event={event} module=service status=error error={err}")
        }
        Err(err) => warn!(
            "event={event} module=service status=rejected reason={}",
            err.kind()
        ),
    }
    result
}
