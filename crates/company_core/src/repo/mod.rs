//! Persistence collaborator for company records.
//!
//! # Responsibility
//! - Define per-entity repository contracts (lookup, existence, filtered and
//!   paginated listing, insert/replace/delete).
//! - Keep every SQL statement inside this module tree.
//! - Translate SQLite constraint failures into semantic repository errors.
//!
//! # Invariants
//! - Repositories only accept connections migrated to the latest schema.
//! - Every write is a single statement and commits atomically on its own.
//! - Repositories never enforce business rules; managers do.

pub mod assignment_repo;
pub mod department_repo;
pub mod employee_repo;
mod error;
mod page;
pub mod project_repo;
pub mod reference;
mod schema;

pub use error::{RepoError, RepoResult};
pub use page::{PageWindow, PAGE_SIZE};
