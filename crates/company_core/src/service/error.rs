use crate::model::RecordValidationError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Record type named in `ServiceError::NotFound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Employee,
    Department,
    Project,
    Assignment,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Employee => "employee",
            Self::Department => "department",
            Self::Project => "project",
            Self::Assignment => "assignment",
        };
        f.write_str(name)
    }
}

/// Failure of a manager operation.
#[derive(Debug)]
pub enum ServiceError {
    /// Draft has a shape problem (blank name, bad hours).
    Validation(RecordValidationError),
    /// Reference does not resolve, or a relationship rule would break.
    ReferentialIntegrity(String),
    /// Name or name pair is already taken.
    Uniqueness(String),
    /// Write is well-formed but not allowed in the current state.
    BusinessRule(String),
    /// Update/delete target does not exist.
    NotFound { entity: EntityKind, id: i64 },
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl ServiceError {
    /// Stable short name of the variant, used in log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::ReferentialIntegrity(_) => "referential_integrity",
            Self::Uniqueness(_) => "uniqueness",
            Self::BusinessRule(_) => "business_rule",
            Self::NotFound { .. } => "not_found",
            Self::Repo(_) => "repo",
        }
    }

    pub(crate) fn not_found(entity: EntityKind, id: i64) -> Self {
        Self::NotFound { entity, id }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ReferentialIntegrity(message) => {
                write!(f, "referential integrity violation: {message}")
            }
            Self::Uniqueness(message) => write!(f, "uniqueness violation: {message}"),
            Self::BusinessRule(message) => write!(f, "business rule violation: {message}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RecordValidationError> for ServiceError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    // Constraint failures mean a concurrent writer got past the pre-checks;
    // they surface as the same typed errors the pre-checks raise.
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::UniqueConstraint(detail) => Self::Uniqueness(detail),
            RepoError::ForeignKeyConstraint(detail) => Self::ReferentialIntegrity(detail),
            other => Self::Repo(other),
        }
    }
}
