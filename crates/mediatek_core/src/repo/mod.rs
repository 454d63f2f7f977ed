//! Table operations behind the dispatcher.
//!
//! # Responsibility
//! - Provide the generic single-table read/insert/update/delete operations.
//! - Provide bespoke handlers for joined reads and multi-table writes.
//! - Map table identifiers to handlers per operation kind.
//!
//! # Invariants
//! - Contract violations are detected before any statement reaches the
//!   executor.
//! - A write that matched nothing is `Ok(0)`, never an error.

use crate::db::DbError;
use crate::model::value::{FieldMap, Value};
use crate::sql::InvalidIdentifier;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod catalog_repo;
pub mod order_repo;
pub mod registry;
pub mod table_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Failure of one access-layer operation.
#[derive(Debug)]
pub enum RepoError {
    /// A required field map was missing or empty.
    EmptyFields,
    /// An update was requested without a row identifier.
    MissingId,
    /// A bespoke handler did not receive one of its required keys.
    MissingField(&'static str),
    InvalidIdentifier(InvalidIdentifier),
    /// A stored procedure's own checks refused the write.
    Rejected {
        procedure: &'static str,
        reason: String,
    },
    Db(DbError),
}

impl RepoError {
    /// Stable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyFields => "empty_fields",
            Self::MissingId => "missing_id",
            Self::MissingField(_) => "missing_field",
            Self::InvalidIdentifier(_) => "invalid_identifier",
            Self::Rejected { .. } => "procedure_rejected",
            Self::Db(_) => "db_error",
        }
    }

    /// Whether the caller broke the request contract (no round-trip happened).
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::EmptyFields | Self::MissingId | Self::MissingField(_) | Self::InvalidIdentifier(_)
        )
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyFields => write!(f, "field map is missing or empty"),
            Self::MissingId => write!(f, "row identifier is missing"),
            Self::MissingField(name) => write!(f, "required field `{name}` is missing"),
            Self::InvalidIdentifier(err) => write!(f, "{err}"),
            Self::Rejected { procedure, reason } => {
                write!(f, "procedure `{procedure}` rejected the write: {reason}")
            }
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidIdentifier(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::EmptyFields
            | Self::MissingId
            | Self::MissingField(_)
            | Self::Rejected { .. } => None,
        }
    }
}

impl From<InvalidIdentifier> for RepoError {
    fn from(value: InvalidIdentifier) -> Self {
        Self::InvalidIdentifier(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Returns the map when it is present and non-empty.
pub(crate) fn require_fields(fields: Option<&FieldMap>) -> RepoResult<&FieldMap> {
    match fields {
        Some(fields) if !fields.is_empty() => Ok(fields),
        _ => Err(RepoError::EmptyFields),
    }
}

/// Returns the value stored under `key` in a non-empty map.
pub(crate) fn require_key<'a>(
    fields: Option<&'a FieldMap>,
    key: &'static str,
) -> RepoResult<&'a Value> {
    require_fields(fields)?
        .get(key)
        .ok_or(RepoError::MissingField(key))
}
