//! Data-access layer for the MediaTek library catalog.
//!
//! Translates generic CRUD requests (table identifier + field map) into
//! parametrized SQL, routing a handful of tables to bespoke join reads and
//! multi-table procedure writes.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod sql;

pub use config::{AccessConfig, ConfigError};
pub use db::{
    open_db, open_db_in_memory, DbError, DbResult, Executor, ProcedureOutcome, SqliteExecutor,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::table::Table;
pub use model::value::{field_map, FieldMap, Record, Value};
pub use repo::registry::HandlerRegistry;
pub use repo::{RepoError, RepoResult};
pub use service::access_service::AccessService;
pub use sql::{ProcedureCall, Statement};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
