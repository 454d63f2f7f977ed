//! Dispatcher over generic and bespoke table operations.
//!
//! # Responsibility
//! - Pick the handler registered for (operation kind, table), falling back to
//!   the generic single-table operation.
//! - Emit one metadata-only `dispatch` event per request.
//!
//! # Invariants
//! - Field values never appear in log events.
//! - The service keeps no state between calls besides the executor and the
//!   route table.

use crate::db::Executor;
use crate::model::value::{FieldMap, Record};
use crate::repo::registry::HandlerRegistry;
use crate::repo::{table_repo, RepoError, RepoResult};
use crate::sql::validate_identifier;
use log::{error, info, warn};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Generic,
    Bespoke,
}

impl Route {
    fn as_str(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Bespoke => "bespoke",
        }
    }
}

/// Entry point translating (operation, table, fields) requests into SQL.
pub struct AccessService<E: Executor> {
    executor: E,
    registry: HandlerRegistry,
}

impl<E: Executor> AccessService<E> {
    /// Creates a service with the library catalog routes.
    pub fn new(executor: E) -> Self {
        Self::with_registry(executor, HandlerRegistry::catalog())
    }

    pub fn with_registry(executor: E, registry: HandlerRegistry) -> Self {
        Self { executor, registry }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    fn executor_dyn(&self) -> &dyn Executor {
        &self.executor
    }

    /// Reads rows of `table`.
    ///
    /// # Contract
    /// - Generic tables: `None` or an empty filter reads every row; otherwise
    ///   every filter entry becomes an equality conjunct.
    /// - Bespoke tables define their own filter keys (see `repo`).
    pub fn select(&self, table: &str, filter: Option<&FieldMap>) -> RepoResult<Vec<Record>> {
        let started_at = Instant::now();
        let (route, result) = match self.registry.read_route(table) {
            Some(handler) => (Route::Bespoke, handler(self.executor_dyn(), table, filter)),
            None => (
                Route::Generic,
                table_repo::select_rows(self.executor_dyn(), table, filter),
            ),
        };
        log_dispatch("select", table, route, started_at, result.as_ref().map(Vec::len));
        result
    }

    /// Inserts into `table`.
    ///
    /// # Contract
    /// - Returns the affected-row count; `Ok(0)` means nothing was written.
    /// - A missing or empty field map is rejected before execution.
    pub fn insert(&self, table: &str, fields: Option<&FieldMap>) -> RepoResult<usize> {
        let started_at = Instant::now();
        let (route, result) = match self.registry.insert_route(table) {
            Some(handler) => (Route::Bespoke, handler(self.executor_dyn(), table, fields)),
            None => (
                Route::Generic,
                table_repo::insert_row(self.executor_dyn(), table, fields),
            ),
        };
        log_dispatch("insert", table, route, started_at, result.as_ref().copied());
        result
    }

    /// Updates rows of `table`.
    ///
    /// # Contract
    /// - Generic tables: `id` is required and authoritative over any `id`
    ///   entry in `fields`.
    /// - `Ok(0)` means no row matched.
    pub fn update(
        &self,
        table: &str,
        id: Option<&str>,
        fields: Option<&FieldMap>,
    ) -> RepoResult<usize> {
        let started_at = Instant::now();
        let (route, result) = match self.registry.update_route(table) {
            Some(handler) => (Route::Bespoke, handler(self.executor_dyn(), table, id, fields)),
            None => (
                Route::Generic,
                table_repo::update_row(self.executor_dyn(), table, id, fields),
            ),
        };
        log_dispatch("update", table, route, started_at, result.as_ref().copied());
        result
    }

    /// Deletes rows of `table` matching every filter entry.
    ///
    /// An empty filter is rejected; whole-table deletes are never issued.
    pub fn delete(&self, table: &str, filter: Option<&FieldMap>) -> RepoResult<usize> {
        let started_at = Instant::now();
        let (route, result) = match self.registry.delete_route(table) {
            Some(handler) => (Route::Bespoke, handler(self.executor_dyn(), table, filter)),
            None => (
                Route::Generic,
                table_repo::delete_rows(self.executor_dyn(), table, filter),
            ),
        };
        log_dispatch("delete", table, route, started_at, result.as_ref().copied());
        result
    }
}

fn log_dispatch(
    op: &str,
    table: &str,
    route: Route,
    started_at: Instant,
    outcome: Result<usize, &RepoError>,
) {
    let table = validate_identifier(table).unwrap_or("<invalid>");
    let duration_ms = started_at.elapsed().as_millis();
    match outcome {
        Ok(count) => info!(
            "event=dispatch module=access op={op} table={table} route={} status=ok count={count} duration_ms={duration_ms}",
            route.as_str()
        ),
        Err(err) if matches!(err, RepoError::Db(_)) => error!(
            "event=dispatch module=access op={op} table={table} route={} status=error duration_ms={duration_ms} error_code={} error={err}",
            route.as_str(),
            err.code()
        ),
        Err(err) => warn!(
            "event=dispatch module=access op={op} table={table} route={} status=rejected duration_ms={duration_ms} error_code={}",
            route.as_str(),
            err.code()
        ),
    }
}
