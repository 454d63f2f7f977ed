//! Typed routing from table identifiers to operation handlers.
//!
//! # Responsibility
//! - Hold one handler per (table, operation kind) with bespoke behavior.
//! - Leave every other pair to the generic single-table operations.
//!
//! # Invariants
//! - Identifiers are matched exactly through `Table::parse`.
//! - A missing entry always means "use the generic operation"; callers add
//!   special cases by registering a route, not by branching inline.

use super::catalog_repo::{self, DVD_JOIN, LIVRE_JOIN, REVUE_JOIN};
use super::order_repo::{self, Clock};
use super::RepoResult;
use crate::db::Executor;
use crate::model::table::Table;
use crate::model::value::{FieldMap, Record};
use std::collections::BTreeMap;
use std::sync::Arc;

pub type ReadHandler =
    Arc<dyn Fn(&dyn Executor, &str, Option<&FieldMap>) -> RepoResult<Vec<Record>> + Send + Sync>;

pub type WriteHandler =
    Arc<dyn Fn(&dyn Executor, &str, Option<&FieldMap>) -> RepoResult<usize> + Send + Sync>;

pub type UpdateHandler = Arc<
    dyn Fn(&dyn Executor, &str, Option<&str>, Option<&FieldMap>) -> RepoResult<usize>
        + Send
        + Sync,
>;

/// Per-operation route tables.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    reads: BTreeMap<Table, ReadHandler>,
    inserts: BTreeMap<Table, WriteHandler>,
    updates: BTreeMap<Table, UpdateHandler>,
    deletes: BTreeMap<Table, WriteHandler>,
}

impl HandlerRegistry {
    /// Registry without bespoke routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Library catalog routes, dating the expiration report with the local clock.
    pub fn catalog() -> Self {
        Self::catalog_with_clock(order_repo::local_today)
    }

    /// Library catalog routes with an explicit date source.
    pub fn catalog_with_clock(clock: Clock) -> Self {
        let mut registry = Self::new();
        for table in Table::LOOKUPS {
            registry.route_read(table, catalog_repo::select_lookup);
        }
        registry
            .route_read(Table::Livre, LIVRE_JOIN.reader())
            .route_read(Table::Dvd, DVD_JOIN.reader())
            .route_read(Table::Revue, REVUE_JOIN.reader())
            .route_read(Table::Exemplaire, catalog_repo::select_exemplaires)
            .route_read(Table::CommandeDocument, order_repo::select_commandes_document)
            .route_read(Table::Commandes, order_repo::select_all_commandes)
            .route_read(Table::Abonnement, order_repo::select_abonnements)
            .route_read(Table::Expiration, order_repo::expiration_reader(clock));

        registry
            .route_insert(Table::CommandeDocument, order_repo::insert_commande_document)
            .route_insert(Table::Abonnement, order_repo::insert_abonnement)
            .route_update(Table::CommandeDocument, order_repo::update_commande_document);

        registry
    }

    pub fn route_read<H>(&mut self, table: Table, handler: H) -> &mut Self
    where
        H: Fn(&dyn Executor, &str, Option<&FieldMap>) -> RepoResult<Vec<Record>>
            + Send
            + Sync
            + 'static,
    {
        self.reads.insert(table, Arc::new(handler));
        self
    }

    pub fn route_insert<H>(&mut self, table: Table, handler: H) -> &mut Self
    where
        H: Fn(&dyn Executor, &str, Option<&FieldMap>) -> RepoResult<usize> + Send + Sync + 'static,
    {
        self.inserts.insert(table, Arc::new(handler));
        self
    }

    pub fn route_update<H>(&mut self, table: Table, handler: H) -> &mut Self
    where
        H: Fn(&dyn Executor, &str, Option<&str>, Option<&FieldMap>) -> RepoResult<usize>
            + Send
            + Sync
            + 'static,
    {
        self.updates.insert(table, Arc::new(handler));
        self
    }

    pub fn route_delete<H>(&mut self, table: Table, handler: H) -> &mut Self
    where
        H: Fn(&dyn Executor, &str, Option<&FieldMap>) -> RepoResult<usize> + Send + Sync + 'static,
    {
        self.deletes.insert(table, Arc::new(handler));
        self
    }

    /// Bespoke read handler for `table`, or `None` for the generic read.
    pub fn read_route(&self, table: &str) -> Option<&ReadHandler> {
        Table::parse(table).and_then(|table| self.reads.get(&table))
    }

    pub fn insert_route(&self, table: &str) -> Option<&WriteHandler> {
        Table::parse(table).and_then(|table| self.inserts.get(&table))
    }

    pub fn update_route(&self, table: &str) -> Option<&UpdateHandler> {
        Table::parse(table).and_then(|table| self.updates.get(&table))
    }

    pub fn delete_route(&self, table: &str) -> Option<&WriteHandler> {
        Table::parse(table).and_then(|table| self.deletes.get(&table))
    }

    /// Tables with a bespoke read, in declaration order.
    pub fn routed_reads(&self) -> Vec<Table> {
        self.reads.keys().copied().collect()
    }
}
