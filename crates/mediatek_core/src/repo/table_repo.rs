//! Generic single-table operations.
//!
//! # Responsibility
//! - Render `SELECT`/`INSERT`/`UPDATE`/`DELETE` for any table from a field map.
//! - Hand rendered statements to the executor.
//!
//! # Invariants
//! - The parameter map equals the caller's map (plus `id` for updates).
//! - `DELETE` without a filter is never rendered.
//! - For updates the `id` argument is authoritative; an `id` entry inside
//!   the field map is left out of the `SET` list.

use super::{require_fields, RepoError, RepoResult};
use crate::db::Executor;
use crate::model::value::{FieldMap, Record, Value};
use crate::sql::{Statement, StatementBuilder};
use log::warn;

/// Column that identifies the row targeted by an update.
pub const ID_COLUMN: &str = "id";

/// `SELECT * FROM table [WHERE k1=:k1 AND ...]`.
pub fn select_statement(table: &str, filter: Option<&FieldMap>) -> RepoResult<Statement> {
    let mut builder = StatementBuilder::new();
    builder.push_str("SELECT * FROM ").push_identifier(table)?;
    if let Some(filter) = filter.filter(|filter| !filter.is_empty()) {
        builder.push_str(" WHERE ").push_assignments(filter, " AND ")?;
    }
    Ok(builder.build())
}

/// `INSERT INTO table (c1,...) VALUES (:c1,...)`.
pub fn insert_statement(table: &str, fields: Option<&FieldMap>) -> RepoResult<Statement> {
    let fields = require_fields(fields)?;
    let mut builder = StatementBuilder::new();
    builder.push_str("INSERT INTO ").push_identifier(table)?;
    builder.push_str(" (");
    builder.push_iter(fields.keys(), ",", |builder, column| {
        builder.push_identifier(column)?;
        Ok(())
    })?;
    builder.push_str(") VALUES (");
    builder.push_iter(fields, ",", |builder, (column, value)| {
        builder.push_param(column, value.clone())?;
        Ok(())
    })?;
    builder.push_str(")");
    Ok(builder.build())
}

/// `UPDATE table SET c1=:c1,... WHERE id=:id`.
pub fn update_statement(
    table: &str,
    id: Option<&str>,
    fields: Option<&FieldMap>,
) -> RepoResult<Statement> {
    let fields = require_fields(fields)?;
    let id = id.ok_or(RepoError::MissingId)?;

    let set: FieldMap = fields
        .iter()
        .filter(|(column, _)| column.as_str() != ID_COLUMN)
        .map(|(column, value)| (column.clone(), value.clone()))
        .collect();
    if set.is_empty() {
        return Err(RepoError::EmptyFields);
    }
    if set.len() != fields.len() {
        warn!("event=update_id_ignored module=repo status=ok reason=where_id_authoritative");
    }

    let mut builder = StatementBuilder::new();
    builder.push_str("UPDATE ").push_identifier(table)?;
    builder.push_str(" SET ").push_assignments(&set, ",")?;
    builder
        .push_str(" WHERE ")
        .push_identifier(ID_COLUMN)?
        .push_str("=")
        .push_param(ID_COLUMN, Value::from(id))?;
    Ok(builder.build())
}

/// `DELETE FROM table WHERE k1=:k1 AND ...`.
pub fn delete_statement(table: &str, filter: Option<&FieldMap>) -> RepoResult<Statement> {
    let filter = require_fields(filter)?;
    let mut builder = StatementBuilder::new();
    builder.push_str("DELETE FROM ").push_identifier(table)?;
    builder.push_str(" WHERE ").push_assignments(filter, " AND ")?;
    Ok(builder.build())
}

/// Reads rows of one table, optionally filtered by equality on every entry.
pub fn select_rows(
    executor: &dyn Executor,
    table: &str,
    filter: Option<&FieldMap>,
) -> RepoResult<Vec<Record>> {
    let statement = select_statement(table, filter)?;
    Ok(executor.query(&statement)?)
}

/// Inserts one row built from exactly the supplied fields.
pub fn insert_row(
    executor: &dyn Executor,
    table: &str,
    fields: Option<&FieldMap>,
) -> RepoResult<usize> {
    let statement = insert_statement(table, fields)?;
    Ok(executor.update(&statement)?)
}

/// Updates the row whose `id` equals `id`.
pub fn update_row(
    executor: &dyn Executor,
    table: &str,
    id: Option<&str>,
    fields: Option<&FieldMap>,
) -> RepoResult<usize> {
    let statement = update_statement(table, id, fields)?;
    Ok(executor.update(&statement)?)
}

/// Deletes rows matching every filter entry.
pub fn delete_rows(
    executor: &dyn Executor,
    table: &str,
    filter: Option<&FieldMap>,
) -> RepoResult<usize> {
    let statement = delete_statement(table, filter)?;
    Ok(executor.update(&statement)?)
}
