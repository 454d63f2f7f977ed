//! Statement execution boundary and its SQLite implementation.
//!
//! # Responsibility
//! - Define the contract the access layer uses to run rendered statements.
//! - Bind `:name` placeholders from a field map with `rusqlite`.
//! - Run stored-procedure bodies atomically and report their own verdict.
//!
//! # Invariants
//! - Each call uses only the borrowed connection; no statement state is kept
//!   between calls.
//! - A rejected procedure leaves no partial writes behind.

use super::procedures::lookup_procedure;
use super::{DbError, DbResult};
use crate::model::value::{Record, Value};
use crate::sql::{ProcedureCall, Statement};
use log::debug;
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{Connection, ToSql};

/// Verdict of a stored-procedure call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcedureOutcome {
    /// The procedure committed and reports this many logical rows.
    Applied(usize),
    /// The procedure's own checks refused the call; nothing was written.
    Rejected(String),
}

/// Runs rendered statements against a relational store.
pub trait Executor {
    /// Executes a read and returns every row.
    fn query(&self, statement: &Statement) -> DbResult<Vec<Record>>;
    /// Executes a write and returns the affected-row count.
    fn update(&self, statement: &Statement) -> DbResult<usize>;
    /// Invokes a stored procedure.
    fn call(&self, call: &ProcedureCall) -> DbResult<ProcedureOutcome>;
}

/// SQLite-backed executor over a borrowed connection.
pub struct SqliteExecutor<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteExecutor<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl Executor for SqliteExecutor<'_> {
    fn query(&self, statement: &Statement) -> DbResult<Vec<Record>> {
        let mut stmt = self.conn.prepare(statement.sql())?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let names = placeholder_names(statement);
        let bound = named_params(&names, statement);
        let mut rows = stmt.query(bound.as_slice())?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            let mut record = Record::new();
            for (index, column) in columns.iter().enumerate() {
                record.insert(column.clone(), Value::from(row.get_ref(index)?));
            }
            records.push(record);
        }

        debug!(
            "event=db_query module=db status=ok rows={} params={}",
            records.len(),
            statement.params().len()
        );
        Ok(records)
    }

    fn update(&self, statement: &Statement) -> DbResult<usize> {
        let names = placeholder_names(statement);
        let bound = named_params(&names, statement);
        let changed = self.conn.execute(statement.sql(), bound.as_slice())?;

        debug!(
            "event=db_update module=db status=ok changed={} params={}",
            changed,
            statement.params().len()
        );
        Ok(changed)
    }

    fn call(&self, call: &ProcedureCall) -> DbResult<ProcedureOutcome> {
        let body = lookup_procedure(call.name())
            .ok_or_else(|| DbError::UnknownProcedure(call.name().to_string()))?;

        let tx = self.conn.unchecked_transaction()?;
        let outcome = body(&tx, call)?;
        match &outcome {
            ProcedureOutcome::Applied(_) => tx.commit()?,
            ProcedureOutcome::Rejected(_) => tx.rollback()?,
        }

        debug!(
            "event=procedure_call module=db procedure={} status={}",
            call.name(),
            match &outcome {
                ProcedureOutcome::Applied(_) => "applied",
                ProcedureOutcome::Rejected(_) => "rejected",
            }
        );
        Ok(outcome)
    }
}

fn placeholder_names(statement: &Statement) -> Vec<String> {
    statement
        .params()
        .keys()
        .map(|name| format!(":{name}"))
        .collect()
}

fn named_params<'a>(
    names: &'a [String],
    statement: &'a Statement,
) -> Vec<(&'a str, &'a dyn ToSql)> {
    names
        .iter()
        .zip(statement.params().values())
        .map(|(name, value)| (name.as_str(), value as &dyn ToSql))
        .collect()
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let value = match self {
            Self::Null => ValueRef::Null,
            Self::Bool(value) => ValueRef::Integer(i64::from(*value)),
            Self::Integer(value) => ValueRef::Integer(*value),
            Self::Real(value) => ValueRef::Real(*value),
            Self::Text(value) => ValueRef::Text(value.as_bytes()),
            Self::Blob(value) => ValueRef::Blob(value.as_slice()),
        };
        Ok(ToSqlOutput::Borrowed(value))
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Self::Null,
            ValueRef::Integer(value) => Self::Integer(value),
            ValueRef::Real(value) => Self::Real(value),
            ValueRef::Text(bytes) => Self::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => Self::Blob(bytes.to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Executor, ProcedureOutcome, SqliteExecutor};
    use crate::db::{open_db_in_memory, DbError};
    use crate::model::value::{field_map, Value};
    use crate::sql::{ProcedureCall, Statement};

    #[test]
    fn binds_named_parameters_and_reads_typed_columns() {
        let conn = open_db_in_memory().unwrap();
        let executor = SqliteExecutor::new(&conn);

        let insert = Statement::with_params(
            "INSERT INTO commande (id, dateCommande, montant) VALUES (:id, :dateCommande, :montant)",
            field_map([
                ("id", Value::from("c1")),
                ("dateCommande", Value::from("2026-01-02")),
                ("montant", Value::from(42.5)),
            ]),
        );
        assert_eq!(executor.update(&insert).unwrap(), 1);

        let rows = executor
            .query(&Statement::with_params(
                "SELECT * FROM commande WHERE id = :id",
                field_map([("id", "c1")]),
            ))
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["montant"], Value::Real(42.5));
        assert_eq!(rows[0]["dateCommande"], Value::from("2026-01-02"));
    }

    #[test]
    fn booleans_bind_as_integers() {
        let conn = open_db_in_memory().unwrap();
        let executor = SqliteExecutor::new(&conn);

        let rows = executor
            .query(&Statement::with_params(
                "SELECT :enabled AS enabled, :disabled AS disabled",
                field_map([("enabled", true), ("disabled", false)]),
            ))
            .unwrap();
        assert_eq!(rows[0]["enabled"], Value::Integer(1));
        assert_eq!(rows[0]["disabled"], Value::Integer(0));
    }

    #[test]
    fn syntax_errors_surface_as_db_errors() {
        let conn = open_db_in_memory().unwrap();
        let executor = SqliteExecutor::new(&conn);

        let err = executor
            .query(&Statement::new("SELECT * FROM missing_table"))
            .unwrap_err();
        assert!(matches!(err, DbError::Sqlite(_)));
    }

    #[test]
    fn unknown_procedure_is_reported() {
        let conn = open_db_in_memory().unwrap();
        let executor = SqliteExecutor::new(&conn);

        let err = executor
            .call(&ProcedureCall::new("drop_everything"))
            .unwrap_err();
        assert!(matches!(err, DbError::UnknownProcedure(name) if name == "drop_everything"));
    }

    #[test]
    fn rejected_procedure_leaves_no_rows() {
        let conn = open_db_in_memory().unwrap();
        let executor = SqliteExecutor::new(&conn);

        let call = ProcedureCall::new("insert_abonnement")
            .arg("id", Value::from("a1"))
            .arg("dateCommande", Value::from("2026-01-02"))
            .arg("montant", Value::from(10.0))
            .arg("dateFinAbonnement", Value::from("2027-01-02"))
            .arg("idRevue", Value::from("no-such-revue"));
        let outcome = executor.call(&call).unwrap();
        assert!(matches!(outcome, ProcedureOutcome::Rejected(_)));

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM commande", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
