//! Orders, document orders and magazine subscriptions.
//!
//! # Responsibility
//! - Read document orders and subscriptions of one document.
//! - Write document orders and subscriptions through stored procedures so
//!   `commande` and its subtype row change together.
//! - Report subscriptions that end within the next 30 days.
//!
//! # Invariants
//! - Procedure calls are only issued once every required key is present.
//! - Procedure verdicts are taken from the procedure itself: `Applied(n)`
//!   yields `Ok(n)` and `Rejected` yields `RepoError::Rejected`.

use super::{require_fields, require_key, RepoError, RepoResult};
use crate::db::procedures::{
    INSERT_ABONNEMENT, INSERT_COMMANDE_DOCUMENT, UPDATE_COMMANDE_DOCUMENT,
};
use crate::db::{Executor, ProcedureOutcome};
use crate::model::value::{field_map, FieldMap, Record, Value};
use crate::sql::{ProcedureCall, Statement};
use chrono::{Days, Local, NaiveDate};

/// Length of the subscription expiration window.
pub const EXPIRATION_WINDOW_DAYS: u64 = 30;

/// Source of the current calendar date.
pub type Clock = fn() -> NaiveDate;

/// Request key to procedure argument, in procedure argument order.
type ArgMapping = &'static [(&'static str, &'static str)];

const INSERT_COMMANDE_DOCUMENT_ARGS: ArgMapping = &[
    ("Id", "id"),
    ("DateCommande", "dateCommande"),
    ("Montant", "montant"),
    ("NbExemplaire", "nbExemplaire"),
    ("IdLivreDvd", "idLivreDvd"),
    ("IdSuivi", "idSuivi"),
];

const UPDATE_COMMANDE_DOCUMENT_ARGS: ArgMapping = &[
    ("Id", "id"),
    ("DateCommande", "dateCommande"),
    ("NbExemplaire", "nbExemplaire"),
    ("Montant", "montant"),
    ("IdSuivi", "idSuivi"),
];

const INSERT_ABONNEMENT_ARGS: ArgMapping = &[
    ("Id", "id"),
    ("DateCommande", "dateCommande"),
    ("Montant", "montant"),
    ("DateFinAbonnement", "dateFinAbonnement"),
    ("IdRevue", "idRevue"),
];

/// Orders of one book or dvd, newest first. Reads filter key `id`.
pub fn commandes_document_statement(filter: Option<&FieldMap>) -> RepoResult<Statement> {
    let id = require_key(filter, "id")?;
    Ok(Statement::with_params(
        "SELECT cd.id, cd.nbExemplaire, cd.idLivreDvd, cd.idSuivi, \
         c.dateCommande, c.montant, s.libelle AS suivi \
         FROM commandedocument cd JOIN commande c ON cd.id = c.id \
         JOIN suivi s ON s.id = cd.idSuivi \
         WHERE cd.idLivreDvd = :idLivreDvd \
         ORDER BY c.dateCommande DESC",
        field_map([("idLivreDvd", id.clone())]),
    ))
}

pub fn select_commandes_document(
    executor: &dyn Executor,
    _table: &str,
    filter: Option<&FieldMap>,
) -> RepoResult<Vec<Record>> {
    Ok(executor.query(&commandes_document_statement(filter)?)?)
}

/// Creates the `commande` and `commandedocument` rows of a new order.
pub fn insert_commande_document(
    executor: &dyn Executor,
    _table: &str,
    fields: Option<&FieldMap>,
) -> RepoResult<usize> {
    let call = procedure_call(
        INSERT_COMMANDE_DOCUMENT,
        fields,
        INSERT_COMMANDE_DOCUMENT_ARGS,
    )?;
    run_procedure(executor, &call)
}

/// Updates both rows of a document order. The order is named by the `Id`
/// field; the separate row identifier is not used.
pub fn update_commande_document(
    executor: &dyn Executor,
    _table: &str,
    _id: Option<&str>,
    fields: Option<&FieldMap>,
) -> RepoResult<usize> {
    let call = procedure_call(
        UPDATE_COMMANDE_DOCUMENT,
        fields,
        UPDATE_COMMANDE_DOCUMENT_ARGS,
    )?;
    run_procedure(executor, &call)
}

/// Every order, whatever its subtype.
pub fn select_all_commandes(
    executor: &dyn Executor,
    _table: &str,
    _filter: Option<&FieldMap>,
) -> RepoResult<Vec<Record>> {
    Ok(executor.query(&Statement::new("SELECT * FROM commande"))?)
}

/// Subscriptions of one magazine, newest first. Reads filter key `id`.
pub fn abonnements_statement(filter: Option<&FieldMap>) -> RepoResult<Statement> {
    let id = require_key(filter, "id")?;
    Ok(Statement::with_params(
        "SELECT c.id, c.dateCommande, c.montant, a.dateFinAbonnement, a.idRevue \
         FROM commande c JOIN abonnement a ON c.id = a.id \
         WHERE a.idRevue = :idRevue \
         ORDER BY c.dateCommande DESC",
        field_map([("idRevue", id.clone())]),
    ))
}

pub fn select_abonnements(
    executor: &dyn Executor,
    _table: &str,
    filter: Option<&FieldMap>,
) -> RepoResult<Vec<Record>> {
    Ok(executor.query(&abonnements_statement(filter)?)?)
}

/// Creates the `commande` and `abonnement` rows of a new subscription.
pub fn insert_abonnement(
    executor: &dyn Executor,
    _table: &str,
    fields: Option<&FieldMap>,
) -> RepoResult<usize> {
    let call = procedure_call(INSERT_ABONNEMENT, fields, INSERT_ABONNEMENT_ARGS)?;
    run_procedure(executor, &call)
}

/// Inclusive `[today, today + 30 days]` window.
pub fn expiration_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let end = today
        .checked_add_days(Days::new(EXPIRATION_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MAX);
    (today, end)
}

/// Magazines whose subscription ends within the window, soonest first.
///
/// End dates are compared by calendar day, so a stored time of day never
/// pushes the last day out of the window.
pub fn expiration_statement(today: NaiveDate) -> Statement {
    let (start, end) = expiration_window(today);
    Statement::with_params(
        "SELECT d.titre, a.dateFinAbonnement \
         FROM document d JOIN abonnement a ON d.id = a.idRevue \
         JOIN commande c ON c.id = a.id \
         WHERE date(a.dateFinAbonnement) BETWEEN :debut AND :fin \
         ORDER BY a.dateFinAbonnement ASC",
        field_map([
            ("debut", Value::from(format_date(start))),
            ("fin", Value::from(format_date(end))),
        ]),
    )
}

/// Handler for the expiration report, reading today's date from `clock`.
/// Any filter is ignored.
pub fn expiration_reader(
    clock: Clock,
) -> impl Fn(&dyn Executor, &str, Option<&FieldMap>) -> RepoResult<Vec<Record>> + Send + Sync {
    move |executor: &dyn Executor, _table: &str, _filter: Option<&FieldMap>| {
        Ok(executor.query(&expiration_statement(clock()))?)
    }
}

/// Local calendar date.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn procedure_call(
    procedure: &'static str,
    fields: Option<&FieldMap>,
    mapping: ArgMapping,
) -> RepoResult<ProcedureCall> {
    let fields = require_fields(fields)?;
    let mut call = ProcedureCall::new(procedure);
    for (key, arg) in mapping {
        let value = fields.get(*key).ok_or(RepoError::MissingField(*key))?;
        call = call.arg(*arg, value.clone());
    }
    Ok(call)
}

fn run_procedure(executor: &dyn Executor, call: &ProcedureCall) -> RepoResult<usize> {
    match executor.call(call)? {
        ProcedureOutcome::Applied(count) => Ok(count),
        ProcedureOutcome::Rejected(reason) => Err(RepoError::Rejected {
            procedure: call.name(),
            reason,
        }),
    }
}
