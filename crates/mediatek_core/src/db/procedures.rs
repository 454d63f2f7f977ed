//! Stored-procedure bodies for multi-table order writes.
//!
//! SQLite has no `CALL`, so the executor resolves procedure names against
//! this table and runs the body inside a transaction. A body either returns
//! `Applied` (the transaction commits) or `Rejected` (it rolls back).
//!
//! # Invariants
//! - The `commande` row and its subtype row are written together or not at all.
//! - Business checks run before the first write.

use super::executor::ProcedureOutcome;
use crate::model::value::Value;
use crate::sql::ProcedureCall;
use rusqlite::{params, Connection, OptionalExtension};

pub const INSERT_COMMANDE_DOCUMENT: &str = "insert_commande_document";
pub const UPDATE_COMMANDE_DOCUMENT: &str = "update_commande_document";
pub const INSERT_ABONNEMENT: &str = "insert_abonnement";

pub type ProcedureBody = fn(&Connection, &ProcedureCall) -> rusqlite::Result<ProcedureOutcome>;

const PROCEDURES: &[(&str, ProcedureBody)] = &[
    (INSERT_COMMANDE_DOCUMENT, insert_commande_document),
    (UPDATE_COMMANDE_DOCUMENT, update_commande_document),
    (INSERT_ABONNEMENT, insert_abonnement),
];

/// Returns the body registered under `name`.
pub fn lookup_procedure(name: &str) -> Option<ProcedureBody> {
    PROCEDURES
        .iter()
        .find(|(registered, _)| *registered == name)
        .map(|(_, body)| *body)
}

fn insert_commande_document(
    conn: &Connection,
    call: &ProcedureCall,
) -> rusqlite::Result<ProcedureOutcome> {
    let id = arg(call, "id")?;
    let id_livre_dvd = arg(call, "idLivreDvd")?;
    let id_suivi = arg(call, "idSuivi")?;

    if exists(conn, "SELECT 1 FROM commande WHERE id = ?1", id)? {
        return Ok(rejected("order id already exists"));
    }
    if !exists(conn, "SELECT 1 FROM livres_dvd WHERE id = ?1", id_livre_dvd)? {
        return Ok(rejected("ordered document is not a book or a dvd"));
    }
    if !exists(conn, "SELECT 1 FROM suivi WHERE id = ?1", id_suivi)? {
        return Ok(rejected("unknown tracking status"));
    }

    conn.execute(
        "INSERT INTO commande (id, dateCommande, montant) VALUES (?1, ?2, ?3)",
        params![id, arg(call, "dateCommande")?, arg(call, "montant")?],
    )?;
    conn.execute(
        "INSERT INTO commandedocument (id, nbExemplaire, idLivreDvd, idSuivi)
         VALUES (?1, ?2, ?3, ?4)",
        params![id, arg(call, "nbExemplaire")?, id_livre_dvd, id_suivi],
    )?;

    Ok(ProcedureOutcome::Applied(1))
}

fn update_commande_document(
    conn: &Connection,
    call: &ProcedureCall,
) -> rusqlite::Result<ProcedureOutcome> {
    let id = arg(call, "id")?;
    let id_suivi = arg(call, "idSuivi")?;

    if !exists(conn, "SELECT 1 FROM commandedocument WHERE id = ?1", id)? {
        return Ok(ProcedureOutcome::Applied(0));
    }
    if !exists(conn, "SELECT 1 FROM suivi WHERE id = ?1", id_suivi)? {
        return Ok(rejected("unknown tracking status"));
    }

    conn.execute(
        "UPDATE commande SET dateCommande = ?1, montant = ?2 WHERE id = ?3",
        params![arg(call, "dateCommande")?, arg(call, "montant")?, id],
    )?;
    conn.execute(
        "UPDATE commandedocument SET nbExemplaire = ?1, idSuivi = ?2 WHERE id = ?3",
        params![arg(call, "nbExemplaire")?, id_suivi, id],
    )?;

    Ok(ProcedureOutcome::Applied(1))
}

fn insert_abonnement(conn: &Connection, call: &ProcedureCall) -> rusqlite::Result<ProcedureOutcome> {
    let id = arg(call, "id")?;
    let id_revue = arg(call, "idRevue")?;

    if exists(conn, "SELECT 1 FROM commande WHERE id = ?1", id)? {
        return Ok(rejected("order id already exists"));
    }
    if !exists(conn, "SELECT 1 FROM revue WHERE id = ?1", id_revue)? {
        return Ok(rejected("subscribed document is not a magazine"));
    }

    conn.execute(
        "INSERT INTO commande (id, dateCommande, montant) VALUES (?1, ?2, ?3)",
        params![id, arg(call, "dateCommande")?, arg(call, "montant")?],
    )?;
    conn.execute(
        "INSERT INTO abonnement (id, dateFinAbonnement, idRevue) VALUES (?1, ?2, ?3)",
        params![id, arg(call, "dateFinAbonnement")?, id_revue],
    )?;

    Ok(ProcedureOutcome::Applied(1))
}

fn arg<'a>(call: &'a ProcedureCall, name: &str) -> rusqlite::Result<&'a Value> {
    call.get(name)
        .ok_or_else(|| rusqlite::Error::InvalidParameterName(format!(":{name}")))
}

fn exists(conn: &Connection, sql: &str, key: &Value) -> rusqlite::Result<bool> {
    let found = conn
        .query_row(sql, [key], |row| row.get::<_, i64>(0))
        .optional()?;
    Ok(found.is_some())
}

fn rejected(reason: &str) -> ProcedureOutcome {
    ProcedureOutcome::Rejected(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::{lookup_procedure, INSERT_ABONNEMENT};

    #[test]
    fn lookup_is_exact() {
        assert!(lookup_procedure(INSERT_ABONNEMENT).is_some());
        assert!(lookup_procedure("INSERT_ABONNEMENT").is_none());
    }
}
