#![allow(dead_code)]

use mediatek_core::db::open_db_in_memory;
use mediatek_core::{
    DbResult, Executor, ProcedureCall, ProcedureOutcome, Record, Statement,
};
use rusqlite::Connection;
use std::cell::RefCell;

/// Opens a migrated in-memory database with a small catalog.
pub fn seeded_db() -> Connection {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO genre (id, libelle) VALUES
            ('10000', 'Humour'),
            ('10001', 'Bande dessinée'),
            ('10002', 'Science Fiction');
        INSERT INTO public (id, libelle) VALUES
            ('00001', 'Jeunesse'),
            ('00002', 'Adultes'),
            ('00003', 'Tous publics');
        INSERT INTO rayon (id, libelle) VALUES
            ('LV001', 'Littérature étrangère'),
            ('DV001', 'Films'),
            ('PR001', 'Presse');
        INSERT INTO document (id, titre, image, idRayon, idPublic, idGenre) VALUES
            ('00001', 'Quand sort la recluse', '', 'LV001', '00002', '10000'),
            ('00002', 'Anna et le roi', '', 'LV001', '00003', '10001'),
            ('20001', 'Star Wars 5', '', 'DV001', '00003', '10002'),
            ('10001', 'Arts Magazine', '', 'PR001', '00002', '10000'),
            ('10002', 'Le Monde', '', 'PR001', '00002', '10000');
        INSERT INTO livres_dvd (id) VALUES ('00001'), ('00002'), ('20001');
        INSERT INTO livre (id, ISBN, auteur, collection) VALUES
            ('00001', '1234569877896', 'Fred Vargas', 'Commissaire Adamsberg'),
            ('00002', '', 'Victoria Hislop', '');
        INSERT INTO dvd (id, synopsis, realisateur, duree) VALUES
            ('20001', 'Luc est gelé.', 'Irvin Kershner', 124);
        INSERT INTO revue (id, periodicite, delaiMiseADispo) VALUES
            ('10001', 'MS', 52),
            ('10002', 'QT', 5);
        INSERT INTO exemplaire (id, numero, dateAchat, photo, idEtat) VALUES
            ('10001', 1, '2026-01-10', '', '00001'),
            ('10001', 2, '2026-03-05', '', '00002'),
            ('00001', 1, '2025-11-01', '', '00001');",
    )
    .unwrap();
    conn
}

pub fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

/// Executor double that records every request and answers with canned data.
pub struct RecordingExecutor {
    pub statements: RefCell<Vec<Statement>>,
    pub calls: RefCell<Vec<ProcedureCall>>,
    pub rows: Vec<Record>,
    pub affected: usize,
    pub outcome: ProcedureOutcome,
}

impl Default for RecordingExecutor {
    fn default() -> Self {
        Self {
            statements: RefCell::new(Vec::new()),
            calls: RefCell::new(Vec::new()),
            rows: Vec::new(),
            affected: 1,
            outcome: ProcedureOutcome::Applied(1),
        }
    }
}

impl RecordingExecutor {
    pub fn request_count(&self) -> usize {
        self.statements.borrow().len() + self.calls.borrow().len()
    }

    pub fn last_statement(&self) -> Statement {
        self.statements
            .borrow()
            .last()
            .cloned()
            .expect("a statement should have been executed")
    }
}

impl Executor for RecordingExecutor {
    fn query(&self, statement: &Statement) -> DbResult<Vec<Record>> {
        self.statements.borrow_mut().push(statement.clone());
        Ok(self.rows.clone())
    }

    fn update(&self, statement: &Statement) -> DbResult<usize> {
        self.statements.borrow_mut().push(statement.clone());
        Ok(self.affected)
    }

    fn call(&self, call: &ProcedureCall) -> DbResult<ProcedureOutcome> {
        self.calls.borrow_mut().push(call.clone());
        Ok(self.outcome.clone())
    }
}
