//! Catalog reads: dictionaries, document subtypes and copies.
//!
//! # Responsibility
//! - List id + `libelle` dictionary tables ordered by label.
//! - Join each document subtype with `document` and its three classification
//!   dictionaries.
//! - List the copies of one document.
//!
//! # Invariants
//! - Subtype joins share one statement shape; only the subtype table and its
//!   own columns vary.
//! - The copy listing binds only the document `id`, whatever else the filter
//!   carries.

use super::{require_key, RepoResult};
use crate::db::Executor;
use crate::model::value::{field_map, FieldMap, Record};
use crate::sql::{Statement, StatementBuilder};

/// Subtype-specific part of a catalog join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogJoin {
    /// Subtype table joined to `document` on `id`.
    pub subtype: &'static str,
    /// Subtype columns selected before the shared document columns.
    pub columns: &'static [&'static str],
    /// Subtype columns selected after `titre` and `image`.
    pub trailing_columns: &'static [&'static str],
}

pub const LIVRE_JOIN: CatalogJoin = CatalogJoin {
    subtype: "livre",
    columns: &["ISBN", "auteur"],
    trailing_columns: &["collection"],
};

pub const DVD_JOIN: CatalogJoin = CatalogJoin {
    subtype: "dvd",
    columns: &["duree", "realisateur"],
    trailing_columns: &["synopsis"],
};

pub const REVUE_JOIN: CatalogJoin = CatalogJoin {
    subtype: "revue",
    columns: &["periodicite"],
    trailing_columns: &["delaiMiseADispo"],
};

const CLASSIFICATION_COLUMNS: &str = "d.idrayon, d.idpublic, d.idgenre, \
g.libelle AS genre, p.libelle AS lePublic, r.libelle AS rayon";

const CLASSIFICATION_JOINS: &str = "JOIN genre g ON g.id = d.idGenre \
JOIN public p ON p.id = d.idPublic \
JOIN rayon r ON r.id = d.idRayon";

impl CatalogJoin {
    /// Renders the full-table join, ordered by title.
    pub fn statement(&self) -> Statement {
        let subtype_columns = |columns: &[&str]| {
            columns
                .iter()
                .map(|column| format!("l.{column}, "))
                .collect::<String>()
        };
        Statement::new(format!(
            "SELECT l.id, {}d.titre, d.image, {}{CLASSIFICATION_COLUMNS} \
             FROM {} l JOIN document d ON l.id = d.id \
             {CLASSIFICATION_JOINS} \
             ORDER BY titre",
            subtype_columns(self.columns),
            subtype_columns(self.trailing_columns),
            self.subtype,
        ))
    }

    /// Handler reading every row of this subtype.
    pub fn reader(
        self,
    ) -> impl Fn(&dyn Executor, &str, Option<&FieldMap>) -> RepoResult<Vec<Record>> + Send + Sync
    {
        move |executor: &dyn Executor, _table: &str, _filter: Option<&FieldMap>| {
            Ok(executor.query(&self.statement())?)
        }
    }
}

/// `SELECT * FROM table ORDER BY libelle`.
pub fn lookup_statement(table: &str) -> RepoResult<Statement> {
    let mut builder = StatementBuilder::new();
    builder
        .push_str("SELECT * FROM ")
        .push_identifier(table)?
        .push_str(" ORDER BY libelle");
    Ok(builder.build())
}

/// Lists an id + `libelle` dictionary. Filters are not supported.
pub fn select_lookup(
    executor: &dyn Executor,
    table: &str,
    _filter: Option<&FieldMap>,
) -> RepoResult<Vec<Record>> {
    Ok(executor.query(&lookup_statement(table)?)?)
}

/// Copies of one document, newest acquisition first.
pub fn exemplaires_statement(filter: Option<&FieldMap>) -> RepoResult<Statement> {
    let id = require_key(filter, "id")?;
    Ok(Statement::with_params(
        "SELECT e.id, e.numero, e.dateAchat, e.photo, e.idEtat \
         FROM exemplaire e JOIN document d ON e.id = d.id \
         WHERE e.id = :id \
         ORDER BY e.dateAchat DESC",
        field_map([("id", id.clone())]),
    ))
}

pub fn select_exemplaires(
    executor: &dyn Executor,
    _table: &str,
    filter: Option<&FieldMap>,
) -> RepoResult<Vec<Record>> {
    Ok(executor.query(&exemplaires_statement(filter)?)?)
}

#[cfg(test)]
mod tests {
    use super::{exemplaires_statement, lookup_statement, LIVRE_JOIN, REVUE_JOIN};
    use crate::model::value::{field_map, Value};
    use crate::repo::RepoError;

    #[test]
    fn subtype_join_selects_subtype_and_classification_columns() {
        let statement = LIVRE_JOIN.statement();
        assert_eq!(
            statement.sql(),
            "SELECT l.id, l.ISBN, l.auteur, d.titre, d.image, l.collection, \
             d.idrayon, d.idpublic, d.idgenre, \
             g.libelle AS genre, p.libelle AS lePublic, r.libelle AS rayon \
             FROM livre l JOIN document d ON l.id = d.id \
             JOIN genre g ON g.id = d.idGenre \
             JOIN public p ON p.id = d.idPublic \
             JOIN rayon r ON r.id = d.idRayon \
             ORDER BY titre"
        );
        assert!(statement.params().is_empty());
    }

    #[test]
    fn subtype_joins_differ_only_in_subtype_part() {
        let sql = REVUE_JOIN.statement().sql().to_string();
        assert!(
            sql.starts_with("SELECT l.id, l.periodicite, d.titre, d.image, l.delaiMiseADispo, ")
        );
        assert!(sql.contains("FROM revue l JOIN document d"));
    }

    #[test]
    fn lookup_orders_by_label() {
        let statement = lookup_statement("rayon").unwrap();
        assert_eq!(statement.sql(), "SELECT * FROM rayon ORDER BY libelle");
    }

    #[test]
    fn copy_listing_binds_only_document_id() {
        let filter = field_map([
            ("id", Value::from("7")),
            ("numero", Value::from(2)),
            ("photo", Value::Null),
        ]);
        let statement = exemplaires_statement(Some(&filter)).unwrap();

        assert_eq!(statement.params(), &field_map([("id", "7")]));
        assert!(statement.is_fully_bound());
    }

    #[test]
    fn copy_listing_requires_document_id() {
        assert!(matches!(
            exemplaires_statement(None),
            Err(RepoError::EmptyFields)
        ));
        let filter = field_map([("numero", 2)]);
        assert!(matches!(
            exemplaires_statement(Some(&filter)),
            Err(RepoError::MissingField("id"))
        ));
    }
}
