//! Statement builder and rendered statement types.

use crate::model::value::{FieldMap, Value};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

static IDENTIFIER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex must compile")
});

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r":([A-Za-z_][A-Za-z0-9_]*)").expect("placeholder regex must compile")
});

/// Table or column name rejected before SQL rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidIdentifier(pub String);

impl Display for InvalidIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid SQL identifier `{}`", self.0)
    }
}

impl Error for InvalidIdentifier {}

/// Checks that `name` is a plain SQL identifier.
pub fn validate_identifier(name: &str) -> Result<&str, InvalidIdentifier> {
    if IDENTIFIER_RE.is_match(name) {
        Ok(name)
    } else {
        Err(InvalidIdentifier(name.to_string()))
    }
}

/// SQL text plus the named parameters it binds.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    params: FieldMap,
}

impl Statement {
    /// Statement without parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: FieldMap::new(),
        }
    }

    pub fn with_params(sql: impl Into<String>, params: FieldMap) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &FieldMap {
        &self.params
    }

    /// Re-parses the rendered text and returns the placeholder names it uses.
    pub fn placeholders(&self) -> BTreeSet<String> {
        PLACEHOLDER_RE
            .captures_iter(&self.sql)
            .map(|caps| caps[1].to_string())
            .collect()
    }

    /// Whether placeholders and parameters match one to one.
    pub fn is_fully_bound(&self) -> bool {
        let bound: BTreeSet<String> = self.params.keys().cloned().collect();
        self.placeholders() == bound
    }
}

/// Accumulates SQL text and bound parameters.
///
/// Lists are joined with their separator instead of being trimmed after the
/// fact, so no trailing `,` or `AND` can leak into the output.
#[derive(Debug, Default)]
pub struct StatementBuilder {
    sql: String,
    params: FieldMap,
}

impl StatementBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_str(&mut self, s: impl AsRef<str>) -> &mut Self {
        self.sql.push_str(s.as_ref());
        self
    }

    /// Pushes a validated identifier.
    pub fn push_identifier(&mut self, name: &str) -> Result<&mut Self, InvalidIdentifier> {
        self.sql.push_str(validate_identifier(name)?);
        Ok(self)
    }

    /// Pushes `:name` and binds `value` under `name`.
    pub fn push_param(
        &mut self,
        name: &str,
        value: Value,
    ) -> Result<&mut Self, InvalidIdentifier> {
        let name = validate_identifier(name)?;
        self.sql.push(':');
        self.sql.push_str(name);
        self.params.insert(name.to_string(), value);
        Ok(self)
    }

    /// Pushes the items of `iter` separated by `sep`.
    pub fn push_iter<T, F>(
        &mut self,
        iter: impl IntoIterator<Item = T>,
        sep: &str,
        mut mapping: F,
    ) -> Result<&mut Self, InvalidIdentifier>
    where
        F: FnMut(&mut Self, T) -> Result<(), InvalidIdentifier>,
    {
        for (index, item) in iter.into_iter().enumerate() {
            if index > 0 {
                self.sql.push_str(sep);
            }
            mapping(self, item)?;
        }
        Ok(self)
    }

    /// Pushes `col=:col` for every entry, separated by `sep`.
    pub fn push_assignments(
        &mut self,
        fields: &FieldMap,
        sep: &str,
    ) -> Result<&mut Self, InvalidIdentifier> {
        self.push_iter(fields, sep, |builder, (column, value)| {
            builder.push_identifier(column)?;
            builder.push_str("=");
            builder.push_param(column, value.clone())?;
            Ok(())
        })
    }

    pub fn build(self) -> Statement {
        Statement {
            sql: self.sql,
            params: self.params,
        }
    }
}

/// Call of a named stored procedure with ordered named arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureCall {
    name: &'static str,
    args: Vec<(&'static str, Value)>,
}

impl ProcedureCall {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, name: &'static str, value: Value) -> Self {
        self.args.push((name, value));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Argument value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.args
            .iter()
            .find(|(arg, _)| *arg == name)
            .map(|(_, value)| value)
    }

    pub fn arg_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.args.iter().map(|(name, _)| *name)
    }

    /// Renders the call as `CALL name(:a, :b, ...)` with its parameter map.
    pub fn to_statement(&self) -> Statement {
        let placeholders = self
            .args
            .iter()
            .map(|(name, _)| format!(":{name}"))
            .collect::<Vec<_>>()
            .join(", ");
        let params = self
            .args
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        Statement::with_params(format!("CALL {}({placeholders})", self.name), params)
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_identifier, ProcedureCall, Statement, StatementBuilder};
    use crate::model::value::{field_map, Value};

    #[test]
    fn identifiers_accept_plain_names_only() {
        assert!(validate_identifier("dateCommande").is_ok());
        assert!(validate_identifier("_id2").is_ok());
        assert!(validate_identifier("2id").is_err());
        assert!(validate_identifier("id; DROP TABLE commande").is_err());
        assert!(validate_identifier("d.titre").is_err());
        assert!(validate_identifier("").is_err());
    }

    #[test]
    fn assignments_are_joined_without_trailing_separator() {
        let fields = field_map([("b", 2), ("a", 1)]);
        let mut builder = StatementBuilder::new();
        builder.push_str("WHERE ");
        builder
            .push_assignments(&fields, " AND ")
            .expect("identifiers are valid");
        let statement = builder.build();

        assert_eq!(statement.sql(), "WHERE a=:a AND b=:b");
        assert_eq!(statement.params(), &fields);
        assert!(statement.is_fully_bound());
    }

    #[test]
    fn placeholders_are_reparsed_from_text() {
        let statement = Statement::with_params(
            "SELECT * FROM commande WHERE id = :id AND montant > :montant",
            field_map([("id", "c1")]),
        );
        let placeholders: Vec<String> = statement.placeholders().into_iter().collect();
        assert_eq!(placeholders, vec!["id".to_string(), "montant".to_string()]);
        assert!(!statement.is_fully_bound());
    }

    #[test]
    fn procedure_call_renders_ordered_arguments() {
        let call = ProcedureCall::new("insert_abonnement")
            .arg("id", Value::from("c9"))
            .arg("idRevue", Value::from("10001"));
        let statement = call.to_statement();

        assert_eq!(statement.sql(), "CALL insert_abonnement(:id, :idRevue)");
        assert!(statement.is_fully_bound());
        assert_eq!(call.get("idRevue"), Some(&Value::from("10001")));
        assert_eq!(call.get("montant"), None);
    }
}
