//! Opaque scalar values, field maps and result rows.
//!
//! # Responsibility
//! - Carry caller-supplied column values to the execution boundary untouched.
//! - Carry result columns back to callers in a serializable shape.
//!
//! # Invariants
//! - `FieldMap` iteration order is the key order, so rendered SQL is stable
//!   for a given map.
//! - JSON `null`, booleans, numbers, strings and byte arrays map onto `Value`
//!   without any schema lookup.
//! - Integers are never widened to `Real`; integers beyond `i64` are kept as
//!   their decimal text.

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Column name to value mapping supplied by callers (filters and write sets).
pub type FieldMap = BTreeMap<String, Value>;

/// One result row keyed by column label.
pub type Record = BTreeMap<String, Value>;

/// Scalar bound as a statement parameter or read back from a result column.
///
/// `Bool` binds as SQLite integer 0/1 and never comes back from a read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the text payload, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Returns the integer payload, if this is an integer value.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Bool(value) => Some(i64::from(*value)),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Self::Real(value) => Some(*value),
            Self::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Real(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
            Self::Blob(value) => write!(f, "<blob {} bytes>", value.len()),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("null, a boolean, a number, a string or an array of bytes")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Value, E> {
        Ok(Value::Bool(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Value, E> {
        Ok(Value::Integer(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Value, E> {
        // Out-of-range integers keep every digit as text.
        Ok(i64::try_from(value).map_or_else(|_| Value::Text(value.to_string()), Value::Integer))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Value, E> {
        Ok(Value::Real(value))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Value, E> {
        Ok(Value::Text(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Value, E> {
        Ok(Value::Text(value))
    }

    fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<Value, E> {
        Ok(Value::Blob(value.to_vec()))
    }

    fn visit_byte_buf<E: de::Error>(self, value: Vec<u8>) -> Result<Value, E> {
        Ok(Value::Blob(value))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut bytes = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(byte) = seq.next_element::<u8>()? {
            bytes.push(byte);
        }
        Ok(Value::Blob(bytes))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Blob(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Builds a `FieldMap` from `(column, value)` pairs.
///
/// Later pairs overwrite earlier ones with the same column.
pub fn field_map<K, V, I>(pairs: I) -> FieldMap
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{field_map, FieldMap, Value};

    #[test]
    fn json_object_deserializes_into_field_map() {
        let fields: FieldMap = serde_json::from_str(
            r#"{"id":"00017","montant":12.5,"nbExemplaire":3,"photo":null}"#,
        )
        .expect("field map should deserialize");

        assert_eq!(fields["id"], Value::Text("00017".to_string()));
        assert_eq!(fields["montant"], Value::Real(12.5));
        assert_eq!(fields["nbExemplaire"], Value::Integer(3));
        assert!(fields["photo"].is_null());
    }

    #[test]
    fn record_serializes_as_flat_json_object() {
        let record = field_map([("id", Value::from("00001")), ("numero", Value::from(4))]);
        let json = serde_json::to_string(&record).expect("record should serialize");
        assert_eq!(json, r#"{"id":"00001","numero":4}"#);
    }

    #[test]
    fn json_booleans_are_accepted() {
        let fields: FieldMap = serde_json::from_str(r#"{"actif":true,"archive":false}"#)
            .expect("booleans should deserialize");

        assert_eq!(fields["actif"], Value::Bool(true));
        assert_eq!(fields["archive"].as_integer(), Some(0));
        assert_eq!(
            serde_json::to_string(&fields).unwrap(),
            r#"{"actif":true,"archive":false}"#
        );
    }

    #[test]
    fn integers_beyond_i64_keep_every_digit() {
        let fields: FieldMap = serde_json::from_str(
            r#"{"max":9223372036854775807,"n":18446744073709551615,"neg":-5}"#,
        )
        .unwrap();

        assert_eq!(fields["max"], Value::Integer(i64::MAX));
        assert_eq!(fields["n"], Value::Text("18446744073709551615".to_string()));
        assert_eq!(fields["neg"], Value::Integer(-5));
    }

    #[test]
    fn byte_arrays_become_blobs() {
        let fields: FieldMap = serde_json::from_str(r#"{"photo":[137,80,78,71]}"#).unwrap();
        assert_eq!(fields["photo"], Value::Blob(vec![137, 80, 78, 71]));
        assert!(serde_json::from_str::<FieldMap>(r#"{"photo":[300]}"#).is_err());
        assert!(serde_json::from_str::<FieldMap>(r#"{"nested":{"a":1}}"#).is_err());
    }

    #[test]
    fn optional_values_map_to_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".to_string()));
    }
}
