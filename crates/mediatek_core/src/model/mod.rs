//! Request and result shapes shared by the access layer.
//!
//! # Responsibility
//! - Define the opaque scalar carried by field maps and result rows.
//! - Name the table identifiers that have bespoke routing.
//!
//! # Invariants
//! - Field values are never inspected or coerced; they are bound as-is.
//! - Table identifiers match case-sensitively.

pub mod table;
pub mod value;
