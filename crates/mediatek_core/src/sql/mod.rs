//! Parametrized SQL construction.
//!
//! # Responsibility
//! - Render statement text with `:name` placeholders from caller field maps.
//! - Keep the placeholder set and the bound parameter map in lockstep.
//!
//! # Invariants
//! - Every placeholder in a rendered statement has exactly one parameter
//!   entry, and every parameter entry is referenced by a placeholder.
//! - Caller-supplied identifiers are validated before they reach SQL text.

mod builder;

pub use builder::{
    validate_identifier, InvalidIdentifier, ProcedureCall, Statement, StatementBuilder,
};
