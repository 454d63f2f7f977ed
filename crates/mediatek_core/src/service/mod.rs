//! Caller-facing dispatch.
//!
//! # Responsibility
//! - Route select/insert/update/delete requests by table identifier.
//! - Keep callers decoupled from handler selection and SQL details.

pub mod access_service;
