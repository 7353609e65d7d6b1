//! # Projtrack Shared Library
//!
//! Domain types and rules shared by the Projtrack API server.
//!
//! ## Module Organization
//!
//! - `models`: users, projects and tasks with their database operations
//! - `validation`: field and per-owner uniqueness rules for payloads
//! - `status`: the derived `late` flag and the clock that drives it
//! - `auth`: the ownership gate, session tokens and password hashing
//! - `store`: the persistence seam with PostgreSQL and in-memory backends
//! - `db`: connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;
pub mod status;
pub mod store;
pub mod validation;

/// Current version of the Projtrack shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
