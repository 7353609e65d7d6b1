//! # Projtrack API Server Library
//!
//! HTTP layer over `projtrack-shared`: resolves the actor, consults the
//! ownership gate, validates payloads and calls the store.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers
//! - `routes`: Route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
