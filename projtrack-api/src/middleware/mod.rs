/// Middleware for the API server
///
/// Actor resolution lives in `projtrack_shared::auth::middleware`; this
/// module holds the HTTP-only layers.

pub mod security;
