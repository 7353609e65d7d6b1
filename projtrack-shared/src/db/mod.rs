/// PostgreSQL plumbing
///
/// - [`pool`]: connection pool creation and health checks
/// - [`migrations`]: embedded schema migrations from `migrations/`
///
/// Row-level operations live next to their types in [`crate::models`]; the
/// request layer reaches them through [`crate::store::PgStore`].

pub mod migrations;
pub mod pool;
