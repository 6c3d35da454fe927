/// Database layer
///
/// - `pool`: PostgreSQL connection pool with a startup health check
/// - `migrations`: Embedded schema migrations from `taskflow-shared/migrations/`
///
/// Row types and their queries live in [`crate::models`].

pub mod migrations;
pub mod pool;
