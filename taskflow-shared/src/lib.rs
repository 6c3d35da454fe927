//! # TaskFlow Shared Library
//!
//! Domain core of TaskFlow: teams own projects, projects own tasks, tasks
//! collect comments, and team membership decides who may touch what.
//!
//! ## Module Organization
//!
//! - `auth`: SSO identity resolution, the authorization engine, session tokens
//! - `models`: Database rows and their SQL
//! - `store`: The resource store contract with PostgreSQL and in-memory backends
//! - `db`: Connection pooling and migrations

pub mod auth;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the TaskFlow shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
