//! # Ladle Shared Library
//!
//! Shared data layer and domain logic for the ladle recipe-sharing backend,
//! used by the API server and by auxiliary tooling (ingredient import).
//!
//! ## Module Organization
//!
//! - `models`: Database models and their operations
//! - `shopping`: Shopping-list aggregation and the document-renderer seam
//! - `auth`: Authentication primitives and the request auth context
//! - `validate`: Input validation rules and limits
//! - `db`: Connection pool and migration runner

pub mod auth;
pub mod db;
pub mod models;
pub mod shopping;
pub mod validate;

/// Current version of the ladle shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
