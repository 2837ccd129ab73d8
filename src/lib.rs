//! Render dashboard and folder access-control scopes as embeddable SQL search predicates.
#![warn(missing_docs)]

/// Scope classification and the actions each permission level and query type require.
pub mod classifier;
/// Error types shared by filter construction and search.
pub mod error;
/// Feature flags and SQL dialect capabilities.
pub mod features;
/// Permission filter construction: per-action predicates, nested folder expansion.
pub mod filter;
/// Filter rendering, reports and SQL validation.
pub mod output;
/// Search orchestration over the starred-items and dashboard-store collaborators.
pub mod search;
/// Signed-in users and their resolved permissions.
pub mod user;
