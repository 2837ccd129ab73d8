/// Top-level dashboard permission filter: required actions, branch composition, output triple.
pub mod dashboard;
/// Folder inheritance through recursive CTEs or bounded self-join chains.
pub mod nested;
/// Per-action predicates over dashboard and folder rows.
pub mod predicate;
/// Placeholder-only SQL fragments and bound parameters.
pub mod sql;

pub use dashboard::{DashboardPermissionFilter, FilterClause};
pub use sql::SqlParam;
