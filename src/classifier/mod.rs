/// Action names, permission levels, query types and the actions each combination requires.
pub mod actions;
/// Scope string classification into wildcard and resource scopes.
pub mod scope;
