use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Flag that turns on nested folder inheritance.
pub const FLAG_NESTED_FOLDERS: &str = "nestedFolders";

/// Set of enabled feature flags, evaluated elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Features {
    enabled: BTreeSet<String>,
}

impl Features {
    /// Build a flag set from flag names.
    pub fn with_features<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enabled: flags.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `flag` is enabled.
    pub fn is_enabled(&self, flag: &str) -> bool {
        self.enabled.contains(flag)
    }

    /// Shorthand for the nested folders flag.
    pub fn nested_folders(&self) -> bool {
        self.is_enabled(FLAG_NESTED_FOLDERS)
    }
}

/// Capabilities of the SQL dialect the predicate will be embedded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Whether the database understands `WITH RECURSIVE`. When false, nested folder
    /// inheritance is expanded through a bounded chain of self-joins instead.
    pub recursive_queries_supported: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            recursive_queries_supported: true,
        }
    }
}
