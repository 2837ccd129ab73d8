use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FilterError;

/// Read a dashboard.
pub const ACTION_DASHBOARDS_READ: &str = "dashboards:read";
/// Save changes to a dashboard.
pub const ACTION_DASHBOARDS_WRITE: &str = "dashboards:write";
/// Create dashboards inside a folder.
pub const ACTION_DASHBOARDS_CREATE: &str = "dashboards:create";
/// Read a folder.
pub const ACTION_FOLDERS_READ: &str = "folders:read";
/// Read alert rules stored in a folder.
pub const ACTION_ALERTING_RULE_READ: &str = "alert.rules:read";
/// Create alert rules in a folder.
pub const ACTION_ALERTING_RULE_CREATE: &str = "alert.rules:create";

/// Coarse access tier requested by a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    /// Read-only access.
    View = 1,
    /// Read and write access.
    Edit = 2,
    /// Administrative access; resolves to the same actions as [`PermissionLevel::Edit`].
    Admin = 4,
}

impl PermissionLevel {
    /// Whether this level needs write-class actions on top of read-class ones.
    pub fn needs_edit(self) -> bool {
        self > PermissionLevel::View
    }

    /// Lowercase name used on the command line and in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            PermissionLevel::View => "view",
            PermissionLevel::Edit => "edit",
            PermissionLevel::Admin => "admin",
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<i64> for PermissionLevel {
    type Error = FilterError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PermissionLevel::View),
            2 => Ok(PermissionLevel::Edit),
            4 => Ok(PermissionLevel::Admin),
            other => Err(FilterError::UnknownPermissionLevel(other.to_string())),
        }
    }
}

impl FromStr for PermissionLevel {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "view" => Ok(PermissionLevel::View),
            "edit" => Ok(PermissionLevel::Edit),
            "admin" => Ok(PermissionLevel::Admin),
            _ => Err(FilterError::UnknownPermissionLevel(s.to_string())),
        }
    }
}

/// Discriminator that narrows a search to one resource class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QueryType {
    /// No type filter: dashboards and folders.
    #[default]
    #[serde(rename = "")]
    Any,
    /// `dash-db`: dashboards only.
    #[serde(rename = "dash-db")]
    Dashboard,
    /// `dash-folder`: folders only.
    #[serde(rename = "dash-folder")]
    Folder,
    /// `dash-folder-alerting`: folders the user may read alert rules from.
    #[serde(rename = "dash-folder-alerting")]
    AlertFolder,
}

impl QueryType {
    /// Wire name of the query type.
    pub fn as_str(self) -> &'static str {
        match self {
            QueryType::Any => "",
            QueryType::Dashboard => "dash-db",
            QueryType::Folder => "dash-folder",
            QueryType::AlertFolder => "dash-folder-alerting",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryType {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(QueryType::Any),
            "dash-db" => Ok(QueryType::Dashboard),
            "dash-folder" => Ok(QueryType::Folder),
            "dash-folder-alerting" => Ok(QueryType::AlertFolder),
            other => Err(FilterError::UnknownQueryType(other.to_string())),
        }
    }
}

/// Actions that must all hold, per resource class, for a row to match.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionRequirement {
    /// Actions checked against dashboard rows. Empty excludes dashboards.
    pub dashboard_actions: Vec<&'static str>,
    /// Actions checked against folder rows. Empty excludes folders.
    pub folder_actions: Vec<&'static str>,
}

impl ActionRequirement {
    /// Resolve the required actions for a permission level and query type.
    pub fn resolve(level: PermissionLevel, query_type: QueryType) -> Self {
        let needs_edit = level.needs_edit();
        let mut requirement = ActionRequirement::default();

        match query_type {
            QueryType::Folder => {
                requirement.folder_actions.push(ACTION_FOLDERS_READ);
                if needs_edit {
                    requirement.folder_actions.push(ACTION_DASHBOARDS_CREATE);
                }
            }
            QueryType::Dashboard => {
                requirement.dashboard_actions.push(ACTION_DASHBOARDS_READ);
                if needs_edit {
                    requirement.dashboard_actions.push(ACTION_DASHBOARDS_WRITE);
                }
            }
            QueryType::AlertFolder => {
                requirement
                    .folder_actions
                    .extend([ACTION_FOLDERS_READ, ACTION_ALERTING_RULE_READ]);
                if needs_edit {
                    requirement.folder_actions.push(ACTION_ALERTING_RULE_CREATE);
                }
            }
            QueryType::Any => {
                requirement.folder_actions.push(ACTION_FOLDERS_READ);
                requirement.dashboard_actions.push(ACTION_DASHBOARDS_READ);
                if needs_edit {
                    requirement.folder_actions.push(ACTION_DASHBOARDS_CREATE);
                    requirement.dashboard_actions.push(ACTION_DASHBOARDS_WRITE);
                }
            }
        }

        requirement
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_resolves_like_edit() {
        assert_eq!(
            ActionRequirement::resolve(PermissionLevel::Admin, QueryType::Any),
            ActionRequirement::resolve(PermissionLevel::Edit, QueryType::Any)
        );
    }

    #[test]
    fn alert_folder_excludes_dashboards() {
        let req = ActionRequirement::resolve(PermissionLevel::View, QueryType::AlertFolder);
        assert!(req.dashboard_actions.is_empty());
        assert_eq!(
            req.folder_actions,
            vec![ACTION_FOLDERS_READ, ACTION_ALERTING_RULE_READ]
        );
    }

    #[test]
    fn unknown_level_number_is_rejected() {
        assert_eq!(
            PermissionLevel::try_from(3),
            Err(FilterError::UnknownPermissionLevel("3".into()))
        );
    }
}
