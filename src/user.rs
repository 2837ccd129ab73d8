use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scopes granted per action, as resolved by the role collaborator.
pub type ScopesByAction = BTreeMap<String, Vec<String>>;

/// One granted `(action, scope)` pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Permission {
    /// Capability name, e.g. `dashboards:read`.
    pub action: String,
    /// Resource scope, e.g. `dashboards:uid:42`.
    pub scope: String,
}

impl Permission {
    /// Convenience constructor.
    pub fn new(action: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            scope: scope.into(),
        }
    }
}

/// Group permissions by action, with each scope list sorted and deduplicated.
pub fn group_scopes_by_action(permissions: &[Permission]) -> ScopesByAction {
    let mut grouped = ScopesByAction::new();
    for permission in permissions {
        grouped
            .entry(permission.action.clone())
            .or_default()
            .push(permission.scope.clone());
    }
    for scopes in grouped.values_mut() {
        scopes.sort();
        scopes.dedup();
    }
    grouped
}

/// Permissions as accepted on the command line: either a list of pairs or a map of
/// action to scopes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermissionsDocument {
    /// `[{"action": "...", "scope": "..."}]`
    List(Vec<Permission>),
    /// `{"action": ["scope", ...]}`
    Map(BTreeMap<String, Vec<String>>),
}

impl PermissionsDocument {
    /// Parse a JSON permissions document.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Invalid permissions JSON: {e}"))
    }

    /// Normalize into sorted, deduplicated scopes per action.
    pub fn into_scopes(self) -> ScopesByAction {
        match self {
            PermissionsDocument::List(permissions) => group_scopes_by_action(&permissions),
            PermissionsDocument::Map(map) => {
                let permissions: Vec<Permission> = map
                    .into_iter()
                    .flat_map(|(action, scopes)| {
                        scopes
                            .into_iter()
                            .map(move |scope| Permission::new(action.clone(), scope))
                    })
                    .collect();
                group_scopes_by_action(&permissions)
            }
        }
    }
}

/// The user a search runs on behalf of.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedInUser {
    /// Numeric user id, used for starred-item lookups.
    pub user_id: i64,
    /// Organization the request is scoped to.
    pub org_id: i64,
    /// Login name, only used for diagnostics.
    #[serde(default)]
    pub login: String,
    /// Granted scopes per organization and action.
    #[serde(default)]
    pub permissions: BTreeMap<i64, ScopesByAction>,
}

impl SignedInUser {
    /// Build a user whose active organization carries `permissions`.
    pub fn with_permissions(user_id: i64, org_id: i64, permissions: &[Permission]) -> Self {
        let mut by_org = BTreeMap::new();
        by_org.insert(org_id, group_scopes_by_action(permissions));
        Self {
            user_id,
            org_id,
            login: String::new(),
            permissions: by_org,
        }
    }

    /// Scopes granted in the active organization, if any were resolved.
    pub fn org_permissions(&self) -> Option<&ScopesByAction> {
        self.permissions.get(&self.org_id)
    }
}
