use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use crate::classifier::scope::{classify, ResourceKind, Scope};
use crate::filter::sql::{join, Fragment, DENY_ALL};
use crate::user::ScopesByAction;

/// Column holding a row's own UID.
pub const UID_COLUMN: &str = "dashboard.uid";
/// Column holding the UID of the folder a dashboard lives in.
pub const FOLDER_UID_COLUMN: &str = "dashboard.folder_uid";

/// Class of row a predicate filters. Both live in the `dashboard` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceClass {
    /// Rows with `is_folder = false`.
    Dashboards,
    /// Rows with `is_folder = true`.
    Folders,
}

impl ResourceClass {
    /// Scope kind that names rows of this class directly.
    pub fn own_kind(self) -> ResourceKind {
        match self {
            ResourceClass::Dashboards => ResourceKind::Dashboards,
            ResourceClass::Folders => ResourceKind::Folders,
        }
    }

    /// Kinds whose wildcard grants every row of this class.
    ///
    /// Dashboards inherit from folders, so a folder wildcard covers them too.
    pub fn wildcard_kinds(self) -> &'static [ResourceKind] {
        match self {
            ResourceClass::Dashboards => &[ResourceKind::Dashboards, ResourceKind::Folders],
            ResourceClass::Folders => &[ResourceKind::Folders],
        }
    }

    /// Condition that restricts the `dashboard` table to this class.
    pub fn guard(self) -> &'static str {
        match self {
            ResourceClass::Dashboards => "NOT dashboard.is_folder",
            ResourceClass::Folders => "dashboard.is_folder",
        }
    }
}

/// What a set of jointly required actions grants on one resource class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionPredicate {
    /// Every required action is granted through a wildcard.
    Unrestricted,
    /// Only rows whose UID is granted by every action that is not wildcarded.
    Restricted {
        /// UIDs named through the row's own kind.
        direct: BTreeSet<String>,
        /// Folder UIDs whose contents are granted. Always empty for folder rows.
        inherited: BTreeSet<String>,
    },
}

impl ActionPredicate {
    /// A restricted predicate that grants nothing.
    pub fn deny() -> Self {
        ActionPredicate::Restricted {
            direct: BTreeSet::new(),
            inherited: BTreeSet::new(),
        }
    }

    /// Whether no row can match.
    pub fn is_denied(&self) -> bool {
        match self {
            ActionPredicate::Unrestricted => false,
            ActionPredicate::Restricted { direct, inherited } => {
                direct.is_empty() && inherited.is_empty()
            }
        }
    }

    /// Render with literal UID lists.
    pub fn render(&self, target: ResourceClass) -> Fragment {
        self.render_with(target, |column, uids| {
            let list = Fragment::in_list(uids);
            Fragment {
                sql: format!("{column} IN {}", list.sql),
                params: list.params,
            }
        })
    }

    /// Render, delegating every folder-UID membership test to `folder_match`.
    ///
    /// `folder_match` receives the column to test and the granted folder UIDs and
    /// returns a boolean fragment. Nested folder expansion plugs in here.
    pub fn render_with<F>(&self, target: ResourceClass, mut folder_match: F) -> Fragment
    where
        F: FnMut(&str, &BTreeSet<String>) -> Fragment,
    {
        let (direct, inherited) = match self {
            ActionPredicate::Unrestricted => return Fragment::raw(target.guard()),
            ActionPredicate::Restricted { direct, inherited } => (direct, inherited),
        };

        let guard = target.guard();
        let mut parts = Vec::new();

        if !direct.is_empty() {
            let condition = match target {
                ResourceClass::Dashboards => {
                    let list = Fragment::in_list(direct);
                    Fragment {
                        sql: format!("{UID_COLUMN} IN {}", list.sql),
                        params: list.params,
                    }
                }
                ResourceClass::Folders => folder_match(UID_COLUMN, direct),
            };
            parts.push(guarded(condition, guard));
        }

        if !inherited.is_empty() && target == ResourceClass::Dashboards {
            parts.push(guarded(folder_match(FOLDER_UID_COLUMN, inherited), guard));
        }

        if parts.is_empty() {
            return Fragment::raw(DENY_ALL);
        }
        join(parts, "OR")
    }
}

fn guarded(condition: Fragment, guard: &str) -> Fragment {
    Fragment {
        sql: format!("({} AND {guard})", condition.sql),
        params: condition.params,
    }
}

/// Builds the predicate one resource class contributes for its required actions.
#[derive(Debug, Clone, Copy)]
pub struct ActionPredicateBuilder {
    target: ResourceClass,
}

impl ActionPredicateBuilder {
    /// Builder for rows of `target`.
    pub fn new(target: ResourceClass) -> Self {
        Self { target }
    }

    /// The resource class this builder filters.
    pub fn target(&self) -> ResourceClass {
        self.target
    }

    /// Predicate for a single action and its granted scopes.
    pub fn build(&self, action: &str, scopes: &[String]) -> ActionPredicate {
        let mut permissions = ScopesByAction::new();
        permissions.insert(action.to_string(), scopes.to_vec());
        self.build_joint(&[action], &permissions)
    }

    /// Predicate for actions that must all hold on the same resource.
    ///
    /// Actions satisfied by a wildcard drop out. A UID survives only if every
    /// remaining action grants it.
    pub fn build_joint(&self, actions: &[&str], permissions: &ScopesByAction) -> ActionPredicate {
        let classified: Vec<(&str, Vec<Scope>)> = actions
            .iter()
            .map(|action| {
                let scopes = permissions
                    .get(*action)
                    .map(|raw| raw.iter().map(|scope| classify(scope)).collect())
                    .unwrap_or_default();
                (*action, scopes)
            })
            .collect();

        let to_check: Vec<&(&str, Vec<Scope>)> = classified
            .iter()
            .filter(|(_, scopes)| !self.has_wildcard(scopes))
            .collect();

        if to_check.is_empty() {
            trace!(class = ?self.target, ?actions, "all actions granted by wildcard");
            return ActionPredicate::Unrestricted;
        }

        let own_kind = self.target.own_kind();
        let direct = uids_granted_by_all(&to_check, |scope| {
            scope.uid_for(own_kind).or_else(|| scope.literal_uid())
        });
        let inherited = match self.target {
            ResourceClass::Dashboards => {
                uids_granted_by_all(&to_check, |scope| scope.uid_for(ResourceKind::Folders))
            }
            ResourceClass::Folders => BTreeSet::new(),
        };

        ActionPredicate::Restricted { direct, inherited }
    }

    fn has_wildcard(&self, scopes: &[Scope]) -> bool {
        scopes.iter().any(|scope| {
            self.target
                .wildcard_kinds()
                .iter()
                .any(|kind| scope.covers_kind(*kind))
        })
    }
}

/// UIDs that `uid_of` extracts from the scopes of every action in `to_check`.
fn uids_granted_by_all<'a, F>(
    to_check: &[&'a (&str, Vec<Scope>)],
    uid_of: F,
) -> BTreeSet<String>
where
    F: Fn(&'a Scope) -> Option<&'a str>,
{
    let mut uid_to_actions: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for (action, scopes) in to_check {
        for uid in scopes.iter().filter_map(&uid_of) {
            uid_to_actions.entry(uid).or_default().insert(*action);
        }
    }

    uid_to_actions
        .into_iter()
        .filter(|(_, granted)| granted.len() == to_check.len())
        .map(|(uid, _)| uid.to_string())
        .collect()
}
