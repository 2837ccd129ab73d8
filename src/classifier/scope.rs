use serde::{Deserialize, Serialize};
use std::fmt;

/// Scope prefix shared by every dashboard UID scope.
pub const SCOPE_DASHBOARDS_PREFIX: &str = "dashboards:uid:";
/// Scope prefix shared by every folder UID scope.
pub const SCOPE_FOLDERS_PREFIX: &str = "folders:uid:";
/// Grants every dashboard.
pub const SCOPE_DASHBOARDS_ALL: &str = "dashboards:*";
/// Grants every folder, and through inheritance every dashboard inside one.
pub const SCOPE_FOLDERS_ALL: &str = "folders:*";
/// Grants everything.
pub const SCOPE_ALL: &str = "*";

/// Resource kinds that appear as the first segment of a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// `dashboards:...`
    Dashboards,
    /// `folders:...`
    Folders,
}

impl ResourceKind {
    /// The literal scope segment for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Dashboards => "dashboards",
            ResourceKind::Folders => "folders",
        }
    }

    /// The `<kind>:uid:` prefix for this kind.
    pub fn uid_prefix(self) -> &'static str {
        match self {
            ResourceKind::Dashboards => SCOPE_DASHBOARDS_PREFIX,
            ResourceKind::Folders => SCOPE_FOLDERS_PREFIX,
        }
    }

    /// The scope granting the single resource `uid`.
    pub fn uid_scope(self, uid: &str) -> String {
        format!("{}{uid}", self.uid_prefix())
    }

    /// The scope granting every resource of this kind.
    pub fn wildcard_scope(self) -> &'static str {
        match self {
            ResourceKind::Dashboards => SCOPE_DASHBOARDS_ALL,
            ResourceKind::Folders => SCOPE_FOLDERS_ALL,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified permission scope.
///
/// Every scope string maps to exactly one variant. Strings that do not follow the
/// `<kind>:<attribute>:<id>` shape are kept verbatim as an opaque [`Scope::Resource`]
/// with no kind, which only ever matches by literal equality. Attribute wildcards
/// other than `<kind>:uid:*` are opaque as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// `*`: every resource of every kind.
    All,
    /// `<kind>:*` or `<kind>:uid:*`: every resource of one kind.
    KindWildcard {
        /// Kind segment, e.g. `folders`.
        kind: String,
        /// `Some("uid")` for the `<kind>:uid:*` spelling.
        attribute: Option<String>,
    },
    /// `<kind>:<attribute>:<id>`: one concrete resource.
    Resource {
        /// Kind segment, `None` for opaque scopes that did not parse.
        kind: Option<String>,
        /// Attribute segment, usually `uid`.
        attribute: Option<String>,
        /// Identifier, or the raw scope string for opaque scopes.
        uid: String,
    },
}

impl Scope {
    /// Whether this scope grants every resource of `kind`.
    pub fn covers_kind(&self, kind: ResourceKind) -> bool {
        match self {
            Scope::All => true,
            Scope::KindWildcard { kind: k, .. } => k == kind.as_str(),
            Scope::Resource { .. } => false,
        }
    }

    /// The identifier named by this scope when it is a `<kind>:uid:<id>` scope.
    pub fn uid_for(&self, kind: ResourceKind) -> Option<&str> {
        match self {
            Scope::Resource {
                kind: Some(k),
                attribute: Some(attribute),
                uid,
            } if k == kind.as_str() && attribute == "uid" => Some(uid.as_str()),
            _ => None,
        }
    }

    /// Whether this is an opaque scope that did not match the scope grammar.
    pub fn is_opaque(&self) -> bool {
        matches!(self, Scope::Resource { kind: None, .. })
    }

    /// The raw string of an opaque scope, matched verbatim against resource UIDs.
    pub fn literal_uid(&self) -> Option<&str> {
        match self {
            Scope::Resource { kind: None, uid, .. } => Some(uid.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::All => f.write_str(SCOPE_ALL),
            Scope::KindWildcard {
                kind,
                attribute: Some(attribute),
            } => write!(f, "{kind}:{attribute}:*"),
            Scope::KindWildcard { kind, .. } => write!(f, "{kind}:*"),
            Scope::Resource {
                kind: Some(kind),
                attribute: Some(attribute),
                uid,
            } => write!(f, "{kind}:{attribute}:{uid}"),
            Scope::Resource { uid, .. } => f.write_str(uid),
        }
    }
}

/// Classify a raw scope string.
///
/// Total and side-effect free: malformed input becomes an opaque resource scope.
pub fn classify(scope: &str) -> Scope {
    if scope == SCOPE_ALL {
        return Scope::All;
    }

    let segments: Vec<&str> = scope.split(':').collect();
    match segments.as_slice() {
        [kind, "*"] if is_segment(kind) => Scope::KindWildcard {
            kind: (*kind).to_string(),
            attribute: None,
        },
        [kind, "uid", "*"] if is_segment(kind) => Scope::KindWildcard {
            kind: (*kind).to_string(),
            attribute: Some("uid".to_string()),
        },
        [kind, attribute, uid] if is_segment(kind) && is_segment(attribute) && !uid.is_empty() => {
            Scope::Resource {
                kind: Some((*kind).to_string()),
                attribute: Some((*attribute).to_string()),
                uid: (*uid).to_string(),
            }
        }
        _ => Scope::Resource {
            kind: None,
            attribute: None,
            uid: scope.to_string(),
        },
    }
}

fn is_segment(segment: &str) -> bool {
    !segment.is_empty() && segment != "*"
}
