use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// Column the title sorters order by.
pub const TITLE_COLUMN: &str = "dashboard.title";

/// Kind of row a hit was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HitType {
    /// A dashboard.
    #[default]
    #[serde(rename = "dash-db")]
    Dashboard,
    /// A folder.
    #[serde(rename = "dash-folder")]
    Folder,
}

/// One search result row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hit {
    /// Numeric id, used to match starred items.
    pub id: i64,
    /// Stable UID.
    pub uid: String,
    /// Display title.
    pub title: String,
    /// Legacy `db/<slug>` URI.
    #[serde(default)]
    pub uri: String,
    /// Relative URL.
    #[serde(default)]
    pub url: String,
    /// URL slug.
    #[serde(default)]
    pub slug: String,
    /// Dashboard or folder.
    #[serde(rename = "type", default)]
    pub hit_type: HitType,
    /// Tags in storage order until normalized by the search service.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Set by the search service when the user starred this row.
    #[serde(default)]
    pub is_starred: bool,
    /// Id of the containing folder, 0 for the root.
    #[serde(default)]
    pub folder_id: i64,
    /// UID of the containing folder, empty for the root.
    #[serde(default)]
    pub folder_uid: String,
    /// Title of the containing folder.
    #[serde(default)]
    pub folder_title: String,
    /// URL of the containing folder.
    #[serde(default)]
    pub folder_url: String,
    /// Extra value a sort option exposes, e.g. a view count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_meta: Option<i64>,
}

impl Hit {
    /// Total order by title, ties broken by id.
    pub fn cmp_by_title(&self, other: &Self) -> Ordering {
        self.title
            .cmp(&other.title)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Ordered search results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HitList(pub Vec<Hit>);

impl HitList {
    /// Empty list.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Sort by title, ascending unless `descending`.
    pub fn sort_by_title(&mut self, descending: bool) {
        if descending {
            self.0.sort_by(|a, b| b.cmp_by_title(a));
        } else {
            self.0.sort_by(Hit::cmp_by_title);
        }
    }

    /// Sort every hit's own tags lexicographically.
    pub fn sort_tags(&mut self) {
        for hit in &mut self.0 {
            hit.tags.sort();
        }
    }

    /// Unwrap into the underlying vector.
    pub fn into_inner(self) -> Vec<Hit> {
        self.0
    }
}

impl Deref for HitList {
    type Target = Vec<Hit>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for HitList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<Hit>> for HitList {
    fn from(hits: Vec<Hit>) -> Self {
        Self(hits)
    }
}

impl FromIterator<Hit> for HitList {
    fn from_iter<I: IntoIterator<Item = Hit>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for HitList {
    type Item = Hit;
    type IntoIter = std::vec::IntoIter<Hit>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// One `ORDER BY` term of a sort option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOptionFilter {
    /// Column to order by.
    pub field: String,
    /// Descending instead of ascending.
    pub descending: bool,
}

impl SortOptionFilter {
    /// Order by the dashboard title.
    pub fn title(descending: bool) -> Self {
        Self {
            field: TITLE_COLUMN.to_string(),
            descending,
        }
    }

    /// SQL `ORDER BY` term, e.g. `dashboard.title DESC`.
    pub fn order_by(&self) -> String {
        let direction = if self.descending { "DESC" } else { "ASC" };
        format!("{} {direction}", self.field)
    }
}

/// A named ordering a search may request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortOption {
    /// Lookup key, e.g. `alpha-asc`.
    pub name: String,
    /// Label shown to users.
    pub display_name: String,
    /// Longer description.
    pub description: String,
    /// Position in the option list.
    pub index: i32,
    /// Name of the value exposed through [`Hit::sort_meta`], if any.
    #[serde(default)]
    pub meta_name: String,
    /// `ORDER BY` terms, most significant first.
    pub filter: Vec<SortOptionFilter>,
}

impl SortOption {
    /// Comma-separated `ORDER BY` body for the store.
    pub fn order_by(&self) -> String {
        self.filter
            .iter()
            .map(SortOptionFilter::order_by)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Whether the primary term orders descending.
    pub fn is_descending(&self) -> bool {
        self.filter.first().is_some_and(|f| f.descending)
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: i64, title: &str) -> Hit {
        Hit {
            id,
            title: title.to_string(),
            ..Hit::default()
        }
    }

    #[test]
    fn title_order_is_case_sensitive_and_total() {
        let mut hits = HitList::from(vec![hit(3, "b"), hit(2, "B"), hit(1, "b"), hit(4, "a")]);
        hits.sort_by_title(false);
        let order: Vec<i64> = hits.iter().map(|h| h.id).collect();
        assert_eq!(order, vec![2, 4, 1, 3]);

        hits.sort_by_title(true);
        let order: Vec<i64> = hits.iter().map(|h| h.id).collect();
        assert_eq!(order, vec![3, 1, 4, 2]);
    }

    #[test]
    fn hit_serializes_with_wire_names() {
        let value = serde_json::to_value(Hit {
            hit_type: HitType::Folder,
            is_starred: true,
            ..hit(1, "x")
        })
        .expect("hit should serialize");
        assert_eq!(value["type"], "dash-folder");
        assert_eq!(value["isStarred"], true);
        assert!(value.get("sortMeta").is_none());
    }
}
