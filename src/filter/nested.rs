use std::collections::BTreeSet;

use crate::features::FilterOptions;
use crate::filter::sql::{join, Fragment, SqlParam};

/// Deepest folder nesting the join-chain expansion reaches.
pub const MAX_NESTED_FOLDER_DEPTH: usize = 8;

const RECURSIVE_QUERY_PREFIX: &str = "RecQry";

/// Expands granted folder UIDs into the folders themselves plus every descendant.
///
/// With recursive query support each expansion registers a named CTE over the
/// `folder` table (`uid`, `parent_uid`, `org_id`) and the returned membership test
/// selects from it. Without it the expansion is an OR of self-joins, one per depth.
#[derive(Debug, Clone)]
pub struct NestedFolderExpander {
    org_id: i64,
    recursive: bool,
    queries: Vec<Fragment>,
}

impl NestedFolderExpander {
    /// Expander for folders of `org_id`.
    pub fn new(org_id: i64, options: FilterOptions) -> Self {
        Self {
            org_id,
            recursive: options.recursive_queries_supported,
            queries: Vec::new(),
        }
    }

    /// Membership test: `column` is one of `folder_uids` or one of their descendants.
    pub fn expand(&mut self, column: &str, folder_uids: &BTreeSet<String>) -> Fragment {
        if self.recursive {
            let name = format!("{RECURSIVE_QUERY_PREFIX}{}", self.queries.len());
            self.queries.push(self.recursive_query(&name, folder_uids));
            Fragment::raw(format!("{column} IN (SELECT uid FROM {name})"))
        } else {
            self.join_chain(column, folder_uids)
        }
    }

    /// The `WITH RECURSIVE` header for every registered expansion, or an empty fragment.
    pub fn with_clause(&self) -> Fragment {
        if self.queries.is_empty() {
            return Fragment::default();
        }
        let mut definitions = Vec::with_capacity(self.queries.len());
        let mut params = Vec::new();
        for query in &self.queries {
            definitions.push(query.sql.as_str());
            params.extend(query.params.iter().cloned());
        }
        Fragment {
            sql: format!("WITH RECURSIVE {}", definitions.join(", ")),
            params,
        }
    }

    fn seed(&self, alias: &str, folder_uids: &BTreeSet<String>) -> Fragment {
        let list = Fragment::in_list(folder_uids);
        let mut params = vec![SqlParam::Int(self.org_id)];
        params.extend(list.params);
        Fragment {
            sql: format!("{alias}.org_id = ? AND {alias}.uid IN {}", list.sql),
            params,
        }
    }

    fn recursive_query(&self, name: &str, folder_uids: &BTreeSet<String>) -> Fragment {
        let seed = self.seed("folder", folder_uids);
        Fragment {
            sql: format!(
                "{name} AS (SELECT uid, parent_uid, org_id FROM folder WHERE {} \
                 UNION SELECT f.uid, f.parent_uid, f.org_id FROM folder f \
                 INNER JOIN {name} r ON f.parent_uid = r.uid AND f.org_id = r.org_id)",
                seed.sql
            ),
            params: seed.params,
        }
    }

    fn join_chain(&self, column: &str, folder_uids: &BTreeSet<String>) -> Fragment {
        let mut levels = Vec::with_capacity(MAX_NESTED_FOLDER_DEPTH);
        let mut joins = String::new();
        for depth in 1..=MAX_NESTED_FOLDER_DEPTH {
            if depth > 1 {
                let prev = depth - 1;
                joins.push_str(&format!(
                    " INNER JOIN folder f{depth} ON f{depth}.parent_uid = f{prev}.uid AND f{depth}.org_id = f{prev}.org_id"
                ));
            }
            let seed = self.seed("f1", folder_uids);
            levels.push(Fragment {
                sql: format!(
                    "{column} IN (SELECT f{depth}.uid FROM folder f1{joins} WHERE {})",
                    seed.sql
                ),
                params: seed.params,
            });
        }
        let chain = join(levels, "OR");
        Fragment {
            sql: format!("({})", chain.sql),
            params: chain.params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uids(raw: &[&str]) -> BTreeSet<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn recursive_expansion_registers_named_queries() {
        let mut expander = NestedFolderExpander::new(1, FilterOptions::default());
        let first = expander.expand("dashboard.folder_uid", &uids(&["parent"]));
        let second = expander.expand("dashboard.uid", &uids(&["a", "b"]));
        assert_eq!(first.sql, "dashboard.folder_uid IN (SELECT uid FROM RecQry0)");
        assert_eq!(second.sql, "dashboard.uid IN (SELECT uid FROM RecQry1)");
        assert!(first.params.is_empty());

        let with = expander.with_clause();
        assert!(with.sql.starts_with("WITH RECURSIVE RecQry0 AS ("));
        assert!(with.sql.contains("), RecQry1 AS ("));
        assert_eq!(
            with.params,
            vec![
                SqlParam::Int(1),
                SqlParam::from("parent"),
                SqlParam::Int(1),
                SqlParam::from("a"),
                SqlParam::from("b"),
            ]
        );
    }

    #[test]
    fn join_chain_rebinds_uids_per_depth() {
        let options = FilterOptions {
            recursive_queries_supported: false,
        };
        let mut expander = NestedFolderExpander::new(3, options);
        let fragment = expander.expand("dashboard.folder_uid", &uids(&["x"]));
        assert_eq!(fragment.params.len(), 2 * MAX_NESTED_FOLDER_DEPTH);
        assert_eq!(fragment.sql.matches(" OR ").count(), MAX_NESTED_FOLDER_DEPTH - 1);
        assert!(expander.with_clause().sql.is_empty());
    }

    #[test]
    fn empty_expander_has_no_with_clause() {
        let expander = NestedFolderExpander::new(1, FilterOptions::default());
        assert_eq!(expander.with_clause(), Fragment::default());
    }
}
