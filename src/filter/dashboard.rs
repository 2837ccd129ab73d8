use serde::Serialize;
use tracing::debug;

use crate::classifier::actions::{ActionRequirement, PermissionLevel, QueryType};
use crate::features::{Features, FilterOptions};
use crate::filter::nested::NestedFolderExpander;
use crate::filter::predicate::{ActionPredicate, ActionPredicateBuilder, ResourceClass};
use crate::filter::sql::{join, Fragment, SqlParam, DENY_ALL};
use crate::user::SignedInUser;

/// Rendered output of a permission filter.
///
/// Embed as `{recursive_cte} SELECT ... FROM dashboard WHERE {where_clause}` and
/// bind `params` in order: CTE parameters come first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterClause {
    /// `WITH RECURSIVE ...` header, empty when no nested expansion was needed.
    pub recursive_cte: String,
    /// Boolean condition over the `dashboard` table.
    pub where_clause: String,
    /// Values for every placeholder in `recursive_cte` followed by `where_clause`.
    pub params: Vec<SqlParam>,
}

/// Restricts a dashboard search to the rows a user may act upon.
///
/// Construction is pure: the predicate is computed once in [`Self::new`] and the
/// accessors hand out copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardPermissionFilter {
    level: PermissionLevel,
    query_type: QueryType,
    requirement: ActionRequirement,
    predicates: Vec<(ResourceClass, ActionPredicate)>,
    with: Fragment,
    clause: Fragment,
}

impl DashboardPermissionFilter {
    /// Build the filter for `user` at `level`, narrowed by `query_type`.
    pub fn new(
        user: &SignedInUser,
        level: PermissionLevel,
        query_type: QueryType,
        features: &Features,
        options: FilterOptions,
    ) -> Self {
        let requirement = ActionRequirement::resolve(level, query_type);
        let nested = features.nested_folders();
        debug!(
            user_id = user.user_id,
            org_id = user.org_id,
            %level,
            %query_type,
            nested,
            dashboard_actions = ?requirement.dashboard_actions,
            folder_actions = ?requirement.folder_actions,
            "building dashboard permission filter"
        );

        let Some(permissions) = user.org_permissions() else {
            return Self {
                level,
                query_type,
                requirement,
                predicates: Vec::new(),
                with: Fragment::default(),
                clause: Fragment::raw(DENY_ALL),
            };
        };

        let mut expander = NestedFolderExpander::new(user.org_id, options);
        let mut branches = Vec::with_capacity(2);
        let mut predicates = Vec::with_capacity(2);

        let targets = [
            (ResourceClass::Dashboards, &requirement.dashboard_actions),
            (ResourceClass::Folders, &requirement.folder_actions),
        ];
        for (target, actions) in targets {
            if actions.is_empty() {
                continue;
            }
            let predicate = ActionPredicateBuilder::new(target).build_joint(actions, permissions);
            let fragment = if nested {
                predicate.render_with(target, |column, uids| expander.expand(column, uids))
            } else {
                predicate.render(target)
            };
            branches.push(fragment);
            predicates.push((target, predicate));
        }

        let joined = join(branches, "OR");
        Self {
            level,
            query_type,
            requirement,
            predicates,
            with: expander.with_clause(),
            clause: Fragment {
                sql: format!("({})", joined.sql),
                params: joined.params,
            },
        }
    }

    /// Build the filter from raw level and query type values.
    ///
    /// Unknown values are configuration errors and are reported, never treated as
    /// "no access".
    pub fn from_raw(
        user: &SignedInUser,
        level: i64,
        query_type: &str,
        features: &Features,
        options: FilterOptions,
    ) -> crate::error::FilterResult<Self> {
        let level = PermissionLevel::try_from(level)?;
        let query_type = query_type.parse::<QueryType>()?;
        Ok(Self::new(user, level, query_type, features, options))
    }

    /// The `WITH RECURSIVE` header and its parameters.
    pub fn with(&self) -> (String, Vec<SqlParam>) {
        (self.with.sql.clone(), self.with.params.clone())
    }

    /// The boolean condition and its parameters.
    pub fn where_clause(&self) -> (String, Vec<SqlParam>) {
        (self.clause.sql.clone(), self.clause.params.clone())
    }

    /// The full `(recursive CTE, where clause, params)` triple.
    pub fn clause(&self) -> FilterClause {
        let mut params = self.with.params.clone();
        params.extend(self.clause.params.iter().cloned());
        FilterClause {
            recursive_cte: self.with.sql.clone(),
            where_clause: self.clause.sql.clone(),
            params,
        }
    }

    /// Requested permission level.
    pub fn level(&self) -> PermissionLevel {
        self.level
    }

    /// Requested query type.
    pub fn query_type(&self) -> QueryType {
        self.query_type
    }

    /// Actions the filter requires, per resource class.
    pub fn requirement(&self) -> &ActionRequirement {
        &self.requirement
    }

    /// What each filtered resource class resolved to. Empty when the user has no
    /// permissions in the active organization.
    pub fn predicates(&self) -> &[(ResourceClass, ActionPredicate)] {
        &self.predicates
    }
}
