use async_trait::async_trait;
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::classifier::actions::{PermissionLevel, QueryType};
use crate::error::{SearchError, SearchResult, StoreError};
use crate::features::{Features, FilterOptions};
use crate::filter::DashboardPermissionFilter;
use crate::search::model::{HitList, SortOption};
use crate::search::sort::SortRegistry;
use crate::user::SignedInUser;

/// Page size used when a request does not set one.
pub const DEFAULT_LIMIT: i64 = 1000;
/// Largest page size a request may ask for.
pub const MAX_LIMIT: i64 = 5000;

/// Looks up the items a user starred.
#[async_trait]
pub trait StarService: Send + Sync {
    /// Ids of every dashboard `user_id` starred.
    async fn get_by_user(&self, user_id: i64) -> Result<BTreeSet<i64>, StoreError>;
}

/// Executes dashboard searches with the permission filter embedded.
#[async_trait]
pub trait DashboardStore: Send + Sync {
    /// Run `query` and return the matching rows.
    async fn find_dashboards(
        &self,
        query: &FindPersistedDashboardsQuery,
    ) -> Result<HitList, StoreError>;
}

/// A search request as received from the caller.
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Title substring.
    pub title: String,
    /// Every tag must be present.
    pub tags: Vec<String>,
    /// User the search runs for.
    pub signed_in_user: SignedInUser,
    /// Page size; 0 means [`DEFAULT_LIMIT`].
    pub limit: i64,
    /// 1-based page; 0 means the first page.
    pub page: i64,
    /// Only return starred dashboards.
    pub is_starred: bool,
    /// Wire query type, e.g. `dash-folder`. Empty searches everything.
    pub query_type: String,
    /// Restrict to these UIDs.
    pub dashboard_uids: Vec<String>,
    /// Restrict to these ids.
    pub dashboard_ids: Vec<i64>,
    /// Restrict to dashboards inside these folders, by id.
    pub folder_ids: Vec<i64>,
    /// Restrict to dashboards inside these folders, by UID.
    pub folder_uids: Vec<String>,
    /// Required permission level; `None` means view.
    pub permission: Option<PermissionLevel>,
    /// Registered sort option name. Empty or unknown names apply the default title order.
    pub sort: String,
}

/// The query handed to the [`DashboardStore`].
#[derive(Debug, Clone)]
pub struct FindPersistedDashboardsQuery {
    /// Title substring.
    pub title: String,
    /// User the search runs for.
    pub signed_in_user: SignedInUser,
    /// Restrict to these UIDs.
    pub dashboard_uids: Vec<String>,
    /// Restrict to these ids.
    pub dashboard_ids: Vec<i64>,
    /// Parsed query type.
    pub query_type: QueryType,
    /// Restrict to dashboards inside these folders, by id.
    pub folder_ids: Vec<i64>,
    /// Restrict to dashboards inside these folders, by UID.
    pub folder_uids: Vec<String>,
    /// Every tag must be present.
    pub tags: Vec<String>,
    /// Page size, already clamped.
    pub limit: i64,
    /// 1-based page.
    pub page: i64,
    /// Required permission level.
    pub permission: PermissionLevel,
    /// Resolved sort option; `None` leaves ordering to the store.
    pub sort: Option<SortOption>,
    /// Access-control predicate the store must embed.
    pub filter: DashboardPermissionFilter,
}

/// Orchestrates starred lookups, the filtered store search and hit post-processing.
pub struct SearchService {
    sort_options: SortRegistry,
    star_service: Arc<dyn StarService>,
    dashboard_store: Arc<dyn DashboardStore>,
    features: Features,
    filter_options: FilterOptions,
}

impl SearchService {
    /// Service with the default sort registry and filter options.
    pub fn new(
        star_service: Arc<dyn StarService>,
        dashboard_store: Arc<dyn DashboardStore>,
        features: Features,
    ) -> Self {
        Self {
            sort_options: SortRegistry::new(),
            star_service,
            dashboard_store,
            features,
            filter_options: FilterOptions::default(),
        }
    }

    /// Override the SQL dialect capabilities used when building filters.
    #[must_use]
    pub fn with_filter_options(mut self, options: FilterOptions) -> Self {
        self.filter_options = options;
        self
    }

    /// Every registered sort option.
    pub fn sort_options(&self) -> Vec<SortOption> {
        self.sort_options.options()
    }

    /// Run `query` for its signed-in user.
    ///
    /// Collaborator errors are returned unchanged and no partial result is produced.
    /// Cancelling `cancel` aborts the in-flight collaborator call.
    pub async fn search(&self, query: &Query, cancel: &CancellationToken) -> SearchResult<HitList> {
        let query_type = query.query_type.parse::<QueryType>()?;
        let permission = query.permission.unwrap_or(PermissionLevel::View);
        let user = &query.signed_in_user;

        let starred = cancellable(cancel, self.star_service.get_by_user(user.user_id))
            .await?
            .map_err(SearchError::Star)?;

        if query.is_starred && starred.is_empty() {
            debug!(user_id = user.user_id, "no starred dashboards, skipping search");
            return Ok(HitList::new());
        }

        let mut dashboard_ids = query.dashboard_ids.clone();
        if query.is_starred && query.dashboard_ids.is_empty() && query.dashboard_uids.is_empty() {
            dashboard_ids.extend(starred.iter().copied());
        }

        let filter = DashboardPermissionFilter::new(
            user,
            permission,
            query_type,
            &self.features,
            self.filter_options,
        );

        let sort = self.sort_options.get(&query.sort).cloned();
        if sort.is_none() && !query.sort.is_empty() {
            debug!(sort = %query.sort, "unknown sort option, using default order");
        }

        let store_query = FindPersistedDashboardsQuery {
            title: query.title.clone(),
            signed_in_user: user.clone(),
            dashboard_uids: query.dashboard_uids.clone(),
            dashboard_ids,
            query_type,
            folder_ids: query.folder_ids.clone(),
            folder_uids: query.folder_uids.clone(),
            tags: query.tags.clone(),
            limit: normalize_limit(query.limit),
            page: query.page.max(1),
            permission,
            sort,
            filter,
        };

        let mut hits = cancellable(cancel, self.dashboard_store.find_dashboards(&store_query))
            .await?
            .map_err(SearchError::Store)?;
        trace!(hits = hits.len(), "dashboard store returned");

        if store_query.sort.is_none() {
            hits.sort_by_title(false);
            hits.sort_tags();
        }

        for hit in hits.iter_mut() {
            if starred.contains(&hit.id) {
                hit.is_starred = true;
            }
        }

        if query.is_starred {
            hits.retain(|hit| hit.is_starred);
        }

        Ok(hits)
    }
}

fn normalize_limit(limit: i64) -> i64 {
    if limit <= 0 {
        DEFAULT_LIMIT
    } else {
        limit.min(MAX_LIMIT)
    }
}

async fn cancellable<F, T>(cancel: &CancellationToken, future: F) -> SearchResult<T>
where
    F: Future<Output = T>,
{
    if cancel.is_cancelled() {
        return Err(SearchError::Cancelled);
    }
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(SearchError::Cancelled),
        output = future => Ok(output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(normalize_limit(0), DEFAULT_LIMIT);
        assert_eq!(normalize_limit(-3), DEFAULT_LIMIT);
        assert_eq!(normalize_limit(25), 25);
        assert_eq!(normalize_limit(MAX_LIMIT + 1), MAX_LIMIT);
    }
}
