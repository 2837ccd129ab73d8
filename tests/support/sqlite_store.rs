use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::Connection;

use dashacl::error::StoreError;
use dashacl::search::model::{Hit, HitList, HitType};
use dashacl::search::service::{DashboardStore, FindPersistedDashboardsQuery};

use super::to_sqlite;

/// `DashboardStore` over the in-memory test schema, embedding the permission filter
/// the way a production store would.
pub(crate) struct SqliteDashboardStore {
    conn: Mutex<Connection>,
}

impl SqliteDashboardStore {
    pub(crate) fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn build_sql(query: &FindPersistedDashboardsQuery) -> (String, Vec<Value>) {
        let (with_sql, with_params) = query.filter.with();
        let (where_sql, where_params) = query.filter.where_clause();
        let mut sql = String::new();
        let mut params = to_sqlite(&with_params);

        if !with_sql.is_empty() {
            sql.push_str(&with_sql);
            sql.push('\n');
        }
        sql.push_str(
            "SELECT dashboard.id, dashboard.uid, dashboard.title, dashboard.is_folder, \
             dashboard.folder_id, dashboard.folder_uid, parent.title, dashboard.tags \
             FROM dashboard \
             LEFT JOIN folder parent ON parent.uid = dashboard.folder_uid \
             AND parent.org_id = dashboard.org_id \
             WHERE dashboard.org_id = ? AND ",
        );
        params.push(Value::Integer(query.signed_in_user.org_id));
        sql.push_str(&where_sql);
        params.extend(to_sqlite(&where_params));

        if !query.dashboard_ids.is_empty() {
            push_in(
                &mut sql,
                &mut params,
                "dashboard.id",
                query.dashboard_ids.iter().map(|id| Value::Integer(*id)),
            );
        }
        if !query.dashboard_uids.is_empty() {
            push_in(
                &mut sql,
                &mut params,
                "dashboard.uid",
                query.dashboard_uids.iter().cloned().map(Value::Text),
            );
        }
        if !query.folder_ids.is_empty() {
            push_in(
                &mut sql,
                &mut params,
                "dashboard.folder_id",
                query.folder_ids.iter().map(|id| Value::Integer(*id)),
            );
        }
        if !query.folder_uids.is_empty() {
            push_in(
                &mut sql,
                &mut params,
                "dashboard.folder_uid",
                query.folder_uids.iter().cloned().map(Value::Text),
            );
        }
        if !query.title.is_empty() {
            sql.push_str(" AND dashboard.title LIKE ?");
            params.push(Value::Text(format!("%{}%", query.title)));
        }
        for tag in &query.tags {
            sql.push_str(" AND (',' || dashboard.tags || ',') LIKE ?");
            params.push(Value::Text(format!("%,{tag},%")));
        }

        match &query.sort {
            Some(sort) => {
                sql.push_str(" ORDER BY ");
                sql.push_str(&sort.order_by());
                sql.push_str(", dashboard.id");
            }
            None => sql.push_str(" ORDER BY dashboard.id"),
        }

        sql.push_str(" LIMIT ? OFFSET ?");
        params.push(Value::Integer(query.limit));
        params.push(Value::Integer((query.page - 1) * query.limit));

        (sql, params)
    }
}

fn push_in(
    sql: &mut String,
    params: &mut Vec<Value>,
    column: &str,
    values: impl Iterator<Item = Value>,
) {
    let values: Vec<Value> = values.collect();
    let placeholders = vec!["?"; values.len()].join(", ");
    sql.push_str(&format!(" AND {column} IN ({placeholders})"));
    params.extend(values);
}

#[async_trait]
impl DashboardStore for SqliteDashboardStore {
    async fn find_dashboards(
        &self,
        query: &FindPersistedDashboardsQuery,
    ) -> Result<HitList, StoreError> {
        let (sql, params) = Self::build_sql(query);
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::new("connection lock poisoned"))?;
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| StoreError::with_source("failed to prepare search", e))?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(params), |row| {
                let uid: String = row.get(1)?;
                let is_folder: bool = row.get(3)?;
                let tags: String = row.get(7)?;
                Ok(Hit {
                    id: row.get(0)?,
                    url: if is_folder {
                        format!("/dashboards/f/{uid}")
                    } else {
                        format!("/d/{uid}")
                    },
                    uid,
                    title: row.get(2)?,
                    hit_type: if is_folder {
                        HitType::Folder
                    } else {
                        HitType::Dashboard
                    },
                    folder_id: row.get(4)?,
                    folder_uid: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                    folder_title: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
                    tags: tags
                        .split(',')
                        .filter(|tag| !tag.is_empty())
                        .map(str::to_string)
                        .collect(),
                    ..Hit::default()
                })
            })
            .map_err(|e| StoreError::with_source("failed to run search", e))?;

        let hits = rows
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::with_source("failed to decode search row", e))?;
        Ok(HitList::from(hits))
    }
}
