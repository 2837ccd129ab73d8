#![allow(dead_code)]

pub(crate) mod sqlite_store;

use rusqlite::types::Value;
use rusqlite::{params, Connection};

use dashacl::classifier::actions::{PermissionLevel, QueryType};
use dashacl::features::{Features, FilterOptions, FLAG_NESTED_FOLDERS};
use dashacl::filter::{DashboardPermissionFilter, SqlParam};
use dashacl::output::validate::count_query;
use dashacl::user::{Permission, SignedInUser};

pub(crate) const ORG_ID: i64 = 1;

const SCHEMA: &str = "
CREATE TABLE dashboard (
    id INTEGER PRIMARY KEY,
    org_id INTEGER NOT NULL,
    uid TEXT NOT NULL,
    title TEXT NOT NULL,
    is_folder BOOLEAN NOT NULL DEFAULT 0,
    folder_id INTEGER NOT NULL DEFAULT 0,
    folder_uid TEXT,
    tags TEXT NOT NULL DEFAULT ''
);
CREATE TABLE folder (
    id INTEGER PRIMARY KEY,
    org_id INTEGER NOT NULL,
    uid TEXT NOT NULL,
    parent_uid TEXT,
    title TEXT NOT NULL
);
";

pub(crate) fn open_db() -> Connection {
    let conn = Connection::open_in_memory().expect("in-memory sqlite should open");
    conn.execute_batch(SCHEMA).expect("schema should apply");
    conn
}

/// Insert a folder into both the `dashboard` and `folder` tables, returning its id.
pub(crate) fn insert_folder(
    conn: &Connection,
    org_id: i64,
    uid: &str,
    parent_uid: Option<&str>,
) -> i64 {
    conn.execute(
        "INSERT INTO dashboard (org_id, uid, title, is_folder, folder_uid) VALUES (?1, ?2, ?2, 1, ?3)",
        params![org_id, uid, parent_uid],
    )
    .expect("folder dashboard row should insert");
    let id = conn.last_insert_rowid();
    conn.execute(
        "INSERT INTO folder (id, org_id, uid, parent_uid, title) VALUES (?1, ?2, ?3, ?4, ?3)",
        params![id, org_id, uid, parent_uid],
    )
    .expect("folder row should insert");
    id
}

/// Insert a dashboard, returning its id.
pub(crate) fn insert_dashboard(
    conn: &Connection,
    org_id: i64,
    uid: &str,
    title: &str,
    folder: Option<(i64, &str)>,
    tags: &[&str],
) -> i64 {
    let (folder_id, folder_uid) = folder.map_or((0, None), |(id, uid)| (id, Some(uid)));
    conn.execute(
        "INSERT INTO dashboard (org_id, uid, title, is_folder, folder_id, folder_uid, tags) VALUES (?1, ?2, ?3, 0, ?4, ?5, ?6)",
        params![org_id, uid, title, folder_id, folder_uid, tags.join(",")],
    )
    .expect("dashboard row should insert");
    conn.last_insert_rowid()
}

/// Seed `num_folders` flat folders (uids `1..=num_folders`) and `num_dashboards`
/// dashboards spread round-robin across them (uids continue after the folders).
pub(crate) fn setup_test(num_folders: usize, num_dashboards: usize) -> Connection {
    let conn = open_db();
    for i in 1..=num_folders {
        insert_folder(&conn, ORG_ID, &i.to_string(), None);
    }
    for i in num_folders + 1..=num_folders + num_dashboards {
        let folder = if i % num_folders == 0 {
            num_folders
        } else {
            i % num_folders
        };
        let uid = i.to_string();
        let folder_uid = folder.to_string();
        let folder_id = i64::try_from(folder).expect("folder id should fit");
        insert_dashboard(
            &conn,
            ORG_ID,
            &uid,
            &uid,
            Some((folder_id, folder_uid.as_str())),
            &[],
        );
    }
    conn
}

pub(crate) fn user(permissions: &[(&str, &str)]) -> SignedInUser {
    let permissions: Vec<Permission> = permissions
        .iter()
        .map(|(action, scope)| Permission::new(*action, *scope))
        .collect();
    SignedInUser::with_permissions(7, ORG_ID, &permissions)
}

pub(crate) fn nested_features() -> Features {
    Features::with_features([FLAG_NESTED_FOLDERS])
}

pub(crate) fn build_filter(
    user: &SignedInUser,
    level: PermissionLevel,
    query_type: QueryType,
    features: &Features,
    options: FilterOptions,
) -> DashboardPermissionFilter {
    DashboardPermissionFilter::new(user, level, query_type, features, options)
}

pub(crate) fn to_sqlite(params: &[SqlParam]) -> Vec<Value> {
    params
        .iter()
        .map(|param| match param {
            SqlParam::Int(value) => Value::Integer(*value),
            SqlParam::Text(value) => Value::Text(value.clone()),
        })
        .collect()
}

/// Run `SELECT COUNT(*) FROM dashboard WHERE <filter>` and return the count.
pub(crate) fn count_visible(conn: &Connection, filter: &DashboardPermissionFilter) -> i64 {
    let clause = filter.clause();
    let sql = count_query(&clause);
    conn.query_row(
        &sql,
        rusqlite::params_from_iter(to_sqlite(&clause.params)),
        |row| row.get(0),
    )
    .unwrap_or_else(|e| panic!("filter query should run: {e}\n{sql}"))
}

/// UIDs of the rows the filter lets through, sorted.
pub(crate) fn visible_uids(conn: &Connection, filter: &DashboardPermissionFilter) -> Vec<String> {
    let clause = filter.clause();
    let mut sql = String::new();
    if !clause.recursive_cte.is_empty() {
        sql.push_str(&clause.recursive_cte);
        sql.push('\n');
    }
    sql.push_str("SELECT dashboard.uid FROM dashboard WHERE ");
    sql.push_str(&clause.where_clause);
    sql.push_str(" ORDER BY dashboard.uid");

    let mut stmt = conn
        .prepare(&sql)
        .unwrap_or_else(|e| panic!("filter query should prepare: {e}\n{sql}"));
    let rows = stmt
        .query_map(rusqlite::params_from_iter(to_sqlite(&clause.params)), |row| {
            row.get::<_, String>(0)
        })
        .expect("filter query should run");
    rows.map(|row| row.expect("uid should decode")).collect()
}
