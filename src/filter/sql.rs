use serde::{Deserialize, Serialize};
use std::fmt;

/// A value bound to one `?` placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlParam {
    /// Integer parameter (organization ids).
    Int(i64),
    /// Text parameter (resource UIDs).
    Text(String),
}

impl fmt::Display for SqlParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlParam::Int(value) => write!(f, "{value}"),
            SqlParam::Text(value) => write!(f, "'{}'", value.replace('\'', "''")),
        }
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(value.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        SqlParam::Text(value)
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        SqlParam::Int(value)
    }
}

/// Predicate that never matches.
pub const DENY_ALL: &str = "(1 = 0)";

/// A SQL snippet and the parameters its placeholders bind, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    /// SQL text containing only `?` placeholders for dynamic values.
    pub sql: String,
    /// Values for the placeholders, in textual order.
    pub params: Vec<SqlParam>,
}

impl Fragment {
    /// A fragment without parameters.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// `(?, ?, ...)` bound to `values`.
    pub fn in_list<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a String>,
    {
        let params: Vec<SqlParam> = values.into_iter().cloned().map(SqlParam::Text).collect();
        Self {
            sql: format!("({})", placeholders(params.len())),
            params,
        }
    }
}

/// `n` comma-separated `?` placeholders.
pub fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Join fragments with a boolean operator, concatenating their parameters.
pub fn join(fragments: Vec<Fragment>, operator: &str) -> Fragment {
    let mut sql = Vec::with_capacity(fragments.len());
    let mut params = Vec::new();
    for fragment in fragments {
        sql.push(fragment.sql);
        params.extend(fragment.params);
    }
    Fragment {
        sql: sql.join(&format!(" {operator} ")),
        params,
    }
}

/// Substitute every placeholder with its literal value for display.
///
/// Only for diagnostics: the output is not safe to execute.
pub fn interpolate(sql: &str, params: &[SqlParam]) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut values = params.iter();
    for ch in sql.chars() {
        if ch == '?' {
            match values.next() {
                Some(value) => out.push_str(&value.to_string()),
                None => out.push(ch),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_list_binds_every_value() {
        let uids = vec!["a".to_string(), "b".to_string()];
        let fragment = Fragment::in_list(&uids);
        assert_eq!(fragment.sql, "(?, ?)");
        assert_eq!(fragment.params, vec![SqlParam::from("a"), SqlParam::from("b")]);
    }

    #[test]
    fn interpolate_quotes_text() {
        let rendered = interpolate(
            "uid IN (?, ?) AND org_id = ?",
            &[SqlParam::from("o'k"), SqlParam::from("x"), SqlParam::Int(3)],
        );
        assert_eq!(rendered, "uid IN ('o''k', 'x') AND org_id = 3");
    }
}
