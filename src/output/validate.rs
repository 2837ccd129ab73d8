use sqlparser::dialect::{Dialect, GenericDialect, MySqlDialect, SQLiteDialect};
use sqlparser::parser::Parser;
use sqlparser::tokenizer::{Token, Tokenizer};
use std::fmt;

use crate::filter::FilterClause;

/// SQL dialects a rendered filter can be checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SqlDialect {
    /// ANSI-ish generic dialect.
    #[default]
    Generic,
    /// SQLite.
    Sqlite,
    /// MySQL 8.
    Mysql,
}

impl SqlDialect {
    fn dialect(self) -> Box<dyn Dialect> {
        match self {
            SqlDialect::Generic => Box::new(GenericDialect {}),
            SqlDialect::Sqlite => Box::new(SQLiteDialect {}),
            SqlDialect::Mysql => Box::new(MySqlDialect {}),
        }
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlDialect::Generic => write!(f, "generic"),
            SqlDialect::Sqlite => write!(f, "sqlite"),
            SqlDialect::Mysql => write!(f, "mysql"),
        }
    }
}

impl std::str::FromStr for SqlDialect {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "generic" => Ok(SqlDialect::Generic),
            "sqlite" => Ok(SqlDialect::Sqlite),
            "mysql" => Ok(SqlDialect::Mysql),
            _ => Err(format!("Invalid SQL dialect: {s}")),
        }
    }
}

/// Wrap a filter into a complete statement counting the visible rows.
pub fn count_query(clause: &FilterClause) -> String {
    let mut sql = String::new();
    if !clause.recursive_cte.is_empty() {
        sql.push_str(&clause.recursive_cte);
        sql.push('\n');
    }
    sql.push_str("SELECT COUNT(*) FROM dashboard WHERE ");
    sql.push_str(&clause.where_clause);
    sql
}

/// Check that the filter embeds into a single parseable statement and that every
/// placeholder has exactly one bound parameter.
pub fn validate_clause(clause: &FilterClause, dialect: SqlDialect) -> Result<(), String> {
    let sql = count_query(clause);
    let dialect = dialect.dialect();

    let statements = Parser::parse_sql(dialect.as_ref(), &sql)
        .map_err(|e| format!("Generated filter does not parse: {e}"))?;
    if statements.len() != 1 {
        return Err(format!(
            "Generated filter produced {} statements, expected 1",
            statements.len()
        ));
    }

    let tokens = Tokenizer::new(dialect.as_ref(), &sql)
        .tokenize()
        .map_err(|e| format!("Generated filter does not tokenize: {e}"))?;
    let placeholders = tokens
        .iter()
        .filter(|token| matches!(token, Token::Placeholder(p) if p == "?"))
        .count();
    if placeholders != clause.params.len() {
        return Err(format!(
            "Generated filter has {placeholders} placeholders but {} parameters",
            clause.params.len()
        ));
    }

    Ok(())
}
