//! Dialect grammars.
//!
//! A [`Grammar`] turns a [`QueryBuilder`] into SQL text for one database. The clause
//! walk lives in [`compile`] and is shared; dialects only override the hooks that
//! differ (quoting, bind markers, pagination, locking, random ordering, string
//! aggregation).
//!
//! Grammars are stateless, so rendering the same builder twice yields the same text.

mod compile;
mod mysql;
mod postgres;
mod sqlite;
mod sqlserver;

#[cfg(test)]
mod tests;

pub use mysql::MySql;
pub use postgres::Postgres;
pub use sqlite::Sqlite;
pub use sqlserver::SqlServer;

use crate::builder::QueryBuilder;
use crate::error::OrmResult;
use crate::ident::Quote;
use crate::operator::Operator;
use crate::variants::GroupConcat;

/// Render contract between the builder and one SQL dialect.
pub trait Grammar: Send + Sync {
    /// Short dialect name, e.g. `"postgres"`.
    fn name(&self) -> &'static str;

    /// Identifier quote characters.
    fn quote(&self) -> Quote;

    /// Expression used to order rows randomly.
    fn random_order(&self) -> &'static str;

    /// Bind marker for a named parameter.
    ///
    /// `position` is the 1-based index of the binding with that name in the bind
    /// list, when there is one.
    fn placeholder(&self, name: &str, position: Option<usize>) -> String {
        let _ = position;
        format!(":{name}")
    }

    fn bool_literal(&self, value: bool) -> &'static str {
        if value { "TRUE" } else { "FALSE" }
    }

    /// Escape the body of a single-quoted string literal.
    fn escape_string(&self, value: &str) -> String {
        value.replace('\'', "''")
    }

    /// SQL token for an operator in this dialect.
    fn operator(&self, op: Operator) -> &'static str {
        op.as_sql()
    }

    /// `SELECT TOP n` prefix, for dialects that paginate that way.
    fn select_top(&self, limit: Option<u64>, offset: Option<u64>) -> Option<String> {
        let _ = (limit, offset);
        None
    }

    /// Trailing pagination clause. `ordered` tells whether an ORDER BY was emitted.
    fn compile_pagination(
        &self,
        limit: Option<u64>,
        offset: Option<u64>,
        ordered: bool,
    ) -> Option<String> {
        let _ = ordered;
        match (limit, offset) {
            (None, None) => None,
            (Some(n), None) => Some(format!("LIMIT {n}")),
            (None, Some(m)) => Some(format!("OFFSET {m}")),
            (Some(n), Some(m)) => Some(format!("LIMIT {n} OFFSET {m}")),
        }
    }

    /// Row-lock suffix appended to a locked SELECT.
    fn lock_suffix(&self) -> Option<&'static str> {
        Some("FOR UPDATE")
    }

    /// Table hint appended to each FROM table of a locked SELECT.
    fn table_lock_hint(&self) -> Option<&'static str> {
        None
    }

    /// Whether UPDATE and DELETE accept ORDER BY and LIMIT.
    fn supports_update_limit(&self) -> bool {
        false
    }

    /// Whether a UNION member with its own ORDER BY or LIMIT can be wrapped in
    /// parentheses.
    fn parenthesized_union_members(&self) -> bool {
        true
    }

    /// Aggregate that concatenates `columns` per group, separated by `separator`
    /// (already a SQL string literal).
    fn concat_aggregate(&self, columns: &[String], separator: &str) -> String {
        let expr = match columns {
            [single] => single.clone(),
            many => format!("CONCAT({})", many.join(", ")),
        };
        format!("STRING_AGG({expr}, {separator})")
    }

    /// Render a statement.
    fn compile_query(&self, qb: &QueryBuilder) -> OrmResult<String> {
        compile::compile_query(self, qb)
    }

    /// Render a [`GroupConcat`] as a full SELECT.
    fn compile_concat(&self, concat: &GroupConcat) -> OrmResult<String> {
        compile::compile_concat(self, concat)
    }
}
