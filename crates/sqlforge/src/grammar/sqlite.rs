use super::Grammar;
use crate::ident::Quote;
use crate::operator::Operator;

/// SQLite.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl Grammar for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    #[inline]
    fn quote(&self) -> Quote {
        Quote::DOUBLE
    }

    #[inline]
    fn random_order(&self) -> &'static str {
        "RANDOM()"
    }

    #[inline]
    fn bool_literal(&self, value: bool) -> &'static str {
        if value { "1" } else { "0" }
    }

    /// LIKE is already case-insensitive for ASCII.
    fn operator(&self, op: Operator) -> &'static str {
        match op {
            Operator::Ilike => "LIKE",
            other => other.as_sql(),
        }
    }

    fn compile_pagination(
        &self,
        limit: Option<u64>,
        offset: Option<u64>,
        _ordered: bool,
    ) -> Option<String> {
        match (limit, offset) {
            (None, None) => None,
            (Some(n), None) => Some(format!("LIMIT {n}")),
            (None, Some(m)) => Some(format!("LIMIT -1 OFFSET {m}")),
            (Some(n), Some(m)) => Some(format!("LIMIT {n} OFFSET {m}")),
        }
    }

    #[inline]
    fn lock_suffix(&self) -> Option<&'static str> {
        None
    }

    #[inline]
    fn parenthesized_union_members(&self) -> bool {
        false
    }

    fn concat_aggregate(&self, columns: &[String], separator: &str) -> String {
        format!("GROUP_CONCAT({}, {separator})", columns.join(" || "))
    }
}
