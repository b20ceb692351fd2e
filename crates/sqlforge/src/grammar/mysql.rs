use super::Grammar;
use crate::ident::Quote;
use crate::operator::Operator;

/// MySQL / MariaDB.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySql;

impl Grammar for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    #[inline]
    fn quote(&self) -> Quote {
        Quote::BACKTICK
    }

    #[inline]
    fn random_order(&self) -> &'static str {
        "RAND()"
    }

    /// Backslash is an escape character inside MySQL string literals.
    fn escape_string(&self, value: &str) -> String {
        value.replace('\\', "\\\\").replace('\'', "''")
    }

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
            // MySQL has no bare OFFSET; use the largest row count instead.
            (None, Some(m)) => Some(format!("LIMIT {} OFFSET {m}", u64::MAX)),
            (Some(n), Some(m)) => Some(format!("LIMIT {n} OFFSET {m}")),
        }
    }

    #[inline]
    fn supports_update_limit(&self) -> bool {
        true
    }

    fn concat_aggregate(&self, columns: &[String], separator: &str) -> String {
        format!("GROUP_CONCAT({} SEPARATOR {separator})", columns.join(", "))
    }
}
