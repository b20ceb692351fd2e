use super::Grammar;
use crate::ident::Quote;
use crate::operator::Operator;

/// Microsoft SQL Server (2012 and later).
///
/// A limit without an offset renders as `SELECT TOP n`; an offset renders as
/// `OFFSET m ROWS [FETCH NEXT n ROWS ONLY]`, which requires an ORDER BY, so an
/// unordered query gets `ORDER BY (SELECT 0)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServer;

impl Grammar for SqlServer {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    #[inline]
    fn quote(&self) -> Quote {
        Quote::BRACKET
    }

    #[inline]
    fn random_order(&self) -> &'static str {
        "NEWID()"
    }

    fn placeholder(&self, name: &str, _position: Option<usize>) -> String {
        format!("@{name}")
    }

    #[inline]
    fn bool_literal(&self, value: bool) -> &'static str {
        if value { "1" } else { "0" }
    }

    fn operator(&self, op: Operator) -> &'static str {
        match op {
            Operator::Ilike => "LIKE",
            other => other.as_sql(),
        }
    }

    fn select_top(&self, limit: Option<u64>, offset: Option<u64>) -> Option<String> {
        match (limit, offset) {
            (Some(n), None) => Some(format!("TOP {n}")),
            _ => None,
        }
    }

    fn compile_pagination(
        &self,
        limit: Option<u64>,
        offset: Option<u64>,
        ordered: bool,
    ) -> Option<String> {
        let offset = offset?;
        let mut out = String::new();
        if !ordered {
            out.push_str("ORDER BY (SELECT 0) ");
        }
        out.push_str(&format!("OFFSET {offset} ROWS"));
        if let Some(n) = limit {
            out.push_str(&format!(" FETCH NEXT {n} ROWS ONLY"));
        }
        Some(out)
    }

    #[inline]
    fn lock_suffix(&self) -> Option<&'static str> {
        None
    }

    #[inline]
    fn table_lock_hint(&self) -> Option<&'static str> {
        Some("WITH (UPDLOCK, ROWLOCK)")
    }
}
