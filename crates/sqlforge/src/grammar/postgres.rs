use super::Grammar;
use crate::ident::Quote;

/// PostgreSQL.
///
/// Named parameters render as `$n`, where `n` is the 1-based position of the binding
/// with that name in the bind list. A parameter with no matching binding falls back
/// to `:name`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Grammar for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    #[inline]
    fn quote(&self) -> Quote {
        Quote::DOUBLE
    }

    #[inline]
    fn random_order(&self) -> &'static str {
        "RANDOM()"
    }

    fn placeholder(&self, name: &str, position: Option<usize>) -> String {
        match position {
            Some(n) => format!("${n}"),
            None => format!(":{name}"),
        }
    }
}
