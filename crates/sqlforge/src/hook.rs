//! Observation of rendered SQL.
//!
//! A [`RenderHook`] attached to a builder is called with the exact text of every
//! successful `render()`. Hooks are purely observational and cannot alter the SQL.

use crate::operator::QueryKind;

/// What a hook sees for one render.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub kind: QueryKind,
    /// Name of the grammar that produced the text.
    pub dialect: &'static str,
    /// Length of the builder's bind list.
    pub binding_count: usize,
    /// The rendered statement.
    pub sql: &'a str,
}

/// Callback invoked after a statement is rendered.
pub trait RenderHook: Send + Sync {
    fn on_render(&self, ctx: &RenderContext<'_>);
}

/// Cut `sql` to at most `max_bytes`, backing off to a char boundary.
#[cfg_attr(not(feature = "tracing"), allow(dead_code))]
pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

#[cfg(feature = "tracing")]
pub use tracing_hook::TracingSqlHook;

#[cfg(feature = "tracing")]
mod tracing_hook {
    use super::{RenderContext, RenderHook, truncate_sql_bytes};
    use tracing::Level;

    /// A `tracing`-based hook that emits every rendered statement.
    ///
    /// Events go to target `sqlforge.sql`. Enable via the crate feature:
    /// `sqlforge = { features = ["tracing"] }` (on by default).
    #[derive(Debug, Clone)]
    pub struct TracingSqlHook {
        /// Tracing event level to emit at.
        pub level: Level,
        /// Truncate long SQL strings (in bytes). `None` means no truncation.
        pub max_sql_length: Option<usize>,
    }

    impl Default for TracingSqlHook {
        fn default() -> Self {
            Self {
                level: Level::DEBUG,
                max_sql_length: Some(200),
            }
        }
    }

    impl TracingSqlHook {
        pub fn new() -> Self {
            Self::default()
        }

        /// Override the tracing event level.
        pub fn level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        /// Set maximum SQL length to display.
        pub fn max_sql_length(mut self, len: usize) -> Self {
            self.max_sql_length = Some(len);
            self
        }

        /// Disable SQL truncation.
        pub fn no_truncate(mut self) -> Self {
            self.max_sql_length = None;
            self
        }

        pub(crate) fn truncate_sql(&self, sql: &str) -> String {
            match self.max_sql_length {
                Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
                _ => sql.to_string(),
            }
        }
    }

    impl RenderHook for TracingSqlHook {
        fn on_render(&self, ctx: &RenderContext<'_>) {
            macro_rules! emit_at_level {
                ($level:expr, $($field:tt)*) => {
                    match $level {
                        Level::ERROR => tracing::error!($($field)*),
                        Level::WARN  => tracing::warn!($($field)*),
                        Level::INFO  => tracing::info!($($field)*),
                        Level::DEBUG => tracing::debug!($($field)*),
                        Level::TRACE => tracing::trace!($($field)*),
                    }
                };
            }

            let sql = self.truncate_sql(ctx.sql);
            emit_at_level!(
                self.level,
                target: "sqlforge.sql",
                kind = ?ctx.kind,
                dialect = ctx.dialect,
                binding_count = ctx.binding_count,
                sql = %sql,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_sql_bytes("SELECT 1", 100), "SELECT 1");
        assert_eq!(truncate_sql_bytes("SELECT 1", 6), "SELECT");
        // 'é' is two bytes; cutting inside it backs off.
        assert_eq!(truncate_sql_bytes("é", 1), "");
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn tracing_hook_truncates() {
        let hook = TracingSqlHook::new().max_sql_length(6);
        assert_eq!(hook.truncate_sql("SELECT * FROM t"), "SELECT...");
        let hook = hook.no_truncate();
        assert_eq!(hook.truncate_sql("SELECT * FROM t"), "SELECT * FROM t");
    }
}
