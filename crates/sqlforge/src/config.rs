//! Builder factory configuration.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::builder::QueryBuilder;
use crate::error::OrmError;
use crate::grammar::{Grammar, MySql, Postgres, SqlServer, Sqlite};
use crate::hook::RenderHook;
use crate::variants::{GroupConcat, WhereGroup};

/// Built-in SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    MySql,
    #[default]
    Postgres,
    Sqlite,
    SqlServer,
}

impl Dialect {
    /// The grammar rendering this dialect.
    pub fn grammar(self) -> Arc<dyn Grammar> {
        match self {
            Dialect::MySql => Arc::new(MySql),
            Dialect::Postgres => Arc::new(Postgres),
            Dialect::Sqlite => Arc::new(Sqlite),
            Dialect::SqlServer => Arc::new(SqlServer),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::Postgres => "postgres",
            Dialect::Sqlite => "sqlite",
            Dialect::SqlServer => "sqlserver",
        }
    }
}

impl FromStr for Dialect {
    type Err = OrmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "postgres" | "postgresql" | "pgsql" => Ok(Dialect::Postgres),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            "sqlserver" | "mssql" | "sqlsrv" => Ok(Dialect::SqlServer),
            other => Err(OrmError::invalid_argument(format!(
                "unknown SQL dialect '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration shared by every builder it creates.
#[derive(Clone)]
pub struct BuilderConfig {
    /// Grammar builders render through.
    pub grammar: Arc<dyn Grammar>,
    /// Forbid INSERT, UPDATE, DELETE and mutating raw SQL.
    pub read_only: bool,
    /// Hook notified with every rendered statement.
    pub hook: Option<Arc<dyn RenderHook>>,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            grammar: Dialect::default().grammar(),
            read_only: false,
            hook: None,
        }
    }
}

impl fmt::Debug for BuilderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuilderConfig")
            .field("grammar", &self.grammar.name())
            .field("read_only", &self.read_only)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

impl BuilderConfig {
    /// Create a new configuration with defaults (Postgres, writable, no hook).
    pub fn new() -> Self {
        Self::default()
    }

    /// Use one of the built-in dialects.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.grammar = dialect.grammar();
        self
    }

    /// Use a custom grammar.
    pub fn grammar(mut self, grammar: Arc<dyn Grammar>) -> Self {
        self.grammar = grammar;
        self
    }

    /// Set the read-only flag of created builders.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Attach a render hook.
    pub fn hook(mut self, hook: impl RenderHook + 'static) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Attach the `tracing` SQL hook with its defaults.
    #[cfg(feature = "tracing")]
    pub fn with_tracing(self) -> Self {
        self.hook(crate::hook::TracingSqlHook::new())
    }

    /// A fresh builder.
    pub fn query(&self) -> QueryBuilder {
        let qb = QueryBuilder::new(self.grammar.clone(), self.read_only);
        match &self.hook {
            Some(hook) => qb.with_hook(hook.clone()),
            None => qb,
        }
    }

    /// A fresh predicate-group builder.
    pub fn where_group(&self) -> WhereGroup {
        WhereGroup::of(&self.query())
    }

    /// A fresh group-concat builder.
    pub fn group_concat(&self) -> GroupConcat {
        GroupConcat::of(&self.query())
    }
}
