//! The statement builder.
//!
//! [`QueryBuilder`] accumulates a caller's intent into typed clause collections and
//! hands itself to a [`Grammar`] to be rendered. Every mutator validates its input
//! immediately and returns `OrmResult<&mut Self>`, so chains read as
//!
//! ```ignore
//! let mut qb = BuilderConfig::new().dialect(Dialect::Postgres).query();
//! qb.select(["id", "email"])?
//!     .from(["users"])?
//!     .where_("status", "=", param("status"))?
//!     .newest("created_at")?
//!     .limit(20);
//! qb.bind_named("status", "active");
//! let sql = qb.render()?;
//! ```
//!
//! ## State
//!
//! A builder's [`QueryKind`] is taken from the first intent call (`select`, `random`,
//! `insert`, `update`, `delete`, `raw`). Repeating the same intent accumulates; a
//! different intent fails with [`OrmError::KindConflict`]. Use [`QueryBuilder::new_query`]
//! to start another statement with the same grammar and read-only flag.

mod join;
mod order;
mod predicate;
mod write;

pub use join::{Join, JoinClause};
pub use order::{OrderColumns, OrderSpec};
pub use predicate::Predicate;
pub use write::IntoRow;

use predicate::referenced_params;

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::column::{Column, Expression};
use crate::error::{OrmError, OrmResult};
use crate::grammar::Grammar;
use crate::hook::{RenderContext, RenderHook};
use crate::operator::{Direction, QueryKind};
use crate::value::{Binding, SubQuery, Value};

/// Words that make raw SQL a write when the builder is read-only.
const MUTATING_KEYWORDS: &[&str] = &["insert", "update", "drop", "delete", "create", "alter"];

/// One entry of the UNION list.
#[derive(Debug, Clone, PartialEq)]
pub struct Union {
    pub query: SubQuery,
    pub all: bool,
}

/// Mutable statement aggregate bound to one grammar.
#[derive(Clone)]
pub struct QueryBuilder {
    grammar: Arc<dyn Grammar>,
    hook: Option<Arc<dyn RenderHook>>,
    read_only: bool,
    kind: QueryKind,
    distinct: bool,
    columns: Vec<Expression>,
    from: Vec<Expression>,
    joins: Vec<Join>,
    wheres: IndexMap<String, Vec<Predicate>>,
    groups: Vec<Expression>,
    orders: IndexMap<Direction, Vec<Column>>,
    limit: Option<i64>,
    offset: Option<i64>,
    target: Option<Expression>,
    insert_columns: Vec<Expression>,
    rows: Vec<Vec<Value>>,
    update_targets: Vec<Expression>,
    assignments: IndexMap<String, (Column, Value)>,
    delete: bool,
    unions: Vec<Union>,
    lock: bool,
    raw: Option<String>,
    bindings: Vec<Binding>,
    placeholders: Vec<String>,
    group_count: usize,
}

impl QueryBuilder {
    /// Create an empty builder rendering through `grammar`.
    pub fn new(grammar: Arc<dyn Grammar>, read_only: bool) -> Self {
        Self {
            grammar,
            hook: None,
            read_only,
            kind: QueryKind::None,
            distinct: false,
            columns: Vec::new(),
            from: Vec::new(),
            joins: Vec::new(),
            wheres: IndexMap::new(),
            groups: Vec::new(),
            orders: IndexMap::new(),
            limit: None,
            offset: None,
            target: None,
            insert_columns: Vec::new(),
            rows: Vec::new(),
            update_targets: Vec::new(),
            assignments: IndexMap::new(),
            delete: false,
            unions: Vec::new(),
            lock: false,
            raw: None,
            bindings: Vec::new(),
            placeholders: Vec::new(),
            group_count: 0,
        }
    }

    /// Attach a hook notified with every rendered statement.
    pub fn with_hook(mut self, hook: Arc<dyn RenderHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// A fresh builder sharing this builder's grammar, hook and read-only flag.
    pub fn new_query(&self) -> QueryBuilder {
        let mut qb = QueryBuilder::new(self.grammar.clone(), self.read_only);
        qb.hook = self.hook.clone();
        qb
    }

    /// Like [`QueryBuilder::new_query`], with the kind already set to `Select`.
    pub(crate) fn new_select(&self) -> QueryBuilder {
        let mut qb = self.new_query();
        qb.kind = QueryKind::Select;
        qb
    }

    // ==================== Intent ====================

    pub(crate) fn set_kind(&mut self, requested: QueryKind) -> OrmResult<()> {
        match self.kind {
            QueryKind::None => {
                self.kind = requested;
                Ok(())
            }
            current if current == requested => Ok(()),
            current => Err(OrmError::KindConflict { current, requested }),
        }
    }

    fn ensure_writable(&self, what: &str) -> OrmResult<()> {
        if self.read_only {
            #[cfg(feature = "tracing")]
            tracing::trace!(target: "sqlforge.builder", statement = what, "rejected on read-only builder");
            return Err(OrmError::ReadOnlyViolation(format!(
                "{what} is not allowed on a read-only builder"
            )));
        }
        Ok(())
    }

    fn push_expressions<I, E>(list: &mut Vec<Expression>, items: I, what: &str) -> OrmResult<()>
    where
        I: IntoIterator<Item = E>,
        E: Into<Expression>,
    {
        let items: Vec<Expression> = items.into_iter().map(Into::into).collect();
        for item in &items {
            item.validate(what)?;
        }
        list.extend(items);
        Ok(())
    }

    /// SELECT the given columns.
    pub fn select<I, E>(&mut self, columns: I) -> OrmResult<&mut Self>
    where
        I: IntoIterator<Item = E>,
        E: Into<Expression>,
    {
        self.set_kind(QueryKind::Select)?;
        Self::push_expressions(&mut self.columns, columns, "select")?;
        Ok(self)
    }

    /// SELECT a raw expression, emitted without quoting.
    pub fn select_raw(&mut self, expr: impl Into<String>) -> OrmResult<&mut Self> {
        self.set_kind(QueryKind::Select)?;
        Self::push_expressions(&mut self.columns, [Expression::Raw(expr.into())], "select")?;
        Ok(self)
    }

    /// SELECT one random row: the grammar adds its random ordering and `LIMIT 1`.
    pub fn random<I, E>(&mut self, columns: I) -> OrmResult<&mut Self>
    where
        I: IntoIterator<Item = E>,
        E: Into<Expression>,
    {
        self.set_kind(QueryKind::Random)?;
        Self::push_expressions(&mut self.columns, columns, "select")?;
        Ok(self)
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }

    /// Append tables to the FROM list.
    pub fn from<I, E>(&mut self, tables: I) -> OrmResult<&mut Self>
    where
        I: IntoIterator<Item = E>,
        E: Into<Expression>,
    {
        Self::push_expressions(&mut self.from, tables, "from")?;
        Ok(self)
    }

    /// Append a raw FROM expression (sub-select, table function, ...).
    pub fn from_raw(&mut self, expr: impl Into<String>) -> OrmResult<&mut Self> {
        Self::push_expressions(&mut self.from, [Expression::Raw(expr.into())], "from")?;
        Ok(self)
    }

    /// Raw SQL statement. On a read-only builder, text containing any mutating
    /// keyword is rejected. Trailing `;` terminators are stripped.
    pub fn raw(&mut self, sql: impl Into<String>) -> OrmResult<&mut Self> {
        let sql = sql.into();
        if self.read_only {
            let lower = sql.to_ascii_lowercase();
            if let Some(word) = MUTATING_KEYWORDS.iter().find(|w| lower.contains(*w)) {
                #[cfg(feature = "tracing")]
                tracing::trace!(target: "sqlforge.builder", keyword = word, "raw SQL rejected on read-only builder");
                return Err(OrmError::ReadOnlyViolation(format!(
                    "raw SQL containing '{word}' is not allowed on a read-only builder"
                )));
            }
        }
        self.set_kind(QueryKind::Raw)?;
        let trimmed = sql.trim_end_matches(|c: char| c == ';' || c.is_whitespace());
        self.raw = Some(trimmed.to_string());
        Ok(self)
    }

    // ==================== Pagination / misc ====================

    /// Negative values are stored as given; grammars reject them at render time.
    pub fn limit(&mut self, n: i64) -> &mut Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(&mut self, n: i64) -> &mut Self {
        self.offset = Some(n);
        self
    }

    /// Lock selected rows (`FOR UPDATE` or the dialect's equivalent).
    pub fn lock(&mut self) -> &mut Self {
        self.lock = true;
        self
    }

    /// UNION with another SELECT. Its bindings are merged into this builder.
    pub fn union(&mut self, query: QueryBuilder) -> OrmResult<&mut Self> {
        self.push_union(query, false)?;
        Ok(self)
    }

    /// UNION ALL with another SELECT.
    pub fn union_all(&mut self, query: QueryBuilder) -> OrmResult<&mut Self> {
        self.push_union(query, true)?;
        Ok(self)
    }

    /// UNION with several SELECTs, in iteration order.
    pub fn unions(&mut self, queries: impl IntoIterator<Item = QueryBuilder>) -> OrmResult<&mut Self> {
        for query in queries {
            self.push_union(query, false)?;
        }
        Ok(self)
    }

    fn push_union(&mut self, query: QueryBuilder, all: bool) -> OrmResult<()> {
        let merged = self.merge_bindings(&[&query])?;
        self.bindings.extend(merged);
        self.placeholders.extend(query.placeholders.iter().cloned());
        self.unions.push(Union {
            query: SubQuery(Arc::new(query)),
            all,
        });
        Ok(())
    }

    /// Record the parameters `values` reference and merge the bind lists of the
    /// builders nested in them (sub-queries and groups, also inside lists).
    /// Nothing is stored if any of them fails to merge.
    pub(crate) fn track_values(&mut self, values: &[Value]) -> OrmResult<()> {
        let (names, nested) = referenced_params(values)?;
        let merged = self.merge_bindings(&nested)?;
        self.bindings.extend(merged);
        self.placeholders.extend(names);
        Ok(())
    }

    /// Bindings of `nested` that are new to this builder. A name already bound to
    /// an equal value is shared; the same name bound to a different value fails.
    fn merge_bindings(&self, nested: &[&QueryBuilder]) -> OrmResult<Vec<Binding>> {
        let mut pending: Vec<Binding> = Vec::new();
        for sub in nested {
            for binding in &sub.bindings {
                if let Some(name) = binding.name.as_deref() {
                    let existing = self
                        .bindings
                        .iter()
                        .chain(pending.iter())
                        .find(|b| b.name.as_deref() == Some(name));
                    if let Some(existing) = existing {
                        if existing.value != binding.value {
                            return Err(OrmError::invalid_argument(format!(
                                "parameter '{name}' is bound to different values in merged queries"
                            )));
                        }
                        continue;
                    }
                }
                pending.push(binding.clone());
            }
        }
        Ok(pending)
    }

    // ==================== Bind list ====================

    /// Append one positional value to the bind list.
    pub fn bind(&mut self, value: impl Into<Value>) -> &mut Self {
        self.bindings.push(Binding::positional(value));
        self
    }

    /// Append one named value to the bind list.
    pub fn bind_named(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.bindings.push(Binding::named(name, value));
        self
    }

    /// Merge named values into the bind list, in iteration order.
    pub fn bind_many<I, K, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.bindings
            .extend(values.into_iter().map(|(k, v)| Binding::named(k, v)));
        self
    }

    /// Merge positional values into the bind list, in iteration order.
    pub fn bind_all<I, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.bindings
            .extend(values.into_iter().map(Binding::positional));
        self
    }

    // ==================== Rendering ====================

    /// Render through the bound grammar and notify the render hook.
    pub fn render(&self) -> OrmResult<String> {
        let sql = self.grammar.compile_query(self)?;
        self.notify(&sql);
        Ok(sql)
    }

    /// Alias for [`QueryBuilder::render`].
    pub fn to_sql(&self) -> OrmResult<String> {
        self.render()
    }

    pub(crate) fn notify(&self, sql: &str) {
        if let Some(hook) = &self.hook {
            hook.on_render(&RenderContext {
                kind: self.kind,
                dialect: self.grammar.name(),
                binding_count: self.bindings.len(),
                sql,
            });
        }
    }

    // ==================== Accessors (read by grammars) ====================

    pub fn grammar(&self) -> &Arc<dyn Grammar> {
        &self.grammar
    }

    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub fn select_list(&self) -> &[Expression] {
        &self.columns
    }

    pub fn from_list(&self) -> &[Expression] {
        &self.from
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    /// WHERE predicates grouped by column key, in first-seen key order.
    pub fn where_map(&self) -> &IndexMap<String, Vec<Predicate>> {
        &self.wheres
    }

    pub fn group_by_list(&self) -> &[Expression] {
        &self.groups
    }

    /// ORDER BY columns bucketed by direction, in first-seen direction order.
    pub fn order_map(&self) -> &IndexMap<Direction, Vec<Column>> {
        &self.orders
    }

    pub fn get_limit(&self) -> Option<i64> {
        self.limit
    }

    pub fn get_offset(&self) -> Option<i64> {
        self.offset
    }

    /// Target set by `into()`: the INSERT table, DELETE table or UPDATE table.
    pub fn target(&self) -> Option<&Expression> {
        self.target.as_ref()
    }

    pub fn insert_columns(&self) -> &[Expression] {
        &self.insert_columns
    }

    /// Insert rows, in call order.
    pub fn get_values(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn update_targets(&self) -> &[Expression] {
        &self.update_targets
    }

    /// UPDATE assignments keyed by column key; last write per key wins.
    pub fn assignments(&self) -> &IndexMap<String, (Column, Value)> {
        &self.assignments
    }

    pub fn is_delete(&self) -> bool {
        self.delete
    }

    pub fn union_list(&self) -> &[Union] {
        &self.unions
    }

    pub fn is_locked(&self) -> bool {
        self.lock
    }

    pub fn raw_text(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Parameter names referenced by predicates, inserts and assignments.
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }
}

impl fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("grammar", &self.grammar.name())
            .field("read_only", &self.read_only)
            .field("kind", &self.kind)
            .field("columns", &self.columns)
            .field("from", &self.from)
            .field("joins", &self.joins)
            .field("wheres", &self.wheres)
            .field("orders", &self.orders)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .field("rows", &self.rows)
            .field("bindings", &self.bindings)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sql = self.render().map_err(|_| fmt::Error)?;
        f.write_str(&sql)
    }
}
