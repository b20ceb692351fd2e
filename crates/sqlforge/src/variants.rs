//! Builders that are always SELECT expressions.
//!
//! Both wrap a [`QueryBuilder`] whose kind is already `Select`, and deref to it so the
//! whole mutation API is available. Calling `insert`/`update`/`delete`/`raw` on them
//! fails with `KindConflict`.

use std::ops::{Deref, DerefMut};

use crate::builder::QueryBuilder;
use crate::column::Expression;
use crate::error::{OrmError, OrmResult};
use crate::operator::QueryKind;

fn preset_select(mut builder: QueryBuilder) -> OrmResult<QueryBuilder> {
    builder.set_kind(QueryKind::Select)?;
    Ok(builder)
}

/// A sub-builder for a parenthesised predicate group.
#[derive(Debug, Clone)]
pub struct WhereGroup(QueryBuilder);

impl WhereGroup {
    /// A fresh group sharing `parent`'s grammar, hook and read-only flag.
    pub fn of(parent: &QueryBuilder) -> Self {
        WhereGroup(parent.new_select())
    }

    /// Wrap an existing builder; fails if it already holds another intent.
    pub fn try_from_builder(builder: QueryBuilder) -> OrmResult<Self> {
        preset_select(builder).map(WhereGroup)
    }

    pub fn into_inner(self) -> QueryBuilder {
        self.0
    }
}

impl Deref for WhereGroup {
    type Target = QueryBuilder;

    fn deref(&self) -> &QueryBuilder {
        &self.0
    }
}

impl DerefMut for WhereGroup {
    fn deref_mut(&mut self) -> &mut QueryBuilder {
        &mut self.0
    }
}

/// Concatenate columns per group into one delimited string.
///
/// Renders as a full SELECT of the dialect's concat aggregate, aliased, using this
/// builder's FROM, WHERE and GROUP BY clauses.
#[derive(Debug, Clone)]
pub struct GroupConcat {
    builder: QueryBuilder,
    columns: Vec<Expression>,
    separator: String,
    alias: String,
}

impl GroupConcat {
    fn with_builder(builder: QueryBuilder) -> Self {
        Self {
            builder,
            columns: Vec::new(),
            separator: ",".to_string(),
            alias: "concat".to_string(),
        }
    }

    /// A fresh concat builder sharing `parent`'s grammar, hook and read-only flag.
    pub fn of(parent: &QueryBuilder) -> Self {
        Self::with_builder(parent.new_select())
    }

    /// Wrap an existing builder; fails if it already holds another intent.
    pub fn try_from_builder(builder: QueryBuilder) -> OrmResult<Self> {
        preset_select(builder).map(Self::with_builder)
    }

    /// Columns concatenated inside each row before aggregation.
    pub fn columns<I, E>(&mut self, columns: I) -> OrmResult<&mut Self>
    where
        I: IntoIterator<Item = E>,
        E: Into<Expression>,
    {
        for column in columns {
            let column = column.into();
            column.validate("concat column")?;
            self.columns.push(column);
        }
        Ok(self)
    }

    /// Delimiter placed between aggregated values (default `,`).
    pub fn separator(&mut self, separator: impl Into<String>) -> &mut Self {
        self.separator = separator.into();
        self
    }

    /// Output column alias (default `concat`).
    pub fn alias(&mut self, alias: impl Into<String>) -> OrmResult<&mut Self> {
        let alias = alias.into();
        if alias.trim().is_empty() {
            return Err(OrmError::invalid_argument("concat alias cannot be empty"));
        }
        self.alias = alias;
        Ok(self)
    }

    pub fn concat_columns(&self) -> &[Expression] {
        &self.columns
    }

    pub fn get_separator(&self) -> &str {
        &self.separator
    }

    pub fn get_alias(&self) -> &str {
        &self.alias
    }

    /// Render through the builder's grammar and notify its hook.
    pub fn render(&self) -> OrmResult<String> {
        let sql = self.builder.grammar().compile_concat(self)?;
        self.builder.notify(&sql);
        Ok(sql)
    }

    pub fn to_sql(&self) -> OrmResult<String> {
        self.render()
    }

    pub fn into_inner(self) -> QueryBuilder {
        self.builder
    }
}

impl Deref for GroupConcat {
    type Target = QueryBuilder;

    fn deref(&self) -> &QueryBuilder {
        &self.builder
    }
}

impl DerefMut for GroupConcat {
    fn deref_mut(&mut self) -> &mut QueryBuilder {
        &mut self.builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuilderConfig;

    #[test]
    fn where_group_is_a_select() {
        let mut group = BuilderConfig::new().where_group();
        assert_eq!(group.kind(), QueryKind::Select);
        let err = group.delete().unwrap_err();
        assert!(matches!(err, OrmError::KindConflict { .. }));
    }

    #[test]
    fn wrapping_a_write_builder_conflicts() {
        let mut qb = BuilderConfig::new().query();
        qb.delete().unwrap();
        assert!(WhereGroup::try_from_builder(qb.clone()).is_err());
        assert!(GroupConcat::try_from_builder(qb).is_err());
    }

    #[test]
    fn group_concat_rejects_empty_alias() {
        let mut concat = BuilderConfig::new().group_concat();
        assert!(concat.alias(" ").is_err());
        assert_eq!(concat.get_alias(), "concat");
        assert_eq!(concat.get_separator(), ",");
    }
}
