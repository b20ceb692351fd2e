//! JOIN clauses.
//!
//! `join()` returns a [`JoinClause`] bound to the join it just added; ON predicates can
//! only be attached through that handle, so they always land on the right join no
//! matter how many joins are added afterwards.

use super::QueryBuilder;
use super::predicate::Predicate;
use crate::column::{Column, Expression};
use crate::error::OrmResult;
use crate::operator::{Boolean, JoinType};
use crate::value::Value;

/// One JOIN and its ON predicates.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinType,
    pub table: Expression,
    pub predicates: Vec<Predicate>,
}

/// Handle for attaching ON predicates to one join.
#[derive(Debug)]
pub struct JoinClause<'a> {
    builder: &'a mut QueryBuilder,
    index: usize,
}

impl<'a> JoinClause<'a> {
    /// Position of this join in the builder's join list.
    pub fn index(&self) -> usize {
        self.index
    }

    fn push(self, predicate: Predicate) -> OrmResult<Self> {
        self.builder
            .track_values(std::slice::from_ref(&predicate.value))?;
        self.builder.joins[self.index].predicates.push(predicate);
        Ok(self)
    }

    /// Full form: optional operator, any value, explicit connective.
    pub fn on_with(
        self,
        column: impl Into<Column>,
        operator: Option<&str>,
        value: impl Into<Value>,
        boolean: Boolean,
    ) -> OrmResult<Self> {
        let predicate = Predicate::new(column.into(), operator, value.into(), boolean)?;
        self.push(predicate)
    }

    /// `ON first <op> second`, comparing two columns.
    pub fn on(
        self,
        first: impl Into<Column>,
        operator: &str,
        second: impl Into<Column>,
    ) -> OrmResult<Self> {
        self.on_with(first, Some(operator), Value::Column(second.into()), Boolean::And)
    }

    /// Alias for [`JoinClause::on`].
    pub fn and_on(
        self,
        first: impl Into<Column>,
        operator: &str,
        second: impl Into<Column>,
    ) -> OrmResult<Self> {
        self.on(first, operator, second)
    }

    /// `OR first <op> second`.
    pub fn or_on(
        self,
        first: impl Into<Column>,
        operator: &str,
        second: impl Into<Column>,
    ) -> OrmResult<Self> {
        self.on_with(first, Some(operator), Value::Column(second.into()), Boolean::Or)
    }

    /// `ON column <op> value`, comparing against a literal or parameter.
    pub fn on_value(
        self,
        column: impl Into<Column>,
        operator: &str,
        value: impl Into<Value>,
    ) -> OrmResult<Self> {
        self.on_with(column, Some(operator), value, Boolean::And)
    }

    /// Return to the parent builder.
    pub fn done(self) -> &'a mut QueryBuilder {
        self.builder
    }
}

impl QueryBuilder {
    /// Add a join of the given kind and return a handle for its ON predicates.
    pub fn join(&mut self, table: impl Into<Expression>, kind: JoinType) -> OrmResult<JoinClause<'_>> {
        let table = table.into();
        table.validate("join")?;
        self.joins.push(Join {
            kind,
            table,
            predicates: Vec::new(),
        });
        let index = self.joins.len() - 1;
        Ok(JoinClause {
            builder: self,
            index,
        })
    }

    pub fn inner_join(&mut self, table: impl Into<Expression>) -> OrmResult<JoinClause<'_>> {
        self.join(table, JoinType::Inner)
    }

    pub fn left_join(&mut self, table: impl Into<Expression>) -> OrmResult<JoinClause<'_>> {
        self.join(table, JoinType::Left)
    }

    pub fn left_outer_join(&mut self, table: impl Into<Expression>) -> OrmResult<JoinClause<'_>> {
        self.join(table, JoinType::LeftOuter)
    }

    pub fn left_inner_join(&mut self, table: impl Into<Expression>) -> OrmResult<JoinClause<'_>> {
        self.join(table, JoinType::LeftInner)
    }

    pub fn right_join(&mut self, table: impl Into<Expression>) -> OrmResult<JoinClause<'_>> {
        self.join(table, JoinType::Right)
    }

    pub fn right_outer_join(&mut self, table: impl Into<Expression>) -> OrmResult<JoinClause<'_>> {
        self.join(table, JoinType::RightOuter)
    }

    pub fn right_inner_join(&mut self, table: impl Into<Expression>) -> OrmResult<JoinClause<'_>> {
        self.join(table, JoinType::RightInner)
    }

    pub fn outer_join(&mut self, table: impl Into<Expression>) -> OrmResult<JoinClause<'_>> {
        self.join(table, JoinType::Outer)
    }

    pub fn cross_join(&mut self, table: impl Into<Expression>) -> OrmResult<JoinClause<'_>> {
        self.join(table, JoinType::Cross)
    }

    pub fn full_join(&mut self, table: impl Into<Expression>) -> OrmResult<JoinClause<'_>> {
        self.join(table, JoinType::Full)
    }

    pub fn full_outer_join(&mut self, table: impl Into<Expression>) -> OrmResult<JoinClause<'_>> {
        self.join(table, JoinType::FullOuter)
    }
}
