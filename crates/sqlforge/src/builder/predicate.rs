//! WHERE predicates.
//!
//! Predicates are grouped by resolved column key in an insertion-ordered map: within a
//! key they keep call order, and keys keep first-seen order. `where a`, `where b`,
//! `or where a` therefore renders as `a ... OR a ... AND b ...`.

use std::sync::Arc;

use super::QueryBuilder;
use crate::column::{Column, resolve_column_key};
use crate::error::{OrmError, OrmResult};
use crate::operator::{Boolean, Operator};
use crate::value::{SubQuery, Value};
use crate::variants::WhereGroup;

/// One comparison condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Resolved column key the predicate is grouped under.
    pub key: String,
    /// Original reference, used for rendering.
    pub column: Column,
    /// `None` means the column expression itself is the condition.
    pub operator: Option<Operator>,
    pub value: Value,
    pub boolean: Boolean,
}

impl Predicate {
    /// Validate the operator, resolve the column key and check the value shape.
    pub fn new(
        column: Column,
        operator: Option<&str>,
        value: Value,
        boolean: Boolean,
    ) -> OrmResult<Self> {
        let operator = operator.map(Operator::parse).transpose()?;
        let key = resolve_column_key(&column)?;
        check_operand(operator, &value)?;
        Ok(Self {
            key,
            column,
            operator,
            value,
            boolean,
        })
    }
}

fn check_operand(operator: Option<Operator>, value: &Value) -> OrmResult<()> {
    match (operator, value) {
        (Some(Operator::In), Value::List(_) | Value::Query(_) | Value::Param(_)) => Ok(()),
        (Some(Operator::In), other) => Err(OrmError::invalid_argument(format!(
            "IN expects a list or sub-query, got {}",
            other.type_name()
        ))),
        (Some(Operator::Between), Value::List(bounds)) if bounds.len() == 2 => Ok(()),
        (Some(Operator::Between), _) => Err(OrmError::invalid_argument(
            "BETWEEN expects a list of exactly two bounds",
        )),
        _ => Ok(()),
    }
}

/// Parameter names `values` reference, in order, and the builders nested in them.
/// A nested builder contributes the names it recorded itself.
pub(crate) fn referenced_params(values: &[Value]) -> OrmResult<(Vec<String>, Vec<&QueryBuilder>)> {
    let mut names = Vec::new();
    let mut nested = Vec::new();
    for value in values {
        walk_value(value, &mut names, &mut nested)?;
    }
    Ok((names, nested))
}

fn walk_value<'v>(
    value: &'v Value,
    names: &mut Vec<String>,
    nested: &mut Vec<&'v QueryBuilder>,
) -> OrmResult<()> {
    match value {
        Value::Param(p) => {
            p.validate()?;
            names.push(p.name().to_string());
        }
        Value::List(items) => {
            for item in items {
                walk_value(item, names, nested)?;
            }
        }
        Value::Query(sub) | Value::Group(sub) => {
            names.extend(sub.builder().placeholders().iter().cloned());
            nested.push(sub.builder());
        }
        _ => {}
    }
    Ok(())
}

impl QueryBuilder {
    fn push_where(&mut self, predicate: Predicate) -> OrmResult<()> {
        self.track_values(std::slice::from_ref(&predicate.value))?;
        self.store_where(predicate);
        Ok(())
    }

    fn store_where(&mut self, predicate: Predicate) {
        self.wheres
            .entry(predicate.key.clone())
            .or_default()
            .push(predicate);
    }

    /// Full form of `where`: optional operator and an explicit connective.
    pub fn where_with(
        &mut self,
        column: impl Into<Column>,
        operator: Option<&str>,
        value: impl Into<Value>,
        boolean: Boolean,
    ) -> OrmResult<&mut Self> {
        let predicate = Predicate::new(column.into(), operator, value.into(), boolean)?;
        self.push_where(predicate)?;
        Ok(self)
    }

    /// Add `column <op> value`, joined with AND.
    pub fn where_(
        &mut self,
        column: impl Into<Column>,
        operator: &str,
        value: impl Into<Value>,
    ) -> OrmResult<&mut Self> {
        self.where_with(column, Some(operator), value, Boolean::And)
    }

    /// Alias for [`QueryBuilder::where_`].
    pub fn and_where(
        &mut self,
        column: impl Into<Column>,
        operator: &str,
        value: impl Into<Value>,
    ) -> OrmResult<&mut Self> {
        self.where_with(column, Some(operator), value, Boolean::And)
    }

    /// Add `column <op> value`, joined with OR.
    pub fn or_where(
        &mut self,
        column: impl Into<Column>,
        operator: &str,
        value: impl Into<Value>,
    ) -> OrmResult<&mut Self> {
        self.where_with(column, Some(operator), value, Boolean::Or)
    }

    /// Use the column expression itself as the condition (e.g. a deferred `EXISTS (...)`).
    pub fn where_expr(&mut self, column: impl Into<Column>, boolean: Boolean) -> OrmResult<&mut Self> {
        self.where_with(column, None, Value::Null, boolean)
    }

    /// Batch form: parallel lists zipped positionally.
    ///
    /// All three lists must have the same length. Nothing is stored unless every
    /// predicate is valid.
    pub fn where_many<C, V>(
        &mut self,
        columns: Vec<C>,
        operators: Vec<&str>,
        values: Vec<V>,
        boolean: Boolean,
    ) -> OrmResult<&mut Self>
    where
        C: Into<Column>,
        V: Into<Value>,
    {
        if columns.len() != operators.len() || columns.len() != values.len() {
            return Err(OrmError::invalid_argument(format!(
                "where lists must have the same length (columns: {}, operators: {}, values: {})",
                columns.len(),
                operators.len(),
                values.len()
            )));
        }
        let predicates = columns
            .into_iter()
            .zip(operators)
            .zip(values)
            .map(|((c, op), v)| Predicate::new(c.into(), Some(op), v.into(), boolean))
            .collect::<OrmResult<Vec<_>>>()?;
        let values: Vec<Value> = predicates.iter().map(|p| p.value.clone()).collect();
        self.track_values(&values)?;
        for predicate in predicates {
            self.store_where(predicate);
        }
        Ok(self)
    }

    /// `column IN (values...)`.
    pub fn where_in(&mut self, column: impl Into<Column>, values: impl Into<Value>) -> OrmResult<&mut Self> {
        self.where_with(column, Some("in"), values, Boolean::And)
    }

    /// `OR column IN (values...)`.
    pub fn or_where_in(
        &mut self,
        column: impl Into<Column>,
        values: impl Into<Value>,
    ) -> OrmResult<&mut Self> {
        self.where_with(column, Some("in"), values, Boolean::Or)
    }

    /// `column IS NULL`.
    pub fn where_null(&mut self, column: impl Into<Column>) -> OrmResult<&mut Self> {
        self.where_with(column, Some("="), Value::Null, Boolean::And)
    }

    /// `column IS NOT NULL`.
    pub fn where_not_null(&mut self, column: impl Into<Column>) -> OrmResult<&mut Self> {
        self.where_with(column, Some("!="), Value::Null, Boolean::And)
    }

    pub fn or_where_null(&mut self, column: impl Into<Column>) -> OrmResult<&mut Self> {
        self.where_with(column, Some("="), Value::Null, Boolean::Or)
    }

    pub fn or_where_not_null(&mut self, column: impl Into<Column>) -> OrmResult<&mut Self> {
        self.where_with(column, Some("!="), Value::Null, Boolean::Or)
    }

    /// Parenthesised group of predicates, joined with AND.
    pub fn where_group<F>(&mut self, build: F) -> OrmResult<&mut Self>
    where
        F: FnOnce(&mut WhereGroup) -> OrmResult<()>,
    {
        self.push_group(Boolean::And, build)
    }

    /// Parenthesised group of predicates, joined with OR.
    pub fn or_where_group<F>(&mut self, build: F) -> OrmResult<&mut Self>
    where
        F: FnOnce(&mut WhereGroup) -> OrmResult<()>,
    {
        self.push_group(Boolean::Or, build)
    }

    fn push_group<F>(&mut self, boolean: Boolean, build: F) -> OrmResult<&mut Self>
    where
        F: FnOnce(&mut WhereGroup) -> OrmResult<()>,
    {
        let mut group = WhereGroup::of(self);
        build(&mut group)?;
        let inner = group.into_inner();
        if inner.where_map().is_empty() {
            return Ok(self);
        }
        self.group_count += 1;
        let key = format!("#group{}", self.group_count);
        let predicate = Predicate {
            key: key.clone(),
            column: Column::Name(key),
            operator: None,
            value: Value::Group(SubQuery(Arc::new(inner))),
            boolean,
        };
        self.push_where(predicate)?;
        Ok(self)
    }

    /// Predicates stored under the column's resolved key, if any.
    pub fn get_where_by_column(&self, column: impl Into<Column>) -> OrmResult<Option<&[Predicate]>> {
        let key = resolve_column_key(&column.into())?;
        Ok(self.wheres.get(&key).map(Vec::as_slice))
    }
}
