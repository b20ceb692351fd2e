//! Values that flow into predicates, inserts and the bind list.
//!
//! Literal values are rendered inline by the grammar (quoted and escaped per
//! dialect). [`Parameter`] values render as a bind marker instead; the value for
//! the marker is supplied separately through the builder's bind list. Values that
//! come from untrusted input should always go through a parameter.

use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use crate::builder::QueryBuilder;
use crate::column::Column;
use crate::error::{OrmError, OrmResult};

/// A named bind marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: String,
}

impl Parameter {
    /// Create a parameter; a leading `:` is accepted and dropped.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let name = name.strip_prefix(':').map(str::to_string).unwrap_or(name);
        Self { name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn validate(&self) -> OrmResult<()> {
        let mut chars = self.name.chars();
        let valid = match chars.next() {
            Some(c) if c == '_' || c.is_ascii_alphabetic() => {
                chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
            }
            _ => false,
        };
        if valid {
            Ok(())
        } else {
            Err(OrmError::invalid_argument(format!(
                "invalid parameter name '{}'",
                self.name
            )))
        }
    }
}

/// Shorthand for a [`Value::Param`].
pub fn param(name: impl Into<String>) -> Value {
    Value::Param(Parameter::new(name))
}

/// A builder embedded in another builder (sub-query or predicate group).
#[derive(Clone)]
pub struct SubQuery(pub(crate) Arc<QueryBuilder>);

impl SubQuery {
    pub fn builder(&self) -> &QueryBuilder {
        &self.0
    }
}

impl fmt::Debug for SubQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SubQuery").field(&self.0.kind()).finish()
    }
}

impl PartialEq for SubQuery {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// A predicate operand, insert field or bind value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// Rendered as a bind marker.
    Param(Parameter),
    /// Another column, rendered as an identifier (`a.id = b.a_id`).
    Column(Column),
    /// Composite value: `IN` lists, `BETWEEN` bounds, whole insert rows.
    List(Vec<Value>),
    /// A sub-query, rendered in parentheses.
    Query(SubQuery),
    /// A nested predicate group, rendered as `( ... )`.
    Group(SubQuery),
}

impl Value {
    /// Reference another column instead of a literal.
    pub fn column(column: impl Into<Column>) -> Self {
        Value::Column(column.into())
    }

    /// Embed a sub-query.
    pub fn query(builder: QueryBuilder) -> Self {
        Value::Query(SubQuery(Arc::new(builder)))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "string",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Param(_) => "parameter",
            Value::Column(_) => "column",
            Value::List(_) => "list",
            Value::Query(_) => "query",
            Value::Group(_) => "group",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<Parameter> for Value {
    fn from(v: Parameter) -> Self {
        Value::Param(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

/// One entry of the bind list.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    /// Parameter name, or `None` for positional bindings.
    pub name: Option<String>,
    pub value: Value,
}

impl Binding {
    pub fn positional(value: impl Into<Value>) -> Self {
        Self {
            name: None,
            value: value.into(),
        }
    }

    pub fn named(name: impl Into<String>, value: impl Into<Value>) -> Self {
        let Parameter { name } = Parameter::new(name);
        Self {
            name: Some(name),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_strips_colon() {
        let p = Parameter::new(":user_id");
        assert_eq!(p.name(), "user_id");
        assert!(p.validate().is_ok());
        assert!(Parameter::new("1abc").validate().is_err());
        assert!(Parameter::new("").validate().is_err());
    }

    #[test]
    fn conversions() {
        assert_eq!(Value::from(Some(3)), Value::Int(3));
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(
            Value::from(vec![1, 2]),
            Value::List(vec![Value::Int(1), Value::Int(2)])
        );
        assert_eq!(Binding::named(":a", 1).name.as_deref(), Some("a"));
    }
}
