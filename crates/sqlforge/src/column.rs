//! Column references and projection expressions.
//!
//! A [`Column`] is anything that can name a column: a plain name, a mutable
//! [`ColumnHandle`], or a [`Deferred`] expression evaluated when it is resolved.
//! [`resolve_column_key`] reduces each of them to the string key the builder uses to
//! group predicates; the reference itself is kept for rendering.

use std::fmt;
use std::sync::Arc;

use crate::error::{OrmError, OrmResult};

/// A zero-argument function producing SQL text, evaluated lazily.
///
/// Deferred output is rendered verbatim; it is never quoted or escaped.
#[derive(Clone)]
pub struct Deferred(Arc<dyn Fn() -> String + Send + Sync>);

impl Deferred {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        Deferred(Arc::new(f))
    }

    /// Evaluate the expression.
    pub fn eval(&self) -> String {
        (self.0)()
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Deferred").field(&"<fn>").finish()
    }
}

impl PartialEq for Deferred {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Shorthand for [`Deferred::new`].
pub fn deferred<F>(f: F) -> Deferred
where
    F: Fn() -> String + Send + Sync + 'static,
{
    Deferred::new(f)
}

/// A structured, renameable column handle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnHandle {
    name: String,
}

impl ColumnHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
}

/// Anything that can reference a column.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Name(String),
    Handle(ColumnHandle),
    Deferred(Deferred),
}

impl Column {
    /// Build a column reference from any value with a canonical string form.
    pub fn display(value: impl fmt::Display) -> Self {
        Column::Name(value.to_string())
    }

    /// The raw text for this reference: the name, the handle's name, or the
    /// deferred expression's output.
    pub fn text(&self) -> String {
        match self {
            Column::Name(name) => name.clone(),
            Column::Handle(handle) => handle.name().to_string(),
            Column::Deferred(expr) => expr.eval(),
        }
    }
}

impl From<&str> for Column {
    fn from(value: &str) -> Self {
        Column::Name(value.to_string())
    }
}

impl From<String> for Column {
    fn from(value: String) -> Self {
        Column::Name(value)
    }
}

impl From<&String> for Column {
    fn from(value: &String) -> Self {
        Column::Name(value.clone())
    }
}

impl From<ColumnHandle> for Column {
    fn from(value: ColumnHandle) -> Self {
        Column::Handle(value)
    }
}

impl From<&ColumnHandle> for Column {
    fn from(value: &ColumnHandle) -> Self {
        Column::Handle(value.clone())
    }
}

impl From<Deferred> for Column {
    fn from(value: Deferred) -> Self {
        Column::Deferred(value)
    }
}

/// Reduce a column reference to the key predicates are grouped under.
pub fn resolve_column_key(column: &Column) -> OrmResult<String> {
    let key = column.text();
    if key.trim().is_empty() {
        return Err(OrmError::UnresolvableColumnReference(format!(
            "{column:?} resolves to an empty name"
        )));
    }
    Ok(key)
}

/// A projection, table or grouping expression.
///
/// `Text` is quoted by the grammar when it parses as an identifier; `Raw` and
/// `Deferred` output is emitted verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Text(String),
    Raw(String),
    Deferred(Deferred),
}

impl Expression {
    /// Reject empty text expressions.
    pub(crate) fn validate(&self, what: &str) -> OrmResult<()> {
        match self {
            Expression::Text(text) | Expression::Raw(text) if text.trim().is_empty() => Err(
                OrmError::invalid_argument(format!("{what} expression cannot be empty")),
            ),
            _ => Ok(()),
        }
    }

    pub fn text(&self) -> String {
        match self {
            Expression::Text(text) | Expression::Raw(text) => text.clone(),
            Expression::Deferred(expr) => expr.eval(),
        }
    }
}

impl From<&str> for Expression {
    fn from(value: &str) -> Self {
        Expression::Text(value.to_string())
    }
}

impl From<String> for Expression {
    fn from(value: String) -> Self {
        Expression::Text(value)
    }
}

impl From<Deferred> for Expression {
    fn from(value: Deferred) -> Self {
        Expression::Deferred(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_every_reference_shape() {
        assert_eq!(resolve_column_key(&"users.id".into()).unwrap(), "users.id");

        let mut handle = ColumnHandle::new("email");
        assert_eq!(resolve_column_key(&(&handle).into()).unwrap(), "email");
        handle.set_name("login_email");
        assert_eq!(resolve_column_key(&handle.into()).unwrap(), "login_email");

        let expr = deferred(|| "LOWER(name)".to_string());
        assert_eq!(resolve_column_key(&expr.into()).unwrap(), "LOWER(name)");

        assert_eq!(resolve_column_key(&Column::display(42)).unwrap(), "42");
    }

    #[test]
    fn deferred_is_evaluated_at_resolution_time() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let column = Column::from(deferred(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            "score".to_string()
        }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        resolve_column_key(&column).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn blank_reference_is_unresolvable() {
        let err = resolve_column_key(&Column::from("  ")).unwrap_err();
        assert!(matches!(err, OrmError::UnresolvableColumnReference(_)));
        let err = resolve_column_key(&deferred(String::new).into()).unwrap_err();
        assert!(matches!(err, OrmError::UnresolvableColumnReference(_)));
    }
}
