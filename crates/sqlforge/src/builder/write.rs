//! INSERT, UPDATE and DELETE intents.
//!
//! All three fail with [`OrmError::ReadOnlyViolation`] on a read-only builder.

use super::QueryBuilder;
use super::predicate::referenced_params;
use crate::column::{Column, Expression, resolve_column_key};
use crate::error::{OrmError, OrmResult};
use crate::operator::QueryKind;
use crate::value::Value;

/// Conversion into one positional insert row.
pub trait IntoRow {
    fn into_row(self) -> Vec<Value>;
}

impl IntoRow for Vec<Value> {
    fn into_row(self) -> Vec<Value> {
        self
    }
}

impl<T: Into<Value>, const N: usize> IntoRow for [T; N] {
    fn into_row(self) -> Vec<Value> {
        self.into_iter().map(Into::into).collect()
    }
}

macro_rules! impl_into_row_for_tuple {
    ($($name:ident),+) => {
        impl<$($name: Into<Value>),+> IntoRow for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_row(self) -> Vec<Value> {
                let ($($name,)+) = self;
                vec![$($name.into()),+]
            }
        }
    };
}

impl_into_row_for_tuple!(A);
impl_into_row_for_tuple!(A, B);
impl_into_row_for_tuple!(A, B, C);
impl_into_row_for_tuple!(A, B, C, D);
impl_into_row_for_tuple!(A, B, C, D, E);
impl_into_row_for_tuple!(A, B, C, D, E, F);
impl_into_row_for_tuple!(A, B, C, D, E, F, G);
impl_into_row_for_tuple!(A, B, C, D, E, F, G, H);

impl QueryBuilder {
    /// Remove one recorded occurrence of each name, searching only the first
    /// `mark` entries (those recorded before the replacing value).
    fn forget_placeholders(&mut self, names: &[String], mut mark: usize) {
        for name in names.iter().rev() {
            if let Some(i) = self.placeholders[..mark].iter().rposition(|n| n == name) {
                self.placeholders.remove(i);
                mark -= 1;
            }
        }
    }

    /// Start an INSERT of the given columns.
    pub fn insert<I, E>(&mut self, columns: I) -> OrmResult<&mut Self>
    where
        I: IntoIterator<Item = E>,
        E: Into<Expression>,
    {
        self.ensure_writable("INSERT")?;
        self.set_kind(QueryKind::Insert)?;
        Self::push_expressions(&mut self.insert_columns, columns, "insert column")?;
        Ok(self)
    }

    /// Set the target table of an INSERT, UPDATE or DELETE.
    pub fn into(&mut self, table: impl Into<Expression>) -> OrmResult<&mut Self> {
        let table = table.into();
        table.validate("target")?;
        self.target = Some(table);
        Ok(self)
    }

    /// Append one insert row.
    pub fn values(&mut self, row: impl IntoRow) -> OrmResult<&mut Self> {
        let row = row.into_row();
        self.track_values(&row)?;
        self.rows.push(row);
        Ok(self)
    }

    /// Extend the most recent row: a list replaces the row, anything else is
    /// appended as its next field.
    pub fn value(&mut self, value: impl Into<Value>) -> OrmResult<&mut Self> {
        let value = value.into();
        if self.rows.is_empty() {
            return Err(OrmError::invalid_argument(
                "value() needs a row to extend; call values() first",
            ));
        }
        let last = self.rows.len() - 1;
        let replaced = match &value {
            Value::List(_) => referenced_params(&self.rows[last])?.0,
            _ => Vec::new(),
        };
        let mark = self.placeholders.len();
        self.track_values(std::slice::from_ref(&value))?;
        self.forget_placeholders(&replaced, mark);
        match value {
            Value::List(fields) => self.rows[last] = fields,
            field => self.rows[last].push(field),
        }
        Ok(self)
    }

    /// Start an UPDATE of the given tables.
    pub fn update<I, E>(&mut self, tables: I) -> OrmResult<&mut Self>
    where
        I: IntoIterator<Item = E>,
        E: Into<Expression>,
    {
        self.ensure_writable("UPDATE")?;
        self.set_kind(QueryKind::Update)?;
        Self::push_expressions(&mut self.update_targets, tables, "update")?;
        Ok(self)
    }

    /// Add several assignments; a later write to the same column replaces the
    /// earlier one in place.
    pub fn set<I, C, V>(&mut self, assignments: I) -> OrmResult<&mut Self>
    where
        I: IntoIterator<Item = (C, V)>,
        C: Into<Column>,
        V: Into<Value>,
    {
        let mut resolved = Vec::new();
        for (column, value) in assignments {
            let column = column.into();
            let key = resolve_column_key(&column)?;
            resolved.push((key, column, value.into()));
        }
        let values: Vec<Value> = resolved.iter().map(|(_, _, v)| v.clone()).collect();
        let mut replaced = Vec::new();
        for (key, _, _) in &resolved {
            if let Some((_, old)) = self.assignments.get(key) {
                replaced.extend(referenced_params(std::slice::from_ref(old))?.0);
            }
        }
        let mark = self.placeholders.len();
        self.track_values(&values)?;
        self.forget_placeholders(&replaced, mark);
        for (key, column, value) in resolved {
            self.assignments.insert(key, (column, value));
        }
        Ok(self)
    }

    /// Add one assignment.
    pub fn sets(&mut self, column: impl Into<Column>, value: impl Into<Value>) -> OrmResult<&mut Self> {
        self.set([(column.into(), value.into())])
    }

    /// Start a DELETE. The table comes from `into()` or the first FROM entry.
    pub fn delete(&mut self) -> OrmResult<&mut Self> {
        self.ensure_writable("DELETE")?;
        self.set_kind(QueryKind::Delete)?;
        self.delete = true;
        Ok(self)
    }
}
