//! ORDER BY and GROUP BY.
//!
//! ORDER BY columns are stored in buckets keyed by direction, so
//! `order_by(["a", "b"], "DESC")` and two single-column DESC calls produce the same
//! clause. Grammars emit buckets in first-seen direction order.

use super::QueryBuilder;
use crate::column::{Column, ColumnHandle, Deferred, Expression, resolve_column_key};
use crate::error::{OrmError, OrmResult};
use crate::operator::Direction;

/// Columns given to `order_by`.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderColumns {
    One(Column),
    Many(Vec<Column>),
}

/// Directions given to `order_by`: one for all columns, or one per column.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderSpec {
    One(String),
    Each(Vec<String>),
}

impl From<&str> for OrderColumns {
    fn from(value: &str) -> Self {
        OrderColumns::One(value.into())
    }
}

impl From<String> for OrderColumns {
    fn from(value: String) -> Self {
        OrderColumns::One(value.into())
    }
}

impl From<Column> for OrderColumns {
    fn from(value: Column) -> Self {
        OrderColumns::One(value)
    }
}

impl From<ColumnHandle> for OrderColumns {
    fn from(value: ColumnHandle) -> Self {
        OrderColumns::One(value.into())
    }
}

impl From<Deferred> for OrderColumns {
    fn from(value: Deferred) -> Self {
        OrderColumns::One(value.into())
    }
}

impl<C: Into<Column>> From<Vec<C>> for OrderColumns {
    fn from(value: Vec<C>) -> Self {
        OrderColumns::Many(value.into_iter().map(Into::into).collect())
    }
}

impl<C: Into<Column>, const N: usize> From<[C; N]> for OrderColumns {
    fn from(value: [C; N]) -> Self {
        OrderColumns::Many(value.into_iter().map(Into::into).collect())
    }
}

impl From<&str> for OrderSpec {
    fn from(value: &str) -> Self {
        OrderSpec::One(value.to_string())
    }
}

impl From<Direction> for OrderSpec {
    fn from(value: Direction) -> Self {
        OrderSpec::One(value.as_sql().to_string())
    }
}

impl From<Vec<&str>> for OrderSpec {
    fn from(value: Vec<&str>) -> Self {
        OrderSpec::Each(value.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for OrderSpec {
    fn from(value: [&str; N]) -> Self {
        OrderSpec::Each(value.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<Direction>> for OrderSpec {
    fn from(value: Vec<Direction>) -> Self {
        OrderSpec::Each(value.into_iter().map(|d| d.as_sql().to_string()).collect())
    }
}

impl QueryBuilder {
    /// Order by one or more columns.
    ///
    /// A single column takes a single direction. A list of columns takes either one
    /// direction for all of them or a list of directions of the same length.
    pub fn order_by(
        &mut self,
        columns: impl Into<OrderColumns>,
        order: impl Into<OrderSpec>,
    ) -> OrmResult<&mut Self> {
        let pairs: Vec<(Column, Direction)> = match (columns.into(), order.into()) {
            (OrderColumns::One(column), OrderSpec::One(dir)) => {
                vec![(column, Direction::parse(&dir)?)]
            }
            (OrderColumns::One(_), OrderSpec::Each(_)) => {
                return Err(OrmError::invalid_argument(
                    "a single order column takes a single direction",
                ));
            }
            (OrderColumns::Many(columns), OrderSpec::One(dir)) => {
                let dir = Direction::parse(&dir)?;
                columns.into_iter().map(|c| (c, dir)).collect()
            }
            (OrderColumns::Many(columns), OrderSpec::Each(dirs)) => {
                if columns.len() != dirs.len() {
                    return Err(OrmError::invalid_argument(format!(
                        "got {} order columns but {} directions",
                        columns.len(),
                        dirs.len()
                    )));
                }
                columns
                    .into_iter()
                    .zip(dirs.iter())
                    .map(|(c, d)| Direction::parse(d).map(|d| (c, d)))
                    .collect::<OrmResult<_>>()?
            }
        };
        for (column, _) in &pairs {
            resolve_column_key(column)?;
        }
        for (column, dir) in pairs {
            self.orders.entry(dir).or_default().push(column);
        }
        Ok(self)
    }

    /// `ORDER BY column DESC`.
    pub fn newest(&mut self, column: impl Into<Column>) -> OrmResult<&mut Self> {
        self.order_by(OrderColumns::One(column.into()), Direction::Desc)
    }

    /// `ORDER BY column ASC`.
    pub fn oldest(&mut self, column: impl Into<Column>) -> OrmResult<&mut Self> {
        self.order_by(OrderColumns::One(column.into()), Direction::Asc)
    }

    /// Append GROUP BY expressions.
    pub fn group_by<I, E>(&mut self, columns: I) -> OrmResult<&mut Self>
    where
        I: IntoIterator<Item = E>,
        E: Into<Expression>,
    {
        Self::push_expressions(&mut self.groups, columns, "group by")?;
        Ok(self)
    }
}
