//! Running rendered statements through a [`GenericClient`].
//!
//! Every entry of the bind list becomes one positional parameter, in bind-list order.
//! The parameter type is inferred from the value: integers bind as integers, strings
//! and floats bind as text, and anything else is rejected with
//! [`OrmError::UnsupportedBindType`].

use std::error::Error;

use bytes::BytesMut;
use tokio_postgres::Row;
use tokio_postgres::types::{IsNull, ToSql, Type};

use crate::builder::QueryBuilder;
use crate::client::GenericClient;
use crate::error::{OrmError, OrmResult};
use crate::value::{Binding, Value};

/// A bind value with its inferred parameter type.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundParam {
    Int(i64),
    Text(String),
}

impl ToSql for BoundParam {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            // The server picks the integer width from context; narrow when it fits.
            BoundParam::Int(n) => match *ty {
                Type::INT2 => i16::try_from(*n)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*n)?.to_sql(ty, out),
                _ => n.to_sql(ty, out),
            },
            BoundParam::Text(s) => s.to_sql(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        matches!(*ty, Type::INT2 | Type::INT4 | Type::INT8) || <String as ToSql>::accepts(ty)
    }

    tokio_postgres::types::to_sql_checked!();
}

impl BoundParam {
    /// Infer the parameter type of one bind value.
    pub fn infer(value: &Value) -> OrmResult<Self> {
        match value {
            Value::Int(n) => Ok(BoundParam::Int(*n)),
            Value::Text(s) => Ok(BoundParam::Text(s.clone())),
            Value::Float(f) => Ok(BoundParam::Text(f.to_string())),
            other => Err(OrmError::UnsupportedBindType(format!(
                "cannot bind a {} value",
                other.type_name()
            ))),
        }
    }
}

/// Convert a whole bind list, failing on the first unsupported value.
pub fn bind_params(bindings: &[Binding]) -> OrmResult<Vec<BoundParam>> {
    bindings.iter().map(|b| BoundParam::infer(&b.value)).collect()
}

impl QueryBuilder {
    fn prepare_execution(&self) -> OrmResult<(String, Vec<BoundParam>)> {
        if self.grammar().name() != "postgres" {
            return Err(OrmError::invalid_argument(format!(
                "execution goes through tokio-postgres and needs the postgres grammar, not {}",
                self.grammar().name()
            )));
        }
        let params = bind_params(self.bindings())?;
        let sql = self.render()?;
        Ok((sql, params))
    }

    /// Render, bind and execute; returns the number of affected rows.
    pub async fn execute(&self, conn: &impl GenericClient) -> OrmResult<u64> {
        let (sql, params) = self.prepare_execution()?;
        let refs: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        conn.execute(&sql, &refs).await
    }

    /// Render, bind and run a row-returning statement.
    pub async fn query(&self, conn: &impl GenericClient) -> OrmResult<Vec<Row>> {
        let (sql, params) = self.prepare_execution()?;
        let refs: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        conn.query(&sql, &refs).await
    }

    /// Like [`QueryBuilder::query`], returning the first row.
    ///
    /// Returns [`OrmError::NotFound`] if no rows are returned.
    pub async fn query_one(&self, conn: &impl GenericClient) -> OrmResult<Row> {
        let (sql, params) = self.prepare_execution()?;
        let refs: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        conn.query_one(&sql, &refs).await
    }

    /// Like [`QueryBuilder::query`], returning the first row if there is one.
    pub async fn query_opt(&self, conn: &impl GenericClient) -> OrmResult<Option<Row>> {
        let (sql, params) = self.prepare_execution()?;
        let refs: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        conn.query_opt(&sql, &refs).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn infers_int_and_text() {
        let bindings = vec![
            Binding::named("a", 1),
            Binding::named("b", "x"),
            Binding::positional(2.5),
        ];
        assert_eq!(
            bind_params(&bindings).unwrap(),
            vec![
                BoundParam::Int(1),
                BoundParam::Text("x".to_string()),
                BoundParam::Text("2.5".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_other_types() {
        for value in [
            Value::List(vec![Value::Int(1)]),
            Value::Null,
            Value::Bool(true),
            Value::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()),
        ] {
            let err = BoundParam::infer(&value).unwrap_err();
            assert!(matches!(err, OrmError::UnsupportedBindType(_)), "{value:?}");
        }
    }

    #[test]
    fn accepts_integer_and_text_columns() {
        assert!(<BoundParam as ToSql>::accepts(&Type::INT4));
        assert!(<BoundParam as ToSql>::accepts(&Type::INT8));
        assert!(<BoundParam as ToSql>::accepts(&Type::TEXT));
        assert!(<BoundParam as ToSql>::accepts(&Type::VARCHAR));
        assert!(!<BoundParam as ToSql>::accepts(&Type::BOOL));
    }

    #[test]
    fn narrows_to_int4() {
        let mut out = BytesMut::new();
        BoundParam::Int(7).to_sql(&Type::INT4, &mut out).unwrap();
        assert_eq!(&out[..], &7i32.to_be_bytes());

        let mut out = BytesMut::new();
        assert!(BoundParam::Int(i64::MAX).to_sql(&Type::INT4, &mut out).is_err());
    }
}
