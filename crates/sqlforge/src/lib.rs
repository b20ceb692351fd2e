//! # sqlforge
//!
//! A fluent SQL statement builder with pluggable dialect grammars.
//!
//! ## Features
//!
//! - **Eager validation**: every mutator checks its input at the call site
//!   (operator catalog, column references, read-only flag, statement kind)
//! - **One builder, many dialects**: MySQL, PostgreSQL, SQLite and SQL Server grammars
//!   render the same builder state
//! - **Explicit joins**: `join()` hands back a handle, ON predicates attach through it
//! - **Parameters**: named bind markers plus an ordered bind list
//! - **Execution**: run rendered statements through `tokio-postgres`
//! - **Observability**: render hooks, with a `tracing` hook built in
//!
//! ## Example
//!
//! ```ignore
//! use sqlforge::prelude::*;
//!
//! let config = BuilderConfig::new().dialect(Dialect::Postgres);
//!
//! let mut qb = config.query();
//! qb.select(["u.id", "u.email"])?
//!     .from(["users as u"])?
//!     .left_join("orders as o")?
//!     .on("o.user_id", "=", "u.id")?
//!     .done()
//!     .where_("u.status", "=", param("status"))?
//!     .where_in("u.role", vec!["admin", "owner"])?
//!     .newest("u.created_at")?
//!     .limit(20);
//! qb.bind_named("status", "active");
//!
//! let rows = qb.query(&client).await?;
//! ```

pub mod builder;
pub mod client;
pub mod column;
pub mod config;
pub mod error;
pub mod execute;
pub mod grammar;
pub mod hook;
pub mod ident;
pub mod operator;
pub mod prelude;
pub mod value;
pub mod variants;

pub use builder::{IntoRow, Join, JoinClause, OrderColumns, OrderSpec, Predicate, QueryBuilder, Union};
pub use client::GenericClient;
pub use column::{Column, ColumnHandle, Deferred, Expression, deferred, resolve_column_key};
pub use config::{BuilderConfig, Dialect};
pub use error::{OrmError, OrmResult};
pub use execute::{BoundParam, bind_params};
pub use grammar::{Grammar, MySql, Postgres, SqlServer, Sqlite};
pub use hook::{RenderContext, RenderHook};
pub use ident::{Ident, IdentPart, Quote};
pub use operator::{Boolean, Direction, JoinType, Operator, QueryKind, is_valid_operator};
pub use value::{Binding, Parameter, SubQuery, Value, param};
pub use variants::{GroupConcat, WhereGroup};

#[cfg(feature = "tracing")]
pub use hook::TracingSqlHook;
