//! Convenient imports for typical `sqlforge` usage.
//!
//! ```ignore
//! use sqlforge::prelude::*;
//! ```

pub use crate::{
    Boolean, BuilderConfig, Column, ColumnHandle, Dialect, Direction, GenericClient, JoinType,
    OrmError, OrmResult, QueryBuilder, QueryKind, Value, deferred, param,
};

#[cfg(feature = "tracing")]
pub use crate::TracingSqlHook;
