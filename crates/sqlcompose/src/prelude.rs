//! Convenient imports for typical `sqlcompose` usage.
//!
//! This module is intentionally small and focused on the most common APIs so
//! callers can start with:
//!
//! ```ignore
//! use sqlcompose::prelude::*;
//! ```

pub use crate::qb;
pub use crate::{
    BuiltQuery, Dialect, DialectKind, Direction, Expr, IntoIdent, MySql, Paginate, Postgres,
    QbError, QbResult, SelectQb, SetOp, SqlQb, SqlServer, Sqlite, UnionQb,
};
