//! # sqlcompose
//!
//! A dialect-agnostic builder and serializer for SQL SELECT statements and
//! set operations.
//!
//! ## Features
//!
//! - **SQL explicit**: builders map one-to-one onto SQL clauses, raw fragments are always available
//! - **Set operations**: UNION / INTERSECT / EXCEPT with DISTINCT or ALL, nested to any depth
//! - **Shared pagination**: ORDER BY / LIMIT / OFFSET behave the same on SELECT and on combined queries
//! - **Dialects**: PostgreSQL, MySQL, SQLite and SQL Server built in, or describe your own
//! - **Bound parameters**: values never appear in SQL text; they come back in placeholder order
//!
//! ## Query Builder (qb)
//!
//! ```ignore
//! use sqlcompose::prelude::*;
//!
//! let built = qb::select("orders")
//!     .columns(&["id", "total"])
//!     .eq("status", "open")
//!     .union_all_with(|qb| {
//!         qb.from("archived_orders")
//!             .columns(&["id", "total"])
//!             .eq("status", "open")
//!     })
//!     .order_by_desc("total")
//!     .limit(10)
//!     .build(&Postgres)?;
//!
//! assert_eq!(
//!     built.sql,
//!     "SELECT id, total FROM orders WHERE status = $1 \
//!      UNION ALL SELECT id, total FROM archived_orders WHERE status = $2 \
//!      ORDER BY total DESC LIMIT 10"
//! );
//! client.query(&built.sql, &built.params_ref()).await?;
//! ```

pub mod dialect;
pub mod error;
pub mod ident;
pub mod prelude;
pub mod qb;

pub use dialect::{
    Dialect, DialectKind, GenericDialect, LimitStyle, MySql, NestedOperand, Placeholder, Postgres,
    SetOpFeatures, SqlServer, Sqlite,
};
pub use error::{QbError, QbResult};
pub use ident::{Ident, IdentPart, IntoIdent};

// Re-export qb module for easy access
pub use qb::{
    BuiltQuery, Direction, Expr, ExprGroup, IntoQuery, Paginate, Pagination, Param, ParamList,
    Query, Select, SelectQb, SetOp, SetOpKind, SetQuantifier, SqlQb, Union, UnionQb, select,
    select_from, union, union_with,
};
