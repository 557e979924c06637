//! Query builders for SELECT statements and set operations.
//!
//! # Features
//!
//! - **Unified expression layer**: AND/OR/NOT groups with automatic placeholder numbering
//! - **One traversal**: placeholder indices are assigned while rendering, never patched afterwards
//! - **Arc-based parameters**: builders and frozen queries are cheap to clone
//! - **Shared pagination**: SELECT and UNION paginate through the same [`Paginate`] trait
//! - **Dialect-aware**: quoting, placeholders, LIMIT spelling and set-operation support
//!   come from a [`Dialect`](crate::Dialect)
//!
//! # Usage
//!
//! ```ignore
//! use sqlcompose::prelude::*;
//!
//! // Plain SELECT
//! let built = qb::select("users")
//!     .eq("status", "active")
//!     .order_by_desc("created_at")
//!     .limit(20)
//!     .build(&Postgres)?;
//!
//! // Set operations with nested branches
//! let built = qb::select("customers")
//!     .columns(&["email"])
//!     .union(|qb| qb.from("suppliers").columns(&["email"]))
//!     .intersect_all_with(|qb| qb.from("subscribers").columns(&["email"]))
//!     .order_by("email")
//!     .build(&Postgres)?;
//! ```

mod expr;
mod pagination;
mod param;
mod select;
mod set_op;
mod traits;
mod union;
mod writer;

pub use expr::{Direction, Expr, ExprGroup};
pub use pagination::{Paginate, Pagination};
pub use param::{Param, ParamList};
pub use select::{Join, JoinKind, Select, SelectQb};
pub use set_op::{SetOp, SetOpKind, SetQuantifier};
pub use traits::SqlQb;
pub use union::{IntoQuery, Query, Union, UnionQb};
pub use writer::{BuiltQuery, SqlWriter, WriteSql};

/// Create a SELECT query builder for the given table.
///
/// # Example
/// ```ignore
/// let qb = sqlcompose::qb::select("users").eq("id", 1);
/// ```
pub fn select(table: &str) -> SelectQb {
    SelectQb::new(table)
}

/// Create a SELECT query builder with a custom FROM expression.
///
/// Use this for complex FROM clauses like aliases or table functions.
///
/// # Example
/// ```ignore
/// let qb = sqlcompose::qb::select_from("users u").inner_join("orders o", "u.id = o.user_id");
/// ```
pub fn select_from(from_expr: &str) -> SelectQb {
    SelectQb::from_expr(from_expr)
}

/// Start a set-operation query from an initial operand.
///
/// # Example
/// ```ignore
/// let qb = sqlcompose::qb::union(qb::select("a")).union_all(qb::select("b"));
/// ```
pub fn union(initial: impl IntoQuery) -> UnionQb {
    UnionQb::new(initial)
}

/// Start a set-operation query whose initial operand is built by `initial`
/// from a fresh SELECT builder.
///
/// # Example
/// ```ignore
/// let qb = sqlcompose::qb::union_with(|qb| qb.from("a").columns(&["id"]))
///     .union_all_with(|qb| qb.from("b").columns(&["id"]));
/// ```
pub fn union_with<F, R>(initial: F) -> UnionQb
where
    F: FnOnce(SelectQb) -> R,
    R: IntoQuery,
{
    UnionQb::new(initial(SelectQb::empty()))
}
