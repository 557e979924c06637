//! Set-operation queries (UNION / INTERSECT / EXCEPT).
//!
//! A [`Union`] is an initial query followed by zero or more branches, each
//! tagged with the [`SetOp`] that joins it to everything before it. Branches
//! apply strictly left to right: on engines where INTERSECT binds tighter,
//! the query written so far is parenthesized before an INTERSECT that
//! follows a UNION or EXCEPT. ORDER BY / LIMIT / OFFSET on a `Union` apply
//! once, to the combined result.
//!
//! # Example
//! ```ignore
//! use sqlcompose::prelude::*;
//!
//! let built = qb::select("active_users")
//!     .columns(&["id", "email"])
//!     .union_all_with(|qb| qb.from("invited_users").columns(&["id", "email"]))
//!     .except(|qb| qb.from("banned_users").columns(&["id", "email"]))
//!     .order_by("email")
//!     .limit(50)
//!     .build(&Postgres)?;
//! ```

use crate::dialect::{Dialect, NestedOperand, SetOpFeatures};
use crate::error::{QbError, QbResult};
use crate::qb::pagination::{Paginate, Pagination};
use crate::qb::select::{Select, SelectQb};
use crate::qb::set_op::{SetOp, SetOpKind, SetQuantifier};
use crate::qb::traits::SqlQb;
use crate::qb::writer::{SqlWriter, WriteSql};

/// An operand of a set operation: a plain SELECT or a nested combined query.
#[derive(Clone, Debug)]
pub enum Query {
    Select(Select),
    Union(Box<Union>),
}

impl Query {
    /// Pagination attached to this query itself.
    pub fn pagination(&self) -> &Pagination {
        match self {
            Query::Select(select) => &select.pagination,
            Query::Union(union) => &union.pagination,
        }
    }

    /// True for a union that renders more than one operand.
    pub fn is_compound(&self) -> bool {
        matches!(self, Query::Union(union) if union.is_compound())
    }
}

impl From<Select> for Query {
    fn from(select: Select) -> Self {
        Query::Select(select)
    }
}

impl From<Union> for Query {
    fn from(union: Union) -> Self {
        Query::Union(Box::new(union))
    }
}

impl WriteSql for Query {
    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        match self {
            Query::Select(select) => select.write_sql(w),
            Query::Union(union) => union.write_sql(w),
        }
    }
}

impl SqlQb for Query {}

/// Conversion into a set operand, surfacing any error a builder recorded.
pub trait IntoQuery {
    fn into_query(self) -> QbResult<Query>;
}

impl IntoQuery for Query {
    fn into_query(self) -> QbResult<Query> {
        Ok(self)
    }
}

impl IntoQuery for Select {
    fn into_query(self) -> QbResult<Query> {
        Ok(Query::Select(self))
    }
}

impl IntoQuery for Union {
    fn into_query(self) -> QbResult<Query> {
        Ok(Query::from(self))
    }
}

impl IntoQuery for SelectQb {
    fn into_query(self) -> QbResult<Query> {
        self.finish().map(Query::Select)
    }
}

impl IntoQuery for UnionQb {
    fn into_query(self) -> QbResult<Query> {
        self.finish().map(Query::from)
    }
}

/// A frozen set-operation query.
#[derive(Clone, Debug)]
pub struct Union {
    /// Left-most operand.
    pub initial: Query,
    /// Appended operands with the combinator joining each one.
    pub branches: Vec<(SetOp, Query)>,
    /// Applies to the combined result.
    pub pagination: Pagination,
}

impl Union {
    /// A union holding only `initial`.
    pub fn new(initial: impl Into<Query>) -> Self {
        Self {
            initial: initial.into(),
            branches: Vec::new(),
            pagination: Pagination::new(),
        }
    }

    /// Append a branch.
    pub fn add(&mut self, op: SetOp, query: impl Into<Query>) {
        self.branches.push((op, query.into()));
    }

    /// Number of operands, including the initial one.
    pub fn len(&self) -> usize {
        1 + self.branches.len()
    }

    /// Whether rendering produces more than one operand, either through its
    /// own branches or through a compound initial query.
    pub fn is_compound(&self) -> bool {
        !self.branches.is_empty() || self.initial.is_compound()
    }

    /// For each branch, whether everything written before it must be closed
    /// off as one operand so that left-to-right evaluation survives an
    /// INTERSECT that would otherwise bind to its left neighbor only.
    fn prefix_breaks(&self, features: &SetOpFeatures) -> Vec<bool> {
        let mut loose = false;
        self.branches
            .iter()
            .map(|(op, _)| {
                if !features.intersect_binds_tighter {
                    return false;
                }
                match op.kind {
                    SetOpKind::Intersect if loose => {
                        loose = false;
                        true
                    }
                    SetOpKind::Intersect => false,
                    SetOpKind::Union | SetOpKind::Except => {
                        loose = true;
                        false
                    }
                }
            })
            .collect()
    }
}

fn write_set_op(op: SetOp, w: &mut SqlWriter<'_>) {
    let dialect = w.dialect();
    let features = dialect.set_op_features();
    if !features.supports(op) {
        w.fail(QbError::unsupported(dialect.name(), op.to_string()));
        return;
    }
    w.write(" ");
    w.write(dialect.set_op_keyword(op.kind));
    match op.quantifier {
        SetQuantifier::All => w.write(" ALL"),
        SetQuantifier::Distinct if features.explicit_distinct => w.write(" DISTINCT"),
        SetQuantifier::Distinct => {}
    }
    w.write(" ");
}

fn isolation(dialect: &dyn Dialect) -> NestedOperand {
    if dialect.set_op_features().parenthesized_operands {
        NestedOperand::Parentheses
    } else {
        dialect.nested_operand()
    }
}

fn open_isolated(style: NestedOperand, w: &mut SqlWriter<'_>) {
    match style {
        NestedOperand::Parentheses => w.write("("),
        NestedOperand::DerivedTable => w.write("SELECT * FROM ("),
    }
}

/// Write one operand, isolating it when it is itself compound, carries its
/// own ORDER BY / LIMIT / OFFSET, or the dialect wraps every operand.
fn write_operand(query: &Query, w: &mut SqlWriter<'_>) {
    let dialect = w.dialect();
    let always = dialect.set_op_features().parenthesized_operands;
    if !always && !query.is_compound() && query.pagination().is_empty() {
        query.write_sql(w);
        return;
    }

    open_isolated(isolation(dialect), w);
    query.write_sql(w);
    w.write(")");
}

impl WriteSql for Union {
    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        if self.branches.is_empty() && self.pagination.is_empty() {
            self.initial.write_sql(w);
            return;
        }

        let dialect = w.dialect();
        let breaks = self.prefix_breaks(&dialect.set_op_features());
        let style = isolation(dialect);
        for _ in breaks.iter().filter(|b| **b) {
            open_isolated(style, w);
        }

        write_operand(&self.initial, w);
        for ((op, query), close_prefix) in self.branches.iter().zip(&breaks) {
            if *close_prefix {
                w.write(")");
            }
            write_set_op(*op, w);
            if w.has_failed() {
                return;
            }
            write_operand(query, w);
        }
        self.pagination.write_sql(w);
    }
}

impl SqlQb for Union {}

impl Paginate for Union {
    fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    fn pagination_mut(&mut self) -> &mut Pagination {
        &mut self.pagination
    }
}

/// Set-operation query builder.
///
/// Every append is purely additive: earlier branches and their combinators
/// are never reordered or removed. The closure forms hand a fresh
/// [`SelectQb::empty`] to the caller; returning a [`UnionQb`] from the
/// closure nests a combined query as a single operand.
#[derive(Clone, Debug)]
#[must_use]
pub struct UnionQb {
    union: Union,
    build_error: Option<QbError>,
}

impl UnionQb {
    /// Start from an initial query.
    pub fn new(initial: impl IntoQuery) -> Self {
        match initial.into_query() {
            Ok(query) => Self {
                union: Union::new(query),
                build_error: None,
            },
            Err(err) => Self {
                union: Union::new(Select::default()),
                build_error: Some(err),
            },
        }
    }

    /// Append `query` joined by `op`.
    pub fn push(mut self, op: SetOp, query: impl IntoQuery) -> Self {
        match query.into_query() {
            Ok(query) => self.union.add(op, query),
            Err(err) => {
                if self.build_error.is_none() {
                    self.build_error = Some(err);
                }
            }
        }
        self
    }

    /// Append the result of running `branch` on a fresh SELECT builder.
    pub fn push_with<F, R>(self, op: SetOp, branch: F) -> Self
    where
        F: FnOnce(SelectQb) -> R,
        R: IntoQuery,
    {
        let query = branch(SelectQb::empty());
        self.push(op, query)
    }

    // ==================== Value forms ====================

    pub fn union_distinct(self, query: impl IntoQuery) -> Self {
        self.push(SetOp::union(), query)
    }

    pub fn union_all(self, query: impl IntoQuery) -> Self {
        self.push(SetOp::union_all(), query)
    }

    pub fn intersect_distinct(self, query: impl IntoQuery) -> Self {
        self.push(SetOp::intersect(), query)
    }

    pub fn intersect_all(self, query: impl IntoQuery) -> Self {
        self.push(SetOp::intersect_all(), query)
    }

    pub fn except_distinct(self, query: impl IntoQuery) -> Self {
        self.push(SetOp::except(), query)
    }

    pub fn except_all(self, query: impl IntoQuery) -> Self {
        self.push(SetOp::except_all(), query)
    }

    // ==================== Closure forms ====================

    /// Alias for [`union_distinct_with`](Self::union_distinct_with).
    pub fn union<F, R>(self, branch: F) -> Self
    where
        F: FnOnce(SelectQb) -> R,
        R: IntoQuery,
    {
        self.union_distinct_with(branch)
    }

    pub fn union_distinct_with<F, R>(self, branch: F) -> Self
    where
        F: FnOnce(SelectQb) -> R,
        R: IntoQuery,
    {
        self.push_with(SetOp::union(), branch)
    }

    pub fn union_all_with<F, R>(self, branch: F) -> Self
    where
        F: FnOnce(SelectQb) -> R,
        R: IntoQuery,
    {
        self.push_with(SetOp::union_all(), branch)
    }

    /// Alias for [`intersect_distinct_with`](Self::intersect_distinct_with).
    pub fn intersect<F, R>(self, branch: F) -> Self
    where
        F: FnOnce(SelectQb) -> R,
        R: IntoQuery,
    {
        self.intersect_distinct_with(branch)
    }

    pub fn intersect_distinct_with<F, R>(self, branch: F) -> Self
    where
        F: FnOnce(SelectQb) -> R,
        R: IntoQuery,
    {
        self.push_with(SetOp::intersect(), branch)
    }

    pub fn intersect_all_with<F, R>(self, branch: F) -> Self
    where
        F: FnOnce(SelectQb) -> R,
        R: IntoQuery,
    {
        self.push_with(SetOp::intersect_all(), branch)
    }

    /// Alias for [`except_distinct_with`](Self::except_distinct_with).
    pub fn except<F, R>(self, branch: F) -> Self
    where
        F: FnOnce(SelectQb) -> R,
        R: IntoQuery,
    {
        self.except_distinct_with(branch)
    }

    pub fn except_distinct_with<F, R>(self, branch: F) -> Self
    where
        F: FnOnce(SelectQb) -> R,
        R: IntoQuery,
    {
        self.push_with(SetOp::except(), branch)
    }

    pub fn except_all_with<F, R>(self, branch: F) -> Self
    where
        F: FnOnce(SelectQb) -> R,
        R: IntoQuery,
    {
        self.push_with(SetOp::except_all(), branch)
    }

    // ==================== Output ====================

    /// The query accumulated so far.
    pub fn as_union(&self) -> &Union {
        &self.union
    }

    /// Freeze the builder into a [`Union`] value.
    pub fn finish(self) -> QbResult<Union> {
        match self.build_error {
            Some(err) => Err(err),
            None => Ok(self.union),
        }
    }
}

impl Paginate for UnionQb {
    fn pagination(&self) -> &Pagination {
        &self.union.pagination
    }

    fn pagination_mut(&mut self) -> &mut Pagination {
        &mut self.union.pagination
    }
}

impl WriteSql for UnionQb {
    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        self.union.write_sql(w);
    }
}

impl SqlQb for UnionQb {
    fn build_error(&self) -> Option<&QbError> {
        self.build_error.as_ref()
    }
}
