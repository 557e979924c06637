//! SELECT query value and its builder.

use tokio_postgres::types::ToSql;

use crate::error::{QbError, QbResult};
use crate::ident::IntoIdent;
use crate::qb::expr::{Expr, ExprGroup, write_conjunction};
use crate::qb::pagination::{Paginate, Pagination};
use crate::qb::set_op::SetOp;
use crate::qb::traits::SqlQb;
use crate::qb::union::{IntoQuery, UnionQb};
use crate::qb::writer::{SqlWriter, WriteSql};

/// JOIN flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinKind {
    fn keyword(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL OUTER JOIN",
        }
    }
}

/// A JOIN clause.
#[derive(Clone, Debug)]
pub struct Join {
    pub kind: JoinKind,
    pub table: Expr,
    pub on: Expr,
}

/// A frozen SELECT statement.
#[derive(Clone, Debug, Default)]
pub struct Select {
    pub distinct: bool,
    /// Projection; empty means `*`.
    pub columns: Vec<Expr>,
    pub from: Option<Expr>,
    pub joins: Vec<Join>,
    pub predicate: ExprGroup,
    pub group_by: Vec<Expr>,
    pub having: Vec<Expr>,
    pub pagination: Pagination,
}

impl WriteSql for Select {
    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        w.write("SELECT ");
        if self.distinct {
            w.write("DISTINCT ");
        }
        if self.columns.is_empty() {
            w.write("*");
        } else {
            w.write_list(&self.columns, ", ");
        }

        if let Some(from) = &self.from {
            w.write(" FROM ");
            from.write_sql(w);
        }

        for join in &self.joins {
            w.write(" ");
            w.write(join.kind.keyword());
            w.write(" ");
            join.table.write_sql(w);
            w.write(" ON ");
            join.on.write_sql(w);
        }

        if !self.predicate.is_empty() {
            w.write(" WHERE ");
            self.predicate.write_sql(w);
        }

        if !self.group_by.is_empty() {
            w.write(" GROUP BY ");
            w.write_list(&self.group_by, ", ");
        }

        if self.having.iter().any(|e| !e.is_empty()) {
            w.write(" HAVING ");
            write_conjunction(w, &self.having);
        }

        self.pagination.write_sql(w);
    }
}

impl SqlQb for Select {}

impl Paginate for Select {
    fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    fn pagination_mut(&mut self) -> &mut Pagination {
        &mut self.pagination
    }
}

/// SELECT query builder.
///
/// Methods consume and return the builder. Invalid identifiers are recorded
/// and reported by [`SqlQb::build`] instead of panicking mid-chain.
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct SelectQb {
    select: Select,
    build_error: Option<QbError>,
}

impl SelectQb {
    /// Create a new SELECT query builder for a table.
    pub fn new(table: impl IntoIdent) -> Self {
        Self::empty().from(table)
    }

    /// Create a SELECT query builder with a custom FROM expression.
    ///
    /// Use this for aliases, joins written by hand, or table functions.
    pub fn from_expr(from_expr: &str) -> Self {
        let mut qb = Self::empty();
        qb.select.from = Some(Expr::raw(from_expr));
        qb
    }

    /// A builder with no FROM clause yet.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set the FROM table.
    pub fn from(mut self, table: impl IntoIdent) -> Self {
        match table.into_ident() {
            Ok(ident) => self.select.from = Some(Expr::ident(ident)),
            Err(err) => self.record_error(err),
        }
        self
    }

    fn record_error(&mut self, err: QbError) {
        if self.build_error.is_none() {
            self.build_error = Some(err);
        }
    }

    // ==================== SELECT columns ====================

    /// Set SELECT columns (string form, supports complex expressions).
    pub fn select(mut self, cols: &str) -> Self {
        self.select.columns = vec![Expr::raw(cols)];
        self
    }

    /// Set SELECT columns (array form).
    pub fn columns(mut self, cols: &[&str]) -> Self {
        self.select.columns = cols.iter().map(|c| Expr::col(c)).collect();
        self
    }

    /// Append one SELECT column.
    pub fn add_select(mut self, col: &str) -> Self {
        self.select.columns.push(Expr::col(col));
        self
    }

    /// Append one SELECT expression.
    pub fn add_select_expr(mut self, expr: Expr) -> Self {
        self.select.columns.push(expr);
        self
    }

    /// SELECT DISTINCT.
    pub fn distinct(mut self) -> Self {
        self.select.distinct = true;
        self
    }

    // ==================== JOIN ====================

    fn join(mut self, kind: JoinKind, table: &str, on: &str) -> Self {
        self.select.joins.push(Join {
            kind,
            table: Expr::col(table),
            on: Expr::raw(on),
        });
        self
    }

    /// Add INNER JOIN.
    pub fn inner_join(self, table: &str, on: &str) -> Self {
        self.join(JoinKind::Inner, table, on)
    }

    /// Add LEFT JOIN.
    pub fn left_join(self, table: &str, on: &str) -> Self {
        self.join(JoinKind::Left, table, on)
    }

    /// Add RIGHT JOIN.
    pub fn right_join(self, table: &str, on: &str) -> Self {
        self.join(JoinKind::Right, table, on)
    }

    /// Add FULL OUTER JOIN.
    pub fn full_join(self, table: &str, on: &str) -> Self {
        self.join(JoinKind::Full, table, on)
    }

    // ==================== WHERE conditions ====================

    /// Add a custom WHERE expression.
    pub fn and_expr(mut self, expr: Expr) -> Self {
        self.select.predicate.and_expr(expr);
        self
    }

    /// Add WHERE: column = value
    pub fn eq<T: ToSql + Send + Sync + 'static>(self, column: &str, value: T) -> Self {
        self.and_expr(Expr::eq(column, value))
    }

    /// Add WHERE: column != value
    pub fn ne<T: ToSql + Send + Sync + 'static>(self, column: &str, value: T) -> Self {
        self.and_expr(Expr::ne(column, value))
    }

    /// Add WHERE: column > value
    pub fn gt<T: ToSql + Send + Sync + 'static>(self, column: &str, value: T) -> Self {
        self.and_expr(Expr::gt(column, value))
    }

    /// Add WHERE: column >= value
    pub fn gte<T: ToSql + Send + Sync + 'static>(self, column: &str, value: T) -> Self {
        self.and_expr(Expr::gte(column, value))
    }

    /// Add WHERE: column < value
    pub fn lt<T: ToSql + Send + Sync + 'static>(self, column: &str, value: T) -> Self {
        self.and_expr(Expr::lt(column, value))
    }

    /// Add WHERE: column <= value
    pub fn lte<T: ToSql + Send + Sync + 'static>(self, column: &str, value: T) -> Self {
        self.and_expr(Expr::lte(column, value))
    }

    /// Add WHERE: column LIKE pattern
    pub fn like<T: ToSql + Send + Sync + 'static>(self, column: &str, pattern: T) -> Self {
        self.and_expr(Expr::like(column, pattern))
    }

    /// Add WHERE: column ILIKE pattern (case-insensitive)
    pub fn ilike<T: ToSql + Send + Sync + 'static>(self, column: &str, pattern: T) -> Self {
        self.and_expr(Expr::ilike(column, pattern))
    }

    /// Add WHERE: column IS NULL
    pub fn is_null(self, column: &str) -> Self {
        self.and_expr(Expr::is_null(column))
    }

    /// Add WHERE: column IS NOT NULL
    pub fn is_not_null(self, column: &str) -> Self {
        self.and_expr(Expr::is_not_null(column))
    }

    /// Add WHERE: column IN (values...)
    pub fn in_list<T: ToSql + Send + Sync + 'static>(self, column: &str, values: Vec<T>) -> Self {
        self.and_expr(Expr::in_list(column, values))
    }

    /// Add WHERE: column NOT IN (values...)
    pub fn not_in<T: ToSql + Send + Sync + 'static>(self, column: &str, values: Vec<T>) -> Self {
        self.and_expr(Expr::not_in(column, values))
    }

    /// Add WHERE: column BETWEEN from AND to
    pub fn between<T: ToSql + Send + Sync + 'static>(self, column: &str, from: T, to: T) -> Self {
        self.and_expr(Expr::between(column, from, to))
    }

    /// Add a raw WHERE condition without params.
    pub fn raw(self, sql: &str) -> Self {
        self.and_expr(Expr::raw(sql))
    }

    /// Add a WHERE condition with `?` placeholders.
    pub fn where_template<T: ToSql + Send + Sync + 'static>(self, sql: &str, values: Vec<T>) -> Self {
        self.and_expr(Expr::template(sql, values))
    }

    /// Add WHERE if value is Some: column = value
    pub fn eq_opt<T: ToSql + Send + Sync + 'static>(mut self, column: &str, value: Option<T>) -> Self {
        self.select.predicate.eq_opt(column, value);
        self
    }

    // ==================== Grouping ====================

    /// Append a GROUP BY column.
    pub fn group_by(mut self, column: &str) -> Self {
        self.select.group_by.push(Expr::col(column));
        self
    }

    /// Add a custom HAVING expression.
    pub fn having_expr(mut self, expr: Expr) -> Self {
        self.select.having.push(expr);
        self
    }

    /// Add HAVING condition: column = value
    pub fn having_eq<T: ToSql + Send + Sync + 'static>(self, column: &str, value: T) -> Self {
        self.having_expr(Expr::eq(column, value))
    }

    /// Add HAVING condition: column > value
    pub fn having_gt<T: ToSql + Send + Sync + 'static>(self, column: &str, value: T) -> Self {
        self.having_expr(Expr::gt(column, value))
    }

    /// Add HAVING condition: column < value
    pub fn having_lt<T: ToSql + Send + Sync + 'static>(self, column: &str, value: T) -> Self {
        self.having_expr(Expr::lt(column, value))
    }

    // ==================== Set operations ====================

    fn combine_with<F, R>(self, op: SetOp, branch: F) -> UnionQb
    where
        F: FnOnce(SelectQb) -> R,
        R: IntoQuery,
    {
        UnionQb::new(self).push_with(op, branch)
    }

    /// `self UNION <branch>`; alias for [`union_distinct_with`](Self::union_distinct_with).
    pub fn union<F, R>(self, branch: F) -> UnionQb
    where
        F: FnOnce(SelectQb) -> R,
        R: IntoQuery,
    {
        self.union_distinct_with(branch)
    }

    pub fn union_distinct_with<F, R>(self, branch: F) -> UnionQb
    where
        F: FnOnce(SelectQb) -> R,
        R: IntoQuery,
    {
        self.combine_with(SetOp::union(), branch)
    }

    pub fn union_all_with<F, R>(self, branch: F) -> UnionQb
    where
        F: FnOnce(SelectQb) -> R,
        R: IntoQuery,
    {
        self.combine_with(SetOp::union_all(), branch)
    }

    /// `self INTERSECT <branch>`; alias for [`intersect_distinct_with`](Self::intersect_distinct_with).
    pub fn intersect<F, R>(self, branch: F) -> UnionQb
    where
        F: FnOnce(SelectQb) -> R,
        R: IntoQuery,
    {
        self.intersect_distinct_with(branch)
    }

    pub fn intersect_distinct_with<F, R>(self, branch: F) -> UnionQb
    where
        F: FnOnce(SelectQb) -> R,
        R: IntoQuery,
    {
        self.combine_with(SetOp::intersect(), branch)
    }

    pub fn intersect_all_with<F, R>(self, branch: F) -> UnionQb
    where
        F: FnOnce(SelectQb) -> R,
        R: IntoQuery,
    {
        self.combine_with(SetOp::intersect_all(), branch)
    }

    /// `self EXCEPT <branch>`; alias for [`except_distinct_with`](Self::except_distinct_with).
    pub fn except<F, R>(self, branch: F) -> UnionQb
    where
        F: FnOnce(SelectQb) -> R,
        R: IntoQuery,
    {
        self.except_distinct_with(branch)
    }

    pub fn except_distinct_with<F, R>(self, branch: F) -> UnionQb
    where
        F: FnOnce(SelectQb) -> R,
        R: IntoQuery,
    {
        self.combine_with(SetOp::except(), branch)
    }

    pub fn except_all_with<F, R>(self, branch: F) -> UnionQb
    where
        F: FnOnce(SelectQb) -> R,
        R: IntoQuery,
    {
        self.combine_with(SetOp::except_all(), branch)
    }

    // ==================== Output ====================

    /// The query accumulated so far.
    pub fn as_select(&self) -> &Select {
        &self.select
    }

    /// Freeze the builder into a [`Select`] value.
    pub fn finish(self) -> QbResult<Select> {
        match self.build_error {
            Some(err) => Err(err),
            None => Ok(self.select),
        }
    }
}

impl Paginate for SelectQb {
    fn pagination(&self) -> &Pagination {
        &self.select.pagination
    }

    fn pagination_mut(&mut self) -> &mut Pagination {
        &mut self.select.pagination
    }
}

impl WriteSql for SelectQb {
    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        self.select.write_sql(w);
    }
}

impl SqlQb for SelectQb {
    fn build_error(&self) -> Option<&QbError> {
        self.build_error.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySql, Postgres, SqlServer};

    fn pg(qb: &impl SqlQb) -> String {
        qb.to_sql(&Postgres).unwrap()
    }

    #[test]
    fn test_simple_select() {
        assert_eq!(pg(&SelectQb::new("users")), "SELECT * FROM users");
    }

    #[test]
    fn test_select_without_from() {
        assert_eq!(pg(&SelectQb::empty().select("1")), "SELECT 1");
    }

    #[test]
    fn test_select_with_columns() {
        let qb = SelectQb::new("users").columns(&["id", "name", "email"]);
        assert_eq!(pg(&qb), "SELECT id, name, email FROM users");

        let qb = SelectQb::new("users").select("id, name, email");
        assert_eq!(pg(&qb), "SELECT id, name, email FROM users");
    }

    #[test]
    fn test_quoted_identifiers_follow_dialect() {
        let qb = SelectQb::new(r#""User""#).columns(&[r#""Name""#]);
        assert_eq!(pg(&qb), r#"SELECT "Name" FROM "User""#);
        assert_eq!(qb.to_sql(&MySql).unwrap(), "SELECT `Name` FROM `User`");
    }

    #[test]
    fn test_invalid_table_is_reported_at_build() {
        let qb = SelectQb::new("users; DROP TABLE users").eq("id", 1i32);
        let err = qb.build(&Postgres).unwrap_err();
        assert!(err.is_validation());
        assert!(qb.clone().finish().is_err());
    }

    #[test]
    fn test_select_with_where() {
        let qb = SelectQb::new("users").eq("status", "active").gt("age", 18i32);
        assert_eq!(pg(&qb), "SELECT * FROM users WHERE status = $1 AND age > $2");
    }

    #[test]
    fn test_select_with_join() {
        let qb = SelectQb::from_expr("users u")
            .inner_join("orders o", "u.id = o.user_id")
            .eq("u.status", "active");
        assert_eq!(
            pg(&qb),
            "SELECT * FROM users u INNER JOIN orders o ON u.id = o.user_id WHERE u.status = $1"
        );
    }

    #[test]
    fn test_select_with_order_and_limit() {
        let qb = SelectQb::new("users")
            .order_by("created_at DESC")
            .limit(10)
            .offset(20);
        assert_eq!(
            pg(&qb),
            "SELECT * FROM users ORDER BY created_at DESC LIMIT 10 OFFSET 20"
        );
    }

    #[test]
    fn test_select_with_group_by_and_having() {
        let qb = SelectQb::new("orders")
            .select("user_id, COUNT(*) AS order_count")
            .eq("status", "paid")
            .group_by("user_id")
            .having_gt("COUNT(*)", 5i64);
        assert_eq!(
            pg(&qb),
            "SELECT user_id, COUNT(*) AS order_count FROM orders WHERE status = $1 GROUP BY user_id HAVING COUNT(*) > $2"
        );
    }

    #[test]
    fn test_distinct() {
        let qb = SelectQb::new("users").distinct().columns(&["country"]);
        assert_eq!(pg(&qb), "SELECT DISTINCT country FROM users");
    }

    #[test]
    fn test_paginate() {
        let qb = SelectQb::new("users").paginate(2, 10);
        assert_eq!(pg(&qb), "SELECT * FROM users LIMIT 10 OFFSET 10");
    }

    #[test]
    fn test_offset_fetch_dialect() {
        let qb = SelectQb::new("users").eq("id", 1i32).limit(5);
        assert_eq!(
            qb.to_sql(&SqlServer).unwrap(),
            "SELECT * FROM users WHERE id = @p1 ORDER BY (SELECT NULL) OFFSET 0 ROWS FETCH NEXT 5 ROWS ONLY"
        );
    }

    #[test]
    fn test_optional_conditions() {
        let qb = SelectQb::new("users")
            .eq_opt("status", Some("active"))
            .eq_opt("name", None::<&str>);
        assert_eq!(pg(&qb), "SELECT * FROM users WHERE status = $1");
    }

    #[test]
    fn test_finish_is_independent_snapshot() {
        let qb = SelectQb::new("users").limit(1);
        let snapshot = qb.as_select().clone();
        let qb = qb.limit(2).order_by("id");
        assert_eq!(snapshot.pagination.limit, Some(1));
        assert!(snapshot.pagination.order_by.is_empty());
        assert_eq!(qb.finish().unwrap().pagination.limit, Some(2));
    }
}
