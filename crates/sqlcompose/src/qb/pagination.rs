//! ORDER BY / LIMIT / OFFSET state shared by SELECT and set-operation queries.
//!
//! [`Pagination`] is the state and its rendering rule; [`Paginate`] gives any
//! type that owns a `Pagination` the same chainable methods. Both
//! [`SelectQb`](crate::qb::SelectQb) and [`UnionQb`](crate::qb::UnionQb)
//! (and their frozen values) use it, so the two query kinds paginate
//! identically.

use crate::dialect::LimitStyle;
use crate::qb::expr::{Direction, Expr};
use crate::qb::writer::{SqlWriter, WriteSql};

/// ORDER BY terms plus optional LIMIT and OFFSET.
///
/// No range checking is done: negative or zero values are passed through to
/// the database unchanged.
#[derive(Clone, Debug, Default)]
pub struct Pagination {
    /// Ordering terms in insertion order.
    pub order_by: Vec<Expr>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Pagination {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when rendering would produce no text.
    pub fn is_empty(&self) -> bool {
        self.order_by.is_empty() && self.limit.is_none() && self.offset.is_none()
    }
}

impl WriteSql for Pagination {
    /// Emits ` ORDER BY ..`, then the dialect's limit/offset clauses, each
    /// preceded by a single space; absent state emits nothing.
    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        let has_order_by = !self.order_by.is_empty();
        if has_order_by {
            w.write(" ORDER BY ");
            w.write_list(&self.order_by, ", ");
        }

        match w.dialect().limit_style() {
            LimitStyle::LimitOffset { unbounded } => {
                match (self.limit, unbounded) {
                    (Some(limit), _) => {
                        w.write(" LIMIT ");
                        w.write(&limit.to_string());
                    }
                    (None, Some(unbounded)) if self.offset.is_some() => {
                        w.write(" LIMIT ");
                        w.write(unbounded);
                    }
                    _ => {}
                }
                if let Some(offset) = self.offset {
                    w.write(" OFFSET ");
                    w.write(&offset.to_string());
                }
            }
            LimitStyle::OffsetFetch => {
                if self.limit.is_none() && self.offset.is_none() {
                    return;
                }
                if !has_order_by {
                    w.write(" ORDER BY (SELECT NULL)");
                }
                w.write(" OFFSET ");
                w.write(&self.offset.unwrap_or(0).to_string());
                w.write(" ROWS");
                if let Some(limit) = self.limit {
                    w.write(" FETCH NEXT ");
                    w.write(&limit.to_string());
                    w.write(" ROWS ONLY");
                }
            }
        }
    }
}

/// Chainable pagination methods for anything that owns a [`Pagination`].
///
/// Scalar setters are last-call-wins; ordering methods always append.
pub trait Paginate: Sized {
    fn pagination(&self) -> &Pagination;

    fn pagination_mut(&mut self) -> &mut Pagination;

    /// Set or clear LIMIT.
    fn set_limit(mut self, n: Option<i64>) -> Self {
        self.pagination_mut().limit = n;
        self
    }

    /// Set LIMIT.
    fn limit(self, n: i64) -> Self {
        self.set_limit(Some(n))
    }

    /// Set or clear OFFSET.
    fn set_offset(mut self, n: Option<i64>) -> Self {
        self.pagination_mut().offset = n;
        self
    }

    /// Set OFFSET.
    fn offset(self, n: i64) -> Self {
        self.set_offset(Some(n))
    }

    /// Pagination helper.
    ///
    /// `page` is 1-based (clamped to >= 1).
    /// `per_page` is clamped to >= 1.
    fn paginate(mut self, page: i64, per_page: i64) -> Self {
        let p = page.max(1);
        let size = per_page.max(1);
        let state = self.pagination_mut();
        state.limit = Some(size);
        state.offset = Some((p - 1) * size);
        self
    }

    /// Append an ascending ordering on `column`.
    fn order_by(self, column: &str) -> Self {
        self.order_by_dir(column, Direction::Ascending)
    }

    /// Append an ordering on `column` with `direction`.
    fn order_by_dir(self, column: &str, direction: Direction) -> Self {
        self.order_by_term(Expr::order_by(Expr::col(column), direction))
    }

    /// Append ORDER BY column ASC.
    fn order_by_asc(self, column: &str) -> Self {
        self.order_by_dir(column, Direction::Ascending)
    }

    /// Append ORDER BY column DESC.
    fn order_by_desc(self, column: &str) -> Self {
        self.order_by_dir(column, Direction::Descending)
    }

    /// Append an ordering on an arbitrary expression with an arbitrary
    /// direction expression (e.g. `DESC NULLS FIRST`).
    fn order_by_expr(self, expr: Expr, direction: Expr) -> Self {
        self.order_by_term(Expr::order_by_with(expr, direction))
    }

    /// Append a complete ordering term as-is.
    fn order_by_term(mut self, term: Expr) -> Self {
        self.pagination_mut().order_by.push(term);
        self
    }
}

impl Paginate for Pagination {
    fn pagination(&self) -> &Pagination {
        self
    }

    fn pagination_mut(&mut self) -> &mut Pagination {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{GenericDialect, MySql, Postgres, SqlServer, Sqlite};
    use crate::Dialect;

    fn render_with(p: &Pagination, dialect: &dyn Dialect) -> String {
        let mut w = SqlWriter::new(dialect);
        p.write_sql(&mut w);
        w.finish().unwrap().sql
    }

    fn render(p: &Pagination) -> String {
        render_with(p, &GenericDialect::default())
    }

    #[test]
    fn empty_state_renders_nothing() {
        let p = Pagination::new();
        assert!(p.is_empty());
        assert_eq!(render(&p), "");
        assert_eq!(render_with(&p, &SqlServer), "");
    }

    #[test]
    fn order_limit_offset_in_fixed_order() {
        let p = Pagination::new().offset(20).limit(10).order_by("name");
        assert_eq!(render(&p), " ORDER BY name LIMIT 10 OFFSET 20");
    }

    #[test]
    fn order_terms_keep_call_order() {
        let p = Pagination::new()
            .order_by_desc("created_at")
            .order_by("name")
            .order_by_expr(Expr::col("score"), Expr::raw("DESC NULLS LAST"))
            .order_by_term(Expr::raw("id ASC"));
        assert_eq!(
            render(&p),
            " ORDER BY created_at DESC, name, score DESC NULLS LAST, id ASC"
        );
    }

    #[test]
    fn last_write_wins() {
        let p = Pagination::new().limit(5).set_limit(None);
        assert_eq!(render(&p), "");

        let p = Pagination::new().limit(5).limit(10);
        assert_eq!(render(&p), " LIMIT 10");

        let p = Pagination::new().offset(3).set_offset(None).offset(7);
        assert_eq!(render(&p), " OFFSET 7");
    }

    #[test]
    fn negative_values_pass_through() {
        let p = Pagination::new().limit(-1).offset(0);
        assert_eq!(render(&p), " LIMIT -1 OFFSET 0");
    }

    #[test]
    fn paginate_helper() {
        let p = Pagination::new().paginate(3, 25);
        assert_eq!(p.limit, Some(25));
        assert_eq!(p.offset, Some(50));

        let p = Pagination::new().paginate(0, 0);
        assert_eq!(render(&p), " LIMIT 1 OFFSET 0");
    }

    #[test]
    fn lone_offset_uses_dialect_unbounded_limit() {
        let p = Pagination::new().offset(5);
        assert_eq!(render_with(&p, &Postgres), " OFFSET 5");
        assert_eq!(render_with(&p, &Sqlite), " LIMIT -1 OFFSET 5");
        assert_eq!(
            render_with(&p, &MySql),
            " LIMIT 18446744073709551615 OFFSET 5"
        );
    }

    #[test]
    fn offset_fetch_dialect() {
        let p = Pagination::new().order_by("name").limit(10).offset(20);
        assert_eq!(
            render_with(&p, &SqlServer),
            " ORDER BY name OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"
        );

        let p = Pagination::new().limit(10);
        assert_eq!(
            render_with(&p, &SqlServer),
            " ORDER BY (SELECT NULL) OFFSET 0 ROWS FETCH NEXT 10 ROWS ONLY"
        );

        let p = Pagination::new().order_by("name");
        assert_eq!(render_with(&p, &SqlServer), " ORDER BY name");
    }
}
