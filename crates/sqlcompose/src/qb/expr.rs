//! Expression tree for projections, conditions, and ordering terms.
//!
//! This module provides the `Expr` enum which supports:
//! - identifiers, raw fragments, and bound parameters
//! - function calls and binary operators
//! - AND/OR/NOT grouping
//! - ordering terms and comma-separated lists
//! - template expressions with `?` markers and sub-queries
//!
//! Placeholders are never computed here: every `Param` is handed to the
//! [`SqlWriter`], which numbers it in traversal order for the target dialect.

use tokio_postgres::types::ToSql;

use crate::ident::Ident;
use crate::qb::param::Param;
use crate::qb::union::Query;
use crate::qb::writer::{SqlWriter, WriteSql};

/// Sort direction for an ordering term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Rendered as no suffix (ascending is the SQL default).
    #[default]
    Ascending,
    Descending,
}

impl Direction {
    /// The direction as an expression, if it renders anything.
    pub fn into_expr(self) -> Option<Expr> {
        match self {
            Direction::Ascending => None,
            Direction::Descending => Some(Expr::Raw("DESC".to_string())),
        }
    }
}

/// Expression node.
#[derive(Clone, Debug)]
pub enum Expr {
    /// Column/table name, quoted per dialect where needed.
    Ident(Ident),

    /// Raw SQL fragment without parameters.
    Raw(String),

    /// Bound value.
    Param(Param),

    /// Function call: name(arg, ...)
    Function { name: String, args: Vec<Expr> },

    /// left op right
    Binary {
        left: Box<Expr>,
        op: &'static str,
        right: Box<Expr>,
    },

    /// AND group: all conditions must be true.
    And(Vec<Expr>),

    /// OR group: at least one condition must be true.
    Or(Vec<Expr>),

    /// NOT: negate the inner expression.
    Not(Box<Expr>),

    /// expr IS NULL / expr IS NOT NULL
    IsNull { expr: Box<Expr>, negated: bool },

    /// expr IN (...) / expr NOT IN (...)
    InList {
        expr: Box<Expr>,
        values: Vec<Param>,
        negated: bool,
    },

    /// expr BETWEEN low AND high
    Between {
        expr: Box<Expr>,
        low: Param,
        high: Param,
        negated: bool,
    },

    /// Template with `?` markers that become dialect placeholders.
    /// Example: `Template { sql: "a = ? OR b = ?", params: [1, 2] }` -> `a = $1 OR b = $2`
    Template { sql: String, params: Vec<Param> },

    /// Ordering term: expression plus optional direction (`DESC`, `DESC NULLS LAST`, ...).
    OrderBy {
        expr: Box<Expr>,
        direction: Option<Box<Expr>>,
    },

    /// Comma-separated list.
    List(Vec<Expr>),

    /// Parenthesized sub-query.
    Subquery(Box<Query>),

    /// Always true (used for empty NOT IN lists).
    True,

    /// Always false (used for empty IN lists).
    False,
}

impl Expr {
    /// A column reference.
    ///
    /// Valid identifiers become [`Expr::Ident`]; anything else (`COUNT(*)`,
    /// `u.*`, `created_at DESC`) is kept as a raw fragment.
    pub fn col(name: &str) -> Self {
        match Ident::parse(name) {
            Ok(ident) => Expr::Ident(ident),
            Err(_) => Expr::Raw(name.to_string()),
        }
    }

    /// An already-validated identifier.
    pub fn ident(ident: Ident) -> Self {
        Expr::Ident(ident)
    }

    /// Create a raw SQL fragment.
    pub fn raw(sql: impl Into<String>) -> Self {
        Expr::Raw(sql.into())
    }

    /// A bound value.
    pub fn param<T: ToSql + Send + Sync + 'static>(value: T) -> Self {
        Expr::Param(Param::new(value))
    }

    /// A function call.
    pub fn func(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Function {
            name: name.into(),
            args,
        }
    }

    /// A binary operator expression.
    pub fn binary(left: Expr, op: &'static str, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Create an AND expression from a list of expressions.
    pub fn and(exprs: Vec<Expr>) -> Self {
        Expr::And(exprs)
    }

    /// Create an OR expression from a list of expressions.
    pub fn or(exprs: Vec<Expr>) -> Self {
        Expr::Or(exprs)
    }

    /// Create a NOT expression.
    pub fn not(expr: Expr) -> Self {
        Expr::Not(Box::new(expr))
    }

    fn compare<T: ToSql + Send + Sync + 'static>(column: &str, op: &'static str, value: T) -> Self {
        Expr::binary(Expr::col(column), op, Expr::param(value))
    }

    /// column = value
    pub fn eq<T: ToSql + Send + Sync + 'static>(column: &str, value: T) -> Self {
        Self::compare(column, "=", value)
    }

    /// column != value
    pub fn ne<T: ToSql + Send + Sync + 'static>(column: &str, value: T) -> Self {
        Self::compare(column, "!=", value)
    }

    /// column > value
    pub fn gt<T: ToSql + Send + Sync + 'static>(column: &str, value: T) -> Self {
        Self::compare(column, ">", value)
    }

    /// column >= value
    pub fn gte<T: ToSql + Send + Sync + 'static>(column: &str, value: T) -> Self {
        Self::compare(column, ">=", value)
    }

    /// column < value
    pub fn lt<T: ToSql + Send + Sync + 'static>(column: &str, value: T) -> Self {
        Self::compare(column, "<", value)
    }

    /// column <= value
    pub fn lte<T: ToSql + Send + Sync + 'static>(column: &str, value: T) -> Self {
        Self::compare(column, "<=", value)
    }

    /// column LIKE pattern
    pub fn like<T: ToSql + Send + Sync + 'static>(column: &str, pattern: T) -> Self {
        Self::compare(column, "LIKE", pattern)
    }

    /// column ILIKE pattern (case-insensitive)
    pub fn ilike<T: ToSql + Send + Sync + 'static>(column: &str, pattern: T) -> Self {
        Self::compare(column, "ILIKE", pattern)
    }

    /// column IS NULL
    pub fn is_null(column: &str) -> Self {
        Expr::IsNull {
            expr: Box::new(Expr::col(column)),
            negated: false,
        }
    }

    /// column IS NOT NULL
    pub fn is_not_null(column: &str) -> Self {
        Expr::IsNull {
            expr: Box::new(Expr::col(column)),
            negated: true,
        }
    }

    /// column IN (values...). An empty list is always false.
    pub fn in_list<T: ToSql + Send + Sync + 'static>(column: &str, values: Vec<T>) -> Self {
        if values.is_empty() {
            return Expr::False;
        }
        Expr::InList {
            expr: Box::new(Expr::col(column)),
            values: values.into_iter().map(Param::new).collect(),
            negated: false,
        }
    }

    /// column NOT IN (values...). An empty list is always true.
    pub fn not_in<T: ToSql + Send + Sync + 'static>(column: &str, values: Vec<T>) -> Self {
        if values.is_empty() {
            return Expr::True;
        }
        Expr::InList {
            expr: Box::new(Expr::col(column)),
            values: values.into_iter().map(Param::new).collect(),
            negated: true,
        }
    }

    /// column BETWEEN low AND high
    pub fn between<T: ToSql + Send + Sync + 'static>(column: &str, low: T, high: T) -> Self {
        Expr::Between {
            expr: Box::new(Expr::col(column)),
            low: Param::new(low),
            high: Param::new(high),
            negated: false,
        }
    }

    /// column NOT BETWEEN low AND high
    pub fn not_between<T: ToSql + Send + Sync + 'static>(column: &str, low: T, high: T) -> Self {
        Expr::Between {
            expr: Box::new(Expr::col(column)),
            low: Param::new(low),
            high: Param::new(high),
            negated: true,
        }
    }

    /// Create a template expression from values.
    ///
    /// # Example
    /// ```ignore
    /// Expr::template("a = ? OR b = ?", vec![1i32, 2i32])
    /// ```
    pub fn template<T: ToSql + Send + Sync + 'static>(sql: impl Into<String>, values: Vec<T>) -> Self {
        Expr::Template {
            sql: sql.into(),
            params: values.into_iter().map(Param::new).collect(),
        }
    }

    /// Ordering term with a fixed direction.
    pub fn order_by(expr: Expr, direction: Direction) -> Self {
        Expr::OrderBy {
            expr: Box::new(expr),
            direction: direction.into_expr().map(Box::new),
        }
    }

    /// Ordering term with an arbitrary direction expression (e.g. `DESC NULLS LAST`).
    pub fn order_by_with(expr: Expr, direction: Expr) -> Self {
        Expr::OrderBy {
            expr: Box::new(expr),
            direction: Some(Box::new(direction)),
        }
    }

    /// Comma-separated list.
    pub fn list(items: Vec<Expr>) -> Self {
        Expr::List(items)
    }

    /// Parenthesized sub-query.
    pub fn subquery(query: impl Into<Query>) -> Self {
        Expr::Subquery(Box::new(query.into()))
    }

    /// Check if this expression renders to nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Expr::And(exprs) | Expr::Or(exprs) => exprs.iter().all(|e| e.is_empty()),
            Expr::Not(inner) => inner.is_empty(),
            Expr::List(items) => items.is_empty(),
            _ => false,
        }
    }
}

/// Write the non-empty members of `exprs` joined by `sep`, parenthesizing
/// groups of the opposite kind.
fn write_group(w: &mut SqlWriter<'_>, exprs: &[Expr], sep: &str, conjunction: bool) {
    let mut first = true;
    for e in exprs.iter().filter(|e| !e.is_empty()) {
        if !first {
            w.write(sep);
        }
        first = false;
        let wrap = if conjunction {
            matches!(e, Expr::Or(_))
        } else {
            matches!(e, Expr::And(_))
        };
        if wrap {
            w.write("(");
            e.write_sql(w);
            w.write(")");
        } else {
            e.write_sql(w);
        }
    }
}

/// Write `exprs` ANDed together (used for WHERE/HAVING).
pub(crate) fn write_conjunction(w: &mut SqlWriter<'_>, exprs: &[Expr]) {
    write_group(w, exprs, " AND ", true);
}

fn write_template(w: &mut SqlWriter<'_>, sql: &str, params: &[Param]) {
    let mut pending = params.iter();
    let mut start = 0;
    for (i, ch) in sql.char_indices() {
        if ch != '?' {
            continue;
        }
        // Unmatched markers are left as literal `?`.
        if let Some(param) = pending.next() {
            w.write(&sql[start..i]);
            w.push_param(param);
            start = i + 1;
        }
    }
    w.write(&sql[start..]);
}

impl WriteSql for Expr {
    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        match self {
            Expr::Ident(ident) => w.write_ident(ident),
            Expr::Raw(sql) => w.write(sql),
            Expr::Param(param) => w.push_param(param),
            Expr::Function { name, args } => {
                w.write(name);
                w.write("(");
                w.write_list(args, ", ");
                w.write(")");
            }
            Expr::Binary { left, op, right } => {
                left.write_sql(w);
                w.write(" ");
                w.write(op);
                w.write(" ");
                right.write_sql(w);
            }
            Expr::And(exprs) => write_group(w, exprs, " AND ", true),
            Expr::Or(exprs) => write_group(w, exprs, " OR ", false),
            Expr::Not(inner) => {
                if !inner.is_empty() {
                    w.write("NOT (");
                    inner.write_sql(w);
                    w.write(")");
                }
            }
            Expr::IsNull { expr, negated } => {
                expr.write_sql(w);
                w.write(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            Expr::InList {
                expr,
                values,
                negated,
            } => {
                if values.is_empty() {
                    // Constructors fold empty lists away; a variant built
                    // directly still renders as a constant predicate.
                    w.write(if *negated { "1=1" } else { "1=0" });
                    return;
                }
                expr.write_sql(w);
                w.write(if *negated { " NOT IN (" } else { " IN (" });
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        w.write(", ");
                    }
                    w.push_param(v);
                }
                w.write(")");
            }
            Expr::Between {
                expr,
                low,
                high,
                negated,
            } => {
                expr.write_sql(w);
                w.write(if *negated { " NOT BETWEEN " } else { " BETWEEN " });
                w.push_param(low);
                w.write(" AND ");
                w.push_param(high);
            }
            Expr::Template { sql, params } => write_template(w, sql, params),
            Expr::OrderBy { expr, direction } => {
                expr.write_sql(w);
                if let Some(direction) = direction {
                    w.write(" ");
                    direction.write_sql(w);
                }
            }
            Expr::List(items) => w.write_list(items, ", "),
            Expr::Subquery(query) => {
                w.write("(");
                query.write_sql(w);
                w.write(")");
            }
            Expr::True => w.write("1=1"),
            Expr::False => w.write("1=0"),
        }
    }
}

/// Conditions accumulated one at a time and ANDed together.
#[derive(Clone, Debug, Default)]
pub struct ExprGroup {
    exprs: Vec<Expr>,
}

impl ExprGroup {
    /// Create a new empty expression group.
    pub fn new() -> Self {
        Self { exprs: Vec::new() }
    }

    /// Check if the group renders to nothing.
    pub fn is_empty(&self) -> bool {
        self.exprs.iter().all(|e| e.is_empty())
    }

    /// Add an expression to be ANDed.
    pub fn and_expr(&mut self, expr: Expr) {
        self.exprs.push(expr);
    }

    /// Add a condition if value is Some: column = value
    pub fn eq_opt<T: ToSql + Send + Sync + 'static>(&mut self, column: &str, value: Option<T>) {
        if let Some(v) = value {
            self.exprs.push(Expr::eq(column, v));
        }
    }

    /// Get all expressions.
    pub fn exprs(&self) -> &[Expr] {
        &self.exprs
    }
}

impl WriteSql for ExprGroup {
    fn write_sql(&self, w: &mut SqlWriter<'_>) {
        write_conjunction(w, &self.exprs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySql, Postgres};

    fn render(expr: &Expr) -> (String, usize) {
        let mut w = SqlWriter::new(&Postgres);
        expr.write_sql(&mut w);
        let built = w.finish().unwrap();
        (built.sql, built.params.len())
    }

    #[test]
    fn test_simple_eq() {
        assert_eq!(render(&Expr::eq("name", "alice")), ("name = $1".to_string(), 1));
    }

    #[test]
    fn test_col_falls_back_to_raw() {
        assert!(matches!(Expr::col("users.id"), Expr::Ident(_)));
        assert!(matches!(Expr::col("COUNT(*)"), Expr::Raw(_)));
        assert!(matches!(Expr::col("created_at DESC"), Expr::Raw(_)));
    }

    #[test]
    fn test_and_group() {
        let expr = Expr::and(vec![Expr::eq("status", "active"), Expr::gt("age", 18i32)]);
        assert_eq!(render(&expr), ("status = $1 AND age > $2".to_string(), 2));
    }

    #[test]
    fn test_nested_and_or() {
        let expr = Expr::and(vec![
            Expr::eq("status", "active"),
            Expr::or(vec![Expr::eq("role", "admin"), Expr::eq("role", "superuser")]),
        ]);
        assert_eq!(
            render(&expr),
            ("status = $1 AND (role = $2 OR role = $3)".to_string(), 3)
        );
    }

    #[test]
    fn test_empty_groups_render_nothing() {
        let expr = Expr::and(vec![Expr::or(vec![]), Expr::eq("a", 1i32), Expr::and(vec![])]);
        assert_eq!(render(&expr), ("a = $1".to_string(), 1));
        assert_eq!(render(&Expr::not(Expr::and(vec![]))), (String::new(), 0));
    }

    #[test]
    fn test_in_list_and_empty_lists() {
        assert_eq!(
            render(&Expr::in_list("id", vec![1i32, 2, 3])),
            ("id IN ($1, $2, $3)".to_string(), 3)
        );
        assert_eq!(render(&Expr::in_list::<i32>("id", vec![])), ("1=0".to_string(), 0));
        assert_eq!(render(&Expr::not_in::<i32>("id", vec![])), ("1=1".to_string(), 0));
    }

    #[test]
    fn test_directly_built_empty_in_list() {
        let expr = Expr::InList {
            expr: Box::new(Expr::col("id")),
            values: Vec::new(),
            negated: false,
        };
        assert_eq!(render(&expr), ("1=0".to_string(), 0));

        let expr = Expr::InList {
            expr: Box::new(Expr::col("id")),
            values: Vec::new(),
            negated: true,
        };
        assert_eq!(render(&expr), ("1=1".to_string(), 0));
    }

    #[test]
    fn test_between_and_null_check() {
        assert_eq!(
            render(&Expr::not_between("age", 18i32, 65i32)),
            ("age NOT BETWEEN $1 AND $2".to_string(), 2)
        );
        assert_eq!(
            render(&Expr::is_not_null("deleted_at")),
            ("deleted_at IS NOT NULL".to_string(), 0)
        );
    }

    #[test]
    fn test_template() {
        let expr = Expr::template("a = ? OR b = ?", vec![1i32, 2i32]);
        assert_eq!(render(&expr), ("a = $1 OR b = $2".to_string(), 2));

        let mut w = SqlWriter::new(&MySql);
        expr.write_sql(&mut w);
        assert_eq!(w.finish().unwrap().sql, "a = ? OR b = ?");
    }

    #[test]
    fn test_template_extra_markers_stay_literal() {
        let expr = Expr::template("a = ? OR b ?| c", vec![1i32]);
        assert_eq!(render(&expr), ("a = $1 OR b ?| c".to_string(), 1));
    }

    #[test]
    fn test_function_and_binary() {
        let expr = Expr::binary(
            Expr::func("lower", vec![Expr::col("email")]),
            "=",
            Expr::func("lower", vec![Expr::param("A@B.C")]),
        );
        assert_eq!(render(&expr), ("lower(email) = lower($1)".to_string(), 1));
    }

    #[test]
    fn test_order_terms() {
        assert_eq!(
            render(&Expr::order_by(Expr::col("name"), Direction::Ascending)),
            ("name".to_string(), 0)
        );
        assert_eq!(
            render(&Expr::order_by(Expr::col("name"), Direction::Descending)),
            ("name DESC".to_string(), 0)
        );
        assert_eq!(
            render(&Expr::order_by_with(
                Expr::col("score"),
                Expr::raw("DESC NULLS LAST")
            )),
            ("score DESC NULLS LAST".to_string(), 0)
        );
    }

    #[test]
    fn test_list() {
        let expr = Expr::list(vec![Expr::col("a"), Expr::param(1i32), Expr::col(r#""B""#)]);
        assert_eq!(render(&expr), (r#"a, $1, "B""#.to_string(), 1));
    }

    #[test]
    fn test_not() {
        assert_eq!(
            render(&Expr::not(Expr::eq("banned", true))),
            ("NOT (banned = $1)".to_string(), 1)
        );
    }

    #[test]
    fn test_expr_group() {
        let mut group = ExprGroup::new();
        group.and_expr(Expr::eq("status", "active"));
        group.eq_opt("name", None::<&str>);
        group.eq_opt("age", Some(18i32));
        group.and_expr(Expr::in_list("role", vec!["admin", "user"]));

        let mut w = SqlWriter::new(&Postgres);
        group.write_sql(&mut w);
        let built = w.finish().unwrap();
        assert_eq!(built.sql, "status = $1 AND age = $2 AND role IN ($3, $4)");
        assert_eq!(built.params.len(), 4);
        assert_eq!(group.exprs().len(), 3);
    }
}
