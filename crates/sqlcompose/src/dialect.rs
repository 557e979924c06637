//! Dialect descriptions consulted while rendering SQL.
//!
//! A [`Dialect`] answers every question whose answer differs between engines:
//! identifier quoting, placeholder tokens, how LIMIT/OFFSET are spelled, and
//! which set operations are available. The renderer never hardcodes any of these.
//!
//! Built-in dialects are zero-sized ([`Postgres`], [`MySql`], [`Sqlite`],
//! [`SqlServer`]). [`GenericDialect`] is a plain data description that can be
//! deserialized from configuration:
//!
//! ```ignore
//! let dialect: GenericDialect = serde_json::from_str(r#"{
//!     "placeholder": "colon",
//!     "except_keyword": "MINUS",
//!     "set_ops": { "intersect_all": false, "except_all": false }
//! }"#)?;
//! ```

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::QbError;
use crate::qb::{SetOp, SetOpKind, SetQuantifier};

/// Bind-parameter token syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placeholder {
    /// `?` for every parameter.
    #[default]
    Question,
    /// `$1`, `$2`, ...
    Dollar,
    /// `:1`, `:2`, ...
    Colon,
    /// `@p1`, `@p2`, ...
    AtP,
}

impl Placeholder {
    /// Append the token for the 1-based parameter `index`.
    pub fn write(self, index: usize, out: &mut String) {
        let prefix = match self {
            Placeholder::Question => {
                out.push('?');
                return;
            }
            Placeholder::Dollar => "$",
            Placeholder::Colon => ":",
            Placeholder::AtP => "@p",
        };
        out.push_str(prefix);
        out.push_str(&index.to_string());
    }
}

/// How LIMIT/OFFSET are spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitStyle<'a> {
    /// `LIMIT n OFFSET m`. When `unbounded` is set, an OFFSET without a LIMIT
    /// is preceded by `LIMIT <unbounded>` (for engines that reject a lone OFFSET).
    LimitOffset { unbounded: Option<&'a str> },
    /// `OFFSET m ROWS FETCH NEXT n ROWS ONLY`, which requires an ORDER BY.
    OffsetFetch,
}

/// How an operand that must be isolated inside a set operation is wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NestedOperand {
    /// `(SELECT ... UNION SELECT ...)`
    #[default]
    Parentheses,
    /// `SELECT * FROM (SELECT ... UNION SELECT ...)`, for engines that reject
    /// parenthesized compound operands.
    DerivedTable,
}

/// Set operations a dialect can render, plus the switches that shape them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SetOpFeatures {
    pub union: bool,
    pub union_all: bool,
    pub intersect: bool,
    pub intersect_all: bool,
    pub except: bool,
    pub except_all: bool,
    /// Spell the DISTINCT quantifier out (`UNION DISTINCT`).
    pub explicit_distinct: bool,
    /// Wrap every operand in parentheses, not only the ones that need it.
    pub parenthesized_operands: bool,
    /// INTERSECT binds tighter than UNION and EXCEPT (standard SQL). When set,
    /// the query built so far is wrapped before an INTERSECT that follows a
    /// UNION or EXCEPT, keeping left-to-right evaluation.
    pub intersect_binds_tighter: bool,
}

impl Default for SetOpFeatures {
    fn default() -> Self {
        Self {
            union: true,
            union_all: true,
            intersect: true,
            intersect_all: true,
            except: true,
            except_all: true,
            explicit_distinct: false,
            parenthesized_operands: false,
            intersect_binds_tighter: true,
        }
    }
}

impl SetOpFeatures {
    /// Whether `op` can be rendered.
    pub fn supports(&self, op: SetOp) -> bool {
        match (op.kind, op.quantifier) {
            (SetOpKind::Union, SetQuantifier::Distinct) => self.union,
            (SetOpKind::Union, SetQuantifier::All) => self.union_all,
            (SetOpKind::Intersect, SetQuantifier::Distinct) => self.intersect,
            (SetOpKind::Intersect, SetQuantifier::All) => self.intersect_all,
            (SetOpKind::Except, SetQuantifier::Distinct) => self.except,
            (SetOpKind::Except, SetQuantifier::All) => self.except_all,
        }
    }
}

/// Syntax description of one database engine.
pub trait Dialect: Send + Sync {
    /// Short name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Opening and closing identifier quote characters.
    fn identifier_quote(&self) -> (char, char) {
        ('"', '"')
    }

    /// Placeholder syntax for bound parameters.
    fn placeholder(&self) -> Placeholder {
        Placeholder::Question
    }

    /// Maximum number of bound parameters in one statement, if limited.
    fn max_params(&self) -> Option<usize> {
        None
    }

    /// LIMIT/OFFSET spelling.
    fn limit_style(&self) -> LimitStyle<'_> {
        LimitStyle::LimitOffset { unbounded: None }
    }

    /// Available set operations.
    fn set_op_features(&self) -> SetOpFeatures {
        SetOpFeatures::default()
    }

    /// Keyword for a set-operation kind (without quantifier).
    fn set_op_keyword(&self, kind: SetOpKind) -> &str {
        kind.keyword()
    }

    /// Wrapping used for operands that must be isolated.
    fn nested_operand(&self) -> NestedOperand {
        NestedOperand::Parentheses
    }
}

/// PostgreSQL.
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Dialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn placeholder(&self) -> Placeholder {
        Placeholder::Dollar
    }

    fn max_params(&self) -> Option<usize> {
        Some(u16::MAX as usize)
    }
}

/// MySQL 8.0.31+ (INTERSECT/EXCEPT available).
#[derive(Debug, Clone, Copy, Default)]
pub struct MySql;

impl Dialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn identifier_quote(&self) -> (char, char) {
        ('`', '`')
    }

    fn max_params(&self) -> Option<usize> {
        Some(u16::MAX as usize)
    }

    fn limit_style(&self) -> LimitStyle<'_> {
        LimitStyle::LimitOffset {
            unbounded: Some("18446744073709551615"),
        }
    }

    fn set_op_features(&self) -> SetOpFeatures {
        SetOpFeatures {
            explicit_distinct: true,
            parenthesized_operands: true,
            ..SetOpFeatures::default()
        }
    }
}

/// SQLite.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl Dialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn max_params(&self) -> Option<usize> {
        Some(32_766)
    }

    fn limit_style(&self) -> LimitStyle<'_> {
        LimitStyle::LimitOffset {
            unbounded: Some("-1"),
        }
    }

    fn set_op_features(&self) -> SetOpFeatures {
        SetOpFeatures {
            intersect_all: false,
            except_all: false,
            // All compound operators share one precedence level.
            intersect_binds_tighter: false,
            ..SetOpFeatures::default()
        }
    }

    fn nested_operand(&self) -> NestedOperand {
        NestedOperand::DerivedTable
    }
}

/// Microsoft SQL Server 2012+.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServer;

impl Dialect for SqlServer {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn identifier_quote(&self) -> (char, char) {
        ('[', ']')
    }

    fn placeholder(&self) -> Placeholder {
        Placeholder::AtP
    }

    fn max_params(&self) -> Option<usize> {
        Some(2100)
    }

    fn limit_style(&self) -> LimitStyle<'_> {
        LimitStyle::OffsetFetch
    }

    fn set_op_features(&self) -> SetOpFeatures {
        SetOpFeatures {
            intersect_all: false,
            except_all: false,
            ..SetOpFeatures::default()
        }
    }
}

/// A dialect described by data rather than code.
///
/// Every field has a default matching standard SQL, so a configuration only
/// has to name what differs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GenericDialect {
    pub quote_open: char,
    pub quote_close: char,
    pub placeholder: Placeholder,
    pub max_params: Option<usize>,
    /// Use `OFFSET .. ROWS FETCH NEXT .. ROWS ONLY` instead of LIMIT/OFFSET.
    pub offset_fetch: bool,
    /// LIMIT value written before an OFFSET that has no LIMIT.
    pub unbounded_limit: Option<String>,
    pub except_keyword: Option<String>,
    pub set_ops: SetOpFeatures,
    pub nested_operand: NestedOperand,
}

impl Default for GenericDialect {
    fn default() -> Self {
        Self {
            quote_open: '"',
            quote_close: '"',
            placeholder: Placeholder::Question,
            max_params: None,
            offset_fetch: false,
            unbounded_limit: None,
            except_keyword: None,
            set_ops: SetOpFeatures::default(),
            nested_operand: NestedOperand::Parentheses,
        }
    }
}

impl Dialect for GenericDialect {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn identifier_quote(&self) -> (char, char) {
        (self.quote_open, self.quote_close)
    }

    fn placeholder(&self) -> Placeholder {
        self.placeholder
    }

    fn max_params(&self) -> Option<usize> {
        self.max_params
    }

    fn limit_style(&self) -> LimitStyle<'_> {
        if self.offset_fetch {
            LimitStyle::OffsetFetch
        } else {
            LimitStyle::LimitOffset {
                unbounded: self.unbounded_limit.as_deref(),
            }
        }
    }

    fn set_op_features(&self) -> SetOpFeatures {
        self.set_ops
    }

    fn set_op_keyword(&self, kind: SetOpKind) -> &str {
        match (kind, self.except_keyword.as_deref()) {
            (SetOpKind::Except, Some(keyword)) => keyword,
            _ => kind.keyword(),
        }
    }

    fn nested_operand(&self) -> NestedOperand {
        self.nested_operand
    }
}

/// Built-in dialect selector, parseable from configuration strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    #[serde(alias = "postgresql", alias = "pg")]
    Postgres,
    #[serde(alias = "mariadb")]
    MySql,
    #[serde(alias = "sqlite3")]
    Sqlite,
    #[serde(alias = "mssql")]
    SqlServer,
}

static POSTGRES: Postgres = Postgres;
static MYSQL: MySql = MySql;
static SQLITE: Sqlite = Sqlite;
static SQLSERVER: SqlServer = SqlServer;

impl DialectKind {
    /// The dialect description for this kind.
    pub fn dialect(self) -> &'static dyn Dialect {
        match self {
            DialectKind::Postgres => &POSTGRES,
            DialectKind::MySql => &MYSQL,
            DialectKind::Sqlite => &SQLITE,
            DialectKind::SqlServer => &SQLSERVER,
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dialect().name())
    }
}

impl FromStr for DialectKind {
    type Err = QbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(DialectKind::Postgres),
            "mysql" | "mariadb" => Ok(DialectKind::MySql),
            "sqlite" | "sqlite3" => Ok(DialectKind::Sqlite),
            "sqlserver" | "mssql" => Ok(DialectKind::SqlServer),
            other => Err(QbError::validation(format!("Unknown dialect '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placeholder(p: Placeholder, index: usize) -> String {
        let mut out = String::new();
        p.write(index, &mut out);
        out
    }

    #[test]
    fn placeholder_tokens() {
        assert_eq!(placeholder(Placeholder::Question, 3), "?");
        assert_eq!(placeholder(Placeholder::Dollar, 3), "$3");
        assert_eq!(placeholder(Placeholder::Colon, 12), ":12");
        assert_eq!(placeholder(Placeholder::AtP, 1), "@p1");
    }

    #[test]
    fn builtin_set_op_support() {
        let intersect_all = SetOp::intersect_all();
        assert!(Postgres.set_op_features().supports(intersect_all));
        assert!(MySql.set_op_features().supports(intersect_all));
        assert!(!Sqlite.set_op_features().supports(intersect_all));
        assert!(!SqlServer.set_op_features().supports(SetOp::except_all()));
        assert!(SqlServer.set_op_features().supports(SetOp::except()));
    }

    #[test]
    fn intersect_precedence_per_dialect() {
        assert!(Postgres.set_op_features().intersect_binds_tighter);
        assert!(MySql.set_op_features().intersect_binds_tighter);
        assert!(SqlServer.set_op_features().intersect_binds_tighter);
        assert!(!Sqlite.set_op_features().intersect_binds_tighter);

        let d: GenericDialect =
            serde_json::from_str(r#"{ "set_ops": { "intersect_binds_tighter": false } }"#).unwrap();
        assert!(!d.set_op_features().intersect_binds_tighter);
        assert!(GenericDialect::default().set_op_features().intersect_binds_tighter);
    }

    #[test]
    fn dialect_kind_from_str() {
        assert_eq!("PostgreSQL".parse::<DialectKind>().unwrap(), DialectKind::Postgres);
        assert_eq!(" mssql ".parse::<DialectKind>().unwrap(), DialectKind::SqlServer);
        assert_eq!("sqlite3".parse::<DialectKind>().unwrap(), DialectKind::Sqlite);
        let err = "oracle".parse::<DialectKind>().unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn dialect_kind_display_uses_dialect_name() {
        assert_eq!(DialectKind::MySql.to_string(), "mysql");
        assert_eq!(DialectKind::SqlServer.dialect().placeholder(), Placeholder::AtP);
    }

    #[test]
    fn dialect_kind_deserializes_with_aliases() {
        let kinds: Vec<DialectKind> =
            serde_json::from_str(r#"["postgres", "pg", "mysql", "mariadb", "sqlserver", "mssql"]"#)
                .unwrap();
        assert_eq!(
            kinds,
            vec![
                DialectKind::Postgres,
                DialectKind::Postgres,
                DialectKind::MySql,
                DialectKind::MySql,
                DialectKind::SqlServer,
                DialectKind::SqlServer,
            ]
        );
    }

    #[test]
    fn generic_dialect_defaults_are_standard_sql() {
        let d: GenericDialect = serde_json::from_str("{}").unwrap();
        assert_eq!(d, GenericDialect::default());
        assert_eq!(d.identifier_quote(), ('"', '"'));
        assert_eq!(d.limit_style(), LimitStyle::LimitOffset { unbounded: None });
        assert_eq!(d.set_op_keyword(SetOpKind::Except), "EXCEPT");
    }

    #[test]
    fn generic_dialect_from_config() {
        let d: GenericDialect = serde_json::from_str(
            r#"{
                "placeholder": "colon",
                "offset_fetch": true,
                "except_keyword": "MINUS",
                "max_params": 1000,
                "set_ops": { "intersect_all": false, "except_all": false },
                "nested_operand": "derived_table"
            }"#,
        )
        .unwrap();
        assert_eq!(d.placeholder(), Placeholder::Colon);
        assert_eq!(d.limit_style(), LimitStyle::OffsetFetch);
        assert_eq!(d.set_op_keyword(SetOpKind::Except), "MINUS");
        assert_eq!(d.set_op_keyword(SetOpKind::Union), "UNION");
        assert_eq!(d.max_params(), Some(1000));
        assert!(d.set_op_features().union_all);
        assert!(!d.set_op_features().intersect_all);
        assert_eq!(d.nested_operand(), NestedOperand::DerivedTable);
    }
}
