//! Text + parameter sink used by every renderable node.
//!
//! Rendering is a single depth-first, left-to-right walk. Each bound value is
//! pushed onto the parameter list at the moment its placeholder is written, so
//! placeholder positions and parameter order cannot drift apart.

use tokio_postgres::types::ToSql;

use crate::dialect::Dialect;
use crate::error::{QbError, QbResult};
use crate::ident::Ident;
use crate::qb::param::{Param, ParamList};

/// A node that can render itself into a [`SqlWriter`].
pub trait WriteSql {
    fn write_sql(&self, w: &mut SqlWriter<'_>);
}

/// Accumulates SQL text and bound parameters for one dialect.
pub struct SqlWriter<'a> {
    dialect: &'a dyn Dialect,
    sql: String,
    params: ParamList,
    error: Option<QbError>,
}

impl<'a> SqlWriter<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            dialect,
            sql: String::new(),
            params: ParamList::new(),
            error: None,
        }
    }

    /// The dialect being rendered for.
    pub fn dialect(&self) -> &'a dyn Dialect {
        self.dialect
    }

    /// Append raw SQL text.
    pub fn write(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    /// Append an identifier, quoted for the dialect where needed.
    pub fn write_ident(&mut self, ident: &Ident) {
        ident.write_sql(self.dialect, &mut self.sql);
    }

    /// Bind a value and write its placeholder.
    pub fn push_param(&mut self, param: &Param) {
        let idx = self.params.push_param(param.clone());
        self.dialect.placeholder().write(idx, &mut self.sql);
    }

    /// Write `items` separated by `sep`.
    pub fn write_list<T: WriteSql>(&mut self, items: &[T], sep: &str) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.write(sep);
            }
            item.write_sql(self);
        }
    }

    /// Record a rendering failure. The first error wins; the output is discarded.
    pub fn fail(&mut self, err: QbError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    pub fn has_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Finish rendering, returning the full statement or the first error.
    pub fn finish(self) -> QbResult<BuiltQuery> {
        let result = match (self.error, self.dialect.max_params()) {
            (Some(err), _) => Err(err),
            (None, Some(max)) if self.params.len() > max => Err(QbError::TooManyParams {
                count: self.params.len(),
                max,
            }),
            (None, _) => Ok(BuiltQuery {
                sql: self.sql,
                params: self.params,
            }),
        };

        #[cfg(feature = "tracing")]
        {
            let dialect = self.dialect.name();
            match &result {
                Ok(built) => tracing::debug!(
                    target: "sqlcompose.sql",
                    dialect,
                    param_count = built.params.len(),
                    sql = %built.sql,
                    "built query"
                ),
                Err(err) => tracing::warn!(
                    target: "sqlcompose.sql",
                    dialect,
                    error = %err,
                    "query build failed"
                ),
            }
        }

        result
    }
}

/// A rendered statement: SQL text plus its parameters in placeholder order.
#[derive(Debug, Clone)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: ParamList,
}

impl BuiltQuery {
    /// Get parameters as references for a tokio-postgres style executor.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.as_refs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Postgres, SqlServer, Sqlite};

    #[test]
    fn placeholders_follow_push_order() {
        let mut w = SqlWriter::new(&Postgres);
        w.write("a = ");
        w.push_param(&Param::new(1i32));
        w.write(" AND b = ");
        w.push_param(&Param::new("x"));
        let built = w.finish().unwrap();
        assert_eq!(built.sql, "a = $1 AND b = $2");
        assert_eq!(built.params.len(), 2);
        assert_eq!(built.params_ref().len(), 2);
    }

    #[test]
    fn placeholder_syntax_comes_from_dialect() {
        let mut w = SqlWriter::new(&SqlServer);
        w.push_param(&Param::new(1i32));
        w.write(", ");
        w.push_param(&Param::new(2i32));
        assert_eq!(w.finish().unwrap().sql, "@p1, @p2");

        let mut w = SqlWriter::new(&Sqlite);
        w.push_param(&Param::new(1i32));
        w.write(", ");
        w.push_param(&Param::new(2i32));
        assert_eq!(w.finish().unwrap().sql, "?, ?");
    }

    #[test]
    fn first_error_wins_and_discards_output() {
        let mut w = SqlWriter::new(&Postgres);
        w.write("SELECT 1");
        w.fail(QbError::validation("first"));
        w.fail(QbError::validation("second"));
        assert!(w.has_failed());
        assert_eq!(w.finish().unwrap_err(), QbError::validation("first"));
    }

    #[test]
    fn too_many_params_is_rejected() {
        let mut w = SqlWriter::new(&SqlServer);
        for i in 0..2101 {
            if i > 0 {
                w.write(", ");
            }
            w.push_param(&Param::new(i));
        }
        assert_eq!(
            w.finish().unwrap_err(),
            QbError::TooManyParams {
                count: 2101,
                max: 2100
            }
        );
    }
}
