//! Trait definitions for query builders.

use crate::dialect::Dialect;
use crate::error::{QbError, QbResult};
use crate::qb::writer::{BuiltQuery, SqlWriter, WriteSql};

/// Base trait for everything that renders a full statement.
///
/// Rendering is a pure function of the query and the dialect, so a value
/// may be built any number of times, from any thread, with identical results.
pub trait SqlQb: WriteSql {
    /// Error recorded while the builder was being assembled.
    fn build_error(&self) -> Option<&QbError> {
        None
    }

    /// Render SQL text and parameters for `dialect`.
    fn build(&self, dialect: &dyn Dialect) -> QbResult<BuiltQuery> {
        if let Some(err) = self.build_error() {
            return Err(err.clone());
        }
        let mut w = SqlWriter::new(dialect);
        self.write_sql(&mut w);
        w.finish()
    }

    /// Debug helper to get only the SQL string.
    fn to_sql(&self, dialect: &dyn Dialect) -> QbResult<String> {
        self.build(dialect).map(|built| built.sql)
    }
}
