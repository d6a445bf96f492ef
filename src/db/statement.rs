//! Prepared statements.

use sqlx::any::AnyStatement;
use sqlx::{Column, Either, Statement};

/// A statement prepared through [`SqlReadWriter::prepare`](crate::db::SqlReadWriter::prepare).
///
/// The statement owns its SQL and can be executed any number of times, on the
/// handle that prepared it or on another handle of the same pool.
pub struct PreparedStatement {
    inner: AnyStatement<'static>,
}

impl PreparedStatement {
    pub(crate) fn new(statement: &AnyStatement<'_>) -> Self {
        Self {
            inner: Statement::to_owned(statement),
        }
    }

    pub(crate) fn inner(&self) -> &AnyStatement<'static> {
        &self.inner
    }

    /// The SQL text of the statement.
    pub fn sql(&self) -> &str {
        self.inner.sql()
    }

    /// Names of the result columns, empty for statements that return no rows.
    pub fn columns(&self) -> Vec<&str> {
        self.inner.columns().iter().map(|c| c.name()).collect()
    }

    /// Number of bind parameters, if the driver reports it.
    pub fn parameter_count(&self) -> Option<usize> {
        match self.inner.parameters()? {
            Either::Left(types) => Some(types.len()),
            Either::Right(count) => Some(count),
        }
    }
}

impl std::fmt::Debug for PreparedStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedStatement")
            .field("sql", &self.sql())
            .field("parameters", &self.parameter_count())
            .finish_non_exhaustive()
    }
}
