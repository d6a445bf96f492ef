//! Existence checks.

use crate::db::traits::SqlReader;
use crate::error::{DbError, DbResult};
use crate::models::SqlValue;
use sqlx::Row;
use sqlx::any::AnyRow;

/// Wrap `query` in `SELECT EXISTS(...)` and return the answer.
///
/// `query` should be a `SELECT` without a trailing `;`, written in the driver's
/// placeholder syntax (see [`SqlReader::rebind`]). An empty result set is a
/// valid negative answer, not an error:
///
/// ```ignore
/// let query = db.rebind("SELECT 1 FROM foo WHERE bar = ?").into_owned();
/// if exists(&mut db, &query, &sql_args!["baz"]).await? {
///     // do something
/// }
/// ```
pub async fn exists<R>(handle: &mut R, query: &str, args: &[SqlValue]) -> DbResult<bool>
where
    R: SqlReader,
{
    let sql = format!("SELECT EXISTS({query})");
    match handle.query_row(&sql, args).await {
        Ok(row) => decode_exists(&row),
        Err(DbError::NoRows) => Ok(false),
        Err(err) => Err(err),
    }
}

/// SQLite and MySQL report `EXISTS` as an integer.
fn decode_exists(row: &AnyRow) -> DbResult<bool> {
    match row.try_get::<bool, _>(0) {
        Ok(found) => Ok(found),
        Err(_) => Ok(row.try_get::<i64, _>(0)? != 0),
    }
}
