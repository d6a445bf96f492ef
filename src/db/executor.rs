//! Query execution shared by pooled connections and transactions.
//!
//! Every function is generic over an sqlx executor, so `Db` passes `&AnyPool`
//! and `Tx` passes `&mut AnyConnection`.

use crate::db::params::to_arguments;
use crate::db::statement::PreparedStatement;
use crate::error::{DbError, DbResult};
use crate::models::SqlValue;
use sqlx::any::{AnyQueryResult, AnyRow};
use sqlx::{Any, Executor, FromRow, Statement};
use tracing::debug;

pub(crate) async fn fetch_all<'c, E>(
    executor: E,
    sql: &str,
    args: &[SqlValue],
) -> DbResult<Vec<AnyRow>>
where
    E: Executor<'c, Database = Any>,
{
    let arguments = to_arguments(args)?;
    let rows = sqlx::query_with(sql, arguments).fetch_all(executor).await?;
    debug!(rows = rows.len(), "Query returned rows");
    Ok(rows)
}

pub(crate) async fn fetch_one<'c, E>(executor: E, sql: &str, args: &[SqlValue]) -> DbResult<AnyRow>
where
    E: Executor<'c, Database = Any>,
{
    let arguments = to_arguments(args)?;
    Ok(sqlx::query_with(sql, arguments)
        .fetch_one(executor)
        .await?)
}

pub(crate) async fn fetch_all_as<'c, E, T>(
    executor: E,
    sql: &str,
    args: &[SqlValue],
) -> DbResult<Vec<T>>
where
    E: Executor<'c, Database = Any>,
    T: for<'r> FromRow<'r, AnyRow> + Send + Unpin,
{
    let arguments = to_arguments(args)?;
    Ok(sqlx::query_as_with::<_, T, _>(sql, arguments)
        .fetch_all(executor)
        .await?)
}

pub(crate) async fn fetch_one_as<'c, E, T>(executor: E, sql: &str, args: &[SqlValue]) -> DbResult<T>
where
    E: Executor<'c, Database = Any>,
    T: for<'r> FromRow<'r, AnyRow> + Send + Unpin,
{
    let arguments = to_arguments(args)?;
    Ok(sqlx::query_as_with::<_, T, _>(sql, arguments)
        .fetch_one(executor)
        .await?)
}

pub(crate) async fn fetch_scalar<'c, E, T>(
    executor: E,
    sql: &str,
    args: &[SqlValue],
) -> DbResult<T>
where
    E: Executor<'c, Database = Any>,
    T: Send + Unpin,
    (T,): for<'r> FromRow<'r, AnyRow>,
{
    let arguments = to_arguments(args)?;
    Ok(sqlx::query_scalar_with::<_, T, _>(sql, arguments)
        .fetch_one(executor)
        .await?)
}

pub(crate) async fn execute<'c, E>(
    executor: E,
    sql: &str,
    args: &[SqlValue],
) -> DbResult<AnyQueryResult>
where
    E: Executor<'c, Database = Any>,
{
    let arguments = to_arguments(args)?;
    let result = sqlx::query_with(sql, arguments).execute(executor).await?;
    debug!(
        rows_affected = result.rows_affected(),
        "Statement executed"
    );
    Ok(result)
}

pub(crate) async fn prepare<'c, E>(executor: E, sql: &str) -> DbResult<PreparedStatement>
where
    E: Executor<'c, Database = Any>,
{
    let statement = executor.prepare(sql).await.map_err(DbError::from)?;
    Ok(PreparedStatement::new(&statement))
}

pub(crate) async fn execute_prepared<'c, E>(
    executor: E,
    statement: &PreparedStatement,
    args: &[SqlValue],
) -> DbResult<AnyQueryResult>
where
    E: Executor<'c, Database = Any>,
{
    let arguments = to_arguments(args)?;
    let result = statement
        .inner()
        .query_with(arguments)
        .execute(executor)
        .await?;
    debug!(
        rows_affected = result.rows_affected(),
        "Prepared statement executed"
    );
    Ok(result)
}
