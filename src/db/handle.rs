//! Concrete connection and transaction handles.

use crate::db::driver::BindStyle;
use crate::db::executor;
use crate::db::statement::PreparedStatement;
use crate::db::traits::{SqlReadWriter, SqlReader, WrappedDb, WrappedTx};
use crate::db::transaction::with_transaction;
use crate::error::{DbError, DbResult};
use crate::models::SqlValue;
use futures_util::future::BoxFuture;
use sqlx::any::{AnyQueryResult, AnyRow};
use sqlx::{AnyConnection, AnyPool};
use sqlx::{Any, FromRow, Transaction};
use tracing::{debug, info};

/// A pooled database handle.
///
/// Cloning is cheap and every clone shares the same pool.
#[derive(Debug, Clone)]
pub struct Db {
    pool: AnyPool,
    driver: String,
    bind_style: BindStyle,
}

impl Db {
    pub(crate) fn new(pool: AnyPool, driver: &str) -> Self {
        Self {
            pool,
            driver: driver.to_string(),
            bind_style: BindStyle::for_driver(driver),
        }
    }

    /// The underlying sqlx pool.
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Run `f` inside a transaction, committing if it succeeds and rolling
    /// back if it fails.
    ///
    /// ```ignore
    /// db.transaction(|tx| Box::pin(async move {
    ///     tx.execute("INSERT INTO test VALUES (1)", &[]).await?;
    ///     Ok(())
    /// }))
    /// .await?;
    /// ```
    pub async fn transaction<F, T>(&self, f: F) -> DbResult<T>
    where
        F: for<'t> FnOnce(&'t mut Tx) -> BoxFuture<'t, DbResult<T>>,
    {
        with_transaction(self, f).await
    }
}

impl SqlReader for Db {
    fn driver(&self) -> &str {
        &self.driver
    }

    fn bind_style(&self) -> BindStyle {
        self.bind_style
    }

    async fn query(&mut self, sql: &str, args: &[SqlValue]) -> DbResult<Vec<AnyRow>> {
        executor::fetch_all(&self.pool, sql, args).await
    }

    async fn query_row(&mut self, sql: &str, args: &[SqlValue]) -> DbResult<AnyRow> {
        executor::fetch_one(&self.pool, sql, args).await
    }

    async fn select<T>(&mut self, sql: &str, args: &[SqlValue]) -> DbResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, AnyRow> + Send + Unpin,
    {
        executor::fetch_all_as(&self.pool, sql, args).await
    }

    async fn get<T>(&mut self, sql: &str, args: &[SqlValue]) -> DbResult<T>
    where
        T: for<'r> FromRow<'r, AnyRow> + Send + Unpin,
    {
        executor::fetch_one_as(&self.pool, sql, args).await
    }

    async fn get_scalar<T>(&mut self, sql: &str, args: &[SqlValue]) -> DbResult<T>
    where
        T: Send + Unpin,
        (T,): for<'r> FromRow<'r, AnyRow>,
    {
        executor::fetch_scalar(&self.pool, sql, args).await
    }
}

impl SqlReadWriter for Db {
    async fn execute(&mut self, sql: &str, args: &[SqlValue]) -> DbResult<AnyQueryResult> {
        executor::execute(&self.pool, sql, args).await
    }

    async fn prepare(&mut self, sql: &str) -> DbResult<PreparedStatement> {
        executor::prepare(&self.pool, sql).await
    }

    async fn execute_prepared(
        &mut self,
        statement: &PreparedStatement,
        args: &[SqlValue],
    ) -> DbResult<AnyQueryResult> {
        executor::execute_prepared(&self.pool, statement, args).await
    }
}

impl WrappedDb for Db {
    type Tx = Tx;

    async fn begin(&self) -> DbResult<Tx> {
        let inner = self.pool.begin().await?;
        debug!(driver = %self.driver, "Transaction started");
        Ok(Tx {
            inner,
            driver: self.driver.clone(),
            bind_style: self.bind_style,
        })
    }

    async fn close(&self) {
        info!(driver = %self.driver, "Closing connection pool");
        self.pool.close().await;
    }

    fn open_connections(&self) -> u32 {
        self.pool.size()
    }
}

/// An open transaction on one pooled connection.
///
/// A `Tx` that is dropped without [`commit`](WrappedTx::commit) or
/// [`rollback`](WrappedTx::rollback) is rolled back by sqlx when its
/// connection returns to the pool.
pub struct Tx {
    inner: Transaction<'static, Any>,
    driver: String,
    bind_style: BindStyle,
}

impl Tx {
    /// The connection this transaction runs on.
    pub fn connection(&mut self) -> &mut AnyConnection {
        &mut self.inner
    }
}

impl std::fmt::Debug for Tx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tx")
            .field("driver", &self.driver)
            .finish_non_exhaustive()
    }
}

impl SqlReader for Tx {
    fn driver(&self) -> &str {
        &self.driver
    }

    fn bind_style(&self) -> BindStyle {
        self.bind_style
    }

    async fn query(&mut self, sql: &str, args: &[SqlValue]) -> DbResult<Vec<AnyRow>> {
        executor::fetch_all(&mut *self.inner, sql, args).await
    }

    async fn query_row(&mut self, sql: &str, args: &[SqlValue]) -> DbResult<AnyRow> {
        executor::fetch_one(&mut *self.inner, sql, args).await
    }

    async fn select<T>(&mut self, sql: &str, args: &[SqlValue]) -> DbResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, AnyRow> + Send + Unpin,
    {
        executor::fetch_all_as(&mut *self.inner, sql, args).await
    }

    async fn get<T>(&mut self, sql: &str, args: &[SqlValue]) -> DbResult<T>
    where
        T: for<'r> FromRow<'r, AnyRow> + Send + Unpin,
    {
        executor::fetch_one_as(&mut *self.inner, sql, args).await
    }

    async fn get_scalar<T>(&mut self, sql: &str, args: &[SqlValue]) -> DbResult<T>
    where
        T: Send + Unpin,
        (T,): for<'r> FromRow<'r, AnyRow>,
    {
        executor::fetch_scalar(&mut *self.inner, sql, args).await
    }
}

impl SqlReadWriter for Tx {
    async fn execute(&mut self, sql: &str, args: &[SqlValue]) -> DbResult<AnyQueryResult> {
        executor::execute(&mut *self.inner, sql, args).await
    }

    async fn prepare(&mut self, sql: &str) -> DbResult<PreparedStatement> {
        executor::prepare(&mut *self.inner, sql).await
    }

    async fn execute_prepared(
        &mut self,
        statement: &PreparedStatement,
        args: &[SqlValue],
    ) -> DbResult<AnyQueryResult> {
        executor::execute_prepared(&mut *self.inner, statement, args).await
    }
}

impl WrappedTx for Tx {
    async fn commit(self) -> DbResult<()> {
        self.inner
            .commit()
            .await
            .map_err(|e| DbError::commit_failed(e.into()))?;
        debug!(driver = %self.driver, "Transaction committed");
        Ok(())
    }

    async fn rollback(self) -> DbResult<()> {
        self.inner
            .rollback()
            .await
            .map_err(|e| DbError::rollback_failed(e.into(), None))?;
        debug!(driver = %self.driver, "Transaction rolled back");
        Ok(())
    }
}
