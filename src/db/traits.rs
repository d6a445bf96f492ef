//! Read/write capability contracts shared by connections and transactions.
//!
//! Code written against [`SqlReader`] or [`SqlReadWriter`] runs unchanged on a
//! pooled [`Db`](crate::db::Db) or an open [`Tx`](crate::db::Tx).
//!
//! ```ignore
//! async fn count_users<R: SqlReader>(handle: &mut R) -> DbResult<i64> {
//!     handle.get_scalar("SELECT COUNT(1) FROM users", &[]).await
//! }
//!
//! let total = count_users(&mut db).await?;
//! let mut tx = db.begin().await?;
//! let in_tx = count_users(&mut tx).await?;
//! ```

use crate::db::driver::BindStyle;
use crate::db::placeholders::{compile_named, rebind};
use crate::db::statement::PreparedStatement;
use crate::error::DbResult;
use crate::models::{NamedArgs, SqlValue};
use serde::Serialize;
use sqlx::FromRow;
use sqlx::any::{AnyQueryResult, AnyRow};
use std::borrow::Cow;
use std::future::Future;

/// Read-only operations.
pub trait SqlReader: Send {
    /// Driver name this handle was opened with.
    fn driver(&self) -> &str;

    /// Placeholder syntax of the driver.
    fn bind_style(&self) -> BindStyle;

    /// Rewrite `?` placeholders into the driver's placeholder syntax.
    fn rebind<'a>(&self, sql: &'a str) -> Cow<'a, str> {
        rebind(self.bind_style(), sql)
    }

    /// Run a query and collect every row.
    fn query(
        &mut self,
        sql: &str,
        args: &[SqlValue],
    ) -> impl Future<Output = DbResult<Vec<AnyRow>>> + Send;

    /// Run a query expected to produce one row.
    ///
    /// Fails with [`DbError::NoRows`](crate::DbError::NoRows) when the result set is empty.
    fn query_row(
        &mut self,
        sql: &str,
        args: &[SqlValue],
    ) -> impl Future<Output = DbResult<AnyRow>> + Send;

    /// Run a query and map every row into `T`.
    fn select<T>(
        &mut self,
        sql: &str,
        args: &[SqlValue],
    ) -> impl Future<Output = DbResult<Vec<T>>> + Send
    where
        T: for<'r> FromRow<'r, AnyRow> + Send + Unpin;

    /// Run a query and map its first row into `T`.
    fn get<T>(&mut self, sql: &str, args: &[SqlValue]) -> impl Future<Output = DbResult<T>> + Send
    where
        T: for<'r> FromRow<'r, AnyRow> + Send + Unpin;

    /// Run a query and decode the first column of its first row.
    fn get_scalar<T>(
        &mut self,
        sql: &str,
        args: &[SqlValue],
    ) -> impl Future<Output = DbResult<T>> + Send
    where
        T: Send + Unpin,
        (T,): for<'r> FromRow<'r, AnyRow>;
}

/// Read and write operations.
pub trait SqlReadWriter: SqlReader {
    /// Execute a statement that returns no rows.
    fn execute(
        &mut self,
        sql: &str,
        args: &[SqlValue],
    ) -> impl Future<Output = DbResult<AnyQueryResult>> + Send;

    /// Prepare a statement on this handle.
    fn prepare(&mut self, sql: &str) -> impl Future<Output = DbResult<PreparedStatement>> + Send;

    /// Execute a previously prepared statement.
    fn execute_prepared(
        &mut self,
        statement: &PreparedStatement,
        args: &[SqlValue],
    ) -> impl Future<Output = DbResult<AnyQueryResult>> + Send;

    /// Execute a statement written with `:name` parameters.
    ///
    /// `arg` is any struct or map that serializes to an object; its fields
    /// supply the values.
    fn named_execute<A>(
        &mut self,
        sql: &str,
        arg: &A,
    ) -> impl Future<Output = DbResult<AnyQueryResult>> + Send
    where
        A: Serialize + ?Sized,
    {
        let compiled = compile_named(self.bind_style(), sql);
        let values =
            NamedArgs::from_serialize(arg).and_then(|named| named.bind_order(&compiled.names));
        async move {
            let values = values?;
            self.execute(&compiled.sql, &values).await
        }
    }
}

/// A connection handle: read-write plus transaction creation and shutdown.
pub trait WrappedDb: SqlReadWriter {
    type Tx: WrappedTx;

    /// Start a transaction on a pooled connection.
    fn begin(&self) -> impl Future<Output = DbResult<Self::Tx>> + Send;

    /// Close the pool, releasing every physical connection.
    fn close(&self) -> impl Future<Output = ()> + Send;

    /// Number of physical connections currently open (in use or idle).
    fn open_connections(&self) -> u32;
}

/// An open transaction: read-write plus commit and rollback.
///
/// Both operations consume the transaction, so it is finalized at most once.
pub trait WrappedTx: SqlReadWriter {
    fn commit(self) -> impl Future<Output = DbResult<()>> + Send;

    fn rollback(self) -> impl Future<Output = DbResult<()>> + Send;
}
