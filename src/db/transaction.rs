//! Transaction finalization.
//!
//! [`close_tx`] is the single place where a transaction leaves the `Open`
//! state: it commits when the work succeeded and rolls back when it failed.
//! The work's error is never dropped. If the rollback fails too, the returned
//! [`DbError::Finalization`] carries the work's error as `original` (see
//! [`DbError::root_cause`]).

use crate::db::traits::{WrappedDb, WrappedTx};
use crate::error::{DbError, DbResult, TxOperation};
use futures_util::future::BoxFuture;
use tracing::{debug, warn};

/// Finalize `tx` according to `outcome` and return the merged result.
///
/// ```ignore
/// let mut tx = db.begin().await?;
/// let outcome = async {
///     tx.execute("INSERT INTO test VALUES (1)", &[]).await?;
///     tx.execute("INSERT INTO test VALUES (2)", &[]).await
/// }
/// .await;
/// close_tx(tx, outcome).await?;
/// ```
pub async fn close_tx<X, T>(tx: X, outcome: DbResult<T>) -> DbResult<T>
where
    X: WrappedTx,
{
    match outcome {
        Ok(value) => match tx.commit().await {
            Ok(()) => Ok(value),
            Err(err) => Err(commit_error(err)),
        },
        Err(original) => match tx.rollback().await {
            Ok(()) => {
                debug!(error = %original, "Rolled back after failure");
                Err(original)
            }
            Err(err) => {
                warn!(
                    error = %original,
                    rollback_error = %err,
                    "Rollback failed after failure"
                );
                Err(merge_rollback_error(err, original))
            }
        },
    }
}

/// Begin a transaction on `db`, run `f` in it, and finalize with [`close_tx`].
pub async fn with_transaction<D, F, T>(db: &D, f: F) -> DbResult<T>
where
    D: WrappedDb,
    F: for<'t> FnOnce(&'t mut D::Tx) -> BoxFuture<'t, DbResult<T>>,
{
    let mut tx = db.begin().await?;
    let outcome = f(&mut tx).await;
    close_tx(tx, outcome).await
}

fn commit_error(err: DbError) -> DbError {
    match err {
        err @ DbError::Finalization { .. } => err,
        other => DbError::commit_failed(other),
    }
}

/// Attach the work's error to a rollback failure.
fn merge_rollback_error(rollback: DbError, original: DbError) -> DbError {
    match rollback {
        DbError::Finalization {
            operation: TxOperation::Rollback,
            message,
            original: None,
        } => DbError::Finalization {
            operation: TxOperation::Rollback,
            message,
            original: Some(Box::new(original)),
        },
        other => DbError::rollback_failed(other, Some(original)),
    }
}
