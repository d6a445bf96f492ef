//! dbutil Library
//!
//! Thin helpers over sqlx for SQL databases (PostgreSQL, MySQL, SQLite):
//! connect by URL with a liveness check, existence queries, one trait contract
//! for connections and transactions, and commit-or-rollback finalization.

pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use config::{Config, PoolOptions};
pub use db::{
    Db, SqlReadWriter, SqlReader, Tx, WrappedDb, WrappedTx, close_tx, connect, connect_with,
    exists, get_driver, must_connect, must_connect_with, with_transaction,
};
pub use error::{DbError, DbResult};
pub use models::SqlValue;
