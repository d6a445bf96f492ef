//! Database helpers.
//!
//! This module provides:
//! - Driver extraction and placeholder styles
//! - Connection establishment with liveness check
//! - Read/write traits shared by connections and transactions
//! - Existence checks
//! - Transaction finalization

pub mod connect;
pub mod driver;
pub mod exists;
mod executor;
pub mod handle;
mod params;
pub mod placeholders;
pub mod statement;
pub mod traits;
pub mod transaction;

pub use connect::{connect, connect_with, must_connect, must_connect_with};
pub use driver::{BindStyle, get_driver};
pub use exists::exists;
pub use handle::{Db, Tx};
pub use placeholders::{NamedQuery, compile_named, rebind};
pub use statement::PreparedStatement;
pub use traits::{SqlReadWriter, SqlReader, WrappedDb, WrappedTx};
pub use transaction::{close_tx, with_transaction};
