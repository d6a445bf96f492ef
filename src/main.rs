//! dbutil - Main entry point.
//!
//! Small command-line front end for the library: print the driver of a
//! connection URL, check that a database is reachable, or run an existence
//! query.

use clap::Parser;
use dbutil::config::{Command, Config};
use dbutil::db::{Db, SqlReader, WrappedDb, exists, get_driver, must_connect_with};
use dbutil::models::SqlValue;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Connect using the resolved URL and pool options, exiting on failure.
async fn open(config: &Config) -> Result<Db, Box<dyn std::error::Error>> {
    let (url, pool_options) = config.resolve_pool()?;
    Ok(must_connect_with(&url, &pool_options).await)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration from command line and environment
    let config = Config::parse();

    // Initialize logging
    init_tracing(&config);

    match &config.command {
        Command::Driver => {
            println!("{}", get_driver(&config.database_url)?);
        }
        Command::Ping => {
            let db = open(&config).await?;
            info!(
                driver = %db.driver(),
                open_connections = db.open_connections(),
                "Database is reachable"
            );
            println!("ok");
            db.close().await;
        }
        Command::Exists { query, args } => {
            let mut db = open(&config).await?;
            let args: Vec<SqlValue> = args.iter().cloned().map(SqlValue::Text).collect();
            let query = db.rebind(query).into_owned();
            let found = exists(&mut db, &query, &args).await;
            db.close().await;
            println!("{}", found?);
        }
    }

    Ok(())
}
