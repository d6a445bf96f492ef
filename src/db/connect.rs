//! Connection establishment.
//!
//! A single connection is opened and pinged before the pool is built, so a bad
//! host, bad credentials or an unknown driver fail here with the client's own
//! error instead of a pool timeout on first use.

use crate::config::{PoolOptions, mask_url};
use crate::db::driver::get_driver;
use crate::db::handle::Db;
use crate::error::{DbError, DbResult};
use sqlx::any::{AnyConnectOptions, AnyPoolOptions, install_default_drivers};
use sqlx::{ConnectOptions, Connection};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, info};

/// Connect to the database named by `url` using default pool options.
pub async fn connect(url: &str) -> DbResult<Db> {
    connect_with(url, &PoolOptions::default()).await
}

/// Connect to the database named by `url`.
///
/// The driver comes from the URL scheme. One connection is opened directly
/// and pinged, bounded by the acquire timeout; its error is returned as
/// [`DbError::Connection`] with the client's message unchanged. Only then is
/// the pool created.
pub async fn connect_with(url: &str, options: &PoolOptions) -> DbResult<Db> {
    let driver = get_driver(url)?;
    options.validate().map_err(DbError::invalid_input)?;
    install_default_drivers();

    info!(
        driver = %driver,
        url = %mask_url(url),
        max_open_conns = options.max_open_conns_or_default(),
        max_lifetime_secs = options.max_lifetime_or_default().as_secs(),
        "Connecting to database"
    );

    let connect_options =
        AnyConnectOptions::from_str(url).map_err(|e| connection_error(driver, &e))?;

    let timeout = options.acquire_timeout_or_default();
    match tokio::time::timeout(timeout, ping(&connect_options)).await {
        Ok(Ok(())) => debug!(driver = %driver, "Ping succeeded"),
        Ok(Err(e)) => return Err(connection_error(driver, &e)),
        Err(_) => return Err(connect_timeout(driver, timeout)),
    }

    let pool = AnyPoolOptions::new()
        .max_connections(options.max_open_conns_or_default())
        .max_lifetime(options.max_lifetime_or_default())
        .acquire_timeout(timeout)
        .connect_with(connect_options)
        .await
        .map_err(|e| connection_error(driver, &e))?;

    info!(driver = %driver, "Connected successfully");
    Ok(Db::new(pool, driver))
}

/// Connect with default pool options, or terminate the process.
///
/// For start-up code only: any failure is logged and the process exits with
/// status 1.
pub async fn must_connect(url: &str) -> Db {
    must_connect_with(url, &PoolOptions::default()).await
}

/// Connect with the given pool options, or terminate the process.
pub async fn must_connect_with(url: &str, options: &PoolOptions) -> Db {
    match connect_with(url, options).await {
        Ok(db) => db,
        Err(e) => {
            error!(error = %e, url = %mask_url(url), "Cannot start without a database");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Open one connection outside the pool, ping it and close it.
async fn ping(options: &AnyConnectOptions) -> Result<(), sqlx::Error> {
    let mut conn = options.connect().await?;
    conn.ping().await?;
    conn.close().await
}

fn connect_timeout(driver: &str, timeout: Duration) -> DbError {
    DbError::connection(
        format!(
            "no response from the {} server within {}s",
            driver,
            timeout.as_secs()
        ),
        "Check that the host is reachable or raise the acquire timeout",
    )
}

fn connection_error(driver: &str, error: &sqlx::Error) -> DbError {
    DbError::connection(error.to_string(), connection_suggestion(driver, error))
}

/// Generate a helpful suggestion for connection errors.
fn connection_suggestion(driver: &str, error: &sqlx::Error) -> String {
    let error_str = error.to_string().to_lowercase();

    if error_str.contains("no driver found") || error_str.contains("unknown driver") {
        return format!(
            "Unknown driver '{}'; use a postgres://, mysql:// or sqlite:// URL",
            driver
        );
    }

    if error_str.contains("connection refused") {
        return format!("Check that the {} server is running and accessible", driver);
    }

    if error_str.contains("lookup address") || error_str.contains("no such host") {
        return "Check the host name in the connection string".to_string();
    }

    if error_str.contains("authentication") || error_str.contains("password") {
        return "Verify the username and password in the connection string".to_string();
    }

    if error_str.contains("does not exist") || error_str.contains("unknown database") {
        return "Check that the database name exists".to_string();
    }

    if error_str.contains("tls") || error_str.contains("ssl") {
        return "Check TLS/SSL configuration or try disabling it".to_string();
    }

    format!(
        "Verify the connection string format: {}://user:pass@host:port/db",
        driver
    )
}
