#![allow(dead_code)]

use dbutil::config::PoolOptions;
use dbutil::db::{Db, SqlReadWriter, connect_with};
use tempfile::NamedTempFile;

/// URL for a fresh SQLite file that is removed when the handle is dropped.
pub fn sqlite_url() -> (NamedTempFile, String) {
    let temp_file = NamedTempFile::new().unwrap();
    let url = format!("sqlite://{}?mode=rwc", temp_file.path().to_str().unwrap());
    (temp_file, url)
}

/// Connect to a fresh SQLite file with a single connection so every statement
/// sees the same session.
pub async fn sqlite_db() -> (NamedTempFile, Db) {
    let (temp_file, url) = sqlite_url();
    let options = PoolOptions::default().with_max_open_conns(1);
    let db = connect_with(&url, &options).await.unwrap();
    (temp_file, db)
}

/// Like [`sqlite_db`] with a `test` table holding integer ids.
pub async fn sqlite_db_with_test_table() -> (NamedTempFile, Db) {
    let (temp_file, mut db) = sqlite_db().await;
    db.execute("CREATE TABLE test (id INTEGER NOT NULL PRIMARY KEY)", &[])
        .await
        .unwrap();
    (temp_file, db)
}

/// PostgreSQL URL for tests that need a real server.
pub fn postgres_url() -> Option<String> {
    std::env::var("TEST_POSTGRES_URL").ok()
}
