use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteJournalMode};
use sqlx::ConnectOptions;
use std::path::Path;

/// Build connect options for the SQLite file at `path`.
///
/// The parent directory is created if needed; the database file itself is
/// created on first connect.
pub fn connect_options(path: &Path) -> Result<SqliteConnectOptions> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    Ok(SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal))
}

/// Open one connection. Callers close it when their operation is done.
pub async fn open(options: &SqliteConnectOptions) -> sqlx::Result<SqliteConnection> {
    options.connect().await
}
