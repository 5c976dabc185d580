use sqlx::sqlite::SqliteConnectOptions;
use sqlx::Connection;

use crate::db;

/// Create the catalog table if it does not exist. Safe to run on every startup.
pub async fn migrate_catalog(options: &SqliteConnectOptions) -> sqlx::Result<()> {
    let mut conn = db::open(options).await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS modelos_ecu (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            num_bosch TEXT NOT NULL,
            modelo_ecu TEXT NOT NULL,
            fabricante TEXT NOT NULL,
            UNIQUE(num_bosch, modelo_ecu)
        )
        "#,
    )
    .execute(&mut conn)
    .await?;

    conn.close().await
}

/// Create the gate's credential table if it does not exist.
pub async fn migrate_users(options: &SqliteConnectOptions) -> sqlx::Result<()> {
    let mut conn = db::open(options).await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS usuarios (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nome TEXT NOT NULL,
            email TEXT UNIQUE NOT NULL,
            endereco TEXT,
            usuario TEXT UNIQUE NOT NULL,
            senha_hash TEXT NOT NULL
        )
        "#,
    )
    .execute(&mut conn)
    .await?;

    conn.close().await
}
