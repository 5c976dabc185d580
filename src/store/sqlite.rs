//! SQLite-backed [`RecordStore`].
//!
//! Each operation opens its own connection, runs parameterized statements
//! against the fixed `modelos_ecu` schema and closes the connection before
//! returning. Nothing is held between operations.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteRow};
use sqlx::{Connection, Row};
use std::path::Path;

use super::RecordStore;
use crate::db;
use crate::error::{StoreError, StoreResult};
use crate::migrate;
use crate::models::{EcuRecord, NewEcu};
use crate::search::{self, SearchFilter};

pub struct SqliteStore {
    options: SqliteConnectOptions,
}

impl SqliteStore {
    /// Open (creating if needed) the catalog database at `path` and ensure
    /// the schema exists.
    pub async fn open(path: &Path) -> Result<Self> {
        let options = db::connect_options(path)?;
        migrate::migrate_catalog(&options).await?;
        tracing::debug!(path = %path.display(), "catalog store ready");
        Ok(Self { options })
    }
}

fn row_to_record(row: &SqliteRow) -> EcuRecord {
    EcuRecord {
        id: row.get("id"),
        part_number: row.get("num_bosch"),
        model_name: row.get("modelo_ecu"),
        manufacturer: row.get("fabricante"),
    }
}

/// Map a unique-constraint violation to [`StoreError::Duplicate`].
fn map_write_error(err: sqlx::Error, ecu: &NewEcu) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StoreError::Duplicate {
            part_number: ecu.part_number.clone(),
            model_name: ecu.model_name.clone(),
        },
        _ => StoreError::Storage(err),
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn insert(&self, ecu: &NewEcu) -> StoreResult<i64> {
        let ecu = ecu.trimmed();
        let mut conn = db::open(&self.options).await?;

        let result = sqlx::query(
            "INSERT INTO modelos_ecu (num_bosch, modelo_ecu, fabricante) VALUES (?, ?, ?)",
        )
        .bind(&ecu.part_number)
        .bind(&ecu.model_name)
        .bind(&ecu.manufacturer)
        .execute(&mut conn)
        .await;
        conn.close().await?;

        let id = result
            .map_err(|e| map_write_error(e, &ecu))?
            .last_insert_rowid();
        tracing::debug!(id, part_number = %ecu.part_number, model = %ecu.model_name, "inserted ECU");
        Ok(id)
    }

    async fn update(&self, id: i64, ecu: &NewEcu) -> StoreResult<bool> {
        let ecu = ecu.trimmed();
        let mut conn = db::open(&self.options).await?;

        let result = sqlx::query(
            "UPDATE modelos_ecu SET num_bosch = ?, modelo_ecu = ?, fabricante = ? WHERE id = ?",
        )
        .bind(&ecu.part_number)
        .bind(&ecu.model_name)
        .bind(&ecu.manufacturer)
        .bind(id)
        .execute(&mut conn)
        .await;
        conn.close().await?;

        let updated = result.map_err(|e| map_write_error(e, &ecu))?.rows_affected() > 0;
        tracing::debug!(id, updated, "updated ECU");
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        let mut conn = db::open(&self.options).await?;

        let result = sqlx::query("DELETE FROM modelos_ecu WHERE id = ?")
            .bind(id)
            .execute(&mut conn)
            .await;
        conn.close().await?;

        let removed = result?.rows_affected() > 0;
        tracing::debug!(id, removed, "deleted ECU");
        Ok(removed)
    }

    async fn get(&self, id: i64) -> StoreResult<Option<EcuRecord>> {
        let mut conn = db::open(&self.options).await?;

        let row = sqlx::query(
            "SELECT id, num_bosch, modelo_ecu, fabricante FROM modelos_ecu WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut conn)
        .await;
        conn.close().await?;

        Ok(row?.as_ref().map(row_to_record))
    }

    async fn search(&self, filter: &SearchFilter) -> StoreResult<Vec<EcuRecord>> {
        let (sql, binds) = search::build_query(filter);
        let mut conn = db::open(&self.options).await?;

        let mut query = sqlx::query(&sql);
        for pattern in &binds {
            query = query.bind(pattern);
        }
        let rows = query.fetch_all(&mut conn).await;
        conn.close().await?;

        Ok(rows?.iter().map(row_to_record).collect())
    }

    async fn count(&self) -> StoreResult<i64> {
        let mut conn = db::open(&self.options).await?;

        let count: sqlx::Result<i64> = sqlx::query_scalar("SELECT COUNT(*) FROM modelos_ecu")
            .fetch_one(&mut conn)
            .await;
        conn.close().await?;

        Ok(count?)
    }
}
