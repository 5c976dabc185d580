//! Record store abstraction.
//!
//! The [`RecordStore`] trait is the single owner of ECU records. It enforces
//! the `(part_number, model_name)` uniqueness rule on insert, assigns
//! monotonically increasing ids that are never reused, and answers every read
//! from current state (no cached projections).
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`insert`](RecordStore::insert) | Create a record, rejecting duplicate pairs |
//! | [`update`](RecordStore::update) | Rewrite all three fields of a record by id |
//! | [`delete`](RecordStore::delete) | Remove a record by id |
//! | [`get`](RecordStore::get) | Look up one record by id |
//! | [`search`](RecordStore::search) | Filtered, id-ordered scan |
//! | [`get_all`](RecordStore::get_all) | Unfiltered, id-ordered scan |
//! | [`count`](RecordStore::count) | Number of stored records |
//!
//! Two backends are provided: [`SqliteStore`] (durable, one connection per
//! operation) and [`MemoryStore`] (process-local, same semantics).

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::{EcuRecord, NewEcu};
use crate::search::SearchFilter;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Trim and insert a record, returning its new id.
    ///
    /// Fails with [`StoreError::Duplicate`](crate::error::StoreError::Duplicate)
    /// if the trimmed `(part_number, model_name)` pair already exists.
    async fn insert(&self, ecu: &NewEcu) -> StoreResult<i64>;

    /// Trim and rewrite the record with `id` in place.
    ///
    /// Returns `false` if no such record exists. There is no pre-check of the
    /// new pair against other rows; a collision surfaces only through the
    /// table's unique constraint as `StoreError::Duplicate`.
    async fn update(&self, id: i64, ecu: &NewEcu) -> StoreResult<bool>;

    /// Remove the record with `id`. Returns whether anything was removed.
    async fn delete(&self, id: i64) -> StoreResult<bool>;

    async fn get(&self, id: i64) -> StoreResult<Option<EcuRecord>>;

    /// Records matching `filter`, ordered by ascending id.
    async fn search(&self, filter: &SearchFilter) -> StoreResult<Vec<EcuRecord>>;

    /// Every record, ordered by ascending id.
    async fn get_all(&self) -> StoreResult<Vec<EcuRecord>> {
        self.search(&SearchFilter::all()).await
    }

    async fn count(&self) -> StoreResult<i64>;
}
