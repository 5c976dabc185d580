//! In-memory [`RecordStore`] for tests and embedding.
//!
//! Mirrors the SQLite backend: ids come from a counter that never goes
//! backwards, the `(part_number, model_name)` pair is unique, and updates
//! that would collide fail the same way the table's unique constraint does.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::RecordStore;
use crate::error::{StoreError, StoreResult};
use crate::models::{EcuRecord, NewEcu};
use crate::search::SearchFilter;

#[derive(Default)]
struct Inner {
    next_id: i64,
    records: BTreeMap<i64, EcuRecord>,
}

impl Inner {
    fn pair_taken(&self, ecu: &NewEcu, except: Option<i64>) -> bool {
        self.records.values().any(|r| {
            Some(r.id) != except
                && r.part_number == ecu.part_number
                && r.model_name == ecu.model_name
        })
    }
}

/// Process-local store. Records live only as long as the value.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn duplicate(ecu: &NewEcu) -> StoreError {
    StoreError::Duplicate {
        part_number: ecu.part_number.clone(),
        model_name: ecu.model_name.clone(),
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, ecu: &NewEcu) -> StoreResult<i64> {
        let ecu = ecu.trimmed();
        let mut inner = self.lock();
        if inner.pair_taken(&ecu, None) {
            return Err(duplicate(&ecu));
        }
        inner.next_id += 1;
        let id = inner.next_id;
        inner.records.insert(id, ecu.into_record(id));
        Ok(id)
    }

    async fn update(&self, id: i64, ecu: &NewEcu) -> StoreResult<bool> {
        let ecu = ecu.trimmed();
        let mut inner = self.lock();
        if !inner.records.contains_key(&id) {
            return Ok(false);
        }
        if inner.pair_taken(&ecu, Some(id)) {
            return Err(duplicate(&ecu));
        }
        inner.records.insert(id, ecu.into_record(id));
        Ok(true)
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        Ok(self.lock().records.remove(&id).is_some())
    }

    async fn get(&self, id: i64) -> StoreResult<Option<EcuRecord>> {
        Ok(self.lock().records.get(&id).cloned())
    }

    async fn search(&self, filter: &SearchFilter) -> StoreResult<Vec<EcuRecord>> {
        // BTreeMap iteration is already ascending by id.
        Ok(self
            .lock()
            .records
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn count(&self) -> StoreResult<i64> {
        Ok(self.lock().records.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_then_duplicate() {
        let store = MemoryStore::new();
        let id = store.insert(&NewEcu::new("123", "ModelA", "Bosch")).await.unwrap();
        assert_eq!(id, 1);
        let err = store
            .insert(&NewEcu::new(" 123 ", "ModelA", "Siemens"))
            .await
            .unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn ids_never_reused() {
        let store = MemoryStore::new();
        let a = store.insert(&NewEcu::new("1", "A", "F")).await.unwrap();
        assert!(store.delete(a).await.unwrap());
        let b = store.insert(&NewEcu::new("1", "A", "F")).await.unwrap();
        assert!(b > a);
    }

    #[tokio::test]
    async fn update_semantics_match_sqlite() {
        let store = MemoryStore::new();
        let a = store.insert(&NewEcu::new("1", "A", "F")).await.unwrap();
        let b = store.insert(&NewEcu::new("2", "B", "F")).await.unwrap();

        assert!(!store.update(99, &NewEcu::new("1", "A", "F")).await.unwrap());
        assert!(store.update(b, &NewEcu::new("1", "A", "F")).await.unwrap_err().is_duplicate());
        assert!(store.update(a, &NewEcu::new("1", "A", "G")).await.unwrap());

        let all = store.get_all().await.unwrap();
        assert_eq!(all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(all[0].manufacturer, "G");
        assert_eq!(all[1].part_number, "2");
    }

    #[tokio::test]
    async fn search_filters_and_orders() {
        let store = MemoryStore::new();
        store.insert(&NewEcu::new("0281", "EDC16", "Bosch")).await.unwrap();
        store.insert(&NewEcu::new("5WS", "SID", "Siemens")).await.unwrap();
        store.insert(&NewEcu::new("0282", "EDC17", "Bosch")).await.unwrap();

        let hits = store.search(&SearchFilter::new("", "edc", "BOSCH")).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].id < hits[1].id);
        assert_eq!(store.get_all().await.unwrap().len(), 3);
    }
}
