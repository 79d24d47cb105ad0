//! In-memory implementation of the storage adapter, for testing and
//! development.

use crate::core::descriptor::EntityDescriptor;
use crate::core::entity::IdValue;
use crate::core::query::{QueryDescription, Sort, SortDirection};
use crate::core::store::{StorageAdapter, StorageError};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

/// Collection name → (canonical identity → record).
type Collections = HashMap<String, IndexMap<String, Value>>;

/// In-memory storage adapter. Thread-safe via `RwLock`; records are kept in
/// insertion order per collection.
#[derive(Default)]
pub struct InMemoryStorage {
    collections: RwLock<Collections>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn record_key(shape: &EntityDescriptor, record: &Value) -> Result<String, StorageError> {
        let id = record.get(&shape.id_field).ok_or_else(|| {
            StorageError::Backend(format!(
                "record has no identity field '{}'",
                shape.id_field
            ))
        })?;
        match id {
            Value::String(s) if !s.is_empty() => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            _ => Err(StorageError::Backend(format!(
                "record identity field '{}' is not a usable key",
                shape.id_field
            ))),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Collections> {
        self.collections.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Collections> {
        self.collections.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl StorageAdapter for InMemoryStorage {
    async fn init(&self) -> Result<(), StorageError> {
        Ok(())
    }

    /// Schemaless: pre-creates empty collections and succeeds on repeats.
    async fn sync_schema(&self, shapes: &[EntityDescriptor]) -> Result<(), StorageError> {
        let mut collections = self.write();
        for shape in shapes {
            collections.entry(shape.collection.clone()).or_default();
        }
        Ok(())
    }

    async fn create(&self, shape: &EntityDescriptor, record: Value) -> Result<(), StorageError> {
        let key = Self::record_key(shape, &record)?;
        let mut collections = self.write();
        let collection = collections.entry(shape.collection.clone()).or_default();
        if collection.contains_key(&key) {
            return Err(StorageError::Conflict(format!(
                "{} '{}' already exists",
                shape.entity_type, key
            )));
        }
        collection.insert(key, record);
        Ok(())
    }

    async fn update(&self, shape: &EntityDescriptor, record: Value) -> Result<(), StorageError> {
        let key = Self::record_key(shape, &record)?;
        let mut collections = self.write();
        let collection = collections.entry(shape.collection.clone()).or_default();
        if !collection.contains_key(&key) {
            return Err(StorageError::NotFound);
        }
        collection.insert(key, record);
        Ok(())
    }

    async fn delete(&self, id: &IdValue, shape: &EntityDescriptor) -> Result<(), StorageError> {
        let mut collections = self.write();
        let collection = collections.entry(shape.collection.clone()).or_default();
        collection
            .shift_remove(&id.canonical())
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }

    async fn find_all(
        &self,
        shape: &EntityDescriptor,
        query: &QueryDescription,
    ) -> Result<Vec<Value>, StorageError> {
        let collections = self.read();
        let mut records: Vec<Value> = collections
            .get(&shape.collection)
            .map(|collection| {
                collection
                    .values()
                    .filter(|record| {
                        query
                            .filters
                            .iter()
                            .all(|(field, expected)| field_matches(record.get(field), expected))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        drop(collections);

        if !query.sort.is_empty() {
            records.sort_by(|a, b| compare_records(a, b, &query.sort));
        }

        let offset = query.pagination.offset.min(records.len());
        let mut page: Vec<Value> = records.split_off(offset);
        // limit 0 means unbounded
        if query.pagination.limit > 0 {
            page.truncate(query.pagination.limit);
        }
        Ok(page)
    }

    async fn find_by_id(
        &self,
        id: &IdValue,
        shape: &EntityDescriptor,
    ) -> Result<Value, StorageError> {
        let collections = self.read();
        collections
            .get(&shape.collection)
            .and_then(|collection| collection.get(&id.canonical()))
            .cloned()
            .ok_or(StorageError::NotFound)
    }
}

/// Exact-match comparison between a record field and transport-level filter
/// text.
fn field_matches(field: Option<&Value>, expected: &str) -> bool {
    match field {
        Some(Value::String(s)) => s == expected,
        Some(Value::Number(n)) => expected
            .parse::<f64>()
            .is_ok_and(|e| n.as_f64().is_some_and(|v| v == e)),
        Some(Value::Bool(b)) => expected.parse::<bool>().is_ok_and(|e| e == *b),
        _ => false,
    }
}

fn compare_records(a: &Value, b: &Value, sort: &[Sort]) -> Ordering {
    for criterion in sort {
        let ordering = compare_values(a.get(&criterion.field), b.get(&criterion.field));
        let ordering = match criterion.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Total order over the JSON values we sort on: missing/null first, then
/// booleans, numbers, strings; everything else compares equal.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::Entity;
    use crate::core::hooks::Hooks;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct Item {
        id: u64,
        name: String,
        amount: i64,
    }

    impl Entity for Item {
        const TYPE_NAME: &'static str = "item";
        type Id = u64;

        fn id(&self) -> Self::Id {
            self.id
        }

        fn set_id(&mut self, id: Self::Id) {
            self.id = id;
        }
    }

    impl Hooks for Item {}

    fn shape() -> std::sync::Arc<EntityDescriptor> {
        EntityDescriptor::describe::<Item>()
    }

    fn record(id: u64, name: &str, amount: i64) -> Value {
        json!({"id": id, "name": name, "amount": amount})
    }

    async fn seeded(records: &[Value]) -> InMemoryStorage {
        let store = InMemoryStorage::new();
        for r in records {
            store.create(&shape(), r.clone()).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_create_then_find_by_id() {
        let store = seeded(&[record(1, "a", 5)]).await;
        let found = store.find_by_id(&IdValue::Uint(1), &shape()).await.unwrap();
        assert_eq!(found["name"], "a");
    }

    #[tokio::test]
    async fn test_create_conflict() {
        let store = seeded(&[record(1, "a", 5)]).await;
        let err = store.create(&shape(), record(1, "b", 6)).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = InMemoryStorage::new();
        let err = store.update(&shape(), record(9, "x", 0)).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = seeded(&[record(1, "a", 5)]).await;
        store.delete(&IdValue::Uint(1), &shape()).await.unwrap();
        let err = store.find_by_id(&IdValue::Uint(1), &shape()).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
        let err = store.delete(&IdValue::Uint(1), &shape()).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn test_find_all_filters_are_anded() {
        let store = seeded(&[
            record(1, "a", 5),
            record(2, "a", 6),
            record(3, "b", 5),
        ])
        .await;

        let mut query = QueryDescription::default();
        query.filters.insert("name".into(), "a".into());
        query.filters.insert("amount".into(), "5".into());

        let found = store.find_all(&shape(), &query).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["id"], 1);
    }

    #[tokio::test]
    async fn test_find_all_no_match_is_empty_not_error() {
        let store = seeded(&[record(1, "a", 5)]).await;
        let mut query = QueryDescription::default();
        query.filters.insert("name".into(), "zzz".into());
        assert!(store.find_all(&shape(), &query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_all_multi_field_sort() {
        let store = seeded(&[
            record(1, "b", 1),
            record(2, "a", 2),
            record(3, "a", 9),
        ])
        .await;

        let mut query = QueryDescription::default();
        query.sort = vec![
            Sort {
                field: "name".into(),
                direction: SortDirection::Asc,
            },
            Sort {
                field: "amount".into(),
                direction: SortDirection::Desc,
            },
        ];

        let found = store.find_all(&shape(), &query).await.unwrap();
        let ids: Vec<u64> = found.iter().map(|r| r["id"].as_u64().unwrap()).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_find_all_pagination() {
        let records: Vec<Value> = (1..=15).map(|i| record(i, "x", i as i64)).collect();
        let store = seeded(&records).await;

        // default window
        let page = store
            .find_all(&shape(), &QueryDescription::default())
            .await
            .unwrap();
        assert_eq!(page.len(), 10);

        // offset into the tail
        let mut query = QueryDescription::default();
        query.pagination.offset = 12;
        let tail = store.find_all(&shape(), &query).await.unwrap();
        assert_eq!(tail.len(), 3);

        // limit 0 means unbounded
        let mut query = QueryDescription::default();
        query.pagination.limit = 0;
        let all = store.find_all(&shape(), &query).await.unwrap();
        assert_eq!(all.len(), 15);
    }

    #[tokio::test]
    async fn test_sync_schema_is_idempotent() {
        let store = InMemoryStorage::new();
        let shapes = vec![(*shape()).clone()];
        store.sync_schema(&shapes).await.unwrap();
        store.sync_schema(&shapes).await.unwrap();
        // collection exists and is empty
        let all = store
            .find_all(&shape(), &QueryDescription::default())
            .await
            .unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_missing_identity_field_is_backend_error() {
        let store = InMemoryStorage::new();
        let err = store
            .create(&shape(), json!({"name": "no id"}))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Backend(_)));
    }
}
