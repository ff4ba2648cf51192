use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{BucketStore, StorageError};

#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Bytes,
    #[cfg_attr(not(test), allow(dead_code))]
    content_type: String,
}

/// In-process store for tests and dry runs. Clones share the same objects.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBucketStore {
    objects: Arc<Mutex<BTreeMap<String, StoredObject>>>,
}

impl InMemoryBucketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Synchronous seeding helper
    pub fn insert(&self, key: &str, bytes: impl Into<Bytes>) {
        if let Ok(mut objects) = self.objects.lock() {
            objects.insert(
                key.to_string(),
                StoredObject {
                    bytes: bytes.into(),
                    content_type: "application/octet-stream".to_string(),
                },
            );
        }
    }

    /// All keys currently stored, in order
    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .ok()
            .and_then(|objects| objects.get(key).map(|o| o.content_type.clone()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, StoredObject>>, StorageError> {
        self.objects
            .lock()
            .map_err(|_| StorageError::Sdk("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl BucketStore for InMemoryBucketStore {
    async fn put_object(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.lock()?.insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Bytes, StorageError> {
        self.lock()?
            .get(key)
            .map(|o| o.bytes.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        Ok(self
            .lock()?
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn copy_object(&self, source_key: &str, dest_key: &str) -> Result<(), StorageError> {
        let mut objects = self.lock()?;
        let object = objects
            .get(source_key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(source_key.to_string()))?;
        objects.insert(dest_key.to_string(), object);
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prefix_listing_is_ordered_and_bounded() {
        let store = InMemoryBucketStore::new();
        store.insert("a/2.json", "2");
        store.insert("a/1.json", "1");
        store.insert("ab/3.json", "3");
        store.insert("b/4.json", "4");

        assert_eq!(
            store.list_objects("a/").await.unwrap(),
            vec!["a/1.json".to_string(), "a/2.json".to_string()]
        );
        assert_eq!(store.list_objects("a").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = InMemoryBucketStore::new();
        let clone = store.clone();

        clone
            .put_object("k.csv", Bytes::from_static(b"x"), "text/csv")
            .await
            .unwrap();

        assert_eq!(store.keys(), vec!["k.csv".to_string()]);
        assert_eq!(store.content_type("k.csv").as_deref(), Some("text/csv"));
    }
}
