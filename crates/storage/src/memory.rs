//! In-process object store.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::ObjectStore;

#[derive(Debug, Clone)]
struct StoredBlob {
    data: Vec<u8>,
    content_type: Option<String>,
}

/// Keeps objects in a map. Presigned URLs use a `memory://` scheme.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, StoredBlob>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.read().get(key).map(|blob| blob.data.clone())
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        self.read().get(key).and_then(|blob| blob.content_type.clone())
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, StoredBlob>> {
        self.objects.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, StoredBlob>> {
        self.objects.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn ensure_bucket(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        self.write().insert(
            key.to_string(),
            StoredBlob {
                data,
                content_type: content_type.map(str::to_string),
            },
        );
        Ok(())
    }

    async fn presigned_get(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        Ok(format!("memory://{key}?expires_in={}", expires_in.as_secs()))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.write().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_delete() {
        let store = MemoryObjectStore::new();
        store
            .put("1/2025-01/x_a.txt", b"hello".to_vec(), Some("text/plain"))
            .await
            .unwrap();
        assert_eq!(store.get("1/2025-01/x_a.txt").as_deref(), Some(&b"hello"[..]));
        assert_eq!(store.content_type("1/2025-01/x_a.txt").as_deref(), Some("text/plain"));

        store.delete("1/2025-01/x_a.txt").await.unwrap();
        assert!(store.is_empty());

        // Deleting twice is fine.
        store.delete("1/2025-01/x_a.txt").await.unwrap();
    }

    #[tokio::test]
    async fn presigned_url_carries_key_and_expiry() {
        let store = MemoryObjectStore::new();
        let url = store
            .presigned_get("7/k", Duration::from_secs(3600))
            .await
            .unwrap();
        assert_eq!(url, "memory://7/k?expires_in=3600");
    }
}
