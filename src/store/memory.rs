use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::sync::broadcast;

use crate::store::{Store, StoreError};

/// In-memory store, the substitutable fake for tests. Same observable
/// behavior as the SQLite store, nothing persisted.
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    notify: broadcast::Sender<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (notify, _) = broadcast::channel(64);
        Self {
            entries: Mutex::new(HashMap::new()),
            notify,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().await;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), value.to_string());
        let _ = self.notify.send(key.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        entries.remove(key);
        let _ = self.notify.send(key.to_string());
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<String> {
        self.notify.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = MemoryStore::new();

        assert_eq!(store.get("users").await.unwrap(), None);

        store.set("users", "[]").await.unwrap();
        assert_eq!(store.get("users").await.unwrap().as_deref(), Some("[]"));

        store.remove("users").await.unwrap();
        assert_eq!(store.get("users").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_subscribe_sees_removes() {
        let store = MemoryStore::new();
        let mut changes = store.subscribe();

        store.set("session", "{}").await.unwrap();
        store.remove("session").await.unwrap();

        assert_eq!(changes.recv().await.unwrap(), "session");
        assert_eq!(changes.recv().await.unwrap(), "session");
    }
}
