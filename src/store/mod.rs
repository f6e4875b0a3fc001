pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::broadcast;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("error de almacenamiento: {0}")]
    Backend(#[from] sqlx::Error),
    #[error("registro no serializable: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Key-value persistence behind the whole application. Keys are the
/// well-known record names in [`keys`]; values are JSON documents.
///
/// Injected everywhere as `&dyn Store` so tests can substitute
/// [`memory::MemoryStore`] for the SQLite-backed store.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Change notifications: receives the key of every record written or
    /// removed after the call.
    fn subscribe(&self) -> broadcast::Receiver<String>;
}

pub mod keys {
    pub const USERS: &str = "users";
    pub const SESSION: &str = "session";
    pub const CASES: &str = "cases";

    pub fn case_counter(year: i32) -> String {
        format!("case-counter-{year}")
    }
}

/// Read a JSON record. A missing key or a value that no longer parses
/// both come back as the default; bad persisted data is never an error.
pub async fn read_record<T>(store: &dyn Store, key: &str) -> Result<T, StoreError>
where
    T: DeserializeOwned + Default,
{
    Ok(store
        .get(key)
        .await?
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default())
}

pub async fn write_record<T>(store: &dyn Store, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw).await
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryStore;
    use super::*;
    use crate::models::Case;

    #[tokio::test]
    async fn test_read_record_missing_key_is_default() {
        let store = MemoryStore::new();
        let cases: Vec<Case> = read_record(&store, keys::CASES).await.unwrap();
        assert!(cases.is_empty());
    }

    #[tokio::test]
    async fn test_read_record_malformed_value_is_default() {
        let store = MemoryStore::new();
        store.set(keys::CASES, "{not json at all").await.unwrap();

        let cases: Vec<Case> = read_record(&store, keys::CASES).await.unwrap();
        assert!(cases.is_empty());
    }

    #[tokio::test]
    async fn test_write_then_read_roundtrip() {
        let store = MemoryStore::new();
        write_record(&store, "counter", &7u32).await.unwrap();

        let value: u32 = read_record(&store, "counter").await.unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_case_counter_key_format() {
        assert_eq!(keys::case_counter(2026), "case-counter-2026");
    }
}
