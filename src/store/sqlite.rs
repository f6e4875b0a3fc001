use std::str::FromStr;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tokio::sync::broadcast;

use crate::store::{Store, StoreError};

/// SQLite-backed store: one `kv` table, one JSON document per key.
pub struct SqliteStore {
    pool: SqlitePool,
    notify: broadcast::Sender<String>,
}

async fn create_kv_table(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

impl SqliteStore {
    pub async fn connect(db_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(db_url)?.create_if_missing(true);

        // Single connection: there is exactly one writer in this system,
        // and it also keeps `sqlite::memory:` pointing at one database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        create_kv_table(&pool).await?;

        let (notify, _) = broadcast::channel(64);
        Ok(Self { pool, notify })
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO kv (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        let _ = self.notify.send(key.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM kv WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

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

    async fn open() -> SqliteStore {
        SqliteStore::connect("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let store = open().await;
        assert_eq!(store.get("users").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let store = open().await;
        store.set("users", "[]").await.unwrap();
        assert_eq!(store.get("users").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_set_overwrites_existing_value() {
        let store = open().await;
        store.set("session", r#"{"v":1}"#).await.unwrap();
        store.set("session", r#"{"v":2}"#).await.unwrap();

        assert_eq!(
            store.get("session").await.unwrap().as_deref(),
            Some(r#"{"v":2}"#)
        );
    }

    #[tokio::test]
    async fn test_remove() {
        let store = open().await;
        store.set("session", "{}").await.unwrap();
        store.remove("session").await.unwrap();
        assert_eq!(store.get("session").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_subscribe_sees_writes() {
        let store = open().await;
        let mut changes = store.subscribe();

        store.set("cases", "[]").await.unwrap();
        assert_eq!(changes.recv().await.unwrap(), "cases");
    }
}
