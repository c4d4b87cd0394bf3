//! Process-local storage

use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};
use tokio::sync::RwLock;
use tracing::debug;

use super::{StoreItem, StoreItems, Storage, ANY_ETAG};
use crate::error::{BotError, BotResult};

/// In-memory storage. Contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, StoreItem>>,
    e_tag_counter: AtomicU64,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn next_e_tag(&self) -> String {
        (self.e_tag_counter.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn read(&self, keys: &[String]) -> BotResult<StoreItems> {
        let entries = self.entries.read().await;
        Ok(keys
            .iter()
            .filter_map(|key| entries.get(key).map(|item| (key.clone(), item.clone())))
            .collect())
    }

    async fn write(&self, changes: StoreItems) -> BotResult<()> {
        if changes.is_empty() {
            return Ok(());
        }

        let mut entries = self.entries.write().await;

        // Reject the whole batch before applying any of it
        for (key, change) in &changes {
            let Some(expected) = change.e_tag.as_deref() else {
                continue;
            };
            if expected == ANY_ETAG {
                continue;
            }
            if let Some(existing) = entries.get(key) {
                if existing.e_tag.as_deref() != Some(expected) {
                    return Err(BotError::EtagConflict { key: key.clone() });
                }
            }
        }

        for (key, change) in changes {
            debug!("Writing state for key {}", key);
            entries.insert(
                key,
                StoreItem {
                    value: change.value,
                    e_tag: Some(self.next_e_tag()),
                },
            );
        }

        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> BotResult<()> {
        let mut entries = self.entries.write().await;
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    fn bag(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn changes(key: &str, item: StoreItem) -> StoreItems {
        HashMap::from([(key.to_string(), item)])
    }

    #[tokio::test]
    async fn test_read_missing_key_is_empty() {
        let storage = MemoryStorage::new();
        let items = storage.read(&["nope".to_string()]).await.unwrap();
        assert!(items.is_empty());
        assert!(storage.is_empty().await);
    }

    #[tokio::test]
    async fn test_write_then_read_assigns_etag() {
        let storage = MemoryStorage::new();
        storage
            .write(changes("a", StoreItem::new(bag(json!({"count": 3})))))
            .await
            .unwrap();

        let items = storage.read(&["a".to_string(), "b".to_string()]).await.unwrap();
        assert_eq!(items.len(), 1);
        let item = &items["a"];
        assert_eq!(item.value["count"], 3);
        assert!(item.e_tag.is_some());
    }

    #[tokio::test]
    async fn test_last_write_wins_without_etag() {
        let storage = MemoryStorage::new();
        storage
            .write(changes("a", StoreItem::new(bag(json!({"count": 1})))))
            .await
            .unwrap();
        storage
            .write(changes("a", StoreItem::overwrite(bag(json!({"count": 2})))))
            .await
            .unwrap();

        let items = storage.read(&["a".to_string()]).await.unwrap();
        assert_eq!(items["a"].value["count"], 2);
        assert_eq!(storage.len().await, 1);
    }

    #[tokio::test]
    async fn test_stale_etag_is_rejected() {
        let storage = MemoryStorage::new();
        storage
            .write(changes("a", StoreItem::new(bag(json!({"count": 1})))))
            .await
            .unwrap();
        let first = storage.read(&["a".to_string()]).await.unwrap().remove("a").unwrap();

        // A matching tag goes through and bumps the version
        let mut update = first.clone();
        update.value.insert("count".into(), json!(2));
        storage.write(changes("a", update)).await.unwrap();

        // The original tag is now stale
        let mut stale = first;
        stale.value.insert("count".into(), json!(99));
        let err = storage.write(changes("a", stale)).await.unwrap_err();
        assert!(matches!(err, BotError::EtagConflict { ref key } if key == "a"));

        let items = storage.read(&["a".to_string()]).await.unwrap();
        assert_eq!(items["a"].value["count"], 2);
    }

    #[tokio::test]
    async fn test_delete_ignores_missing_keys() {
        let storage = MemoryStorage::new();
        storage
            .write(changes("a", StoreItem::new(Map::new())))
            .await
            .unwrap();

        storage
            .delete(&["a".to_string(), "missing".to_string()])
            .await
            .unwrap();
        assert!(storage.is_empty().await);
    }
}
