// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! In-process store

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use super::{diff_changes, ConfigStore, StoreChange, CHANGE_CHANNEL_CAPACITY};
use crate::error::Result;

/// Store kept in memory; clones share data and notifications
#[derive(Clone)]
pub struct MemoryStore {
    data: Arc<RwLock<Map<String, Value>>>,
    changes: broadcast::Sender<StoreChange>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            data: Arc::new(RwLock::new(Map::new())),
            changes,
        }
    }

    /// Create a store pre-populated with `items`
    pub fn with_items(items: Map<String, Value>) -> Self {
        let store = Self::new();
        *store.data.write() = items;
        store
    }

    fn publish(&self, changes: Vec<StoreChange>) {
        for change in changes {
            // No subscribers is fine
            let _ = self.changes.send(change);
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>> {
        let data = self.data.read();
        Ok(keys
            .iter()
            .filter_map(|k| data.get(*k).map(|v| (k.to_string(), v.clone())))
            .collect())
    }

    async fn set(&self, items: Map<String, Value>) -> Result<()> {
        let changes = {
            let mut data = self.data.write();
            let before = data.clone();
            let keys: Vec<String> = items.keys().cloned().collect();
            data.extend(items);
            diff_changes(&before, &data, keys)
        };
        self.publish(changes);
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<()> {
        let changes = {
            let mut data = self.data.write();
            let before = data.clone();
            for key in keys {
                data.remove(*key);
            }
            diff_changes(&before, &data, keys.iter().map(|k| k.to_string()))
        };
        self.publish(changes);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn items(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_get_omits_absent_keys() {
        let store = MemoryStore::with_items(items(&[("interceptionDisabled", json!(true))]));
        let got = store
            .get(&["interceptionDisabled", "domainMap"])
            .await
            .unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got["interceptionDisabled"], json!(true));
    }

    #[tokio::test]
    async fn test_changes_reach_other_handles() {
        let store = MemoryStore::new();
        let other = store.clone();
        let mut rx = other.subscribe();

        store
            .set(items(&[("interceptionDisabled", json!(true))]))
            .await
            .unwrap();
        let change = rx.recv().await.unwrap();
        assert_eq!(change.key, "interceptionDisabled");
        assert_eq!(change.old_value, None);

        store.remove(&["interceptionDisabled"]).await.unwrap();
        let change = rx.recv().await.unwrap();
        assert_eq!(change.new_value, None);
    }

    #[tokio::test]
    async fn test_identical_write_is_silent() {
        let store = MemoryStore::with_items(items(&[("domainMap", json!([]))]));
        let mut rx = store.subscribe();
        store.set(items(&[("domainMap", json!([]))])).await.unwrap();
        assert!(rx.try_recv().is_err());
    }
}
