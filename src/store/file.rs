// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Store persisted as a single JSON object on disk

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::{broadcast, Mutex};
use tracing::debug;

use super::{diff_changes, ConfigStore, StoreChange, CHANGE_CHANNEL_CAPACITY};
use crate::error::{Error, ErrorContext, Result};

/// JSON file store; clones share the write lock and notifications
#[derive(Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
    changes: broadcast::Sender<StoreChange>,
}

impl JsonFileStore {
    /// Open a store at `path`; the file is created on first write
    ///
    /// Each call starts its own change channel. Two handles opened on the
    /// same path share the file but not notifications; clone a handle to
    /// share both.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
            changes,
        }
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Map<String, Value>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(Error::store(self.path.display().to_string(), e.to_string())),
        };

        if raw.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&raw).store_context(&self.path.display().to_string())? {
            Value::Object(map) => Ok(map),
            other => Err(Error::store(
                self.path.display().to_string(),
                format!("expected a JSON object, found {}", type_name(&other)),
            )),
        }
    }

    async fn save(&self, data: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let body = serde_json::to_string_pretty(data)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), keys = data.len(), "Store saved");
        Ok(())
    }

    async fn update<F>(&self, keys: Vec<String>, apply: F) -> Result<()>
    where
        F: FnOnce(&mut Map<String, Value>) + Send,
    {
        let changes = {
            let _guard = self.lock.lock().await;
            let before = self.load().await?;
            let mut after = before.clone();
            apply(&mut after);
            let changes = diff_changes(&before, &after, keys);
            if !changes.is_empty() {
                self.save(&after).await?;
            }
            changes
        };

        for change in changes {
            let _ = self.changes.send(change);
        }
        Ok(())
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl ConfigStore for JsonFileStore {
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>> {
        let data = self.load().await?;
        Ok(keys
            .iter()
            .filter_map(|k| data.get(*k).map(|v| (k.to_string(), v.clone())))
            .collect())
    }

    async fn set(&self, items: Map<String, Value>) -> Result<()> {
        let keys = items.keys().cloned().collect();
        self.update(keys, move |data| data.extend(items)).await
    }

    async fn remove(&self, keys: &[&str]) -> Result<()> {
        let owned: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        let to_remove = owned.clone();
        self.update(owned, move |data| {
            for key in &to_remove {
                data.remove(key);
            }
        })
        .await
    }

    /// Changes written through this handle or its clones. Writes made by
    /// another process or a separate `open` of the same path are not seen.
    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}
