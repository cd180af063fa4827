// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Extension-wide configuration store
//!
//! A string-keyed store of JSON values shared by every page. Both
//! execution contexts receive a handle at construction; there is no
//! ambient global. Readers always re-fetch, writes are last-write-wins.

mod file;
mod mapping;
mod memory;
mod settings;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::error::Result;

pub use file::JsonFileStore;
pub use mapping::{DomainMap, DomainMapping};
pub use memory::MemoryStore;
pub use settings::{OAuthCallbackRecord, Settings};

/// Ordered list of `{source, target}` entries
pub const DOMAIN_MAP_KEY: &str = "domainMap";
/// Master kill-switch; absent means interception is on
pub const INTERCEPTION_DISABLED_KEY: &str = "interceptionDisabled";
/// Last captured callback, informational only
pub const LAST_OAUTH_CALLBACK_KEY: &str = "lastOAuthCallback";
/// Last authorize-request form seen, informational only
pub const LAST_AUTHORIZE_DATA_KEY: &str = "lastAuthorizeData";

/// Capacity of the change-notification channel
pub(crate) const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// A single key changed value
#[derive(Debug, Clone, PartialEq)]
pub struct StoreChange {
    pub key: String,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

/// Key-value store contract
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Fetch the given keys; absent keys are omitted from the result
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>>;

    /// Write all items in one round trip
    async fn set(&self, items: Map<String, Value>) -> Result<()>;

    /// Delete keys; missing keys are ignored
    async fn remove(&self, keys: &[&str]) -> Result<()>;

    /// Subscribe to change notifications from every handle on this store
    fn subscribe(&self) -> broadcast::Receiver<StoreChange>;
}

/// Compute change notifications between two snapshots for `keys`
pub(crate) fn diff_changes(
    before: &Map<String, Value>,
    after: &Map<String, Value>,
    keys: impl IntoIterator<Item = String>,
) -> Vec<StoreChange> {
    keys.into_iter()
        .filter_map(|key| {
            let old_value = before.get(&key).cloned();
            let new_value = after.get(&key).cloned();
            (old_value != new_value).then_some(StoreChange {
                key,
                old_value,
                new_value,
            })
        })
        .collect()
}
