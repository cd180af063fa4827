// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Typed view over the raw store

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tracing::warn;

use super::{
    ConfigStore, DomainMap, DomainMapping, StoreChange, DOMAIN_MAP_KEY,
    INTERCEPTION_DISABLED_KEY, LAST_AUTHORIZE_DATA_KEY, LAST_OAUTH_CALLBACK_KEY,
};
use crate::error::{ErrorContext, Result};

/// Callback parameters kept for display after a successful relay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuthCallbackRecord {
    pub code: Option<String>,
    pub id_token: Option<String>,
    pub state: Option<String>,
    pub scope: Option<String>,
    pub session_state: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl OAuthCallbackRecord {
    /// Pick the callback parameters out of captured fields
    pub fn from_fields<'a, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut record = Self {
            code: None,
            id_token: None,
            state: None,
            scope: None,
            session_state: None,
            timestamp: Utc::now(),
        };
        for (name, value) in fields {
            let slot = match name {
                "code" => &mut record.code,
                "id_token" => &mut record.id_token,
                "state" => &mut record.state,
                "scope" => &mut record.scope,
                "session_state" => &mut record.session_state,
                _ => continue,
            };
            *slot = Some(value.to_string());
        }
        record
    }
}

/// Typed accessors for every key the relay uses
#[derive(Clone)]
pub struct Settings {
    store: Arc<dyn ConfigStore>,
}

impl Settings {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    /// Underlying store handle
    pub fn store(&self) -> &Arc<dyn ConfigStore> {
        &self.store
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.store.subscribe()
    }

    async fn read<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let mut values = self.store.get(&[key]).await.store_context(key)?;
        match values.remove(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value).store_context(key).map(Some),
        }
    }

    async fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let mut items = Map::new();
        items.insert(key.to_string(), serde_json::to_value(value)?);
        self.store.set(items).await.store_context(key)
    }

    /// Current domain map; missing key reads as empty
    pub async fn domain_map(&self) -> Result<DomainMap> {
        Ok(self.read(DOMAIN_MAP_KEY).await?.unwrap_or_default())
    }

    /// Domain map, with store failures logged and treated as empty
    pub async fn domain_map_or_empty(&self) -> DomainMap {
        self.domain_map().await.unwrap_or_else(|e| {
            warn!(error = %e, "Could not read domain map, treating as empty");
            DomainMap::new()
        })
    }

    /// Insert or replace the mapping for its source
    pub async fn add_mapping(&self, mapping: DomainMapping) -> Result<DomainMap> {
        let mut map = self.domain_map().await?;
        map.upsert(mapping);
        self.write(DOMAIN_MAP_KEY, &map).await?;
        Ok(map)
    }

    /// Remove every mapping for `source`
    pub async fn remove_mapping(&self, source: &str) -> Result<DomainMap> {
        let mut map = self.domain_map().await?;
        if map.remove(source) {
            self.write(DOMAIN_MAP_KEY, &map).await?;
        }
        Ok(map)
    }

    /// Kill-switch state; absent means enabled
    pub async fn interception_disabled(&self) -> Result<bool> {
        Ok(self
            .read(INTERCEPTION_DISABLED_KEY)
            .await?
            .unwrap_or(false))
    }

    /// Kill-switch state, with store failures logged and read as enabled
    pub async fn interception_disabled_or_default(&self) -> bool {
        self.interception_disabled().await.unwrap_or_else(|e| {
            warn!(error = %e, "Could not read interception state, assuming enabled");
            false
        })
    }

    pub async fn set_interception_disabled(&self, disabled: bool) -> Result<()> {
        self.write(INTERCEPTION_DISABLED_KEY, &disabled).await
    }

    pub async fn last_callback(&self) -> Result<Option<OAuthCallbackRecord>> {
        self.read(LAST_OAUTH_CALLBACK_KEY).await
    }

    pub async fn record_callback(&self, record: &OAuthCallbackRecord) -> Result<()> {
        self.write(LAST_OAUTH_CALLBACK_KEY, record).await
    }

    pub async fn last_authorize_data(&self) -> Result<Option<Value>> {
        self.read(LAST_AUTHORIZE_DATA_KEY).await
    }

    pub async fn record_authorize_data(&self, data: &Value) -> Result<()> {
        self.write(LAST_AUTHORIZE_DATA_KEY, data).await
    }
}
