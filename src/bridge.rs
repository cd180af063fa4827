// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Page world to agent bridge
//!
//! The two execution contexts share a document but nothing else. An
//! intercepted submission crosses over as a serialized JSON envelope,
//! so neither side can hand the other a live object.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Event name carried in every envelope
pub const OAUTH_CALLBACK_INTERCEPTED: &str = "oauthCallbackIntercepted";

/// Field name to value, in first-seen order
///
/// Re-inserting a name overwrites the value but keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap(Vec<(String, String)>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `name`
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = FieldMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FieldMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct FieldMapVisitor;

        impl<'de> Visitor<'de> for FieldMapVisitor {
            type Value = FieldMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of string fields")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<FieldMap, A::Error> {
                let mut fields = FieldMap::new();
                while let Some((name, value)) = access.next_entry::<String, String>()? {
                    fields.insert(name, value);
                }
                Ok(fields)
            }
        }

        deserializer.deserialize_map(FieldMapVisitor)
    }
}

/// Captured callback form, as handed to the agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterceptedSubmission {
    pub form_data: FieldMap,
    /// Absolute action URL as the page resolved it
    pub original_action: String,
}

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "type")]
    event_type: String,
    detail: T,
}

/// Create a connected sender and receiver for `event_name`
pub fn channel(event_name: impl Into<String>) -> (EventBridge, BridgeReceiver) {
    let event_name = event_name.into();
    let (tx, rx) = mpsc::unbounded_channel();
    (
        EventBridge {
            event_name: event_name.clone(),
            tx,
        },
        BridgeReceiver { event_name, rx },
    )
}

/// Page world side of the bridge
#[derive(Clone)]
pub struct EventBridge {
    event_name: String,
    tx: mpsc::UnboundedSender<String>,
}

impl EventBridge {
    /// Serialize and dispatch a submission
    pub fn dispatch(&self, submission: &InterceptedSubmission) -> Result<()> {
        let envelope = Envelope {
            event_type: self.event_name.clone(),
            detail: submission,
        };
        let wire = serde_json::to_string(&envelope)?;
        debug!(event = %self.event_name, bytes = wire.len(), "Bridge dispatch");
        self.tx
            .send(wire)
            .map_err(|_| Error::bridge("no agent is listening"))
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }
}

/// Agent side of the bridge
pub struct BridgeReceiver {
    event_name: String,
    rx: mpsc::UnboundedReceiver<String>,
}

impl BridgeReceiver {
    /// Next submission; `None` once every sender is gone
    ///
    /// Envelopes for other events or with a malformed payload yield an error
    /// and leave the receiver usable.
    pub async fn recv(&mut self) -> Option<Result<InterceptedSubmission>> {
        let wire = self.rx.recv().await?;
        Some(self.decode(&wire))
    }

    /// Next submission if one is already queued
    pub fn try_recv(&mut self) -> Option<Result<InterceptedSubmission>> {
        let wire = self.rx.try_recv().ok()?;
        Some(self.decode(&wire))
    }

    fn decode(&self, wire: &str) -> Result<InterceptedSubmission> {
        let envelope: Envelope<serde_json::Value> = serde_json::from_str(wire)
            .map_err(|e| Error::bridge(format!("malformed envelope: {}", e)))?;
        if envelope.event_type != self.event_name {
            warn!(event = %envelope.event_type, "Ignoring unexpected bridge event");
            return Err(Error::bridge(format!(
                "unexpected event {}",
                envelope.event_type
            )));
        }
        serde_json::from_value(envelope.detail)
            .map_err(|e| Error::bridge(format!("malformed detail: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> InterceptedSubmission {
        let mut form_data = FieldMap::new();
        form_data.insert("code", "abc");
        form_data.insert("state", "xyz");
        InterceptedSubmission {
            form_data,
            original_action: "https://portal.example.com/callback".to_string(),
        }
    }

    #[test]
    fn test_field_map_last_value_first_position() {
        let fields: FieldMap = vec![("code", "1"), ("state", "s"), ("code", "2")]
            .into_iter()
            .collect();
        assert_eq!(fields.names().collect::<Vec<_>>(), vec!["code", "state"]);
        assert_eq!(fields.get("code"), Some("2"));
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_string(&submission()).unwrap();
        assert_eq!(
            json,
            r#"{"formData":{"code":"abc","state":"xyz"},"originalAction":"https://portal.example.com/callback"}"#
        );
    }

    #[tokio::test]
    async fn test_dispatch_and_receive() {
        let (bridge, mut receiver) = channel(OAUTH_CALLBACK_INTERCEPTED);
        bridge.dispatch(&submission()).unwrap();
        let got = receiver.recv().await.unwrap().unwrap();
        assert_eq!(got, submission());
    }

    #[tokio::test]
    async fn test_foreign_event_is_rejected() {
        let (bridge, mut receiver) = channel(OAUTH_CALLBACK_INTERCEPTED);
        bridge
            .tx
            .send(r#"{"type":"somethingElse","detail":{}}"#.to_string())
            .unwrap();
        bridge.dispatch(&submission()).unwrap();

        assert!(receiver.recv().await.unwrap().is_err());
        assert!(receiver.recv().await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_closed_channel() {
        let (bridge, receiver) = channel(OAUTH_CALLBACK_INTERCEPTED);
        drop(receiver);
        assert!(bridge.dispatch(&submission()).is_err());
    }
}
