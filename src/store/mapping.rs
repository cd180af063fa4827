// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Domain mapping entries

use serde::{Deserialize, Serialize};

/// Redirect rule from a production host to a development target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainMapping {
    /// Hostname matched exactly against the intercepted action's host
    pub source: String,
    /// Host, host:port, host/path or full URL
    pub target: String,
}

impl DomainMapping {
    /// Create a mapping
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Ordered list of mappings with at most one entry per source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainMap(Vec<DomainMapping>);

impl DomainMap {
    /// Empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// First mapping whose source equals `host`
    pub fn lookup(&self, host: &str) -> Option<&DomainMapping> {
        self.0.iter().find(|m| m.source == host)
    }

    /// Drop any entry for the same source, then append
    pub fn upsert(&mut self, mapping: DomainMapping) {
        self.0.retain(|m| m.source != mapping.source);
        self.0.push(mapping);
    }

    /// Drop every entry for `source`; returns whether anything was removed
    pub fn remove(&mut self, source: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|m| m.source != source);
        self.0.len() != before
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DomainMapping> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[DomainMapping] {
        &self.0
    }
}

impl From<Vec<DomainMapping>> for DomainMap {
    fn from(entries: Vec<DomainMapping>) -> Self {
        let mut map = DomainMap::new();
        for entry in entries {
            map.upsert(entry);
        }
        map
    }
}

impl IntoIterator for DomainMap {
    type Item = DomainMapping;
    type IntoIter = std::vec::IntoIter<DomainMapping>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_moves_entry_to_end() {
        let mut map = DomainMap::new();
        map.upsert(DomainMapping::new("a.example.com", "localhost:3000"));
        map.upsert(DomainMapping::new("b.example.com", "localhost:4000"));
        map.upsert(DomainMapping::new("a.example.com", "localhost:5000"));

        let sources: Vec<&str> = map.iter().map(|m| m.source.as_str()).collect();
        assert_eq!(sources, vec!["b.example.com", "a.example.com"]);
        assert_eq!(map.as_slice()[1].target, "localhost:5000");
    }

    #[test]
    fn test_lookup_is_exact() {
        let map = DomainMap::from(vec![DomainMapping::new("portal.example.com", "localhost:3000")]);
        assert!(map.lookup("portal.example.com").is_some());
        assert!(map.lookup("sub.portal.example.com").is_none());
        assert!(map.lookup("example.com").is_none());
    }

    #[test]
    fn test_remove_unknown_source() {
        let mut map = DomainMap::from(vec![DomainMapping::new("a", "b")]);
        assert!(!map.remove("c"));
        assert!(map.remove("a"));
        assert!(map.is_empty());
    }

    #[test]
    fn test_wire_shape() {
        let map = DomainMap::from(vec![DomainMapping::new("portal.example.com", "app.test")]);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"[{"source":"portal.example.com","target":"app.test"}]"#);
    }
}
