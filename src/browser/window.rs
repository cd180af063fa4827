// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Window state shared by every execution context on a page

use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use url::Url;

use crate::dom::{Document, Element};

/// Blocking dialog raised by a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub kind: DialogKind,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Alert,
}

/// Sees every document before it becomes current
pub trait DocumentObserver: Send + Sync {
    fn document_replaced(&self, document: &Document);
}

/// Current document plus dialog log; clones share state
#[derive(Clone, Default)]
pub struct Window {
    document: Arc<RwLock<Option<Document>>>,
    dialogs: Arc<RwLock<Vec<Dialog>>>,
    observers: Arc<RwLock<Vec<Weak<dyn DocumentObserver>>>>,
}

impl Window {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current document
    pub fn document(&self) -> Option<Document> {
        self.document.read().clone()
    }

    /// Replace the current document
    ///
    /// Observers run first, so nothing reads the new document before
    /// they have seen it.
    pub fn set_document(&self, document: Document) {
        let observers: Vec<_> = {
            let mut observers = self.observers.write();
            observers.retain(|o| o.strong_count() > 0);
            observers.iter().filter_map(Weak::upgrade).collect()
        };
        for observer in &observers {
            observer.document_replaced(&document);
        }
        *self.document.write() = Some(document);
    }

    /// Register an observer for as long as the caller keeps it alive
    pub fn observe_documents(&self, observer: &Arc<dyn DocumentObserver>) {
        self.observers.write().push(Arc::downgrade(observer));
    }

    /// URL of the current document
    pub fn location(&self) -> Option<Url> {
        self.document.read().as_ref().and_then(|d| d.url.clone())
    }

    /// Root `<html>` element of the current document
    pub fn document_element(&self) -> Option<Element> {
        self.document.read().as_ref()?.document_element()
    }

    /// Raise a blocking alert
    pub fn alert(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%message, "Alert");
        self.dialogs.write().push(Dialog {
            kind: DialogKind::Alert,
            message,
            raised_at: Utc::now(),
        });
    }

    /// Dialogs raised so far
    pub fn dialogs(&self) -> Vec<Dialog> {
        self.dialogs.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html_with_url;

    #[test]
    fn test_alert_recorded() {
        let window = Window::new();
        window.alert("No domain mapping found for portal.example.com");
        let dialogs = window.dialogs();
        assert_eq!(dialogs.len(), 1);
        assert_eq!(dialogs[0].kind, DialogKind::Alert);
    }

    #[test]
    fn test_clones_share_document() {
        let window = Window::new();
        let agent_view = window.clone();
        assert!(agent_view.location().is_none());

        let url = Url::parse("https://idp.example.com/").unwrap();
        window.set_document(parse_html_with_url("<p>hi</p>", Some(url.clone())).unwrap());
        assert_eq!(agent_view.location(), Some(url));
        assert!(agent_view.document_element().is_some());
    }

    struct Stamp;

    impl DocumentObserver for Stamp {
        fn document_replaced(&self, document: &Document) {
            if let Some(root) = document.document_element() {
                root.set_attribute("data-seen", "1");
            }
        }
    }

    #[test]
    fn test_observer_sees_document_until_dropped() {
        let window = Window::new();
        let observer: Arc<dyn DocumentObserver> = Arc::new(Stamp);
        window.observe_documents(&observer);

        window.set_document(parse_html_with_url("<p>one</p>", None).unwrap());
        assert!(window.document_element().unwrap().has_attribute("data-seen"));

        drop(observer);
        window.set_document(parse_html_with_url("<p>two</p>", None).unwrap());
        assert!(!window.document_element().unwrap().has_attribute("data-seen"));
    }
}
