// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Mirrors the stored kill-switch onto the page

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::browser::{DocumentObserver, Window};
use crate::dom::{Document, Element};
use crate::store::{Settings, StoreChange, INTERCEPTION_DISABLED_KEY};

/// Last mirrored flag; stamps it onto every incoming document
struct Marker {
    attribute: String,
    disabled: AtomicBool,
}

impl Marker {
    fn write(&self, root: &Element) {
        if self.disabled.load(Ordering::SeqCst) {
            root.set_attribute(self.attribute.as_str(), "true");
        } else {
            root.remove_attribute(&self.attribute);
        }
    }
}

impl DocumentObserver for Marker {
    fn document_replaced(&self, document: &Document) {
        if let Some(root) = document.document_element() {
            self.write(&root);
        }
    }
}

/// Keeps the marker attribute in step with `interceptionDisabled`
///
/// The marker follows the page across navigations for as long as any
/// clone of the mirror is alive.
#[derive(Clone)]
pub struct InterceptionMirror {
    window: Window,
    settings: Settings,
    marker: Arc<Marker>,
}

impl InterceptionMirror {
    pub fn new(window: Window, settings: Settings, marker_attribute: impl Into<String>) -> Self {
        let marker = Arc::new(Marker {
            attribute: marker_attribute.into(),
            disabled: AtomicBool::new(false),
        });
        let observer: Arc<dyn DocumentObserver> = marker.clone();
        window.observe_documents(&observer);

        Self {
            window,
            settings,
            marker,
        }
    }

    /// Set or clear the marker on the current and every later document
    pub fn apply(&self, disabled: bool) {
        self.marker.disabled.store(disabled, Ordering::SeqCst);
        let Some(root) = self.window.document_element() else {
            debug!("No document element to mirror onto");
            return;
        };
        self.marker.write(&root);
        debug!(disabled, "Interception marker mirrored");
    }

    /// Re-read the flag and apply it; returns the applied value
    pub async fn sync(&self) -> bool {
        let disabled = self.settings.interception_disabled_or_default().await;
        self.apply(disabled);
        disabled
    }

    /// Follow store changes until the store goes away
    ///
    /// `changes` should be subscribed before the initial `sync` so that no
    /// update can slip between the two.
    pub fn spawn(self, mut changes: broadcast::Receiver<StoreChange>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(change) if change.key == INTERCEPTION_DISABLED_KEY => {
                        self.sync().await;
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Missed store changes, resyncing marker");
                        self.sync().await;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}
