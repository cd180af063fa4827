// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Page implementation

use std::sync::Arc;

use parking_lot::RwLock;
use url::Url;

use super::config::RelayConfig;
use super::form::Form;
use super::submit::{
    FormSubmit, ListenerPhase, NativeSubmit, SubmitEvent, SubmitListener, SubmitOutcome,
};
use super::window::{Dialog, Window};
use crate::dom::{parse_html_with_url, Document, Element};
use crate::error::{Error, Result};
use crate::http::{Request, Response};
use crate::network::{EventType, NetworkInterceptor};

/// Initiator recorded for requests the page itself makes
pub const PAGE_INITIATOR: &str = "page";

/// A browser page
pub struct Page {
    /// Page ID
    id: String,
    /// Relay configuration
    config: RelayConfig,
    /// Network interceptor
    network: NetworkInterceptor,
    /// Document and dialogs
    window: Window,
    /// Unhooked submission algorithm
    native: Arc<NativeSubmit>,
    /// Replacement for the programmatic `form.submit()`
    submit_hook: RwLock<Option<Arc<dyn FormSubmit>>>,
    /// Document-level submit listeners in registration order
    listeners: RwLock<Vec<(ListenerPhase, Arc<dyn SubmitListener>)>>,
    /// Navigation history
    history: RwLock<Vec<String>>,
}

impl Page {
    /// Create a new page
    pub(crate) fn new(id: String, config: RelayConfig, network: NetworkInterceptor) -> Self {
        let window = Window::new();
        let native = Arc::new(NativeSubmit::new(
            network.clone(),
            window.clone(),
            config.timeout,
            PAGE_INITIATOR,
        ));

        Self {
            id,
            config,
            network,
            window,
            native,
            submit_hook: RwLock::new(None),
            listeners: RwLock::new(Vec::new()),
            history: RwLock::new(Vec::new()),
        }
    }

    /// Get page ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Navigate to a URL
    pub async fn navigate(&self, url: &str) -> Result<Response> {
        let request = Request::get(url)?.timeout(self.config.timeout);
        let response = self
            .network
            .execute(request, EventType::Navigation, PAGE_INITIATOR)
            .await?;

        self.history.write().push(response.url.to_string());

        if response.is_html() {
            let document =
                parse_html_with_url(&response.text_lossy(), Some(response.url.clone()))?;
            self.window.set_document(document);
        } else {
            tracing::warn!(url = %response.url, "Navigation response is not HTML");
        }

        Ok(response)
    }

    /// Load markup as if it had been served from `url`
    pub fn load_html(&self, html: &str, url: &str) -> Result<()> {
        let url = Url::parse(url)?;
        self.history.write().push(url.to_string());
        self.window
            .set_document(parse_html_with_url(html, Some(url))?);
        Ok(())
    }

    /// Get current URL
    pub fn url(&self) -> Option<String> {
        self.window.location().map(|u| u.to_string())
    }

    /// Get current document
    pub fn document(&self) -> Option<Document> {
        self.window.document()
    }

    /// Window shared with every context attached to this page
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Get page title
    pub fn title(&self) -> Option<String> {
        self.document().map(|d| d.title())
    }

    /// Get page content (HTML)
    pub fn content(&self) -> Option<String> {
        self.document().map(|d| d.outer_html())
    }

    /// Get all forms on the page
    pub fn forms(&self) -> Vec<Form> {
        self.document()
            .map(|d| d.forms().iter().map(Form::from_element).collect())
            .unwrap_or_default()
    }

    /// Get element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<Element> {
        self.document()?.get_element_by_id(id)
    }

    /// Fill a form field
    pub fn fill(&self, id: &str, value: &str) -> Result<()> {
        let element = self
            .get_element_by_id(id)
            .ok_or_else(|| Error::dom(format!("Element not found: #{}", id)))?;
        element.set_value(value);
        Ok(())
    }

    /// Unhooked submission capability for another execution context
    pub fn native_submitter(&self, initiator: &str) -> Arc<dyn FormSubmit> {
        Arc::new(self.native.for_initiator(initiator))
    }

    /// Whatever `form.submit()` currently resolves to
    pub fn submit_capability(&self) -> Arc<dyn FormSubmit> {
        self.submit_hook
            .read()
            .clone()
            .unwrap_or_else(|| self.native.clone() as Arc<dyn FormSubmit>)
    }

    pub fn has_submit_hook(&self) -> bool {
        self.submit_hook.read().is_some()
    }

    /// Replace the programmatic submit path
    pub fn install_submit_hook(&self, hook: Arc<dyn FormSubmit>) {
        *self.submit_hook.write() = Some(hook);
    }

    /// Register a document-level submit listener
    pub fn add_submit_listener(&self, phase: ListenerPhase, listener: Arc<dyn SubmitListener>) {
        self.listeners.write().push((phase, listener));
    }

    /// Programmatic `form.submit()`: no submit event, goes through the hook
    pub async fn submit_form(&self, form: &Element) -> Result<SubmitOutcome> {
        let capability = self.submit_capability();
        capability.submit(form).await
    }

    /// User-initiated submission: fire the event, then run the default action
    pub async fn dispatch_submit(&self, form: &Element) -> Result<SubmitOutcome> {
        let mut event = SubmitEvent::new(Some(form.clone()));
        self.fire_submit_event(&mut event);

        if event.is_default_prevented() {
            return Ok(SubmitOutcome::Suppressed);
        }
        self.native.submit(form).await
    }

    /// Deliver an event to capture listeners, then bubble listeners
    pub fn fire_submit_event(&self, event: &mut SubmitEvent) {
        let listeners = self.listeners.read().clone();
        for phase in [ListenerPhase::Capture, ListenerPhase::Bubble] {
            if event.is_propagation_stopped() {
                break;
            }
            for (_, listener) in listeners.iter().filter(|(p, _)| *p == phase) {
                listener.handle_event(event);
                if event.is_immediate_propagation_stopped() {
                    return;
                }
            }
        }
    }

    /// Dialogs raised on this page
    pub fn dialogs(&self) -> Vec<Dialog> {
        self.window.dialogs()
    }

    /// Get navigation history
    pub fn navigation_history(&self) -> Vec<String> {
        self.history.read().clone()
    }

    /// Get network interceptor
    pub fn network(&self) -> &NetworkInterceptor {
        &self.network
    }

    /// Get page configuration
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpClient;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn page() -> Page {
        let network = NetworkInterceptor::new(HttpClient::new().unwrap());
        Page::new("test".to_string(), RelayConfig::default(), network)
    }

    struct Counting {
        calls: AtomicUsize,
        prevent: bool,
    }

    impl SubmitListener for Counting {
        fn handle_event(&self, event: &mut SubmitEvent) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.prevent {
                event.prevent_default();
                event.stop_immediate_propagation();
            }
        }
    }

    #[test]
    fn test_page_creation() {
        let page = page();
        assert_eq!(page.id(), "test");
        assert!(page.document().is_none());
        assert!(!page.has_submit_hook());
    }

    #[test]
    fn test_load_html() {
        let page = page();
        page.load_html(
            "<title>Sign in</title><form id='f'><input id='u' name='user'></form>",
            "https://idp.example.com/login",
        )
        .unwrap();

        assert_eq!(page.title().as_deref(), Some("Sign in"));
        assert_eq!(page.url().as_deref(), Some("https://idp.example.com/login"));
        assert_eq!(page.navigation_history(), vec!["https://idp.example.com/login"]);
        page.fill("u", "alice").unwrap();
        assert_eq!(page.forms()[0].data(), vec![("user".to_string(), "alice".to_string())]);
        assert!(page.fill("missing", "x").is_err());
    }

    #[tokio::test]
    async fn test_prevented_event_suppresses_default() {
        let page = page();
        page.load_html("<form id='f' action='/cb'></form>", "https://idp.example.com/")
            .unwrap();

        let first = Arc::new(Counting {
            calls: AtomicUsize::new(0),
            prevent: true,
        });
        let later = Arc::new(Counting {
            calls: AtomicUsize::new(0),
            prevent: false,
        });
        page.add_submit_listener(ListenerPhase::Bubble, later.clone());
        page.add_submit_listener(ListenerPhase::Capture, first.clone());

        let form = page.get_element_by_id("f").unwrap();
        let outcome = page.dispatch_submit(&form).await.unwrap();

        assert!(outcome.is_suppressed());
        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(later.calls.load(Ordering::SeqCst), 0);
        assert_eq!(page.network().event_count(), 0);
    }

    struct Stopping;

    impl SubmitListener for Stopping {
        fn handle_event(&self, event: &mut SubmitEvent) {
            event.stop_propagation();
        }
    }

    #[test]
    fn test_stop_propagation_finishes_current_phase() {
        let page = page();
        let sibling = Arc::new(Counting {
            calls: AtomicUsize::new(0),
            prevent: false,
        });
        let bubble = Arc::new(Counting {
            calls: AtomicUsize::new(0),
            prevent: false,
        });
        page.add_submit_listener(ListenerPhase::Capture, Arc::new(Stopping));
        page.add_submit_listener(ListenerPhase::Capture, sibling.clone());
        page.add_submit_listener(ListenerPhase::Bubble, bubble.clone());

        let mut event = SubmitEvent::new(None);
        page.fire_submit_event(&mut event);

        assert!(!event.is_default_prevented());
        assert_eq!(sibling.calls.load(Ordering::SeqCst), 1);
        assert_eq!(bubble.calls.load(Ordering::SeqCst), 0);
    }
}
