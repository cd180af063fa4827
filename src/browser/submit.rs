// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Form submission capabilities and submit events

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::form::{resolve_form_action, Form};
use super::window::Window;
use crate::dom::{parse_html_with_url, Element};
use crate::error::Result;
use crate::http::{Request, Response};
use crate::network::{EventType, NetworkInterceptor};

/// Result of asking a capability to submit a form
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Request went out; the page navigated to the response if it was HTML
    Sent(Response),
    /// Submission was swallowed before reaching the network
    Suppressed,
}

impl SubmitOutcome {
    pub fn is_suppressed(&self) -> bool {
        matches!(self, SubmitOutcome::Suppressed)
    }

    pub fn response(&self) -> Option<&Response> {
        match self {
            SubmitOutcome::Sent(response) => Some(response),
            SubmitOutcome::Suppressed => None,
        }
    }
}

/// Something that can submit a form element
#[async_trait]
pub trait FormSubmit: Send + Sync {
    async fn submit(&self, form: &Element) -> Result<SubmitOutcome>;
}

/// The browser's own submission algorithm
///
/// Never hooked: every context that needs an unconditional submit holds
/// one of these.
#[derive(Clone)]
pub struct NativeSubmit {
    network: NetworkInterceptor,
    window: Window,
    timeout: Duration,
    initiator: String,
}

impl NativeSubmit {
    pub fn new(
        network: NetworkInterceptor,
        window: Window,
        timeout: Duration,
        initiator: impl Into<String>,
    ) -> Self {
        Self {
            network,
            window,
            timeout,
            initiator: initiator.into(),
        }
    }

    /// Same capability, recorded under another initiator
    pub fn for_initiator(&self, initiator: impl Into<String>) -> Self {
        Self {
            initiator: initiator.into(),
            ..self.clone()
        }
    }

    fn navigate_to(&self, response: &Response) {
        if !response.is_html() {
            return;
        }
        match parse_html_with_url(&response.text_lossy(), Some(response.url.clone())) {
            Ok(document) => self.window.set_document(document),
            Err(e) => warn!(url = %response.url, error = %e, "Could not parse submission response"),
        }
    }
}

#[async_trait]
impl FormSubmit for NativeSubmit {
    async fn submit(&self, form: &Element) -> Result<SubmitOutcome> {
        let base = self.window.location();
        let action = resolve_form_action(form, base.as_ref())?;
        let snapshot = Form::from_element(form);
        let data = snapshot.data();
        let pairs = data.iter().map(|(n, v)| (n.as_str(), v.as_str()));

        let request = if snapshot.is_post() {
            Request::post(action.as_str())?.form(pairs)
        } else {
            let mut url = action;
            url.query_pairs_mut().clear().extend_pairs(pairs);
            Request::get(url.as_str())?
        };
        let request = request.timeout(self.timeout);

        debug!(
            method = %snapshot.method,
            fields = data.len(),
            initiator = %self.initiator,
            "Native form submission"
        );

        let response = self
            .network
            .execute(request, EventType::FormSubmission, &self.initiator)
            .await?;
        self.navigate_to(&response);
        Ok(SubmitOutcome::Sent(response))
    }
}

/// A `submit` event travelling to listeners
#[derive(Debug, Clone)]
pub struct SubmitEvent {
    target: Option<Element>,
    default_prevented: bool,
    propagation_stopped: bool,
    immediate_propagation_stopped: bool,
}

impl SubmitEvent {
    pub fn new(target: Option<Element>) -> Self {
        Self {
            target,
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
        }
    }

    /// Form the event targets, if it is one
    pub fn target_form(&self) -> Option<&Element> {
        self.target.as_ref().filter(|t| t.is_tag("form"))
    }

    pub fn target(&self) -> Option<&Element> {
        self.target.as_ref()
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_propagation_stopped = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    pub fn is_immediate_propagation_stopped(&self) -> bool {
        self.immediate_propagation_stopped
    }
}

/// Listener phase on the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerPhase {
    Capture,
    Bubble,
}

/// Synchronous submit-event listener
pub trait SubmitListener: Send + Sync {
    fn handle_event(&self, event: &mut SubmitEvent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    #[test]
    fn test_event_flags() {
        let doc = parse_html("<form id='f'></form><div id='d'></div>").unwrap();
        let mut event = SubmitEvent::new(doc.get_element_by_id("f"));
        assert!(event.target_form().is_some());

        event.stop_immediate_propagation();
        assert!(event.is_propagation_stopped());
        assert!(!event.is_default_prevented());

        let event = SubmitEvent::new(doc.get_element_by_id("d"));
        assert!(event.target_form().is_none());
        assert!(event.target().is_some());
    }
}
