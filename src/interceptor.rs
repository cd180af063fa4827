// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Page world callback interceptor
//!
//! Sits in front of both submission paths of a page. A form holding
//! `code` and `state` inputs is captured and handed to the agent instead
//! of being sent, unless the disable marker is on the document element.
//! Nothing here talks to the store; the marker attribute is the only
//! input from the agent side.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::bridge::{EventBridge, InterceptedSubmission};
use crate::browser::form::{extract_input_fields, is_callback_form, resolve_form_action};
use crate::browser::{
    FormSubmit, ListenerPhase, Page, SubmitEvent, SubmitListener, SubmitOutcome, Window,
};
use crate::dom::Element;
use crate::error::{Error, Result};

/// Intercepts OAuth callback submissions on one page
pub struct CallbackInterceptor {
    window: Window,
    bridge: EventBridge,
    original: Arc<dyn FormSubmit>,
    marker_attribute: String,
}

impl CallbackInterceptor {
    /// Hook both submission paths of `page`
    ///
    /// Fails if the page already carries a submit hook.
    pub fn install(page: &Page, bridge: EventBridge) -> Result<Arc<Self>> {
        if page.has_submit_hook() {
            return Err(Error::dom("submit hook already installed on this page"));
        }

        let interceptor = Arc::new(Self {
            window: page.window().clone(),
            bridge,
            original: page.submit_capability(),
            marker_attribute: page.config().marker_attribute.clone(),
        });

        page.install_submit_hook(interceptor.clone());
        page.add_submit_listener(ListenerPhase::Capture, interceptor.clone());
        info!(page = page.id(), "OAuth callback interception installed");

        Ok(interceptor)
    }

    /// Marker attribute present on the document element
    pub fn interception_disabled(&self) -> bool {
        self.window
            .document_element()
            .map(|root| root.has_attribute(&self.marker_attribute))
            .unwrap_or(false)
    }

    fn capture(&self, form: &Element) -> InterceptedSubmission {
        let form_data = extract_input_fields(form);
        let original_action = match resolve_form_action(form, self.window.location().as_ref()) {
            Ok(url) => url.to_string(),
            // Agent logs the parse failure and aborts
            Err(_) => form.get_attribute("action").unwrap_or_default(),
        };
        debug!(
            fields = ?form_data.names().collect::<Vec<_>>(),
            action = %original_action,
            "Captured callback form"
        );
        InterceptedSubmission {
            form_data,
            original_action,
        }
    }

    fn dispatch(&self, form: &Element) {
        let submission = self.capture(form);
        if let Err(e) = self.bridge.dispatch(&submission) {
            error!(error = %e, "Could not hand off intercepted submission");
        }
    }
}

#[async_trait]
impl FormSubmit for CallbackInterceptor {
    async fn submit(&self, form: &Element) -> Result<SubmitOutcome> {
        if is_callback_form(form) && !self.interception_disabled() {
            info!("Intercepted programmatic callback submission");
            self.dispatch(form);
            return Ok(SubmitOutcome::Suppressed);
        }
        self.original.submit(form).await
    }
}

impl SubmitListener for CallbackInterceptor {
    fn handle_event(&self, event: &mut SubmitEvent) {
        let Some(form) = event.target_form().cloned() else {
            return;
        };
        if !is_callback_form(&form) || self.interception_disabled() {
            return;
        }

        event.prevent_default();
        event.stop_immediate_propagation();
        info!("Intercepted callback submit event");
        self.dispatch(&form);
    }
}
