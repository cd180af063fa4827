// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Drives one intercepted submission through the state machine

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::state::{AbortReason, HandlerState, PlannedSubmission};
use crate::bridge::InterceptedSubmission;
use crate::browser::form::build_hidden_form;
use crate::browser::{FormSubmit, SubmitOutcome, Window};
use crate::error::{Error, Result};
use crate::messaging::{Message, MessageBus};
use crate::store::{OAuthCallbackRecord, Settings};

/// How one interception ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// Interception was off; fields went to the original action
    Replayed { action: String, status: Option<u16> },
    /// Fields went to the mapped target
    Submitted { action: String, status: Option<u16> },
    /// Nothing was sent; the user was alerted
    Aborted {
        host: Option<String>,
        reason: AbortReason,
    },
    /// Building or sending the replacement form failed
    Failed { error: String },
}

/// Agent-side handler for intercepted submissions
pub struct InterceptionHandler {
    window: Window,
    settings: Settings,
    native: Arc<dyn FormSubmit>,
    bus: Arc<dyn MessageBus>,
}

impl InterceptionHandler {
    pub fn new(
        window: Window,
        settings: Settings,
        native: Arc<dyn FormSubmit>,
        bus: Arc<dyn MessageBus>,
    ) -> Self {
        Self {
            window,
            settings,
            native,
            bus,
        }
    }

    /// Run one submission to a terminal state and act on it
    pub async fn handle(&self, submission: InterceptedSubmission) -> Result<HandlerOutcome> {
        info!(action = %submission.original_action, "OAuth callback intercepted");
        let mut state = HandlerState::start(submission);

        loop {
            debug!(state = state.name(), "Handler step");
            state = match state {
                s @ HandlerState::CheckingDisabled(_) => {
                    let disabled = self.settings.interception_disabled_or_default().await;
                    s.after_disabled_check(disabled)
                }
                s @ HandlerState::Resolving(_) => {
                    let domain_map = self.settings.domain_map_or_empty().await;
                    s.after_lookup(&domain_map)
                }
                s @ HandlerState::BuildingTarget { .. } => s.build(),
                HandlerState::Replay(plan) => {
                    warn!(action = %plan.action, "Interception disabled, replaying to original action");
                    let outcome = self.submit_plan(&plan).await?;
                    return Ok(HandlerOutcome::Replayed {
                        status: outcome.response().map(|r| r.status_code()),
                        action: plan.action,
                    });
                }
                HandlerState::Submit(plan) => return self.relay(plan).await,
                HandlerState::AbortNoMapping { host, reason } => {
                    self.abort(host.as_deref(), &reason);
                    return Ok(HandlerOutcome::Aborted { host, reason });
                }
            };
        }
    }

    async fn relay(&self, plan: PlannedSubmission) -> Result<HandlerOutcome> {
        info!(target = %plan.action, fields = plan.fields.len(), "Relaying callback");

        self.notify(Message::OAuthCallbackReceived {
            data: OAuthCallbackRecord::from_fields(plan.pairs()),
        })
        .await;

        let outcome = self.submit_plan(&plan).await?;
        let status = outcome.response().map(|r| r.status_code());
        if outcome.response().map_or(false, |r| r.is_success()) {
            self.notify(Message::FormDataSentSuccessfully {
                url: plan.action.clone(),
            })
            .await;
        }

        Ok(HandlerOutcome::Submitted {
            action: plan.action,
            status,
        })
    }

    fn abort(&self, host: Option<&str>, reason: &AbortReason) {
        match reason {
            AbortReason::NoMapping => {}
            AbortReason::MalformedAction(e) => error!(error = %e, "Could not parse original action URL"),
            AbortReason::InvalidTarget(e) => error!(error = %e, "Could not build redirect target"),
        }
        let host = host.unwrap_or("this callback");
        warn!(%host, "No domain mapping, submission aborted");
        self.window.alert(format!(
            "No domain mapping found for {}. Add one in the relay settings to continue.",
            host
        ));
    }

    /// Build the hidden form in the page and send it with the unhooked submitter
    async fn submit_plan(&self, plan: &PlannedSubmission) -> Result<SubmitOutcome> {
        let document = self
            .window
            .document()
            .ok_or_else(|| Error::NoDocument("page has no document to build a form in".into()))?;
        let form = build_hidden_form(&document, &plan.action, plan.pairs());

        let parent = document
            .body()
            .or_else(|| document.document_element())
            .ok_or_else(|| Error::dom("document has no body"))?;
        parent.append_child(&form);

        self.native.submit(&form).await
    }

    async fn notify(&self, message: Message) {
        let action = message.action();
        if let Err(e) = self.bus.send(message).await {
            warn!(action, error = %e, "Notification not delivered");
        }
    }
}
