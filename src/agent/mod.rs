// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Isolated content agent
//!
//! Owns everything the page world must not touch: the store, the domain
//! map and an unhooked submit capability. Receives intercepted
//! submissions over the bridge and handles each on its own task.

mod handler;
mod mirror;
pub mod resolve;
pub mod state;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::bridge::{BridgeReceiver, FieldMap, InterceptedSubmission};
use crate::browser::form::{find_authorize_form, Form};
use crate::browser::{Page, Window};
use crate::error::Result;
use crate::messaging::{Message, MessageBus};
use crate::store::Settings;

pub use handler::{HandlerOutcome, InterceptionHandler};
pub use mirror::InterceptionMirror;
pub use resolve::{normalize_target, resolve_target};
pub use state::{AbortReason, HandlerState, PlannedSubmission};

/// Initiator recorded for requests the agent sends
pub const AGENT_INITIATOR: &str = "agent";

/// Content agent for one page
pub struct ContentAgent {
    window: Window,
    settings: Settings,
    bus: Arc<dyn MessageBus>,
    handler: Arc<InterceptionHandler>,
    mirror: InterceptionMirror,
}

impl ContentAgent {
    pub fn new(page: &Page, settings: Settings, bus: Arc<dyn MessageBus>) -> Self {
        let window = page.window().clone();
        let handler = Arc::new(InterceptionHandler::new(
            window.clone(),
            settings.clone(),
            page.native_submitter(AGENT_INITIATOR),
            bus.clone(),
        ));
        let mirror = InterceptionMirror::new(
            window.clone(),
            settings.clone(),
            page.config().marker_attribute.clone(),
        );

        Self {
            window,
            settings,
            bus,
            handler,
            mirror,
        }
    }

    /// Mirror the kill-switch and start serving `receiver`
    pub async fn attach(self, receiver: BridgeReceiver) -> AgentHandle {
        let changes = self.settings.subscribe();
        let disabled = self.mirror.sync().await;
        let mirror_task = self.mirror.clone().spawn(changes);
        info!(interception_disabled = disabled, "Content agent attached");

        self.report_authorize_form().await;

        let (tx, outcomes) = mpsc::unbounded_channel();
        let serve_task = tokio::spawn(serve(self.handler.clone(), receiver, tx));

        AgentHandle {
            outcomes,
            tasks: vec![mirror_task, serve_task],
        }
    }

    /// Handle one submission inline
    pub async fn handle(&self, submission: InterceptedSubmission) -> Result<HandlerOutcome> {
        self.handler.handle(submission).await
    }

    /// Let the background know about an authorize request form on the page
    async fn report_authorize_form(&self) {
        let Some(document) = self.window.document() else {
            return;
        };
        let Some(element) = find_authorize_form(&document) else {
            return;
        };

        let fields: FieldMap = Form::from_element(&element).data().into_iter().collect();
        let data = match serde_json::to_value(&fields) {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "Could not serialize authorize form");
                return;
            }
        };

        debug!(fields = fields.len(), "Authorize request form found");
        if let Err(e) = self.bus.send(Message::AuthorizeDataSent { data }).await {
            warn!(error = %e, "Authorize data notification not delivered");
        }
    }
}

async fn serve(
    handler: Arc<InterceptionHandler>,
    mut receiver: BridgeReceiver,
    outcomes: mpsc::UnboundedSender<HandlerOutcome>,
) {
    while let Some(item) = receiver.recv().await {
        let submission = match item {
            Ok(submission) => submission,
            Err(e) => {
                warn!(error = %e, "Dropping bridge event");
                continue;
            }
        };

        let handler = handler.clone();
        let outcomes = outcomes.clone();
        tokio::spawn(async move {
            let outcome = handler.handle(submission).await.unwrap_or_else(|e| {
                error!(error = %e, "Interception failed");
                HandlerOutcome::Failed {
                    error: e.to_string(),
                }
            });
            let _ = outcomes.send(outcome);
        });
    }
    debug!("Bridge closed, agent stopping");
}

/// Running agent; dropping it stops the agent's tasks
pub struct AgentHandle {
    outcomes: mpsc::UnboundedReceiver<HandlerOutcome>,
    tasks: Vec<JoinHandle<()>>,
}

impl AgentHandle {
    /// Wait for the next finished interception
    pub async fn next_outcome(&mut self) -> Option<HandlerOutcome> {
        self.outcomes.recv().await
    }
}

impl Drop for AgentHandle {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}
