// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network recorder for everything the page sends

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;

use super::event::{EventType, NetworkEvent, RequestInfo, ResponseInfo};
use crate::error::Result;
use crate::http::{HttpClient, Request, Response};

const MAX_EVENTS: usize = 1000;
const MAX_LOGGED_BODY: usize = 64 * 1024;

/// Executes requests and keeps a bounded log of them
///
/// Clones share the client and the log, so the page and the agent see
/// one history.
#[derive(Clone)]
pub struct NetworkInterceptor {
    client: HttpClient,
    events: Arc<RwLock<Vec<NetworkEvent>>>,
    counter: Arc<AtomicU64>,
}

impl NetworkInterceptor {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            events: Arc::new(RwLock::new(Vec::new())),
            counter: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Execute a request, recording it under `initiator`
    pub async fn execute(
        &self,
        request: Request,
        event_type: EventType,
        initiator: &str,
    ) -> Result<Response> {
        let start = Instant::now();
        let id = format!("evt_{}", self.counter.fetch_add(1, Ordering::Relaxed) + 1);

        let request_info = RequestInfo {
            url: request.url.to_string(),
            method: request.method.to_string(),
            body: request.body.as_ref().map(|b| {
                String::from_utf8_lossy(&b[..b.len().min(MAX_LOGGED_BODY)]).into_owned()
            }),
            content_type: request.content_type().map(String::from),
        };
        let mut event = NetworkEvent::new(id, event_type, initiator, request_info);

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            initiator,
            "Request"
        );

        let result = self.client.execute(request).await;
        event.finish(
            result
                .as_ref()
                .map(|response| ResponseInfo {
                    status: response.status_code(),
                    content_type: response.content_type().map(String::from),
                    body_len: response.body_len(),
                })
                .map_err(|e| e.to_string()),
            start.elapsed(),
        );

        let mut events = self.events.write();
        if events.len() >= MAX_EVENTS {
            events.remove(0);
        }
        events.push(event);
        drop(events);

        result
    }

    /// Every recorded request
    pub fn events(&self) -> Vec<NetworkEvent> {
        self.events.read().clone()
    }

    pub fn event_count(&self) -> usize {
        self.events.read().len()
    }

    /// Recorded form submissions
    pub fn form_submissions(&self) -> Vec<NetworkEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.is_form_submission())
            .cloned()
            .collect()
    }

    /// Form submissions issued by one execution context
    pub fn submissions_by(&self, initiator: &str) -> Vec<NetworkEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.is_form_submission() && e.initiator == initiator)
            .cloned()
            .collect()
    }
}
