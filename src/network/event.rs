// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network event types

use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

/// One request leaving the page, with its outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkEvent {
    pub id: String,
    pub event_type: EventType,
    pub timestamp: SystemTime,
    /// Execution context that issued the request
    pub initiator: String,
    pub request: RequestInfo,
    pub response: Option<ResponseInfo>,
    pub duration: Option<Duration>,
    pub error: Option<String>,
}

/// What caused the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    Navigation,
    FormSubmission,
}

/// Request information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestInfo {
    pub url: String,
    pub method: String,
    pub body: Option<String>,
    pub content_type: Option<String>,
}

/// Response information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseInfo {
    pub status: u16,
    pub content_type: Option<String>,
    pub body_len: usize,
}

impl NetworkEvent {
    pub fn new(
        id: impl Into<String>,
        event_type: EventType,
        initiator: impl Into<String>,
        request: RequestInfo,
    ) -> Self {
        Self {
            id: id.into(),
            event_type,
            timestamp: SystemTime::now(),
            initiator: initiator.into(),
            request,
            response: None,
            duration: None,
            error: None,
        }
    }

    /// Record how the request ended
    pub fn finish(
        &mut self,
        outcome: std::result::Result<ResponseInfo, String>,
        duration: Duration,
    ) {
        match outcome {
            Ok(response) => self.response = Some(response),
            Err(error) => self.error = Some(error),
        }
        self.duration = Some(duration);
    }

    pub fn is_form_submission(&self) -> bool {
        self.event_type == EventType::FormSubmission
    }

    /// Decoded form fields of the request body, in wire order
    pub fn form_fields(&self) -> Vec<(String, String)> {
        self.request
            .body
            .as_deref()
            .map(|body| {
                url::form_urlencoded::parse(body.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Value of the first field called `name`
    pub fn form_field(&self, name: &str) -> Option<String> {
        self.form_fields()
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// 2xx response received
    pub fn is_success(&self) -> bool {
        self.response
            .as_ref()
            .map_or(false, |r| (200..300).contains(&r.status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(body: &str) -> RequestInfo {
        RequestInfo {
            url: "http://localhost:3000/callback".to_string(),
            method: "POST".to_string(),
            body: Some(body.to_string()),
            content_type: Some("application/x-www-form-urlencoded".to_string()),
        }
    }

    #[test]
    fn test_form_fields_decode() {
        let event = NetworkEvent::new(
            "evt_1",
            EventType::FormSubmission,
            "agent",
            post("code=a%2Bb&state=s+1&original_action=https%3A%2F%2Fapp.example.com%2Fcb"),
        );
        assert_eq!(
            event.form_fields()[..2],
            [
                ("code".to_string(), "a+b".to_string()),
                ("state".to_string(), "s 1".to_string()),
            ]
        );
        assert_eq!(
            event.form_field("original_action").as_deref(),
            Some("https://app.example.com/cb")
        );
        assert!(event.form_field("id_token").is_none());
    }

    #[test]
    fn test_success_requires_2xx_response() {
        let mut event = NetworkEvent::new("evt_2", EventType::FormSubmission, "page", post(""));
        assert!(!event.is_success());

        event.finish(
            Ok(ResponseInfo {
                status: 204,
                content_type: None,
                body_len: 0,
            }),
            Duration::from_millis(3),
        );
        assert!(event.is_success());

        let mut failed = NetworkEvent::new("evt_3", EventType::FormSubmission, "page", post(""));
        failed.finish(Err("connection refused".into()), Duration::from_millis(1));
        assert!(!failed.is_success());
        assert_eq!(failed.error.as_deref(), Some("connection refused"));
    }
}
