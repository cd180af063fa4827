// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Background message router
//!
//! Owns writes to the domain map on behalf of UI surfaces and collects
//! notifications from content agents.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::store::{DomainMap, DomainMapping, OAuthCallbackRecord, Settings};

/// Request sent to the router, tagged by `action`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Message {
    GetDomainMap,
    AddDomainMapping {
        mapping: DomainMapping,
    },
    RemoveDomainMapping {
        source: String,
    },
    AuthorizeDataSent {
        data: Value,
    },
    FormDataSentSuccessfully {
        url: String,
    },
    #[serde(rename = "oauthCallbackReceived")]
    OAuthCallbackReceived {
        data: OAuthCallbackRecord,
    },
    #[serde(rename = "getLastOAuthCallback")]
    GetLastOAuthCallback,
    GetInterceptionState,
    SetInterceptionDisabled {
        disabled: bool,
    },
}

impl Message {
    /// Wire name of the action
    pub fn action(&self) -> &'static str {
        match self {
            Message::GetDomainMap => "getDomainMap",
            Message::AddDomainMapping { .. } => "addDomainMapping",
            Message::RemoveDomainMapping { .. } => "removeDomainMapping",
            Message::AuthorizeDataSent { .. } => "authorizeDataSent",
            Message::FormDataSentSuccessfully { .. } => "formDataSentSuccessfully",
            Message::OAuthCallbackReceived { .. } => "oauthCallbackReceived",
            Message::GetLastOAuthCallback => "getLastOAuthCallback",
            Message::GetInterceptionState => "getInterceptionState",
            Message::SetInterceptionDisabled { .. } => "setInterceptionDisabled",
        }
    }
}

/// Router reply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_map: Option<DomainMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth_data: Option<OAuthCallbackRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interception_disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MessageResponse {
    pub fn ack() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    pub fn domain_map(map: DomainMap) -> Self {
        Self {
            domain_map: Some(map),
            ..Self::ack()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Anything that accepts router messages
#[async_trait]
pub trait MessageBus: Send + Sync {
    async fn send(&self, message: Message) -> Result<MessageResponse>;
}

/// Store-backed message router
#[derive(Clone)]
pub struct MessageRouter {
    settings: Settings,
}

impl MessageRouter {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Handle a JSON-encoded message and reply in JSON
    ///
    /// Undecodable input and handler failures become `success: false`.
    pub async fn handle_json(&self, raw: &str) -> String {
        let response = match serde_json::from_str::<Message>(raw) {
            Ok(message) => self
                .dispatch(message)
                .await
                .unwrap_or_else(|e| MessageResponse::failure(e.to_string())),
            Err(e) => MessageResponse::failure(format!("unrecognized message: {}", e)),
        };
        serde_json::to_string(&response)
            .unwrap_or_else(|_| r#"{"success":false}"#.to_string())
    }

    async fn dispatch(&self, message: Message) -> Result<MessageResponse> {
        debug!(action = message.action(), "Message received");

        match message {
            Message::GetDomainMap => Ok(MessageResponse::domain_map(
                self.settings.domain_map().await?,
            )),
            Message::AddDomainMapping { mapping } => {
                if mapping.source.trim().is_empty() || mapping.target.trim().is_empty() {
                    return Err(Error::messaging("mapping needs a source and a target"));
                }
                info!(source = %mapping.source, target = %mapping.target, "Domain mapping saved");
                Ok(MessageResponse::domain_map(
                    self.settings.add_mapping(mapping).await?,
                ))
            }
            Message::RemoveDomainMapping { source } => {
                info!(%source, "Domain mapping removed");
                Ok(MessageResponse::domain_map(
                    self.settings.remove_mapping(&source).await?,
                ))
            }
            Message::AuthorizeDataSent { data } => {
                info!("Authorize request data sent");
                if let Err(e) = self.settings.record_authorize_data(&data).await {
                    warn!(error = %e, "Could not keep authorize data");
                }
                Ok(MessageResponse::ack())
            }
            Message::FormDataSentSuccessfully { url } => {
                info!(%url, "Callback form data sent");
                Ok(MessageResponse::ack())
            }
            Message::OAuthCallbackReceived { data } => {
                info!(state = ?data.state, "OAuth callback received");
                if let Err(e) = self.settings.record_callback(&data).await {
                    warn!(error = %e, "Could not keep last OAuth callback");
                }
                Ok(MessageResponse::ack())
            }
            Message::GetLastOAuthCallback => Ok(MessageResponse {
                oauth_data: self.settings.last_callback().await?,
                ..MessageResponse::ack()
            }),
            Message::GetInterceptionState => Ok(MessageResponse {
                interception_disabled: Some(self.settings.interception_disabled().await?),
                ..MessageResponse::ack()
            }),
            Message::SetInterceptionDisabled { disabled } => {
                info!(disabled, "Interception toggled");
                self.settings.set_interception_disabled(disabled).await?;
                Ok(MessageResponse {
                    interception_disabled: Some(disabled),
                    ..MessageResponse::ack()
                })
            }
        }
    }
}

#[async_trait]
impl MessageBus for MessageRouter {
    async fn send(&self, message: Message) -> Result<MessageResponse> {
        self.dispatch(message).await
    }
}
