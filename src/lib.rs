// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # callback-relay - OAuth callback interception and domain remapping
//!
//! Catches the authorization-response form an identity provider posts
//! back to a relying party, and re-posts the same fields to a development
//! host chosen from a source-to-target domain map.
//!
//! ## Features
//!
//! - Page world interceptor: hooks both programmatic and user-initiated submits
//! - Isolated agent: store access and an unhooked submit capability
//! - Typed bridge: submissions cross contexts as serialized JSON
//! - Kill-switch: transparent passthrough while interception is disabled
//! - Domain mapping: bare hosts inherit the callback path, queries are kept
//! - Pluggable store: in-memory or JSON file, with change notifications
//! - Message router: domain map CRUD and last-callback record for UI surfaces
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use callback_relay::store::{DomainMapping, MemoryStore, Settings};
//! use callback_relay::{Browser, RelayConfig, RelaySession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryStore::new());
//!     Settings::new(store.clone())
//!         .add_mapping(DomainMapping::new("portal.example.com", "localhost:3000"))
//!         .await?;
//!
//!     let browser = Browser::new(RelayConfig::for_local_development())?;
//!     let mut session =
//!         RelaySession::open(&browser, store, "https://idp.example.com/done").await?;
//!
//!     session.trigger_callback().await?;
//!     let outcome = session.next_outcome(std::time::Duration::from_secs(10)).await?;
//!     println!("{:?}", outcome);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod bridge;
pub mod browser;
pub mod dom;
pub mod error;
pub mod http;
pub mod interceptor;
pub mod messaging;
pub mod network;
pub mod session;
pub mod store;

// Re-exports for convenience

// Browser and Page
pub use browser::{Browser, Page, RelayConfig};

// Forms and submission
pub use browser::{Form, FormField, FormKind, FormSubmit, NativeSubmit, SubmitOutcome};

// Relay
pub use agent::{ContentAgent, HandlerOutcome, HandlerState};
pub use bridge::{EventBridge, FieldMap, InterceptedSubmission};
pub use interceptor::CallbackInterceptor;
pub use messaging::{Message, MessageBus, MessageResponse, MessageRouter};
pub use session::RelaySession;

// Store
pub use store::{ConfigStore, DomainMap, DomainMapping, JsonFileStore, MemoryStore, Settings};

// DOM
pub use dom::{Document, Element, Node};

// Errors
pub use error::{Error, ErrorContext, Result};

// HTTP
pub use http::{HttpClient, Request, Response};

// Network
pub use network::{EventType, NetworkEvent, NetworkInterceptor};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
