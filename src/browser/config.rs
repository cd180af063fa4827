// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Relay configuration

use std::path::PathBuf;
use std::time::Duration;

use crate::bridge::OAUTH_CALLBACK_INTERCEPTED;
use crate::http::{HttpClientConfig, DEFAULT_USER_AGENT};

/// Attribute on the root element that disables interception while present
pub const DEFAULT_MARKER_ATTRIBUTE: &str = "data-callback-relay-interception-disabled";

/// Default store file name, relative to the working directory
pub const DEFAULT_STORE_FILE: &str = "callback-relay.json";

/// Relay configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// User agent string
    pub user_agent: String,
    /// Default timeout for requests
    pub timeout: Duration,
    /// Accept invalid TLS certificates
    pub ignore_https_errors: bool,
    /// Proxy URL
    pub proxy: Option<String>,
    /// Marker attribute mirrored onto the document element
    pub marker_attribute: String,
    /// Event name used on the page world bridge
    pub bridge_event: String,
    /// Path of the persistent store
    pub store_path: PathBuf,
    /// Extra headers sent with every request
    pub default_headers: Vec<(String, String)>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            ignore_https_errors: false,
            proxy: None,
            marker_attribute: DEFAULT_MARKER_ATTRIBUTE.to_string(),
            bridge_event: OAUTH_CALLBACK_INTERCEPTED.to_string(),
            store_path: PathBuf::from(DEFAULT_STORE_FILE),
            default_headers: vec![],
        }
    }
}

impl RelayConfig {
    /// Create a new relay config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Ignore HTTPS errors
    pub fn ignore_https_errors(mut self, ignore: bool) -> Self {
        self.ignore_https_errors = ignore;
        self
    }

    /// Set proxy
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Set the disable marker attribute name
    pub fn marker_attribute(mut self, name: impl Into<String>) -> Self {
        self.marker_attribute = name.into();
        self
    }

    /// Set the bridge event name
    pub fn bridge_event(mut self, name: impl Into<String>) -> Self {
        self.bridge_event = name.into();
        self
    }

    /// Set store path
    pub fn store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    /// Add default header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Local relying parties usually run self-signed TLS and answer quickly
    pub fn for_local_development() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            ignore_https_errors: true,
            ..Default::default()
        }
    }

    /// HTTP client settings derived from this config
    pub fn http_config(&self) -> HttpClientConfig {
        let mut http = HttpClientConfig {
            user_agent: self.user_agent.clone(),
            timeout: self.timeout,
            accept_invalid_certs: self.ignore_https_errors,
            proxy: self.proxy.clone(),
            ..Default::default()
        };

        for (name, value) in &self.default_headers {
            match (
                reqwest::header::HeaderName::from_bytes(name.as_bytes()),
                reqwest::header::HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    http.default_headers.insert(name, value);
                }
                _ => tracing::warn!(header = %name, "Skipping invalid default header"),
            }
        }

        http
    }
}
