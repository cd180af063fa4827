// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for callback-relay
//!
//! Every failure stays local to one interception attempt. Variants carry
//! enough context (URL, host, key) to explain what was skipped in logs.

use thiserror::Error;

/// Result type alias for callback-relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// HTML parsing failed
    #[error("HTML parsing error: {0}")]
    HtmlParse(String),

    /// DOM operation failed
    #[error("DOM error: {0}")]
    Dom(String),

    /// Network layer error
    #[error("Network error: {0}")]
    Network(String),

    /// Configuration store read or write rejected
    #[error("Store error on '{key}': {reason}")]
    Store { key: String, reason: String },

    /// Cross-context event bridge failure
    #[error("Bridge error: {0}")]
    Bridge(String),

    /// Form could not be submitted
    #[error("Form submission failed: {0}")]
    FormSubmission(String),

    /// Mapping target could not be turned into a URL
    #[error("Invalid mapping target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    /// Message bus error
    #[error("Messaging error: {0}")]
    Messaging(String),

    /// Page has no document loaded
    #[error("Page has no document: {0}")]
    NoDocument(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new DOM error
    pub fn dom<S: Into<String>>(msg: S) -> Self {
        Error::Dom(msg.into())
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(msg: S) -> Self {
        Error::Network(msg.into())
    }

    /// Create a store error for a key
    pub fn store(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Store {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a bridge error
    pub fn bridge<S: Into<String>>(msg: S) -> Self {
        Error::Bridge(msg.into())
    }

    /// Create a form submission error
    pub fn form_submission(reason: impl Into<String>) -> Self {
        Error::FormSubmission(reason.into())
    }

    /// Create an invalid-target error
    pub fn invalid_target(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidTarget {
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Create a messaging error
    pub fn messaging<S: Into<String>>(msg: S) -> Self {
        Error::Messaging(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a store error
    pub fn is_store(&self) -> bool {
        matches!(self, Error::Store { .. })
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    /// Re-tag any error as a store failure for `key`
    fn store_context(self, key: &str) -> Result<T>;
}

impl<T, E: Into<Error>> ErrorContext<T> for std::result::Result<T, E> {
    fn store_context(self, key: &str) -> Result<T> {
        self.map_err(|e| match e.into() {
            err @ Error::Store { .. } => err,
            other => Error::store(key, other.to_string()),
        })
    }
}
