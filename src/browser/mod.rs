// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Browser and Page API
//!
//! Headless pages the relay attaches to, plus the submission plumbing
//! both execution contexts share.

mod browser;
mod config;
pub mod form;
mod page;
mod submit;
mod window;

pub use browser::Browser;
pub use config::{RelayConfig, DEFAULT_MARKER_ATTRIBUTE, DEFAULT_STORE_FILE};
pub use form::{Form, FormField, FormKind};
pub use page::{Page, PAGE_INITIATOR};
pub use submit::{
    FormSubmit, ListenerPhase, NativeSubmit, SubmitEvent, SubmitListener, SubmitOutcome,
};
pub use window::{Dialog, DialogKind, DocumentObserver, Window};
