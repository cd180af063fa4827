// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request log shared by the page and the agent

mod event;
mod interceptor;

pub use event::{EventType, NetworkEvent, RequestInfo, ResponseInfo};
pub use interceptor::NetworkInterceptor;
