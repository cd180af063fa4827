// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Browser implementation

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::config::RelayConfig;
use super::page::Page;
use crate::error::Result;
use crate::http::HttpClient;
use crate::network::NetworkInterceptor;

/// Headless browser hosting relay pages
pub struct Browser {
    /// Relay configuration
    config: RelayConfig,
    /// Network interceptor (shared across pages)
    network: NetworkInterceptor,
    /// Page counter
    page_counter: AtomicU64,
}

impl Browser {
    /// Create a new browser instance
    pub fn new(config: RelayConfig) -> Result<Self> {
        let client = HttpClient::with_config(config.http_config())?;
        let network = NetworkInterceptor::new(client);

        Ok(Self {
            config,
            network,
            page_counter: AtomicU64::new(0),
        })
    }

    /// Create a new page
    pub fn new_page(&self) -> Arc<Page> {
        let page_id = self.page_counter.fetch_add(1, Ordering::Relaxed);
        let page = Arc::new(Page::new(
            format!("page_{}", page_id),
            self.config.clone(),
            self.network.clone(),
        ));
        tracing::debug!(page = page.id(), "Page created");
        page
    }

    /// Get network interceptor
    pub fn network(&self) -> &NetworkInterceptor {
        &self.network
    }

    /// Get browser config
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_share_network_log() {
        let browser = Browser::new(RelayConfig::default()).unwrap();
        let first = browser.new_page();
        let second = browser.new_page();
        assert_ne!(first.id(), second.id());
        assert_eq!(first.config().marker_attribute, browser.config().marker_attribute);
        assert_eq!(second.network().event_count(), browser.network().event_count());
    }
}
