// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! One page with the full relay attached

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::agent::{AgentHandle, ContentAgent, HandlerOutcome};
use crate::bridge;
use crate::browser::form::find_callback_form;
use crate::browser::{Browser, Page, SubmitOutcome};
use crate::error::{Error, Result};
use crate::interceptor::CallbackInterceptor;
use crate::messaging::MessageRouter;
use crate::store::{ConfigStore, Settings};

/// Page, interceptor, agent and router wired together
pub struct RelaySession {
    page: Arc<Page>,
    settings: Settings,
    router: Arc<MessageRouter>,
    interceptor: Arc<CallbackInterceptor>,
    agent: AgentHandle,
}

impl RelaySession {
    /// Attach the relay to a page that already holds its document
    pub async fn attach(page: Arc<Page>, store: Arc<dyn ConfigStore>) -> Result<Self> {
        let settings = Settings::new(store);
        let router = Arc::new(MessageRouter::new(settings.clone()));
        let (sender, receiver) = bridge::channel(page.config().bridge_event.clone());

        let agent = ContentAgent::new(&page, settings.clone(), router.clone())
            .attach(receiver)
            .await;
        let interceptor = CallbackInterceptor::install(&page, sender)?;
        info!(page = page.id(), url = ?page.url(), "Relay session attached");

        Ok(Self {
            page,
            settings,
            router,
            interceptor,
            agent,
        })
    }

    /// Open `url` in a new page and attach the relay
    pub async fn open(browser: &Browser, store: Arc<dyn ConfigStore>, url: &str) -> Result<Self> {
        let page = browser.new_page();
        page.navigate(url).await?;
        Self::attach(page, store).await
    }

    /// Submit the page's callback form the way an auto-posting IDP page does
    pub async fn trigger_callback(&self) -> Result<SubmitOutcome> {
        let document = self
            .page
            .document()
            .ok_or_else(|| Error::NoDocument("page has not loaded".into()))?;
        let form = find_callback_form(&document)
            .ok_or_else(|| Error::form_submission("no OAuth callback form on the page"))?;
        self.page.submit_form(&form).await
    }

    /// Wait for the agent to finish the next interception
    pub async fn next_outcome(&mut self, timeout: Duration) -> Result<HandlerOutcome> {
        match tokio::time::timeout(timeout, self.agent.next_outcome()).await {
            Ok(Some(outcome)) => Ok(outcome),
            Ok(None) => Err(Error::bridge("agent stopped")),
            Err(_) => Err(Error::other(format!(
                "no interception finished within {:?}",
                timeout
            ))),
        }
    }

    pub fn page(&self) -> &Arc<Page> {
        &self.page
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn router(&self) -> &MessageRouter {
        &self.router
    }

    pub fn interceptor(&self) -> &CallbackInterceptor {
        &self.interceptor
    }
}
