// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! callback-relay CLI
//!
//! Manages the relay store and drives a headless relay session.

mod cli;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use url::Url;

use callback_relay::agent::{HandlerOutcome, HandlerState};
use callback_relay::bridge::{FieldMap, InterceptedSubmission};
use callback_relay::messaging::{Message, MessageBus, MessageResponse, MessageRouter};
use callback_relay::store::{DomainMapping, JsonFileStore, Settings};
use callback_relay::{Browser, RelayConfig, RelaySession, SubmitOutcome};
use cli::{Cli, Commands, InterceptionCommands, MapCommands};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("callback_relay=info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn config_from(cli: &Cli) -> RelayConfig {
    let mut config = RelayConfig::new()
        .timeout(Duration::from_secs(cli.timeout))
        .ignore_https_errors(cli.insecure);
    if let Some(ref proxy) = cli.proxy {
        config = config.proxy(proxy);
    }
    if let Some(ref store) = cli.store {
        config = config.store_path(store);
    }
    config
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = config_from(&cli);
    let store = Arc::new(JsonFileStore::open(&config.store_path));
    let router = MessageRouter::new(Settings::new(store.clone()));

    match cli.command {
        Commands::Map { command } => {
            let message = match command {
                MapCommands::List => Message::GetDomainMap,
                MapCommands::Add { source, target } => Message::AddDomainMapping {
                    mapping: DomainMapping::new(source, target),
                },
                MapCommands::Remove { source } => Message::RemoveDomainMapping { source },
            };
            let response = send(&router, message).await?;
            print_domain_map(&response);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Interception { command } => {
            let message = match command {
                InterceptionCommands::Enable => Message::SetInterceptionDisabled { disabled: false },
                InterceptionCommands::Disable => Message::SetInterceptionDisabled { disabled: true },
                InterceptionCommands::Status => Message::GetInterceptionState,
            };
            let response = send(&router, message).await?;
            let disabled = response.interception_disabled.unwrap_or(false);
            println!(
                "Interception: {}",
                if disabled { "disabled" } else { "enabled" }
            );
            Ok(ExitCode::SUCCESS)
        }
        Commands::LastCallback => {
            let response = send(&router, Message::GetLastOAuthCallback).await?;
            match response.oauth_data {
                Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                None => println!("No callback relayed yet"),
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Resolve { action } => resolve(&router, &action).await,
        Commands::Relay { url, wait } => {
            let browser = Browser::new(config).context("could not start browser")?;
            relay(&browser, store, &url, Duration::from_secs(wait)).await
        }
    }
}

async fn send(router: &MessageRouter, message: Message) -> Result<MessageResponse> {
    let action = message.action();
    let response = router
        .send(message)
        .await
        .with_context(|| format!("{} failed", action))?;
    if !response.success {
        bail!(
            "{} failed: {}",
            action,
            response.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(response)
}

fn print_domain_map(response: &MessageResponse) {
    let Some(ref map) = response.domain_map else {
        return;
    };
    if map.is_empty() {
        println!("No domain mappings");
        return;
    }
    println!("=== Domain mappings ({}) ===", map.len());
    for mapping in map.iter() {
        println!("  {} -> {}", mapping.source, mapping.target);
    }
}

async fn resolve(router: &MessageRouter, action: &str) -> Result<ExitCode> {
    Url::parse(action).with_context(|| format!("not an absolute URL: {}", action))?;
    let response = send(router, Message::GetDomainMap).await?;
    let domain_map = response.domain_map.unwrap_or_default();

    let submission = InterceptedSubmission {
        form_data: FieldMap::new(),
        original_action: action.to_string(),
    };
    let state = HandlerState::start(submission)
        .after_disabled_check(false)
        .after_lookup(&domain_map)
        .build();

    match state {
        HandlerState::Submit(plan) => {
            println!("{} -> {}", action, plan.action);
            Ok(ExitCode::SUCCESS)
        }
        HandlerState::AbortNoMapping { host, reason } => {
            println!(
                "No mapping for {} ({:?})",
                host.as_deref().unwrap_or("this action"),
                reason
            );
            Ok(ExitCode::from(2))
        }
        other => bail!("resolution stopped in state {}", other.name()),
    }
}

async fn relay(
    browser: &Browser,
    store: Arc<JsonFileStore>,
    url: &str,
    wait: Duration,
) -> Result<ExitCode> {
    println!("Loading: {}", url);
    let mut session = RelaySession::open(browser, store, url)
        .await
        .with_context(|| format!("could not open {}", url))?;

    let forms = session.page().forms();
    println!("Forms on page: {}", forms.len());

    match session.trigger_callback().await? {
        SubmitOutcome::Sent(response) => {
            // Interception was off; the page posted the callback itself
            println!(
                "Callback sent unmodified to {} (status {})",
                response.url, response.status
            );
            return Ok(ExitCode::SUCCESS);
        }
        SubmitOutcome::Suppressed => println!("Callback intercepted"),
    }

    let outcome = session.next_outcome(wait).await?;
    let code = match outcome {
        HandlerOutcome::Submitted { action, status } => {
            println!("Relayed to {} (status {})", action, fmt_status(status));
            ExitCode::SUCCESS
        }
        HandlerOutcome::Replayed { action, status } => {
            println!("Replayed to {} (status {})", action, fmt_status(status));
            ExitCode::SUCCESS
        }
        HandlerOutcome::Aborted { host, .. } => {
            println!(
                "Aborted: no mapping for {}",
                host.as_deref().unwrap_or("this callback")
            );
            ExitCode::from(2)
        }
        HandlerOutcome::Failed { error } => {
            eprintln!("Relay failed: {}", error);
            ExitCode::from(1)
        }
    };

    for dialog in session.page().dialogs() {
        println!("[alert] {}", dialog.message);
    }
    Ok(code)
}

fn fmt_status(status: Option<u16>) -> String {
    status.map_or_else(|| "none".to_string(), |s| s.to_string())
}
