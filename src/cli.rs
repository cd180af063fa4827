// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Command line definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Relay OAuth callbacks from production IDP pages to development hosts
#[derive(Parser)]
#[command(name = "callback-relay")]
#[command(author = "Bountyy Oy")]
#[command(version)]
#[command(about, long_about = None)]
pub struct Cli {
    /// Store file holding the domain map and interception flag
    #[arg(long, global = true, env = "CALLBACK_RELAY_STORE")]
    pub store: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    pub timeout: u64,

    /// Accept invalid TLS certificates
    #[arg(long, global = true, env = "CALLBACK_RELAY_INSECURE")]
    pub insecure: bool,

    /// Proxy for all requests
    #[arg(long, global = true, env = "CALLBACK_RELAY_PROXY")]
    pub proxy: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage source to target domain mappings
    Map {
        #[command(subcommand)]
        command: MapCommands,
    },

    /// Turn callback interception on or off
    Interception {
        #[command(subcommand)]
        command: InterceptionCommands,
    },

    /// Show the last relayed callback
    LastCallback,

    /// Load an IDP page, trigger its callback form and relay it
    Relay {
        /// URL of the page holding the callback form
        url: String,

        /// Seconds to wait for the relay to finish
        #[arg(long, default_value_t = 15)]
        wait: u64,
    },

    /// Show where a callback action would be sent, without sending it
    Resolve {
        /// Absolute callback action URL
        action: String,
    },
}

#[derive(Subcommand)]
pub enum MapCommands {
    /// List mappings in order
    #[command(visible_alias = "ls")]
    List,

    /// Add or replace the mapping for a source host
    Add {
        /// Hostname as it appears in the callback action
        source: String,
        /// Host, host:port, host/path or full URL
        target: String,
    },

    /// Remove the mapping for a source host
    #[command(visible_alias = "rm")]
    Remove { source: String },
}

#[derive(Subcommand)]
pub enum InterceptionCommands {
    Enable,
    Disable,
    Status,
}
