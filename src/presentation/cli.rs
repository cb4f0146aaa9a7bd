//! CLI Argument Parsing
//!
//! This module defines the CLI interface using clap.
//!
//! Global flags (--json, --color, --verbose) are inherited by all subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{SecretsBackendKind, DEFAULT_CONFIG_PATH};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorWhen {
    Auto,
    Always,
    Never,
}

/// Shipwright - configuration-driven deployment engine
#[derive(Parser, Debug)]
#[command(name = "shipwright")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output NDJSON events instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Color output mode
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorWhen>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deploy one service declared in the deployments document
    Deploy(DeployArgs),
}

#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct DeployArgs {
    /// Service name
    pub service: String,

    /// Deployments document
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Show the plan without touching any host
    #[arg(long)]
    pub dry_run: bool,

    /// Secret backend (env, bitwarden)
    #[arg(long, value_name = "BACKEND")]
    pub secrets: Option<SecretsBackendKind>,

    /// Per-step timeout in seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Extra attempts for failed commands
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,

    /// SSH login for services that do not name one
    #[arg(long, value_name = "USER")]
    pub ssh_user: Option<String>,
}
