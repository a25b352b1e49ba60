//! CLI command handling module
//!
//! Handles all CLI subcommands and argument parsing.

mod commands;
mod config;
mod logging;
mod render;
mod version;

pub use commands::{
    OutputOptions, TransitionArgs, TransitionTarget, handle_get, handle_status,
    handle_transition, handle_watch, transition,
};
pub use config::{ConfigSubcommand, handle_config_command};
pub use logging::*;
pub use render::{render_manifests, render_table};
pub use version::display_version;

use crate::config::{ConfigLoader, OutputFormat};
use crate::models::SourceKind;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Inspect and drive the status of Flux GitRepository and HelmChart sources
#[derive(Parser, Debug)]
#[command(name = "flux-source")]
#[command(about = "Inspect and drive the status of Flux GitRepository and HelmChart sources", long_about = None)]
pub struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    pub debug: bool,

    /// Output format (defaults to output.format from the configuration)
    #[arg(long, short = 'o', value_enum, global = true)]
    pub output: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Command,
}

/// Main commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the status of sources in manifest files
    Status {
        /// Manifest files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Apply a status transition to sources in a manifest file
    Transition(TransitionArgs),
    /// Fetch a source from the cluster
    Get {
        /// Source kind (gitrepository, gitrepo, helmchart, hc, ...)
        #[arg(value_parser = parse_kind)]
        kind: SourceKind,
        /// Source name
        name: String,
        /// Namespace (defaults to NAMESPACE, then defaultNamespace)
        #[arg(long, short = 'n')]
        namespace: Option<String>,
    },
    /// Watch sources in the cluster
    Watch {
        /// Namespace, or "all" for every namespace
        #[arg(long, short = 'n')]
        namespace: Option<String>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
    /// Show version information
    Version,
}

fn parse_kind(s: &str) -> Result<SourceKind, String> {
    SourceKind::from_str_case_insensitive(s).ok_or_else(|| format!("unknown source kind '{}'", s))
}

/// Run a parsed command line
pub async fn run(args: Args) -> Result<()> {
    let loaded = ConfigLoader::load();
    let level = loaded
        .as_ref()
        .map(|c| c.logger.level.clone())
        .unwrap_or_else(|_| ConfigLoader::load_defaults().logger.level);
    init_logging(args.debug, &level);

    // Config commands report their own errors, including a broken file
    if let Command::Config { subcommand } = args.command {
        return handle_config_command(subcommand);
    }

    let config = loaded.unwrap_or_else(|e| {
        tracing::warn!("Failed to load configuration, using defaults: {:#}", e);
        ConfigLoader::load_defaults()
    });
    let output = OutputOptions::resolve(args.output, &config);

    match args.command {
        Command::Status { files } => handle_status(&files, output),
        Command::Transition(transition_args) => handle_transition(transition_args, output),
        Command::Get {
            kind,
            name,
            namespace,
        } => handle_get(kind, &name, namespace.as_deref(), &config, output).await,
        Command::Watch { namespace } => handle_watch(namespace.as_deref(), &config, output).await,
        Command::Version => {
            display_version();
            Ok(())
        }
        Command::Config { .. } => Ok(()),
    }
}
