//! flux-source - inspect and drive the status of Flux source objects
//!
//! Offline commands work on manifest files; `get` and `watch` read from the
//! current Kubernetes context.

use anyhow::Result;
use clap::Parser;
use flux_source::cli::{self, Args};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    cli::run(args).await
}
