//! # Node Runtime
//!
//! Entry point for a single local node.
//!
//! ## Startup
//!
//! ```text
//! load_config ──► NodeContainer::new ──► bootstrap (genesis + N empty blocks)
//!                                              │ blocking task
//!                                              ▼
//!                                     log canonical head ──► wait for Ctrl+C
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use node_runtime::container::{NodeConfig, NodeContainer};

/// Defaults overridden by `MC_*` environment variables.
fn load_config() -> Result<NodeConfig> {
    NodeConfig::from_env().context("loading node configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let config = load_config()?;
    info!("===========================================");
    info!("  Marm-Chain Node Runtime v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let node = Arc::new(NodeContainer::new(&config));
    let blocks = config.bootstrap_blocks;
    let miner = Arc::clone(&node);
    tokio::task::spawn_blocking(move || miner.bootstrap(blocks))
        .await
        .context("bootstrap task panicked")?
        .context("bootstrapping chain")?;

    if let Some(head) = node.chain.read().canonical_head() {
        info!(
            hash = %head.hash(),
            height = head.height(),
            accumulated_difficulty = head.accumulated_difficulty(),
            "canonical head"
        );
    }

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;
    info!("Shutdown complete");
    Ok(())
}
