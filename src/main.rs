//! # Cycle Trader
//!
//! Automated buy/sell trading cycles for a single token pair on Solana,
//! driven through the SPL Token Swap program.
//!
//! ## Architecture
//! - `config`: environment variable configuration, built once and passed
//!   explicitly
//! - `services`: pool lookup, token account provisioning, swap execution
//! - `trader`: the timed buy/sell cycle
//!
//! ## Environment Setup
//! Copy `.env.example` to `.env` and configure the RPC endpoint, target
//! token mint, wallet path and trade amounts.
//!
//! ## Running
//! ```bash
//! cargo run
//! ```
//!
//! The trader runs indefinitely until the process is terminated.

mod config;
mod error;
mod services;
mod trader;

use std::fs;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::signature::{Keypair, Signer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::services::swap_engine::SwapEngine;
use crate::trader::Trader;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Console output with compact formatting; RUST_LOG overrides the level
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .init();

    tracing::info!(
        "Starting {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env().context("Failed to load configuration from environment")?;

    let wallet = load_wallet(&config.wallet_path)?;
    tracing::info!("Loaded wallet {}", wallet.pubkey());
    tracing::info!(
        "Trading {} against SOL via {}",
        config.token_mint,
        config.rpc_endpoint
    );

    let rpc = Arc::new(RpcClient::new_with_commitment(
        config.rpc_endpoint.clone(),
        CommitmentConfig::confirmed(),
    ));

    let engine = SwapEngine::new(rpc, Arc::new(wallet));
    let trader = Trader::new(engine, config);

    // Runs until killed; the first error outside a swap attempt ends the
    // process.
    trader.run().await?;

    Ok(())
}

/// Load the signing keypair from a JSON byte-array wallet file.
fn load_wallet(path: &str) -> Result<Keypair> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read wallet file {path}"))?;

    let bytes: Vec<u8> =
        serde_json::from_str(&raw).context("Wallet file is not a JSON byte array")?;

    Keypair::from_bytes(&bytes).map_err(|e| anyhow!("Invalid keypair bytes: {e}"))
}
