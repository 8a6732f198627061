//! Configuration module for environment variables and application settings

use std::env;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use solana_sdk::native_token::LAMPORTS_PER_SOL;
use solana_sdk::pubkey::Pubkey;

/// Immutable application configuration, built once in `main` and passed to
/// every component.
#[derive(Debug, Clone)]
pub struct Config {
    /// RPC endpoint used for every network call
    pub rpc_endpoint: String,

    /// Mint of the token traded against SOL
    pub token_mint: Pubkey,

    /// Path to the JSON keypair file (byte-array format)
    pub wallet_path: String,

    /// Slippage tolerance as a fraction. Informational only; the on-chain
    /// floor comes from `min_amount_out`, configured independently.
    pub slippage: f64,

    /// Lamports spent per buy
    pub swap_amount: u64,

    /// Minimum acceptable output in smallest units, applied to every swap
    /// in both directions
    pub min_amount_out: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mint = env::var("TOKEN_MINT_ADDRESS")
            .map_err(|_| anyhow!("TOKEN_MINT_ADDRESS environment variable is required"))?;

        Ok(Self {
            rpc_endpoint: env::var("RPC_ENDPOINT")
                .map_err(|_| anyhow!("RPC_ENDPOINT environment variable is required"))?,

            token_mint: Pubkey::from_str(&mint)
                .map_err(|e| anyhow!("TOKEN_MINT_ADDRESS is not a valid pubkey: {e}"))?,

            wallet_path: env::var("WALLET_PATH")
                .map_err(|_| anyhow!("WALLET_PATH environment variable is required"))?,

            slippage: parse_f64("SWAP_SLIPPAGE")?,

            swap_amount: to_base_units(parse_f64("SWAP_AMOUNT")?),

            min_amount_out: to_base_units(parse_f64("MIN_AMOUNT_OUT")?),
        })
    }
}

fn parse_f64(key: &str) -> Result<f64> {
    env::var(key)
        .map_err(|_| anyhow!("{key} environment variable is required"))?
        .parse()
        .map_err(|e| anyhow!("{key} is not a valid number: {e}"))
}

/// Scale a whole-unit amount to smallest units (9 decimals).
pub fn to_base_units(amount: f64) -> u64 {
    (amount * LAMPORTS_PER_SOL as f64) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_whole_units_to_lamports() {
        assert_eq!(to_base_units(0.1), 100_000_000);
        assert_eq!(to_base_units(1.0), 1_000_000_000);
        assert_eq!(to_base_units(0.0), 0);
    }
}
