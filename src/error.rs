//! Typed failures for the swap path.
//!
//! Swap attempts surface as `Result<_, SwapError>` so the trading loop can
//! decide what to log and what to let kill the process, instead of relying
//! on log output alone.

use std::num::ParseIntError;

use solana_client::client_error::ClientError;
use solana_sdk::program_error::ProgramError;
use solana_sdk::pubkey::{Pubkey, PubkeyError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SwapError {
    #[error("no pool found for pair {0} / {1}")]
    PoolNotFound(Pubkey, Pubkey),

    #[error("rpc request failed: {0}")]
    Rpc(#[from] ClientError),

    #[error("swap program error: {0}")]
    Program(#[from] ProgramError),

    #[error("invalid pool authority: {0}")]
    Authority(#[from] PubkeyError),

    #[error("unparseable token balance: {0}")]
    Balance(#[from] ParseIntError),
}
