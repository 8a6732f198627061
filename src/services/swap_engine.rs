//! Swap execution against the SPL Token Swap program.
//!
//! The pool record is resolved once per swap and reused for every account
//! reference in the instruction, so a swap costs a single program scan
//! rather than one per field.

use std::sync::Arc;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::transaction::Transaction;
use spl_token_swap::instruction::{swap, Swap};
use tracing::{debug, info};

use crate::error::SwapError;
use crate::services::{pool_resolver, token_account};

/// One exchange intent, constructed per call and discarded after submission.
#[derive(Debug, Clone)]
pub struct SwapRequest {
    pub source_mint: Pubkey,
    pub destination_mint: Pubkey,
    /// Input amount in smallest units
    pub amount_in: u64,
    /// Informational only; not used to derive the output floor
    pub slippage: f64,
    /// Absolute output floor in smallest units, enforced atomically on-chain
    pub minimum_amount_out: u64,
}

/// The seam the trading loop runs against.
#[async_trait]
pub trait SwapVenue: Send + Sync {
    /// Perform one exchange; returns the confirmation signature.
    async fn swap(&self, request: &SwapRequest) -> Result<Signature, SwapError>;

    /// Current balance of the wallet's token account for `mint`, in
    /// smallest units. Provisions the account if it does not exist yet.
    async fn token_balance(&self, mint: &Pubkey) -> Result<u64, SwapError>;
}

#[async_trait]
impl<V: SwapVenue> SwapVenue for Arc<V> {
    async fn swap(&self, request: &SwapRequest) -> Result<Signature, SwapError> {
        self.as_ref().swap(request).await
    }

    async fn token_balance(&self, mint: &Pubkey) -> Result<u64, SwapError> {
        self.as_ref().token_balance(mint).await
    }
}

/// Executes swaps through the on-chain Token Swap program.
pub struct SwapEngine {
    rpc: Arc<RpcClient>,
    wallet: Arc<Keypair>,
}

impl SwapEngine {
    pub fn new(rpc: Arc<RpcClient>, wallet: Arc<Keypair>) -> Self {
        Self { rpc, wallet }
    }
}

#[async_trait]
impl SwapVenue for SwapEngine {
    async fn swap(&self, request: &SwapRequest) -> Result<Signature, SwapError> {
        let pool = pool_resolver::resolve(
            &self.rpc,
            &request.source_mint,
            &request.destination_mint,
        )
        .await?;

        debug!(
            "Resolved pool {} for {} -> {} (slippage tolerance {})",
            pool.address, request.source_mint, request.destination_mint, request.slippage
        );

        let source =
            token_account::ensure_token_account(&self.rpc, &self.wallet, &request.source_mint)
                .await?;
        let destination = token_account::ensure_token_account(
            &self.rpc,
            &self.wallet,
            &request.destination_mint,
        )
        .await?;

        // Orient the pool reserves to the direction of this swap.
        let (swap_source, swap_destination) = if pool.token_a_mint == request.source_mint {
            (pool.token_a, pool.token_b)
        } else {
            (pool.token_b, pool.token_a)
        };

        let instruction = swap(
            &spl_token_swap::id(),
            &spl_token::id(),
            &pool.address,
            &pool.authority,
            &self.wallet.pubkey(),
            &source,
            &swap_source,
            &swap_destination,
            &destination,
            &pool.pool_mint,
            &pool.fee_account,
            None,
            Swap {
                amount_in: request.amount_in,
                minimum_amount_out: request.minimum_amount_out,
            },
        )?;

        let blockhash = self.rpc.get_latest_blockhash().await?;
        let transaction = Transaction::new_signed_with_payer(
            &[instruction],
            Some(&self.wallet.pubkey()),
            &[self.wallet.as_ref()],
            blockhash,
        );

        let signature = self.rpc.send_and_confirm_transaction(&transaction).await?;
        info!("Swap executed successfully: {signature}");

        Ok(signature)
    }

    async fn token_balance(&self, mint: &Pubkey) -> Result<u64, SwapError> {
        let token_account =
            token_account::ensure_token_account(&self.rpc, &self.wallet, mint).await?;

        let balance = self.rpc.get_token_account_balance(&token_account).await?;

        Ok(balance.amount.parse()?)
    }
}
