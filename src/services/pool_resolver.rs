//! Token Swap pool lookup.
//!
//! Pools live as program accounts owned by the SPL Token Swap program; they
//! are fetched fresh on every swap attempt and never cached locally. One
//! program scan yields the full pool record (reserves, mints, fee account,
//! derived authority), which the swap engine reuses for instruction
//! construction.

use solana_account_decoder::UiAccountEncoding;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::RpcFilterType;
use solana_sdk::pubkey::Pubkey;
use spl_token_swap::state::{SwapState, SwapVersion};
use tracing::debug;

use crate::error::SwapError;

/// Everything a swap instruction needs to know about one pool.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolRecord {
    pub address: Pubkey,
    /// Program-derived authority over the pool's reserve accounts
    pub authority: Pubkey,
    /// Reserve account holding the A-side tokens
    pub token_a: Pubkey,
    /// Reserve account holding the B-side tokens
    pub token_b: Pubkey,
    pub pool_mint: Pubkey,
    pub token_a_mint: Pubkey,
    pub token_b_mint: Pubkey,
    pub fee_account: Pubkey,
}

/// Decode one packed pool account into a [`PoolRecord`].
///
/// The authority is not stored in the account; it is re-derived from the
/// pool address and the stored bump seed.
pub fn decode_pool(address: Pubkey, data: &[u8]) -> Result<PoolRecord, SwapError> {
    let state = SwapVersion::unpack(data)?;

    let authority = Pubkey::create_program_address(
        &[address.as_ref(), &[state.bump_seed()]],
        &spl_token_swap::id(),
    )?;

    Ok(PoolRecord {
        address,
        authority,
        token_a: *state.token_a_account(),
        token_b: *state.token_b_account(),
        pool_mint: *state.pool_mint(),
        token_a_mint: *state.token_a_mint(),
        token_b_mint: *state.token_b_mint(),
        fee_account: *state.pool_fee_account(),
    })
}

/// Fetch every pool account of the expected packed size from the Token Swap
/// program. Accounts that fail to decode are skipped.
pub async fn fetch_pools(rpc: &RpcClient) -> Result<Vec<PoolRecord>, SwapError> {
    let config = RpcProgramAccountsConfig {
        filters: Some(vec![RpcFilterType::DataSize(SwapVersion::LATEST_LEN as u64)]),
        account_config: RpcAccountInfoConfig {
            encoding: Some(UiAccountEncoding::Base64),
            ..RpcAccountInfoConfig::default()
        },
        ..RpcProgramAccountsConfig::default()
    };

    let accounts = rpc
        .get_program_accounts_with_config(&spl_token_swap::id(), config)
        .await?;

    let pools = accounts
        .into_iter()
        .filter_map(|(address, account)| match decode_pool(address, &account.data) {
            Ok(pool) => Some(pool),
            Err(e) => {
                debug!("Skipping undecodable pool account {address}: {e}");
                None
            }
        })
        .collect();

    Ok(pools)
}

/// Linear scan for the pool trading the given mint pair, in either order.
pub fn find_pool<'a>(
    pools: &'a [PoolRecord],
    source_mint: &Pubkey,
    destination_mint: &Pubkey,
) -> Option<&'a PoolRecord> {
    pools.iter().find(|p| {
        (p.token_a_mint == *source_mint && p.token_b_mint == *destination_mint)
            || (p.token_a_mint == *destination_mint && p.token_b_mint == *source_mint)
    })
}

/// Resolve the unique pool for a mint pair with a single program scan.
pub async fn resolve(
    rpc: &RpcClient,
    source_mint: &Pubkey,
    destination_mint: &Pubkey,
) -> Result<PoolRecord, SwapError> {
    let pools = fetch_pools(rpc).await?;

    find_pool(&pools, source_mint, destination_mint)
        .cloned()
        .ok_or(SwapError::PoolNotFound(*source_mint, *destination_mint))
}
