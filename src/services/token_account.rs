//! Associated token account provisioning.

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use solana_sdk::transaction::Transaction;
use spl_associated_token_account::get_associated_token_address;
use spl_associated_token_account::instruction::create_associated_token_account;
use tracing::{debug, info};

use crate::error::SwapError;

/// Guarantee the wallet holds an associated token account for `mint`,
/// creating it on-chain when absent.
///
/// The address is derived deterministically from (wallet, mint), so calling
/// this twice performs at most one creation transaction; the second call
/// observes the existing account and returns immediately.
pub async fn ensure_token_account(
    rpc: &RpcClient,
    wallet: &Keypair,
    mint: &Pubkey,
) -> Result<Pubkey, SwapError> {
    let token_account = get_associated_token_address(&wallet.pubkey(), mint);

    match rpc.get_account(&token_account).await {
        Ok(_) => {
            debug!("Token account {token_account} already exists for mint {mint}");
            Ok(token_account)
        }
        Err(_) => {
            let instruction = create_associated_token_account(
                &wallet.pubkey(),
                &wallet.pubkey(),
                mint,
                &spl_token::id(),
            );

            let blockhash = rpc.get_latest_blockhash().await?;
            let transaction = Transaction::new_signed_with_payer(
                &[instruction],
                Some(&wallet.pubkey()),
                &[wallet],
                blockhash,
            );

            rpc.send_and_confirm_transaction(&transaction).await?;
            info!("Created token account {token_account} for mint {mint}");

            Ok(token_account)
        }
    }
}
