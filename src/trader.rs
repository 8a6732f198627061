//! The buy/sell trading cycle.
//!
//! Runs forever: four buys of a fixed SOL amount with a random pause after
//! each, one sell of 99% of the accumulated token balance, then a fixed
//! cooldown. Individual swap failures are logged and the cycle proceeds;
//! a failed balance query in the sell step is fatal.

use std::ops::RangeInclusive;
use std::time::Duration;

use rand::Rng;
use solana_sdk::native_token::LAMPORTS_PER_SOL;
use solana_sdk::pubkey::Pubkey;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::SwapError;
use crate::services::swap_engine::{SwapRequest, SwapVenue};

/// Asset identifier the swap path uses for native SOL.
pub const NATIVE_SOL: Pubkey = Pubkey::new_from_array([0u8; 32]);

/// Buys per cycle before the sell
const BUYS_PER_CYCLE: usize = 4;

/// Fraction of the token balance sold back each cycle
const SELL_FRACTION: f64 = 0.99;

/// Cycle timing, separated from the trade parameters so tests can run
/// cycles without real waits.
#[derive(Debug, Clone)]
pub struct TraderPacing {
    /// Uniform range of the pause after each buy, in seconds
    pub buy_delay_secs: RangeInclusive<u64>,
    /// Fixed pause between cycles
    pub cooldown: Duration,
}

impl Default for TraderPacing {
    fn default() -> Self {
        Self {
            buy_delay_secs: 10..=20,
            cooldown: Duration::from_secs(20),
        }
    }
}

/// Drives the trading cycle against a [`SwapVenue`].
pub struct Trader<V> {
    venue: V,
    config: Config,
    pacing: TraderPacing,
}

impl<V: SwapVenue> Trader<V> {
    pub fn new(venue: V, config: Config) -> Self {
        Self {
            venue,
            config,
            pacing: TraderPacing::default(),
        }
    }

    #[cfg(test)]
    fn with_pacing(venue: V, config: Config, pacing: TraderPacing) -> Self {
        Self {
            venue,
            config,
            pacing,
        }
    }

    /// Run trading cycles until the process is killed.
    pub async fn run(&self) -> Result<(), SwapError> {
        loop {
            info!("Starting a new trading cycle...");
            self.run_cycle().await?;
        }
    }

    async fn run_cycle(&self) -> Result<(), SwapError> {
        for _ in 0..BUYS_PER_CYCLE {
            self.buy().await;

            let delay = rand::thread_rng().gen_range(self.pacing.buy_delay_secs.clone());
            sleep(Duration::from_secs(delay)).await;
        }

        self.sell().await?;

        info!(
            "Waiting {} seconds before the next cycle...",
            self.pacing.cooldown.as_secs()
        );
        sleep(self.pacing.cooldown).await;

        Ok(())
    }

    /// One buy of the configured SOL amount. Failures are logged; the cycle
    /// continues regardless.
    async fn buy(&self) {
        let amount = self.config.swap_amount;
        info!(
            "Buying token with {} SOL...",
            amount as f64 / LAMPORTS_PER_SOL as f64
        );

        let request = SwapRequest {
            source_mint: NATIVE_SOL,
            destination_mint: self.config.token_mint,
            amount_in: amount,
            slippage: self.config.slippage,
            minimum_amount_out: self.config.min_amount_out,
        };

        if let Err(e) = self.venue.swap(&request).await {
            error!("Buy failed: {e}");
        }
    }

    /// Sell 99% of the current token balance back to SOL. A zero computed
    /// amount skips the swap; a failed balance query propagates.
    async fn sell(&self) -> Result<(), SwapError> {
        info!("Selling token back to SOL...");

        let balance = self.venue.token_balance(&self.config.token_mint).await?;
        let amount = sell_amount(balance, SELL_FRACTION);

        if amount == 0 {
            warn!("No tokens to sell or calculated sell amount is zero");
            return Ok(());
        }

        let request = SwapRequest {
            source_mint: self.config.token_mint,
            destination_mint: NATIVE_SOL,
            amount_in: amount,
            slippage: self.config.slippage,
            minimum_amount_out: self.config.min_amount_out,
        };

        if let Err(e) = self.venue.swap(&request).await {
            error!("Sell failed: {e}");
        }

        Ok(())
    }
}

/// Portion of `balance` to sell, rounded down.
fn sell_amount(balance: u64, fraction: f64) -> u64 {
    (balance as f64 * fraction).floor() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use solana_sdk::signature::Signature;
    use std::sync::Arc;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Buy(u64),
        BalanceQuery,
        Sell(u64),
    }

    struct MockVenue {
        calls: Mutex<Vec<Call>>,
        balance: u64,
        fail_swaps: bool,
    }

    impl MockVenue {
        fn new(balance: u64, fail_swaps: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                balance,
                fail_swaps,
            })
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SwapVenue for MockVenue {
        async fn swap(&self, request: &SwapRequest) -> Result<Signature, SwapError> {
            let call = if request.destination_mint == NATIVE_SOL {
                Call::Sell(request.amount_in)
            } else {
                Call::Buy(request.amount_in)
            };
            self.calls.lock().unwrap().push(call);

            if self.fail_swaps {
                Err(SwapError::PoolNotFound(
                    request.source_mint,
                    request.destination_mint,
                ))
            } else {
                Ok(Signature::default())
            }
        }

        async fn token_balance(&self, _mint: &Pubkey) -> Result<u64, SwapError> {
            self.calls.lock().unwrap().push(Call::BalanceQuery);
            Ok(self.balance)
        }
    }

    fn test_config() -> Config {
        Config {
            rpc_endpoint: "http://localhost:8899".to_string(),
            token_mint: Pubkey::new_unique(),
            wallet_path: "wallet.json".to_string(),
            slippage: 0.01,
            swap_amount: 100_000_000,
            min_amount_out: 1_000_000,
        }
    }

    fn instant_pacing() -> TraderPacing {
        TraderPacing {
            buy_delay_secs: 0..=0,
            cooldown: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn cycle_runs_four_buys_then_one_sell() {
        let venue = MockVenue::new(1_000, false);
        let trader = Trader::with_pacing(Arc::clone(&venue), test_config(), instant_pacing());

        trader.run_cycle().await.unwrap();

        assert_eq!(
            venue.calls(),
            vec![
                Call::Buy(100_000_000),
                Call::Buy(100_000_000),
                Call::Buy(100_000_000),
                Call::Buy(100_000_000),
                Call::BalanceQuery,
                Call::Sell(990),
            ]
        );
    }

    #[tokio::test]
    async fn swap_failures_do_not_change_the_cycle_shape() {
        let venue = MockVenue::new(500, true);
        let trader = Trader::with_pacing(Arc::clone(&venue), test_config(), instant_pacing());

        trader.run_cycle().await.unwrap();

        let calls = venue.calls();
        let buys = calls.iter().filter(|c| matches!(c, Call::Buy(_))).count();
        let sells = calls.iter().filter(|c| matches!(c, Call::Sell(_))).count();
        assert_eq!(buys, 4);
        assert_eq!(sells, 1);
    }

    #[tokio::test]
    async fn zero_balance_skips_the_sell() {
        let venue = MockVenue::new(0, false);
        let trader = Trader::with_pacing(Arc::clone(&venue), test_config(), instant_pacing());

        trader.run_cycle().await.unwrap();

        let calls = venue.calls();
        assert_eq!(calls.last(), Some(&Call::BalanceQuery));
        assert!(!calls.iter().any(|c| matches!(c, Call::Sell(_))));
    }

    #[test]
    fn sell_amount_rounds_down() {
        assert_eq!(sell_amount(1_000, 0.99), 990);
        assert_eq!(sell_amount(101, 0.99), 99);
        assert_eq!(sell_amount(1, 0.99), 0);
        assert_eq!(sell_amount(0, 0.99), 0);
    }
}
