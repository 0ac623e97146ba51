use alloy::primitives::Address;
use chrono::Utc;
use tracing::info;

use crate::aggregator;
use crate::config::TokenConfig;
use crate::decimal::format_units;
use crate::error::{Error, Result};
use crate::models::{Chart, Summary, WalletSnapshot};
use crate::range::TimeRange;
use crate::rpc::LedgerSource;

const NATIVE_DECIMALS: i32 = 18;
const NATIVE_SYMBOL: &str = "ETH";

/// The observed wallet, its charted token and the ledger behind them
pub struct Portfolio<L> {
    ledger: L,
    wallet: String,
    token: Option<TokenConfig>,
}

impl<L: LedgerSource> Portfolio<L> {
    pub fn new(ledger: L, wallet: Address, token: Option<TokenConfig>) -> Self {
        Self {
            ledger,
            wallet: wallet.to_string(),
            token,
        }
    }

    fn token(&self) -> Result<&TokenConfig> {
        self.token.as_ref().ok_or(Error::TokenNotConfigured)
    }

    /// Net-change chart of the token for one range ending at `now_ms`
    pub async fn chart(&self, range: TimeRange, now_ms: i64) -> Result<Chart> {
        let token = self.token()?;
        let transfers = self
            .ledger
            .token_transfers(&self.wallet, &token.address.to_string())
            .await?;
        Ok(aggregator::aggregate(
            &transfers,
            &self.wallet,
            token.decimals,
            range,
            now_ms,
        ))
    }

    /// One chart per range, all built from a single transfer fetch
    pub async fn charts(&self, now_ms: i64) -> Result<Vec<Chart>> {
        let token = self.token()?;
        let transfers = self
            .ledger
            .token_transfers(&self.wallet, &token.address.to_string())
            .await?;
        Ok(TimeRange::VARIANTS
            .into_iter()
            .map(|range| aggregator::aggregate(&transfers, &self.wallet, token.decimals, range, now_ms))
            .collect())
    }

    pub async fn today_summary(&self, now_ms: i64) -> Result<Summary> {
        Ok(self.chart(TimeRange::OneDay, now_ms).await?.summary)
    }

    /// Current balance: the configured token, or the native coin without one
    pub async fn snapshot(&self) -> Result<WalletSnapshot> {
        let (token_symbol, balance) = match &self.token {
            Some(token) => {
                let raw = self
                    .ledger
                    .token_balance(&self.wallet, &token.address.to_string())
                    .await?;
                (token.symbol.clone(), format_units(raw, token.decimals))
            }
            None => {
                let raw = self.ledger.native_balance(&self.wallet).await?;
                (NATIVE_SYMBOL.to_string(), format_units(raw, NATIVE_DECIMALS))
            }
        };

        info!("Wallet {} holds {} {}", self.wallet, balance, token_symbol);
        Ok(WalletSnapshot {
            public_key: self.wallet.clone(),
            token_symbol,
            balance,
        })
    }
}

/// Wall-clock "now", read once per request
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
