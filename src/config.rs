use std::env;
use std::time::Duration;

use alloy::primitives::Address;
use dotenvy::dotenv;
use eyre::{eyre, Result, WrapErr};

use crate::rpc::base_url_for_chain;

#[derive(Clone)]
pub struct Config {
    pub etherscan_api_key: String,
    pub etherscan_base_url: String,
    pub chain_id: u64,
    pub wallet: Address,
    pub token: Option<TokenConfig>,
    pub cache_ttl: Duration,
    pub port: u16,
}

/// The asset charted for the wallet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    pub address: Address,
    pub decimals: i32,
    pub symbol: String,
}

pub fn load() -> Result<Config> {
    dotenv().ok(); // .env is optional
    from_lookup(|name| env::var(name).ok())
}

/// Build the configuration from a variable lookup.
pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Config> {
    let non_empty = |name: &str| var(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let required = |name: &str| non_empty(name).ok_or_else(|| eyre!("Missing env: {}", name));

    let etherscan_api_key = required("ETHERSCAN_API_KEY")?;

    let wallet = required("WALLET_PUBLIC_KEY")?
        .parse::<Address>()
        .wrap_err("WALLET_PUBLIC_KEY is not an address")?;

    // Chain id only picks the indexer host (default: mainnet)
    let chain_id = non_empty("CHAIN_ID")
        .and_then(|v| v.parse().ok())
        .unwrap_or(1);

    let etherscan_base_url = non_empty("ETHERSCAN_BASE_URL")
        .unwrap_or_else(|| base_url_for_chain(chain_id).to_string());

    let token = match non_empty("TOKEN_ADDRESS") {
        Some(raw) => Some(TokenConfig {
            address: raw
                .parse::<Address>()
                .wrap_err("TOKEN_ADDRESS is not an address")?,
            decimals: non_empty("TOKEN_DECIMALS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(18),
            symbol: non_empty("TOKEN_SYMBOL").unwrap_or_else(|| "TOKEN".to_string()),
        }),
        None => None,
    };

    // Ledger cache lifetime (default: 60s)
    let cache_ttl = Duration::from_secs(
        non_empty("CACHE_TTL_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(60),
    );

    let port = non_empty("PORT")
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080);

    Ok(Config {
        etherscan_api_key,
        etherscan_base_url,
        chain_id,
        wallet,
        token,
        cache_ttl,
        port,
    })
}
