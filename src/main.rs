use std::sync::Arc;

use balance_chart::cache::CachedLedger;
use balance_chart::portfolio::Portfolio;
use balance_chart::rpc::EtherscanClient;
use balance_chart::{api, config};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stdout)
        .with_target(false)
        .init();

    info!("Balance chart service starting...");

    let cfg = config::load()?;
    info!("Loaded config:");
    info!("  Indexer: {} (chain {})", cfg.etherscan_base_url, cfg.chain_id);
    info!("  Wallet: {}", cfg.wallet);
    match &cfg.token {
        Some(token) => info!(
            "  Token: {} {} ({} decimals)",
            token.symbol, token.address, token.decimals
        ),
        None => info!("  Token: none, reporting native balance only"),
    }
    info!("  Cache TTL: {:?}", cfg.cache_ttl);
    info!("  Port: {}", cfg.port);

    let client = EtherscanClient::new(cfg.etherscan_base_url.clone(), cfg.etherscan_api_key.clone())?;
    let ledger = CachedLedger::new(client, cfg.cache_ttl);
    let portfolio = Arc::new(Portfolio::new(ledger, cfg.wallet, cfg.token.clone()));

    let api_handle = tokio::spawn({
        let portfolio = Arc::clone(&portfolio);
        async move { api::serve(cfg.port, portfolio).await }
    });

    // Graceful shutdown
    tokio::select! {
        res = api_handle => match res {
            Ok(Ok(_)) => info!("API exited cleanly"),
            Ok(Err(e)) => error!("API error: {:?}", e),
            Err(e) => error!("API task panicked: {:?}", e),
        },
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received, stopping...");
        }
    }

    info!("Balance chart service stopped.");
    Ok(())
}
