use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::time::{Duration, Instant};

use alloy::primitives::U256;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Result;
use crate::models::TransferEvent;
use crate::rpc::LedgerSource;

/// Time-to-live memo table. Only successful loads are stored.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, (Instant, V)>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the fresh entry for `key` or run `load` and remember its result.
    /// The lock is not held while `load` runs.
    pub async fn get_or_load<F>(&self, key: K, load: F) -> Result<V>
    where
        F: Future<Output = Result<V>>,
    {
        {
            let entries = self.entries.lock().await;
            if let Some((stored_at, value)) = entries.get(&key) {
                if stored_at.elapsed() < self.ttl {
                    return Ok(value.clone());
                }
            }
        }

        let value = load.await?;
        let mut entries = self.entries.lock().await;
        entries.retain(|_, (stored_at, _)| stored_at.elapsed() < self.ttl);
        if !self.ttl.is_zero() {
            entries.insert(key, (Instant::now(), value.clone()));
        }
        Ok(value)
    }
}

/// Wraps a ledger source and memoizes each query for the configured TTL
pub struct CachedLedger<S> {
    inner: S,
    transfers: TtlCache<(String, String), Vec<TransferEvent>>,
    token_balances: TtlCache<(String, String), U256>,
    native_balances: TtlCache<String, U256>,
}

impl<S: LedgerSource> CachedLedger<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            transfers: TtlCache::new(ttl),
            token_balances: TtlCache::new(ttl),
            native_balances: TtlCache::new(ttl),
        }
    }
}

fn pair_key(address: &str, token: &str) -> (String, String) {
    (address.to_ascii_lowercase(), token.to_ascii_lowercase())
}

#[async_trait]
impl<S: LedgerSource> LedgerSource for CachedLedger<S> {
    async fn token_transfers(&self, address: &str, token: &str) -> Result<Vec<TransferEvent>> {
        debug!("transfers lookup {}:{}", address, token);
        self.transfers
            .get_or_load(pair_key(address, token), self.inner.token_transfers(address, token))
            .await
    }

    async fn token_balance(&self, address: &str, token: &str) -> Result<U256> {
        self.token_balances
            .get_or_load(pair_key(address, token), self.inner.token_balance(address, token))
            .await
    }

    async fn native_balance(&self, address: &str) -> Result<U256> {
        self.native_balances
            .get_or_load(address.to_ascii_lowercase(), self.inner.native_balance(address))
            .await
    }
}
