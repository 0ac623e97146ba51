//! In-memory ledger for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use alloy::primitives::U256;
use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::TransferEvent;
use crate::rpc::LedgerSource;

#[derive(Default)]
pub struct FakeLedger {
    pub transfers: Vec<TransferEvent>,
    pub token_balance: U256,
    pub native_balance: U256,
    /// HTTP status to fail every call with
    pub fail_with: Option<u16>,
    pub calls: Arc<AtomicUsize>,
}

impl FakeLedger {
    fn answer<T>(&self, value: T) -> Result<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_with {
            Some(status) => Err(Error::UpstreamStatus(status)),
            None => Ok(value),
        }
    }
}

#[async_trait]
impl LedgerSource for FakeLedger {
    async fn token_transfers(&self, _address: &str, _token: &str) -> Result<Vec<TransferEvent>> {
        self.answer(self.transfers.clone())
    }

    async fn token_balance(&self, _address: &str, _token: &str) -> Result<U256> {
        self.answer(self.token_balance)
    }

    async fn native_balance(&self, _address: &str) -> Result<U256> {
        self.answer(self.native_balance)
    }
}
