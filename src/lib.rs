//! Net balance-change charts for a single wallet, built from the token
//! transfers reported by a ledger indexer.

pub mod aggregator;
pub mod api;
pub mod cache;
pub mod config;
pub mod decimal;
pub mod error;
pub mod models;
pub mod parser;
pub mod portfolio;
pub mod range;
pub mod rpc;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregator::aggregate;
pub use error::{Error, Result};
pub use models::{Chart, ChartPoint, Summary, TransferEvent, WalletSnapshot};
pub use range::{BucketWindow, TimeRange};
