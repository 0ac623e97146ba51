// src/models.rs
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::range::TimeRange;

/// One token transfer as reported by the ledger indexer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEvent {
    pub timestamp_seconds: i64,
    pub from: String,
    pub to: String,
    pub raw_amount: String, // unscaled integer, kept as text until parsed
}

/// Cumulative net change at the start of one bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    #[serde(rename = "ts")]
    pub timestamp_ms: i64,
    pub value: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub start: Decimal,
    pub end: Decimal,
    pub change: Decimal,
    pub percent_change: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chart {
    pub range: TimeRange,
    pub points: Vec<ChartPoint>,
    pub summary: Summary,
}

/// Current holdings of the observed wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletSnapshot {
    pub public_key: String,
    pub token_symbol: String,
    pub balance: Decimal,
}
