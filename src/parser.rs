// src/parser.rs
use alloy::primitives::U256;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::decimal::parse_amount;
use crate::models::TransferEvent;

/// Response envelope shared by every `module=account` action.
/// `result` is a list, a numeric string, or free-form error text.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub result: Value,
}

/// A `tokentx` row as sent by the indexer; every field is a string
#[derive(Debug, Deserialize)]
struct TokenTx {
    #[serde(rename = "timeStamp", default)]
    time_stamp: String,
    #[serde(default)]
    from: String,
    #[serde(default)]
    to: String,
    #[serde(default)]
    value: String,
}

/// Decode the `result` of a `tokentx` call.
///
/// Error text in place of the list means no transfers. Rows that are not
/// objects or whose timestamp is not an integer are skipped.
pub fn decode_transfers(envelope: &Envelope) -> Vec<TransferEvent> {
    let rows = match &envelope.result {
        Value::Array(rows) => rows,
        Value::String(text) => {
            debug!("tokentx returned text instead of rows: {} ({})", text, envelope.message);
            return Vec::new();
        }
        other => {
            warn!("Unexpected tokentx result shape: {}", other);
            return Vec::new();
        }
    };

    let mut skipped = 0usize;
    let events: Vec<TransferEvent> = rows
        .iter()
        .filter_map(|row| {
            let decoded = TokenTx::deserialize(row).ok().and_then(decode_row);
            if decoded.is_none() {
                skipped += 1;
            }
            decoded
        })
        .collect();

    if skipped > 0 {
        warn!("Skipped {} malformed transfer rows", skipped);
    }
    events
}

fn decode_row(tx: TokenTx) -> Option<TransferEvent> {
    let timestamp_seconds = tx.time_stamp.trim().parse::<i64>().ok()?;
    Some(TransferEvent {
        timestamp_seconds,
        from: tx.from,
        to: tx.to,
        raw_amount: tx.value,
    })
}

/// Decode the `result` of a `balance` / `tokenbalance` call. Anything but a
/// digit string is zero.
pub fn decode_quantity(envelope: &Envelope) -> U256 {
    match &envelope.result {
        Value::String(text) => parse_amount(text),
        _ => U256::ZERO,
    }
}
