use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

const HOUR_MS: i64 = 60 * 60 * 1000;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Named chart ranges. Each one maps to a fixed window and bucket count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1H")]
    OneHour,
    #[serde(rename = "6H")]
    SixHours,
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
    All,
}

impl TimeRange {
    pub const VARIANTS: [TimeRange; 6] = [
        TimeRange::OneHour,
        TimeRange::SixHours,
        TimeRange::OneDay,
        TimeRange::OneWeek,
        TimeRange::OneMonth,
        TimeRange::All,
    ];

    pub fn key(self) -> &'static str {
        match self {
            TimeRange::OneHour => "1H",
            TimeRange::SixHours => "6H",
            TimeRange::OneDay => "1D",
            TimeRange::OneWeek => "1W",
            TimeRange::OneMonth => "1M",
            TimeRange::All => "All",
        }
    }

    pub fn window_ms(self) -> i64 {
        match self {
            TimeRange::OneHour => HOUR_MS,
            TimeRange::SixHours => 6 * HOUR_MS,
            TimeRange::OneDay => DAY_MS,
            TimeRange::OneWeek => 7 * DAY_MS,
            TimeRange::OneMonth => 30 * DAY_MS,
            TimeRange::All => 365 * DAY_MS,
        }
    }

    pub fn bucket_count(self) -> usize {
        match self {
            TimeRange::OneHour => 24,
            TimeRange::SixHours => 36,
            TimeRange::OneDay => 36,
            TimeRange::OneWeek => 42,
            TimeRange::OneMonth => 60,
            TimeRange::All => 80,
        }
    }

    /// Bucket layout for a window ending at `now_ms`.
    pub fn window(self, now_ms: i64) -> BucketWindow {
        let window_ms = self.window_ms();
        let bucket_count = self.bucket_count();
        BucketWindow {
            start_ms: now_ms.saturating_sub(window_ms),
            step_ms: window_ms / bucket_count as i64,
            bucket_count,
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for TimeRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeRange::VARIANTS
            .into_iter()
            .find(|r| r.key() == s)
            .ok_or_else(|| Error::InvalidRange(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketWindow {
    pub start_ms: i64,
    pub step_ms: i64,
    pub bucket_count: usize,
}

impl BucketWindow {
    /// Bucket for a timestamp, or `None` when it precedes the window.
    /// Anything past the last bucket is clamped into it.
    pub fn bucket_for(&self, timestamp_ms: i64) -> Option<usize> {
        if timestamp_ms < self.start_ms {
            return None;
        }
        let offset = timestamp_ms.saturating_sub(self.start_ms) / self.step_ms;
        let last = self.bucket_count.saturating_sub(1);
        Some(usize::try_from(offset).map_or(last, |i| i.min(last)))
    }

    pub fn bucket_start(&self, index: usize) -> i64 {
        self.start_ms + index as i64 * self.step_ms
    }
}
