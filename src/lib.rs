//! # League Standings
//!
//! Season standings, playoff badges and draft tracking for a hockey league.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (teams, games, records, draft classes)
//! - **calculate**: Record aggregation, points and ranking
//! - **storage**: JSONL document store behind the `LeagueStore` trait
//! - **cache**: Expiring snapshot cache
//! - **service**: Cached standings loading and playoff status updates
//! - **draft**: Pick generation and turn advancement
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod cache;
pub mod calculate;
pub mod config;
pub mod draft;
pub mod models;
pub mod service;
pub mod storage;

pub use models::*;

use chrono::Duration;

/// Parse a human-friendly duration string (e.g., "6h", "30m", "90s").
pub fn parse_ttl(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        // Default to seconds
        (s, 1)
    };

    let num: i64 = num_str.trim().parse().ok()?;
    if num < 0 {
        return None;
    }
    Duration::try_seconds(num.checked_mul(multiplier)?)
}
