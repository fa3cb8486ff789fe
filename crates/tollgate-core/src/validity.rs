use std::time::{SystemTime, UNIX_EPOCH};

use regex::Regex;

use crate::config::TokenConfig;
use crate::error::TokenError;

/// Start of the validity window. `Now` resolves to the wall clock at the
/// moment of each generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartTime {
    Now,
    Explicit(u64),
}

/// Current UTC time in whole unix seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

/// Resolve `(start, end)` of the validity window in unix seconds.
///
/// Re-evaluated on every generation call so `StartTime::Now` reflects call
/// time rather than configuration time.
pub fn resolve_window(config: &TokenConfig) -> Result<(Option<u64>, u64), TokenError> {
    let start = match config.start_time() {
        Some(StartTime::Now) => Some(unix_now()),
        Some(StartTime::Explicit(0)) => return Err(TokenError::InvalidStartTime),
        Some(StartTime::Explicit(secs)) => Some(secs),
        None => None,
    };

    let end = match config.end_time() {
        Some(0) => return Err(TokenError::InvalidEndTime),
        Some(end) => end,
        None => match config.window_seconds() {
            Some(window) if window > 0 => start.unwrap_or_else(unix_now).saturating_add(window),
            _ => return Err(TokenError::MissingExpiry),
        },
    };

    if let Some(start) = start {
        if end <= start {
            return Err(TokenError::AlreadyExpired);
        }
    }

    Ok((start, end))
}

/// Parse a start time given as `now` or absolute unix seconds.
pub fn parse_start_time(input: &str) -> Result<StartTime, TokenError> {
    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case("now") {
        return Ok(StartTime::Now);
    }
    trimmed
        .parse::<u64>()
        .map(StartTime::Explicit)
        .map_err(|_| TokenError::InvalidStartTime)
}

/// Parse a validity window given as raw seconds or a suffixed duration
/// (`300`, `5m`, `4h`, `2d`, `1w`).
pub fn parse_window_seconds(input: &str) -> Result<u64, TokenError> {
    let trimmed = input.trim();
    if let Ok(secs) = trimmed.parse::<u64>() {
        return Ok(secs);
    }
    let re = Regex::new(r"^([0-9]+)([smhdw])$").unwrap();
    if let Some(caps) = re.captures(trimmed) {
        let value: u64 = caps[1].parse().map_err(|_| TokenError::MissingExpiry)?;
        let multiplier = match &caps[2] {
            "s" => 1,
            "m" => 60,
            "h" => 60 * 60,
            "d" => 60 * 60 * 24,
            "w" => 60 * 60 * 24 * 7,
            _ => 1,
        };
        return Ok(value.saturating_mul(multiplier));
    }
    Err(TokenError::MissingExpiry)
}
