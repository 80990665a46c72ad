//! Duration Resolver
//!
//! Turns the duration token of a step line into a [`Duration`]:
//!
//! - `lap-button` (any case)
//! - `mm:ss` where minutes may run past 59 (`225:00` is 3h45m)
//! - `<number><unit>` with unit `km`, `mi`, `m` (also `kilometers`,
//!   `miles`, `meters`, `yd`, `yds`)

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::ParseError;
use super::model::{Duration, METERS_PER_MILE, METERS_PER_YARD};

static CLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+):(\d{2})$").expect("clock pattern is valid"));

static DISTANCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\d+(?:\.\d+)?)\s*(km|kilometers|mi|miles|m|meters|yds|yd)$")
        .expect("distance pattern is valid")
});

/// Parses `mm:ss` into whole seconds.
///
/// Shared with the target resolver, where pace bounds use the same shape.
pub(crate) fn clock_to_seconds(token: &str) -> Result<u32, &'static str> {
    let caps = CLOCK_RE.captures(token).ok_or("expected mm:ss")?;

    let minutes: u32 = caps[1].parse().map_err(|_| "minutes out of range")?;
    let seconds: u32 = caps[2].parse().map_err(|_| "seconds out of range")?;

    if seconds >= 60 {
        return Err("seconds must be below 60");
    }

    minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .ok_or("minutes out of range")
}

/// Resolves a trimmed duration token.
///
/// # Example
///
/// ```
/// use planparse::workout::{resolve_duration, Duration};
///
/// assert_eq!(resolve_duration("30:00").unwrap(), Duration::Timed { seconds: 1800 });
/// assert_eq!(resolve_duration("46km").unwrap(), Duration::Distance { meters: 46000.0 });
/// assert_eq!(resolve_duration("lap-button").unwrap(), Duration::LapButton);
/// ```
pub fn resolve_duration(token: &str) -> Result<Duration, ParseError> {
    let token = token.trim();

    if token.is_empty() {
        return Err(ParseError::duration(token, "missing duration"));
    }

    if token.eq_ignore_ascii_case("lap-button") {
        return Ok(Duration::LapButton);
    }

    if token.contains(':') {
        let seconds =
            clock_to_seconds(token).map_err(|reason| ParseError::duration(token, reason))?;
        if seconds == 0 {
            return Err(ParseError::duration(token, "duration must be positive"));
        }
        return Ok(Duration::Timed { seconds });
    }

    let caps = DISTANCE_RE
        .captures(token)
        .ok_or_else(|| ParseError::duration(token, "unrecognized duration"))?;

    let value: f64 = caps[1]
        .parse()
        .map_err(|_| ParseError::duration(token, "invalid number"))?;

    let factor = match caps[2].to_lowercase().as_str() {
        "km" | "kilometers" => 1000.0,
        "mi" | "miles" => METERS_PER_MILE,
        "m" | "meters" => 1.0,
        _ => METERS_PER_YARD,
    };

    let meters = value * factor;
    if meters <= 0.0 || !meters.is_finite() {
        return Err(ParseError::duration(token, "distance must be positive"));
    }

    Ok(Duration::Distance { meters })
}
