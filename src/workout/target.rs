//! Target Resolver
//!
//! Turns the `@...` part of a step line into a [`Target`]: a heart-rate
//! zone (`z1`..`z5`) or a pace range `mm:ss-mm:ss`, per kilometer by
//! default, per mile with an `mpm` suffix. Pace bounds are stored in
//! seconds per kilometer with the faster pace first.

use once_cell::sync::Lazy;
use regex::Regex;

use super::duration::clock_to_seconds;
use super::error::ParseError;
use super::model::{Target, METERS_PER_MILE};

static ZONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^z(\d)$").expect("zone pattern is valid"));

static PACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\d+:\d+)\s*-\s*(\d+:\d+)\s*(mpm|mpk)?$").expect("pace pattern is valid")
});

/// Resolves a target token, with or without its leading `@`.
///
/// # Example
///
/// ```
/// use planparse::workout::{resolve_target, Target};
///
/// assert_eq!(resolve_target("@z2").unwrap(), Target::HeartRateZone { zone: 2 });
/// assert_eq!(
///     resolve_target("@5:00-4:30").unwrap(),
///     Target::PaceRange { low_sec_per_km: 270.0, high_sec_per_km: 300.0 }
/// );
/// ```
pub fn resolve_target(token: &str) -> Result<Target, ParseError> {
    let raw = token.trim();
    let body = raw.strip_prefix('@').unwrap_or(raw).trim();

    if let Some(caps) = ZONE_RE.captures(body) {
        let zone: u8 = caps[1]
            .parse()
            .map_err(|_| ParseError::target(raw, "zone must be 1-5"))?;
        if !(1..=5).contains(&zone) {
            return Err(ParseError::target(raw, "zone must be 1-5"));
        }
        return Ok(Target::HeartRateZone { zone });
    }

    let caps = PACE_RE
        .captures(body)
        .ok_or_else(|| ParseError::target(raw, "expected z1-z5 or mm:ss-mm:ss"))?;

    let first = clock_to_seconds(&caps[1]).map_err(|reason| ParseError::target(raw, reason))?;
    let second = clock_to_seconds(&caps[2]).map_err(|reason| ParseError::target(raw, reason))?;

    if first == 0 || second == 0 {
        return Err(ParseError::target(raw, "pace must be positive"));
    }

    let per_mile = caps
        .get(3)
        .map(|suffix| suffix.as_str().eq_ignore_ascii_case("mpm"))
        .unwrap_or(false);

    let to_sec_per_km = |seconds: u32| {
        if per_mile {
            seconds as f64 / (METERS_PER_MILE / 1000.0)
        } else {
            seconds as f64
        }
    };

    Ok(Target::pace_range(to_sec_per_km(first), to_sec_per_km(second)))
}
