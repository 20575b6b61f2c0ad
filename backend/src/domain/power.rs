//! Power consumption derived from the battery monitor's charge counter.
//!
//! The counter only grows while the device stays powered. A power cycle
//! resets it close to zero, so a window whose last reading is below its first
//! cannot be summarised and yields no summary rather than a negative figure.

use serde::{Deserialize, Serialize};

use super::PowerReading;

/// Charge consumed across a time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerSummary {
    /// Counter value at the first usable reading.
    pub start_mah: f64,
    /// Counter value at the last usable reading.
    pub end_mah: f64,
    /// `end_mah - start_mah`.
    pub consumed_mah: f64,
    /// Number of readings carrying a counter value.
    pub reading_count: usize,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Summarise `readings`, which must already be ordered by timestamp.
///
/// Returns `None` when fewer than two readings carry a counter value or the
/// counter went backwards inside the window.
///
/// # Examples
/// ```
/// use backend::domain::{IdentityId, PowerReading, compute_power_delta};
/// use chrono::{TimeZone, Utc};
///
/// let reading = |secs, mah| PowerReading {
///     identity_id: IdentityId::new("id-1").expect("id"),
///     timestamp: Utc.timestamp_opt(secs, 0).single().expect("timestamp"),
///     milliamp_hours: Some(mah),
///     voltage: None,
///     temperature: None,
/// };
/// let summary = compute_power_delta(&[reading(0, 10.0), reading(60, 15.0)]).expect("summary");
/// assert_eq!(summary.consumed_mah, 5.0);
/// assert!(compute_power_delta(&[reading(0, 90.0), reading(60, 5.0)]).is_none());
/// ```
pub fn compute_power_delta(readings: &[PowerReading]) -> Option<PowerSummary> {
    let counters: Vec<f64> = readings
        .iter()
        .filter_map(|reading| reading.milliamp_hours)
        .collect();
    if counters.len() < 2 {
        return None;
    }
    let (first, last) = (*counters.first()?, *counters.last()?);
    let consumed = last - first;
    if consumed < 0.0 {
        return None;
    }

    Some(PowerSummary {
        start_mah: round2(first),
        end_mah: round2(last),
        consumed_mah: round2(consumed),
        reading_count: counters.len(),
    })
}
