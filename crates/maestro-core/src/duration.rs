use crate::error::{MaestroError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3600;

/// Elapsed time, normalized to whole seconds.
///
/// In YAML a duration is written as a map of optional parts, e.g.
/// `{ hours: 1, minutes: 30 }`. Parts may exceed their natural range
/// (`{ minutes: 90 }` is the same as `{ hours: 1, minutes: 30 }`), but
/// none may be negative.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "DurationParts", into = "DurationParts")]
pub struct Duration {
    total_seconds: u64,
}

impl Duration {
    pub const ZERO: Duration = Duration { total_seconds: 0 };

    /// Build a duration from hours, minutes and seconds. Negative parts are
    /// rejected rather than clamped.
    pub fn from_parts(hours: i64, minutes: i64, seconds: i64) -> Result<Self> {
        let hours = non_negative("hours", hours)?;
        let minutes = non_negative("minutes", minutes)?;
        let seconds = non_negative("seconds", seconds)?;

        hours
            .checked_mul(SECONDS_PER_HOUR)
            .and_then(|h| {
                minutes
                    .checked_mul(SECONDS_PER_MINUTE)
                    .and_then(|m| h.checked_add(m))
            })
            .and_then(|hm| hm.checked_add(seconds))
            .map(Self::from_seconds)
            .ok_or_else(|| {
                MaestroError::InvalidDuration(format!(
                    "{hours}h {minutes}m {seconds}s does not fit in a duration"
                ))
            })
    }

    pub const fn from_seconds(seconds: u64) -> Self {
        Self {
            total_seconds: seconds,
        }
    }

    pub const fn from_minutes(minutes: u64) -> Self {
        Self::from_seconds(minutes.saturating_mul(SECONDS_PER_MINUTE))
    }

    pub const fn from_hours(hours: u64) -> Self {
        Self::from_seconds(hours.saturating_mul(SECONDS_PER_HOUR))
    }

    pub const fn total_seconds(self) -> u64 {
        self.total_seconds
    }

    /// `a + b`. Fails instead of wrapping or clamping when the result does
    /// not fit.
    pub fn sum(a: Duration, b: Duration) -> Result<Duration> {
        a.total_seconds
            .checked_add(b.total_seconds)
            .map(Duration::from_seconds)
            .ok_or_else(|| {
                MaestroError::InvalidDuration(format!("{a} + {b} does not fit in a duration"))
            })
    }

    pub const fn hours(self) -> u64 {
        self.total_seconds / SECONDS_PER_HOUR
    }

    pub const fn minutes(self) -> u64 {
        (self.total_seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE
    }

    pub const fn seconds(self) -> u64 {
        self.total_seconds % SECONDS_PER_MINUTE
    }
}

fn non_negative(name: &str, value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| {
        MaestroError::InvalidDuration(format!("{name} must not be negative, got {value}"))
    })
}

/// `H:MM:SS`, hours unpadded.
impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{:02}:{:02}",
            self.hours(),
            self.minutes(),
            self.seconds()
        )
    }
}

// ---------------------------------------------------------------------------
// YAML form
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct DurationParts {
    #[serde(default, skip_serializing_if = "is_zero")]
    hours: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    minutes: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    seconds: i64,
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}

impl TryFrom<DurationParts> for Duration {
    type Error = MaestroError;

    fn try_from(parts: DurationParts) -> Result<Self> {
        Duration::from_parts(parts.hours, parts.minutes, parts.seconds)
    }
}

impl From<Duration> for DurationParts {
    fn from(d: Duration) -> Self {
        // Any duration built through from_parts fits in i64 seconds; saturate
        // the rest instead of wrapping.
        let clamp = |v: u64| i64::try_from(v).unwrap_or(i64::MAX);
        Self {
            hours: clamp(d.hours()),
            minutes: clamp(d.minutes()),
            seconds: clamp(d.seconds()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
