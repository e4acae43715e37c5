use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MonitorError {
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),
}

/// Non-negative cutoff used both for overdue alerts and recent-activity windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "i64")]
pub struct Threshold(Duration);

impl Threshold {
    pub fn days(days: i64) -> Result<Self, MonitorError> {
        let duration = Duration::try_days(days).ok_or_else(|| {
            MonitorError::InvalidThreshold(format!("{} days is out of range", days))
        })?;
        Self::try_from(duration)
    }

    pub fn duration(&self) -> Duration {
        self.0
    }

    /// `now - threshold`, or `None` when that instant is not representable.
    pub fn cutoff(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        now.checked_sub_signed(self.0)
    }
}

impl TryFrom<Duration> for Threshold {
    type Error = MonitorError;

    fn try_from(duration: Duration) -> Result<Self, Self::Error> {
        if duration < Duration::zero() {
            return Err(MonitorError::InvalidThreshold(format!(
                "negative duration {}",
                duration
            )));
        }
        Ok(Self(duration))
    }
}

impl From<Threshold> for i64 {
    /// Serialized as whole seconds.
    fn from(threshold: Threshold) -> Self {
        threshold.0.num_seconds()
    }
}

/// The three cutoffs the dashboard works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Thresholds {
    pub wash_inactivity: Threshold,
    pub recent_window: Threshold,
    pub refill_gap: Threshold,
}

impl Thresholds {
    pub fn from_days(
        wash_inactivity: i64,
        recent_window: i64,
        refill_gap: i64,
    ) -> Result<Self, MonitorError> {
        Ok(Self {
            wash_inactivity: Threshold::days(wash_inactivity)?,
            recent_window: Threshold::days(recent_window)?,
            refill_gap: Threshold::days(refill_gap)?,
        })
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            wash_inactivity: Threshold(Duration::days(3)),
            recent_window: Threshold(Duration::days(7)),
            refill_gap: Threshold(Duration::days(30)),
        }
    }
}
