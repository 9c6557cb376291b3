// --- File: crates/slotwise_planner/src/interval.rs ---
use crate::error::PlannerError;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;

/// A half-open span of time `[start, end)` with `start < end`.
///
/// Instances are immutable; every operation that changes the bounds returns a
/// new interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TimeInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeInterval {
    /// Fails with a validation error unless `start < end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, PlannerError> {
        if start >= end {
            return Err(PlannerError::validation(format!(
                "interval start {start} must be before end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// True iff the two intervals share at least one instant.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True iff one interval ends exactly where the other starts.
    pub fn abuts(&self, other: &TimeInterval) -> bool {
        self.end == other.start || other.end == self.start
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Expands both ends by `buffer`.
    pub fn with_buffer(&self, buffer: Duration) -> Result<Self, PlannerError> {
        if buffer < Duration::zero() {
            return Err(PlannerError::validation(format!(
                "buffer must not be negative, got {} minutes",
                buffer.num_minutes()
            )));
        }
        Ok(Self {
            start: self.start - buffer,
            end: self.end + buffer,
        })
    }

    /// Intersection with `bounds`, or `None` when they do not overlap.
    pub fn clip(&self, bounds: &TimeInterval) -> Option<Self> {
        let start = self.start.max(bounds.start);
        let end = self.end.min(bounds.end);
        (start < end).then_some(Self { start, end })
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}
