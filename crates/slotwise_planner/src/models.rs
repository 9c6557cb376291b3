// --- File: crates/slotwise_planner/src/models.rs ---
use crate::error::PlannerError;
use crate::interval::TimeInterval;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use slotwise_common::Location;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

// --- Calendar Data ---

/// An existing booking, owned by the calendar source.
#[derive(Debug, Clone, PartialEq)]
pub struct Appointment {
    /// Opaque identifier from the calendar source, used in log output only.
    pub id: Option<String>,
    pub title: Option<String>,
    pub interval: TimeInterval,
    pub location: Location,
}

impl Appointment {
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        location: Location,
    ) -> Result<Self, PlannerError> {
        location.validate()?;
        Ok(Self {
            id: None,
            title: None,
            interval: TimeInterval::new(start, end)?,
            location,
        })
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Short label for log and error messages.
    pub fn describe(&self) -> String {
        match (&self.id, &self.title) {
            (Some(id), _) => format!("appointment {id} {}", self.interval),
            (None, Some(title)) => format!("appointment '{title}' {}", self.interval),
            (None, None) => format!("appointment {}", self.interval),
        }
    }
}

/// Business hours of one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessWindow {
    pub day: NaiveDate,
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl BusinessWindow {
    /// Resolves the window to absolute instants in `tz`.
    ///
    /// A wall-clock time skipped by a DST transition is rejected; an ambiguous
    /// one resolves to the earlier instant.
    pub fn bounds(&self, tz: &Tz) -> Result<TimeInterval, PlannerError> {
        let resolve = |time: NaiveTime| {
            tz.from_local_datetime(&self.day.and_time(time))
                .earliest()
                .map(|local| local.with_timezone(&Utc))
                .ok_or_else(|| {
                    PlannerError::validation(format!(
                        "{} {} does not exist in {}",
                        self.day, time, tz
                    ))
                })
        };
        TimeInterval::new(resolve(self.open)?, resolve(self.close)?)
    }
}

/// A gap in the schedule together with where the technician is on either
/// side of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreeInterval {
    pub interval: TimeInterval,
    pub start_location: Location,
    pub end_location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TravelLeg {
    pub from: Location,
    pub to: Location,
    pub duration: Duration,
}

/// A feasible start time for the new appointment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateSlot {
    pub day: NaiveDate,
    pub interval: TimeInterval,
    pub travel_in: Duration,
    pub travel_out: Duration,
    pub total_overhead: Duration,
    pub previous_location: Location,
    pub next_location: Location,
}

impl CandidateSlot {
    pub fn legs(&self, lead: Location) -> (TravelLeg, TravelLeg) {
        (
            TravelLeg {
                from: self.previous_location,
                to: lead,
                duration: self.travel_in,
            },
            TravelLeg {
                from: lead,
                to: self.next_location,
                duration: self.travel_out,
            },
        )
    }
}

// --- Request / Response ---

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct LeadAddress {
    /// Free-text address, geocoded when `location` is missing.
    #[cfg_attr(feature = "openapi", schema(example = "123 Main St"))]
    #[serde(default)]
    pub label: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    #[serde(default)]
    pub location: Option<Location>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SlotRequest {
    pub lead: LeadAddress,
    /// Appointment length; defaults to the configured duration.
    #[cfg_attr(feature = "openapi", schema(example = 60))]
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    /// Only this day is scanned when set.
    #[cfg_attr(feature = "openapi", schema(format = "date", example = "2025-05-06"))]
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
}

impl SlotRequest {
    pub fn new(lead: Location) -> Self {
        Self {
            lead: LeadAddress {
                label: None,
                location: Some(lead),
            },
            duration_minutes: None,
            target_date: None,
        }
    }

    /// A lead known only by its address.
    pub fn for_address(address: impl Into<String>) -> Self {
        Self {
            lead: LeadAddress {
                label: Some(address.into()),
                location: None,
            },
            duration_minutes: None,
            target_date: None,
        }
    }

    pub fn with_duration_minutes(mut self, minutes: i64) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    pub fn on(mut self, day: NaiveDate) -> Self {
        self.target_date = Some(day);
        self
    }
}

/// Outcome of one planning run.
///
/// An empty `slots` list is a valid answer; `diagnostics` explains any
/// intervals that were skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotSuggestions {
    pub slots: Vec<CandidateSlot>,
    pub diagnostics: Vec<PlannerError>,
    pub scanned_days: Vec<NaiveDate>,
}

impl SlotSuggestions {
    /// Renders the result for an HTTP caller, with times in `tz`.
    pub fn to_response(&self, tz: &Tz) -> SlotSuggestionsResponse {
        let slots: Vec<SuggestedSlot> = self
            .slots
            .iter()
            .map(|slot| SuggestedSlot::from_candidate(slot, tz))
            .collect();
        SlotSuggestionsResponse {
            message: format!("Found {} available slots", slots.len()),
            slots,
            notices: self.diagnostics.iter().map(|d| d.to_string()).collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SuggestedSlot {
    #[cfg_attr(feature = "openapi", schema(format = "date", example = "2025-05-06"))]
    pub date: NaiveDate,
    #[cfg_attr(feature = "openapi", schema(example = "2025-05-06T09:20:00-04:00"))]
    pub start_time: String, // RFC 3339
    #[cfg_attr(feature = "openapi", schema(example = "2025-05-06T10:20:00-04:00"))]
    pub end_time: String, // RFC 3339
    #[cfg_attr(feature = "openapi", schema(example = 60))]
    pub duration_minutes: i64,
    pub travel_in_minutes: i64,
    pub travel_out_minutes: i64,
    pub overhead_minutes: i64,
    /// 100 for no travel, decreasing by one point per two minutes of travel.
    #[cfg_attr(feature = "openapi", schema(example = 80.0))]
    pub efficiency_score: f64,
}

impl SuggestedSlot {
    pub fn from_candidate(slot: &CandidateSlot, tz: &Tz) -> Self {
        let overhead_minutes = slot.total_overhead.num_minutes();
        Self {
            date: slot.day,
            start_time: slot.interval.start().with_timezone(tz).to_rfc3339(),
            end_time: slot.interval.end().with_timezone(tz).to_rfc3339(),
            duration_minutes: slot.interval.duration().num_minutes(),
            travel_in_minutes: slot.travel_in.num_minutes(),
            travel_out_minutes: slot.travel_out.num_minutes(),
            overhead_minutes,
            efficiency_score: efficiency_score(overhead_minutes),
        }
    }
}

pub fn efficiency_score(overhead_minutes: i64) -> f64 {
    (100.0 - overhead_minutes as f64 / 2.0).clamp(0.0, 100.0)
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SlotSuggestionsResponse {
    pub slots: Vec<SuggestedSlot>,
    /// Human-readable partial-failure notices.
    pub notices: Vec<String>,
    #[cfg_attr(feature = "openapi", schema(example = "Found 3 available slots"))]
    pub message: String,
}
