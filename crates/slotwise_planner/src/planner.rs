// --- File: crates/slotwise_planner/src/planner.rs ---
//! Request pipeline.
//!
//! A run resolves the lead, fetches the calendar, computes free intervals for
//! every scanned day, estimates all travel legs in one deduplicated batch and
//! finally ranks the resulting slots.

use crate::availability::{DayAvailability, DayPlanner};
use crate::calendar::CalendarSource;
use crate::error::PlannerError;
use crate::geocoding::Geocoder;
use crate::interval::TimeInterval;
use crate::models::{LeadAddress, SlotRequest, SlotSuggestions, SlotSuggestionsResponse};
use crate::optimizer::{OptimizerOptions, SlotOptimizer};
use crate::providers::build_estimator;
use crate::settings::PlannerSettings;
use crate::travel::TravelEstimator;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use slotwise_common::{log_result, Location, SlotwiseError};
use slotwise_config::AppConfig;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::field::display;
use tracing::{debug, info, instrument, Span};

pub struct SlotPlanner {
    settings: PlannerSettings,
    calendar: Arc<dyn CalendarSource>,
    estimator: Arc<TravelEstimator>,
    geocoder: Option<Arc<dyn Geocoder>>,
    optimizer: SlotOptimizer,
}

impl SlotPlanner {
    pub fn new(
        settings: PlannerSettings,
        calendar: Arc<dyn CalendarSource>,
        estimator: Arc<TravelEstimator>,
    ) -> Self {
        let optimizer = SlotOptimizer::new(OptimizerOptions::from_settings(&settings));
        Self {
            settings,
            calendar,
            estimator,
            geocoder: None,
            optimizer,
        }
    }

    /// Resolves leads that arrive as an address only.
    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    /// Validates `config` and wires the configured travel provider.
    pub fn from_config(
        config: &AppConfig,
        calendar: Arc<dyn CalendarSource>,
    ) -> Result<Self, PlannerError> {
        let settings = PlannerSettings::from_config(config)?;
        let estimator = Arc::new(build_estimator(&config.travel)?);
        Ok(Self::new(settings, calendar, estimator))
    }

    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    pub fn estimator(&self) -> &Arc<TravelEstimator> {
        &self.estimator
    }

    /// Days to scan: the target date alone, or the days after `today` up to
    /// the configured look-ahead.
    pub fn days_to_scan(
        &self,
        request: &SlotRequest,
        today: NaiveDate,
    ) -> Result<(NaiveDate, u32), PlannerError> {
        match request.target_date {
            Some(day) if day < today => Err(PlannerError::validation(format!(
                "target date {day} is in the past"
            ))),
            Some(day) => Ok((day, 1)),
            None => today
                .succ_opt()
                .map(|tomorrow| (tomorrow, self.settings.max_days_ahead))
                .ok_or_else(|| PlannerError::validation("no day after today")),
        }
    }

    /// Coordinates of the lead, geocoding its address when needed.
    pub async fn resolve_lead(
        &self,
        lead: &LeadAddress,
        cancel: &CancellationToken,
    ) -> Result<Location, PlannerError> {
        let address = match (lead.location, lead.label.as_deref()) {
            (Some(location), _) => {
                location.validate()?;
                return Ok(location);
            }
            (None, Some(address)) if !address.trim().is_empty() => address,
            (None, _) => {
                return Err(PlannerError::validation(
                    "lead needs a location or an address",
                ))
            }
        };
        let geocoder = self.geocoder.as_ref().ok_or_else(|| {
            PlannerError::validation(format!(
                "lead address '{address}' has no coordinates and no geocoder is configured"
            ))
        })?;

        let found = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PlannerError::Cancelled),
            result = geocoder.geocode(address) => result?,
        };
        let location = found.ok_or_else(|| {
            PlannerError::validation(format!("could not geocode lead address '{address}'"))
        })?;
        location.validate()?;
        debug!("Geocoded '{}' to {}", address, location);
        Ok(location)
    }

    /// Suggests slots for `request`, treating `today` as the current local
    /// date. Every slot of a targeted `today` is offered, elapsed or not.
    pub async fn suggest(
        &self,
        request: &SlotRequest,
        today: NaiveDate,
        cancel: &CancellationToken,
    ) -> Result<SlotSuggestions, PlannerError> {
        self.plan(request, today, None, cancel).await
    }

    /// Suggests slots as of `now`: free time before `now` is not offered.
    pub async fn suggest_at(
        &self,
        request: &SlotRequest,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<SlotSuggestions, PlannerError> {
        let today = now.with_timezone(&self.settings.time_zone).date_naive();
        self.plan(request, today, Some(now), cancel).await
    }

    /// [`suggest_at`](Self::suggest_at) with the current time.
    pub async fn suggest_now(
        &self,
        request: &SlotRequest,
        cancel: &CancellationToken,
    ) -> Result<SlotSuggestions, PlannerError> {
        self.suggest_at(request, Utc::now(), cancel).await
    }

    #[instrument(skip_all, fields(lead = tracing::field::Empty))]
    async fn plan(
        &self,
        request: &SlotRequest,
        today: NaiveDate,
        not_before: Option<DateTime<Utc>>,
        cancel: &CancellationToken,
    ) -> Result<SlotSuggestions, PlannerError> {
        let duration = request
            .duration_minutes
            .map(Duration::minutes)
            .unwrap_or(self.settings.default_duration);
        if duration <= Duration::zero() {
            return Err(PlannerError::validation(format!(
                "appointment duration must be positive, got {} minutes",
                duration.num_minutes()
            )));
        }
        let (first_day, day_count) = self.days_to_scan(request, today)?;
        let lead = self.resolve_lead(&request.lead, cancel).await?;
        Span::current().record("lead", display(lead));

        let appointments = {
            let range = calendar_range(first_day, day_count)?;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(PlannerError::Cancelled),
                result = self.calendar.list_appointments(range) => result?,
            }
        };
        for appointment in &appointments {
            appointment.location.validate()?;
        }
        debug!(
            "{} appointments between {} and {} more days",
            appointments.len(),
            first_day,
            day_count
        );

        // Phase 1: free intervals per day
        let mut days: Vec<DayAvailability> =
            DayPlanner::new(&self.settings, &appointments, first_day, day_count)
                .collect::<Result<_, _>>()?;
        if let Some(now) = not_before {
            for day in &mut days {
                day.drop_before(now);
            }
        }
        let scanned_days = days.iter().map(|day| day.window.day).collect();

        // Phase 2 and 3: travel legs, then ranking
        let optimized = self
            .optimizer
            .run(&days, lead, duration, &self.estimator, cancel)
            .await?;

        if let Some(best) = optimized.slots.first() {
            let (travel_in, travel_out) = best.legs(lead);
            debug!(
                "Best slot {}: {} min in from {}, {} min out to {}",
                best.interval,
                travel_in.duration.num_minutes(),
                travel_in.from,
                travel_out.duration.num_minutes(),
                travel_out.to
            );
        }
        info!(
            "Found {} slots over {} working days ({} travel diagnostics)",
            optimized.slots.len(),
            days.len(),
            optimized.diagnostics.len()
        );
        Ok(SlotSuggestions {
            slots: optimized.slots,
            diagnostics: optimized.diagnostics,
            scanned_days,
        })
    }

    /// Entry point for an HTTP layer: response DTO or an error carrying a
    /// status code.
    pub async fn respond(
        &self,
        request: &SlotRequest,
        cancel: &CancellationToken,
    ) -> Result<SlotSuggestionsResponse, SlotwiseError> {
        let suggestions = log_result(
            self.suggest_now(request, cancel).await,
            "Slot suggestions computed",
            "Slot suggestion failed",
        )?;
        Ok(suggestions.to_response(&self.settings.time_zone))
    }
}

/// UTC range wide enough to hold every local day scanned, whatever the zone.
fn calendar_range(first_day: NaiveDate, day_count: u32) -> Result<TimeInterval, PlannerError> {
    let midnight = first_day
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| PlannerError::validation(format!("no midnight on {first_day}")))?;
    let start = midnight.and_utc() - Duration::days(1);
    let end = start + Duration::days(i64::from(day_count) + 2);
    TimeInterval::new(start, end)
}
