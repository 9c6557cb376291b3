// --- File: crates/slotwise_planner/src/optimizer.rs ---
use crate::availability::DayAvailability;
use crate::error::PlannerError;
use crate::interval::TimeInterval;
use crate::models::{CandidateSlot, FreeInterval};
use crate::settings::PlannerSettings;
use crate::travel::{LegEstimates, TravelEstimator};
use chrono::{Duration, NaiveDate};
use slotwise_common::Location;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Limits applied when turning free intervals into slots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizerOptions {
    /// Step between alternative starts in one interval. Zero disables
    /// alternatives.
    pub granularity: Duration,
    pub max_slots_per_interval: usize,
    pub max_results: usize,
}

impl OptimizerOptions {
    pub fn from_settings(settings: &PlannerSettings) -> Self {
        Self {
            granularity: settings.slot_granularity,
            max_slots_per_interval: settings.max_slots_per_interval,
            max_results: settings.max_results,
        }
    }
}

/// Slots and the legs that could not be estimated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OptimizedSlots {
    pub slots: Vec<CandidateSlot>,
    pub diagnostics: Vec<PlannerError>,
}

/// Every leg the lead needs: in from the previous position, out to the next.
pub fn required_legs(days: &[DayAvailability], lead: Location) -> Vec<(Location, Location)> {
    days.iter()
        .flat_map(|day| day.free.iter())
        .flat_map(|free| [(free.start_location, lead), (lead, free.end_location)])
        .collect()
}

/// Candidate starts inside one free interval for fixed travel legs.
///
/// The first slot starts as soon as the technician can arrive; further slots
/// follow every `granularity` while the appointment and the trip out still
/// fit.
pub fn slots_for_interval(
    day: NaiveDate,
    free: &FreeInterval,
    travel_in: Duration,
    travel_out: Duration,
    duration: Duration,
    options: &OptimizerOptions,
) -> Result<Vec<CandidateSlot>, PlannerError> {
    let earliest_start = free.interval.start() + travel_in;
    let latest_end = free.interval.end() - travel_out;
    if latest_end - earliest_start < duration {
        return Ok(Vec::new());
    }
    let latest_start = latest_end - duration;

    let mut slots = Vec::new();
    let mut start = earliest_start;
    while start <= latest_start && slots.len() < options.max_slots_per_interval {
        slots.push(CandidateSlot {
            day,
            interval: TimeInterval::new(start, start + duration)?,
            travel_in,
            travel_out,
            total_overhead: travel_in + travel_out,
            previous_location: free.start_location,
            next_location: free.end_location,
        });
        if options.granularity <= Duration::zero() {
            break;
        }
        start += options.granularity;
    }
    Ok(slots)
}

/// Orders by added travel, then by start, and keeps the best `max_results`.
pub fn rank(slots: &mut Vec<CandidateSlot>, max_results: usize) {
    slots.sort_by_key(|slot| (slot.total_overhead, slot.interval.start()));
    slots.truncate(max_results);
}

/// Builds ranked slots from precomputed availability and travel estimates.
#[derive(Debug, Clone)]
pub struct SlotOptimizer {
    options: OptimizerOptions,
}

impl SlotOptimizer {
    pub fn new(options: OptimizerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &OptimizerOptions {
        &self.options
    }

    /// Looks up every required leg, then builds and ranks slots.
    pub async fn run(
        &self,
        days: &[DayAvailability],
        lead: Location,
        duration: Duration,
        estimator: &TravelEstimator,
        cancel: &CancellationToken,
    ) -> Result<OptimizedSlots, PlannerError> {
        let legs = required_legs(days, lead);
        let estimates = estimator.estimate_batch(&legs, cancel).await?;
        self.optimize(days, lead, duration, &estimates)
    }

    /// Intervals whose legs failed are skipped; the failures come back as
    /// diagnostics instead of an error.
    pub fn optimize(
        &self,
        days: &[DayAvailability],
        lead: Location,
        duration: Duration,
        estimates: &LegEstimates,
    ) -> Result<OptimizedSlots, PlannerError> {
        if duration <= Duration::zero() {
            return Err(PlannerError::validation(format!(
                "appointment duration must be positive, got {} minutes",
                duration.num_minutes()
            )));
        }

        let mut slots = Vec::new();
        for day in days {
            let before = slots.len();
            for free in &day.free {
                let legs = (
                    estimates.lookup(free.start_location, lead),
                    estimates.lookup(lead, free.end_location),
                );
                let (travel_in, travel_out) = match legs {
                    (Some(Ok(travel_in)), Some(Ok(travel_out))) => (*travel_in, *travel_out),
                    _ => {
                        warn!(
                            "Skipping free interval {} on {}: travel time unavailable",
                            free.interval, day.window.day
                        );
                        continue;
                    }
                };
                slots.extend(slots_for_interval(
                    day.window.day,
                    free,
                    travel_in,
                    travel_out,
                    duration,
                    &self.options,
                )?);
            }
            debug!(
                "{}: {} candidate slots from {} free intervals",
                day.window.day,
                slots.len() - before,
                day.free.len()
            );
        }

        rank(&mut slots, self.options.max_results);
        Ok(OptimizedSlots {
            slots,
            diagnostics: estimates.failures().cloned().collect(),
        })
    }
}
