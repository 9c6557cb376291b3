// --- File: crates/slotwise_planner/src/availability.rs ---
use crate::error::PlannerError;
use crate::interval::TimeInterval;
use crate::models::{Appointment, BusinessWindow, FreeInterval};
use crate::settings::PlannerSettings;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use slotwise_common::Location;
use tracing::debug;

/// Free intervals of one business window.
#[derive(Debug, Clone, PartialEq)]
pub struct DayAvailability {
    pub window: BusinessWindow,
    pub bounds: TimeInterval,
    pub free: Vec<FreeInterval>,
}

impl DayAvailability {
    /// Drops free time before `instant`. Locations on either side are kept.
    pub fn drop_before(&mut self, instant: DateTime<Utc>) {
        self.free = std::mem::take(&mut self.free)
            .into_iter()
            .filter_map(|mut free| {
                let start = free.interval.start().max(instant);
                free.interval = TimeInterval::new(start, free.interval.end()).ok()?;
                Some(free)
            })
            .collect();
    }
}

/// Subtracts buffered appointments from `bounds`.
///
/// The result is ordered, non-overlapping and fully inside `bounds`. Together
/// with the clipped buffered appointments it covers `bounds` exactly.
/// Appointments that still overlap once buffered are rejected.
pub fn free_intervals(
    appointments: &[Appointment],
    bounds: &TimeInterval,
    buffer: Duration,
    home: Location,
) -> Result<Vec<FreeInterval>, PlannerError> {
    let mut sorted: Vec<&Appointment> = appointments.iter().collect();
    sorted.sort_by_key(|a| (a.interval.start(), a.interval.end()));

    let buffered = sorted
        .iter()
        .map(|a| a.interval.with_buffer(buffer).map(|busy| (busy, *a)))
        .collect::<Result<Vec<_>, PlannerError>>()?;

    // Sorted by start, so a conflict always shows up between neighbours
    for pair in buffered.windows(2) {
        let ((first, a), (second, b)) = (&pair[0], &pair[1]);
        if first.overlaps(second) {
            return Err(PlannerError::validation(format!(
                "{} and {} overlap with a {} minute buffer",
                a.describe(),
                b.describe(),
                buffer.num_minutes()
            )));
        }
    }

    let mut free = Vec::new();
    let mut cursor = bounds.start();
    let mut previous_location = home;

    for (busy, appointment) in &buffered {
        let Some(busy) = busy.clip(bounds) else {
            continue;
        };
        if busy.start() > cursor {
            free.push(FreeInterval {
                interval: TimeInterval::new(cursor, busy.start())?,
                start_location: previous_location,
                end_location: appointment.location,
            });
        }
        cursor = cursor.max(busy.end());
        previous_location = appointment.location;
    }

    if cursor < bounds.end() {
        free.push(FreeInterval {
            interval: TimeInterval::new(cursor, bounds.end())?,
            start_location: previous_location,
            end_location: home,
        });
    }

    Ok(free)
}

/// First and last local calendar day an appointment touches.
fn local_days(appointment: &Appointment, tz: &Tz) -> (NaiveDate, NaiveDate) {
    let first = appointment.interval.start().with_timezone(tz).date_naive();
    // `end` is exclusive: an appointment ending at midnight belongs to one day
    let last_instant = appointment.interval.end() - Duration::nanoseconds(1);
    let last = last_instant.with_timezone(tz).date_naive();
    (first, last)
}

/// Lazily computes availability for consecutive days.
///
/// Days without business hours are skipped. Each day is computed on its own,
/// so iteration can stop early and restart from any day.
pub struct DayPlanner<'a> {
    settings: &'a PlannerSettings,
    appointments: &'a [Appointment],
    next_day: NaiveDate,
    remaining: u32,
}

impl<'a> DayPlanner<'a> {
    pub fn new(
        settings: &'a PlannerSettings,
        appointments: &'a [Appointment],
        first_day: NaiveDate,
        days: u32,
    ) -> Self {
        Self {
            settings,
            appointments,
            next_day: first_day,
            remaining: days,
        }
    }

    /// Availability for a single day, `None` when the business is closed.
    pub fn plan_day(&self, day: NaiveDate) -> Option<Result<DayAvailability, PlannerError>> {
        let window = self.settings.business_hours.window_for(day)?;
        Some(self.plan_window(window))
    }

    fn plan_window(&self, window: BusinessWindow) -> Result<DayAvailability, PlannerError> {
        let tz = &self.settings.time_zone;
        let bounds = window.bounds(tz)?;
        let todays: Vec<Appointment> = self
            .appointments
            .iter()
            .filter(|a| {
                let (first, last) = local_days(a, tz);
                first <= window.day && window.day <= last
            })
            .cloned()
            .collect();

        let free = free_intervals(&todays, &bounds, self.settings.buffer, self.settings.home_base)?;
        debug!(
            "{}: {} appointments, {} free intervals in {}",
            window.day,
            todays.len(),
            free.len(),
            bounds
        );
        Ok(DayAvailability {
            window,
            bounds,
            free,
        })
    }
}

impl Iterator for DayPlanner<'_> {
    type Item = Result<DayAvailability, PlannerError>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.remaining > 0 {
            let day = self.next_day;
            self.remaining -= 1;
            match day.succ_opt() {
                Some(next) => self.next_day = next,
                None => self.remaining = 0,
            }
            match self.plan_day(day) {
                Some(result) => return Some(result),
                None => debug!("{} is not a working day, skipping", day),
            }
        }
        None
    }
}
