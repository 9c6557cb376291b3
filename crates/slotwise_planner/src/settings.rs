// --- File: crates/slotwise_planner/src/settings.rs ---
//! Typed view of the scheduling configuration.
//!
//! Built once from a validated [`AppConfig`] and held immutably by the
//! planner for every run.

use crate::error::PlannerError;
use crate::models::BusinessWindow;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use chrono_tz::Tz;
use slotwise_common::Location;
use slotwise_config::{parse_time_of_day, parse_time_zone, parse_weekday, AppConfig};

/// Opening hours per weekday.
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessHours {
    pub open: NaiveTime,
    pub close: NaiveTime,
    pub working_days: Vec<Weekday>,
    /// Replaces `open`/`close` on one weekday. Has no effect on days that are
    /// not in `working_days`.
    pub overrides: Vec<(Weekday, NaiveTime, NaiveTime)>,
}

impl BusinessHours {
    pub fn new(open: NaiveTime, close: NaiveTime, working_days: &[Weekday]) -> Self {
        Self {
            open,
            close,
            working_days: working_days.to_vec(),
            overrides: Vec::new(),
        }
    }

    pub fn with_override(mut self, day: Weekday, open: NaiveTime, close: NaiveTime) -> Self {
        self.overrides.retain(|(d, _, _)| *d != day);
        self.overrides.push((day, open, close));
        self
    }

    /// The window for `day`, or `None` when the business is closed.
    pub fn window_for(&self, day: NaiveDate) -> Option<BusinessWindow> {
        let weekday = day.weekday();
        if !self.working_days.contains(&weekday) {
            return None;
        }
        let (open, close) = self
            .overrides
            .iter()
            .find(|(d, _, _)| *d == weekday)
            .map(|(_, open, close)| (*open, *close))
            .unwrap_or((self.open, self.close));
        Some(BusinessWindow { day, open, close })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannerSettings {
    pub time_zone: Tz,
    pub business_hours: BusinessHours,
    pub home_base: Location,
    pub default_duration: Duration,
    pub buffer: Duration,
    pub max_days_ahead: u32,
    /// Step between alternative starts inside one free interval. Zero means
    /// only the earliest start is offered.
    pub slot_granularity: Duration,
    pub max_slots_per_interval: usize,
    pub max_results: usize,
}

impl PlannerSettings {
    pub fn from_config(config: &AppConfig) -> Result<Self, PlannerError> {
        config.validate()?;
        let scheduling = &config.scheduling;
        let hours = &scheduling.business_hours;

        let working_days = hours
            .working_days
            .iter()
            .map(|d| parse_weekday(d))
            .collect::<Result<Vec<_>, _>>()?;
        let mut business_hours = BusinessHours::new(
            parse_time_of_day(&hours.open)?,
            parse_time_of_day(&hours.close)?,
            &working_days,
        );
        for day_override in &hours.overrides {
            business_hours = business_hours.with_override(
                parse_weekday(&day_override.day)?,
                parse_time_of_day(&day_override.open)?,
                parse_time_of_day(&day_override.close)?,
            );
        }

        let home = config
            .home_base
            .as_ref()
            .ok_or_else(|| PlannerError::Configuration("home_base is required".to_string()))?;
        let home_base = Location::new(home.lat, home.lng)
            .map_err(|err| PlannerError::Configuration(format!("home_base: {err}")))?;

        let buffer = Duration::minutes(scheduling.buffer_minutes);
        let slot_granularity = scheduling
            .slot_granularity_minutes
            .map(Duration::minutes)
            .unwrap_or(buffer);

        Ok(Self {
            time_zone: parse_time_zone(&scheduling.time_zone)?,
            business_hours,
            home_base,
            default_duration: Duration::minutes(scheduling.default_duration_minutes),
            buffer,
            max_days_ahead: scheduling.max_days_ahead,
            slot_granularity,
            max_slots_per_interval: scheduling.max_slots_per_interval,
            max_results: scheduling.max_results,
        })
    }
}
