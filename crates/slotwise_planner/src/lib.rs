// --- File: crates/slotwise_planner/src/lib.rs ---
//! Travel-aware appointment slot suggestion.
//!
//! [`SlotPlanner`] takes a lead location or address and returns ranked start times that
//! fit between existing bookings, leaving room for the buffer and for the
//! drive in and out.

// Declare modules within this crate
pub mod availability;
#[cfg(test)]
mod availability_proptest;
#[cfg(test)]
mod availability_test;
pub mod calendar;
pub mod error;
pub mod geocoding;
pub mod interval;
pub mod models;
pub mod optimizer;
#[cfg(test)]
mod optimizer_proptest;
pub mod planner;
pub mod providers;
pub mod settings;
pub mod travel;

pub use availability::{free_intervals, DayAvailability, DayPlanner};
pub use calendar::{CalendarSource, InMemoryCalendar};
pub use error::{PlannerError, TravelProviderError};
pub use geocoding::{Geocoder, InMemoryGeocoder};
pub use interval::TimeInterval;
pub use models::{
    Appointment, BusinessWindow, CandidateSlot, FreeInterval, LeadAddress, SlotRequest,
    SlotSuggestions, SlotSuggestionsResponse, SuggestedSlot, TravelLeg,
};
pub use optimizer::{OptimizerOptions, SlotOptimizer};
pub use planner::SlotPlanner;
pub use settings::{BusinessHours, PlannerSettings};
pub use travel::{EstimatorOptions, TravelCache, TravelEstimator, TravelProvider};
