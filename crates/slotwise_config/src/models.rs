// --- File: crates/slotwise_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- Business Hours ---
/// Opening hours override for a single weekday.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DayHoursOverride {
    /// Weekday this override applies to ("Mon", "Tue", ...).
    pub day: String,
    /// Opening time in HH:MM (24-hour).
    pub open: String,
    /// Closing time in HH:MM (24-hour).
    pub close: String,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BusinessHoursConfig {
    #[serde(default = "default_open")]
    pub open: String,
    #[serde(default = "default_close")]
    pub close: String,
    #[serde(default = "default_working_days")]
    pub working_days: Vec<String>,
    #[serde(default)]
    pub overrides: Vec<DayHoursOverride>,
}

impl Default for BusinessHoursConfig {
    fn default() -> Self {
        Self {
            open: default_open(),
            close: default_close(),
            working_days: default_working_days(),
            overrides: Vec::new(),
        }
    }
}

// --- Scheduling Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SchedulingConfig {
    /// IANA time zone the business hours are expressed in.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    #[serde(default)]
    pub business_hours: BusinessHoursConfig,
    #[serde(default = "default_duration_minutes")]
    pub default_duration_minutes: i64,
    #[serde(default = "default_buffer_minutes")]
    pub buffer_minutes: i64,
    #[serde(default = "default_max_days_ahead")]
    pub max_days_ahead: u32,
    /// Step between alternative start times inside one free interval.
    /// Falls back to `buffer_minutes` when absent.
    #[serde(default)]
    pub slot_granularity_minutes: Option<i64>,
    #[serde(default = "default_max_slots_per_interval")]
    pub max_slots_per_interval: usize,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            time_zone: default_time_zone(),
            business_hours: BusinessHoursConfig::default(),
            default_duration_minutes: default_duration_minutes(),
            buffer_minutes: default_buffer_minutes(),
            max_days_ahead: default_max_days_ahead(),
            slot_granularity_minutes: None,
            max_slots_per_interval: default_max_slots_per_interval(),
            max_results: default_max_results(),
        }
    }
}

// --- Home Base ---
// The technician's start and end point for every working day.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct HomeBaseConfig {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub label: Option<String>,
}

// --- Travel Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TravelProviderKind {
    #[default]
    Osrm,
    Haversine,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TravelConfig {
    #[serde(default)]
    pub provider: TravelProviderKind,
    /// Base URL of the OSRM routing service.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    /// Decimal places kept when rounding coordinates into cache keys.
    #[serde(default = "default_coordinate_precision")]
    pub coordinate_precision: u32,
    #[serde(default = "default_max_concurrent_lookups")]
    pub max_concurrent_lookups: usize,
    #[serde(default = "default_average_speed_kmh")]
    pub average_speed_kmh: f64,
    #[serde(default)]
    pub fallback_to_haversine: bool,
}

impl Default for TravelConfig {
    fn default() -> Self {
        Self {
            provider: TravelProviderKind::default(),
            base_url: default_base_url(),
            profile: default_profile(),
            timeout_secs: default_timeout_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_capacity: default_cache_capacity(),
            coordinate_precision: default_coordinate_precision(),
            max_concurrent_lookups: default_max_concurrent_lookups(),
            average_speed_kmh: default_average_speed_kmh(),
            fallback_to_haversine: false,
        }
    }
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub scheduling: SchedulingConfig,
    // Mandatory at runtime, checked by `validate`
    #[serde(default)]
    pub home_base: Option<HomeBaseConfig>,
    #[serde(default)]
    pub travel: TravelConfig,
}

fn default_open() -> String {
    "09:00".to_string()
}

fn default_close() -> String {
    "18:00".to_string()
}

fn default_working_days() -> Vec<String> {
    ["Mon", "Tue", "Wed", "Thu", "Fri"]
        .iter()
        .map(|d| d.to_string())
        .collect()
}

fn default_time_zone() -> String {
    "UTC".to_string()
}

fn default_duration_minutes() -> i64 {
    60
}

fn default_buffer_minutes() -> i64 {
    15
}

fn default_max_days_ahead() -> u32 {
    7
}

fn default_max_slots_per_interval() -> usize {
    4
}

fn default_max_results() -> usize {
    10
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_profile() -> String {
    "driving".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_cache_capacity() -> usize {
    1000
}

fn default_coordinate_precision() -> u32 {
    4
}

fn default_max_concurrent_lookups() -> usize {
    8
}

fn default_average_speed_kmh() -> f64 {
    50.0
}
