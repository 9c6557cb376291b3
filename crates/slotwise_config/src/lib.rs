use chrono::{NaiveTime, Weekday};
use chrono_tz::Tz;
use config::{Config, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
pub mod models;
pub use models::*;


/// Errors raised while loading or validating configuration.
///
/// These are fatal at startup; nothing in the planner recovers from them.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Loads the layered configuration from the default config directory.
///
/// The directory defaults to `./config` and can be moved with
/// `SLOTWISE_CONFIG_DIR`.
pub fn load_config() -> Result<AppConfig, ConfigurationError> {
    ensure_dotenv_loaded();
    let config_dir = env::var("SLOTWISE_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    load_config_from(Path::new(&config_dir))
}

/// Loads `default`, then `{RUN_ENV}`, then environment overrides such as
/// `SLOTWISE_SCHEDULING__BUFFER_MINUTES`, and validates the result.
pub fn load_config_from(config_dir: &Path) -> Result<AppConfig, ConfigurationError> {
    let prefix = env::var("PREFIX").unwrap_or_else(|_| "SLOTWISE".to_string());
    load_config_with_prefix(config_dir, &prefix)
}

/// Variables are read as `{prefix}_{SECTION}__{KEY}`.
pub(crate) fn load_config_with_prefix(
    config_dir: &Path,
    prefix: &str,
) -> Result<AppConfig, ConfigurationError> {
    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());

    let default_path: PathBuf = config_dir.join("default");
    let env_path: PathBuf = config_dir.join(&run_env);
    debug!(
        "Loading configuration from {} and {}",
        default_path.display(),
        env_path.display()
    );

    let builder = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(
            Environment::with_prefix(prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("scheduling.business_hours.working_days"),
        );

    let app_config: AppConfig = builder.build()?.try_deserialize()?;
    app_config.validate()?;
    Ok(app_config)
}

impl AppConfig {
    /// Checks every value the planner depends on.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let scheduling = &self.scheduling;
        parse_time_zone(&scheduling.time_zone)?;

        let hours = &scheduling.business_hours;
        check_open_close(&hours.open, &hours.close)?;
        if hours.working_days.is_empty() {
            return Err(invalid("business_hours.working_days must not be empty"));
        }
        for day in &hours.working_days {
            parse_weekday(day)?;
        }
        for day_override in &hours.overrides {
            parse_weekday(&day_override.day)?;
            check_open_close(&day_override.open, &day_override.close)?;
        }

        if scheduling.default_duration_minutes <= 0 {
            return Err(invalid("default_duration_minutes must be positive"));
        }
        if scheduling.buffer_minutes < 0 {
            return Err(invalid("buffer_minutes must not be negative"));
        }
        if scheduling.max_days_ahead == 0 {
            return Err(invalid("max_days_ahead must be at least 1"));
        }
        if let Some(granularity) = scheduling.slot_granularity_minutes {
            if granularity <= 0 {
                return Err(invalid("slot_granularity_minutes must be positive"));
            }
        }
        if scheduling.max_slots_per_interval == 0 || scheduling.max_results == 0 {
            return Err(invalid(
                "max_slots_per_interval and max_results must be at least 1",
            ));
        }

        let home = self
            .home_base
            .as_ref()
            .ok_or_else(|| invalid("home_base coordinates are required"))?;
        if !home.lat.is_finite() || !(-90.0..=90.0).contains(&home.lat) {
            return Err(invalid(format!("home_base.lat out of range: {}", home.lat)));
        }
        if !home.lng.is_finite() || !(-180.0..=180.0).contains(&home.lng) {
            return Err(invalid(format!("home_base.lng out of range: {}", home.lng)));
        }

        let travel = &self.travel;
        if travel.timeout_secs == 0 {
            return Err(invalid("travel.timeout_secs must be positive"));
        }
        if travel.cache_capacity == 0 || travel.max_concurrent_lookups == 0 {
            return Err(invalid(
                "travel.cache_capacity and travel.max_concurrent_lookups must be at least 1",
            ));
        }
        if travel.coordinate_precision > 9 {
            return Err(invalid("travel.coordinate_precision must be at most 9"));
        }
        if !(travel.average_speed_kmh.is_finite() && travel.average_speed_kmh > 0.0) {
            return Err(invalid("travel.average_speed_kmh must be positive"));
        }
        if travel.provider == TravelProviderKind::Osrm && travel.base_url.trim().is_empty() {
            return Err(invalid("travel.base_url is required for the osrm provider"));
        }
        Ok(())
    }
}

/// Parses a 24-hour `HH:MM` time of day.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, ConfigurationError> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| {
        invalid(format!(
            "Invalid time format: {value}. Use HH:MM format (24-hour)."
        ))
    })
}

pub fn parse_weekday(value: &str) -> Result<Weekday, ConfigurationError> {
    value
        .parse::<Weekday>()
        .map_err(|_| invalid(format!("Unknown weekday: {value}")))
}

pub fn parse_time_zone(value: &str) -> Result<Tz, ConfigurationError> {
    value
        .parse::<Tz>()
        .map_err(|err| invalid(format!("Unknown time zone {value}: {err}")))
}

fn check_open_close(open: &str, close: &str) -> Result<(), ConfigurationError> {
    let open_time = parse_time_of_day(open)?;
    let close_time = parse_time_of_day(close)?;
    if open_time >= close_time {
        return Err(invalid(format!(
            "business hours open ({open}) must be before close ({close})"
        )));
    }
    Ok(())
}

fn invalid(message: impl Into<String>) -> ConfigurationError {
    ConfigurationError::Invalid(message.into())
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Ensures that the dotenv file is loaded into the environment variables.
///
/// The path comes from `DOTENV_OVERRIDE`, then from a first command line
/// argument starting with `.env`, and defaults to `.env`. Loading happens at
/// most once per process; the chosen path is returned.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path_override = env::var("DOTENV_OVERRIDE").ok();
    let dotenv_path_arg = env::args().nth(1).filter(|s| s.starts_with(".env"));

    let dotenv_path = dotenv_path_override
        .or(dotenv_path_arg)
        .unwrap_or_else(|| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        if dotenv::from_filename(&dotenv_path).is_err() {
            debug!("No dotenv file loaded from {}", dotenv_path);
        }
    });

    dotenv_path
}
