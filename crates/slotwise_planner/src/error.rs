// --- File: crates/slotwise_planner/src/error.rs ---
use slotwise_common::{
    config_error, external_service_error, timeout_error, validation_error, InvalidCoordinates,
    Location, SlotwiseError,
};
use slotwise_config::ConfigurationError;
use thiserror::Error;

/// Failure reported by a travel provider for a single lookup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TravelProviderError {
    /// No answer within the lookup timeout.
    #[error("lookup timed out: {0}")]
    Timeout(String),

    /// The routing service answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}: {message}")]
    Http {
        url: String,
        status: u16,
        message: String,
    },

    /// The request never reached the routing service.
    #[error("network error calling {url}: {message}")]
    Network { url: String, message: String },

    /// The routing service answered but reported a failure code.
    #[error("routing service error {code}: {message}")]
    Service { code: String, message: String },

    #[error("no route between the two locations")]
    NoRoute,

    #[error("failed to parse routing response: {0}")]
    Parse(String),
}

/// Errors produced while planning slots.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlannerError {
    /// Malformed input. Aborts the run.
    #[error("Validation error: {0}")]
    Validation(String),

    /// One travel leg could not be estimated. Collected as a diagnostic.
    #[error("Travel unavailable from {from} to {to}: {reason}")]
    TravelUnavailable {
        from: Location,
        to: Location,
        reason: TravelProviderError,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Calendar source error: {0}")]
    Calendar(String),

    #[error("Request cancelled")]
    Cancelled,
}

impl PlannerError {
    pub fn validation(message: impl Into<String>) -> Self {
        PlannerError::Validation(message.into())
    }

    /// True for errors the planner recovers from by skipping work.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PlannerError::TravelUnavailable { .. })
    }
}

impl From<InvalidCoordinates> for PlannerError {
    fn from(err: InvalidCoordinates) -> Self {
        PlannerError::Validation(err.to_string())
    }
}

impl From<ConfigurationError> for PlannerError {
    fn from(err: ConfigurationError) -> Self {
        PlannerError::Configuration(err.to_string())
    }
}

impl From<PlannerError> for SlotwiseError {
    fn from(err: PlannerError) -> Self {
        match err {
            PlannerError::Validation(message) => validation_error(message),
            PlannerError::TravelUnavailable {
                reason: TravelProviderError::Timeout(message),
                ..
            } => timeout_error(message),
            travel @ PlannerError::TravelUnavailable { .. } => {
                external_service_error("travel", travel)
            }
            PlannerError::Configuration(message) => config_error(message),
            PlannerError::Calendar(message) => external_service_error("calendar", message),
            PlannerError::Cancelled => {
                SlotwiseError::CancelledError("slot planning was cancelled".to_string())
            }
        }
    }
}
