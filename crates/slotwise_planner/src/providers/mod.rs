//! Travel provider implementations.

mod fallback;
mod haversine;
mod osrm;

pub use fallback::FallbackTravelProvider;
pub use haversine::{haversine_km, HaversineTravelProvider};
pub use osrm::{convert_response, OsrmTravelProvider, Route, RouteResponse};

use crate::error::PlannerError;
use crate::travel::{EstimatorOptions, TravelCache, TravelEstimator, TravelProvider};
use slotwise_config::{TravelConfig, TravelProviderKind};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Builds the configured provider, wrapped in a haversine fallback when
/// enabled.
pub fn build_provider(config: &TravelConfig) -> Result<Arc<dyn TravelProvider>, PlannerError> {
    let haversine: Arc<dyn TravelProvider> =
        Arc::new(HaversineTravelProvider::new(config.average_speed_kmh));
    let provider: Arc<dyn TravelProvider> = match config.provider {
        TravelProviderKind::Haversine => haversine,
        TravelProviderKind::Osrm => {
            let osrm: Arc<dyn TravelProvider> = Arc::new(OsrmTravelProvider::new(
                config.base_url.clone(),
                config.profile.clone(),
                Duration::from_secs(config.timeout_secs),
            )?);
            if config.fallback_to_haversine {
                Arc::new(FallbackTravelProvider::new(osrm, haversine))
            } else {
                osrm
            }
        }
    };
    info!(
        "Travel provider: {} (fallback to haversine: {})",
        provider.name(),
        config.fallback_to_haversine && config.provider == TravelProviderKind::Osrm
    );
    Ok(provider)
}

/// Builds an estimator with its own cache from configuration.
pub fn build_estimator(config: &TravelConfig) -> Result<TravelEstimator, PlannerError> {
    let provider = build_provider(config)?;
    let cache = Arc::new(TravelCache::new(
        Duration::from_secs(config.cache_ttl_secs),
        config.cache_capacity,
    ));
    Ok(TravelEstimator::new(
        provider,
        cache,
        EstimatorOptions {
            precision: config.coordinate_precision,
            timeout: Duration::from_secs(config.timeout_secs),
            max_concurrent_lookups: config.max_concurrent_lookups,
        },
    ))
}
