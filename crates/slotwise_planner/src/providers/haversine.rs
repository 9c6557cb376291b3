use crate::error::TravelProviderError;
use crate::travel::TravelProvider;
use chrono::Duration;
use slotwise_common::{BoxFuture, Location};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points, in kilometres.
pub fn haversine_km(from: Location, to: Location) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// Straight-line travel at a constant average speed.
///
/// Works offline and never fails for valid coordinates.
#[derive(Debug, Clone, Copy)]
pub struct HaversineTravelProvider {
    average_speed_kmh: f64,
}

impl HaversineTravelProvider {
    pub fn new(average_speed_kmh: f64) -> Self {
        Self { average_speed_kmh }
    }

    pub fn estimate(&self, from: Location, to: Location) -> Result<Duration, TravelProviderError> {
        if !(self.average_speed_kmh.is_finite() && self.average_speed_kmh > 0.0) {
            return Err(TravelProviderError::Service {
                code: "InvalidSpeed".to_string(),
                message: format!("average speed {} km/h", self.average_speed_kmh),
            });
        }
        let hours = haversine_km(from, to) / self.average_speed_kmh;
        if !hours.is_finite() {
            return Err(TravelProviderError::NoRoute);
        }
        Ok(Duration::seconds((hours * 3600.0).round() as i64))
    }
}

impl Default for HaversineTravelProvider {
    fn default() -> Self {
        Self::new(50.0)
    }
}

impl TravelProvider for HaversineTravelProvider {
    fn name(&self) -> &'static str {
        "haversine"
    }

    fn travel_time(
        &self,
        from: Location,
        to: Location,
    ) -> BoxFuture<'_, Duration, TravelProviderError> {
        let result = self.estimate(from, to);
        Box::pin(async move { result })
    }
}
