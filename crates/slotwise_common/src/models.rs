// --- File: crates/slotwise_common/src/models.rs ---

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A point on the map, in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude, -90..=90
    pub lat: f64,
    /// Longitude, -180..=180
    pub lng: f64,
}

/// Raised when a latitude/longitude pair is not finite or out of range.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("invalid coordinates ({lat}, {lng})")]
pub struct InvalidCoordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    /// Create a location, rejecting non-finite or out-of-range coordinates.
    pub fn new(lat: f64, lng: f64) -> Result<Self, InvalidCoordinates> {
        let location = Self { lat, lng };
        location.validate()?;
        Ok(location)
    }

    pub fn validate(&self) -> Result<(), InvalidCoordinates> {
        let lat_ok = self.lat.is_finite() && (-90.0..=90.0).contains(&self.lat);
        let lng_ok = self.lng.is_finite() && (-180.0..=180.0).contains(&self.lng);
        if lat_ok && lng_ok {
            Ok(())
        } else {
            Err(InvalidCoordinates {
                lat: self.lat,
                lng: self.lng,
            })
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lng)
    }
}
