//! Resolution of free-text lead addresses to coordinates.

use crate::error::PlannerError;
use slotwise_common::{BoxFuture, Location};
use std::collections::HashMap;
use std::sync::RwLock;

/// Turns an address into a location.
///
/// `Ok(None)` means the address is unknown to the geocoder. Errors are
/// reserved for the geocoder itself failing.
pub trait Geocoder: Send + Sync {
    fn geocode(&self, address: &str) -> BoxFuture<'_, Option<Location>, PlannerError>;
}

/// Lowercased with runs of whitespace collapsed, so lookups ignore
/// formatting differences.
fn normalize(address: &str) -> String {
    address
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Geocoder backed by a fixed address book.
#[derive(Debug, Default)]
pub struct InMemoryGeocoder {
    addresses: RwLock<HashMap<String, Location>>,
}

impl InMemoryGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_address(self, address: &str, location: Location) -> Self {
        self.addresses
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(normalize(address), location);
        self
    }

    pub fn insert(&self, address: &str, location: Location) -> Result<(), PlannerError> {
        location.validate()?;
        self.addresses
            .write()
            .map_err(|_| PlannerError::Configuration("address book lock poisoned".to_string()))?
            .insert(normalize(address), location);
        Ok(())
    }

    fn lookup(&self, address: &str) -> Result<Option<Location>, PlannerError> {
        let addresses = self
            .addresses
            .read()
            .map_err(|_| PlannerError::Configuration("address book lock poisoned".to_string()))?;
        Ok(addresses.get(&normalize(address)).copied())
    }
}

impl Geocoder for InMemoryGeocoder {
    fn geocode(&self, address: &str) -> BoxFuture<'_, Option<Location>, PlannerError> {
        let result = self.lookup(address);
        Box::pin(async move { result })
    }
}
