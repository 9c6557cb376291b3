use crate::error::TravelProviderError;
use crate::travel::TravelProvider;
use chrono::Duration;
use slotwise_common::{BoxFuture, Location};
use std::sync::Arc;
use tracing::warn;

/// Asks `primary` first and `secondary` when it fails.
pub struct FallbackTravelProvider {
    primary: Arc<dyn TravelProvider>,
    secondary: Arc<dyn TravelProvider>,
}

impl FallbackTravelProvider {
    pub fn new(primary: Arc<dyn TravelProvider>, secondary: Arc<dyn TravelProvider>) -> Self {
        Self { primary, secondary }
    }
}

impl TravelProvider for FallbackTravelProvider {
    fn name(&self) -> &'static str {
        self.primary.name()
    }

    fn travel_time(
        &self,
        from: Location,
        to: Location,
    ) -> BoxFuture<'_, Duration, TravelProviderError> {
        Box::pin(async move {
            match self.primary.travel_time(from, to).await {
                Ok(duration) => Ok(duration),
                Err(err) => {
                    warn!(
                        "{} failed for {} -> {} ({}), using {}",
                        self.primary.name(),
                        from,
                        to,
                        err,
                        self.secondary.name()
                    );
                    self.secondary.travel_time(from, to).await
                }
            }
        })
    }
}
