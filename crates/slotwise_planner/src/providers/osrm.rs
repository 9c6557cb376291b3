//! Travel times from an OSRM routing server.
//!
//! Uses the Route service for a single origin/destination pair.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#route-service>

use crate::error::{PlannerError, TravelProviderError};
use crate::travel::TravelProvider;
use chrono::Duration;
use reqwest::Client;
use serde::Deserialize;
use slotwise_common::{create_client, BoxFuture, Location};
use tracing::debug;

/// OSRM Route API response.
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    /// `"Ok"` on success, otherwise e.g. `"NoRoute"` or `"InvalidQuery"`.
    pub code: String,

    pub message: Option<String>,

    #[serde(default)]
    pub routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
pub struct Route {
    /// Travel time in seconds.
    pub duration: f64,
    /// Distance in meters.
    pub distance: f64,
}

impl RouteResponse {
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }
}

pub struct OsrmTravelProvider {
    client: Client,
    base_url: String,
    profile: String,
    timeout: std::time::Duration,
}

impl OsrmTravelProvider {
    pub fn new(
        base_url: impl Into<String>,
        profile: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, PlannerError> {
        let client = create_client(timeout, true).map_err(|err| {
            PlannerError::Configuration(format!("failed to build OSRM HTTP client: {err}"))
        })?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            profile: profile.into(),
            timeout,
        })
    }

    /// `{base_url}/route/v1/{profile}/{lng},{lat};{lng},{lat}?overview=false`
    pub fn route_url(&self, from: Location, to: Location) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}?overview=false",
            self.base_url.trim_end_matches('/'),
            self.profile,
            from.lng,
            from.lat,
            to.lng,
            to.lat
        )
    }

    async fn fetch_route(&self, url: String) -> Result<Duration, TravelProviderError> {
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        let route_response: RouteResponse = response
            .json()
            .await
            .map_err(|err| TravelProviderError::Parse(err.to_string()))?;

        convert_response(route_response)
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> TravelProviderError {
        if error.is_timeout() {
            return TravelProviderError::Timeout(format!(
                "{url} did not answer within {}s",
                self.timeout.as_secs()
            ));
        }

        if let Some(status) = error.status() {
            return TravelProviderError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        TravelProviderError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

/// Extracts the fastest route duration from an OSRM answer.
pub fn convert_response(response: RouteResponse) -> Result<Duration, TravelProviderError> {
    if response.code == "NoRoute" {
        return Err(TravelProviderError::NoRoute);
    }
    if !response.is_ok() {
        return Err(TravelProviderError::Service {
            code: response.code,
            message: response.message.unwrap_or_default(),
        });
    }

    let seconds = response
        .routes
        .first()
        .map(|route| route.duration)
        .ok_or(TravelProviderError::NoRoute)?;
    if !(seconds.is_finite() && seconds >= 0.0) {
        return Err(TravelProviderError::Parse(format!(
            "invalid route duration {seconds}"
        )));
    }
    Ok(Duration::milliseconds((seconds * 1000.0).round() as i64))
}

impl TravelProvider for OsrmTravelProvider {
    fn name(&self) -> &'static str {
        "osrm"
    }

    fn travel_time(
        &self,
        from: Location,
        to: Location,
    ) -> BoxFuture<'_, Duration, TravelProviderError> {
        let url = self.route_url(from, to);
        Box::pin(async move {
            debug!("OSRM request {}", url);
            self.fetch_route(url).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OsrmTravelProvider {
        OsrmTravelProvider::new(
            "http://localhost:5000/",
            "driving",
            std::time::Duration::from_secs(10),
        )
        .expect("provider should build")
    }

    #[test]
    fn test_route_url_uses_lng_lat_order() {
        let url = provider().route_url(
            Location {
                lat: 40.7128,
                lng: -74.006,
            },
            Location {
                lat: 40.758,
                lng: -73.9855,
            },
        );
        assert_eq!(
            url,
            "http://localhost:5000/route/v1/driving/-74.006,40.7128;-73.9855,40.758?overview=false"
        );
    }

    #[test]
    fn test_deserialise_success_response() {
        let json = r#"{
            "code": "Ok",
            "routes": [{"duration": 1234.5, "distance": 10500.2, "weight": 1234.5}],
            "waypoints": []
        }"#;

        let response: RouteResponse = serde_json::from_str(json).expect("should deserialise");
        assert!(response.is_ok());

        let duration = convert_response(response).expect("should convert");
        assert_eq!(duration, Duration::milliseconds(1_234_500));
    }

    #[test]
    fn test_no_route_maps_to_no_route() {
        let json = r#"{"code": "NoRoute", "message": "Impossible route between points"}"#;
        let response: RouteResponse = serde_json::from_str(json).expect("should deserialise");

        assert!(response.routes.is_empty());
        assert_eq!(convert_response(response), Err(TravelProviderError::NoRoute));
    }

    #[test]
    fn test_service_error_keeps_code_and_message() {
        let response = RouteResponse {
            code: "InvalidQuery".to_string(),
            message: Some("Query string malformed".to_string()),
            routes: Vec::new(),
        };

        match convert_response(response) {
            Err(TravelProviderError::Service { code, message }) => {
                assert_eq!(code, "InvalidQuery");
                assert_eq!(message, "Query string malformed");
            }
            other => panic!("expected Service error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_duration_is_a_parse_error() {
        let response = RouteResponse {
            code: "Ok".to_string(),
            message: None,
            routes: vec![Route {
                duration: -3.0,
                distance: 0.0,
            }],
        };
        assert!(matches!(
            convert_response(response),
            Err(TravelProviderError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_network_error() {
        // Port 9 (discard) on localhost is not expected to run OSRM
        let provider = OsrmTravelProvider::new(
            "http://127.0.0.1:9",
            "driving",
            std::time::Duration::from_secs(2),
        )
        .expect("provider should build");
        let here = Location { lat: 0.0, lng: 0.0 };

        let err = provider
            .travel_time(here, Location { lat: 0.1, lng: 0.1 })
            .await
            .expect_err("should fail");
        assert!(matches!(
            err,
            TravelProviderError::Network { .. } | TravelProviderError::Timeout(_)
        ));
    }
}
