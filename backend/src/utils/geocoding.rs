use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::GeocoderConfig;
use crate::models::geo_models::{GeocodeResult, SearchPlace};
use crate::models::profile_models::Location;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeocodeError {
    #[error("No valid location provided")]
    NoLocationProvided,
    #[error("Location not found")]
    LocationNotFound,
    #[error("Failed to fetch location data: {0}")]
    LookupFailed(String),
}

impl GeocodeError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, GeocodeError::LookupFailed(_))
    }
}

/// Resolves free-text locations against an OpenStreetMap-compatible search endpoint.
pub struct LocationResolver {
    client: Client,
    config: GeocoderConfig,
}

impl LocationResolver {
    pub fn new(config: GeocoderConfig) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| GeocodeError::LookupFailed(format!("HTTP client setup: {}", e)))?;
        Ok(Self { client, config })
    }

    pub async fn resolve(&self, location: &Location) -> Result<GeocodeResult, GeocodeError> {
        let query = location.label();
        if query.is_empty() {
            return Err(GeocodeError::NoLocationProvided);
        }

        let mut attempt: u32 = 0;
        loop {
            match self.search(&query).await {
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let backoff = retry_delay(self.config.retry_backoff, attempt);
                    warn!(
                        query = %query,
                        attempt = attempt + 1,
                        backoff_ms = backoff.as_millis() as u64,
                        "Geocoding lookup failed, retrying: {}",
                        e
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }

    async fn search(&self, query: &str) -> Result<GeocodeResult, GeocodeError> {
        debug!(query = %query, "Sending geocoding request");
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| GeocodeError::LookupFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::LookupFailed(format!(
                "geocoder returned status code {}",
                status
            )));
        }

        let places: Vec<SearchPlace> = response
            .json()
            .await
            .map_err(|e| GeocodeError::LookupFailed(format!("unreadable response: {}", e)))?;

        let place = places
            .into_iter()
            .next()
            .ok_or(GeocodeError::LocationNotFound)?;
        let latitude = parse_coordinate(&place.lat, "lat")?;
        let longitude = parse_coordinate(&place.lon, "lon")?;
        let display_name = place
            .display_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| query.to_string());

        Ok(GeocodeResult {
            latitude,
            longitude,
            display_name,
        })
    }
}

/// Doubles per attempt, saturating at `Duration::MAX`.
fn retry_delay(base: Duration, attempt: u32) -> Duration {
    base.checked_mul(2u32.saturating_pow(attempt))
        .unwrap_or(Duration::MAX)
}

fn parse_coordinate(raw: &str, name: &str) -> Result<f64, GeocodeError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| GeocodeError::LookupFailed(format!("invalid {} value: {}", name, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    const USER_AGENT: &str = "WhoweTest/1.0";

    fn resolver_for(server: &MockServer, max_retries: u32, timeout: Duration) -> LocationResolver {
        LocationResolver::new(GeocoderConfig {
            base_url: server.url("/search"),
            user_agent: USER_AGENT.to_string(),
            timeout,
            max_retries,
            retry_backoff: Duration::from_millis(1),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn resolves_first_result() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/search")
                .query_param("q", "Fenton, MO, USA")
                .query_param("format", "json")
                .query_param("limit", "1")
                .header("user-agent", USER_AGENT);
            then.status(200).json_body(json!([
                {"lat": "38.5123", "lon": "-90.4568", "display_name": "Fenton, MO"}
            ]));
        });

        let resolver = resolver_for(&server, 0, Duration::from_secs(5));
        let result = resolver
            .resolve(&Location::new("Fenton", "MO", "USA"))
            .await
            .unwrap();

        mock.assert();
        assert_eq!(
            result,
            GeocodeResult {
                latitude: 38.5123,
                longitude: -90.4568,
                display_name: "Fenton, MO".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn blank_location_never_hits_the_network() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.path("/search");
            then.status(200).json_body(json!([]));
        });

        let resolver = resolver_for(&server, 2, Duration::from_secs(5));
        let err = resolver
            .resolve(&Location::new("  ", "", "\t"))
            .await
            .unwrap_err();

        assert_eq!(err, GeocodeError::NoLocationProvided);
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn empty_result_is_not_found_and_not_retried() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.path("/search").query_param("q", "Atlantis");
            then.status(200).json_body(json!([]));
        });

        let resolver = resolver_for(&server, 3, Duration::from_secs(5));
        let err = resolver
            .resolve(&Location::new("Atlantis", "", ""))
            .await
            .unwrap_err();

        assert_eq!(err, GeocodeError::LocationNotFound);
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn server_errors_are_retried_then_reported() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.path("/search");
            then.status(503);
        });

        let resolver = resolver_for(&server, 2, Duration::from_secs(5));
        let err = resolver
            .resolve(&Location::new("Paris", "", "FRA"))
            .await
            .unwrap_err();

        assert!(matches!(err, GeocodeError::LookupFailed(_)));
        assert_eq!(mock.calls(), 3);
    }

    #[tokio::test]
    async fn malformed_body_is_a_lookup_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.path("/search");
            then.status(200).body("<html>rate limited</html>");
        });

        let resolver = resolver_for(&server, 0, Duration::from_secs(5));
        let err = resolver
            .resolve(&Location::new("Tokyo", "", "JPN"))
            .await
            .unwrap_err();
        assert!(matches!(err, GeocodeError::LookupFailed(_)));
    }

    #[tokio::test]
    async fn slow_geocoder_times_out() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.path("/search");
            then.status(200)
                .delay(Duration::from_millis(500))
                .json_body(json!([]));
        });

        let resolver = resolver_for(&server, 0, Duration::from_millis(50));
        let err = resolver
            .resolve(&Location::new("Berlin", "", "DEU"))
            .await
            .unwrap_err();
        assert!(matches!(err, GeocodeError::LookupFailed(_)));
    }

    #[tokio::test]
    async fn missing_display_name_falls_back_to_query() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.path("/search");
            then.status(200)
                .json_body(json!([{"lat": "1.29", "lon": "103.85"}]));
        });

        let resolver = resolver_for(&server, 0, Duration::from_secs(5));
        let result = resolver
            .resolve(&Location::new("", "", "SGP"))
            .await
            .unwrap();
        assert_eq!(result.display_name, "SGP");
        assert_eq!(result.latitude, 1.29);
    }

    #[tokio::test]
    async fn non_finite_coordinates_are_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.path("/search");
            then.status(200)
                .json_body(json!([{"lat": "NaN", "lon": "inf", "display_name": "Nowhere"}]));
        });

        let resolver = resolver_for(&server, 0, Duration::from_secs(5));
        let err = resolver
            .resolve(&Location::new("Nowhere", "", ""))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            GeocodeError::LookupFailed("invalid lat value: NaN".to_string())
        );
    }

    #[test]
    fn retry_delay_doubles_and_saturates() {
        let base = Duration::from_millis(500);
        assert_eq!(retry_delay(base, 0), Duration::from_millis(500));
        assert_eq!(retry_delay(base, 2), Duration::from_secs(2));
        assert_eq!(retry_delay(Duration::from_secs(u64::MAX), 1), Duration::MAX);
        assert_eq!(retry_delay(Duration::from_secs(u64::MAX / 2), 2), Duration::MAX);
    }
}
