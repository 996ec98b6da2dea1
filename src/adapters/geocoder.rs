use crate::config::toml_config::GeocoderConfig;
use crate::domain::model::Coordinate;
use crate::domain::ports::Geocoder;
use crate::utils::error::{ReferralError, Result};
use crate::utils::validation::Validate;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// Nominatim search API (`?q=...&format=json&limit=1`).
pub struct NominatimGeocoder {
    endpoint: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        // Nominatim 的使用政策要求 User-Agent
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            endpoint: config.endpoint.clone(),
            client: builder.build()?,
        })
    }

    fn parse_place(&self, place: &NominatimPlace) -> Result<Coordinate> {
        let parse = |field: &str, value: &str| {
            value
                .trim()
                .parse::<f64>()
                .map_err(|e| ReferralError::GeocodingError {
                    message: format!("invalid {} '{}' from {}: {}", field, value, self.endpoint, e),
                })
        };

        let location = Coordinate::new(parse("lat", &place.lat)?, parse("lon", &place.lon)?);
        location.validate().map_err(|e| ReferralError::GeocodingError {
            message: format!("{} returned an invalid coordinate: {}", self.endpoint, e),
        })?;
        Ok(location)
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<Coordinate>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }

        tracing::debug!("Making geocoding request to: {}", self.endpoint);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        tracing::debug!("Geocoder response status: {}", response.status());
        if !response.status().is_success() {
            return Err(ReferralError::GeocodingError {
                message: format!("{} responded with status {}", self.endpoint, response.status()),
            });
        }

        let places: Vec<NominatimPlace> = response.json().await?;
        let Some(place) = places.first() else {
            return Ok(None);
        };

        if let Some(name) = &place.display_name {
            tracing::debug!("Geocoder matched: {}", name);
        }
        self.parse_place(place).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn geocoder(server: &MockServer) -> NominatimGeocoder {
        NominatimGeocoder::new(&GeocoderConfig {
            endpoint: server.url("/search"),
            user_agent: "vital-referral-test".to_string(),
            timeout_seconds: Some(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_geocode_first_match() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/search")
                .query_param("q", "Osu, Accra")
                .query_param("format", "json")
                .query_param("limit", "1")
                .header("user-agent", "vital-referral-test");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([
                    {"lat": "5.5560", "lon": "-0.1769", "display_name": "Osu, Accra, Ghana"}
                ]));
        });

        let location = geocoder(&server).geocode("Osu, Accra").await.unwrap();

        api_mock.assert();
        assert_eq!(location, Some(Coordinate::new(5.556, -0.1769)));
    }

    #[tokio::test]
    async fn test_geocode_no_match_is_none() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/search");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([]));
        });

        let location = geocoder(&server).geocode("Nowhere Town").await.unwrap();

        api_mock.assert();
        assert!(location.is_none());
    }

    #[tokio::test]
    async fn test_blank_query_skips_request() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/search");
            then.status(200).json_body(serde_json::json!([]));
        });

        assert!(geocoder(&server).geocode("   ").await.unwrap().is_none());
        api_mock.assert_hits(0);
    }

    #[tokio::test]
    async fn test_server_error_is_geocoding_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/search");
            then.status(503);
        });

        let err = geocoder(&server).geocode("Accra").await.unwrap_err();
        assert!(matches!(err, ReferralError::GeocodingError { .. }));
    }

    #[tokio::test]
    async fn test_out_of_range_coordinate_is_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/search");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([{"lat": "123.0", "lon": "0.0"}]));
        });

        let err = geocoder(&server).geocode("Accra").await.unwrap_err();
        assert!(matches!(err, ReferralError::GeocodingError { .. }));
    }
}
