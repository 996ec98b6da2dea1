use crate::domain::model::Coordinate;
use crate::utils::error::{ReferralError, Result};
use url::Url;

pub const DEFAULT_MAPS_BASE_URL: &str = "https://www.google.com/maps/dir";

/// Builds `{base}/{lat},{lon}/{facility name}` direction links.
#[derive(Debug, Clone)]
pub struct RouteBuilder {
    base: Url,
}

impl RouteBuilder {
    pub fn new(base: &str) -> Result<Self> {
        let invalid = |reason: String| ReferralError::InvalidConfigValueError {
            field: "routing.maps_base_url".to_string(),
            value: base.to_string(),
            reason,
        };

        let url = Url::parse(base).map_err(|e| invalid(format!("Invalid URL format: {}", e)))?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("URL must be an absolute http(s) URL".to_string()));
        }

        Ok(Self { base: url })
    }

    pub fn route_url(&self, from: Coordinate, facility_name: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(&from.to_string())
                .push(facility_name);
        }
        url
    }
}

impl Default for RouteBuilder {
    fn default() -> Self {
        Self {
            base: Url::parse(DEFAULT_MAPS_BASE_URL).expect("default maps URL is valid"),
        }
    }
}
