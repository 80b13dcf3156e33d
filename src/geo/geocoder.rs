//! Reverse geocoding through a Nominatim-compatible `reverse` endpoint.

use super::fence::Coordinate;
use crate::error::{AppError, GEOCODE_FAILED};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::fmt;
use std::future::Future;
use tracing::{debug, error, info};

/// Shown when the geocoder answers but has no name for the position.
pub const UNKNOWN_LOCATION: &str = "Unknown location";

/// Display string for a resolved position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAddress(String);

impl ResolvedAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_LOCATION
    }
}

impl fmt::Display for ResolvedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub trait ReverseGeocoder: Send + Sync {
    fn reverse(
        &self,
        point: Coordinate,
    ) -> impl Future<Output = Result<ResolvedAddress, AppError>> + Send;
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
}

/// Client for Nominatim's `/reverse` API.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
    language: String,
    api_key: Option<String>,
}

impl NominatimGeocoder {
    pub fn new(client: Client, base_url: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            language: language.into(),
            api_key: None,
        }
    }

    /// Attach an API key for keyed Nominatim-compatible providers.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    fn reverse_url(&self, point: Coordinate) -> Result<Url, AppError> {
        let endpoint = format!("{}/reverse", self.base_url.trim_end_matches('/'));
        let lat = point.latitude.to_string();
        let lon = point.longitude.to_string();
        let mut params = vec![
            ("format", "jsonv2"),
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
            ("zoom", "18"),
            ("addressdetails", "1"),
            ("accept-language", self.language.as_str()),
        ];
        if let Some(key) = self.api_key.as_deref() {
            params.push(("key", key));
        }
        Url::parse_with_params(&endpoint, &params).map_err(|e| {
            error!("Invalid geocoding URL {:?}: {}", endpoint, e);
            AppError::NetworkOrHttp(GEOCODE_FAILED.to_string())
        })
    }
}

impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse(&self, point: Coordinate) -> Result<ResolvedAddress, AppError> {
        let url = self.reverse_url(point)?;
        info!("Reverse geocoding {}", point);
        debug!("GET {}", url.path());

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                error!("Geocoding request failed: {}", e);
                // No answer at all reads as a location failure; an error status below
                // reads as an address failure.
                AppError::Unreachable("Unable to fetch location.".to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("Geocoding returned {}", status);
            return Err(AppError::NetworkOrHttp(GEOCODE_FAILED.to_string()));
        }

        // A body without a usable name is not an error
        let body = response.text().await.unwrap_or_default();
        let name = serde_json::from_str::<ReverseResponse>(&body)
            .ok()
            .and_then(|r| r.display_name)
            .filter(|n| !n.trim().is_empty());

        Ok(ResolvedAddress::new(
            name.unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_url_carries_expected_parameters() {
        let geocoder = NominatimGeocoder::new(
            Client::new(),
            "https://nominatim.openstreetmap.org/",
            "en-IN",
        );
        let url = geocoder
            .reverse_url(Coordinate::new(17.385, 78.4867))
            .unwrap();

        assert_eq!(url.path(), "/reverse");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("format".into(), "jsonv2".into())));
        assert!(pairs.contains(&("lat".into(), "17.385".into())));
        assert!(pairs.contains(&("lon".into(), "78.4867".into())));
        assert!(pairs.contains(&("zoom".into(), "18".into())));
        assert!(pairs.contains(&("accept-language".into(), "en-IN".into())));
        assert!(!pairs.iter().any(|(k, _)| k == "key"));
    }

    #[test]
    fn test_blank_api_key_is_dropped() {
        let geocoder = NominatimGeocoder::new(Client::new(), "https://geo.example", "en")
            .with_api_key(Some("  ".to_string()));
        let url = geocoder.reverse_url(Coordinate::new(0.0, 0.0)).unwrap();
        assert!(!url.query_pairs().any(|(k, _)| k == "key"));

        let geocoder = geocoder.with_api_key(Some("abc123".to_string()));
        let url = geocoder.reverse_url(Coordinate::new(0.0, 0.0)).unwrap();
        assert!(url.query_pairs().any(|(k, v)| k == "key" && v == "abc123"));
    }

    #[test]
    fn test_unknown_marker() {
        assert!(ResolvedAddress::new(UNKNOWN_LOCATION).is_unknown());
        assert!(!ResolvedAddress::new("Banjara Hills, Hyderabad").is_unknown());
    }
}
