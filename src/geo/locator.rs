//! Position sources.
//!
//! A terminal has no platform geolocation API, so the position comes from one
//! of the configured [`Locator`] variants. Each request is single-shot: one
//! result or one error, no retry.

use super::fence::Coordinate;
use crate::error::AppError;
use reqwest::Client;
use serde::Deserialize;
use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Options for a single position request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix that may be reused. Zero always asks for a fresh one.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_millis(10_000),
            maximum_age: Duration::ZERO,
        }
    }
}

pub trait LocationProvider: Send + Sync {
    fn current_position(
        &self,
        options: &PositionOptions,
    ) -> impl Future<Output = Result<Coordinate, AppError>> + Send;
}

/// Coarse lookup against an IP geolocation endpoint.
///
/// The endpoint must answer with a JSON object carrying `latitude` and
/// `longitude` (ipapi.co and compatible services do).
#[derive(Debug)]
pub struct IpLocator {
    client: Client,
    url: String,
    last_fix: Mutex<Option<(Instant, Coordinate)>>,
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    error: bool,
    #[serde(default)]
    reason: Option<String>,
}

impl IpLocator {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            last_fix: Mutex::new(None),
        }
    }

    fn cached(&self, maximum_age: Duration) -> Option<Coordinate> {
        if maximum_age.is_zero() {
            return None;
        }
        let guard = self.last_fix.lock().ok()?;
        guard
            .as_ref()
            .filter(|(at, _)| at.elapsed() <= maximum_age)
            .map(|(_, fix)| *fix)
    }

    fn remember(&self, fix: Coordinate) {
        if let Ok(mut guard) = self.last_fix.lock() {
            *guard = Some((Instant::now(), fix));
        }
    }

    async fn lookup(&self, options: &PositionOptions) -> Result<Coordinate, AppError> {
        if let Some(fix) = self.cached(options.maximum_age) {
            debug!("Reusing cached position fix {}", fix);
            return Ok(fix);
        }
        if options.high_accuracy {
            debug!("High accuracy requested; IP lookup only provides a coarse fix");
        }

        info!("Requesting position from {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .timeout(options.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    warn!("Position request timed out after {:?}", options.timeout);
                    AppError::position("Timed out while getting your location.")
                } else {
                    warn!("Position request failed: {}", e);
                    AppError::position("")
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Position lookup returned {}", status);
            return Err(AppError::position(""));
        }

        let body: IpLookupResponse = response.json().await.map_err(|e| {
            warn!("Unreadable position response: {}", e);
            AppError::position("")
        })?;

        if body.error {
            return Err(AppError::position(body.reason.unwrap_or_default()));
        }
        match (body.latitude, body.longitude) {
            (Some(latitude), Some(longitude)) => {
                let fix = Coordinate::new(latitude, longitude);
                self.remember(fix);
                Ok(fix)
            }
            _ => Err(AppError::position("")),
        }
    }
}

/// The configured source of positions.
#[derive(Debug)]
pub enum Locator {
    /// No position source; detection fails fast.
    Unavailable,
    /// Always report this position.
    Fixed(Coordinate),
    /// Coarse IP-based lookup.
    Ip(IpLocator),
}

impl LocationProvider for Locator {
    async fn current_position(&self, options: &PositionOptions) -> Result<Coordinate, AppError> {
        match self {
            Self::Unavailable => Err(AppError::CapabilityUnavailable),
            Self::Fixed(fix) => Ok(*fix),
            Self::Ip(locator) => locator.lookup(options).await,
        }
    }
}
