//! Detect-then-geocode sequence.

use super::cancel::CancelToken;
use super::fence::{Coordinate, GeoFence};
use super::geocoder::{ResolvedAddress, ReverseGeocoder};
use super::locator::{LocationProvider, PositionOptions};
use crate::error::AppError;
use tracing::{info, warn};

/// Outcome of a successful detection.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Position reported by the provider.
    pub reported: Coordinate,
    /// Position that was geocoded (always inside the fence).
    pub resolved: Coordinate,
    /// Whether `reported` fell outside the fence and was replaced.
    pub substituted: bool,
    pub address: ResolvedAddress,
}

pub struct GeolocationResolver<L, G> {
    locator: L,
    geocoder: G,
    fence: GeoFence,
    fallback: Coordinate,
    options: PositionOptions,
}

impl<L, G> GeolocationResolver<L, G>
where
    L: LocationProvider,
    G: ReverseGeocoder,
{
    pub fn new(locator: L, geocoder: G, fence: GeoFence, fallback: Coordinate) -> Self {
        Self {
            locator,
            geocoder,
            fence,
            fallback,
            options: PositionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PositionOptions) -> Self {
        self.options = options;
        self
    }

    /// Obtain the device position and resolve it to an address.
    ///
    /// Geocoding only starts once a position is known. Cancelling `cancel`
    /// ends the operation with [`AppError::Cancelled`] at whichever step it
    /// is in.
    pub async fn detect_location(&self, cancel: &CancelToken) -> Result<Detection, AppError> {
        if cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                info!("Location detection cancelled");
                Err(AppError::Cancelled)
            }
            result = self.run() => result,
        }
    }

    async fn run(&self) -> Result<Detection, AppError> {
        let reported = self.locator.current_position(&self.options).await?;
        let (resolved, substituted) = self.fence.snap(reported, self.fallback);
        if substituted {
            warn!(
                "Position {} is outside the service area, using {} instead",
                reported, resolved
            );
        }
        let address = self.geocoder.reverse(resolved).await?;
        info!("Resolved location: {}", address);
        Ok(Detection {
            reported,
            resolved,
            substituted,
            address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GEOCODE_FAILED;
    use crate::geo::fence::{HYDERABAD, HYDERABAD_CENTER};
    use crate::geo::locator::Locator;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Records every coordinate it is asked about.
    #[derive(Default, Clone)]
    struct RecordingGeocoder {
        seen: Arc<Mutex<Vec<Coordinate>>>,
        fail: bool,
    }

    impl ReverseGeocoder for RecordingGeocoder {
        async fn reverse(&self, point: Coordinate) -> Result<ResolvedAddress, AppError> {
            self.seen.lock().unwrap().push(point);
            if self.fail {
                Err(AppError::NetworkOrHttp(GEOCODE_FAILED.to_string()))
            } else {
                Ok(ResolvedAddress::new(format!("near {}", point)))
            }
        }
    }

    struct SlowLocator {
        calls: Arc<AtomicUsize>,
    }

    impl LocationProvider for SlowLocator {
        async fn current_position(&self, _: &PositionOptions) -> Result<Coordinate, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(HYDERABAD_CENTER)
        }
    }

    fn resolver(
        locator: Locator,
        geocoder: RecordingGeocoder,
    ) -> GeolocationResolver<Locator, RecordingGeocoder> {
        GeolocationResolver::new(locator, geocoder, HYDERABAD, HYDERABAD_CENTER)
    }

    #[tokio::test]
    async fn test_inside_fix_is_geocoded_as_is() {
        let geocoder = RecordingGeocoder::default();
        let fix = Coordinate::new(17.4401, 78.3489);
        let detection = resolver(Locator::Fixed(fix), geocoder.clone())
            .detect_location(&CancelToken::new())
            .await
            .unwrap();

        assert!(!detection.substituted);
        assert_eq!(detection.resolved, fix);
        assert_eq!(geocoder.seen.lock().unwrap().as_slice(), &[fix]);
    }

    #[tokio::test]
    async fn test_outside_fix_is_replaced_with_fallback() {
        let geocoder = RecordingGeocoder::default();
        let delhi = Coordinate::new(28.6139, 77.2090);
        let detection = resolver(Locator::Fixed(delhi), geocoder.clone())
            .detect_location(&CancelToken::new())
            .await
            .unwrap();

        assert!(detection.substituted);
        assert_eq!(detection.reported, delhi);
        assert_eq!(detection.resolved, HYDERABAD_CENTER);
        assert_eq!(geocoder.seen.lock().unwrap().as_slice(), &[HYDERABAD_CENTER]);
    }

    #[tokio::test]
    async fn test_no_capability_skips_geocoding() {
        let geocoder = RecordingGeocoder::default();
        let err = resolver(Locator::Unavailable, geocoder.clone())
            .detect_location(&CancelToken::new())
            .await
            .unwrap_err();

        assert_eq!(err, AppError::CapabilityUnavailable);
        assert!(geocoder.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_geocode_failure_surfaces_message() {
        let geocoder = RecordingGeocoder {
            fail: true,
            ..Default::default()
        };
        let err = resolver(Locator::Fixed(HYDERABAD_CENTER), geocoder)
            .detect_location(&CancelToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch address.");
    }

    #[tokio::test]
    async fn test_cancel_abandons_pending_position_request() {
        let calls = Arc::new(AtomicUsize::new(0));
        let geocoder = RecordingGeocoder::default();
        let resolver = GeolocationResolver::new(
            SlowLocator {
                calls: calls.clone(),
            },
            geocoder.clone(),
            HYDERABAD,
            HYDERABAD_CENTER,
        );
        let token = CancelToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let result = tokio::time::timeout(Duration::from_secs(2), resolver.detect_location(&token))
            .await
            .expect("cancellation should end the detection");
        assert_eq!(result, Err(AppError::Cancelled));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(geocoder.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_does_nothing() {
        let geocoder = RecordingGeocoder::default();
        let token = CancelToken::new();
        token.cancel();
        let result = resolver(Locator::Fixed(HYDERABAD_CENTER), geocoder.clone())
            .detect_location(&token)
            .await;
        assert_eq!(result, Err(AppError::Cancelled));
        assert!(geocoder.seen.lock().unwrap().is_empty());
    }
}
