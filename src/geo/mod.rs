//! Geolocation resolver.
//!
//! Obtains a device position, corrects it against the configured service
//! area and turns it into a human-readable address.
//!
//! ```text
//! LocationProvider ──► GeoFence::snap ──► ReverseGeocoder ──► ResolvedAddress
//!   (position)          (fallback center)    (Nominatim)
//! ```
//!
//! The whole sequence runs under a [`CancelToken`] so a view can abandon it.

pub mod cancel;
pub mod fence;
pub mod geocoder;
pub mod locator;
pub mod resolver;

pub use cancel::CancelToken;
pub use fence::{Coordinate, GeoFence};
pub use geocoder::{NominatimGeocoder, ResolvedAddress, ReverseGeocoder};
pub use locator::{IpLocator, LocationProvider, Locator, PositionOptions};
pub use resolver::{Detection, GeolocationResolver};
