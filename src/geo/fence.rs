//! Coordinates and the rectangular service-area fence.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.latitude, self.longitude)
    }
}

/// Rectangular bound in degrees.
///
/// Edges are inclusive. `west <= east` and `south <= north` are expected of the
/// configuration and checked by [`GeoFence::is_valid`] when the config loads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoFence {
    pub west: f64,
    pub north: f64,
    pub east: f64,
    pub south: f64,
}

/// Approximate bounds of Hyderabad, the default service area.
pub const HYDERABAD: GeoFence = GeoFence {
    west: 78.30,
    north: 17.55,
    east: 78.62,
    south: 17.25,
};

/// Fallback used when a fix lands outside [`HYDERABAD`].
pub const HYDERABAD_CENTER: Coordinate = Coordinate::new(17.3850, 78.4867);

impl GeoFence {
    pub const fn new(west: f64, north: f64, east: f64, south: f64) -> Self {
        Self {
            west,
            north,
            east,
            south,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.west <= self.east
            && self.south <= self.north
            && (-180.0..=180.0).contains(&self.west)
            && (-180.0..=180.0).contains(&self.east)
            && (-90.0..=90.0).contains(&self.south)
            && (-90.0..=90.0).contains(&self.north)
    }

    pub fn contains(&self, point: Coordinate) -> bool {
        point.longitude >= self.west
            && point.longitude <= self.east
            && point.latitude <= self.north
            && point.latitude >= self.south
    }

    /// Keep `point` if it lies inside the fence, otherwise substitute `fallback`.
    ///
    /// Returns the coordinate to use and whether a substitution happened.
    pub fn snap(&self, point: Coordinate, fallback: Coordinate) -> (Coordinate, bool) {
        if self.contains(point) {
            (point, false)
        } else {
            (fallback, true)
        }
    }
}

impl Default for GeoFence {
    fn default() -> Self {
        HYDERABAD
    }
}
