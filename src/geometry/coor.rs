//! Geographic and projected coordinates.

use std::f64::consts::{FRAC_PI_4, PI};

/// Mean radius used for great-circle distances and the spherical projection
/// (WGS84 semi-major axis, metres).
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude/longitude in degrees.
#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine distance in metres.
    ///
    /// Antipodal points can push the `asin` argument past 1 through rounding;
    /// the result is then clamped to half the circumference.
    pub fn great_circle_distance(&self, other: &LatLon) -> f64 {
        let sin_half_lat = ((other.lat - self.lat).to_radians() / 2.0).sin();
        let sin_half_lon = ((other.lon - self.lon).to_radians() / 2.0).sin();
        let h = sin_half_lat * sin_half_lat
            + self.lat.to_radians().cos()
                * other.lat.to_radians().cos()
                * sin_half_lon
                * sin_half_lon;
        let d = 2.0 * EARTH_RADIUS * h.sqrt().asin();
        if d.is_nan() { PI * EARTH_RADIUS } else { d }
    }

    /// Spherical Mercator projection.
    pub fn to_east_north(&self) -> EastNorth {
        let east = EARTH_RADIUS * self.lon.to_radians();
        let north = EARTH_RADIUS * (FRAC_PI_4 + self.lat.to_radians() / 2.0).tan().ln();
        EastNorth::new(east, north)
    }
}

/// Projected planar coordinate in metres.
#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EastNorth {
    pub east: f64,
    pub north: f64,
}

impl EastNorth {
    pub const fn new(east: f64, north: f64) -> Self {
        Self { east, north }
    }
}
