//! Planar angle helpers on projected coordinates.

use std::f64::consts::PI;

use super::coor::EastNorth;

/// Direction of the segment `from -> to`, in radians in `(-PI, PI]`.
#[inline]
pub fn segment_angle(from: EastNorth, to: EastNorth) -> f64 {
    (to.north - from.north).atan2(to.east - from.east)
}

/// Signed angle at `common` between the arms towards `p1` and `p3`,
/// wrapped into `(-PI, PI]`.
pub fn corner_angle(p1: EastNorth, common: EastNorth, p3: EastNorth) -> f64 {
    let mut result = segment_angle(common, p1) - segment_angle(common, p3);
    if result <= -PI {
        result += 2.0 * PI;
    }
    if result > PI {
        result -= 2.0 * PI;
    }
    result
}

/// Magnitude of an angle in degrees, in `[0, 180]` for inputs from
/// [`corner_angle`].
#[inline]
pub fn normalized_angle_degrees(radians: f64) -> f64 {
    radians.to_degrees().abs()
}
