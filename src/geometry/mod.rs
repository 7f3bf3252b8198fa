//! Geometry utilities for waygraph.
//!
//! Coordinates, bounding boxes and the angle/distance formulas that way
//! metrics are built on.

pub mod bbox;
pub mod coor;
pub mod metrics;

pub use bbox::BBox;
pub use coor::{EARTH_RADIUS, EastNorth, LatLon};
