//! Axis-aligned lat/lon bounding boxes.

use super::coor::LatLon;

/// Bounding box in degrees. An empty box (no points added) is invalid.
///
/// Boxes handed out by ways are immutable snapshots; build a new one with
/// [`BBox::from_points`] or [`BBox::add`] on an owned copy.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BBox {
    min_lat: f64,
    min_lon: f64,
    max_lat: f64,
    max_lon: f64,
}

impl Default for BBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl BBox {
    pub const fn empty() -> Self {
        Self {
            min_lat: f64::INFINITY,
            min_lon: f64::INFINITY,
            max_lat: f64::NEG_INFINITY,
            max_lon: f64::NEG_INFINITY,
        }
    }

    pub fn from_points<I: IntoIterator<Item = LatLon>>(points: I) -> Self {
        let mut b = Self::empty();
        for p in points {
            b.add(p);
        }
        b
    }

    /// Grows the box to contain `p`.
    pub fn add(&mut self, p: LatLon) {
        self.min_lat = self.min_lat.min(p.lat);
        self.min_lon = self.min_lon.min(p.lon);
        self.max_lat = self.max_lat.max(p.lat);
        self.max_lon = self.max_lon.max(p.lon);
    }

    /// Grows the box to contain `other`. Invalid boxes are ignored.
    pub fn add_box(&mut self, other: &BBox) {
        if other.is_valid() {
            self.add(other.bottom_left());
            self.add(other.top_right());
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min_lat <= self.max_lat && self.min_lon <= self.max_lon
    }

    pub fn bottom_left(&self) -> LatLon {
        LatLon::new(self.min_lat, self.min_lon)
    }

    pub fn top_right(&self) -> LatLon {
        LatLon::new(self.max_lat, self.max_lon)
    }

    pub fn contains(&self, p: LatLon) -> bool {
        self.is_valid()
            && (self.min_lat..=self.max_lat).contains(&p.lat)
            && (self.min_lon..=self.max_lon).contains(&p.lon)
    }

    pub fn intersects(&self, other: &BBox) -> bool {
        self.is_valid()
            && other.is_valid()
            && self.min_lat <= other.max_lat
            && other.min_lat <= self.max_lat
            && self.min_lon <= other.max_lon
            && other.min_lon <= self.max_lon
    }
}
