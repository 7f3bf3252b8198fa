//! Derived geometry of a way: length, longest segment, vertex angles.

use itertools::Itertools;

use super::Way;
use crate::geometry::metrics::{corner_angle, normalized_angle_degrees};
use crate::graph_error::GraphError;
use crate::node::NodeRef;

impl Way {
    /// Segment lengths in metres; segments with an unlocated end are skipped.
    fn segment_lengths(&self) -> impl Iterator<Item = f64> {
        let nodes = self.nodes();
        (0..nodes.len().saturating_sub(1))
            .filter_map(move |i| nodes[i + 1].great_circle_distance(&nodes[i]))
    }

    /// Sum of great-circle segment lengths in metres.
    pub fn length(&self) -> f64 {
        self.segment_lengths().sum()
    }

    /// Longest single great-circle segment in metres, `0.0` if none.
    pub fn longest_segment_length(&self) -> f64 {
        self.segment_lengths().fold(0.0, f64::max)
    }

    /// Corner angle in degrees (`0..=180`) at every inner node, in order.
    ///
    /// A closed way also gets the angle at its closing node, measured between
    /// the second-to-last and the second node. Corners involving a node with
    /// unknown coordinates are left out.
    ///
    /// # Errors
    /// `TooFewNodes` for fewer than three nodes.
    pub fn angles(&self) -> Result<Vec<(f64, NodeRef)>, GraphError> {
        let nodes = self.nodes();
        if nodes.len() < 3 {
            return Err(GraphError::TooFewNodes {
                way: self.id,
                required: 3,
                found: nodes.len(),
            });
        }
        let corner = |a: &NodeRef, at: &NodeRef, b: &NodeRef| {
            Some(normalized_angle_degrees(corner_angle(
                a.east_north()?,
                at.east_north()?,
                b.east_north()?,
            )))
        };
        let mut angles: Vec<(f64, NodeRef)> = nodes
            .iter()
            .tuple_windows()
            .filter_map(|(a, at, b)| corner(a, at, b).map(|deg| (deg, at.clone())))
            .collect();
        if self.is_closed_in(&nodes) {
            let n = nodes.len();
            if let Some(deg) = corner(&nodes[n - 2], &nodes[0], &nodes[1]) {
                angles.push((deg, nodes[0].clone()));
            }
        }
        Ok(angles)
    }
}
