//! # waygraph
//!
//! waygraph is the in-memory core of an editable geographic graph: point
//! entities ([`node::Node`]) shared by ordered polyline/polygon entities
//! ([`way::Way`]), with the bookkeeping that keeps the two consistent while
//! several threads read and one edits.
//!
//! ## Features
//! - Bidirectional node/way references without ownership cycles: ways own
//!   their nodes, nodes name their ways in a referrer set.
//! - Lock-free reads of node lists and bounding boxes through published
//!   snapshots; edits serialize on a per-way reentrant lock.
//! - Edits are validated before they are published, so a rejected edit
//!   leaves the graph untouched.
//! - Topology queries (closed, area, endpoints, oneway direction,
//!   neighbours, segments) and derived metrics (length, angles).
//!
//! ## Invariant checking
//! Debug builds, and builds with the `strict-invariants` or
//! `check-invariants` feature, re-validate every way after each edit and
//! panic on a broken back-reference. See [`DebugInvariants`].
//!
//! ## Logging
//! The crate logs through the [`log`] facade and installs no logger.

pub mod dataset;
pub mod debug_invariants;
pub mod geometry;
pub mod graph_error;
pub mod node;
pub mod primitive;
pub mod way;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::dataset::{DataSet, DataSetConfig, DataSetEvent, DataSetListener};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::geometry::{BBox, EastNorth, LatLon};
    pub use crate::graph_error::{GraphError, IntegrityKind, IntegrityViolation};
    pub use crate::node::{Node, NodeRef, NodeSet};
    pub use crate::primitive::{
        InvalidateCache, Oneway, Primitive, PrimitiveData, PrimitiveId, PrimitiveType, Tags,
        WayData,
    };
    pub use crate::way::{NodeList, Way, remove_double};
}
