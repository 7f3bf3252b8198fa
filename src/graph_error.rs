//! GraphError: Unified error type for waygraph public APIs
//!
//! Every fallible operation on ways, nodes and datasets reports through this
//! type. Data-integrity failures are kept in their own variant so callers can
//! tell an upstream editing bug apart from an ordinary rejected call.

use std::fmt;

use thiserror::Error;

use crate::primitive::{PrimitiveId, PrimitiveType};

/// Unified error type for waygraph operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Attempted to construct a PrimitiveId with a zero value (invalid).
    #[error("PrimitiveId must be non-zero (0 is reserved for unassigned ids)")]
    InvalidPrimitiveId,
    /// The containing dataset is in read-only mode.
    #[error("dataset {dataset} is read-only")]
    ReadOnlyViolation { dataset: u64 },
    /// Node insertion on a way whose node list has not been loaded.
    #[error("cannot add node {node} to incomplete way {way}")]
    IncompleteWay { way: PrimitiveId, node: PrimitiveId },
    /// Insertion offset outside `0..=len`.
    #[error("offset {offset} out of range for way with {len} nodes")]
    IndexOutOfRange { offset: usize, len: usize },
    /// Explicit ids must be `>= 0`.
    #[error("primitive id must be >= 0, got {0}")]
    NegativeId(i64),
    /// A data record for a different primitive was handed to load.
    #[error("record for {found} loaded into primitive {expected}")]
    IdMismatch {
        expected: PrimitiveId,
        found: PrimitiveId,
    },
    /// The dataset already holds a primitive with this id.
    #[error("dataset already contains primitive {0}")]
    DuplicatePrimitive(PrimitiveId),
    /// A primitive or data record of the wrong kind was handed to load/clone.
    #[error("expected {expected:?}, found {found:?}")]
    WrongPrimitiveKind {
        expected: PrimitiveType,
        found: PrimitiveType,
    },
    /// Too few nodes for the requested derived geometry.
    #[error("way {way} needs at least {required} nodes, has {found}")]
    TooFewNodes {
        way: PrimitiveId,
        required: usize,
        found: usize,
    },
    /// The consistency checker rejected the state. This is a caller bug
    /// upstream and must abort the enclosing edit.
    #[error("data integrity problem: {0}")]
    DataIntegrity(IntegrityViolation),
}

impl From<IntegrityViolation> for GraphError {
    fn from(v: IntegrityViolation) -> Self {
        GraphError::DataIntegrity(v)
    }
}

/// Which invariant a [`IntegrityViolation`] broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegrityKind {
    /// Node belongs to a different dataset than the way.
    ForeignDataSet,
    /// Node is flagged deleted.
    DeletedNode,
    /// Complete visible node without coordinates.
    NullCoordinates,
    /// Node id could not be resolved in the dataset.
    MissingNode,
    /// Non-empty node list imported into a way with no dataset.
    NoDataSet,
    /// Node in the way does not list the way as referrer.
    MissingReferrer,
    /// Node lists the way as referrer but is not in its node list.
    StaleReferrer,
}

impl fmt::Display for IntegrityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IntegrityKind::ForeignDataSet => "nodes in way must be in the same dataset",
            IntegrityKind::DeletedNode => "deleted node referenced",
            IntegrityKind::NullCoordinates => "complete visible node with null coordinates",
            IntegrityKind::MissingNode => "way with missing node detected",
            IntegrityKind::NoDataSet => "way without dataset detected",
            IntegrityKind::MissingReferrer => "node does not refer back to way",
            IntegrityKind::StaleReferrer => "node refers to way that does not contain it",
        };
        f.write_str(s)
    }
}

/// Offending entities of a failed consistency check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityViolation {
    pub kind: IntegrityKind,
    pub way: PrimitiveId,
    /// `None` when the failure is not tied to a single node.
    pub node: Option<PrimitiveId>,
}

impl IntegrityViolation {
    pub fn new(kind: IntegrityKind, way: PrimitiveId, node: Option<PrimitiveId>) -> Self {
        Self { kind, way, node }
    }
}

impl fmt::Display for IntegrityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node {
            Some(n) => write!(f, "{} (way {}, node {})", self.kind, self.way, n),
            None => write!(f, "{} (way {})", self.kind, self.way),
        }
    }
}
