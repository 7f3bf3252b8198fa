//! Primitive identity, kinds, flags and export records.
//!
//! The entity kind set is closed: [`Primitive`] is a tagged union over nodes
//! and ways, and callers `match` on it instead of dispatching through a
//! visitor.

pub mod cache;
pub mod flags;
pub mod id;
pub mod tags;

use std::sync::Arc;

pub use cache::{InvalidateCache, StyleCache};
pub use flags::PrimitiveFlags;
pub use id::{EntityHandle, PrimitiveId, UniqueIdGenerator};
pub use tags::{Oneway, Tags, parse_osm_boolean};

use crate::geometry::LatLon;
use crate::node::NodeRef;
use crate::way::Way;

/// Kind of a primitive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum PrimitiveType {
    Node,
    Way,
    /// Display kind of a closed way; lookups treat it like [`PrimitiveType::Way`].
    ClosedWay,
    Relation,
}

impl PrimitiveType {
    /// Storage kind, folding display-only kinds.
    pub fn storage_kind(self) -> PrimitiveType {
        match self {
            PrimitiveType::ClosedWay => PrimitiveType::Way,
            other => other,
        }
    }
}

/// An entry of a node's referrer set.
///
/// The [`EntityHandle`] keeps a way and its clone apart even though both
/// carry the same [`PrimitiveId`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Referrer {
    pub kind: PrimitiveType,
    pub id: PrimitiveId,
    pub handle: EntityHandle,
}

/// A live node or way.
#[derive(Clone, Debug)]
pub enum Primitive {
    Node(NodeRef),
    Way(Arc<Way>),
}

impl Primitive {
    pub fn kind(&self) -> PrimitiveType {
        match self {
            Primitive::Node(_) => PrimitiveType::Node,
            Primitive::Way(_) => PrimitiveType::Way,
        }
    }

    pub fn id(&self) -> PrimitiveId {
        match self {
            Primitive::Node(n) => n.id(),
            Primitive::Way(w) => w.id(),
        }
    }

    pub fn as_node(&self) -> Option<&NodeRef> {
        match self {
            Primitive::Node(n) => Some(n),
            Primitive::Way(_) => None,
        }
    }

    pub fn as_way(&self) -> Option<&Arc<Way>> {
        match self {
            Primitive::Way(w) => Some(w),
            Primitive::Node(_) => None,
        }
    }
}

impl From<NodeRef> for Primitive {
    fn from(n: NodeRef) -> Self {
        Primitive::Node(n)
    }
}

impl From<Arc<Way>> for Primitive {
    fn from(w: Arc<Way>) -> Self {
        Primitive::Way(w)
    }
}

/// Attributes every exported primitive carries.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CommonData {
    pub id: PrimitiveId,
    pub version: u32,
    pub deleted: bool,
    pub incomplete: bool,
    pub visible: bool,
    pub modified: bool,
    pub tags: Tags,
}

impl CommonData {
    pub fn new(id: PrimitiveId) -> Self {
        Self {
            id,
            version: 0,
            deleted: false,
            incomplete: false,
            visible: true,
            modified: false,
            tags: Tags::new(),
        }
    }
}

/// Exported node record.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NodeData {
    pub common: CommonData,
    pub coor: Option<LatLon>,
}

/// Exported way record: the node list as unique ids.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WayData {
    pub common: CommonData,
    pub node_ids: Vec<PrimitiveId>,
}

impl WayData {
    pub fn new(id: PrimitiveId, node_ids: Vec<PrimitiveId>) -> Self {
        Self {
            common: CommonData::new(id),
            node_ids,
        }
    }
}

/// Exported record of either kind.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum PrimitiveData {
    Node(NodeData),
    Way(WayData),
}

impl PrimitiveData {
    pub fn kind(&self) -> PrimitiveType {
        match self {
            PrimitiveData::Node(_) => PrimitiveType::Node,
            PrimitiveData::Way(_) => PrimitiveType::Way,
        }
    }
}
