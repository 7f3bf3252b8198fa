//! Point entities.
//!
//! A [`Node`] is a vertex with an optional coordinate and a back-reference
//! set naming every way that holds it. Nodes are shared through [`NodeRef`],
//! whose equality and hashing are by instance identity, never by value.
//!
//! The back-reference set stores [`Referrer`] keys rather than pointers, so
//! the node/way graph has no ownership cycle: ways own their nodes, nodes
//! only name their ways.

use std::cmp::Ordering as CmpOrdering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use arc_swap::ArcSwapOption;
use hashbrown::HashSet;
use once_cell::sync::OnceCell;
use parking_lot::{Mutex, RwLock};

use crate::geometry::{EastNorth, LatLon};
use crate::graph_error::GraphError;
use crate::primitive::id::NODE_IDS;
use crate::primitive::{
    EntityHandle, InvalidateCache, NodeData, PrimitiveFlags, PrimitiveId, PrimitiveType,
    Referrer, StyleCache, Tags,
};

/// Set of nodes keyed by instance identity.
pub type NodeSet = HashSet<NodeRef>;

/// Coordinate plus its lazily computed projection.
///
/// Replaced wholesale on every move, so the projection can never go stale.
#[derive(Debug)]
struct CoorSnapshot {
    lat_lon: LatLon,
    east_north: OnceCell<EastNorth>,
}

impl CoorSnapshot {
    fn new(lat_lon: LatLon) -> Arc<Self> {
        Arc::new(Self {
            lat_lon,
            east_north: OnceCell::new(),
        })
    }
}

/// A point entity.
pub struct Node {
    id: PrimitiveId,
    handle: EntityHandle,
    version: AtomicU32,
    flags: PrimitiveFlags,
    coor: ArcSwapOption<CoorSnapshot>,
    referrers: Mutex<HashSet<Referrer>>,
    style: StyleCache,
    /// Owning dataset id, `0` when unbound.
    dataset: AtomicU64,
    tags: RwLock<Tags>,
}

impl Node {
    fn build(id: PrimitiveId, incomplete: bool, coor: Option<LatLon>) -> NodeRef {
        NodeRef(Arc::new(Node {
            id,
            handle: EntityHandle::next(),
            version: AtomicU32::new(0),
            flags: PrimitiveFlags::new(incomplete),
            coor: ArcSwapOption::new(coor.map(CoorSnapshot::new)),
            referrers: Mutex::new(HashSet::new()),
            style: StyleCache::new(),
            dataset: AtomicU64::new(0),
            tags: RwLock::new(Tags::new()),
        }))
    }

    /// A new node with a generated id.
    pub fn new(coor: Option<LatLon>) -> NodeRef {
        Self::build(NODE_IDS.generate(), false, coor)
    }

    /// A node bound to an explicit id.
    ///
    /// `id == 0` creates a new node; `id > 0` creates an incomplete node
    /// whose data has not been loaded.
    pub fn with_id(id: i64) -> Result<NodeRef, GraphError> {
        match id {
            0 => Ok(Self::new(None)),
            id if id < 0 => Err(GraphError::NegativeId(id)),
            id => Ok(Self::build(PrimitiveId::new(id)?, true, None)),
        }
    }

    /// A complete node restored from an exported record.
    pub fn from_data(data: &NodeData) -> NodeRef {
        let c = &data.common;
        let node = Self::build(c.id, c.incomplete, data.coor);
        node.version.store(c.version, Ordering::Release);
        node.flags.set_deleted(c.deleted);
        node.flags.set_visible(c.visible);
        node.flags.set_modified(c.modified);
        *node.tags.write() = c.tags.clone();
        node
    }

    /// Exports this node.
    pub fn save(&self) -> NodeData {
        NodeData {
            common: crate::primitive::CommonData {
                id: self.id,
                version: self.version(),
                deleted: self.is_deleted(),
                incomplete: self.is_incomplete(),
                visible: self.is_visible(),
                modified: self.flags.is_modified(),
                tags: self.tags.read().clone(),
            },
            coor: self.coor(),
        }
    }

    pub fn id(&self) -> PrimitiveId {
        self.id
    }

    pub fn handle(&self) -> EntityHandle {
        self.handle
    }

    pub fn version(&self) -> u32 {
        self.version.load(Ordering::Acquire)
    }

    pub fn tag(&self, key: &str) -> Option<String> {
        self.tags.read().get(key).map(str::to_owned)
    }

    pub fn put_tag(&self, key: &str, value: &str) {
        self.tags.write().insert(key, value);
        self.style.invalidate_cache();
    }

    // ---------- flags ----------

    pub fn is_deleted(&self) -> bool {
        self.flags.is_deleted()
    }

    pub fn set_deleted(&self, deleted: bool) {
        self.flags.set_deleted(deleted);
        self.style.invalidate_cache();
    }

    pub fn is_incomplete(&self) -> bool {
        self.flags.is_incomplete()
    }

    pub fn set_incomplete(&self, incomplete: bool) {
        self.flags.set_incomplete(incomplete);
    }

    pub fn is_visible(&self) -> bool {
        self.flags.is_visible()
    }

    pub fn set_visible(&self, visible: bool) {
        self.flags.set_visible(visible);
    }

    pub fn flags(&self) -> &PrimitiveFlags {
        &self.flags
    }

    // ---------- coordinates ----------

    pub fn is_lat_lon_known(&self) -> bool {
        self.coor.load().is_some()
    }

    pub fn coor(&self) -> Option<LatLon> {
        self.coor.load_full().map(|c| c.lat_lon)
    }

    /// Projected coordinate, computed once per coordinate value.
    pub fn east_north(&self) -> Option<EastNorth> {
        self.coor
            .load_full()
            .map(|c| *c.east_north.get_or_init(|| c.lat_lon.to_east_north()))
    }

    /// Replaces the coordinate.
    ///
    /// Ways holding this node are not told; inside a dataset use
    /// [`crate::dataset::DataSet::move_node`], which signals them.
    pub fn set_coor(&self, coor: Option<LatLon>) {
        self.coor.store(coor.map(CoorSnapshot::new));
        self.style.invalidate_cache();
    }

    /// Great-circle distance in metres, `None` if either coordinate is unknown.
    pub fn great_circle_distance(&self, other: &Node) -> Option<f64> {
        let a = self.coor()?;
        let b = other.coor()?;
        Some(a.great_circle_distance(&b))
    }

    /// Same coordinate and tags, regardless of id or referrers.
    pub fn has_equal_semantic_attributes(&self, other: &Node) -> bool {
        let tags = self.tags.read().clone();
        self.coor() == other.coor() && tags == *other.tags.read()
    }

    // ---------- referrers ----------

    pub fn add_referrer(&self, r: Referrer) {
        self.referrers.lock().insert(r);
    }

    pub fn remove_referrer(&self, r: &Referrer) {
        self.referrers.lock().remove(r);
    }

    pub fn has_referrer(&self, r: &Referrer) -> bool {
        self.referrers.lock().contains(r)
    }

    /// Snapshot of the referrer set, sorted by kind then id.
    pub fn referrers(&self) -> Vec<Referrer> {
        let mut out: Vec<Referrer> = self.referrers.lock().iter().copied().collect();
        out.sort_unstable_by_key(|r| (r.kind, r.id, r.handle));
        out
    }

    /// Ids of the ways referring to this node.
    pub fn referring_way_ids(&self) -> Vec<PrimitiveId> {
        self.referrers()
            .into_iter()
            .filter(|r| r.kind == PrimitiveType::Way)
            .map(|r| r.id)
            .collect()
    }

    // ---------- style ----------

    pub fn clear_cached_style(&self) {
        self.style.invalidate_cache();
    }

    pub fn style_cache(&self) -> &StyleCache {
        &self.style
    }

    // ---------- dataset ----------

    pub fn dataset_id(&self) -> Option<u64> {
        match self.dataset.load(Ordering::Acquire) {
            0 => None,
            id => Some(id),
        }
    }

    pub(crate) fn set_dataset_id(&self, id: Option<u64>) {
        self.dataset.store(id.unwrap_or(0), Ordering::Release);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("coor", &self.coor())
            .field("flags", &self.flags)
            .finish()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{Node id={} version={} {}", self.id, self.version(), self.flags)?;
        match self.coor() {
            Some(c) => write!(f, " lat={},lon={}}}", c.lat, c.lon),
            None => write!(f, "}}"),
        }
    }
}

/// Shared handle to a [`Node`], compared and hashed by instance identity.
#[derive(Clone)]
pub struct NodeRef(Arc<Node>);

impl NodeRef {
    /// `true` when both handles point at the same node instance.
    #[inline]
    pub fn ptr_eq(&self, other: &NodeRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for NodeRef {
    type Target = Node;
    #[inline]
    fn deref(&self) -> &Node {
        &self.0
    }
}

impl PartialEq for NodeRef {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for NodeRef {}

impl Hash for NodeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.handle.hash(state);
    }
}

/// Canonical order: by id, then by instance handle.
impl Ord for NodeRef {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        (self.0.id, self.0.handle).cmp(&(other.0.id, other.0.handle))
    }
}

impl PartialOrd for NodeRef {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeRef({})", self.0.id)
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}
