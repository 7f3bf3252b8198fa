//! Way entities: ordered node sequences with referrer bookkeeping.
//!
//! A [`Way`] owns a snapshot of its node list and keeps every listed node's
//! referrer set pointing back at itself. All mutation goes through one
//! reentrant write lock per way; reads never lock.
//!
//! # Concurrency
//! - The node list is an `Arc<Vec<NodeRef>>` swapped in whole. Readers
//!   [`Way::nodes`] a snapshot and see either the old or the new list.
//! - The bounding box is an immutable [`BBox`] snapshot tagged with the
//!   geometry epoch it was computed for; every geometry change bumps the
//!   epoch.
//! - Writers validate the candidate list before publishing it, so a
//!   rejected edit leaves the way untouched.
//!
//! Submodules split the surface: [`mutation`] (node list edits),
//! [`topology`] (closed/area/endpoint queries), [`metrics`] (length and
//! angles) and [`consistency`] (the integrity checker).

pub mod consistency;
pub mod metrics;
pub mod mutation;
pub mod topology;

#[cfg(test)]
mod tests;

use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use arc_swap::{ArcSwap, ArcSwapOption};
use itertools::Itertools;
use parking_lot::{ReentrantMutex, ReentrantMutexGuard, RwLock};

use crate::dataset::DataSet;
use crate::geometry::BBox;
use crate::graph_error::{GraphError, IntegrityKind, IntegrityViolation};
use crate::node::NodeRef;
use crate::primitive::id::WAY_IDS;
use crate::primitive::{
    CommonData, EntityHandle, InvalidateCache, Primitive, PrimitiveData, PrimitiveFlags,
    PrimitiveId, PrimitiveType, Referrer, StyleCache, Tags, WayData,
};

pub use mutation::remove_double;

/// Immutable node list snapshot.
pub type NodeList = Arc<Vec<NodeRef>>;

#[derive(Debug)]
struct CachedBBox {
    epoch: u64,
    bbox: Arc<BBox>,
}

/// A polyline or polygon over shared nodes.
pub struct Way {
    id: PrimitiveId,
    handle: EntityHandle,
    version: AtomicU32,
    flags: PrimitiveFlags,
    tags: RwLock<Tags>,
    nodes: ArcSwap<Vec<NodeRef>>,
    geometry_epoch: AtomicU64,
    bbox: ArcSwapOption<CachedBBox>,
    style: StyleCache,
    dataset: RwLock<Option<Weak<DataSet>>>,
    write_lock: ReentrantMutex<()>,
}

impl Default for Way {
    fn default() -> Self {
        Self::new()
    }
}

impl Way {
    fn build(id: PrimitiveId, incomplete: bool) -> Self {
        Self {
            id,
            handle: EntityHandle::next(),
            version: AtomicU32::new(0),
            flags: PrimitiveFlags::new(incomplete),
            tags: RwLock::new(Tags::new()),
            nodes: ArcSwap::from_pointee(Vec::new()),
            geometry_epoch: AtomicU64::new(0),
            bbox: ArcSwapOption::empty(),
            style: StyleCache::new(),
            dataset: RwLock::new(None),
            write_lock: ReentrantMutex::new(()),
        }
    }

    /// A new, empty way with a generated id.
    pub fn new() -> Self {
        Self::build(WAY_IDS.generate(), false)
    }

    /// A way bound to an explicit id.
    ///
    /// `id == 0` creates a new way; `id > 0` creates an incomplete way whose
    /// node list has not been loaded yet.
    pub fn with_id(id: i64) -> Result<Self, GraphError> {
        match id {
            0 => Ok(Self::new()),
            id if id < 0 => Err(GraphError::NegativeId(id)),
            id => Ok(Self::build(PrimitiveId::new(id)?, true)),
        }
    }

    /// Like [`Way::with_id`], also setting the version.
    pub fn with_id_and_version(id: i64, version: u32) -> Result<Self, GraphError> {
        let way = Self::with_id(id)?;
        way.version.store(version, Ordering::Release);
        Ok(way)
    }

    /// Copies `original`, optionally with its node list.
    ///
    /// With `copy_nodes` the copy shares the original's nodes and is added to
    /// their referrer sets. With `clear_metadata` the copy gets a fresh new id
    /// and version 0. The copy is not bound to any dataset.
    pub fn duplicate(&self, clear_metadata: bool, copy_nodes: bool) -> Result<Self, GraphError> {
        let id = if clear_metadata { WAY_IDS.generate() } else { self.id };
        let way = Self::build(id, false);
        way.copy_attributes_from(self);
        if clear_metadata {
            way.version.store(0, Ordering::Release);
            way.flags.set_incomplete(false);
            way.flags.set_modified(true);
        }
        if copy_nodes {
            let _guard = way.write_lock();
            way.set_nodes_locked(self.nodes().to_vec())?;
        }
        Ok(way)
    }

    // ---------- identity & flags ----------

    pub fn id(&self) -> PrimitiveId {
        self.id
    }

    pub fn handle(&self) -> EntityHandle {
        self.handle
    }

    pub fn version(&self) -> u32 {
        self.version.load(Ordering::Acquire)
    }

    pub fn flags(&self) -> &PrimitiveFlags {
        &self.flags
    }

    pub fn is_incomplete(&self) -> bool {
        self.flags.is_incomplete()
    }

    pub fn is_deleted(&self) -> bool {
        self.flags.is_deleted()
    }

    pub fn is_visible(&self) -> bool {
        self.flags.is_visible()
    }

    pub fn is_new(&self) -> bool {
        self.id.is_new()
    }

    /// Key under which this way appears in node referrer sets.
    pub fn as_referrer(&self) -> Referrer {
        Referrer {
            kind: PrimitiveType::Way,
            id: self.id,
            handle: self.handle,
        }
    }

    // ---------- node list reads ----------

    /// Current node list snapshot.
    pub fn nodes(&self) -> NodeList {
        self.nodes.load_full()
    }

    pub fn nodes_count(&self) -> usize {
        self.nodes.load().len()
    }

    pub fn node(&self, index: usize) -> Option<NodeRef> {
        self.nodes.load().get(index).cloned()
    }

    /// Persisted node ids, `0` for new nodes.
    pub fn node_ids(&self) -> Vec<i64> {
        self.nodes.load().iter().map(|n| n.id().osm_id()).collect()
    }

    /// Unique node ids, in order.
    pub fn unique_node_ids(&self) -> Vec<PrimitiveId> {
        self.nodes.load().iter().map(|n| n.id()).collect()
    }

    pub fn contains_node(&self, node: &NodeRef) -> bool {
        self.nodes.load().contains(node)
    }

    pub fn has_incomplete_nodes(&self) -> bool {
        self.nodes.load().iter().any(|n| n.is_incomplete())
    }

    pub fn has_only_locatable_nodes(&self) -> bool {
        self.nodes.load().iter().all(|n| n.is_lat_lon_known())
    }

    pub fn is_usable(&self) -> bool {
        !self.is_deleted() && !self.is_incomplete() && self.is_visible() && !self.has_incomplete_nodes()
    }

    pub fn is_drawable(&self) -> bool {
        !self.is_deleted()
            && !self.is_incomplete()
            && self.is_visible()
            && self.has_only_locatable_nodes()
    }

    // ---------- dataset binding ----------

    /// Containing dataset, if bound and still alive.
    pub fn dataset(&self) -> Option<Arc<DataSet>> {
        self.dataset.read().as_ref().and_then(Weak::upgrade)
    }

    /// Binds to (or, with `None`, unbinds from) a dataset.
    ///
    /// The current node list is validated against the new dataset first; on
    /// failure the binding is left as it was.
    pub(crate) fn bind_dataset(&self, dataset: Option<&Arc<DataSet>>) -> Result<(), GraphError> {
        let _guard = self.write_lock();
        if let Some(ds) = dataset {
            consistency::check_nodes(self, Some(ds), &self.nodes.load())?;
        }
        *self.dataset.write() = dataset.map(Arc::downgrade);
        self.invalidate_geometry();
        Ok(())
    }

    pub(crate) fn check_dataset_not_read_only(&self) -> Result<(), GraphError> {
        match self.dataset() {
            Some(ds) if ds.is_read_only() => {
                Err(GraphError::ReadOnlyViolation { dataset: ds.id() })
            }
            _ => Ok(()),
        }
    }

    /// Acquire the per-way write lock. Reentrant on the same thread.
    pub(crate) fn write_lock(&self) -> ReentrantMutexGuard<'_, ()> {
        self.write_lock.lock()
    }

    // ---------- caches ----------

    fn invalidate_geometry(&self) {
        self.geometry_epoch.fetch_add(1, Ordering::AcqRel);
        self.bbox.store(None);
    }

    /// Bounding box of all nodes with known coordinates.
    ///
    /// Cached while bound to a dataset, where node moves are signalled through
    /// [`Way::update_position`]; recomputed on every call otherwise.
    pub fn bbox(&self) -> Arc<BBox> {
        if self.dataset().is_none() {
            return Arc::new(self.compute_bbox());
        }
        let epoch = self.geometry_epoch.load(Ordering::Acquire);
        if let Some(cached) = self.bbox.load_full() {
            if cached.epoch == epoch {
                return Arc::clone(&cached.bbox);
            }
        }
        log::trace!("way {}: recomputing bbox at epoch {epoch}", self.id);
        let bbox = Arc::new(self.compute_bbox());
        self.bbox.store(Some(Arc::new(CachedBBox {
            epoch,
            bbox: Arc::clone(&bbox),
        })));
        bbox
    }

    fn compute_bbox(&self) -> BBox {
        BBox::from_points(self.nodes.load().iter().filter_map(|n| n.coor()))
    }

    /// Signal that a node of this way moved.
    pub fn update_position(&self) {
        log::trace!("way {}: position update", self.id);
        self.invalidate_geometry();
        self.style.invalidate_cache();
    }

    pub fn clear_cached_style(&self) {
        self.style.invalidate_cache();
    }

    pub fn style_cache(&self) -> &StyleCache {
        &self.style
    }

    /// Clears the cached style of every node of this way.
    pub fn clear_cached_node_styles(&self) {
        for n in self.nodes.load().iter() {
            n.clear_cached_style();
        }
    }

    // ---------- tags ----------

    pub fn tag(&self, key: &str) -> Option<String> {
        self.tags.read().get(key).map(str::to_owned)
    }

    pub fn tags(&self) -> Tags {
        self.tags.read().clone()
    }

    pub fn put_tag(&self, key: &str, value: &str) -> Result<(), GraphError> {
        self.check_dataset_not_read_only()?;
        let _guard = self.write_lock();
        self.tags.write().insert(key, value);
        self.keys_changed();
        Ok(())
    }

    pub fn remove_tag(&self, key: &str) -> Result<Option<String>, GraphError> {
        self.check_dataset_not_read_only()?;
        let _guard = self.write_lock();
        let old = self.tags.write().remove(key);
        self.keys_changed();
        Ok(old)
    }

    pub fn set_tags(&self, tags: Tags) -> Result<(), GraphError> {
        self.check_dataset_not_read_only()?;
        let _guard = self.write_lock();
        *self.tags.write() = tags;
        self.keys_changed();
        Ok(())
    }

    fn keys_changed(&self) {
        self.style.invalidate_cache();
        self.clear_cached_node_styles();
    }

    // ---------- import / export ----------

    /// Exports this way with its node list as unique ids.
    pub fn save(&self) -> WayData {
        WayData {
            common: CommonData {
                id: self.id,
                version: self.version(),
                deleted: self.is_deleted(),
                incomplete: self.is_incomplete(),
                visible: self.is_visible(),
                modified: self.flags.is_modified(),
                tags: self.tags(),
            },
            node_ids: self.unique_node_ids(),
        }
    }

    /// Loads an exported record, resolving node ids in the bound dataset.
    ///
    /// # Errors
    /// - `WrongPrimitiveKind` / `IdMismatch` for a record of another primitive.
    /// - `DataIntegrity` if ids are given but the way has no dataset, or an id
    ///   does not resolve to a node.
    pub fn load(&self, data: &PrimitiveData) -> Result<(), GraphError> {
        let PrimitiveData::Way(data) = data else {
            return Err(GraphError::WrongPrimitiveKind {
                expected: PrimitiveType::Way,
                found: data.kind(),
            });
        };
        if data.common.id != self.id {
            return Err(GraphError::IdMismatch {
                expected: self.id,
                found: data.common.id,
            });
        }
        self.check_dataset_not_read_only()?;
        let _guard = self.write_lock();

        let resolved = self.resolve_node_ids(&data.node_ids).inspect_err(|e| {
            log::warn!("way {}: load failed: {e}", self.id);
        })?;
        consistency::check_nodes(self, self.dataset().as_ref(), &resolved)?;

        // Nothing below can fail: attributes and nodes land together.
        self.apply_common(&data.common);
        self.publish_nodes_locked(resolved);
        Ok(())
    }

    fn apply_common(&self, c: &CommonData) {
        self.version.store(c.version, Ordering::Release);
        self.flags.set_deleted(c.deleted);
        self.flags.set_incomplete(c.incomplete);
        self.flags.set_visible(c.visible);
        self.flags.set_modified(c.modified);
        *self.tags.write() = c.tags.clone();
        self.style.invalidate_cache();
    }

    fn resolve_node_ids(&self, ids: &[PrimitiveId]) -> Result<Vec<NodeRef>, GraphError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ds = self.dataset().ok_or_else(|| {
            IntegrityViolation::new(IntegrityKind::NoDataSet, self.id, None)
        })?;
        ids.iter()
            .map(|&id| {
                ds.node(id).ok_or_else(|| {
                    IntegrityViolation::new(IntegrityKind::MissingNode, self.id, Some(id)).into()
                })
            })
            .collect()
    }

    /// Copies version, flags, tags and optionally the node list of another way.
    ///
    /// The id is kept.
    pub fn clone_from(&self, other: &Primitive, copy_nodes: bool) -> Result<(), GraphError> {
        let Primitive::Way(other) = other else {
            return Err(GraphError::WrongPrimitiveKind {
                expected: PrimitiveType::Way,
                found: other.kind(),
            });
        };
        self.check_dataset_not_read_only()?;
        let _guard = self.write_lock();
        let nodes = copy_nodes.then(|| other.nodes().to_vec());
        if let Some(nodes) = &nodes {
            consistency::check_nodes(self, self.dataset().as_ref(), nodes)?;
        }
        self.copy_attributes_from(other);
        if let Some(nodes) = nodes {
            self.publish_nodes_locked(nodes);
        }
        Ok(())
    }

    fn copy_attributes_from(&self, other: &Way) {
        self.version.store(other.version(), Ordering::Release);
        self.flags.copy_from(&other.flags);
        *self.tags.write() = other.tags();
        self.style.invalidate_cache();
    }

    /// Same tags and pairwise semantically equal nodes.
    pub fn has_equal_semantic_attributes(&self, other: &Way) -> bool {
        let (mine, theirs) = (self.nodes(), other.nodes());
        mine.len() == theirs.len()
            && self.tags() == other.tags()
            && mine
                .iter()
                .zip(theirs.iter())
                .all(|(a, b)| a.has_equal_semantic_attributes(b))
    }
}

impl fmt::Display for Way {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{Way id={} version={} {} ", self.id, self.version(), self.flags)?;
        if self.is_incomplete() {
            write!(f, "(incomplete)}}")
        } else {
            let ids = self.nodes.load().iter().map(|n| n.id()).join(", ");
            write!(f, "nodes=[{ids}]}}")
        }
    }
}

impl fmt::Debug for Way {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Way")
            .field("id", &self.id)
            .field("version", &self.version())
            .field("flags", &self.flags)
            .field("nodes", &self.unique_node_ids())
            .finish()
    }
}
