//! Containing graph for nodes and ways.
//!
//! A [`DataSet`] indexes primitives by id, owns the read-only switch and the
//! integrity configuration, and fans structural change events out to
//! listeners. Ways hold only a weak back-reference to their dataset.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::RwLock;

use crate::geometry::LatLon;
use crate::graph_error::GraphError;
use crate::node::NodeRef;
use crate::primitive::{Primitive, PrimitiveId, PrimitiveType};
use crate::way::Way;

/// Integrity and access options of a dataset.
#[derive(Debug, Clone, Copy)]
pub struct DataSetConfig {
    /// Reject complete, visible nodes without coordinates in way node lists.
    pub check_null_coordinates: bool,
    /// Start in read-only mode.
    pub read_only: bool,
}

impl Default for DataSetConfig {
    fn default() -> Self {
        Self {
            check_null_coordinates: true,
            read_only: false,
        }
    }
}

/// Structural change notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSetEvent {
    PrimitivesAdded(Vec<(PrimitiveType, PrimitiveId)>),
    PrimitivesRemoved(Vec<(PrimitiveType, PrimitiveId)>),
    /// The node list (or deleted state) of a way changed.
    WayNodesChanged(PrimitiveId),
    NodeMoved(PrimitiveId),
}

/// Receives [`DataSetEvent`]s synchronously, on the mutating thread.
///
/// Listeners run while the originating way's write lock is held; they may
/// read any way but must not mutate the way that fired the event from
/// another thread and wait for it.
pub trait DataSetListener: Send + Sync {
    fn on_event(&self, event: &DataSetEvent);
}

static NEXT_DATASET_ID: AtomicU64 = AtomicU64::new(1);

/// Holds nodes and ways and resolves ids to live entities.
pub struct DataSet {
    id: u64,
    config: DataSetConfig,
    read_only: AtomicBool,
    nodes: DashMap<PrimitiveId, NodeRef>,
    ways: DashMap<PrimitiveId, Arc<Way>>,
    listeners: RwLock<Vec<Arc<dyn DataSetListener>>>,
}

impl DataSet {
    pub fn new() -> Arc<Self> {
        Self::with_config(DataSetConfig::default())
    }

    pub fn with_config(config: DataSetConfig) -> Arc<Self> {
        Arc::new(Self {
            id: NEXT_DATASET_ID.fetch_add(1, Ordering::Relaxed),
            config,
            read_only: AtomicBool::new(config.read_only),
            nodes: DashMap::new(),
            ways: DashMap::new(),
            listeners: RwLock::new(Vec::new()),
        })
    }

    /// Process-unique id of this dataset, never `0`.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn config(&self) -> &DataSetConfig {
        &self.config
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only.load(Ordering::Acquire)
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::Release);
    }

    fn check_writable(&self) -> Result<(), GraphError> {
        if self.is_read_only() {
            Err(GraphError::ReadOnlyViolation { dataset: self.id })
        } else {
            Ok(())
        }
    }

    // ---------- membership ----------

    /// Adds a node and binds it to this dataset.
    pub fn add_node(&self, node: NodeRef) -> Result<(), GraphError> {
        self.check_writable()?;
        let id = node.id();
        match self.nodes.entry(id) {
            Entry::Occupied(_) => return Err(GraphError::DuplicatePrimitive(id)),
            Entry::Vacant(slot) => {
                node.set_dataset_id(Some(self.id));
                slot.insert(node);
            }
        }
        self.fire(&DataSetEvent::PrimitivesAdded(vec![(PrimitiveType::Node, id)]));
        Ok(())
    }

    /// Adds a way and binds it to this dataset.
    ///
    /// # Errors
    /// `DataIntegrity` if the way's nodes are not all live members of this
    /// dataset; the way then stays unbound.
    pub fn add_way(self: &Arc<Self>, way: Arc<Way>) -> Result<(), GraphError> {
        self.check_writable()?;
        let id = way.id();
        match self.ways.entry(id) {
            Entry::Occupied(_) => return Err(GraphError::DuplicatePrimitive(id)),
            Entry::Vacant(slot) => {
                way.bind_dataset(Some(self))?;
                slot.insert(way);
            }
        }
        self.fire(&DataSetEvent::PrimitivesAdded(vec![(PrimitiveType::Way, id)]));
        Ok(())
    }

    /// Removes and unbinds a way. Its node list and referrers are untouched.
    pub fn remove_way(&self, id: PrimitiveId) -> Result<Option<Arc<Way>>, GraphError> {
        self.check_writable()?;
        let Some((_, way)) = self.ways.remove(&id) else {
            return Ok(None);
        };
        way.bind_dataset(None)?;
        self.fire(&DataSetEvent::PrimitivesRemoved(vec![(PrimitiveType::Way, id)]));
        Ok(Some(way))
    }

    // ---------- lookup ----------

    pub fn node(&self, id: PrimitiveId) -> Option<NodeRef> {
        self.nodes.get(&id).map(|n| n.value().clone())
    }

    pub fn way(&self, id: PrimitiveId) -> Option<Arc<Way>> {
        self.ways.get(&id).map(|w| Arc::clone(w.value()))
    }

    /// Resolve an id of the given kind. Relations are not stored here.
    pub fn primitive_by_id(&self, id: PrimitiveId, kind: PrimitiveType) -> Option<Primitive> {
        match kind.storage_kind() {
            PrimitiveType::Node => self.node(id).map(Primitive::Node),
            PrimitiveType::Way => self.way(id).map(Primitive::Way),
            _ => None,
        }
    }

    /// Snapshot of all nodes, in id order.
    pub fn nodes(&self) -> Vec<NodeRef> {
        let mut out: Vec<NodeRef> = self.nodes.iter().map(|e| e.value().clone()).collect();
        out.sort();
        out
    }

    /// Snapshot of all ways, in id order.
    pub fn ways(&self) -> Vec<Arc<Way>> {
        let mut out: Vec<Arc<Way>> = self.ways.iter().map(|e| Arc::clone(e.value())).collect();
        out.sort_by_key(|w| w.id());
        out
    }

    /// Ways of this dataset listed in `node`'s referrer set.
    pub fn referring_ways(&self, node: &NodeRef) -> Vec<Arc<Way>> {
        node.referrers()
            .into_iter()
            .filter(|r| r.kind == PrimitiveType::Way)
            .filter_map(|r| self.way(r.id).filter(|w| w.handle() == r.handle))
            .collect()
    }

    // ---------- geometry ----------

    /// Moves a node and tells every referring way to refresh its geometry.
    pub fn move_node(&self, node: &NodeRef, coor: Option<LatLon>) -> Result<(), GraphError> {
        self.check_writable()?;
        node.set_coor(coor);
        for way in self.referring_ways(node) {
            way.update_position();
        }
        self.fire(&DataSetEvent::NodeMoved(node.id()));
        Ok(())
    }

    // ---------- events ----------

    pub fn add_listener(&self, listener: Arc<dyn DataSetListener>) {
        self.listeners.write().push(listener);
    }

    pub fn fire_way_nodes_changed(&self, way: &Way) {
        log::trace!("dataset {}: way {} nodes changed", self.id, way.id());
        self.fire(&DataSetEvent::WayNodesChanged(way.id()));
    }

    fn fire(&self, event: &DataSetEvent) {
        let listeners = self.listeners.read().clone();
        for l in listeners {
            l.on_event(event);
        }
    }
}

impl std::fmt::Debug for DataSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSet")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("read_only", &self.is_read_only())
            .field("nodes", &self.nodes.len())
            .field("ways", &self.ways.len())
            .finish()
    }
}
