//! `PrimitiveId`: a strong, zero-cost handle for graph entities
//!
//! Every node and way carries a unique, nonzero `i64` id. Positive ids are
//! persisted ids; negative ids are generated for primitives created locally
//! and not yet uploaded. `0` is never a valid unique id; it is what
//! [`PrimitiveId::osm_id`] reports for new primitives.
//!
//! [`EntityHandle`] is separate: it tells apart two in-memory instances that
//! share one `PrimitiveId` (a way and its clone).

use std::fmt;
use std::num::NonZeroI64;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use crate::graph_error::GraphError;

/// Unique id of a node or way.
///
/// # Memory layout
/// `repr(transparent)` over `NonZeroI64`, so `Option<PrimitiveId>` is the
/// size of an `i64`.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "i64", into = "i64")]
#[repr(transparent)]
pub struct PrimitiveId(NonZeroI64);

impl PrimitiveId {
    /// Creates a new `PrimitiveId` from a raw value.
    ///
    /// # Errors
    /// Returns `Err(GraphError::InvalidPrimitiveId)` if `raw == 0`.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use waygraph::primitive::PrimitiveId;
    /// let p = PrimitiveId::new(1)?;
    /// assert_eq!(p.get(), 1);
    /// # Ok::<(), waygraph::graph_error::GraphError>(())
    /// ```
    #[inline]
    pub fn new(raw: i64) -> Result<Self, GraphError> {
        NonZeroI64::new(raw)
            .map(PrimitiveId)
            .ok_or(GraphError::InvalidPrimitiveId)
    }

    /// Returns the inner unique id.
    #[inline]
    pub const fn get(self) -> i64 {
        self.0.get()
    }

    /// `true` for locally created primitives that have no persisted id yet.
    #[inline]
    pub const fn is_new(self) -> bool {
        self.0.get() < 0
    }

    /// The persisted id, or `0` for new primitives.
    #[inline]
    pub const fn osm_id(self) -> i64 {
        if self.is_new() { 0 } else { self.0.get() }
    }
}

impl TryFrom<i64> for PrimitiveId {
    type Error = GraphError;
    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        PrimitiveId::new(raw)
    }
}

impl From<PrimitiveId> for i64 {
    fn from(id: PrimitiveId) -> Self {
        id.get()
    }
}

impl fmt::Debug for PrimitiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PrimitiveId").field(&self.get()).finish()
    }
}

impl fmt::Display for PrimitiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Hands out negative unique ids for new primitives.
#[derive(Debug)]
pub struct UniqueIdGenerator {
    next: AtomicI64,
}

impl UniqueIdGenerator {
    pub const fn new() -> Self {
        Self {
            next: AtomicI64::new(0),
        }
    }

    /// Next id; strictly decreasing, never zero.
    pub fn generate(&self) -> PrimitiveId {
        let raw = self.next.fetch_sub(1, Ordering::Relaxed) - 1;
        PrimitiveId(NonZeroI64::new(raw).unwrap_or(NonZeroI64::MIN))
    }
}

impl Default for UniqueIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) static NODE_IDS: UniqueIdGenerator = UniqueIdGenerator::new();
pub(crate) static WAY_IDS: UniqueIdGenerator = UniqueIdGenerator::new();

/// Per-instance identity, independent of the primitive id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityHandle(u64);

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

impl EntityHandle {
    pub(crate) fn next() -> Self {
        EntityHandle(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}
