//! Entity state flags shared by nodes and ways.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

const DELETED: u8 = 1 << 0;
const INCOMPLETE: u8 = 1 << 1;
const INVISIBLE: u8 = 1 << 2;
const MODIFIED: u8 = 1 << 3;

/// Atomic bitset of deleted / incomplete / visible / modified.
///
/// Visible is stored inverted so that the zero state is "visible".
#[derive(Default)]
pub struct PrimitiveFlags(AtomicU8);

impl PrimitiveFlags {
    pub fn new(incomplete: bool) -> Self {
        let flags = PrimitiveFlags::default();
        flags.set_incomplete(incomplete);
        flags
    }

    #[inline]
    fn get(&self, mask: u8) -> bool {
        self.0.load(Ordering::Acquire) & mask != 0
    }

    #[inline]
    fn set(&self, mask: u8, on: bool) {
        if on {
            self.0.fetch_or(mask, Ordering::AcqRel);
        } else {
            self.0.fetch_and(!mask, Ordering::AcqRel);
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.get(DELETED)
    }
    pub fn set_deleted(&self, on: bool) {
        self.set(DELETED, on);
    }
    pub fn is_incomplete(&self) -> bool {
        self.get(INCOMPLETE)
    }
    pub fn set_incomplete(&self, on: bool) {
        self.set(INCOMPLETE, on);
    }
    pub fn is_visible(&self) -> bool {
        !self.get(INVISIBLE)
    }
    pub fn set_visible(&self, on: bool) {
        self.set(INVISIBLE, !on);
    }
    pub fn is_modified(&self) -> bool {
        self.get(MODIFIED)
    }
    pub fn set_modified(&self, on: bool) {
        self.set(MODIFIED, on);
    }

    /// Copies every flag from `other`.
    pub fn copy_from(&self, other: &PrimitiveFlags) {
        self.0.store(other.0.load(Ordering::Acquire), Ordering::Release);
    }

    pub fn bits(&self) -> u8 {
        self.0.load(Ordering::Acquire)
    }
}

impl Clone for PrimitiveFlags {
    fn clone(&self) -> Self {
        PrimitiveFlags(AtomicU8::new(self.bits()))
    }
}

/// Compact listing used by `Display` impls, e.g. `"DI"`.
impl fmt::Display for PrimitiveFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_deleted() {
            f.write_str("D")?;
        }
        if self.is_incomplete() {
            f.write_str("I")?;
        }
        if !self.is_visible() {
            f.write_str("V")?;
        }
        if self.is_modified() {
            f.write_str("M")?;
        }
        Ok(())
    }
}

impl fmt::Debug for PrimitiveFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimitiveFlags")
            .field("deleted", &self.is_deleted())
            .field("incomplete", &self.is_incomplete())
            .field("visible", &self.is_visible())
            .field("modified", &self.is_modified())
            .finish()
    }
}
