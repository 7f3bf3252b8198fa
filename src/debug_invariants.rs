//! Invariant re-validation after edits.
//!
//! Mutators call [`debug_invariants!`](crate::debug_invariants) once a change
//! is published. The check runs in debug builds and whenever the
//! `strict-invariants` or `check-invariants` feature is on; otherwise the
//! branch is constant-false and compiles away.

use crate::graph_error::GraphError;

/// Whether [`debug_invariants!`](crate::debug_invariants) checks in this build.
pub const CHECKS_ENABLED: bool = cfg!(any(
    debug_assertions,
    feature = "strict-invariants",
    feature = "check-invariants"
));

/// Entities whose live state can be re-validated.
pub trait DebugInvariants {
    /// Check every invariant and return the first violation.
    fn validate_invariants(&self) -> Result<(), GraphError>;

    /// Panic on a violation when checks are enabled.
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "invariants violated");
    }
}

/// Evaluate a `Result<(), GraphError>` check and panic with `ctx` on error
/// when invariant checking is enabled.
#[macro_export]
macro_rules! debug_invariants {
    ($check:expr, $ctx:expr) => {
        if $crate::debug_invariants::CHECKS_ENABLED {
            if let Err(e) = $check {
                panic!("[invariants] {}: {}", $ctx, e);
            }
        }
    };
}
