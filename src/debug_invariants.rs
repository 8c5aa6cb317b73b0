//! Structural self-checks for layouts, geometry and operator state.
//!
//! Types that maintain cross-field invariants implement [`DebugInvariants`].
//! Constructors run the check through [`debug_invariants!`], which is active
//! in debug builds and under the `check-invariants` / `strict-invariants`
//! features, and compiles to nothing otherwise.

use crate::linop_error::LinOpError;

/// Invariant validation hook.
pub trait DebugInvariants {
    /// Panic on a broken invariant when checking is enabled.
    fn debug_assert_invariants(&self);
    /// Report the first broken invariant.
    fn validate_invariants(&self) -> Result<(), LinOpError>;
}

/// Evaluate a `Result<(), LinOpError>` check and panic with context on error,
/// when invariant checking is enabled.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        if let Err(e) = $expr {
            log::error!(concat!("invariant check failed in ", $($ctx)*, ": {}"), e);
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}
