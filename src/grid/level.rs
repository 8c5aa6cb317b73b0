//! Composite `(amrlev, mglev)` level keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One rung of the combined AMR × multigrid hierarchy.
///
/// `amrlev` 0 is the coarsest AMR level; `mglev` 0 is the native resolution of
/// that AMR level and every further rung is coarser by the multigrid ratio.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LevelIndex {
    pub amrlev: usize,
    pub mglev: usize,
}

impl LevelIndex {
    #[inline]
    pub const fn new(amrlev: usize, mglev: usize) -> Self {
        Self { amrlev, mglev }
    }

    /// The finest multigrid rung of `amrlev`.
    #[inline]
    pub const fn finest(amrlev: usize) -> Self {
        Self { amrlev, mglev: 0 }
    }
}

impl fmt::Display for LevelIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(amrlev {}, mglev {})", self.amrlev, self.mglev)
    }
}
