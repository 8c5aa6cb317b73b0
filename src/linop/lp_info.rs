//! LpInfo: operator configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::grid::IntVect;

/// Tunables for hierarchy construction and kernel dispatch.
///
/// Every field has a default, so a partial JSON object is a valid
/// configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LpInfo {
    /// Maximum number of multigrid coarsenings below AMR level 0.
    pub max_coarsening_level: usize,
    /// Smallest patch width (in cells) a coarsened multigrid rung may have.
    pub mg_box_min_width: i64,
    /// Tile extent per direction for kernel dispatch.
    pub tile_size: [i64; 3],
    /// Floor on cut-cell volume fractions in the divergence.
    pub min_vfrac: f64,
    /// When set, `apply` writes its input and output under this directory.
    pub debug_snapshot: Option<PathBuf>,
}

impl Default for LpInfo {
    fn default() -> Self {
        Self {
            max_coarsening_level: 30,
            mg_box_min_width: 2,
            tile_size: [1_024_000, 8, 8],
            min_vfrac: 1.0e-6,
            debug_snapshot: None,
        }
    }
}

impl LpInfo {
    pub fn with_max_coarsening_level(mut self, n: usize) -> Self {
        self.max_coarsening_level = n;
        self
    }

    pub fn with_tile_size(mut self, tile_size: [i64; 3]) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn with_debug_snapshot(mut self, dir: impl Into<PathBuf>) -> Self {
        self.debug_snapshot = Some(dir.into());
        self
    }

    #[inline]
    pub(crate) fn tile(&self) -> IntVect {
        IntVect(self.tile_size)
    }
}
