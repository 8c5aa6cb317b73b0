//! Cell classification for embedded-boundary geometry.

use crate::data::fab::FabRead;
use crate::grid::IndexBox;
use serde::{Deserialize, Serialize};

/// Classification of one cell relative to the embedded boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellFlag {
    /// Entirely inside the fluid: volume fraction 1, every face fully open.
    Regular,
    /// Cut by the boundary (a single fluid region inside the cell).
    SingleValued,
    /// Entirely outside the fluid: volume fraction 0, every face closed.
    #[default]
    Covered,
}

impl CellFlag {
    #[inline]
    pub fn is_regular(self) -> bool {
        self == CellFlag::Regular
    }

    #[inline]
    pub fn is_covered(self) -> bool {
        self == CellFlag::Covered
    }

    #[inline]
    pub fn is_single_valued(self) -> bool {
        self == CellFlag::SingleValued
    }
}

/// Summary classification of a tile, used to pick a kernel once per tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FabType {
    /// Every cell regular.
    Regular,
    /// Every cell covered.
    Covered,
    /// Anything else.
    SingleValued,
}

/// Classify the cells of `tile`.
pub fn fab_type<F: FabRead<CellFlag>>(flags: &F, tile: &IndexBox) -> FabType {
    let mut regular = 0usize;
    let mut covered = 0usize;
    let mut total = 0usize;
    for iv in tile.cells() {
        match flags.get(iv) {
            CellFlag::Regular => regular += 1,
            CellFlag::Covered => covered += 1,
            CellFlag::SingleValued => return FabType::SingleValued,
        }
        total += 1;
    }
    if regular == total {
        FabType::Regular
    } else if covered == total {
        FabType::Covered
    } else {
        FabType::SingleValued
    }
}
