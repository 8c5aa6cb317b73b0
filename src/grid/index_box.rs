//! Rectangular regions of index space.
//!
//! An [`IndexBox`] is the inclusive range `[lo, hi]` in the first `dim`
//! directions, tagged with an [`IndexType`] saying whether it indexes cells or
//! the faces normal to one direction. Face index `iv` along `dir` is the low
//! face of cell `iv`.

use super::int_vect::{IntVect, MAX_SPACEDIM};
use itertools::iproduct;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Centering of the indices of a box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexType {
    /// Cell-centered.
    #[default]
    Cell,
    /// Centered on the faces normal to the given direction.
    Face(usize),
}

/// Inclusive box `[lo, hi]` in index space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexBox {
    lo: IntVect,
    hi: IntVect,
    ix: IndexType,
    dim: usize,
}

impl IndexBox {
    /// Cell-centered box over `[lo, hi]` in the first `dim` directions.
    ///
    /// Components at or beyond `dim` are forced to zero.
    pub fn new(dim: usize, mut lo: IntVect, mut hi: IntVect) -> Self {
        debug_assert!((1..=MAX_SPACEDIM).contains(&dim));
        for d in dim..MAX_SPACEDIM {
            lo[d] = 0;
            hi[d] = 0;
        }
        Self {
            lo,
            hi,
            ix: IndexType::Cell,
            dim,
        }
    }

    /// Two-dimensional cell box.
    pub fn cell_2d(lo: [i64; 2], hi: [i64; 2]) -> Self {
        Self::new(2, IntVect::new(lo[0], lo[1], 0), IntVect::new(hi[0], hi[1], 0))
    }

    /// Three-dimensional cell box.
    pub fn cell_3d(lo: [i64; 3], hi: [i64; 3]) -> Self {
        Self::new(3, IntVect(lo), IntVect(hi))
    }

    #[inline]
    pub fn lo(&self) -> IntVect {
        self.lo
    }

    #[inline]
    pub fn hi(&self) -> IntVect {
        self.hi
    }

    #[inline]
    pub fn ix_type(&self) -> IndexType {
        self.ix
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        (0..self.dim).any(|d| self.hi[d] < self.lo[d])
    }

    /// Number of indices along `dir`.
    #[inline]
    pub fn length(&self, dir: usize) -> i64 {
        if dir >= self.dim {
            return 1;
        }
        (self.hi[dir] - self.lo[dir] + 1).max(0)
    }

    /// Total number of indices in the box.
    pub fn num_pts(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        (0..self.dim).map(|d| self.length(d) as usize).product()
    }

    #[inline]
    pub fn contains(&self, iv: IntVect) -> bool {
        (0..self.dim).all(|d| self.lo[d] <= iv[d] && iv[d] <= self.hi[d])
    }

    /// Whether `other` (of the same centering) lies inside `self`.
    pub fn contains_box(&self, other: &IndexBox) -> bool {
        self.ix == other.ix
            && (other.is_empty() || (self.contains(other.lo) && self.contains(other.hi)))
    }

    /// Intersection of two boxes of the same centering.
    pub fn intersect(&self, other: &IndexBox) -> Option<IndexBox> {
        if self.ix != other.ix || self.dim != other.dim {
            return None;
        }
        let out = IndexBox {
            lo: self.lo.max(other.lo),
            hi: self.hi.min(other.hi),
            ix: self.ix,
            dim: self.dim,
        };
        (!out.is_empty()).then_some(out)
    }

    /// Grow by `n` in every direction (negative `n` shrinks).
    pub fn grow(&self, n: i64) -> IndexBox {
        let mut out = *self;
        for d in 0..self.dim {
            out.lo[d] -= n;
            out.hi[d] += n;
        }
        out
    }

    /// Grow by `n` along `dir` only.
    pub fn grow_dir(&self, dir: usize, n: i64) -> IndexBox {
        let mut out = *self;
        out.lo[dir] -= n;
        out.hi[dir] += n;
        out
    }

    pub fn shift(&self, by: IntVect) -> IndexBox {
        let mut out = *self;
        for d in 0..self.dim {
            out.lo[d] += by[d];
            out.hi[d] += by[d];
        }
        out
    }

    /// The one-index-thick slab of `self` at `index` along `dir`.
    pub fn slab(&self, dir: usize, index: i64) -> IndexBox {
        let mut out = *self;
        out.lo[dir] = index;
        out.hi[dir] = index;
        out
    }

    /// Convert to another centering, keeping the same set of cells.
    pub fn convert(&self, ix: IndexType) -> IndexBox {
        let mut out = self.enclosed_cells();
        if let IndexType::Face(dir) = ix {
            out.hi[dir] += 1;
            out.ix = ix;
        }
        out
    }

    /// Face box bounding all faces of the cells in `self`.
    pub fn surrounding_faces(&self, dir: usize) -> IndexBox {
        self.convert(IndexType::Face(dir))
    }

    /// Cell box whose faces along the box's face direction make up `self`.
    pub fn enclosed_cells(&self) -> IndexBox {
        let mut out = *self;
        if let IndexType::Face(dir) = self.ix {
            out.hi[dir] -= 1;
            out.ix = IndexType::Cell;
        }
        out
    }

    /// Coarsen by `ratio`. Face directions round the high end up so the coarse
    /// box covers every coarse face touched by a fine face.
    pub fn coarsen(&self, ratio: i64) -> IndexBox {
        let mut out = *self;
        out.lo = self.lo.coarsen(ratio);
        out.hi = self.hi.coarsen(ratio);
        if let IndexType::Face(dir) = self.ix {
            if self.hi[dir].rem_euclid(ratio) != 0 {
                out.hi[dir] += 1;
            }
        }
        for d in self.dim..MAX_SPACEDIM {
            out.lo[d] = 0;
            out.hi[d] = 0;
        }
        out
    }

    /// Refine by `ratio`.
    pub fn refine(&self, ratio: i64) -> IndexBox {
        let mut out = *self;
        for d in 0..self.dim {
            out.lo[d] = self.lo[d] * ratio;
            out.hi[d] = match self.ix {
                IndexType::Face(fd) if fd == d => self.hi[d] * ratio,
                _ => (self.hi[d] + 1) * ratio - 1,
            };
        }
        out
    }

    /// Whether the cells of `self` coarsen exactly by `ratio` into a box at
    /// least `min_width` cells wide.
    pub fn coarsenable(&self, ratio: i64, min_width: i64) -> bool {
        let cells = self.enclosed_cells();
        (0..self.dim).all(|d| {
            cells.lo[d].rem_euclid(ratio) == 0
                && (cells.hi[d] + 1).rem_euclid(ratio) == 0
                && cells.length(d) / ratio >= min_width
        })
    }

    /// Iterate the indices of the box, first direction fastest.
    pub fn cells(&self) -> impl Iterator<Item = IntVect> + use<> {
        let (lo, hi) = if self.is_empty() {
            (IntVect::new(0, 0, 0), IntVect::new(-1, -1, -1))
        } else {
            (self.lo, self.hi)
        };
        iproduct!(lo[2]..=hi[2], lo[1]..=hi[1], lo[0]..=hi[0]).map(|(k, j, i)| IntVect::new(i, j, k))
    }

    /// Chop into tiles of at most `tile_size` indices per direction.
    pub fn tiles(&self, tile_size: IntVect) -> Vec<IndexBox> {
        if self.is_empty() {
            return Vec::new();
        }
        let mut starts: [Vec<(i64, i64)>; MAX_SPACEDIM] = Default::default();
        for (d, spans) in starts.iter_mut().enumerate() {
            if d >= self.dim {
                spans.push((0, 0));
                continue;
            }
            let step = tile_size[d].max(1);
            let mut s = self.lo[d];
            while s <= self.hi[d] {
                let e = (s + step - 1).min(self.hi[d]);
                spans.push((s, e));
                s = e + 1;
            }
        }
        iproduct!(starts[2].iter(), starts[1].iter(), starts[0].iter())
            .map(|(&(k0, k1), &(j0, j1), &(i0, i1))| IndexBox {
                lo: IntVect::new(i0, j0, k0),
                hi: IntVect::new(i1, j1, k1),
                ix: self.ix,
                dim: self.dim,
            })
            .collect()
    }
}

impl fmt::Display for IndexBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {} {:?}]", self.lo, self.hi, self.ix)
    }
}
