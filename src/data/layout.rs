//! FabLayout: mapping patches to contiguous ranges of one flat buffer.
//!
//! Every patch of a level owns the range `[offset, offset + len)` of the
//! multifab buffer, where `len` is the number of indices in its ghost-grown
//! box times the component count. Ranges are laid out in patch order so a
//! single pass of `split_at_mut` yields disjoint per-patch views.

use crate::debug_invariants::DebugInvariants;
use crate::grid::{BoxArray, IndexBox};
use crate::linop_error::LinOpError;

/// Patch → `(offset, len)` table plus the ghost-grown box of each patch.
///
/// # Invariants
///
/// - `spans[i].0 == spans[i-1].0 + spans[i-1].1` (contiguous in patch order).
/// - `spans[i].1 == fab_boxes[i].num_pts() * ncomp`.
/// - `total_len` is the sum of all lengths.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FabLayout {
    spans: Vec<(usize, usize)>,
    fab_boxes: Vec<IndexBox>,
    ncomp: usize,
    total_len: usize,
}

impl FabLayout {
    /// Lay out `ba` with `ngrow` ghost layers and `ncomp` components.
    pub fn new(ba: &BoxArray, ngrow: usize, ncomp: usize) -> Self {
        let mut spans = Vec::with_capacity(ba.len());
        let mut fab_boxes = Vec::with_capacity(ba.len());
        let mut offset = 0usize;
        for bx in ba.iter() {
            let fab_box = bx.grow(ngrow as i64);
            let len = fab_box.num_pts() * ncomp;
            spans.push((offset, len));
            fab_boxes.push(fab_box);
            offset += len;
        }
        let layout = Self {
            spans,
            fab_boxes,
            ncomp,
            total_len: offset,
        };
        crate::debug_invariants!(layout.validate_invariants(), "FabLayout::new");
        layout
    }

    /// `(offset, len)` of patch `i`.
    #[inline]
    pub fn span(&self, i: usize) -> Option<(usize, usize)> {
        self.spans.get(i).copied()
    }

    /// Ghost-grown box of patch `i`.
    #[inline]
    pub fn fab_box(&self, i: usize) -> Option<IndexBox> {
        self.fab_boxes.get(i).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    #[inline]
    pub fn ncomp(&self) -> usize {
        self.ncomp
    }

    /// Size of the whole buffer.
    #[inline]
    pub fn total_len(&self) -> usize {
        self.total_len
    }

    /// Spans in patch order.
    pub fn iter_spans(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.spans.iter().copied()
    }
}

impl DebugInvariants for FabLayout {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "FabLayout");
    }

    fn validate_invariants(&self) -> Result<(), LinOpError> {
        let mut expected = 0usize;
        for (i, (&(offset, len), bx)) in self.spans.iter().zip(&self.fab_boxes).enumerate() {
            if offset != expected {
                return Err(LinOpError::LayoutMismatch(format!(
                    "patch {i} starts at {offset}, expected {expected}"
                )));
            }
            if len != bx.num_pts() * self.ncomp {
                return Err(LinOpError::LayoutMismatch(format!(
                    "patch {i} has length {len}, box {bx} needs {}",
                    bx.num_pts() * self.ncomp
                )));
            }
            expected += len;
        }
        if expected != self.total_len {
            return Err(LinOpError::LayoutMismatch(format!(
                "total length {} != sum of spans {expected}",
                self.total_len
            )));
        }
        Ok(())
    }
}
