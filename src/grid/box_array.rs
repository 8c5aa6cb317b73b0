//! Ordered collections of disjoint boxes forming one level's grid.

use super::index_box::{IndexBox, IndexType};
use super::int_vect::IntVect;
use crate::linop_error::LinOpError;

/// The patches of one level, in patch-index order.
///
/// # Invariants
///
/// - Every box has the same dimension and centering.
/// - The enclosed cell boxes never overlap (face-centered arrays share the
///   faces on patch boundaries, which is expected).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoxArray {
    boxes: Vec<IndexBox>,
    dim: usize,
    ix: IndexType,
}

impl BoxArray {
    /// Build from cell boxes, rejecting empty input, mixed dimensions and
    /// overlapping boxes.
    pub fn new(boxes: Vec<IndexBox>) -> Result<Self, LinOpError> {
        let first = boxes
            .first()
            .ok_or_else(|| LinOpError::InvalidHierarchy("empty box array".into()))?;
        let dim = first.dim();
        if !(2..=3).contains(&dim) {
            return Err(LinOpError::UnsupportedDimension(dim));
        }
        for bx in &boxes {
            if bx.dim() != dim || bx.ix_type() != IndexType::Cell || bx.is_empty() {
                return Err(LinOpError::InvalidHierarchy(format!(
                    "box {bx} is not a non-empty {dim}-dimensional cell box"
                )));
            }
        }
        for (i, a) in boxes.iter().enumerate() {
            for (j, b) in boxes.iter().enumerate().skip(i + 1) {
                if a.intersect(b).is_some() {
                    return Err(LinOpError::OverlappingBoxes { first: i, second: j });
                }
            }
        }
        Ok(Self {
            boxes,
            dim,
            ix: IndexType::Cell,
        })
    }

    /// A single-patch array.
    pub fn single(bx: IndexBox) -> Result<Self, LinOpError> {
        Self::new(vec![bx])
    }

    /// Split `bx` into patches of at most `max_size` cells per direction.
    pub fn chopped(bx: IndexBox, max_size: i64) -> Result<Self, LinOpError> {
        Self::new(bx.tiles(IntVect::splat(max_size, bx.dim())))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn ix_type(&self) -> IndexType {
        self.ix
    }

    /// Box of patch `i`.
    pub fn get(&self, i: usize) -> Result<IndexBox, LinOpError> {
        self.boxes
            .get(i)
            .copied()
            .ok_or(LinOpError::PatchOutOfRange {
                patch: i,
                len: self.boxes.len(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexBox> {
        self.boxes.iter()
    }

    /// Total number of cells (or faces) over all patches.
    pub fn num_pts(&self) -> usize {
        self.boxes.iter().map(IndexBox::num_pts).sum()
    }

    /// Same patches with a different centering.
    pub fn convert(&self, ix: IndexType) -> BoxArray {
        BoxArray {
            boxes: self.boxes.iter().map(|b| b.convert(ix)).collect(),
            dim: self.dim,
            ix,
        }
    }

    pub fn coarsen(&self, ratio: i64) -> BoxArray {
        BoxArray {
            boxes: self.boxes.iter().map(|b| b.coarsen(ratio)).collect(),
            dim: self.dim,
            ix: self.ix,
        }
    }

    pub fn refine(&self, ratio: i64) -> BoxArray {
        BoxArray {
            boxes: self.boxes.iter().map(|b| b.refine(ratio)).collect(),
            dim: self.dim,
            ix: self.ix,
        }
    }

    /// Whether every patch coarsens exactly by `ratio` to at least `min_width`.
    pub fn coarsenable(&self, ratio: i64, min_width: i64) -> bool {
        self.boxes.iter().all(|b| b.coarsenable(ratio, min_width))
    }

    /// `(patch, overlap)` for every patch intersecting `bx`.
    pub fn intersections(&self, bx: &IndexBox) -> Vec<(usize, IndexBox)> {
        self.boxes
            .iter()
            .enumerate()
            .filter_map(|(i, b)| b.intersect(bx).map(|o| (i, o)))
            .collect()
    }

    /// Whether every cell of `bx` is covered by some patch.
    pub fn covers(&self, bx: &IndexBox) -> bool {
        let covered: usize = self
            .intersections(bx)
            .iter()
            .map(|(_, o)| o.num_pts())
            .sum();
        covered == bx.num_pts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_overlap() {
        let a = IndexBox::cell_2d([0, 0], [3, 3]);
        let b = IndexBox::cell_2d([3, 0], [5, 3]);
        assert_eq!(
            BoxArray::new(vec![a, b]),
            Err(LinOpError::OverlappingBoxes { first: 0, second: 1 })
        );
    }

    #[test]
    fn chopped_covers_domain() {
        let dom = IndexBox::cell_2d([0, 0], [15, 7]);
        let ba = BoxArray::chopped(dom, 4).unwrap();
        assert_eq!(ba.len(), 8);
        assert!(ba.covers(&dom));
        assert!(ba.coarsenable(2, 2));
        assert!(!ba.coarsenable(2, 3));
    }

    #[test]
    fn intersections_report_patch_indices() {
        let ba = BoxArray::chopped(IndexBox::cell_2d([0, 0], [7, 7]), 4).unwrap();
        let hits = ba.intersections(&IndexBox::cell_2d([3, 3], [4, 4]));
        assert_eq!(hits.len(), 4);
        assert!(hits.iter().all(|(_, o)| o.num_pts() == 1));
    }
}
