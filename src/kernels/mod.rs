//! Pointwise stencil arithmetic for the `A·a·φ − B·∇·(b∇φ)` operator.
//!
//! Kernels work on one tile of one patch at a time and never allocate or
//! fail: the operator validates layouts up front and hands them borrowed
//! views. [`abec`] covers tiles of regular cells, [`eb_abec`] tiles that
//! contain cut cells.

pub mod abec;
pub mod eb_abec;

use crate::data::fab::{FabRead, FabRef};
use crate::grid::{IndexBox, IntVect, MAX_SPACEDIM};

/// Everything a kernel needs about the operator on one patch.
#[derive(Clone, Debug)]
pub struct StencilCoeffs<'a> {
    pub dim: usize,
    /// Scalar multiplier of the `a` term.
    pub alpha: f64,
    /// Scalar multiplier of the `b` term.
    pub beta: f64,
    pub dxinv: [f64; MAX_SPACEDIM],
    /// Cell-centered `a` over the patch's valid box.
    pub a: FabRef<'a>,
    /// Face-centered `b`, one view per direction, with one ghost layer.
    pub b: Vec<FabRef<'a>>,
    /// Problem domain of the level, used to place boundary faces.
    pub domain: IndexBox,
    /// Diagonal multiplier of a domain boundary face, `[dir][lo/hi]`: 2 for
    /// Dirichlet (the ghost mirrors the cell), 0 for Neumann, 1 otherwise.
    pub bc_weight: [[f64; 2]; MAX_SPACEDIM],
    /// Floor applied to cut-cell volume fractions before dividing.
    pub min_vfrac: f64,
}

impl StencilCoeffs<'_> {
    /// Diagonal multiplier of the low (`hi == false`) or high face of `iv`
    /// along `dir`.
    #[inline]
    pub fn boundary_weight(&self, iv: IntVect, dir: usize, hi: bool) -> f64 {
        if !hi && iv[dir] == self.domain.lo()[dir] {
            self.bc_weight[dir][0]
        } else if hi && iv[dir] == self.domain.hi()[dir] {
            self.bc_weight[dir][1]
        } else {
            1.0
        }
    }

    #[inline]
    pub(crate) fn a_at(&self, iv: IntVect) -> f64 {
        self.a.get(iv)
    }
}

/// Whether `iv` belongs to red-black color `color`.
#[inline]
pub fn has_color(iv: IntVect, color: usize) -> bool {
    (iv.sum() + color as i64).rem_euclid(2) == 0
}
