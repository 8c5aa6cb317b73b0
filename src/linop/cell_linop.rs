//! The per-call primitives a multigrid driver needs from a cell-centered
//! linear operator.
//!
//! A driver calls [`CellLinOp::prepare_for_solve`] once after the coefficient
//! setters, then any number of `apply`, `smooth`, `compute_flux` and
//! `normalize` calls. Input fields must carry one ghost layer that the caller
//! has synchronized (see `EbAbecLaplacian::fill_ghosts`); none of these calls
//! exchanges halos itself.

use crate::data::multifab::MultiFab;
use crate::linop::flux::FaceFluxes;
use crate::linop_error::LinOpError;

pub trait CellLinOp {
    fn num_amr_levels(&self) -> usize;

    fn num_mg_levels(&self, amrlev: usize) -> Result<usize, LinOpError>;

    /// Coarsen coefficients through the whole hierarchy and recompute the
    /// per-level singularity flags.
    fn prepare_for_solve(&mut self) -> Result<(), LinOpError>;

    /// `out = L(input)` over the valid cells of `(amrlev, mglev)`.
    fn apply(
        &self,
        amrlev: usize,
        mglev: usize,
        out: &mut MultiFab,
        input: &MultiFab,
    ) -> Result<(), LinOpError>;

    /// One red-black Gauss-Seidel pass over the cells of color `color`
    /// (`(i + j + k + color)` even).
    fn smooth(
        &self,
        amrlev: usize,
        mglev: usize,
        sol: &mut MultiFab,
        rhs: &MultiFab,
        color: usize,
    ) -> Result<(), LinOpError>;

    /// Face fluxes of patch `patch` on the finest rung of `amrlev`, such that
    /// `apply` equals `A·a·x` plus their volume-normalized divergence.
    fn compute_flux(
        &self,
        amrlev: usize,
        patch: usize,
        fluxes: &mut FaceFluxes,
        sol: &MultiFab,
        face_only: bool,
    ) -> Result<(), LinOpError>;

    /// Divide `mf` by the operator diagonal.
    fn normalize(&self, amrlev: usize, mglev: usize, mf: &mut MultiFab) -> Result<(), LinOpError>;

    /// Whether `amrlev` has a constant null space, as of the last
    /// `prepare_for_solve`.
    fn is_singular(&self, amrlev: usize) -> Result<bool, LinOpError>;
}
