//! EbAbecLaplacian: `A·a·φ − B·∇·(b∇φ)` on an AMR hierarchy with cut cells.
//!
//! Owns the level hierarchy and every coefficient field. Coefficients are set
//! on the finest rung of each AMR level and propagated by the two coarsening
//! phases, [`EbAbecLaplacian::coarsen_within_level`] and
//! [`EbAbecLaplacian::coarsen_across_levels`], which
//! [`EbAbecLaplacian::average_down_coeffs`] runs in the required order.
//!
//! Kernels are chosen per tile: all-covered tiles produce zero, all-regular
//! tiles use the plain stencil and anything else the cut-cell stencil.

use crate::data::fab::{FabRead, FabRef};
use crate::data::multifab::MultiFab;
use crate::data::par::for_each_patch;
use crate::debug_invariants::DebugInvariants;
use crate::ebgeom::{EbFactory, EbPatch, FabType, fab_type};
use crate::grid::{BoxArray, Geometry, IndexBox, IndexType, IntVect, LevelIndex, MAX_SPACEDIM};
use crate::kernels::{StencilCoeffs, abec, eb_abec, has_color};
use crate::linop::bc::{BcType, fill_domain_ghosts, validate_domain_bc};
use crate::linop::cell_linop::CellLinOp;
use crate::linop::coarsen::{average_down_cells, average_down_faces};
use crate::linop::coeffs::{CoeffArena, CoeffKey};
use crate::linop::flux::{FaceFluxes, flux_regions};
use crate::linop::hierarchy::{AmrLevel, LevelHierarchy, MG_COARSEN_RATIO, MgRung};
use crate::linop::lp_info::LpInfo;
use crate::linop::snapshot::{FieldSnapshot, write_snapshot};
use crate::linop_error::LinOpError;

/// Relative size below which `Σa` counts as zero in the singularity test.
const SINGULAR_A_TOL: f64 = 1.0e-12;

#[derive(Clone, Debug)]
pub struct EbAbecLaplacian {
    info: LpInfo,
    hier: LevelHierarchy,
    coeffs: CoeffArena,
    alpha: f64,
    beta: f64,
    lobc: Vec<BcType>,
    hibc: Vec<BcType>,
    singular: Vec<bool>,
}

static_assertions::assert_impl_all!(EbAbecLaplacian: Send, Sync);

/// Borrowed per-patch views of one level index, shared by the patch loops.
struct LevelViews<'a> {
    dim: usize,
    alpha: f64,
    beta: f64,
    dxinv: [f64; MAX_SPACEDIM],
    domain: IndexBox,
    bc_weight: [[f64; 2]; MAX_SPACEDIM],
    min_vfrac: f64,
    tile: IntVect,
    valid: Vec<IndexBox>,
    a: Vec<FabRef<'a>>,
    b: Vec<Vec<FabRef<'a>>>,
    eb: Option<Vec<EbPatch<'a>>>,
}

impl<'a> LevelViews<'a> {
    fn coeffs(&self, i: usize) -> StencilCoeffs<'a> {
        StencilCoeffs {
            dim: self.dim,
            alpha: self.alpha,
            beta: self.beta,
            dxinv: self.dxinv,
            a: self.a[i],
            b: self.b.iter().map(|bd| bd[i]).collect(),
            domain: self.domain,
            bc_weight: self.bc_weight,
            min_vfrac: self.min_vfrac,
        }
    }

    fn cut_cells(&self, i: usize) -> Option<&EbPatch<'a>> {
        self.eb.as_ref().map(|eb| &eb[i])
    }

    /// Tiles of patch `i` with their classification.
    fn tiles(&self, i: usize) -> Vec<(IndexBox, FabType)> {
        self.valid[i]
            .tiles(self.tile)
            .into_iter()
            .map(|t| {
                let kind = match self.cut_cells(i) {
                    Some(eb) => fab_type(&eb.flags, &t),
                    None => FabType::Regular,
                };
                (t, kind)
            })
            .collect()
    }
}

fn check_field(mf: &MultiFab, grids: &BoxArray, ngrow: usize, what: &str) -> Result<(), LinOpError> {
    if mf.box_array() != grids {
        return Err(LinOpError::LayoutMismatch(format!(
            "{what} is not defined on the level's grids"
        )));
    }
    if mf.ngrow() < ngrow {
        return Err(LinOpError::InsufficientGhosts {
            needed: ngrow,
            found: mf.ngrow(),
        });
    }
    Ok(())
}

impl EbAbecLaplacian {
    /// Build the hierarchy for `levels` (coarsest first, `ref_ratio[l]`
    /// between `l` and `l + 1`) and allocate zeroed coefficients.
    ///
    /// Scalars start at `A = 0`, `B = 1`; boundaries are Neumann on every
    /// non-periodic side.
    ///
    /// # Errors
    /// Any hierarchy validation error from [`LevelHierarchy::build`].
    pub fn new(levels: Vec<AmrLevel>, ref_ratio: &[i64], info: LpInfo) -> Result<Self, LinOpError> {
        let hier = LevelHierarchy::build(levels, ref_ratio, &info)?;
        let coeffs = CoeffArena::allocate(&hier)?;
        let geom = &hier.rung(LevelIndex::finest(0))?.geom;
        let bc: Vec<BcType> = (0..hier.dim())
            .map(|d| {
                if geom.is_periodic(d) {
                    BcType::Periodic
                } else {
                    BcType::Neumann
                }
            })
            .collect();
        let n = hier.num_amr_levels();
        log::debug!("EbAbecLaplacian::new: {n} AMR levels, {} coefficient fields", coeffs.len());
        Ok(Self {
            info,
            hier,
            coeffs,
            alpha: 0.0,
            beta: 1.0,
            lobc: bc.clone(),
            hibc: bc,
            singular: vec![false; n],
        })
    }

    /// Rebuild in place. Previously set coefficients, scalars and boundary
    /// conditions are discarded.
    pub fn define(&mut self, levels: Vec<AmrLevel>, ref_ratio: &[i64], info: LpInfo) -> Result<(), LinOpError> {
        *self = Self::new(levels, ref_ratio, info)?;
        Ok(())
    }

    /// Domain boundary conditions, one entry per direction on each side.
    ///
    /// # Errors
    /// `BoundaryMismatch` if `Periodic` does not match the geometry.
    pub fn set_domain_bc(&mut self, lobc: &[BcType], hibc: &[BcType]) -> Result<(), LinOpError> {
        validate_domain_bc(&self.hier.rung(LevelIndex::finest(0))?.geom, lobc, hibc)?;
        self.lobc = lobc.to_vec();
        self.hibc = hibc.to_vec();
        Ok(())
    }

    /// Set `A` and `B`. With `A == 0` the `a` field on the finest rung of
    /// every AMR level is zeroed at once.
    pub fn set_scalars(&mut self, alpha: f64, beta: f64) -> Result<(), LinOpError> {
        self.alpha = alpha;
        self.beta = beta;
        if alpha == 0.0 {
            for l in 0..self.hier.num_amr_levels() {
                self.coeffs.get_mut(CoeffKey::a(LevelIndex::finest(l)))?.set_val(0.0);
            }
        }
        Ok(())
    }

    /// Copy `a` into the finest rung of `amrlev`. Other rungs are filled by
    /// [`Self::average_down_coeffs`].
    pub fn set_a_coeffs(&mut self, amrlev: usize, a: &MultiFab) -> Result<(), LinOpError> {
        self.check_amrlev(amrlev)?;
        self.coeffs
            .get_mut(CoeffKey::a(LevelIndex::finest(amrlev)))?
            .copy_from(a, 0)
    }

    /// Copy the valid faces of `b[dir]` into the finest rung of `amrlev`,
    /// then exchange halos.
    pub fn set_b_coeffs(&mut self, amrlev: usize, b: &[&MultiFab]) -> Result<(), LinOpError> {
        self.check_amrlev(amrlev)?;
        let dim = self.hier.dim();
        if b.len() != dim {
            return Err(LinOpError::DirectionOutOfRange { dir: b.len(), dim });
        }
        let level = LevelIndex::finest(amrlev);
        let geom = &self.hier.rung(level)?.geom;
        for (d, src) in b.iter().enumerate() {
            let dst = self.coeffs.get_mut(CoeffKey::b(level, d))?;
            dst.copy_from(src, 0)?;
            dst.fill_boundary(geom)?;
        }
        Ok(())
    }

    /// Derive every coarse coefficient: for each AMR level from finest to 1,
    /// coarsen within it and then onto the level below; finally coarsen
    /// within level 0.
    pub fn average_down_coeffs(&mut self) -> Result<(), LinOpError> {
        for flev in (1..self.hier.num_amr_levels()).rev() {
            self.coarsen_within_level(flev)?;
            self.coarsen_across_levels(flev)?;
        }
        self.coarsen_within_level(0)
    }

    /// Fill rungs `1..` of `amrlev` from rung 0, one factor-2 step at a time.
    /// `a` is volume-fraction weighted (or zeroed when `A == 0`), `b` is
    /// area-fraction weighted.
    pub fn coarsen_within_level(&mut self, amrlev: usize) -> Result<(), LinOpError> {
        let nmg = self.hier.num_mg_levels(amrlev)?;
        for m in 1..nmg {
            let fine = LevelIndex::new(amrlev, m - 1);
            let crse = LevelIndex::new(amrlev, m);
            let fine_eb = self.hier.rung(fine)?.factory.cut_cells();
            let crse_geom = &self.hier.rung(crse)?.geom;
            if self.alpha == 0.0 {
                self.coeffs.get_mut(CoeffKey::a(crse))?.set_val(0.0);
            } else {
                let (src, dst) = self.coeffs.pair_mut(CoeffKey::a(fine), CoeffKey::a(crse))?;
                average_down_cells(dst, src, MG_COARSEN_RATIO, fine_eb.map(EbFactory::vfrac))?;
            }
            for d in 0..self.hier.dim() {
                let weights = fine_eb.map(|eb| eb.area(d)).transpose()?;
                let (src, dst) = self.coeffs.pair_mut(CoeffKey::b(fine, d), CoeffKey::b(crse, d))?;
                average_down_faces(dst, src, MG_COARSEN_RATIO, weights)?;
                dst.fill_boundary(crse_geom)?;
            }
            log::trace!("coarsened coefficients {fine} -> {crse}");
        }
        Ok(())
    }

    /// Overwrite the finest rung of `flev - 1` under `flev` with the average
    /// of the finest rung of `flev`.
    pub fn coarsen_across_levels(&mut self, flev: usize) -> Result<(), LinOpError> {
        self.check_amrlev(flev)?;
        if flev == 0 {
            return Err(LinOpError::AmrLevelOutOfRange {
                amrlev: flev,
                num_amr_levels: self.hier.num_amr_levels(),
            });
        }
        let ratio = self.hier.ref_ratio(flev - 1)?;
        let fine = LevelIndex::finest(flev);
        let crse = LevelIndex::finest(flev - 1);
        let fine_rung = self.hier.rung(fine)?;
        let crse_geom = &self.hier.rung(crse)?.geom;
        let fine_eb = fine_rung.factory.cut_cells();
        let under = fine_rung.grids.coarsen(ratio);

        if self.alpha != 0.0 {
            let mut tmp: MultiFab = MultiFab::new(under.clone(), 1, 0);
            average_down_cells(
                &mut tmp,
                self.coeffs.get(CoeffKey::a(fine))?,
                ratio,
                fine_eb.map(EbFactory::vfrac),
            )?;
            self.coeffs.get_mut(CoeffKey::a(crse))?.parallel_copy_from(&tmp)?;
        }
        for d in 0..self.hier.dim() {
            let mut tmp: MultiFab = MultiFab::new(under.convert(IndexType::Face(d)), 1, 0);
            let weights = fine_eb.map(|eb| eb.area(d)).transpose()?;
            average_down_faces(&mut tmp, self.coeffs.get(CoeffKey::b(fine, d))?, ratio, weights)?;
            let dst = self.coeffs.get_mut(CoeffKey::b(crse, d))?;
            dst.parallel_copy_from(&tmp)?;
            dst.fill_boundary(crse_geom)?;
        }
        log::trace!("coarsened coefficients across {fine} -> {crse} by {ratio}");
        Ok(())
    }

    /// Halo exchange plus physical boundary ghosts of a cell field on
    /// `(amrlev, mglev)`. Dirichlet sides use `bc_value` (0 when `None`).
    pub fn fill_ghosts(
        &self,
        amrlev: usize,
        mglev: usize,
        mf: &mut MultiFab,
        bc_value: Option<f64>,
    ) -> Result<(), LinOpError> {
        let rung = self.hier.rung(LevelIndex::new(amrlev, mglev))?;
        check_field(mf, &rung.grids, 0, "field")?;
        mf.fill_boundary(&rung.geom)?;
        fill_domain_ghosts(mf, &rung.geom, &self.lobc, &self.hibc, bc_value.unwrap_or(0.0))
    }

    /// `res = rhs − L(sol)`.
    pub fn residual(
        &self,
        amrlev: usize,
        mglev: usize,
        res: &mut MultiFab,
        sol: &MultiFab,
        rhs: &MultiFab,
    ) -> Result<(), LinOpError> {
        let grids = &self.hier.rung(LevelIndex::new(amrlev, mglev))?.grids;
        check_field(rhs, grids, 0, "right-hand side")?;
        self.apply(amrlev, mglev, res, sol)?;
        let rs = rhs.fabs();
        let valid: Vec<IndexBox> = grids.iter().copied().collect();
        for (i, mut r) in res.fabs_mut().into_iter().enumerate() {
            for iv in valid[i].cells() {
                r.set(iv, rs[i].get(iv) - r.get(iv));
            }
        }
        Ok(())
    }

    fn check_amrlev(&self, amrlev: usize) -> Result<(), LinOpError> {
        self.hier.num_mg_levels(amrlev).map(|_| ())
    }

    fn views(&self, level: LevelIndex) -> Result<LevelViews<'_>, LinOpError> {
        let rung = self.hier.rung(level)?;
        let dim = self.hier.dim();
        let a = self.coeffs.get(CoeffKey::a(level))?.fabs();
        let b = (0..dim)
            .map(|d| Ok(self.coeffs.get(CoeffKey::b(level, d))?.fabs()))
            .collect::<Result<Vec<_>, LinOpError>>()?;
        let eb = match rung.factory.cut_cells() {
            Some(eb) => Some(
                (0..rung.grids.len())
                    .map(|i| eb.patch(i))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            None => None,
        };
        let mut bc_weight = [[1.0; 2]; MAX_SPACEDIM];
        for (d, w) in bc_weight.iter_mut().enumerate().take(dim) {
            *w = [self.lobc[d].diagonal_weight(), self.hibc[d].diagonal_weight()];
        }
        Ok(LevelViews {
            dim,
            alpha: self.alpha,
            beta: self.beta,
            dxinv: rung.geom.inv_cell_size(),
            domain: rung.geom.domain(),
            bc_weight,
            min_vfrac: self.info.min_vfrac,
            tile: self.info.tile(),
            valid: rung.grids.iter().copied().collect(),
            a,
            b,
            eb,
        })
    }

    fn update_singular_flags(&mut self) -> Result<(), LinOpError> {
        let dirichlet = self
            .lobc
            .iter()
            .chain(&self.hibc)
            .any(|&bc| bc == BcType::Dirichlet);
        for l in 0..self.hier.num_amr_levels() {
            self.singular[l] = if dirichlet || !self.hier.domain_covered(l)? {
                false
            } else if self.alpha == 0.0 {
                true
            } else {
                let coarsest = LevelIndex::new(l, self.hier.num_mg_levels(l)? - 1);
                let a = self.coeffs.get(CoeffKey::a(coarsest))?;
                a.sum(0) <= a.norm0(0) * SINGULAR_A_TOL
            };
        }
        Ok(())
    }

    #[inline]
    pub fn scalars(&self) -> (f64, f64) {
        (self.alpha, self.beta)
    }

    #[inline]
    pub fn lp_info(&self) -> &LpInfo {
        &self.info
    }

    pub fn domain_bc(&self) -> (&[BcType], &[BcType]) {
        (&self.lobc, &self.hibc)
    }

    #[inline]
    pub fn hierarchy(&self) -> &LevelHierarchy {
        &self.hier
    }

    pub fn a_coeffs(&self, level: LevelIndex) -> Result<&MultiFab, LinOpError> {
        self.coeffs.get(CoeffKey::a(level))
    }

    pub fn b_coeffs(&self, level: LevelIndex, dir: usize) -> Result<&MultiFab, LinOpError> {
        let dim = self.hier.dim();
        if dir >= dim {
            return Err(LinOpError::DirectionOutOfRange { dir, dim });
        }
        self.coeffs.get(CoeffKey::b(level, dir))
    }

    pub fn level_geometry(&self, level: LevelIndex) -> Result<&Geometry, LinOpError> {
        Ok(&self.hier.rung(level)?.geom)
    }

    pub fn level_grids(&self, level: LevelIndex) -> Result<&BoxArray, LinOpError> {
        Ok(&self.hier.rung(level)?.grids)
    }

    pub fn level_rung(&self, level: LevelIndex) -> Result<&MgRung, LinOpError> {
        self.hier.rung(level)
    }

    /// A zeroed cell field on `level` with `ngrow` ghosts.
    pub fn make_field(&self, level: LevelIndex, ngrow: usize) -> Result<MultiFab, LinOpError> {
        Ok(MultiFab::new(self.level_grids(level)?.clone(), 1, ngrow))
    }
}

impl CellLinOp for EbAbecLaplacian {
    fn num_amr_levels(&self) -> usize {
        self.hier.num_amr_levels()
    }

    fn num_mg_levels(&self, amrlev: usize) -> Result<usize, LinOpError> {
        self.hier.num_mg_levels(amrlev)
    }

    fn prepare_for_solve(&mut self) -> Result<(), LinOpError> {
        self.average_down_coeffs()?;
        self.update_singular_flags()?;
        log::debug!(
            "prepare_for_solve: A = {}, B = {}, singular levels {:?}",
            self.alpha,
            self.beta,
            self.singular
        );
        crate::debug_invariants!(self.validate_invariants(), "EbAbecLaplacian::prepare_for_solve");
        Ok(())
    }

    fn apply(
        &self,
        amrlev: usize,
        mglev: usize,
        out: &mut MultiFab,
        input: &MultiFab,
    ) -> Result<(), LinOpError> {
        let level = LevelIndex::new(amrlev, mglev);
        let grids = &self.hier.rung(level)?.grids;
        check_field(out, grids, 0, "output")?;
        check_field(input, grids, 1, "input")?;
        let views = self.views(level)?;
        let xs = input.fabs();
        for_each_patch(out.fabs_mut(), |i, mut y| {
            let c = views.coeffs(i);
            for (tile, kind) in views.tiles(i) {
                match (kind, views.cut_cells(i)) {
                    (FabType::Covered, _) => y.fill_in(&tile, 0.0),
                    (FabType::SingleValued, Some(eb)) => eb_abec::adotx(&tile, &mut y, &xs[i], &c, eb),
                    _ => abec::adotx(&tile, &mut y, &xs[i], &c),
                }
            }
        });
        if let Some(dir) = &self.info.debug_snapshot {
            write_snapshot(dir, &FieldSnapshot::capture("apply_in", level, input))?;
            write_snapshot(dir, &FieldSnapshot::capture("apply_out", level, out))?;
        }
        Ok(())
    }

    fn smooth(
        &self,
        amrlev: usize,
        mglev: usize,
        sol: &mut MultiFab,
        rhs: &MultiFab,
        color: usize,
    ) -> Result<(), LinOpError> {
        let level = LevelIndex::new(amrlev, mglev);
        let grids = &self.hier.rung(level)?.grids;
        check_field(sol, grids, 1, "solution")?;
        check_field(rhs, grids, 0, "right-hand side")?;
        let views = self.views(level)?;
        let rs = rhs.fabs();
        for_each_patch(sol.fabs_mut(), |i, mut x| {
            let c = views.coeffs(i);
            for (tile, kind) in views.tiles(i) {
                match (kind, views.cut_cells(i)) {
                    (FabType::Covered, _) => {
                        for iv in tile.cells().filter(|&iv| has_color(iv, color)) {
                            x.set(iv, 0.0);
                        }
                    }
                    (FabType::SingleValued, Some(eb)) => {
                        eb_abec::gsrb(&tile, &mut x, &rs[i], &c, eb, color)
                    }
                    _ => abec::gsrb(&tile, &mut x, &rs[i], &c, color),
                }
            }
        });
        Ok(())
    }

    fn compute_flux(
        &self,
        amrlev: usize,
        patch: usize,
        fluxes: &mut FaceFluxes,
        sol: &MultiFab,
        face_only: bool,
    ) -> Result<(), LinOpError> {
        let level = LevelIndex::finest(amrlev);
        let grids = &self.hier.rung(level)?.grids;
        check_field(sol, grids, 1, "solution")?;
        let valid = grids.get(patch)?;
        if fluxes.valid_box() != valid {
            return Err(LinOpError::LayoutMismatch(format!(
                "flux buffer for {} does not match patch {patch} ({valid})",
                fluxes.valid_box()
            )));
        }
        let views = self.views(level)?;
        let c = views.coeffs(patch);
        let x = sol.fab(patch)?;
        let eb = views
            .cut_cells(patch)
            .filter(|eb| fab_type(&eb.flags, &valid.grow(1)) != FabType::Regular);
        for d in 0..views.dim {
            let mut out = fluxes.dir_mut(d)?.as_fab_mut();
            for region in flux_regions(&valid, d, face_only) {
                match eb {
                    Some(eb) => eb_abec::face_flux(&region, d, &mut out, &x, &c, eb),
                    None => abec::face_flux(&region, d, &mut out, &x, &c),
                }
            }
        }
        Ok(())
    }

    fn normalize(&self, amrlev: usize, mglev: usize, mf: &mut MultiFab) -> Result<(), LinOpError> {
        let level = LevelIndex::new(amrlev, mglev);
        check_field(mf, &self.hier.rung(level)?.grids, 0, "field")?;
        let views = self.views(level)?;
        for_each_patch(mf.fabs_mut(), |i, mut fab| {
            let c = views.coeffs(i);
            for (tile, kind) in views.tiles(i) {
                if kind == FabType::Covered {
                    fab.fill_in(&tile, 0.0);
                    continue;
                }
                for iv in tile.cells() {
                    let diag = match views.cut_cells(i) {
                        Some(eb) if kind == FabType::SingleValued => {
                            if eb.flags.get(iv).is_covered() {
                                fab.set(iv, 0.0);
                                continue;
                            }
                            eb_abec::diagonal(iv, &c, eb)
                        }
                        _ => abec::diagonal(iv, &c),
                    };
                    if diag != 0.0 {
                        fab.set(iv, fab.get(iv) / diag);
                    }
                }
            }
        });
        Ok(())
    }

    fn is_singular(&self, amrlev: usize) -> Result<bool, LinOpError> {
        self.singular
            .get(amrlev)
            .copied()
            .ok_or(LinOpError::AmrLevelOutOfRange {
                amrlev,
                num_amr_levels: self.singular.len(),
            })
    }
}

impl DebugInvariants for EbAbecLaplacian {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "EbAbecLaplacian");
    }

    fn validate_invariants(&self) -> Result<(), LinOpError> {
        self.hier.validate_invariants()?;
        if self.singular.len() != self.hier.num_amr_levels() {
            return Err(LinOpError::InvalidHierarchy(format!(
                "{} singularity flags for {} AMR levels",
                self.singular.len(),
                self.hier.num_amr_levels()
            )));
        }
        for level in self.hier.levels() {
            let grids = &self.hier.rung(level)?.grids;
            check_field(self.coeffs.get(CoeffKey::a(level))?, grids, 0, "a")?;
            for d in 0..self.hier.dim() {
                let b = self.coeffs.get(CoeffKey::b(level, d))?;
                if *b.box_array() != grids.convert(IndexType::Face(d)) {
                    return Err(LinOpError::LayoutMismatch(format!(
                        "b[{d}] at {level} is not on the level's faces"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_level(n: i64, max: i64) -> EbAbecLaplacian {
        let dom = IndexBox::cell_2d([0, 0], [n - 1, n - 1]);
        let lev = AmrLevel::regular(
            Geometry::unit_cells(dom).unwrap(),
            BoxArray::chopped(dom, max).unwrap(),
        );
        EbAbecLaplacian::new(vec![lev], &[], LpInfo::default()).unwrap()
    }

    fn unit_b(op: &EbAbecLaplacian, level: LevelIndex) -> Vec<MultiFab> {
        let grids = op.level_grids(level).unwrap();
        (0..2)
            .map(|d| {
                let mut b: MultiFab = MultiFab::new(grids.convert(IndexType::Face(d)), 1, 0);
                b.set_val(1.0);
                b
            })
            .collect()
    }

    #[test]
    fn defaults_and_accessors() {
        let op = single_level(8, 8);
        assert_eq!(op.scalars(), (0.0, 1.0));
        assert_eq!(op.domain_bc().0, &[BcType::Neumann, BcType::Neumann]);
        assert_eq!(op.num_amr_levels(), 1);
        assert_eq!(op.num_mg_levels(0).unwrap(), 3);
        assert!(matches!(
            op.b_coeffs(LevelIndex::finest(0), 2),
            Err(LinOpError::DirectionOutOfRange { dir: 2, dim: 2 })
        ));
        assert!(op.validate_invariants().is_ok());
    }

    #[test]
    fn apply_rejects_missing_ghosts() {
        let op = single_level(8, 4);
        let level = LevelIndex::finest(0);
        let mut out = op.make_field(level, 0).unwrap();
        let input = op.make_field(level, 0).unwrap();
        assert!(matches!(
            op.apply(0, 0, &mut out, &input),
            Err(LinOpError::InsufficientGhosts { needed: 1, found: 0 })
        ));
        assert!(matches!(
            op.apply(0, 7, &mut out, &input),
            Err(LinOpError::MgLevelOutOfRange { .. })
        ));
    }

    #[test]
    fn normalize_divides_by_diagonal() {
        let mut op = single_level(4, 4);
        op.set_scalars(1.0, 1.0).unwrap();
        let level = LevelIndex::finest(0);
        let mut a = op.make_field(level, 0).unwrap();
        a.set_val(2.0);
        op.set_a_coeffs(0, &a).unwrap();
        let b = unit_b(&op, level);
        op.set_b_coeffs(0, &[&b[0], &b[1]]).unwrap();
        let mut mf = op.make_field(level, 0).unwrap();
        mf.set_val(6.0);
        op.normalize(0, 0, &mut mf).unwrap();
        let fab = mf.fab(0).unwrap();
        // interior: 2 + 4 faces; Neumann corner: 2 + 2 interior faces
        assert_eq!(fab.get(IntVect::new(1, 1, 0)), 1.0);
        assert_eq!(fab.get(IntVect::new(0, 0, 0)), 1.5);
    }

    #[test]
    fn residual_of_exact_solution_vanishes() {
        let mut op = single_level(8, 4);
        op.set_scalars(1.0, 0.5).unwrap();
        let level = LevelIndex::finest(0);
        let mut a = op.make_field(level, 0).unwrap();
        a.set_val(1.0);
        op.set_a_coeffs(0, &a).unwrap();
        let b = unit_b(&op, level);
        op.set_b_coeffs(0, &[&b[0], &b[1]]).unwrap();
        let mut sol = op.make_field(level, 1).unwrap();
        sol.set_from_fn(|iv| (iv[0] + 2 * iv[1]) as f64);
        op.fill_ghosts(0, 0, &mut sol, None).unwrap();
        let mut rhs = op.make_field(level, 0).unwrap();
        op.apply(0, 0, &mut rhs, &sol).unwrap();
        let mut res = op.make_field(level, 0).unwrap();
        op.residual(0, 0, &mut res, &sol, &rhs).unwrap();
        assert_eq!(res.norm0(0), 0.0);
    }
}
