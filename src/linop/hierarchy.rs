//! LevelHierarchy: the (AMR level, multigrid rung) ladder.
//!
//! Built once from the caller's AMR levels. Each AMR level is extended
//! downward by factor-2 coarsenings: level 0 as far as its grids allow, finer
//! levels until they reach the resolution of the level below. Shape is fixed
//! after construction.

use std::sync::Arc;

use crate::debug_invariants::DebugInvariants;
use crate::ebgeom::{EbFactory, FabFactory, RegularFactory};
use crate::grid::{BoxArray, Geometry, LevelIndex};
use crate::linop::lp_info::LpInfo;
use crate::linop_error::LinOpError;

/// Coarsening ratio between consecutive multigrid rungs.
pub const MG_COARSEN_RATIO: i64 = 2;

/// One AMR level as supplied by the caller.
#[derive(Clone, Debug)]
pub struct AmrLevel {
    pub geom: Geometry,
    pub grids: BoxArray,
    pub factory: Arc<dyn FabFactory>,
}

impl AmrLevel {
    pub fn new(geom: Geometry, grids: BoxArray, factory: Arc<dyn FabFactory>) -> Self {
        Self {
            geom,
            grids,
            factory,
        }
    }

    /// Plain Cartesian level.
    pub fn regular(geom: Geometry, grids: BoxArray) -> Self {
        Self::new(geom, grids, Arc::new(RegularFactory))
    }

    /// Level with cut-cell geometry.
    pub fn with_eb(eb: EbFactory) -> Self {
        let geom = eb.geom().clone();
        let grids = eb.box_array().clone();
        Self::new(geom, grids, Arc::new(eb))
    }
}

/// Grids, geometry and patch factory of one level index.
#[derive(Clone, Debug)]
pub struct MgRung {
    pub geom: Geometry,
    pub grids: BoxArray,
    pub factory: Arc<dyn FabFactory>,
}

#[derive(Clone, Debug)]
pub struct LevelHierarchy {
    dim: usize,
    rungs: Vec<Vec<MgRung>>,
    ref_ratio: Vec<i64>,
    domain_covered: Vec<bool>,
}

impl LevelHierarchy {
    /// Validate the AMR levels and build their multigrid ladders.
    ///
    /// # Errors
    /// `InvalidHierarchy` for empty input, mixed dimensions, ratios that are
    /// not powers of two, domains that do not refine into each other, grids
    /// outside their domain or not nested in the level below, or geometry
    /// attached to different grids. `NotCoarsenable` if a fine level cannot be
    /// coarsened down to the level below.
    pub fn build(levels: Vec<AmrLevel>, ref_ratio: &[i64], info: &LpInfo) -> Result<Self, LinOpError> {
        let Some(first) = levels.first() else {
            return Err(LinOpError::InvalidHierarchy("no AMR levels".into()));
        };
        let dim = first.geom.dim();
        if !(2..=3).contains(&dim) {
            return Err(LinOpError::UnsupportedDimension(dim));
        }
        if ref_ratio.len() + 1 != levels.len() {
            return Err(LinOpError::InvalidHierarchy(format!(
                "{} AMR levels need {} refinement ratios, got {}",
                levels.len(),
                levels.len() - 1,
                ref_ratio.len()
            )));
        }
        for (l, lev) in levels.iter().enumerate() {
            Self::check_level(l, lev, dim)?;
            if l > 0 {
                Self::check_nesting(l, &levels[l - 1], lev, ref_ratio[l - 1])?;
            }
        }

        let mut rungs = Vec::with_capacity(levels.len());
        let mut domain_covered = Vec::with_capacity(levels.len());
        for (l, lev) in levels.into_iter().enumerate() {
            domain_covered.push(lev.grids.num_pts() == lev.geom.domain().num_pts());
            let mut ladder = vec![MgRung {
                geom: lev.geom,
                grids: lev.grids,
                factory: lev.factory,
            }];
            if l == 0 {
                while ladder.len() <= info.max_coarsening_level {
                    let cur = &ladder[ladder.len() - 1];
                    let width = info.mg_box_min_width;
                    if !cur.grids.coarsenable(MG_COARSEN_RATIO, width)
                        || !cur.geom.domain().coarsenable(MG_COARSEN_RATIO, width)
                    {
                        break;
                    }
                    let next = Self::coarsen_rung(cur)?;
                    ladder.push(next);
                }
            } else {
                let mut reached = 1;
                while reached < ref_ratio[l - 1] {
                    let cur = &ladder[ladder.len() - 1];
                    if !cur.grids.coarsenable(MG_COARSEN_RATIO, 1) {
                        return Err(LinOpError::NotCoarsenable {
                            what: format!("grids of AMR level {l}"),
                            ratio: ref_ratio[l - 1],
                        });
                    }
                    let next = Self::coarsen_rung(cur)?;
                    ladder.push(next);
                    reached *= MG_COARSEN_RATIO;
                }
            }
            for (m, rung) in ladder.iter().enumerate() {
                Self::warn_small_fractions(LevelIndex::new(l, m), rung, info.min_vfrac);
            }
            rungs.push(ladder);
        }

        let hier = Self {
            dim,
            rungs,
            ref_ratio: ref_ratio.to_vec(),
            domain_covered,
        };
        log::debug!(
            "LevelHierarchy: {} AMR levels, multigrid rungs {:?}",
            hier.num_amr_levels(),
            hier.rungs.iter().map(Vec::len).collect::<Vec<_>>()
        );
        crate::debug_invariants!(hier.validate_invariants(), "LevelHierarchy::build");
        Ok(hier)
    }

    fn check_level(l: usize, lev: &AmrLevel, dim: usize) -> Result<(), LinOpError> {
        if lev.geom.dim() != dim || lev.grids.dim() != dim {
            return Err(LinOpError::InvalidHierarchy(format!(
                "AMR level {l} is not {dim}-dimensional"
            )));
        }
        let domain = lev.geom.domain();
        if let Some(bx) = lev.grids.iter().find(|b| !domain.contains_box(b)) {
            return Err(LinOpError::InvalidHierarchy(format!(
                "AMR level {l}: box {bx} outside domain {domain}"
            )));
        }
        if let Some(eb) = lev.factory.cut_cells() {
            if *eb.box_array() != lev.grids || eb.geom().domain() != domain {
                return Err(LinOpError::InvalidHierarchy(format!(
                    "AMR level {l}: cut-cell geometry was built for different grids"
                )));
            }
        }
        Ok(())
    }

    fn check_nesting(l: usize, crse: &AmrLevel, fine: &AmrLevel, ratio: i64) -> Result<(), LinOpError> {
        if ratio < MG_COARSEN_RATIO || ratio.count_ones() != 1 {
            return Err(LinOpError::InvalidHierarchy(format!(
                "refinement ratio {ratio} below AMR level {l} is not a power of two"
            )));
        }
        if fine.geom.domain() != crse.geom.domain().refine(ratio) {
            return Err(LinOpError::InvalidHierarchy(format!(
                "domain of AMR level {l} is not the domain of level {} refined by {ratio}",
                l - 1
            )));
        }
        if !fine.grids.coarsenable(ratio, 1) {
            return Err(LinOpError::NotCoarsenable {
                what: format!("grids of AMR level {l}"),
                ratio,
            });
        }
        let coarsened = fine.grids.coarsen(ratio);
        if let Some(bx) = coarsened.iter().find(|b| !crse.grids.covers(b)) {
            return Err(LinOpError::InvalidHierarchy(format!(
                "AMR level {l} is not nested in level {}: {bx} not covered",
                l - 1
            )));
        }
        Ok(())
    }

    fn coarsen_rung(fine: &MgRung) -> Result<MgRung, LinOpError> {
        let geom = fine.geom.coarsen(MG_COARSEN_RATIO)?;
        let grids = fine.grids.coarsen(MG_COARSEN_RATIO);
        let factory = fine.factory.coarsen(MG_COARSEN_RATIO, &geom, &grids)?;
        Ok(MgRung {
            geom,
            grids,
            factory,
        })
    }

    fn warn_small_fractions(level: LevelIndex, rung: &MgRung, floor: f64) {
        if let Some(v) = rung.factory.cut_cells().and_then(EbFactory::min_cut_vfrac) {
            if v < floor {
                log::warn!("level {level}: cut cell volume fraction {v:e} is below the floor {floor:e}");
            }
        }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn num_amr_levels(&self) -> usize {
        self.rungs.len()
    }

    pub fn num_mg_levels(&self, amrlev: usize) -> Result<usize, LinOpError> {
        self.rungs
            .get(amrlev)
            .map(Vec::len)
            .ok_or(LinOpError::AmrLevelOutOfRange {
                amrlev,
                num_amr_levels: self.rungs.len(),
            })
    }

    pub fn rung(&self, level: LevelIndex) -> Result<&MgRung, LinOpError> {
        let ladder = self
            .rungs
            .get(level.amrlev)
            .ok_or(LinOpError::AmrLevelOutOfRange {
                amrlev: level.amrlev,
                num_amr_levels: self.rungs.len(),
            })?;
        ladder.get(level.mglev).ok_or(LinOpError::MgLevelOutOfRange {
            level,
            num_mg_levels: ladder.len(),
        })
    }

    /// Refinement ratio between `amrlev` and `amrlev + 1`.
    pub fn ref_ratio(&self, amrlev: usize) -> Result<i64, LinOpError> {
        self.ref_ratio
            .get(amrlev)
            .copied()
            .ok_or(LinOpError::AmrLevelOutOfRange {
                amrlev: amrlev + 1,
                num_amr_levels: self.rungs.len(),
            })
    }

    /// Whether the grids of `amrlev` cover its whole domain.
    pub fn domain_covered(&self, amrlev: usize) -> Result<bool, LinOpError> {
        self.domain_covered
            .get(amrlev)
            .copied()
            .ok_or(LinOpError::AmrLevelOutOfRange {
                amrlev,
                num_amr_levels: self.rungs.len(),
            })
    }

    /// Every level index, AMR level major, finest rung first.
    pub fn levels(&self) -> impl Iterator<Item = LevelIndex> + '_ {
        self.rungs
            .iter()
            .enumerate()
            .flat_map(|(l, ladder)| (0..ladder.len()).map(move |m| LevelIndex::new(l, m)))
    }
}

impl DebugInvariants for LevelHierarchy {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "LevelHierarchy");
    }

    fn validate_invariants(&self) -> Result<(), LinOpError> {
        for level in self.levels() {
            if level.mglev == 0 {
                continue;
            }
            let fine = self.rung(LevelIndex::new(level.amrlev, level.mglev - 1))?;
            let crse = self.rung(level)?;
            if crse.grids != fine.grids.coarsen(MG_COARSEN_RATIO) {
                return Err(LinOpError::InvalidHierarchy(format!(
                    "rung {level} is not its finer rung coarsened by {MG_COARSEN_RATIO}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::IndexBox;

    fn level(lo: [i64; 2], hi: [i64; 2], dom_hi: i64, max: i64) -> AmrLevel {
        let dom = IndexBox::cell_2d([0, 0], [dom_hi, dom_hi]);
        let geom = Geometry::unit_cells(dom).unwrap();
        AmrLevel::regular(geom, BoxArray::chopped(IndexBox::cell_2d(lo, hi), max).unwrap())
    }

    #[test]
    fn rung_counts_follow_grid_and_ratio() {
        let levels = vec![level([0, 0], [15, 15], 15, 8), level([8, 8], [23, 23], 31, 8)];
        let hier = LevelHierarchy::build(levels, &[2], &LpInfo::default()).unwrap();
        // 16 -> 8 -> 4 -> 2 with 8-wide patches stopping at width 2
        assert_eq!(hier.num_mg_levels(0).unwrap(), 3);
        assert_eq!(hier.num_mg_levels(1).unwrap(), 2);
        assert!(hier.domain_covered(0).unwrap());
        assert!(!hier.domain_covered(1).unwrap());
        assert_eq!(hier.levels().count(), 5);
    }

    #[test]
    fn max_coarsening_level_caps_level_zero() {
        let info = LpInfo::default().with_max_coarsening_level(0);
        let hier = LevelHierarchy::build(vec![level([0, 0], [15, 15], 15, 16)], &[], &info).unwrap();
        assert_eq!(hier.num_mg_levels(0).unwrap(), 1);
    }

    #[test]
    fn rejects_unnested_fine_level() {
        let levels = vec![level([0, 0], [7, 15], 15, 8), level([16, 0], [23, 7], 31, 8)];
        assert!(matches!(
            LevelHierarchy::build(levels, &[2], &LpInfo::default()),
            Err(LinOpError::InvalidHierarchy(_))
        ));
    }

    #[test]
    fn rejects_ratio_count_mismatch() {
        let levels = vec![level([0, 0], [15, 15], 15, 8)];
        assert!(LevelHierarchy::build(levels, &[2], &LpInfo::default()).is_err());
        let err = LevelHierarchy::build(Vec::new(), &[], &LpInfo::default());
        assert!(matches!(err, Err(LinOpError::InvalidHierarchy(_))));
    }
}
