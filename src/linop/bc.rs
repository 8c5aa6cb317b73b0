//! Physical domain boundary conditions and ghost-cell fill.

use serde::{Deserialize, Serialize};

use crate::data::fab::FabRead;
use crate::data::multifab::MultiFab;
use crate::grid::{Geometry, IndexType};
use crate::linop_error::LinOpError;

/// Boundary condition on one side of the problem domain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BcType {
    /// Prescribed value on the boundary face.
    Dirichlet,
    /// Zero normal derivative.
    #[default]
    Neumann,
    /// Wraps around; must agree with the geometry's periodicity.
    Periodic,
}

impl BcType {
    /// Multiplier the boundary face contributes to the cell's diagonal once
    /// the ghost cell is expressed through the cell it mirrors.
    #[inline]
    pub fn diagonal_weight(self) -> f64 {
        match self {
            BcType::Dirichlet => 2.0,
            BcType::Neumann => 0.0,
            BcType::Periodic => 1.0,
        }
    }
}

/// Check `lobc`/`hibc` against the geometry: one entry per direction, and
/// `Periodic` exactly on the periodic directions.
pub fn validate_domain_bc(
    geom: &Geometry,
    lobc: &[BcType],
    hibc: &[BcType],
) -> Result<(), LinOpError> {
    let dim = geom.dim();
    if lobc.len() != dim || hibc.len() != dim {
        return Err(LinOpError::BoundaryMismatch {
            dir: lobc.len().min(hibc.len()),
            reason: format!("expected {dim} entries per side"),
        });
    }
    for d in 0..dim {
        let periodic = geom.is_periodic(d);
        for (side, bc) in [("low", lobc[d]), ("high", hibc[d])] {
            if (bc == BcType::Periodic) != periodic {
                return Err(LinOpError::BoundaryMismatch {
                    dir: d,
                    reason: format!(
                        "{side} side is {bc:?} but the geometry is {}periodic",
                        if periodic { "" } else { "not " }
                    ),
                });
            }
        }
    }
    Ok(())
}

/// Fill ghost cells of `mf` that lie across a non-periodic domain boundary.
///
/// Neumann ghosts copy the mirrored interior cell; Dirichlet ghosts are set
/// so the linear interpolant hits `value` on the boundary face. Directions are
/// processed in order over the whole fab, so edge and corner ghosts see the
/// values written for earlier directions.
pub fn fill_domain_ghosts(
    mf: &mut MultiFab,
    geom: &Geometry,
    lobc: &[BcType],
    hibc: &[BcType],
    value: f64,
) -> Result<(), LinOpError> {
    if mf.ix_type() != IndexType::Cell {
        return Err(LinOpError::LayoutMismatch(
            "domain ghost fill needs cell-centered data".into(),
        ));
    }
    validate_domain_bc(geom, lobc, hibc)?;
    let ng = mf.ngrow() as i64;
    let domain = geom.domain();
    let ncomp = mf.ncomp();
    for mut fab in mf.fabs_mut() {
        let fb = fab.fab_box();
        for d in 0..geom.dim() {
            for (hi, bc) in [(false, lobc[d]), (true, hibc[d])] {
                if bc == BcType::Periodic {
                    continue;
                }
                for g in 1..=ng {
                    let (plane, mirror) = if hi {
                        (domain.hi()[d] + g, domain.hi()[d] - g + 1)
                    } else {
                        (domain.lo()[d] - g, domain.lo()[d] + g - 1)
                    };
                    if plane < fb.lo()[d] || plane > fb.hi()[d] {
                        continue;
                    }
                    for iv in fb.slab(d, plane).cells() {
                        let mut src = iv;
                        src[d] = mirror;
                        if !fb.contains(src) {
                            continue;
                        }
                        for comp in 0..ncomp {
                            let inner = fab.get_comp(src, comp);
                            let v = match bc {
                                BcType::Dirichlet => 2.0 * value - inner,
                                _ => inner,
                            };
                            fab.set_comp(iv, comp, v);
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{BoxArray, IndexBox, IntVect};

    #[test]
    fn mirrors_neumann_and_reflects_dirichlet() {
        let dom = IndexBox::cell_2d([0, 0], [3, 3]);
        let geom = Geometry::unit_cells(dom).unwrap();
        let mut mf: MultiFab = MultiFab::new(BoxArray::single(dom).unwrap(), 1, 1);
        mf.set_from_fn(|iv| (iv[0] + 10 * iv[1]) as f64);
        let lobc = [BcType::Neumann, BcType::Dirichlet];
        let hibc = [BcType::Dirichlet, BcType::Neumann];
        fill_domain_ghosts(&mut mf, &geom, &lobc, &hibc, 1.0).unwrap();
        let fab = mf.fab(0).unwrap();
        assert_eq!(fab.get(IntVect::new(-1, 2, 0)), 20.0);
        assert_eq!(fab.get(IntVect::new(4, 2, 0)), 2.0 - 23.0);
        assert_eq!(fab.get(IntVect::new(1, -1, 0)), 2.0 - 1.0);
        assert_eq!(fab.get(IntVect::new(1, 4, 0)), 31.0);
        // corner: x-pass mirrors first, then the y-pass reflects the result
        assert_eq!(fab.get(IntVect::new(-1, -1, 0)), 2.0 - 0.0);
    }

    #[test]
    fn periodic_must_match_geometry() {
        let dom = IndexBox::cell_2d([0, 0], [3, 3]);
        let geom = Geometry::unit_cells(dom).unwrap();
        let bad = [BcType::Periodic, BcType::Neumann];
        let ok = [BcType::Neumann, BcType::Neumann];
        assert!(matches!(
            validate_domain_bc(&geom, &bad, &ok),
            Err(LinOpError::BoundaryMismatch { dir: 0, .. })
        ));
        assert_eq!(BcType::default(), BcType::Neumann);
    }
}
