//! Weighted restriction of coefficient fields.
//!
//! Both functions write a coarse field whose box array is exactly the fine
//! box array coarsened by `ratio`, patch for patch. Cross-level averaging
//! goes through such an aligned temporary and is then copied into the coarse
//! level's own grids.
//!
//! A coarse value is `Σ w·v / Σ w` over the fine values it covers. Without
//! weights every fine value counts once. When `Σ w == 0` the coarse value is
//! left as it was.

use crate::data::fab::FabRead;
use crate::data::multifab::MultiFab;
use crate::grid::{IndexBox, IndexType, IntVect};
use crate::linop_error::LinOpError;

fn check_aligned(crse: &MultiFab, fine: &MultiFab, ratio: i64) -> Result<(), LinOpError> {
    if *crse.box_array() != fine.box_array().coarsen(ratio) {
        return Err(LinOpError::LayoutMismatch(format!(
            "coarse grids are not the fine grids coarsened by {ratio}"
        )));
    }
    Ok(())
}

fn check_weights(field: &MultiFab, weights: Option<&MultiFab>) -> Result<(), LinOpError> {
    match weights {
        Some(w) if w.box_array() != field.box_array() => Err(LinOpError::LayoutMismatch(
            "averaging weights live on different grids".into(),
        )),
        _ => Ok(()),
    }
}

/// Restrict cell data, weighted by e.g. volume fractions.
pub fn average_down_cells(
    crse: &mut MultiFab,
    fine: &MultiFab,
    ratio: i64,
    weights: Option<&MultiFab>,
) -> Result<(), LinOpError> {
    check_aligned(crse, fine, ratio)?;
    check_weights(fine, weights)?;
    let dim = fine.box_array().dim();
    let fv = fine.fabs();
    let wv = weights.map(MultiFab::fabs);
    let valid: Vec<IndexBox> = crse.box_array().iter().copied().collect();
    for (i, mut cf) in crse.fabs_mut().into_iter().enumerate() {
        for ic in valid[i].cells() {
            let lo = ic.scale(ratio);
            let sub = IndexBox::new(dim, lo, lo + IntVect::splat(ratio - 1, dim));
            let (mut num, mut den) = (0.0, 0.0);
            for f in sub.cells() {
                let w = wv.as_ref().map_or(1.0, |w| w[i].get(f));
                num += w * fv[i].get(f);
                den += w;
            }
            if den > 0.0 {
                cf.set(ic, num / den);
            }
        }
    }
    Ok(())
}

/// Restrict face data normal to the fields' face direction, weighted by e.g.
/// area fractions of the fine faces.
pub fn average_down_faces(
    crse: &mut MultiFab,
    fine: &MultiFab,
    ratio: i64,
    weights: Option<&MultiFab>,
) -> Result<(), LinOpError> {
    let IndexType::Face(dir) = fine.ix_type() else {
        return Err(LinOpError::LayoutMismatch(
            "face averaging needs face-centered data".into(),
        ));
    };
    check_aligned(crse, fine, ratio)?;
    check_weights(fine, weights)?;
    let dim = fine.box_array().dim();
    let fv = fine.fabs();
    let wv = weights.map(MultiFab::fabs);
    let valid: Vec<IndexBox> = crse.box_array().iter().copied().collect();
    let mut span = IntVect::splat(ratio - 1, dim);
    span[dir] = 0;
    for (i, mut cf) in crse.fabs_mut().into_iter().enumerate() {
        for ic in valid[i].cells() {
            let lo = ic.scale(ratio);
            let sub = IndexBox::new(dim, lo, lo + span);
            let (mut num, mut den) = (0.0, 0.0);
            for f in sub.cells() {
                let w = wv.as_ref().map_or(1.0, |w| w[i].get(f));
                num += w * fv[i].get(f);
                den += w;
            }
            if den > 0.0 {
                cf.set(ic, num / den);
            }
        }
    }
    Ok(())
}
