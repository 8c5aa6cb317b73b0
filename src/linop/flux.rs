//! FaceFluxes: per-patch face flux output for flux registers.

use crate::data::fab::{Fab, FabRead};
use crate::grid::{IndexBox, IntVect, MAX_SPACEDIM};
use crate::linop_error::LinOpError;

/// Face fluxes of one patch, one face-centered fab per direction covering
/// every face of the patch's valid cells.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceFluxes {
    valid: IndexBox,
    faces: Vec<Fab>,
}

impl FaceFluxes {
    /// Zeroed fluxes for the patch with valid box `valid`.
    pub fn new(valid: IndexBox) -> Self {
        let faces = (0..valid.dim())
            .map(|d| Fab::new(valid.surrounding_faces(d), 1))
            .collect();
        Self { valid, faces }
    }

    #[inline]
    pub fn valid_box(&self) -> IndexBox {
        self.valid
    }

    pub fn dir(&self, dir: usize) -> Result<&Fab, LinOpError> {
        self.faces.get(dir).ok_or(LinOpError::DirectionOutOfRange {
            dir,
            dim: self.valid.dim(),
        })
    }

    pub(crate) fn dir_mut(&mut self, dir: usize) -> Result<&mut Fab, LinOpError> {
        let dim = self.valid.dim();
        self.faces
            .get_mut(dir)
            .ok_or(LinOpError::DirectionOutOfRange { dir, dim })
    }

    /// `Σ_d dxinv_d·(F(iv + e_d) − F(iv))` at a valid cell.
    pub fn divergence(&self, iv: IntVect, dxinv: [f64; MAX_SPACEDIM]) -> f64 {
        self.faces
            .iter()
            .enumerate()
            .map(|(d, f)| dxinv[d] * (f.get(iv + IntVect::unit(d)) - f.get(iv)))
            .sum()
    }
}

/// Face boxes along `dir` that `compute_flux` fills: every face, or only the
/// two boundary planes of the patch when `face_only` is set.
pub(crate) fn flux_regions(valid: &IndexBox, dir: usize, face_only: bool) -> Vec<IndexBox> {
    let faces = valid.surrounding_faces(dir);
    if !face_only {
        return vec![faces];
    }
    let (lo, hi) = (faces.lo()[dir], faces.hi()[dir]);
    vec![faces.slab(dir, lo), faces.slab(dir, hi)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_planes_only() {
        let valid = IndexBox::cell_3d([0, 0, 0], [3, 1, 1]);
        let all = flux_regions(&valid, 0, false);
        assert_eq!(all[0].num_pts(), 5 * 2 * 2);
        let planes = flux_regions(&valid, 0, true);
        assert_eq!(planes.len(), 2);
        assert_eq!(planes[1].lo()[0], 4);
        assert_eq!(planes[0].num_pts() + planes[1].num_pts(), 8);
        let fl = FaceFluxes::new(valid);
        assert!(fl.dir(2).is_ok());
        assert!(fl.dir(3).is_err());
    }
}
