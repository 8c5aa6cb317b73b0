//! Physical description of a level: domain, cell size and periodicity.

use super::index_box::IndexBox;
use super::int_vect::{IntVect, MAX_SPACEDIM};
use crate::linop_error::LinOpError;
use itertools::Itertools;

/// Problem domain of one level together with its physical extents.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    domain: IndexBox,
    prob_lo: [f64; MAX_SPACEDIM],
    prob_hi: [f64; MAX_SPACEDIM],
    periodic: [bool; MAX_SPACEDIM],
}

impl Geometry {
    /// # Errors
    /// `UnsupportedDimension` unless the domain is 2- or 3-dimensional,
    /// `InvalidGeometry` for an empty domain or a non-positive extent.
    pub fn new(
        domain: IndexBox,
        prob_lo: [f64; MAX_SPACEDIM],
        prob_hi: [f64; MAX_SPACEDIM],
        periodic: [bool; MAX_SPACEDIM],
    ) -> Result<Self, LinOpError> {
        let dim = domain.dim();
        if !(2..=3).contains(&dim) {
            return Err(LinOpError::UnsupportedDimension(dim));
        }
        if domain.is_empty() {
            return Err(LinOpError::InvalidGeometry(format!("empty domain {domain}")));
        }
        for d in 0..dim {
            if !(prob_hi[d] > prob_lo[d]) {
                return Err(LinOpError::InvalidGeometry(format!(
                    "extent along direction {d} is not positive: [{}, {}]",
                    prob_lo[d], prob_hi[d]
                )));
            }
        }
        let mut periodic = periodic;
        for p in periodic.iter_mut().skip(dim) {
            *p = false;
        }
        Ok(Self {
            domain,
            prob_lo,
            prob_hi,
            periodic,
        })
    }

    /// Non-periodic geometry with cells of unit physical width in every
    /// direction, offset so cell `lo` starts at the origin.
    pub fn unit_cells(domain: IndexBox) -> Result<Self, LinOpError> {
        let mut hi = [1.0; MAX_SPACEDIM];
        for (d, h) in hi.iter_mut().enumerate().take(domain.dim()) {
            *h = domain.length(d) as f64;
        }
        Self::new(domain, [0.0; MAX_SPACEDIM], hi, [false; MAX_SPACEDIM])
    }

    /// Same geometry with the given periodic directions.
    pub fn with_periodicity(mut self, periodic: [bool; MAX_SPACEDIM]) -> Self {
        for d in 0..self.dim() {
            self.periodic[d] = periodic[d];
        }
        self
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.domain.dim()
    }

    #[inline]
    pub fn domain(&self) -> IndexBox {
        self.domain
    }

    #[inline]
    pub fn prob_lo(&self) -> [f64; MAX_SPACEDIM] {
        self.prob_lo
    }

    #[inline]
    pub fn is_periodic(&self, dir: usize) -> bool {
        self.periodic[dir]
    }

    pub fn is_any_periodic(&self) -> bool {
        self.periodic.iter().any(|&p| p)
    }

    /// Physical cell width per direction (1.0 in unused directions).
    pub fn cell_size(&self) -> [f64; MAX_SPACEDIM] {
        let mut dx = [1.0; MAX_SPACEDIM];
        for (d, w) in dx.iter_mut().enumerate().take(self.dim()) {
            *w = (self.prob_hi[d] - self.prob_lo[d]) / self.domain.length(d) as f64;
        }
        dx
    }

    pub fn inv_cell_size(&self) -> [f64; MAX_SPACEDIM] {
        self.cell_size().map(|w| 1.0 / w)
    }

    /// Physical position of the low corner of cell `iv`.
    pub fn node_position(&self, iv: IntVect) -> [f64; MAX_SPACEDIM] {
        let dx = self.cell_size();
        let lo = self.domain.lo();
        let mut x = [0.0; MAX_SPACEDIM];
        for d in 0..self.dim() {
            x[d] = self.prob_lo[d] + (iv[d] - lo[d]) as f64 * dx[d];
        }
        x
    }

    /// Physical position of the center of cell `iv`.
    pub fn cell_center(&self, iv: IntVect) -> [f64; MAX_SPACEDIM] {
        let dx = self.cell_size();
        let mut x = self.node_position(iv);
        for d in 0..self.dim() {
            x[d] += 0.5 * dx[d];
        }
        x
    }

    /// Coarser geometry covering the same physical region.
    pub fn coarsen(&self, ratio: i64) -> Result<Geometry, LinOpError> {
        if !self.domain.coarsenable(ratio, 1) {
            return Err(LinOpError::NotCoarsenable {
                what: format!("domain {}", self.domain),
                ratio,
            });
        }
        Ok(Geometry {
            domain: self.domain.coarsen(ratio),
            ..self.clone()
        })
    }

    /// Finer geometry covering the same physical region.
    pub fn refine(&self, ratio: i64) -> Geometry {
        Geometry {
            domain: self.domain.refine(ratio),
            ..self.clone()
        }
    }

    /// All nonzero periodic image shifts (multiples of the domain length along
    /// periodic directions).
    pub fn periodic_shifts(&self) -> Vec<IntVect> {
        let per_dir: Vec<Vec<i64>> = (0..MAX_SPACEDIM)
            .map(|d| {
                if d < self.dim() && self.periodic[d] {
                    let len = self.domain.length(d);
                    vec![-len, 0, len]
                } else {
                    vec![0]
                }
            })
            .collect();
        per_dir
            .into_iter()
            .multi_cartesian_product()
            .map(|s| IntVect::new(s[0], s[1], s[2]))
            .filter(|s| *s != IntVect::ZERO)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_size_and_centers() {
        let dom = IndexBox::cell_2d([0, 0], [3, 7]);
        let geom = Geometry::new(dom, [0.0, -1.0, 0.0], [1.0, 1.0, 0.0], [false; 3]).unwrap();
        let dx = geom.cell_size();
        assert!((dx[0] - 0.25).abs() < 1e-15);
        assert!((dx[1] - 0.25).abs() < 1e-15);
        let c = geom.cell_center(IntVect::new(1, 0, 0));
        assert!((c[0] - 0.375).abs() < 1e-15);
        assert!((c[1] + 0.875).abs() < 1e-15);
    }

    #[test]
    fn rejects_degenerate_extent() {
        let dom = IndexBox::cell_2d([0, 0], [3, 3]);
        assert!(matches!(
            Geometry::new(dom, [0.0; 3], [1.0, 0.0, 0.0], [false; 3]),
            Err(LinOpError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn periodic_shifts_enumerate_images() {
        let dom = IndexBox::cell_2d([0, 0], [7, 3]);
        let geom = Geometry::unit_cells(dom)
            .unwrap()
            .with_periodicity([true, true, false]);
        let shifts = geom.periodic_shifts();
        assert_eq!(shifts.len(), 8);
        assert!(shifts.contains(&IntVect::new(8, -4, 0)));
        let one = Geometry::unit_cells(dom)
            .unwrap()
            .with_periodicity([false, true, false]);
        assert_eq!(one.periodic_shifts().len(), 2);
    }
}
