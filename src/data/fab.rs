//! Single-patch array views.
//!
//! A fab ("Fortran array box") is the data of one patch over its
//! ghost-grown box, stored first-direction-fastest with components outermost.
//! [`FabRef`] and [`FabMut`] borrow a range of a multifab buffer; [`Fab`] owns
//! its data and is used for per-patch scratch such as face fluxes.

use crate::grid::{IndexBox, IntVect};

/// Linear offset of `(iv, comp)` inside a fab over `bx`.
#[inline]
pub fn fab_offset(bx: &IndexBox, iv: IntVect, comp: usize) -> usize {
    debug_assert!(bx.contains(iv), "index {iv} outside fab box {bx}");
    let lo = bx.lo();
    let nx = bx.length(0) as usize;
    let ny = bx.length(1) as usize;
    let nz = bx.length(2) as usize;
    let i = (iv[0] - lo[0]) as usize;
    let j = (iv[1] - lo[1]) as usize;
    let k = (iv[2] - lo[2]) as usize;
    i + nx * (j + ny * (k + nz * comp))
}

/// Read access shared by all fab flavours.
pub trait FabRead<T: Copy = f64> {
    /// The box the data is defined on (valid region plus ghosts).
    fn fab_box(&self) -> IndexBox;
    fn ncomp(&self) -> usize;
    fn data(&self) -> &[T];

    #[inline]
    fn get(&self, iv: IntVect) -> T {
        self.get_comp(iv, 0)
    }

    #[inline]
    fn get_comp(&self, iv: IntVect, comp: usize) -> T {
        self.data()[fab_offset(&self.fab_box(), iv, comp)]
    }
}

/// Borrowed read-only patch data.
#[derive(Clone, Copy, Debug)]
pub struct FabRef<'a, T = f64> {
    bx: IndexBox,
    ncomp: usize,
    data: &'a [T],
}

impl<'a, T: Copy> FabRef<'a, T> {
    pub(crate) fn new(bx: IndexBox, ncomp: usize, data: &'a [T]) -> Self {
        debug_assert_eq!(bx.num_pts() * ncomp, data.len());
        Self { bx, ncomp, data }
    }
}

impl<T: Copy> FabRead<T> for FabRef<'_, T> {
    #[inline]
    fn fab_box(&self) -> IndexBox {
        self.bx
    }
    #[inline]
    fn ncomp(&self) -> usize {
        self.ncomp
    }
    #[inline]
    fn data(&self) -> &[T] {
        self.data
    }
}

/// Borrowed mutable patch data.
#[derive(Debug)]
pub struct FabMut<'a, T = f64> {
    bx: IndexBox,
    ncomp: usize,
    data: &'a mut [T],
}

impl<'a, T: Copy> FabMut<'a, T> {
    pub(crate) fn new(bx: IndexBox, ncomp: usize, data: &'a mut [T]) -> Self {
        debug_assert_eq!(bx.num_pts() * ncomp, data.len());
        Self { bx, ncomp, data }
    }

    #[inline]
    pub fn set(&mut self, iv: IntVect, v: T) {
        self.set_comp(iv, 0, v);
    }

    #[inline]
    pub fn set_comp(&mut self, iv: IntVect, comp: usize, v: T) {
        self.data[fab_offset(&self.bx, iv, comp)] = v;
    }

    /// Set every component of the indices in `region ∩ fab_box` to `v`.
    pub fn fill_in(&mut self, region: &IndexBox, v: T) {
        if let Some(r) = self.bx.intersect(region) {
            for comp in 0..self.ncomp {
                for iv in r.cells() {
                    self.set_comp(iv, comp, v);
                }
            }
        }
    }

    /// Copy every component of `src` over `region ∩ fab_box ∩ src.fab_box`.
    pub fn copy_in<F: FabRead<T>>(&mut self, src: &F, region: &IndexBox) {
        let Some(r) = self
            .bx
            .intersect(region)
            .and_then(|r| r.intersect(&src.fab_box()))
        else {
            return;
        };
        for comp in 0..self.ncomp.min(src.ncomp()) {
            for iv in r.cells() {
                self.set_comp(iv, comp, src.get_comp(iv, comp));
            }
        }
    }

    /// Reborrow as a read-only view.
    pub fn as_fab_ref(&self) -> FabRef<'_, T> {
        FabRef::new(self.bx, self.ncomp, &*self.data)
    }
}

impl<T: Copy> FabRead<T> for FabMut<'_, T> {
    #[inline]
    fn fab_box(&self) -> IndexBox {
        self.bx
    }
    #[inline]
    fn ncomp(&self) -> usize {
        self.ncomp
    }
    #[inline]
    fn data(&self) -> &[T] {
        &*self.data
    }
}

/// Owned patch data.
#[derive(Clone, Debug, PartialEq)]
pub struct Fab<T = f64> {
    bx: IndexBox,
    ncomp: usize,
    data: Vec<T>,
}

impl<T: Copy + Default> Fab<T> {
    /// Zero-initialised (`T::default()`) fab over `bx`.
    pub fn new(bx: IndexBox, ncomp: usize) -> Self {
        Self {
            bx,
            ncomp,
            data: vec![T::default(); bx.num_pts() * ncomp],
        }
    }

    pub fn as_fab_ref(&self) -> FabRef<'_, T> {
        FabRef::new(self.bx, self.ncomp, &self.data)
    }

    pub fn as_fab_mut(&mut self) -> FabMut<'_, T> {
        FabMut::new(self.bx, self.ncomp, &mut self.data)
    }
}

impl<T: Copy> FabRead<T> for Fab<T> {
    #[inline]
    fn fab_box(&self) -> IndexBox {
        self.bx
    }
    #[inline]
    fn ncomp(&self) -> usize {
        self.ncomp
    }
    #[inline]
    fn data(&self) -> &[T] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_first_direction_fastest() {
        let bx = IndexBox::cell_3d([-1, -1, -1], [2, 1, 0]);
        assert_eq!(fab_offset(&bx, IntVect::new(-1, -1, -1), 0), 0);
        assert_eq!(fab_offset(&bx, IntVect::new(0, -1, -1), 0), 1);
        assert_eq!(fab_offset(&bx, IntVect::new(-1, 0, -1), 0), 4);
        assert_eq!(fab_offset(&bx, IntVect::new(-1, -1, 0), 0), 12);
        assert_eq!(fab_offset(&bx, IntVect::new(-1, -1, -1), 1), 24);
    }

    #[test]
    fn fill_and_copy_respect_regions() {
        let bx = IndexBox::cell_2d([0, 0], [3, 3]);
        let mut a = Fab::<f64>::new(bx, 1);
        a.as_fab_mut().fill_in(&IndexBox::cell_2d([1, 1], [2, 5]), 3.0);
        assert_eq!(a.get(IntVect::new(1, 3, 0)), 3.0);
        assert_eq!(a.get(IntVect::new(0, 3, 0)), 0.0);

        let mut b = Fab::<f64>::new(bx.grow(1), 1);
        b.as_fab_mut().copy_in(&a, &bx.grow(1));
        assert_eq!(b.get(IntVect::new(2, 2, 0)), 3.0);
        assert_eq!(b.get(IntVect::new(-1, -1, 0)), 0.0);
    }
}
