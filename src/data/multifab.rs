//! MultiFab: per-level field data over a box array.
//!
//! A `MultiFab` couples a [`BoxArray`] with a [`FabLayout`] and one flat
//! [`Storage`] buffer holding every patch (valid region plus `ngrow` ghost
//! layers, `ncomp` components). It is the unit the operator reads and writes:
//! coefficients, geometry fractions, solutions and right-hand sides.

use crate::data::fab::{FabMut, FabRead, FabRef, fab_offset};
use crate::data::layout::FabLayout;
use crate::data::storage::{Storage, VecStorage};
use crate::grid::{BoxArray, Geometry, IndexBox, IndexType, IntVect};
use crate::linop_error::LinOpError;

/// Field data over every patch of one level.
#[derive(Clone, Debug)]
pub struct MultiFab<T = f64, S = VecStorage<T>> {
    ba: BoxArray,
    ngrow: usize,
    layout: FabLayout,
    data: S,
    _marker: std::marker::PhantomData<T>,
}

impl<T, S> MultiFab<T, S>
where
    T: Copy + Default + Send + Sync,
    S: Storage<T>,
{
    /// Allocate over `ba` (whose centering decides cell or face data), filled
    /// with `T::default()`.
    pub fn new(ba: BoxArray, ncomp: usize, ngrow: usize) -> Self {
        let layout = FabLayout::new(&ba, ngrow, ncomp);
        let data = S::with_len(layout.total_len(), T::default());
        Self {
            ba,
            ngrow,
            layout,
            data,
            _marker: std::marker::PhantomData,
        }
    }

    #[inline]
    pub fn box_array(&self) -> &BoxArray {
        &self.ba
    }

    #[inline]
    pub fn ix_type(&self) -> IndexType {
        self.ba.ix_type()
    }

    #[inline]
    pub fn ngrow(&self) -> usize {
        self.ngrow
    }

    #[inline]
    pub fn ncomp(&self) -> usize {
        self.layout.ncomp()
    }

    fn span(&self, i: usize) -> Result<(usize, usize, IndexBox), LinOpError> {
        let (offset, len) = self.layout.span(i).ok_or(LinOpError::PatchOutOfRange {
            patch: i,
            len: self.ba.len(),
        })?;
        let bx = self.layout.fab_box(i).ok_or(LinOpError::PatchOutOfRange {
            patch: i,
            len: self.ba.len(),
        })?;
        Ok((offset, len, bx))
    }

    /// Read-only view of patch `i`.
    pub fn fab(&self, i: usize) -> Result<FabRef<'_, T>, LinOpError> {
        let (offset, len, bx) = self.span(i)?;
        Ok(FabRef::new(
            bx,
            self.ncomp(),
            &self.data.as_slice()[offset..offset + len],
        ))
    }

    /// Mutable view of patch `i`.
    pub fn fab_mut(&mut self, i: usize) -> Result<FabMut<'_, T>, LinOpError> {
        let (offset, len, bx) = self.span(i)?;
        let ncomp = self.ncomp();
        Ok(FabMut::new(
            bx,
            ncomp,
            &mut self.data.as_mut_slice()[offset..offset + len],
        ))
    }

    /// Read-only views of every patch, in patch order.
    pub fn fabs(&self) -> Vec<FabRef<'_, T>> {
        let ncomp = self.ncomp();
        let buf = self.data.as_slice();
        self.layout
            .iter_spans()
            .zip(0..)
            .filter_map(|((offset, len), i)| {
                self.layout
                    .fab_box(i)
                    .map(|bx| FabRef::new(bx, ncomp, &buf[offset..offset + len]))
            })
            .collect()
    }

    /// Disjoint mutable views of every patch, in patch order.
    pub fn fabs_mut(&mut self) -> Vec<FabMut<'_, T>> {
        let ncomp = self.layout.ncomp();
        let mut rest = self.data.as_mut_slice();
        let mut out = Vec::with_capacity(self.layout.len());
        for (i, (_, len)) in self.layout.iter_spans().enumerate() {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(len);
            rest = tail;
            if let Some(bx) = self.layout.fab_box(i) {
                out.push(FabMut::new(bx, ncomp, head));
            }
        }
        out
    }

    /// Set every value, ghosts included.
    pub fn set_val(&mut self, v: T) {
        self.data.fill(v);
    }


    fn check_same_layout<S2: Storage<T>>(&self, src: &MultiFab<T, S2>) -> Result<(), LinOpError> {
        if self.ba != src.ba || self.ncomp() != src.ncomp() {
            return Err(LinOpError::LayoutMismatch(format!(
                "{} patches/{} comps ({:?}) vs {} patches/{} comps ({:?})",
                self.ba.len(),
                self.ncomp(),
                self.ix_type(),
                src.ba.len(),
                src.ncomp(),
                src.ix_type()
            )));
        }
        Ok(())
    }

    /// Copy the valid region grown by `ngrow` from a field on the same box
    /// array.
    ///
    /// # Errors
    /// `LayoutMismatch` if the box arrays or component counts differ,
    /// `InsufficientGhosts` if either side has fewer than `ngrow` ghosts.
    pub fn copy_from<S2: Storage<T>>(
        &mut self,
        src: &MultiFab<T, S2>,
        ngrow: usize,
    ) -> Result<(), LinOpError> {
        self.check_same_layout(src)?;
        let have = self.ngrow.min(src.ngrow);
        if ngrow > have {
            return Err(LinOpError::InsufficientGhosts {
                needed: ngrow,
                found: have,
            });
        }
        let srcs = src.fabs();
        let regions: Vec<IndexBox> = self.ba.iter().map(|b| b.grow(ngrow as i64)).collect();
        for (i, mut dst) in self.fabs_mut().into_iter().enumerate() {
            dst.copy_in(&srcs[i], &regions[i]);
        }
        Ok(())
    }

    /// Copy valid data from `src` wherever its valid boxes intersect the
    /// valid boxes of `self`. The two box arrays may differ.
    pub fn parallel_copy_from<S2: Storage<T>>(
        &mut self,
        src: &MultiFab<T, S2>,
    ) -> Result<(), LinOpError> {
        if self.ix_type() != src.ix_type() || self.ncomp() != src.ncomp() {
            return Err(LinOpError::LayoutMismatch(format!(
                "parallel copy between {:?}/{} and {:?}/{}",
                src.ix_type(),
                src.ncomp(),
                self.ix_type(),
                self.ncomp()
            )));
        }
        let srcs = src.fabs();
        let dst_boxes: Vec<IndexBox> = self.ba.iter().copied().collect();
        for (i, mut dst) in self.fabs_mut().into_iter().enumerate() {
            for (j, overlap) in src.ba.intersections(&dst_boxes[i]) {
                dst.copy_in(&srcs[j], &overlap);
            }
        }
        Ok(())
    }

    /// Fill ghost cells from the valid data of neighbouring patches,
    /// including periodic images. Ghost cells outside the domain with no
    /// periodic partner are left untouched.
    pub fn fill_boundary(&mut self, geom: &Geometry) -> Result<(), LinOpError> {
        if self.ngrow == 0 {
            return Ok(());
        }
        let mut shifts = vec![IntVect::ZERO];
        shifts.extend(geom.periodic_shifts());
        let ncomp = self.ncomp();

        let spans = (0..self.ba.len())
            .map(|i| self.span(i))
            .collect::<Result<Vec<_>, _>>()?;
        let buf = self.data.as_mut_slice();
        // Reads hit valid cells only, writes hit ghost cells only.
        for (i, dst_valid) in self.ba.iter().enumerate() {
            let (dst_off, _, dst_fab) = spans[i];
            for &shift in &shifts {
                for (j, overlap) in self.ba.intersections(&dst_fab.shift(-shift)) {
                    if i == j && shift == IntVect::ZERO {
                        continue;
                    }
                    let (src_off, _, src_fab) = spans[j];
                    for src_iv in overlap.cells() {
                        let iv = src_iv + shift;
                        if dst_valid.contains(iv) {
                            continue;
                        }
                        for comp in 0..ncomp {
                            buf[dst_off + fab_offset(&dst_fab, iv, comp)] =
                                buf[src_off + fab_offset(&src_fab, src_iv, comp)];
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Apply `f` to every valid value of component `comp`, in patch order.
    pub fn for_each_valid(&self, comp: usize, mut f: impl FnMut(usize, IntVect, T)) {
        for (i, fab) in self.fabs().iter().enumerate() {
            let Ok(valid) = self.ba.get(i) else { continue };
            for iv in valid.cells() {
                f(i, iv, fab.get_comp(iv, comp));
            }
        }
    }
}

impl<S: Storage<f64>> MultiFab<f64, S> {
    /// Sum of component `comp` over the valid region.
    ///
    /// Face data on patch boundaries is counted once per patch.
    pub fn sum(&self, comp: usize) -> f64 {
        let mut total = 0.0;
        self.for_each_valid(comp, |_, _, v| total += v);
        total
    }

    /// Max-norm of component `comp` over the valid region.
    pub fn norm0(&self, comp: usize) -> f64 {
        let mut m = 0.0f64;
        self.for_each_valid(comp, |_, _, v| m = m.max(v.abs()));
        m
    }

    /// Set every valid value of component 0 from a function of its index.
    pub fn set_from_fn(&mut self, mut f: impl FnMut(IntVect) -> f64) {
        let valid: Vec<IndexBox> = self.ba.iter().copied().collect();
        for (i, mut fab) in self.fabs_mut().into_iter().enumerate() {
            for iv in valid[i].cells() {
                fab.set(iv, f(iv));
            }
        }
    }

    /// `self = a·x + b·y` over the valid region (all components).
    pub fn lin_comb<S2: Storage<f64>, S3: Storage<f64>>(
        &mut self,
        a: f64,
        x: &MultiFab<f64, S2>,
        b: f64,
        y: &MultiFab<f64, S3>,
    ) -> Result<(), LinOpError> {
        self.check_same_layout(x)?;
        self.check_same_layout(y)?;
        let (xs, ys) = (x.fabs(), y.fabs());
        let ncomp = self.ncomp();
        let valid: Vec<IndexBox> = self.ba.iter().copied().collect();
        for (i, mut fab) in self.fabs_mut().into_iter().enumerate() {
            for comp in 0..ncomp {
                for iv in valid[i].cells() {
                    let v = a * xs[i].get_comp(iv, comp) + b * ys[i].get_comp(iv, comp);
                    fab.set_comp(iv, comp, v);
                }
            }
        }
        Ok(())
    }
}
