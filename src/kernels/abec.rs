//! Regular-cell kernels: the standard five/seven-point stencil.

use super::{StencilCoeffs, has_color};
use crate::data::fab::{FabMut, FabRead};
use crate::grid::{IndexBox, IntVect};

#[inline]
fn cell_adotx<X: FabRead>(iv: IntVect, x: &X, c: &StencilCoeffs<'_>) -> f64 {
    let xc = x.get(iv);
    let mut lap = 0.0;
    for d in 0..c.dim {
        let e = IntVect::unit(d);
        let b = &c.b[d];
        let hi = b.get(iv + e) * (x.get(iv + e) - xc);
        let lo = b.get(iv) * (xc - x.get(iv - e));
        lap += c.dxinv[d] * c.dxinv[d] * (hi - lo);
    }
    c.alpha * c.a_at(iv) * xc - c.beta * lap
}

/// Diagonal entry of the stencil at `iv`, boundary faces included.
#[inline]
pub fn diagonal(iv: IntVect, c: &StencilCoeffs<'_>) -> f64 {
    let mut diag = c.alpha * c.a_at(iv);
    for d in 0..c.dim {
        let b = &c.b[d];
        let w = b.get(iv) * c.boundary_weight(iv, d, false)
            + b.get(iv + IntVect::unit(d)) * c.boundary_weight(iv, d, true);
        diag += c.beta * c.dxinv[d] * c.dxinv[d] * w;
    }
    diag
}

/// `y = A·a·x − B·∇·(b∇x)` over `tile`.
pub fn adotx<X: FabRead>(tile: &IndexBox, y: &mut FabMut<'_>, x: &X, c: &StencilCoeffs<'_>) {
    for iv in tile.cells() {
        y.set(iv, cell_adotx(iv, x, c));
    }
}

/// One Gauss-Seidel pass over the cells of `tile` with color `color`.
pub fn gsrb<R: FabRead>(
    tile: &IndexBox,
    x: &mut FabMut<'_>,
    rhs: &R,
    c: &StencilCoeffs<'_>,
    color: usize,
) {
    for iv in tile.cells().filter(|&iv| has_color(iv, color)) {
        let diag = diagonal(iv, c);
        if diag == 0.0 {
            continue;
        }
        let res = rhs.get(iv) - cell_adotx(iv, &*x, c);
        x.set(iv, x.get(iv) + res / diag);
    }
}

/// Face fluxes `−B·b·∂x/∂n` on the faces in `faces` (normal to `dir`).
pub fn face_flux<X: FabRead>(
    faces: &IndexBox,
    dir: usize,
    flux: &mut FabMut<'_>,
    x: &X,
    c: &StencilCoeffs<'_>,
) {
    let e = IntVect::unit(dir);
    let b = &c.b[dir];
    for f in faces.cells() {
        flux.set(f, -c.beta * c.dxinv[dir] * b.get(f) * (x.get(f) - x.get(f - e)));
    }
}
