//! Cut-cell kernels.
//!
//! The gradient through a partially open face is evaluated at the face
//! centroid: the normal difference on the face itself is blended with the one
//! on the neighbouring parallel face(s) on the centroid side, linearly in 2D
//! and bilinearly in 3D. A neighbour face that is closed drops out of the
//! blend. Each face term is scaled by its area fraction and the divergence by
//! the (floored) volume fraction. The embedded boundary carries no flux.

use super::{StencilCoeffs, has_color};
use crate::data::fab::{FabMut, FabRead};
use crate::ebgeom::EbPatch;
use crate::grid::{IndexBox, IntVect};

/// Up to four `(weight, face)` pairs; entry 0 is the face itself.
type FaceStencil = [(f64, IntVect); 4];

#[inline]
fn toward(fc: f64) -> i64 {
    if fc < 0.0 { -1 } else { 1 }
}

/// Interpolation weights for the gradient at the centroid of face `f`.
fn face_stencil(f: IntVect, dir: usize, dim: usize, eb: &EbPatch<'_>) -> FaceStencil {
    let area = &eb.area[dir];
    let cent = &eb.fcent[dir];
    let open = |j: IntVect| area.get(j) > 0.0;
    let mut out = [(0.0, f); 4];
    if dim == 2 {
        let t = 1 - dir;
        let fc = cent.get_comp(f, 0);
        let j = f + IntVect::unit(t) * toward(fc);
        let frac = if fc != 0.0 && open(j) { fc.abs() } else { 0.0 };
        out[0] = (1.0 - frac, f);
        out[1] = (frac, j);
        return out;
    }
    let (t1, t2) = match dir {
        0 => (1, 2),
        1 => (0, 2),
        _ => (0, 1),
    };
    let (fc1, fc2) = (cent.get_comp(f, 0), cent.get_comp(f, 1));
    let s1 = IntVect::unit(t1) * toward(fc1);
    let s2 = IntVect::unit(t2) * toward(fc2);
    let mut f1 = if fc1 != 0.0 && open(f + s1) { fc1.abs() } else { 0.0 };
    let mut f2 = if fc2 != 0.0 && open(f + s2) { fc2.abs() } else { 0.0 };
    if f1 > 0.0 && f2 > 0.0 && !open(f + s1 + s2) {
        if f1 < f2 {
            f1 = 0.0;
        } else {
            f2 = 0.0;
        }
    }
    out[0] = ((1.0 - f1) * (1.0 - f2), f);
    out[1] = (f1 * (1.0 - f2), f + s1);
    out[2] = ((1.0 - f1) * f2, f + s2);
    out[3] = (f1 * f2, f + s1 + s2);
    out
}

/// Area-weighted normal difference `apx·b·(x(f) − x(f − e))` at the centroid
/// of face `f`, and the weight it puts on the cells adjacent to `f`.
#[inline]
fn face_term<X: FabRead>(
    f: IntVect,
    dir: usize,
    x: &X,
    c: &StencilCoeffs<'_>,
    eb: &EbPatch<'_>,
) -> (f64, f64) {
    let apx = eb.area[dir].get(f);
    if apx == 0.0 {
        return (0.0, 0.0);
    }
    let e = IntVect::unit(dir);
    let b = &c.b[dir];
    let stencil = face_stencil(f, dir, c.dim, eb);
    let mut t = 0.0;
    for &(w, j) in &stencil {
        // skipped entries may sit on covered cells holding garbage
        if w > 0.0 {
            t += w * b.get(j) * (x.get(j) - x.get(j - e));
        }
    }
    (apx * t, apx * stencil[0].0 * b.get(f))
}

#[inline]
fn kappa(iv: IntVect, c: &StencilCoeffs<'_>, eb: &EbPatch<'_>) -> f64 {
    eb.vfrac.get(iv).max(c.min_vfrac)
}

#[inline]
fn cell_adotx<X: FabRead>(iv: IntVect, x: &X, c: &StencilCoeffs<'_>, eb: &EbPatch<'_>) -> f64 {
    if eb.flags.get(iv).is_covered() {
        return 0.0;
    }
    let mut div = 0.0;
    for d in 0..c.dim {
        let hi = face_term(iv + IntVect::unit(d), d, x, c, eb).0;
        let lo = face_term(iv, d, x, c, eb).0;
        div += c.dxinv[d] * c.dxinv[d] * (hi - lo);
    }
    c.alpha * c.a_at(iv) * x.get(iv) - c.beta * div / kappa(iv, c, eb)
}

/// Diagonal entry of the cut-cell stencil at `iv`; zero on covered cells.
pub fn diagonal(iv: IntVect, c: &StencilCoeffs<'_>, eb: &EbPatch<'_>) -> f64 {
    if eb.flags.get(iv).is_covered() {
        return 0.0;
    }
    let mut s = 0.0;
    for d in 0..c.dim {
        let wlo = self_weight(iv, d, c, eb) * c.boundary_weight(iv, d, false);
        let whi = self_weight(iv + IntVect::unit(d), d, c, eb) * c.boundary_weight(iv, d, true);
        s += c.dxinv[d] * c.dxinv[d] * (wlo + whi);
    }
    c.alpha * c.a_at(iv) + c.beta * s / kappa(iv, c, eb)
}

#[inline]
fn self_weight(f: IntVect, dir: usize, c: &StencilCoeffs<'_>, eb: &EbPatch<'_>) -> f64 {
    let apx = eb.area[dir].get(f);
    if apx == 0.0 {
        return 0.0;
    }
    apx * face_stencil(f, dir, c.dim, eb)[0].0 * c.b[dir].get(f)
}

/// `y = A·a·x − (B/κ)·∇·(b∇x)` over `tile`; covered cells get 0.
pub fn adotx<X: FabRead>(
    tile: &IndexBox,
    y: &mut FabMut<'_>,
    x: &X,
    c: &StencilCoeffs<'_>,
    eb: &EbPatch<'_>,
) {
    for iv in tile.cells() {
        y.set(iv, cell_adotx(iv, x, c, eb));
    }
}

/// One Gauss-Seidel pass over the cells of `tile` with color `color`.
/// Covered cells are zeroed.
pub fn gsrb<R: FabRead>(
    tile: &IndexBox,
    x: &mut FabMut<'_>,
    rhs: &R,
    c: &StencilCoeffs<'_>,
    eb: &EbPatch<'_>,
    color: usize,
) {
    for iv in tile.cells().filter(|&iv| has_color(iv, color)) {
        if eb.flags.get(iv).is_covered() {
            x.set(iv, 0.0);
            continue;
        }
        let diag = diagonal(iv, c, eb);
        if diag == 0.0 {
            continue;
        }
        let res = rhs.get(iv) - cell_adotx(iv, &*x, c, eb);
        x.set(iv, x.get(iv) + res / diag);
    }
}

/// Face fluxes `−B·apx·b·∂x/∂n`, evaluated at the face centroids in
/// `faces` (normal to `dir`).
pub fn face_flux<X: FabRead>(
    faces: &IndexBox,
    dir: usize,
    flux: &mut FabMut<'_>,
    x: &X,
    c: &StencilCoeffs<'_>,
    eb: &EbPatch<'_>,
) {
    for f in faces.cells() {
        let t = face_term(f, dir, x, c, eb).0;
        flux.set(f, -c.beta * c.dxinv[dir] * t);
    }
}
