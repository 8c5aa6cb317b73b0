//! EbFactory: cut-cell metadata for one level.
//!
//! Holds, over the level's box array with one ghost layer:
//! - `flags`: [`CellFlag`] per cell,
//! - `vfrac`: fluid volume fraction per cell,
//! - `area[dir]`: open fraction of every face normal to `dir`,
//! - `fcent[dir]`: centroid of the open part of each face, one component per
//!   tangential direction (ascending), as an offset from the face center in
//!   units of the cell width, so in `[-0.5, 0.5]`.
//!
//! Ghost data outside the problem domain (and not reached by periodicity) is
//! covered with closed faces.

use crate::data::fab::{FabRead, FabRef};
use crate::data::multifab::MultiFab;
use crate::debug_invariants::DebugInvariants;
use crate::ebgeom::cell_flag::CellFlag;
use crate::grid::{BoxArray, Geometry, IndexBox, IndexType, IntVect, MAX_SPACEDIM};
use crate::linop_error::LinOpError;

/// Ghost layers carried by every geometry field.
pub const EB_NGROW: usize = 1;

/// Fractions within this distance of 0 or 1 are snapped.
const SNAP_TOL: f64 = 1.0e-14;

/// Slices used to integrate the volume fraction of a 3D cut cell.
const VOLUME_SLICES: usize = 16;

/// Cut-cell metadata of one level.
#[derive(Clone, Debug)]
pub struct EbFactory {
    geom: Geometry,
    ba: BoxArray,
    flags: MultiFab<CellFlag>,
    vfrac: MultiFab,
    area: Vec<MultiFab>,
    fcent: Vec<MultiFab>,
}

/// Geometry views of one patch, as consumed by the cut-cell kernels.
#[derive(Clone, Debug)]
pub struct EbPatch<'a> {
    pub flags: FabRef<'a, CellFlag>,
    pub vfrac: FabRef<'a>,
    pub area: Vec<FabRef<'a>>,
    pub fcent: Vec<FabRef<'a>>,
}

/// Directions tangential to `dir`, ascending.
pub fn tangential_dirs(dir: usize, dim: usize) -> impl Iterator<Item = usize> {
    (0..dim).filter(move |&t| t != dir)
}

#[inline]
fn snap(v: f64) -> f64 {
    if v < SNAP_TOL {
        0.0
    } else if v > 1.0 - SNAP_TOL {
        1.0
    } else {
        v
    }
}

/// Fluid fraction and centroid offset of a segment whose end values are
/// `phi0` and `phi1`, with `phi` interpolated linearly in between.
fn segment_fraction(phi0: f64, phi1: f64) -> (f64, f64) {
    match (phi0 < 0.0, phi1 < 0.0) {
        (true, true) => (1.0, 0.0),
        (false, false) => (0.0, 0.0),
        (in0, _) => {
            let t = phi0 / (phi0 - phi1);
            if in0 {
                (t, 0.5 * t - 0.5)
            } else {
                (1.0 - t, 0.5 * (1.0 + t) - 0.5)
            }
        }
    }
}

/// Fluid area and centroid of the unit square with corner values `phi`
/// (counter-clockwise from the origin), clipped at the linear zero crossing
/// along each edge.
fn clip_unit_square(phi: [f64; 4]) -> (f64, [f64; 2]) {
    const CORNERS: [[f64; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
    if phi.iter().all(|&p| p < 0.0) {
        return (1.0, [0.5, 0.5]);
    }
    if phi.iter().all(|&p| p >= 0.0) {
        return (0.0, [0.5, 0.5]);
    }
    let mut poly: Vec<[f64; 2]> = Vec::with_capacity(8);
    for a in 0..4 {
        let b = (a + 1) % 4;
        let (pa, pb) = (phi[a], phi[b]);
        if pa < 0.0 {
            poly.push(CORNERS[a]);
        }
        if (pa < 0.0) != (pb < 0.0) {
            let t = pa / (pa - pb);
            poly.push([
                CORNERS[a][0] + t * (CORNERS[b][0] - CORNERS[a][0]),
                CORNERS[a][1] + t * (CORNERS[b][1] - CORNERS[a][1]),
            ]);
        }
    }
    if poly.len() < 3 {
        return (0.0, [0.5, 0.5]);
    }
    let (mut area2, mut cx, mut cy) = (0.0, 0.0, 0.0);
    for k in 0..poly.len() {
        let p = poly[k];
        let q = poly[(k + 1) % poly.len()];
        let cross = p[0] * q[1] - q[0] * p[1];
        area2 += cross;
        cx += (p[0] + q[0]) * cross;
        cy += (p[1] + q[1]) * cross;
    }
    if area2 <= 0.0 {
        return (0.0, [0.5, 0.5]);
    }
    ((0.5 * area2).min(1.0), [cx / (3.0 * area2), cy / (3.0 * area2)])
}

impl EbFactory {
    fn allocate(geom: &Geometry, ba: &BoxArray) -> Result<Self, LinOpError> {
        let dim = geom.dim();
        if ba.dim() != dim {
            return Err(LinOpError::InvalidHierarchy(format!(
                "box array dimension {} does not match geometry dimension {dim}",
                ba.dim()
            )));
        }
        let domain = geom.domain();
        if let Some(bx) = ba.iter().find(|b| !domain.contains_box(b)) {
            return Err(LinOpError::InvalidHierarchy(format!(
                "box {bx} lies outside the domain {domain}"
            )));
        }
        let faces = |d: usize| ba.convert(IndexType::Face(d));
        Ok(Self {
            geom: geom.clone(),
            ba: ba.clone(),
            flags: MultiFab::new(ba.clone(), 1, EB_NGROW),
            vfrac: MultiFab::new(ba.clone(), 1, EB_NGROW),
            area: (0..dim).map(|d| MultiFab::new(faces(d), 1, EB_NGROW)).collect(),
            fcent: (0..dim)
                .map(|d| MultiFab::new(faces(d), dim - 1, EB_NGROW))
                .collect(),
        })
    }

    /// Geometry with no embedded boundary: every cell regular.
    pub fn all_regular(geom: &Geometry, ba: &BoxArray) -> Result<Self, LinOpError> {
        Self::from_implicit(geom, ba, |_| -1.0)
    }

    /// Build from an implicit function of physical position; `f(x) < 0` is
    /// fluid.
    ///
    /// `f` is sampled at cell nodes and assumed linear along every cell edge:
    /// face fractions and centroids come from clipping each face at the
    /// interpolated zero crossing, volume fractions from clipping the cell
    /// (sliced along the third direction in 3D). A face next to a covered cell
    /// is closed.
    pub fn from_implicit<F>(geom: &Geometry, ba: &BoxArray, f: F) -> Result<Self, LinOpError>
    where
        F: Fn([f64; MAX_SPACEDIM]) -> f64,
    {
        let mut fac = Self::allocate(geom, ba)?;
        let dim = geom.dim();
        let e = |d: usize| IntVect::unit(d);
        let node_phi = |iv: IntVect| f(geom.node_position(iv));
        let square_phi = |iv: IntVect, t1: usize, t2: usize| {
            [
                node_phi(iv),
                node_phi(iv + e(t1)),
                node_phi(iv + e(t1) + e(t2)),
                node_phi(iv + e(t2)),
            ]
        };
        let cell_vfrac = |iv: IntVect| -> f64 {
            if dim == 2 {
                return snap(clip_unit_square(square_phi(iv, 0, 1)).0);
            }
            let lo = square_phi(iv, 0, 1);
            let hi = square_phi(iv + e(2), 0, 1);
            if lo.iter().chain(&hi).all(|&p| p < 0.0) {
                return 1.0;
            }
            if lo.iter().chain(&hi).all(|&p| p >= 0.0) {
                return 0.0;
            }
            let total: f64 = (0..VOLUME_SLICES)
                .map(|s| {
                    let z = (s as f64 + 0.5) / VOLUME_SLICES as f64;
                    let phi: [f64; 4] = std::array::from_fn(|c| (1.0 - z) * lo[c] + z * hi[c]);
                    clip_unit_square(phi).0
                })
                .sum();
            snap(total / VOLUME_SLICES as f64)
        };

        let valid: Vec<IndexBox> = ba.iter().copied().collect();
        for (i, mut vf) in fac.vfrac.fabs_mut().into_iter().enumerate() {
            for iv in valid[i].cells() {
                vf.set(iv, cell_vfrac(iv));
            }
        }

        for d in 0..dim {
            let tang: Vec<usize> = tangential_dirs(d, dim).collect();
            let face_boxes: Vec<IndexBox> = valid.iter().map(|b| b.surrounding_faces(d)).collect();
            let mut cents = fac.fcent[d].fabs_mut();
            for (i, mut ar) in fac.area[d].fabs_mut().into_iter().enumerate() {
                for iv in face_boxes[i].cells() {
                    if cell_vfrac(iv) == 0.0 || cell_vfrac(iv - e(d)) == 0.0 {
                        ar.set(iv, 0.0);
                        continue;
                    }
                    let (a, c) = if dim == 2 {
                        let (a, c) = segment_fraction(node_phi(iv), node_phi(iv + e(tang[0])));
                        (snap(a), [c, 0.0])
                    } else {
                        let (a, c) = clip_unit_square(square_phi(iv, tang[0], tang[1]));
                        (snap(a), [c[0] - 0.5, c[1] - 0.5])
                    };
                    ar.set(iv, a);
                    for (comp, &offset) in c.iter().take(dim - 1).enumerate() {
                        let offset = if a > 0.0 && a < 1.0 { offset } else { 0.0 };
                        cents[i].set_comp(iv, comp, offset);
                    }
                }
            }
        }

        fac.classify_cells();
        fac.fill_ghosts()?;
        log::debug!(
            "EbFactory::from_implicit: {} patches, {} cut cells",
            ba.len(),
            fac.num_cut_cells()
        );
        crate::debug_invariants!(fac.validate_invariants(), "EbFactory::from_implicit");
        Ok(fac)
    }

    /// Build from explicit volume fractions, face area fractions and face
    /// centroids (each on the matching layout of `ba`; ghosts are ignored).
    /// Cell flags are derived from the fractions.
    ///
    /// # Errors
    /// `LayoutMismatch` for fields on the wrong layout, `GeometryInvariant`
    /// if a covered cell has an open face.
    pub fn from_parts(
        geom: &Geometry,
        ba: &BoxArray,
        vfrac: &MultiFab,
        area: &[&MultiFab],
        fcent: &[&MultiFab],
    ) -> Result<Self, LinOpError> {
        let mut fac = Self::allocate(geom, ba)?;
        let dim = geom.dim();
        if area.len() != dim || fcent.len() != dim {
            return Err(LinOpError::LayoutMismatch(format!(
                "expected {dim} area and centroid fields, got {} and {}",
                area.len(),
                fcent.len()
            )));
        }
        fac.vfrac.copy_from(vfrac, 0)?;
        for d in 0..dim {
            fac.area[d].copy_from(area[d], 0)?;
            fac.fcent[d].copy_from(fcent[d], 0)?;
        }
        fac.classify_cells();
        fac.fill_ghosts()?;
        fac.validate_invariants()?;
        Ok(fac)
    }

    /// Geometry of the next coarser multigrid rung.
    ///
    /// Volume fractions are averaged over the `ratio^dim` fine cells, area
    /// fractions over the `ratio^(dim-1)` colocated fine faces, and centroids
    /// are the area-weighted mean of the fine centroids expressed in coarse
    /// face coordinates.
    pub fn coarsened(
        &self,
        ratio: i64,
        crse_geom: &Geometry,
        crse_ba: &BoxArray,
    ) -> Result<Self, LinOpError> {
        if *crse_ba != self.ba.coarsen(ratio) {
            return Err(LinOpError::LayoutMismatch(format!(
                "coarse geometry grids are not the fine grids coarsened by {ratio}"
            )));
        }
        let mut out = Self::allocate(crse_geom, crse_ba)?;
        let dim = self.geom.dim();
        let r = ratio;
        let nsub_cells = r.pow(dim as u32) as f64;
        let nsub_faces = r.pow(dim as u32 - 1) as f64;
        let crse_valid: Vec<IndexBox> = crse_ba.iter().copied().collect();

        let fine_v = self.vfrac.fabs();
        for (i, mut cv) in out.vfrac.fabs_mut().into_iter().enumerate() {
            for ic in crse_valid[i].cells() {
                let lo = ic.scale(r);
                let fine = IndexBox::new(dim, lo, lo + IntVect::splat(r - 1, dim));
                let sum: f64 = fine.cells().map(|f| fine_v[i].get(f)).sum();
                cv.set(ic, snap(sum / nsub_cells));
            }
        }

        for d in 0..dim {
            let tang: Vec<usize> = tangential_dirs(d, dim).collect();
            let fine_a = self.area[d].fabs();
            let fine_c = self.fcent[d].fabs();
            let mut cents = out.fcent[d].fabs_mut();
            for (i, mut ar) in out.area[d].fabs_mut().into_iter().enumerate() {
                for ic in crse_valid[i].surrounding_faces(d).cells() {
                    let base = ic.scale(r);
                    let mut hi = base;
                    for &t in &tang {
                        hi[t] += r - 1;
                    }
                    let mut sum_a = 0.0;
                    let mut sum_ac = [0.0; 2];
                    for f in IndexBox::new(dim, base, hi).cells() {
                        let a = fine_a[i].get(f);
                        sum_a += a;
                        for (comp, &t) in tang.iter().enumerate() {
                            let shift = (f[t] - base[t]) as f64 + 0.5 - 0.5 * r as f64;
                            sum_ac[comp] += a * (fine_c[i].get_comp(f, comp) + shift);
                        }
                    }
                    let a = snap(sum_a / nsub_faces);
                    ar.set(ic, a);
                    for comp in 0..tang.len() {
                        let c = if a > 0.0 && a < 1.0 {
                            sum_ac[comp] / (r as f64 * sum_a)
                        } else {
                            0.0
                        };
                        cents[i].set_comp(ic, comp, c);
                    }
                }
            }
        }

        out.classify_cells();
        out.fill_ghosts()?;
        log::trace!(
            "EbFactory::coarsened by {ratio}: {} cut cells on the coarse rung",
            out.num_cut_cells()
        );
        crate::debug_invariants!(out.validate_invariants(), "EbFactory::coarsened");
        Ok(out)
    }

    /// Derive flags on valid cells from volume and incident area fractions.
    fn classify_cells(&mut self) {
        let dim = self.geom.dim();
        let valid: Vec<IndexBox> = self.ba.iter().copied().collect();
        let vf = self.vfrac.fabs();
        let areas: Vec<Vec<FabRef<'_>>> = self.area.iter().map(|a| a.fabs()).collect();
        for (i, mut fl) in self.flags.fabs_mut().into_iter().enumerate() {
            for iv in valid[i].cells() {
                let v = vf[i].get(iv);
                let flag = if v <= 0.0 {
                    CellFlag::Covered
                } else {
                    let all_open = (0..dim).all(|d| {
                        areas[d][i].get(iv) == 1.0 && areas[d][i].get(iv + IntVect::unit(d)) == 1.0
                    });
                    if v >= 1.0 && all_open {
                        CellFlag::Regular
                    } else {
                        CellFlag::SingleValued
                    }
                };
                fl.set(iv, flag);
            }
        }
    }

    fn fill_ghosts(&mut self) -> Result<(), LinOpError> {
        self.flags.fill_boundary(&self.geom)?;
        self.vfrac.fill_boundary(&self.geom)?;
        for d in 0..self.geom.dim() {
            self.area[d].fill_boundary(&self.geom)?;
            self.fcent[d].fill_boundary(&self.geom)?;
        }
        Ok(())
    }

    #[inline]
    pub fn geom(&self) -> &Geometry {
        &self.geom
    }

    #[inline]
    pub fn box_array(&self) -> &BoxArray {
        &self.ba
    }

    #[inline]
    pub fn flags(&self) -> &MultiFab<CellFlag> {
        &self.flags
    }

    #[inline]
    pub fn vfrac(&self) -> &MultiFab {
        &self.vfrac
    }

    pub fn area(&self, dir: usize) -> Result<&MultiFab, LinOpError> {
        self.area.get(dir).ok_or(LinOpError::DirectionOutOfRange {
            dir,
            dim: self.geom.dim(),
        })
    }

    pub fn fcent(&self, dir: usize) -> Result<&MultiFab, LinOpError> {
        self.fcent.get(dir).ok_or(LinOpError::DirectionOutOfRange {
            dir,
            dim: self.geom.dim(),
        })
    }

    /// Views of patch `i`.
    pub fn patch(&self, i: usize) -> Result<EbPatch<'_>, LinOpError> {
        Ok(EbPatch {
            flags: self.flags.fab(i)?,
            vfrac: self.vfrac.fab(i)?,
            area: self
                .area
                .iter()
                .map(|a| a.fab(i))
                .collect::<Result<_, _>>()?,
            fcent: self
                .fcent
                .iter()
                .map(|c| c.fab(i))
                .collect::<Result<_, _>>()?,
        })
    }

    /// Number of valid cut cells.
    pub fn num_cut_cells(&self) -> usize {
        let mut n = 0;
        self.flags.for_each_valid(0, |_, _, f| {
            if f.is_single_valued() {
                n += 1;
            }
        });
        n
    }

    /// Smallest volume fraction among valid cut cells.
    pub fn min_cut_vfrac(&self) -> Option<f64> {
        let flags = self.flags.fabs();
        let mut out: Option<f64> = None;
        self.vfrac.for_each_valid(0, |i, iv, v| {
            if flags[i].get(iv).is_single_valued() {
                out = Some(out.map_or(v, |m| m.min(v)));
            }
        });
        out
    }
}

impl DebugInvariants for EbFactory {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "EbFactory");
    }

    fn validate_invariants(&self) -> Result<(), LinOpError> {
        let dim = self.geom.dim();
        let flags = self.flags.fabs();
        let vf = self.vfrac.fabs();
        let areas: Vec<Vec<FabRef<'_>>> = self.area.iter().map(|a| a.fabs()).collect();
        let cents: Vec<Vec<FabRef<'_>>> = self.fcent.iter().map(|c| c.fabs()).collect();
        let fail = |i: usize, iv: IntVect, reason: String| LinOpError::GeometryInvariant {
            location: format!("patch {i} index {iv}"),
            reason,
        };
        for (i, valid) in self.ba.iter().enumerate() {
            for iv in valid.cells() {
                let v = vf[i].get(iv);
                let incident: Vec<f64> = (0..dim)
                    .flat_map(|d| [areas[d][i].get(iv), areas[d][i].get(iv + IntVect::unit(d))])
                    .collect();
                match flags[i].get(iv) {
                    CellFlag::Covered => {
                        if v != 0.0 || incident.iter().any(|&a| a != 0.0) {
                            return Err(fail(
                                i,
                                iv,
                                format!("covered cell with vfrac {v} or an open face"),
                            ));
                        }
                    }
                    CellFlag::Regular => {
                        if v != 1.0 || incident.iter().any(|&a| a != 1.0) {
                            return Err(fail(
                                i,
                                iv,
                                format!("regular cell with vfrac {v} or a partial face"),
                            ));
                        }
                    }
                    CellFlag::SingleValued => {
                        if !(v > 0.0 && v <= 1.0) {
                            return Err(fail(i, iv, format!("cut cell with vfrac {v}")));
                        }
                    }
                }
            }
            for d in 0..dim {
                for iv in valid.surrounding_faces(d).cells() {
                    let a = areas[d][i].get(iv);
                    if !(0.0..=1.0).contains(&a) {
                        return Err(fail(i, iv, format!("area fraction {a} along {d}")));
                    }
                    for comp in 0..dim - 1 {
                        let c = cents[d][i].get_comp(iv, comp);
                        if c.abs() > 0.5 + 1.0e-12 {
                            return Err(fail(i, iv, format!("face centroid {c} along {d}")));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
