#![allow(dead_code)]
use eb_abeclap::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub fn square_2d(n: i64) -> IndexBox {
    IndexBox::cell_2d([0, 0], [n - 1, n - 1])
}

pub fn cube_3d(n: i64) -> IndexBox {
    IndexBox::cell_3d([0, 0, 0], [n - 1, n - 1, n - 1])
}

/// Geometry of `[0,1]^dim` over `domain`.
pub fn unit_box_geom(domain: IndexBox) -> Geometry {
    Geometry::new(domain, [0.0; 3], [1.0; 3], [false; 3]).unwrap()
}

/// Single regular AMR level chopped into `max_size` patches.
pub fn regular_op(domain: IndexBox, max_size: i64, info: LpInfo) -> EbAbecLaplacian {
    let lev = AmrLevel::regular(
        unit_box_geom(domain),
        BoxArray::chopped(domain, max_size).unwrap(),
    );
    EbAbecLaplacian::new(vec![lev], &[], info).unwrap()
}

/// Single AMR level with cut cells from the implicit function `f`.
pub fn eb_op(
    domain: IndexBox,
    max_size: i64,
    info: LpInfo,
    f: impl Fn([f64; 3]) -> f64,
) -> EbAbecLaplacian {
    let geom = unit_box_geom(domain);
    let ba = BoxArray::chopped(domain, max_size).unwrap();
    let eb = EbFactory::from_implicit(&geom, &ba, f).unwrap();
    EbAbecLaplacian::new(vec![AmrLevel::with_eb(eb)], &[], info).unwrap()
}

/// Face field for every direction of `level`, valued by `f(dir, face)`.
pub fn face_fields(
    op: &EbAbecLaplacian,
    level: LevelIndex,
    mut f: impl FnMut(usize, IntVect) -> f64,
) -> Vec<MultiFab> {
    let grids = op.level_grids(level).unwrap();
    (0..grids.dim())
        .map(|d| {
            let mut b: MultiFab = MultiFab::new(grids.convert(IndexType::Face(d)), 1, 0);
            b.set_from_fn(|iv| f(d, iv));
            b
        })
        .collect()
}

pub fn set_b(op: &mut EbAbecLaplacian, amrlev: usize, b: &[MultiFab]) {
    let refs: Vec<&MultiFab> = b.iter().collect();
    op.set_b_coeffs(amrlev, &refs).unwrap();
}

pub fn set_uniform_a(op: &mut EbAbecLaplacian, amrlev: usize, v: f64) {
    let mut a = op.make_field(LevelIndex::finest(amrlev), 0).unwrap();
    a.set_val(v);
    op.set_a_coeffs(amrlev, &a).unwrap();
}

/// Random valid values in `[lo, hi)`.
pub fn random_fill(mf: &mut MultiFab, seed: u64, lo: f64, hi: f64) {
    let mut rng = SmallRng::seed_from_u64(seed);
    mf.set_from_fn(|_| rng.gen_range(lo..hi));
}

/// Set every value (ghosts included) from a function of the cell index.
pub fn fill_everywhere(mf: &mut MultiFab, f: impl Fn(IntVect) -> f64) {
    for mut fab in mf.fabs_mut() {
        for iv in fab.fab_box().cells() {
            fab.set(iv, f(iv));
        }
    }
}

pub fn cut_cells(op: &EbAbecLaplacian, level: LevelIndex) -> &EbFactory {
    op.level_rung(level).unwrap().factory.cut_cells().unwrap()
}
