use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use eb_abeclap::prelude::*;

fn operator(n: i64, cut: bool) -> EbAbecLaplacian {
    let domain = IndexBox::cell_3d([0, 0, 0], [n - 1, n - 1, n - 1]);
    let geom = Geometry::new(domain, [0.0; 3], [1.0; 3], [false; 3]).unwrap();
    let grids = BoxArray::chopped(domain, 16).unwrap();
    let level = if cut {
        let eb = EbFactory::from_implicit(&geom, &grids, |p| {
            (0..3).map(|d| (p[d] - 0.5).powi(2)).sum::<f64>() - 0.35 * 0.35
        })
        .unwrap();
        AmrLevel::with_eb(eb)
    } else {
        AmrLevel::regular(geom, grids)
    };
    let mut op = EbAbecLaplacian::new(vec![level], &[], LpInfo::default()).unwrap();
    let fine = LevelIndex::finest(0);
    let b: Vec<MultiFab> = (0..3)
        .map(|d| {
            let faces = op.level_grids(fine).unwrap().convert(IndexType::Face(d));
            let mut mf: MultiFab = MultiFab::new(faces, 1, 0);
            mf.set_val(1.0);
            mf
        })
        .collect();
    op.set_b_coeffs(0, &b.iter().collect::<Vec<_>>()).unwrap();
    op.prepare_for_solve().unwrap();
    op
}

fn bench_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply");
    for &(n, cut) in &[(32, false), (32, true), (64, false), (64, true)] {
        let op = operator(n, cut);
        let level = LevelIndex::finest(0);
        let mut x = op.make_field(level, 1).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        x.set_from_fn(|_| rng.gen_range(-1.0..1.0));
        op.fill_ghosts(0, 0, &mut x, None).unwrap();
        let mut y = op.make_field(level, 0).unwrap();
        let label = if cut { "sphere" } else { "regular" };
        group.bench_with_input(BenchmarkId::new(label, n), &n, |bch, _| {
            bch.iter(|| op.apply(0, 0, &mut y, &x).unwrap())
        });
    }
    group.finish();
}

fn bench_smooth(c: &mut Criterion) {
    let op = operator(32, true);
    let level = LevelIndex::finest(0);
    let rhs = op.make_field(level, 0).unwrap();
    let mut x = op.make_field(level, 1).unwrap();
    c.bench_function("gsrb sweep 32^3 sphere", |bch| {
        bch.iter(|| {
            for color in 0..2 {
                op.fill_ghosts(0, 0, &mut x, None).unwrap();
                op.smooth(0, 0, &mut x, &rhs, color).unwrap();
            }
        })
    });
}

criterion_group!(benches, bench_apply, bench_smooth);
criterion_main!(benches);
