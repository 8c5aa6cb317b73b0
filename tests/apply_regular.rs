mod util;

use eb_abeclap::prelude::*;
use util::*;

#[test]
fn constant_input_on_4x4_gives_zero() {
    let mut op = regular_op(square_2d(4), 4, LpInfo::default());
    op.set_scalars(0.0, 1.0).unwrap();
    let b = face_fields(&op, LevelIndex::finest(0), |_, _| 1.0);
    set_b(&mut op, 0, &b);
    op.prepare_for_solve().unwrap();

    let level = LevelIndex::finest(0);
    let mut x = op.make_field(level, 1).unwrap();
    x.set_val(-100.0);
    x.set_from_fn(|_| 5.0);
    op.fill_ghosts(0, 0, &mut x, None).unwrap();
    let mut y = op.make_field(level, 0).unwrap();
    y.set_val(1.0);
    op.apply(0, 0, &mut y, &x).unwrap();
    assert_eq!(y.norm0(0), 0.0);
}

#[test]
fn quadratic_matches_exact_laplacian_2d() {
    let n = 16;
    let mut op = regular_op(square_2d(n), 8, LpInfo::default());
    op.set_scalars(0.25, 3.0).unwrap();
    set_uniform_a(&mut op, 0, 2.0);
    let b = face_fields(&op, LevelIndex::finest(0), |_, _| 1.0);
    set_b(&mut op, 0, &b);

    let h = 1.0 / n as f64;
    let phi = |iv: IntVect| {
        let x = (iv[0] as f64 + 0.5) * h;
        let y = (iv[1] as f64 + 0.5) * h;
        x * x - 2.0 * x * y + 4.0 * y * y
    };
    let level = LevelIndex::finest(0);
    let mut x = op.make_field(level, 1).unwrap();
    fill_everywhere(&mut x, phi);
    let mut out = op.make_field(level, 0).unwrap();
    op.apply(0, 0, &mut out, &x).unwrap();

    // ∇²φ = 2 + 8
    out.for_each_valid(0, |_, iv, v| {
        let expect = 0.25 * 2.0 * phi(iv) - 3.0 * 10.0;
        assert!((v - expect).abs() < 1e-9, "{iv}: {v} vs {expect}");
    });
}

#[test]
fn quadratic_matches_exact_laplacian_3d() {
    let n = 8;
    let mut op = regular_op(cube_3d(n), 4, LpInfo::default());
    op.set_scalars(0.0, 1.0).unwrap();
    let b = face_fields(&op, LevelIndex::finest(0), |_, _| 1.0);
    set_b(&mut op, 0, &b);

    let h = 1.0 / n as f64;
    let phi = |iv: IntVect| {
        (0..3)
            .map(|d| ((iv[d] as f64 + 0.5) * h).powi(2))
            .sum::<f64>()
    };
    let level = LevelIndex::finest(0);
    let mut x = op.make_field(level, 1).unwrap();
    fill_everywhere(&mut x, phi);
    let mut out = op.make_field(level, 0).unwrap();
    op.apply(0, 0, &mut out, &x).unwrap();
    out.for_each_valid(0, |_, iv, v| assert!((v + 6.0).abs() < 1e-8, "{iv}: {v}"));
}

#[test]
fn patch_decomposition_does_not_change_the_result() {
    let dom = square_2d(16);
    let mut results = Vec::new();
    for max_size in [16, 8, 4] {
        let info = LpInfo::default().with_tile_size([4, 4, 4]);
        let mut op = regular_op(dom, max_size, info);
        op.set_scalars(1.5, 0.5).unwrap();
        let level = LevelIndex::finest(0);
        let mut a = op.make_field(level, 0).unwrap();
        a.set_from_fn(|iv| 1.0 + 0.01 * (iv[0] * iv[1]) as f64);
        op.set_a_coeffs(0, &a).unwrap();
        let b = face_fields(&op, level, |d, iv| 1.0 + 0.1 * d as f64 + 0.02 * iv[0] as f64);
        set_b(&mut op, 0, &b);
        op.set_domain_bc(
            &[BcType::Dirichlet, BcType::Neumann],
            &[BcType::Neumann, BcType::Dirichlet],
        )
        .unwrap();

        let mut x = op.make_field(level, 1).unwrap();
        x.set_from_fn(|iv| ((iv[0] * 7 + iv[1] * 3) % 11) as f64);
        op.fill_ghosts(0, 0, &mut x, Some(0.5)).unwrap();
        let mut out = op.make_field(level, 0).unwrap();
        op.apply(0, 0, &mut out, &x).unwrap();

        let mut values = Vec::new();
        out.for_each_valid(0, |_, iv, v| values.push((iv, v)));
        values.sort_by_key(|(iv, _)| (iv[1], iv[0]));
        results.push(values);
    }
    for other in &results[1..] {
        for ((iv, a), (_, b)) in results[0].iter().zip(other) {
            assert!((a - b).abs() < 1e-12, "{iv}: {a} vs {b}");
        }
    }
}

#[test]
fn periodic_constant_is_in_the_null_space() {
    let dom = square_2d(8);
    let geom = unit_box_geom(dom).with_periodicity([true, true, false]);
    let lev = AmrLevel::regular(geom, BoxArray::chopped(dom, 4).unwrap());
    let mut op = EbAbecLaplacian::new(vec![lev], &[], LpInfo::default()).unwrap();
    assert_eq!(op.domain_bc().0, &[BcType::Periodic, BcType::Periodic]);
    let b = face_fields(&op, LevelIndex::finest(0), |d, _| 1.0 + 0.5 * d as f64);
    set_b(&mut op, 0, &b);
    op.prepare_for_solve().unwrap();
    assert!(op.is_singular(0).unwrap());

    let level = LevelIndex::finest(0);
    let mut x = op.make_field(level, 1).unwrap();
    x.set_val(3.0);
    op.fill_ghosts(0, 0, &mut x, None).unwrap();
    let mut out = op.make_field(level, 0).unwrap();
    op.apply(0, 0, &mut out, &x).unwrap();
    assert_eq!(out.norm0(0), 0.0);
}
