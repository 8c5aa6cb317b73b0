mod util;

use eb_abeclap::prelude::*;
use util::*;

fn two_level_op() -> EbAbecLaplacian {
    let dom = square_2d(8);
    let geom = unit_box_geom(dom);
    let levels = vec![
        AmrLevel::regular(geom.clone(), BoxArray::chopped(dom, 4).unwrap()),
        AmrLevel::regular(
            geom.refine(2),
            BoxArray::single(IndexBox::cell_2d([8, 8], [15, 15])).unwrap(),
        ),
    ];
    EbAbecLaplacian::new(levels, &[2], LpInfo::default()).unwrap()
}

#[test]
fn defaults_are_laplacian_with_neumann_sides() {
    let op = two_level_op();
    assert_eq!(op.scalars(), (0.0, 1.0));
    let (lo, hi) = op.domain_bc();
    assert!(lo.iter().chain(hi).all(|&bc| bc == BcType::Neumann));
}

#[test]
fn zero_alpha_clears_a_on_every_amr_level() {
    let mut op = two_level_op();
    op.set_scalars(2.0, 1.0).unwrap();
    set_uniform_a(&mut op, 0, 3.0);
    set_uniform_a(&mut op, 1, 4.0);
    assert_eq!(op.a_coeffs(LevelIndex::finest(1)).unwrap().norm0(0), 4.0);

    op.set_scalars(0.0, 2.5).unwrap();
    assert_eq!(op.scalars(), (0.0, 2.5));
    for amrlev in 0..2 {
        assert_eq!(op.a_coeffs(LevelIndex::finest(amrlev)).unwrap().norm0(0), 0.0);
    }

    // switching back does not resurrect the old field
    op.set_scalars(1.0, 1.0).unwrap();
    assert_eq!(op.a_coeffs(LevelIndex::finest(0)).unwrap().norm0(0), 0.0);
}

#[test]
fn scalars_scale_the_two_terms() {
    let mut op = regular_op(square_2d(8), 8, LpInfo::default());
    let level = LevelIndex::finest(0);
    let b = face_fields(&op, level, |_, _| 1.0);
    set_b(&mut op, 0, &b);
    let mut x = op.make_field(level, 1).unwrap();
    random_fill(&mut x, 4, 0.0, 1.0);
    op.fill_ghosts(0, 0, &mut x, None).unwrap();

    let mut apply_with = |alpha: f64, beta: f64| {
        op.set_scalars(alpha, beta).unwrap();
        set_uniform_a(&mut op, 0, 1.0);
        let mut y = op.make_field(level, 0).unwrap();
        op.apply(0, 0, &mut y, &x).unwrap();
        y
    };
    let mass = apply_with(1.0, 0.0);
    let lap = apply_with(0.0, 1.0);
    let both = apply_with(2.0, 3.0);
    let mut expect = mass.clone();
    expect.lin_comb(2.0, &mass, 3.0, &lap).unwrap();
    let mut diff = both.clone();
    diff.lin_comb(1.0, &both, -1.0, &expect).unwrap();
    assert!(diff.norm0(0) < 1e-10);

    let mut xc = op.make_field(level, 0).unwrap();
    xc.copy_from(&x, 0).unwrap();
    let mut d = mass.clone();
    d.lin_comb(1.0, &mass, -1.0, &xc).unwrap();
    assert_eq!(d.norm0(0), 0.0);
}

#[test]
fn coefficient_setters_check_their_arguments() {
    let mut op = two_level_op();
    let level = LevelIndex::finest(0);
    let a = op.make_field(level, 0).unwrap();
    assert!(op.set_a_coeffs(2, &a).is_err());
    assert!(matches!(
        op.set_a_coeffs(1, &a),
        Err(LinOpError::LayoutMismatch(_))
    ));
    let b = face_fields(&op, level, |_, _| 1.0);
    assert!(matches!(
        op.set_b_coeffs(0, &[&b[0]]),
        Err(LinOpError::DirectionOutOfRange { dir: 1, dim: 2 })
    ));
    assert!(op.b_coeffs(level, 2).is_err());
}
