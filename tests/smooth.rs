mod util;

use eb_abeclap::prelude::*;
use util::*;

fn circle(p: [f64; 3]) -> f64 {
    (p[0] - 0.5).powi(2) + (p[1] - 0.5).powi(2) - 0.37 * 0.37
}

fn residual_norm(op: &EbAbecLaplacian, sol: &mut MultiFab, rhs: &MultiFab) -> f64 {
    let level = LevelIndex::finest(0);
    op.fill_ghosts(0, 0, sol, None).unwrap();
    let mut res = op.make_field(level, 0).unwrap();
    op.residual(0, 0, &mut res, sol, rhs).unwrap();
    res.norm0(0)
}

fn configure(op: &mut EbAbecLaplacian, alpha: f64, a: f64) {
    op.set_scalars(alpha, 1.0).unwrap();
    set_uniform_a(op, 0, a);
    let b = face_fields(op, LevelIndex::finest(0), |d, iv| 1.0 + 0.1 * ((iv[0] + iv[1] + d as i64) % 3) as f64);
    set_b(op, 0, &b);
    op.set_domain_bc(&[BcType::Dirichlet; 2], &[BcType::Dirichlet; 2]).unwrap();
    op.prepare_for_solve().unwrap();
}

fn sweep(op: &EbAbecLaplacian, sol: &mut MultiFab, rhs: &MultiFab, n: usize) {
    for _ in 0..n {
        for color in 0..2 {
            op.fill_ghosts(0, 0, sol, None).unwrap();
            op.smooth(0, 0, sol, rhs, color).unwrap();
        }
    }
}

/// Zero the right-hand side on covered cells, where the operator is the
/// identity on a field that smoothing pins to zero.
fn zero_covered(op: &EbAbecLaplacian, rhs: &mut MultiFab) {
    let mut covered = Vec::new();
    cut_cells(op, LevelIndex::finest(0)).flags().for_each_valid(0, |i, iv, f| {
        if f.is_covered() {
            covered.push((i, iv));
        }
    });
    for (i, iv) in covered {
        rhs.fab_mut(i).unwrap().set(iv, 0.0);
    }
}

/// Max-norm residual after each of `n` red+black sweeps on a strongly
/// diagonally dominant Dirichlet problem.
fn residual_history(op: &mut EbAbecLaplacian, n: usize, eb: bool) -> Vec<f64> {
    configure(op, 1.0, 2.0e4);
    let level = LevelIndex::finest(0);
    let mut rhs = op.make_field(level, 0).unwrap();
    random_fill(&mut rhs, 33, -1.0, 1.0);
    if eb {
        zero_covered(op, &mut rhs);
    }
    let mut sol = op.make_field(level, 1).unwrap();
    (0..n)
        .map(|_| {
            sweep(op, &mut sol, &rhs, 1);
            residual_norm(op, &mut sol, &rhs)
        })
        .collect()
}

fn assert_never_increases(history: &[f64]) {
    for (k, w) in history.windows(2).enumerate() {
        assert!(
            w[1] <= w[0] + 1e-13,
            "residual rose from {} to {} at sweep {}",
            w[0],
            w[1],
            k + 2
        );
    }
}

#[test]
fn dominant_regular_residual_never_increases() {
    let mut op = regular_op(square_2d(32), 16, LpInfo::default());
    let history = residual_history(&mut op, 60, false);
    assert_never_increases(&history);
    assert!(history[59] < 1e-3 * history[0], "{history:?}");
}

#[test]
fn dominant_cut_cell_residual_never_increases() {
    let mut op = eb_op(square_2d(32), 16, LpInfo::default(), circle);
    let history = residual_history(&mut op, 60, true);
    assert_never_increases(&history);
    assert!(history[59] < 1e-3 * history[0], "{history:?}");
}

/// On regular cells one color pass solves each updated cell's equation
/// exactly, boundary cells included.
fn assert_color_solved(op: &EbAbecLaplacian, sol: &mut MultiFab, rhs: &MultiFab) {
    let level = LevelIndex::finest(0);
    op.fill_ghosts(0, 0, sol, None).unwrap();
    op.smooth(0, 0, sol, rhs, 1).unwrap();
    op.fill_ghosts(0, 0, sol, None).unwrap();
    let mut res = op.make_field(level, 0).unwrap();
    op.residual(0, 0, &mut res, sol, rhs).unwrap();
    res.for_each_valid(0, |_, iv, r| {
        if (iv.sum() + 1) % 2 == 0 {
            assert!(r.abs() < 1e-9, "residual {r} at {iv}");
        }
    });
}

#[test]
fn red_black_sweeps_reduce_the_regular_residual() {
    let mut op = regular_op(square_2d(16), 8, LpInfo::default());
    configure(&mut op, 0.0, 1.0);
    let level = LevelIndex::finest(0);
    let mut rhs = op.make_field(level, 0).unwrap();
    random_fill(&mut rhs, 21, -1.0, 1.0);
    let mut sol = op.make_field(level, 1).unwrap();

    let initial = residual_norm(&op, &mut sol, &rhs);
    sweep(&op, &mut sol, &rhs, 20);
    let after = residual_norm(&op, &mut sol, &rhs);
    assert!(after < initial, "{after} >= {initial}");
    assert_color_solved(&op, &mut sol, &rhs);
}

#[test]
fn red_black_sweeps_reduce_the_cut_cell_residual() {
    let mut op = eb_op(square_2d(16), 8, LpInfo::default(), circle);
    configure(&mut op, 1.0, 1.0);
    let level = LevelIndex::finest(0);
    let mut covered = Vec::new();
    cut_cells(&op, level).flags().for_each_valid(0, |i, iv, f| {
        if f.is_covered() {
            covered.push((i, iv));
        }
    });
    assert!(!covered.is_empty());

    let mut rhs = op.make_field(level, 0).unwrap();
    random_fill(&mut rhs, 8, -1.0, 1.0);
    for &(i, iv) in &covered {
        rhs.fab_mut(i).unwrap().set(iv, 0.0);
    }
    let mut sol = op.make_field(level, 1).unwrap();
    sol.set_val(0.25);

    let initial = residual_norm(&op, &mut sol, &rhs);
    sweep(&op, &mut sol, &rhs, 30);
    let after = residual_norm(&op, &mut sol, &rhs);
    assert!(after < initial, "{after} >= {initial}");

    sol.for_each_valid(0, |i, iv, v| {
        if covered.contains(&(i, iv)) {
            assert_eq!(v, 0.0, "covered {iv}");
        }
    });
}

#[test]
fn smoothing_needs_a_ghost_layer() {
    let op = regular_op(square_2d(8), 8, LpInfo::default());
    let level = LevelIndex::finest(0);
    let rhs = op.make_field(level, 0).unwrap();
    let mut sol = op.make_field(level, 0).unwrap();
    assert!(matches!(
        op.smooth(0, 0, &mut sol, &rhs, 0),
        Err(LinOpError::InsufficientGhosts { needed: 1, found: 0 })
    ));
}
