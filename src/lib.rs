#![cfg_attr(docsrs, feature(doc_cfg))]
//! # eb-abeclap
//!
//! eb-abeclap is a cell-centered finite-volume operator
//! `A·a(x)·φ − B·∇·(b(x)·∇φ)` for block-structured adaptive meshes whose
//! cells may be cut by an embedded boundary. It provides the per-call
//! primitives a multigrid driver needs (apply, red-black smoothing, face
//! fluxes, diagonal normalization, null-space detection) together with the
//! coefficient storage and coarsening that back them.
//!
//! ## Layers
//! - [`grid`]: index vectors, boxes, box arrays, geometry, level indices.
//! - [`data`]: flat multi-patch field storage ([`MultiFab`](data::MultiFab))
//!   with halo exchange.
//! - [`ebgeom`]: cut-cell metadata and the [`FabFactory`](ebgeom::FabFactory)
//!   capability interface.
//! - [`kernels`]: pointwise regular and cut-cell stencils.
//! - [`linop`]: the hierarchy, coefficient arena, coarsening and the
//!   [`EbAbecLaplacian`](linop::EbAbecLaplacian) operator.
//!
//! ## Features
//! - `rayon`: run patch loops on the rayon thread pool.
//! - `check-invariants` / `strict-invariants`: run structural self-checks in
//!   release builds too.
//!
//! ## Usage
//! ```ignore
//! use eb_abeclap::prelude::*;
//!
//! let mut op = EbAbecLaplacian::new(levels, &[2], LpInfo::default())?;
//! op.set_scalars(0.0, 1.0)?;
//! op.set_b_coeffs(0, &[&bx, &by])?;
//! op.prepare_for_solve()?;
//! op.fill_ghosts(0, 0, &mut phi, None)?;
//! op.apply(0, 0, &mut out, &phi)?;
//! ```

pub mod data;
pub mod debug_invariants;
pub mod ebgeom;
pub mod grid;
pub mod kernels;
pub mod linop;
pub mod linop_error;

pub use debug_invariants::DebugInvariants;
pub use linop_error::LinOpError;

/// The most-used types and traits.
pub mod prelude {
    pub use crate::data::{Fab, FabMut, FabRead, FabRef, MultiFab};
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::ebgeom::{CellFlag, EbFactory, FabFactory, FabType, RegularFactory};
    pub use crate::grid::{BoxArray, Geometry, IndexBox, IndexType, IntVect, LevelIndex};
    pub use crate::linop::{
        AmrLevel, BcType, CellLinOp, CoeffKey, EbAbecLaplacian, FaceFluxes, LpInfo,
    };
    pub use crate::linop_error::LinOpError;
}
