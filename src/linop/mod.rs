//! The embedded-boundary `A·a·φ − B·∇·(b∇φ)` operator and its hierarchy.

pub mod bc;
pub mod cell_linop;
pub mod coarsen;
pub mod coeffs;
pub mod flux;
pub mod hierarchy;
pub mod lp_info;
pub mod operator;
pub mod snapshot;

pub use bc::BcType;
pub use cell_linop::CellLinOp;
pub use coeffs::{CoeffArena, CoeffField, CoeffKey};
pub use flux::FaceFluxes;
pub use hierarchy::{AmrLevel, LevelHierarchy, MgRung};
pub use lp_info::LpInfo;
pub use operator::EbAbecLaplacian;
