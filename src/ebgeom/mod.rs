//! Embedded-boundary geometry: cell classification, cut-cell metadata and
//! the factory capability interface.

pub mod cell_flag;
pub mod eb_factory;
pub mod factory;

pub use cell_flag::{CellFlag, FabType, fab_type};
pub use eb_factory::{EB_NGROW, EbFactory, EbPatch, tangential_dirs};
pub use factory::{FabFactory, RegularFactory};
