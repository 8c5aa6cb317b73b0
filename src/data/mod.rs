//! Data module: flat storage, patch layouts, fab views and multifabs.

pub mod fab;
pub mod layout;
pub mod multifab;
pub mod par;
pub mod storage;

pub use fab::{Fab, FabMut, FabRead, FabRef};
pub use layout::FabLayout;
pub use multifab::MultiFab;
pub use storage::{Storage, VecStorage};
