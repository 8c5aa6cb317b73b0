//! Structured grid substrate: index vectors, boxes, box arrays, geometry.

pub mod box_array;
pub mod geometry;
pub mod index_box;
pub mod int_vect;
pub mod level;

pub use box_array::BoxArray;
pub use geometry::Geometry;
pub use index_box::{IndexBox, IndexType};
pub use int_vect::{IntVect, MAX_SPACEDIM};
pub use level::LevelIndex;
