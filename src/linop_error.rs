//! LinOpError: unified error type for eb-abeclap public APIs.
//!
//! Every public entry point of the crate returns `Result<_, LinOpError>`.
//! Configuration problems (malformed hierarchies, mismatched layouts, level
//! indices out of range) are reported here instead of aborting; the caller
//! decides whether a failed `define` ends the run.

use crate::grid::LevelIndex;
use thiserror::Error;

/// Unified error type for operator, grid and geometry operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LinOpError {
    /// Only two- and three-dimensional problems are supported.
    #[error("spatial dimension must be 2 or 3, got {0}")]
    UnsupportedDimension(usize),
    /// Direction index not smaller than the spatial dimension.
    #[error("direction {dir} out of range for a {dim}-dimensional problem")]
    DirectionOutOfRange { dir: usize, dim: usize },
    /// AMR level index outside `[0, num_amr_levels)`.
    #[error("AMR level {amrlev} out of range (operator has {num_amr_levels} levels)")]
    AmrLevelOutOfRange { amrlev: usize, num_amr_levels: usize },
    /// Multigrid rung outside `[0, num_mg_levels[amrlev])`.
    #[error("level {level} out of range ({num_mg_levels} multigrid levels on this AMR level)")]
    MgLevelOutOfRange {
        level: LevelIndex,
        num_mg_levels: usize,
    },
    /// Problem domain or physical extents are malformed.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    /// The level hierarchy passed to `define` is inconsistent.
    #[error("invalid hierarchy: {0}")]
    InvalidHierarchy(String),
    /// Two boxes of one box array overlap.
    #[error("boxes {first} and {second} of a box array overlap")]
    OverlappingBoxes { first: usize, second: usize },
    /// A grid cannot be coarsened by the requested ratio.
    #[error("{what} is not coarsenable by {ratio}")]
    NotCoarsenable { what: String, ratio: i64 },
    /// Patch index outside the box array.
    #[error("patch {patch} out of range ({len} patches)")]
    PatchOutOfRange { patch: usize, len: usize },
    /// No coefficient field is stored under the requested key.
    #[error("no coefficient field {0}")]
    UnknownCoefficient(String),
    /// Two fields that must share a layout do not.
    #[error("layout mismatch: {0}")]
    LayoutMismatch(String),
    /// A field carries fewer ghost cells than the operation reads.
    #[error("insufficient ghost cells: need {needed}, have {found}")]
    InsufficientGhosts { needed: usize, found: usize },
    /// Boundary conditions disagree with the geometry's periodicity.
    #[error("boundary condition mismatch in direction {dir}: {reason}")]
    BoundaryMismatch { dir: usize, reason: String },
    /// An embedded-boundary geometry invariant does not hold.
    #[error("geometry invariant violated at {location}: {reason}")]
    GeometryInvariant { location: String, reason: String },
    /// Writing a debug snapshot failed.
    #[error("debug snapshot failed: {0}")]
    Snapshot(String),
}
