//! Capability interface over per-level patch data sources.
//!
//! The operator never inspects the concrete type of a level's factory. It
//! asks for cut-cell metadata through [`FabFactory::cut_cells`], which plain
//! Cartesian levels answer with `None`.

use std::fmt::Debug;
use std::sync::Arc;

use crate::ebgeom::eb_factory::EbFactory;
use crate::grid::{BoxArray, Geometry};
use crate::linop_error::LinOpError;

/// Source of per-patch data for one level.
pub trait FabFactory: Debug + Send + Sync {
    /// Embedded-boundary metadata, if this level carries any.
    fn cut_cells(&self) -> Option<&EbFactory> {
        None
    }

    /// Factory for the same level coarsened by `ratio` onto `crse_ba`.
    fn coarsen(
        &self,
        ratio: i64,
        crse_geom: &Geometry,
        crse_ba: &BoxArray,
    ) -> Result<Arc<dyn FabFactory>, LinOpError>;
}

/// Plain Cartesian level: every cell regular, no cut-cell metadata.
#[derive(Clone, Copy, Debug, Default)]
pub struct RegularFactory;

impl FabFactory for RegularFactory {
    fn coarsen(
        &self,
        _ratio: i64,
        _crse_geom: &Geometry,
        _crse_ba: &BoxArray,
    ) -> Result<Arc<dyn FabFactory>, LinOpError> {
        Ok(Arc::new(RegularFactory))
    }
}

impl FabFactory for EbFactory {
    fn cut_cells(&self) -> Option<&EbFactory> {
        Some(self)
    }

    fn coarsen(
        &self,
        ratio: i64,
        crse_geom: &Geometry,
        crse_ba: &BoxArray,
    ) -> Result<Arc<dyn FabFactory>, LinOpError> {
        Ok(Arc::new(self.coarsened(ratio, crse_geom, crse_ba)?))
    }
}
