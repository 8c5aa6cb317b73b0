//! Debug snapshots of operator inputs and outputs.
//!
//! Only written when [`LpInfo::debug_snapshot`](crate::linop::LpInfo) names a
//! directory. Each field becomes one JSON file holding its valid data.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::fab::FabRead;
use crate::data::multifab::MultiFab;
use crate::grid::{IndexBox, LevelIndex};
use crate::linop_error::LinOpError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatchSnapshot {
    pub valid: IndexBox,
    /// Component 0 over `valid`, first direction fastest.
    pub values: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldSnapshot {
    pub name: String,
    pub level: LevelIndex,
    pub patches: Vec<PatchSnapshot>,
}

impl FieldSnapshot {
    pub fn capture(name: &str, level: LevelIndex, mf: &MultiFab) -> Self {
        let patches = mf
            .fabs()
            .iter()
            .zip(mf.box_array().iter())
            .map(|(fab, valid)| PatchSnapshot {
                valid: *valid,
                values: valid.cells().map(|iv| fab.get(iv)).collect(),
            })
            .collect();
        Self {
            name: name.to_owned(),
            level,
            patches,
        }
    }
}

/// File a snapshot of `name` at `level` is written to under `dir`.
pub fn snapshot_path(dir: &Path, name: &str, level: LevelIndex) -> PathBuf {
    dir.join(format!("{name}_{}_{}.json", level.amrlev, level.mglev))
}

pub fn write_snapshot(dir: &Path, snap: &FieldSnapshot) -> Result<PathBuf, LinOpError> {
    fs::create_dir_all(dir).map_err(|e| LinOpError::Snapshot(e.to_string()))?;
    let path = snapshot_path(dir, &snap.name, snap.level);
    let json = serde_json::to_string(snap).map_err(|e| LinOpError::Snapshot(e.to_string()))?;
    fs::write(&path, json).map_err(|e| LinOpError::Snapshot(e.to_string()))?;
    log::trace!("wrote snapshot {}", path.display());
    Ok(path)
}

pub fn read_snapshot(path: &Path) -> Result<FieldSnapshot, LinOpError> {
    let text = fs::read_to_string(path).map_err(|e| LinOpError::Snapshot(e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| LinOpError::Snapshot(e.to_string()))
}
