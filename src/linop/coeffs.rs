//! CoeffArena: flat storage of every coefficient field.
//!
//! One `Vec<MultiFab>` holds `a` and each direction of `b` for every level
//! index; a map from [`CoeffKey`] to slot replaces nested per-level,
//! per-rung, per-direction arrays.

use std::fmt;

use hashbrown::HashMap;

use crate::data::multifab::MultiFab;
use crate::grid::{IndexType, LevelIndex};
use crate::linop::hierarchy::LevelHierarchy;
use crate::linop_error::LinOpError;

/// Ghost layers of the face coefficient `b`.
pub const B_NGROW: usize = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CoeffField {
    /// Cell-centered `a`.
    A,
    /// Face-centered `b` normal to the given direction.
    B(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoeffKey {
    pub level: LevelIndex,
    pub field: CoeffField,
}

impl CoeffKey {
    pub const fn a(level: LevelIndex) -> Self {
        Self {
            level,
            field: CoeffField::A,
        }
    }

    pub const fn b(level: LevelIndex, dir: usize) -> Self {
        Self {
            level,
            field: CoeffField::B(dir),
        }
    }
}

impl fmt::Display for CoeffKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field {
            CoeffField::A => write!(f, "a at {}", self.level),
            CoeffField::B(d) => write!(f, "b[{d}] at {}", self.level),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct CoeffArena {
    fields: Vec<MultiFab>,
    slots: HashMap<CoeffKey, usize>,
}

impl CoeffArena {
    /// Zero-initialised `a` (no ghosts) and `b` (one ghost layer) for every
    /// level index of `hier`.
    pub fn allocate(hier: &LevelHierarchy) -> Result<Self, LinOpError> {
        let mut arena = Self::default();
        for level in hier.levels() {
            let grids = &hier.rung(level)?.grids;
            arena.insert(CoeffKey::a(level), MultiFab::new(grids.clone(), 1, 0));
            for d in 0..hier.dim() {
                arena.insert(
                    CoeffKey::b(level, d),
                    MultiFab::new(grids.convert(IndexType::Face(d)), 1, B_NGROW),
                );
            }
        }
        log::trace!("CoeffArena: {} coefficient fields", arena.len());
        Ok(arena)
    }

    fn insert(&mut self, key: CoeffKey, mf: MultiFab) {
        self.slots.insert(key, self.fields.len());
        self.fields.push(mf);
    }

    fn slot(&self, key: CoeffKey) -> Result<usize, LinOpError> {
        self.slots
            .get(&key)
            .copied()
            .ok_or_else(|| LinOpError::UnknownCoefficient(key.to_string()))
    }

    pub fn get(&self, key: CoeffKey) -> Result<&MultiFab, LinOpError> {
        Ok(&self.fields[self.slot(key)?])
    }

    pub fn get_mut(&mut self, key: CoeffKey) -> Result<&mut MultiFab, LinOpError> {
        let i = self.slot(key)?;
        Ok(&mut self.fields[i])
    }

    /// Read `src` while writing `dst`. The keys must differ.
    pub fn pair_mut(
        &mut self,
        src: CoeffKey,
        dst: CoeffKey,
    ) -> Result<(&MultiFab, &mut MultiFab), LinOpError> {
        let (s, d) = (self.slot(src)?, self.slot(dst)?);
        if s == d {
            return Err(LinOpError::LayoutMismatch(format!(
                "{src} cannot be both source and destination"
            )));
        }
        if s < d {
            let (head, tail) = self.fields.split_at_mut(d);
            Ok((&head[s], &mut tail[0]))
        } else {
            let (head, tail) = self.fields.split_at_mut(s);
            Ok((&tail[0], &mut head[d]))
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{BoxArray, Geometry, IndexBox};
    use crate::linop::hierarchy::AmrLevel;
    use crate::linop::lp_info::LpInfo;

    fn arena() -> CoeffArena {
        let dom = IndexBox::cell_2d([0, 0], [7, 7]);
        let lev = AmrLevel::regular(
            Geometry::unit_cells(dom).unwrap(),
            BoxArray::single(dom).unwrap(),
        );
        let hier = LevelHierarchy::build(vec![lev], &[], &LpInfo::default()).unwrap();
        CoeffArena::allocate(&hier).unwrap()
    }

    #[test]
    fn one_slot_per_level_and_field() {
        let arena = arena();
        // 8 -> 4 -> 2 rungs, three fields each
        assert_eq!(arena.len(), 9);
        let b = arena.get(CoeffKey::b(LevelIndex::new(0, 1), 1)).unwrap();
        assert_eq!(b.ix_type(), IndexType::Face(1));
        assert_eq!(b.ngrow(), 1);
        assert_eq!(arena.get(CoeffKey::a(LevelIndex::new(0, 0))).unwrap().ngrow(), 0);
        assert!(matches!(
            arena.get(CoeffKey::b(LevelIndex::new(0, 0), 2)),
            Err(LinOpError::UnknownCoefficient(_))
        ));
    }

    #[test]
    fn pair_mut_splits_in_either_order() {
        let mut arena = arena();
        let fine = CoeffKey::a(LevelIndex::new(0, 0));
        let crse = CoeffKey::a(LevelIndex::new(0, 1));
        arena.get_mut(fine).unwrap().set_val(2.0);
        {
            let (src, dst) = arena.pair_mut(fine, crse).unwrap();
            dst.set_val(src.norm0(0));
        }
        let (src, dst) = arena.pair_mut(crse, fine).unwrap();
        assert_eq!(src.norm0(0), 2.0);
        assert_eq!(dst.norm0(0), 2.0);
        assert!(arena.pair_mut(fine, fine).is_err());
    }
}
