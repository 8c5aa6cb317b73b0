//! Integer index vectors.
//!
//! An [`IntVect`] always carries three components; two-dimensional problems
//! pin the third to zero so the same loops serve both dimensions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Index, IndexMut, Mul, Neg, Sub};

/// Largest supported spatial dimension.
pub const MAX_SPACEDIM: usize = 3;

/// A point in integer index space.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct IntVect(pub [i64; MAX_SPACEDIM]);

impl IntVect {
    /// The origin.
    pub const ZERO: IntVect = IntVect([0; MAX_SPACEDIM]);

    #[inline]
    pub const fn new(i: i64, j: i64, k: i64) -> Self {
        IntVect([i, j, k])
    }

    /// Same value in the first `dim` components, zero elsewhere.
    #[inline]
    pub fn splat(v: i64, dim: usize) -> Self {
        let mut iv = Self::ZERO;
        for d in 0..dim.min(MAX_SPACEDIM) {
            iv.0[d] = v;
        }
        iv
    }

    /// Unit vector along `dir`.
    #[inline]
    pub fn unit(dir: usize) -> Self {
        let mut iv = Self::ZERO;
        iv.0[dir] = 1;
        iv
    }

    /// Floor division by `ratio`, component-wise (correct for negative indices).
    #[inline]
    pub fn coarsen(self, ratio: i64) -> Self {
        IntVect(self.0.map(|c| c.div_euclid(ratio)))
    }

    #[inline]
    pub fn scale(self, ratio: i64) -> Self {
        IntVect(self.0.map(|c| c * ratio))
    }

    #[inline]
    pub fn min(self, other: Self) -> Self {
        IntVect([
            self.0[0].min(other.0[0]),
            self.0[1].min(other.0[1]),
            self.0[2].min(other.0[2]),
        ])
    }

    #[inline]
    pub fn max(self, other: Self) -> Self {
        IntVect([
            self.0[0].max(other.0[0]),
            self.0[1].max(other.0[1]),
            self.0[2].max(other.0[2]),
        ])
    }

    /// Sum of all three components, used for red-black parity.
    #[inline]
    pub fn sum(self) -> i64 {
        self.0.iter().sum()
    }
}

impl Index<usize> for IntVect {
    type Output = i64;
    #[inline]
    fn index(&self, dir: usize) -> &i64 {
        &self.0[dir]
    }
}

impl IndexMut<usize> for IntVect {
    #[inline]
    fn index_mut(&mut self, dir: usize) -> &mut i64 {
        &mut self.0[dir]
    }
}

impl Add for IntVect {
    type Output = IntVect;
    #[inline]
    fn add(self, rhs: IntVect) -> IntVect {
        IntVect([
            self.0[0] + rhs.0[0],
            self.0[1] + rhs.0[1],
            self.0[2] + rhs.0[2],
        ])
    }
}

impl Sub for IntVect {
    type Output = IntVect;
    #[inline]
    fn sub(self, rhs: IntVect) -> IntVect {
        IntVect([
            self.0[0] - rhs.0[0],
            self.0[1] - rhs.0[1],
            self.0[2] - rhs.0[2],
        ])
    }
}

impl Mul<i64> for IntVect {
    type Output = IntVect;
    #[inline]
    fn mul(self, rhs: i64) -> IntVect {
        self.scale(rhs)
    }
}

impl Neg for IntVect {
    type Output = IntVect;
    #[inline]
    fn neg(self) -> IntVect {
        IntVect(self.0.map(|c| -c))
    }
}

impl fmt::Display for IntVect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.0[0], self.0[1], self.0[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coarsen_floors_negative_indices() {
        let iv = IntVect::new(-1, -2, 3);
        assert_eq!(iv.coarsen(2), IntVect::new(-1, -1, 1));
        assert_eq!(IntVect::new(-3, 0, 0).coarsen(4), IntVect::new(-1, 0, 0));
    }

    #[test]
    fn splat_leaves_unused_components_zero() {
        assert_eq!(IntVect::splat(4, 2), IntVect::new(4, 4, 0));
        assert_eq!(IntVect::unit(1) * 3, IntVect::new(0, 3, 0));
    }
}
