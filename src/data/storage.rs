//! Pluggable flat storage behind every [`MultiFab`](crate::data::multifab::MultiFab).
//!
//! All patches of a multifab share one contiguous buffer; the
//! [`FabLayout`](crate::data::layout::FabLayout) hands out the per-patch
//! ranges. Keeping the buffer behind a trait leaves room for pinned or mapped
//! backends without touching the operator code.

use core::fmt::{self, Debug};

/// Contiguous, indexable storage for `V`.
pub trait Storage<V>: Debug + Send + Sync {
    /// Construct a buffer of `len` elements, all equal to `fill`.
    fn with_len(len: usize, fill: V) -> Self
    where
        V: Clone;

    /// Current length in elements.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entire read-only buffer.
    fn as_slice(&self) -> &[V];

    /// Entire mutable buffer.
    fn as_mut_slice(&mut self) -> &mut [V];

    /// Overwrite every element with `value`.
    fn fill(&mut self, value: V)
    where
        V: Clone,
    {
        self.as_mut_slice().fill(value);
    }
}

/// `Vec`-backed storage (default).
#[derive(Clone, PartialEq)]
pub struct VecStorage<V>(pub(crate) Vec<V>);

impl<V> Debug for VecStorage<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VecStorage")
            .field("len", &self.0.len())
            .finish()
    }
}

impl<V: Send + Sync> Storage<V> for VecStorage<V> {
    fn with_len(len: usize, fill: V) -> Self
    where
        V: Clone,
    {
        Self(vec![fill; len])
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn as_slice(&self) -> &[V] {
        &self.0
    }

    fn as_mut_slice(&mut self) -> &mut [V] {
        &mut self.0
    }
}

impl<V> From<Vec<V>> for VecStorage<V> {
    fn from(v: Vec<V>) -> Self {
        Self(v)
    }
}

impl<V> VecStorage<V> {
    pub fn into_inner(self) -> Vec<V> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_overwrites_every_element() {
        let mut s = VecStorage::with_len(6, 0.0f64);
        assert_eq!(s.len(), 6);
        s.as_mut_slice()[2] = 4.0;
        assert_eq!(s.as_slice()[2], 4.0);
        s.fill(1.5);
        assert!(s.as_slice().iter().all(|&v| v == 1.5));
        assert!(VecStorage::<f64>::with_len(0, 0.0).is_empty());
    }
}
