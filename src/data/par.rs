//! Patch-parallel loop helper.
//!
//! Patches write only to the views they own, so the loop body needs no
//! locking. With the `rayon` feature the patches run on the rayon pool,
//! otherwise in patch order on the calling thread.

/// Run `f(patch_index, item)` for every item, possibly concurrently.
pub fn for_each_patch<I, F>(items: Vec<I>, f: F)
where
    I: Send,
    F: Fn(usize, I) + Send + Sync,
{
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        items
            .into_par_iter()
            .enumerate()
            .for_each(|(i, item)| f(i, item));
    }
    #[cfg(not(feature = "rayon"))]
    {
        items
            .into_iter()
            .enumerate()
            .for_each(|(i, item)| f(i, item));
    }
}
