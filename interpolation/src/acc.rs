/// Index lookup cache for repeated evaluations near the same abscissa.
///
/// The accelerator is owned by the *caller*, not the spline, so a single
/// spline can be shared read-only across threads while each thread keeps its
/// own cache. A stale cached index costs one extra binary search and can
/// never change the returned value.
#[derive(Clone, Copy, Default)]
pub struct Accelerator {
    /// Index of the last used bracket.
    pub cache: usize,
    /// Number of lookups answered from the cached bracket.
    pub hits: usize,
    /// Number of lookups that fell back to a binary search.
    pub misses: usize,
}

impl Accelerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `i` such that `xa[i] <= x <= xa[i+1]`.
    ///
    /// `x` must be inside the tabulated range; the caller checks the domain
    /// first.
    pub(crate) fn find(&mut self, xa: &[f64], x: f64) -> usize {
        let top = xa.len() - 2;
        let i = self.cache.min(top);
        if x >= xa[i] && x <= xa[i + 1] {
            self.hits += 1;
            return i;
        }
        self.misses += 1;
        // partition_point returns the first index with xa[j] > x.
        let j = xa.partition_point(|&v| v <= x);
        self.cache = j.saturating_sub(1).min(top);
        self.cache
    }

    /// Resets the cache and the lookup stats.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl std::fmt::Debug for Accelerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Accelerator")
            .field("hits  ", &self.hits)
            .field("misses", &self.misses)
            .finish()
    }
}
