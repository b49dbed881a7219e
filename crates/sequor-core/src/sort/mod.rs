//! The order-statistics engine: stable multi-key sorting and quickselect.
//!
//! Sorting never moves elements until the end. A [`SortPlan`] extracts
//! each key level for the whole snapshot up front, then an index
//! permutation `[0..n)` is sorted with a comparer that walks the key
//! levels and, on a total tie, falls back to comparing the indices
//! themselves. The index fallback makes the sort stable by construction
//! and the induced order total, which is also what lets quickselect
//! agree with the full sort at every position.
//!
//! Ordering a sequence by its own `Ord` value with no secondary keys
//! skips the index indirection and sorts elements directly.

use sequor_common::{Natural, Ranker};
use std::cmp::Ordering;

/// One or more key levels ranking a snapshot of elements.
pub trait SortPlan<T> {
    /// Materialized per-level key storage for one snapshot.
    type Keys;

    /// Extracts this plan's keys for every element of the snapshot.
    fn prepare(&self, items: &[T]) -> Self::Keys;

    /// Compares two snapshot positions under this plan.
    fn compare(&self, items: &[T], keys: &Self::Keys, a: usize, b: usize) -> Ordering;

    /// Sorts the snapshot in place if this plan admits the direct fast
    /// path (self-ordering by `Ord`, no index map needed). Returns false
    /// when the caller must take the permutation path.
    fn sort_in_place(&self, items: &mut [T]) -> bool {
        let _ = items;
        false
    }
}

/// A single key level: extract a key per element, rank keys, optionally
/// flip the direction.
#[derive(Debug, Clone)]
pub struct KeyLevel<F, R = Natural> {
    select: F,
    rank: R,
    descending: bool,
}

impl<F, R> KeyLevel<F, R> {
    /// Creates a key level with an explicit ranking contract.
    pub fn new(select: F, rank: R, descending: bool) -> Self {
        Self {
            select,
            rank,
            descending,
        }
    }
}

impl<T, K, F, R> SortPlan<T> for KeyLevel<F, R>
where
    F: Fn(&T) -> K,
    R: Ranker<K>,
{
    type Keys = Vec<K>;

    fn prepare(&self, items: &[T]) -> Vec<K> {
        items.iter().map(|item| (self.select)(item)).collect()
    }

    fn compare(&self, _items: &[T], keys: &Vec<K>, a: usize, b: usize) -> Ordering {
        let ord = self.rank.compare(&keys[a], &keys[b]);
        if self.descending { ord.reverse() } else { ord }
    }
}

/// Ranks elements by their own natural `Ord` value. Takes the direct sort
/// path: no key extraction, no index map.
#[derive(Debug, Clone, Copy)]
pub struct SelfOrder {
    descending: bool,
}

impl SelfOrder {
    /// Natural ascending order.
    #[must_use]
    pub fn ascending() -> Self {
        Self { descending: false }
    }

    /// Natural descending order.
    #[must_use]
    pub fn descending() -> Self {
        Self { descending: true }
    }
}

impl<T: Ord> SortPlan<T> for SelfOrder {
    type Keys = ();

    fn prepare(&self, _items: &[T]) {}

    fn compare(&self, items: &[T], (): &(), a: usize, b: usize) -> Ordering {
        let ord = items[a].cmp(&items[b]);
        if self.descending { ord.reverse() } else { ord }
    }

    fn sort_in_place(&self, items: &mut [T]) -> bool {
        // `Eq`-equal elements are indistinguishable under self-ordering,
        // so an unstable element sort observes the stability contract.
        items.sort_unstable();
        if self.descending {
            items.reverse();
        }
        true
    }
}

/// Ranks elements by their own value under an explicit contract. Always
/// takes the permutation path: a coarse ranker can tie elements that are
/// still distinguishable, so stability has to come from the index map.
#[derive(Debug, Clone, Copy)]
pub struct RankedOrder<R> {
    rank: R,
    descending: bool,
}

impl<R> RankedOrder<R> {
    /// Self-ordering under an explicit ranking contract.
    pub fn new(rank: R, descending: bool) -> Self {
        Self { rank, descending }
    }
}

impl<T, R: Ranker<T>> SortPlan<T> for RankedOrder<R> {
    type Keys = ();

    fn prepare(&self, _items: &[T]) {}

    fn compare(&self, items: &[T], (): &(), a: usize, b: usize) -> Ordering {
        let ord = self.rank.compare(&items[a], &items[b]);
        if self.descending { ord.reverse() } else { ord }
    }
}

/// A primary plan chained with the next ThenBy level.
#[derive(Debug, Clone)]
pub struct Chain<A, B> {
    first: A,
    then: B,
}

impl<A, B> Chain<A, B> {
    /// Chains a secondary level after an existing plan.
    pub fn new(first: A, then: B) -> Self {
        Self { first, then }
    }
}

impl<T, A, B> SortPlan<T> for Chain<A, B>
where
    A: SortPlan<T>,
    B: SortPlan<T>,
{
    type Keys = (A::Keys, B::Keys);

    fn prepare(&self, items: &[T]) -> Self::Keys {
        (self.first.prepare(items), self.then.prepare(items))
    }

    fn compare(&self, items: &[T], keys: &Self::Keys, a: usize, b: usize) -> Ordering {
        self.first
            .compare(items, &keys.0, a, b)
            .then_with(|| self.then.compare(items, &keys.1, a, b))
    }
}

/// The total order a plan induces: plan levels first, position fallback
/// last. The fallback guarantees stability and strictness.
#[inline]
fn compare_total<T, P: SortPlan<T>>(
    plan: &P,
    items: &[T],
    keys: &P::Keys,
    a: usize,
    b: usize,
) -> Ordering {
    plan.compare(items, keys, a, b).then_with(|| a.cmp(&b))
}

/// Sorts an index permutation of `items` under `plan`. Stable: equal-keyed
/// elements keep their original relative order.
#[must_use]
pub fn sort_permutation<T, P: SortPlan<T>>(items: &[T], plan: &P) -> Vec<u32> {
    let keys = plan.prepare(items);
    let mut permutation: Vec<u32> = (0..items.len() as u32).collect();
    permutation.sort_unstable_by(|&a, &b| {
        compare_total(plan, items, &keys, a as usize, b as usize)
    });
    permutation
}

/// Rebuilds the snapshot in permutation order without cloning.
#[must_use]
pub fn apply_permutation<T>(items: Vec<T>, permutation: &[u32]) -> Vec<T> {
    debug_assert_eq!(items.len(), permutation.len());
    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    permutation
        .iter()
        // A permutation visits each slot exactly once.
        .map(|&idx| slots[idx as usize].take().unwrap())
        .collect()
}

/// Finds the snapshot position holding rank `k` under `plan` without a
/// full sort. Returns `None` if `k` is out of range.
///
/// Agrees with [`sort_permutation`] at every rank: the shared total order
/// is strict, so the k-th smallest position is unique.
#[must_use]
pub fn select_index<T, P: SortPlan<T>>(items: &[T], plan: &P, k: usize) -> Option<u32> {
    let n = items.len();
    if k >= n {
        return None;
    }
    let keys = plan.prepare(items);
    let total = |a: usize, b: usize| compare_total(plan, items, &keys, a, b);

    // The two common ranks skip partitioning entirely.
    if k == 0 {
        tracing::trace!("order statistic k=0: linear min scan over {} items", n);
        return (0..n).reduce(|best, cur| if total(cur, best) == Ordering::Less { cur } else { best })
            .map(|idx| idx as u32);
    }
    if k == n - 1 {
        tracing::trace!("order statistic k=n-1: linear max scan over {} items", n);
        return (0..n)
            .reduce(|best, cur| if total(cur, best) == Ordering::Greater { cur } else { best })
            .map(|idx| idx as u32);
    }

    let mut indices: Vec<u32> = (0..n as u32).collect();
    let (mut lo, mut hi) = (0usize, n - 1);
    while lo < hi {
        let pivot = indices[lo + (hi - lo) / 2] as usize;
        let mut i = lo;
        let mut j = hi;
        // Two-pointer scan-and-swap around the pivot's total-order value.
        loop {
            while total(indices[i] as usize, pivot) == Ordering::Less {
                i += 1;
            }
            while total(indices[j] as usize, pivot) == Ordering::Greater {
                j -= 1;
            }
            if i >= j {
                break;
            }
            indices.swap(i, j);
            i += 1;
            j -= 1;
        }
        // indices[lo..=j] now rank at or below the pivot, indices[j+1..]
        // at or above it; recurse into the side holding k.
        if k <= j {
            hi = j;
        } else {
            lo = j + 1;
        }
    }
    Some(indices[k])
}
