//! Sorting stage over the order-statistics engine.

use crate::protocol::{Sequence, SpanOffset, copy_from_run};
use crate::sort::{Chain, KeyLevel, SortPlan, apply_permutation, select_index, sort_permutation};
use sequor_common::{Natural, Ranker, SegmentedBuffer};

/// Orders the wrapped stage under a [`SortPlan`].
///
/// On the first pull the source is drained into a snapshot, the plan's
/// keys are extracted, and the snapshot is sorted (stably); pulls after
/// that replay the sorted run, which exposes the view and bulk-copy
/// capabilities. A single-element bulk copy requested before any pull
/// runs quickselect over the snapshot instead of sorting it, so
/// element-at/min/max under an order stay linear-ish.
#[derive(Debug)]
pub struct Ordered<S: Sequence, P> {
    source: Option<S>,
    plan: P,
    /// Drained but not yet sorted.
    snapshot: Option<Vec<S::Item>>,
    /// Sorted and being served.
    sorted: Option<std::vec::IntoIter<S::Item>>,
}

impl<S: Sequence, P> Ordered<S, P> {
    pub(crate) fn new(source: S, plan: P) -> Self {
        Self {
            source: Some(source),
            plan,
            snapshot: None,
            sorted: None,
        }
    }

    /// Appends a secondary ascending key level.
    pub fn then_by<K, F>(self, key: F) -> Ordered<S, Chain<P, KeyLevel<F>>>
    where
        K: Ord,
        F: Fn(&S::Item) -> K,
    {
        self.chain(KeyLevel::new(key, Natural, false))
    }

    /// Appends a secondary descending key level.
    pub fn then_by_desc<K, F>(self, key: F) -> Ordered<S, Chain<P, KeyLevel<F>>>
    where
        K: Ord,
        F: Fn(&S::Item) -> K,
    {
        self.chain(KeyLevel::new(key, Natural, true))
    }

    /// Appends a secondary key level under an explicit ranking contract.
    pub fn then_by_rank<K, F, R>(self, key: F, rank: R) -> Ordered<S, Chain<P, KeyLevel<F, R>>>
    where
        F: Fn(&S::Item) -> K,
        R: Ranker<K>,
    {
        self.chain(KeyLevel::new(key, rank, false))
    }

    fn chain<L>(self, level: L) -> Ordered<S, Chain<P, L>> {
        Ordered {
            source: self.source,
            plan: Chain::new(self.plan, level),
            // A sorted run that was already built folds back into the
            // snapshot; re-sorting it under the extended plan is stable
            // with respect to the original order.
            snapshot: self.snapshot.or_else(|| self.sorted.map(|run| run.collect())),
            sorted: None,
        }
    }
}

impl<S, P> Ordered<S, P>
where
    S: Sequence,
    P: SortPlan<S::Item>,
{
    /// Drains the source into the snapshot, preallocating when the source
    /// count is known and falling back to the segmented buffer otherwise.
    fn materialize_snapshot(&mut self) {
        if self.snapshot.is_some() || self.sorted.is_some() {
            return;
        }
        let mut source = self.source.take();
        let items = match &mut source {
            Some(source) => match source.try_count() {
                Some(count) => {
                    let mut items = Vec::with_capacity(count);
                    while let Some(item) = source.try_advance() {
                        items.push(item);
                    }
                    items
                }
                None => {
                    let mut buffer = SegmentedBuffer::new();
                    while let Some(item) = source.try_advance() {
                        buffer.push(item);
                    }
                    buffer.into_vec()
                }
            },
            None => Vec::new(),
        };
        self.snapshot = Some(items);
    }

    fn ensure_sorted(&mut self) {
        if self.sorted.is_some() {
            return;
        }
        self.materialize_snapshot();
        let mut items = self.snapshot.take().unwrap();
        if !self.plan.sort_in_place(&mut items) {
            let permutation = sort_permutation(&items, &self.plan);
            items = apply_permutation(items, &permutation);
        }
        self.sorted = Some(items.into_iter());
    }
}

impl<S, P> Sequence for Ordered<S, P>
where
    S: Sequence,
    P: SortPlan<S::Item>,
{
    type Item = S::Item;

    fn try_advance(&mut self) -> Option<S::Item> {
        self.ensure_sorted();
        self.sorted.as_mut().unwrap().next()
    }

    fn try_count(&mut self) -> Option<usize> {
        if let Some(sorted) = &self.sorted {
            return Some(sorted.len());
        }
        // Sorting is count-preserving, so the snapshot answers without
        // paying for the sort.
        self.materialize_snapshot();
        Some(self.snapshot.as_ref().unwrap().len())
    }

    fn try_view(&mut self) -> Option<&[S::Item]> {
        self.ensure_sorted();
        Some(self.sorted.as_ref().unwrap().as_slice())
    }

    fn try_copy_into(&mut self, out: &mut Vec<S::Item>, offset: SpanOffset, count: usize) -> bool
    where
        S::Item: Clone,
    {
        if self.sorted.is_none() && count == 1 {
            self.materialize_snapshot();
            let items = self.snapshot.as_ref().unwrap();
            let Some(rank) = offset.resolve(items.len()) else {
                return false;
            };
            let Some(position) = select_index(items, &self.plan, rank) else {
                return false;
            };
            out.push(items[position as usize].clone());
            return true;
        }
        self.ensure_sorted();
        copy_from_run(self.sorted.as_ref().unwrap().as_slice(), out, offset, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{from_iter, from_slice};
    use crate::sort::{RankedOrder, SelfOrder};

    fn drain<S: Sequence>(mut seq: S) -> Vec<S::Item> {
        let mut out = Vec::new();
        while let Some(item) = seq.try_advance() {
            out.push(item);
        }
        out
    }

    #[test]
    fn test_order_natural() {
        let data = [3, 1, 4, 1, 5];
        let seq = Ordered::new(from_slice(&data), SelfOrder::ascending());
        assert_eq!(drain(seq), vec![1, 1, 3, 4, 5]);
    }

    #[test]
    fn test_order_by_key_is_stable() {
        let data = [(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd')];
        let seq = Ordered::new(
            from_slice(&data),
            KeyLevel::new(|pair: &(i32, char)| pair.0, Natural, false),
        );
        assert_eq!(drain(seq), vec![(1, 'b'), (1, 'd'), (2, 'a'), (2, 'c')]);
    }

    #[test]
    fn test_then_by_breaks_ties() {
        let data = [("b", 2), ("a", 2), ("b", 1), ("a", 1)];
        let seq = Ordered::new(
            from_slice(&data),
            KeyLevel::new(|pair: &(&str, i32)| pair.0, Natural, false),
        )
        .then_by(|pair| pair.1);
        assert_eq!(drain(seq), vec![("a", 1), ("a", 2), ("b", 1), ("b", 2)]);
    }

    #[test]
    fn test_sorted_run_exposes_view() {
        let data = [3, 1, 2];
        let mut seq = Ordered::new(from_slice(&data), SelfOrder::ascending());
        assert_eq!(seq.try_count(), Some(3));
        assert_eq!(seq.try_view(), Some(&[1, 2, 3][..]));
        assert_eq!(seq.try_advance(), Some(1));
        assert_eq!(seq.try_view(), Some(&[2, 3][..]));
    }

    #[test]
    fn test_single_element_copy_uses_quickselect() {
        let data = [9, 2, 7, 4, 1, 8];
        let mut seq = Ordered::new(from_slice(&data), SelfOrder::ascending());
        let mut out = Vec::new();
        assert!(seq.try_copy_into(&mut out, SpanOffset::FromStart(2), 1));
        assert_eq!(out, vec![4]);
        // The snapshot is still unsorted and intact for later pulls.
        assert!(seq.snapshot.is_some());
        assert_eq!(drain(seq), vec![1, 2, 4, 7, 8, 9]);
    }

    #[test]
    fn test_ranked_order() {
        let data = [1, 3, 2];
        let seq = Ordered::new(
            from_slice(&data),
            RankedOrder::new(sequor_common::Reversed(Natural), false),
        );
        assert_eq!(drain(seq), vec![3, 2, 1]);
    }

    #[test]
    fn test_unknown_count_source_goes_through_buffer() {
        let seq = Ordered::new(
            from_iter((0..100).rev().filter(|n| n % 3 == 0)),
            SelfOrder::ascending(),
        );
        let sorted = drain(seq);
        assert_eq!(sorted.first(), Some(&0));
        assert_eq!(sorted.last(), Some(&99));
        assert!(sorted.windows(2).all(|w| w[0] <= w[1]));
    }
}
