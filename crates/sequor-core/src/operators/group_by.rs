//! Grouping stage.

use crate::protocol::{Sequence, SpanOffset, copy_from_run};
use crate::table::{Group, GroupTable};
use sequor_common::{DefaultEquivalence, Equivalence};

/// Groups elements by a derived key, yielding one [`Group`] per distinct
/// key in first-occurrence order.
///
/// The grouping table is built once, on the first pull, by fully draining
/// the source; pulls after that replay the materialized groups, which are
/// a contiguous run and so expose the view and bulk-copy capabilities.
#[derive(Debug)]
pub struct GroupBy<S: Sequence, K, F, E = DefaultEquivalence> {
    source: Option<S>,
    key: F,
    equivalence: Option<E>,
    groups: Option<std::vec::IntoIter<Group<K, S::Item>>>,
}

impl<S: Sequence, K, F, E> GroupBy<S, K, F, E> {
    pub(crate) fn new(source: S, key: F, equivalence: E) -> Self {
        Self {
            source: Some(source),
            key,
            equivalence: Some(equivalence),
            groups: None,
        }
    }
}

impl<S, K, F, E> GroupBy<S, K, F, E>
where
    S: Sequence,
    F: FnMut(&S::Item) -> K,
    E: Equivalence<K>,
{
    fn materialize(&mut self) {
        if self.groups.is_some() {
            return;
        }
        let mut table = GroupTable::with_equivalence(self.equivalence.take().unwrap());
        if let Some(mut source) = self.source.take() {
            while let Some(item) = source.try_advance() {
                let key = (self.key)(&item);
                table
                    .add(key, item)
                    .expect("table resize keeps a free slot reachable");
            }
        }
        self.groups = Some(table.into_groups().into_iter());
    }
}

impl<S, K, F, E> Sequence for GroupBy<S, K, F, E>
where
    S: Sequence,
    F: FnMut(&S::Item) -> K,
    E: Equivalence<K>,
{
    type Item = Group<K, S::Item>;

    fn try_advance(&mut self) -> Option<Self::Item> {
        self.materialize();
        self.groups.as_mut().unwrap().next()
    }

    fn try_count(&mut self) -> Option<usize> {
        self.materialize();
        Some(self.groups.as_ref().unwrap().len())
    }

    fn try_view(&mut self) -> Option<&[Self::Item]> {
        self.materialize();
        Some(self.groups.as_ref().unwrap().as_slice())
    }

    fn try_copy_into(&mut self, out: &mut Vec<Self::Item>, offset: SpanOffset, count: usize) -> bool
    where
        Self::Item: Clone,
    {
        self.materialize();
        copy_from_run(self.groups.as_ref().unwrap().as_slice(), out, offset, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::from_slice;

    #[test]
    fn test_group_by_identity() {
        let data = [3, 1, 3, 2, 1];
        let mut seq = GroupBy::new(from_slice(&data), |n: &i32| *n, DefaultEquivalence::new());

        assert_eq!(seq.try_count(), Some(3));

        let g = seq.try_advance().unwrap();
        assert_eq!((*g.key(), g.len()), (3, 2));
        let g = seq.try_advance().unwrap();
        assert_eq!((*g.key(), g.len()), (1, 2));
        let g = seq.try_advance().unwrap();
        assert_eq!((*g.key(), g.len()), (2, 1));
        assert!(seq.try_advance().is_none());
    }

    #[test]
    fn test_group_by_derived_key() {
        let words = ["apple", "avocado", "banana", "blueberry", "cherry"];
        let mut seq = GroupBy::new(
            from_slice(&words),
            |w: &&str| w.as_bytes()[0],
            DefaultEquivalence::new(),
        );

        let g = seq.try_advance().unwrap();
        assert_eq!(*g.key(), b'a');
        assert_eq!(g.values(), &["apple", "avocado"]);
        let g = seq.try_advance().unwrap();
        assert_eq!(g.values(), &["banana", "blueberry"]);
        let g = seq.try_advance().unwrap();
        assert_eq!(g.values(), &["cherry"]);
    }

    #[test]
    fn test_group_by_exposes_view_after_build() {
        let data = [1, 2, 1];
        let mut seq = GroupBy::new(from_slice(&data), |n: &i32| *n, DefaultEquivalence::new());
        let view = seq.try_view().unwrap();
        assert_eq!(view.len(), 2);
        assert_eq!(*view[0].key(), 1);
        assert_eq!(view[0].values(), &[1, 1]);
    }

    #[test]
    fn test_group_by_empty_source() {
        let empty: [i32; 0] = [];
        let mut seq = GroupBy::new(from_slice(&empty), |n: &i32| *n, DefaultEquivalence::new());
        assert_eq!(seq.try_count(), Some(0));
        assert!(seq.try_advance().is_none());
    }
}
