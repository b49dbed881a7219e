//! Hash join stage.

use crate::protocol::Sequence;
use crate::table::GroupTable;
use sequor_common::{DefaultEquivalence, Equivalence};

/// Equi-joins two inputs on derived keys.
///
/// The right input is drained into a grouping table on the first pull
/// (the build side); the left input then streams through it (the probe
/// side). Output order is left order, with each left element's matches in
/// right insertion order. Left elements without a match produce nothing.
#[derive(Debug)]
pub struct Join<L: Sequence, R: Sequence, K, LK, RK, M, E = DefaultEquivalence> {
    left: L,
    right: Option<R>,
    left_key: LK,
    right_key: RK,
    merge: M,
    equivalence: Option<E>,
    table: Option<GroupTable<K, R::Item, E>>,
    /// The left element currently being matched, with its remaining
    /// matches.
    pending: Option<(L::Item, std::vec::IntoIter<R::Item>)>,
}

impl<L: Sequence, R: Sequence, K, LK, RK, M, E> Join<L, R, K, LK, RK, M, E> {
    pub(crate) fn new(left: L, right: R, left_key: LK, right_key: RK, merge: M, equivalence: E) -> Self {
        Self {
            left,
            right: Some(right),
            left_key,
            right_key,
            merge,
            equivalence: Some(equivalence),
            table: None,
            pending: None,
        }
    }
}

impl<L, R, K, LK, RK, M, O, E> Sequence for Join<L, R, K, LK, RK, M, E>
where
    L: Sequence,
    R: Sequence,
    L::Item: Clone,
    R::Item: Clone,
    LK: FnMut(&L::Item) -> K,
    RK: FnMut(&R::Item) -> K,
    M: FnMut(L::Item, R::Item) -> O,
    E: Equivalence<K>,
{
    type Item = O;

    fn try_advance(&mut self) -> Option<O> {
        if self.table.is_none() {
            let mut table = GroupTable::with_equivalence(self.equivalence.take().unwrap());
            if let Some(mut right) = self.right.take() {
                while let Some(item) = right.try_advance() {
                    let key = (self.right_key)(&item);
                    table
                        .add(key, item)
                        .expect("table resize keeps a free slot reachable");
                }
            }
            self.table = Some(table);
        }

        loop {
            if let Some((left_item, matches)) = &mut self.pending {
                if let Some(right_item) = matches.next() {
                    return Some((self.merge)(left_item.clone(), right_item));
                }
                self.pending = None;
            }

            let left_item = self.left.try_advance()?;
            let key = (self.left_key)(&left_item);
            let table = self.table.as_ref().unwrap();
            if let Some(group) = table.find(&key) {
                let matches: Vec<R::Item> = table.values_of(group).cloned().collect();
                self.pending = Some((left_item, matches.into_iter()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::from_slice;

    #[test]
    fn test_join_matches_by_key() {
        let orders = [(1, "apples"), (2, "beans"), (1, "cocoa"), (3, "dates")];
        let names = [(2, "Bea"), (1, "Ann")];

        let mut seq = Join::new(
            from_slice(&orders),
            from_slice(&names),
            |o: &(i32, &str)| o.0,
            |n: &(i32, &str)| n.0,
            |o: (i32, &str), n: (i32, &str)| (n.1, o.1),
            DefaultEquivalence::new(),
        );

        let mut out = Vec::new();
        while let Some(pair) = seq.try_advance() {
            out.push(pair);
        }
        // Left order drives the output; order 3 has no customer.
        assert_eq!(out, vec![("Ann", "apples"), ("Bea", "beans"), ("Ann", "cocoa")]);
    }

    #[test]
    fn test_join_fans_out_duplicate_build_keys() {
        let left = [1];
        let right = [(1, 'a'), (1, 'b'), (2, 'c')];

        let mut seq = Join::new(
            from_slice(&left),
            from_slice(&right),
            |l: &i32| *l,
            |r: &(i32, char)| r.0,
            |l: i32, r: (i32, char)| (l, r.1),
            DefaultEquivalence::new(),
        );

        assert_eq!(seq.try_advance(), Some((1, 'a')));
        assert_eq!(seq.try_advance(), Some((1, 'b')));
        assert_eq!(seq.try_advance(), None);
    }

    #[test]
    fn test_join_empty_sides() {
        let empty: [i32; 0] = [];
        let right = [1, 2];
        let mut seq = Join::new(
            from_slice(&empty),
            from_slice(&right),
            |l: &i32| *l,
            |r: &i32| *r,
            |l: i32, r: i32| l + r,
            DefaultEquivalence::new(),
        );
        assert_eq!(seq.try_advance(), None);

        let left = [1, 2];
        let mut seq = Join::new(
            from_slice(&left),
            from_slice(&empty),
            |l: &i32| *l,
            |r: &i32| *r,
            |l: i32, r: i32| l + r,
            DefaultEquivalence::new(),
        );
        assert_eq!(seq.try_advance(), None);
    }
}
