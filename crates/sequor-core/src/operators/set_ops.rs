//! Set-semantics stages: distinct, union, intersect, except.
//!
//! All four stream their results in source order and share the
//! single-value table. Distinct and union filter through a set that fills
//! as elements flow; intersect and except fully drain their second input
//! into a set on the first pull, then stream the first input against it.
//! Each distinct element is yielded at most once.

use crate::protocol::Sequence;
use crate::table::SlimSet;
use sequor_common::{DefaultEquivalence, Equivalence};

/// Yields the first occurrence of each distinct element.
#[derive(Debug)]
pub struct Distinct<S: Sequence, E = DefaultEquivalence> {
    source: S,
    seen: SlimSet<S::Item, E>,
}

impl<S: Sequence, E: Equivalence<S::Item>> Distinct<S, E> {
    pub(crate) fn new(source: S, equivalence: E) -> Self {
        Self {
            source,
            seen: SlimSet::with_equivalence(equivalence),
        }
    }
}

impl<S, E> Sequence for Distinct<S, E>
where
    S: Sequence,
    S::Item: Clone,
    E: Equivalence<S::Item>,
{
    type Item = S::Item;

    fn try_advance(&mut self) -> Option<S::Item> {
        loop {
            let item = self.source.try_advance()?;
            let added = self
                .seen
                .insert(item.clone())
                .expect("set resize keeps a free slot reachable");
            if added {
                return Some(item);
            }
        }
    }
}

/// Yields each distinct element of both inputs, first input first.
#[derive(Debug)]
pub struct Union<A: Sequence, B, E = DefaultEquivalence> {
    first: A,
    second: B,
    seen: SlimSet<A::Item, E>,
}

impl<A: Sequence, B, E: Equivalence<A::Item>> Union<A, B, E> {
    pub(crate) fn new(first: A, second: B, equivalence: E) -> Self {
        Self {
            first,
            second,
            seen: SlimSet::with_equivalence(equivalence),
        }
    }
}

impl<A, B, E> Sequence for Union<A, B, E>
where
    A: Sequence,
    B: Sequence<Item = A::Item>,
    A::Item: Clone,
    E: Equivalence<A::Item>,
{
    type Item = A::Item;

    fn try_advance(&mut self) -> Option<A::Item> {
        loop {
            let item = match self.first.try_advance() {
                Some(item) => item,
                None => self.second.try_advance()?,
            };
            let added = self
                .seen
                .insert(item.clone())
                .expect("set resize keeps a free slot reachable");
            if added {
                return Some(item);
            }
        }
    }
}

/// Yields each distinct element present in both inputs, in first-input
/// order.
#[derive(Debug)]
pub struct Intersect<A: Sequence, B, E = DefaultEquivalence> {
    first: A,
    second: Option<B>,
    equivalence: Option<E>,
    table: Option<SlimSet<A::Item, E>>,
}

impl<A: Sequence, B, E: Equivalence<A::Item>> Intersect<A, B, E> {
    pub(crate) fn new(first: A, second: B, equivalence: E) -> Self {
        Self {
            first,
            second: Some(second),
            equivalence: Some(equivalence),
            table: None,
        }
    }
}

impl<A, B, E> Sequence for Intersect<A, B, E>
where
    A: Sequence,
    B: Sequence<Item = A::Item>,
    E: Equivalence<A::Item>,
{
    type Item = A::Item;

    fn try_advance(&mut self) -> Option<A::Item> {
        if self.table.is_none() {
            let mut table = SlimSet::with_equivalence(self.equivalence.take().unwrap());
            if let Some(mut second) = self.second.take() {
                while let Some(item) = second.try_advance() {
                    table
                        .insert(item)
                        .expect("set resize keeps a free slot reachable");
                }
            }
            self.table = Some(table);
        }
        let table = self.table.as_mut().unwrap();
        loop {
            let item = self.first.try_advance()?;
            // Removing on match caps each common element at one yield.
            if table.remove(&item) {
                return Some(item);
            }
        }
    }
}

/// Yields each distinct element of the first input that the second does
/// not contain.
#[derive(Debug)]
pub struct Except<A: Sequence, B, E = DefaultEquivalence> {
    first: A,
    second: Option<B>,
    equivalence: Option<E>,
    table: Option<SlimSet<A::Item, E>>,
}

impl<A: Sequence, B, E: Equivalence<A::Item>> Except<A, B, E> {
    pub(crate) fn new(first: A, second: B, equivalence: E) -> Self {
        Self {
            first,
            second: Some(second),
            equivalence: Some(equivalence),
            table: None,
        }
    }
}

impl<A, B, E> Sequence for Except<A, B, E>
where
    A: Sequence,
    B: Sequence<Item = A::Item>,
    A::Item: Clone,
    E: Equivalence<A::Item>,
{
    type Item = A::Item;

    fn try_advance(&mut self) -> Option<A::Item> {
        if self.table.is_none() {
            let mut table = SlimSet::with_equivalence(self.equivalence.take().unwrap());
            if let Some(mut second) = self.second.take() {
                while let Some(item) = second.try_advance() {
                    table
                        .insert(item)
                        .expect("set resize keeps a free slot reachable");
                }
            }
            self.table = Some(table);
        }
        let table = self.table.as_mut().unwrap();
        loop {
            let item = self.first.try_advance()?;
            // Inserting as we go also suppresses duplicates within the
            // first input.
            let fresh = table
                .insert(item.clone())
                .expect("set resize keeps a free slot reachable");
            if fresh {
                return Some(item);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::from_slice;

    fn drain<S: Sequence>(mut seq: S) -> Vec<S::Item> {
        let mut out = Vec::new();
        while let Some(item) = seq.try_advance() {
            out.push(item);
        }
        out
    }

    #[test]
    fn test_distinct_keeps_first_occurrence_order() {
        let data = [3, 1, 3, 2, 1, 3];
        let seq = Distinct::new(from_slice(&data), DefaultEquivalence::new());
        assert_eq!(drain(seq), vec![3, 1, 2]);
    }

    #[test]
    fn test_union() {
        let a = [1, 2, 3];
        let b = [2, 3, 4, 4];
        let seq = Union::new(from_slice(&a), from_slice(&b), DefaultEquivalence::new());
        assert_eq!(drain(seq), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_intersect_first_order_once_each() {
        let a = [4, 1, 2, 2, 4, 3];
        let b = [2, 4, 9];
        let seq = Intersect::new(from_slice(&a), from_slice(&b), DefaultEquivalence::new());
        assert_eq!(drain(seq), vec![4, 2]);
    }

    #[test]
    fn test_except() {
        let a = [1, 2, 2, 3, 4, 1];
        let b = [2, 4];
        let seq = Except::new(from_slice(&a), from_slice(&b), DefaultEquivalence::new());
        assert_eq!(drain(seq), vec![1, 3]);
    }

    #[test]
    fn test_empty_inputs() {
        let empty: [i32; 0] = [];
        let data = [1, 2];

        let seq = Intersect::new(from_slice(&data), from_slice(&empty), DefaultEquivalence::new());
        assert_eq!(drain(seq), Vec::<i32>::new());

        let seq = Except::new(from_slice(&data), from_slice(&empty), DefaultEquivalence::new());
        assert_eq!(drain(seq), vec![1, 2]);

        let seq = Union::new(from_slice(&empty), from_slice(&data), DefaultEquivalence::new());
        assert_eq!(drain(seq), vec![1, 2]);
    }
}
