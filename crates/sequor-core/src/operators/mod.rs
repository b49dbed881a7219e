//! Pipeline stages and terminal consumers.
//!
//! This module provides the operator catalog built on the enumeration
//! protocol:
//!
//! - Transforms: map, filter, take, skip
//! - Keyed: distinct, union, intersect, except, group-by, join
//! - Ordered: order / order-by with chained secondary keys
//! - Terminals: materialize, count, single-element accessors, fold/reduce,
//!   and the numeric reductions
//!
//! Everything hangs off [`SequenceExt`], so pipelines compose the way
//! iterator adapters do; per-call options - equivalence contracts, ranking
//! contracts, direction flags, defaults for empty sequences - are explicit
//! arguments, never ambient configuration.

mod filter;
mod group_by;
mod join;
mod map;
mod order_by;
mod set_ops;
mod take_skip;
pub mod terminal;

pub use filter::Filter;
pub use group_by::GroupBy;
pub use join::Join;
pub use map::Map;
pub use order_by::Ordered;
pub use set_ops::{Distinct, Except, Intersect, Union};
pub use take_skip::{Skip, Take};

use crate::protocol::Sequence;
use crate::reduce::Numeric;
use crate::sort::{KeyLevel, RankedOrder, SelfOrder};
use sequor_common::{DefaultEquivalence, Equivalence, Natural, Ranker, Result};

/// Combinators and terminals for any [`Sequence`].
pub trait SequenceExt: Sequence + Sized {
    /// Transforms every element.
    fn map<B, F>(self, transform: F) -> Map<Self, F>
    where
        F: FnMut(Self::Item) -> B,
    {
        Map::new(self, transform)
    }

    /// Keeps only the elements the predicate accepts.
    fn filter<P>(self, predicate: P) -> Filter<Self, P>
    where
        P: FnMut(&Self::Item) -> bool,
    {
        Filter::new(self, predicate)
    }

    /// Yields at most the first `count` elements.
    fn take(self, count: usize) -> Take<Self> {
        Take::new(self, count)
    }

    /// Skips the first `count` elements.
    fn skip(self, count: usize) -> Skip<Self> {
        Skip::new(self, count)
    }

    /// Yields the first occurrence of each distinct element.
    fn distinct(self) -> Distinct<Self, DefaultEquivalence> {
        Distinct::new(self, DefaultEquivalence::new())
    }

    /// Distinct under a caller-supplied equivalence contract.
    fn distinct_with<E>(self, equivalence: E) -> Distinct<Self, E>
    where
        E: Equivalence<Self::Item>,
    {
        Distinct::new(self, equivalence)
    }

    /// Set union with another sequence, first-occurrence order.
    fn union<S>(self, other: S) -> Union<Self, S, DefaultEquivalence>
    where
        S: Sequence<Item = Self::Item>,
    {
        Union::new(self, other, DefaultEquivalence::new())
    }

    /// Set intersection with another sequence, in this sequence's order.
    fn intersect<S>(self, other: S) -> Intersect<Self, S, DefaultEquivalence>
    where
        S: Sequence<Item = Self::Item>,
    {
        Intersect::new(self, other, DefaultEquivalence::new())
    }

    /// Set difference: elements of this sequence absent from `other`.
    fn except<S>(self, other: S) -> Except<Self, S, DefaultEquivalence>
    where
        S: Sequence<Item = Self::Item>,
    {
        Except::new(self, other, DefaultEquivalence::new())
    }

    /// Groups elements by a derived key, first-occurrence key order.
    fn group_by<K, F>(self, key: F) -> GroupBy<Self, K, F, DefaultEquivalence>
    where
        F: FnMut(&Self::Item) -> K,
    {
        GroupBy::new(self, key, DefaultEquivalence::new())
    }

    /// Group-by under a caller-supplied equivalence contract.
    fn group_by_with<K, F, E>(self, key: F, equivalence: E) -> GroupBy<Self, K, F, E>
    where
        F: FnMut(&Self::Item) -> K,
        E: Equivalence<K>,
    {
        GroupBy::new(self, key, equivalence)
    }

    /// Hash-joins with `right` on derived keys, merging matched pairs.
    fn join<R, K, LK, RK, M, O>(
        self,
        right: R,
        left_key: LK,
        right_key: RK,
        merge: M,
    ) -> Join<Self, R, K, LK, RK, M, DefaultEquivalence>
    where
        R: Sequence,
        LK: FnMut(&Self::Item) -> K,
        RK: FnMut(&R::Item) -> K,
        M: FnMut(Self::Item, R::Item) -> O,
    {
        Join::new(self, right, left_key, right_key, merge, DefaultEquivalence::new())
    }

    /// Sorts ascending by the elements' own `Ord`.
    fn order(self) -> Ordered<Self, SelfOrder>
    where
        Self::Item: Ord,
    {
        Ordered::new(self, SelfOrder::ascending())
    }

    /// Sorts descending by the elements' own `Ord`.
    fn order_desc(self) -> Ordered<Self, SelfOrder>
    where
        Self::Item: Ord,
    {
        Ordered::new(self, SelfOrder::descending())
    }

    /// Sorts by the elements' own value under an explicit contract.
    fn order_by_rank<R>(self, rank: R) -> Ordered<Self, RankedOrder<R>>
    where
        R: Ranker<Self::Item>,
    {
        Ordered::new(self, RankedOrder::new(rank, false))
    }

    /// Sorts ascending by a derived key. Stable; chain further levels with
    /// [`Ordered::then_by`].
    fn order_by<K, F>(self, key: F) -> Ordered<Self, KeyLevel<F>>
    where
        K: Ord,
        F: Fn(&Self::Item) -> K,
    {
        Ordered::new(self, KeyLevel::new(key, Natural, false))
    }

    /// Sorts descending by a derived key.
    fn order_by_desc<K, F>(self, key: F) -> Ordered<Self, KeyLevel<F>>
    where
        K: Ord,
        F: Fn(&Self::Item) -> K,
    {
        Ordered::new(self, KeyLevel::new(key, Natural, true))
    }

    /// Materializes the remaining elements.
    fn to_vec(self) -> Vec<Self::Item>
    where
        Self::Item: Clone,
    {
        terminal::to_vec(self)
    }

    /// Counts the remaining elements.
    fn count(self) -> usize {
        terminal::count(self)
    }

    /// The first element, or [`sequor_common::Error::Empty`].
    fn first(self) -> Result<Self::Item> {
        terminal::first(self)
    }

    /// The first element, or `default` when empty.
    fn first_or(self, default: Self::Item) -> Self::Item {
        terminal::first_or(self, default)
    }

    /// The last element, or [`sequor_common::Error::Empty`].
    fn last(self) -> Result<Self::Item>
    where
        Self::Item: Clone,
    {
        terminal::last(self)
    }

    /// The last element, or `default` when empty.
    fn last_or(self, default: Self::Item) -> Self::Item
    where
        Self::Item: Clone,
    {
        terminal::last_or(self, default)
    }

    /// The element at `index`, or [`sequor_common::Error::Empty`].
    fn element_at(self, index: usize) -> Result<Self::Item>
    where
        Self::Item: Clone,
    {
        terminal::element_at(self, index)
    }

    /// The element at `index`, or `default` when the sequence is shorter.
    fn element_at_or(self, index: usize, default: Self::Item) -> Self::Item
    where
        Self::Item: Clone,
    {
        terminal::element_at_or(self, index, default)
    }

    /// The only element; empty and plural sequences are errors.
    fn single(self) -> Result<Self::Item> {
        terminal::single(self)
    }

    /// The only element, or `default` when empty; plural sequences are
    /// still an error.
    fn single_or(self, default: Self::Item) -> Result<Self::Item> {
        terminal::single_or(self, default)
    }

    /// Folds from an explicit seed.
    fn fold<B, F>(self, init: B, f: F) -> B
    where
        F: FnMut(B, Self::Item) -> B,
    {
        terminal::fold(self, init, f)
    }

    /// Reduces, seeding from the first element.
    fn reduce<F>(self, f: F) -> Result<Self::Item>
    where
        F: FnMut(Self::Item, Self::Item) -> Self::Item,
    {
        terminal::reduce(self, f)
    }

    /// Checked sum.
    fn sum(self) -> Result<Self::Item>
    where
        Self::Item: Numeric,
    {
        terminal::sum(self)
    }

    /// Wrapping sum.
    fn sum_wrapping(self) -> Self::Item
    where
        Self::Item: Numeric,
    {
        terminal::sum_wrapping(self)
    }

    /// Arithmetic mean.
    fn average(self) -> Result<<Self::Item as Numeric>::Mean>
    where
        Self::Item: Numeric,
    {
        terminal::average(self)
    }

    /// Smallest element.
    fn min(self) -> Result<Self::Item>
    where
        Self::Item: Numeric,
    {
        terminal::min(self)
    }

    /// Largest element.
    fn max(self) -> Result<Self::Item>
    where
        Self::Item: Numeric,
    {
        terminal::max(self)
    }

    /// Smallest element under a ranking contract.
    fn min_by<R>(self, rank: R) -> Result<Self::Item>
    where
        R: Ranker<Self::Item>,
    {
        terminal::min_by(self, rank)
    }

    /// Largest element under a ranking contract.
    fn max_by<R>(self, rank: R) -> Result<Self::Item>
    where
        R: Ranker<Self::Item>,
    {
        terminal::max_by(self, rank)
    }
}

impl<S: Sequence> SequenceExt for S {}
