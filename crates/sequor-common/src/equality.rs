//! Hashing and equality contracts for keyed operators.
//!
//! Grouping, joining and the set operators never hash or compare keys
//! directly: they route through an [`Equivalence`] contract supplied per
//! call. The default contract hashes with `ahash` and compares with `Eq`,
//! matching how the rest of the codebase hashes small keys.

use std::hash::{BuildHasher, Hash, Hasher};

/// A hashing and equality contract over keys of type `K`.
///
/// Implementations must be consistent: `equals(a, b)` implies
/// `hash(a) == hash(b)`. The associative tables rely on this to keep probe
/// chains coherent across resizes.
pub trait Equivalence<K> {
    /// Hashes a key.
    fn hash(&self, key: &K) -> u64;

    /// Compares two keys for equality.
    fn equals(&self, a: &K, b: &K) -> bool;
}

/// The default contract: `ahash` hashing, `Eq` equality.
#[derive(Debug, Clone, Default)]
pub struct DefaultEquivalence {
    state: ahash::RandomState,
}

impl DefaultEquivalence {
    /// Creates a default contract with a fresh hasher state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a contract with fixed seeds, for reproducible table layouts.
    #[must_use]
    pub fn with_seeds(k0: u64, k1: u64) -> Self {
        Self {
            state: ahash::RandomState::with_seeds(k0, k1, k0 ^ 0x9e37_79b9, k1 ^ 0x7f4a_7c15),
        }
    }
}

impl<K: Hash + Eq> Equivalence<K> for DefaultEquivalence {
    fn hash(&self, key: &K) -> u64 {
        let mut hasher = self.state.build_hasher();
        key.hash(&mut hasher);
        hasher.finish()
    }

    fn equals(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// Hashes an optional key, treating absence as the fixed sentinel 0.
///
/// Keyed operators accept `Option<K>` keys; an absent key is a valid group
/// key, hashes to a stable sentinel, and equals only another absent key.
pub fn hash_optional<K, E: Equivalence<K>>(eq: &E, key: Option<&K>) -> u64 {
    match key {
        Some(k) => eq.hash(k),
        None => 0,
    }
}

/// [`Equivalence`] over `Option<K>` lifted from a contract over `K`.
///
/// `None` hashes to the sentinel 0 and equals only `None`.
#[derive(Debug, Clone, Default)]
pub struct OptionalEquivalence<E> {
    inner: E,
}

impl<E> OptionalEquivalence<E> {
    /// Lifts a key contract to optional keys.
    pub fn new(inner: E) -> Self {
        Self { inner }
    }
}

impl<K, E: Equivalence<K>> Equivalence<Option<K>> for OptionalEquivalence<E> {
    fn hash(&self, key: &Option<K>) -> u64 {
        hash_optional(&self.inner, key.as_ref())
    }

    fn equals(&self, a: &Option<K>, b: &Option<K>) -> bool {
        match (a, b) {
            (Some(x), Some(y)) => self.inner.equals(x, y),
            (None, None) => true,
            _ => false,
        }
    }
}
