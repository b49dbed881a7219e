//! Single-value table with membership semantics.

use super::{LOAD_DENOMINATOR, LOAD_NUMERATOR, NIL, SlotRange, fold_hash, next_prime, probe_free};
use sequor_common::{DefaultEquivalence, Equivalence, Result};

/// One occupied slot. `probe_next` chains colliding entries; `alive`
/// tracks logical occupancy so removal never breaks a chain.
#[derive(Debug)]
struct SetSlot<K> {
    hash: u32,
    key: K,
    probe_next: i32,
    alive: bool,
}

/// An open-addressing set used by the distinct/union/intersect/except
/// family.
///
/// Keys are hashed and compared through an [`Equivalence`] contract, so
/// the key type needs no ordering. Removal clears logical occupancy only:
/// entries that probed past the removed slot stay reachable because the
/// probe chain is left intact. Tombstoned slots are never reused and are
/// discarded at the next resize.
#[derive(Debug)]
pub struct SlimSet<K, E = DefaultEquivalence> {
    slots: Vec<Option<SetSlot<K>>>,
    range: SlotRange,
    /// Slots holding a live key.
    live: usize,
    /// Slots occupied at all, tombstones included; drives the load factor.
    used: usize,
    equivalence: E,
}

impl<K> SlimSet<K, DefaultEquivalence> {
    /// Creates an empty set with the default equivalence contract.
    #[must_use]
    pub fn new() -> Self {
        Self::with_equivalence(DefaultEquivalence::new())
    }
}

impl<K> Default for SlimSet<K, DefaultEquivalence> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, E: Equivalence<K>> SlimSet<K, E> {
    /// Creates an empty set with a caller-supplied equivalence contract.
    #[must_use]
    pub fn with_equivalence(equivalence: E) -> Self {
        let range = SlotRange::new(next_prime(0));
        Self {
            slots: std::iter::repeat_with(|| None).take(range.capacity()).collect(),
            range,
            live: 0,
            used: 0,
            equivalence,
        }
    }

    /// Returns the number of live keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns true if the set holds no live keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Inserts a key. Returns true if the key was not already present.
    ///
    /// # Errors
    ///
    /// Returns [`sequor_common::Error::TableFull`] if quadratic probing
    /// exhausts the table; the resize policy keeps this unreachable.
    pub fn insert(&mut self, key: K) -> Result<bool> {
        if (self.used + 1) * LOAD_DENOMINATOR > self.range.capacity() * LOAD_NUMERATOR {
            self.grow()?;
        }

        let hash = fold_hash(self.equivalence.hash(&key));
        let home = self.range.home_slot(hash);

        if self.slots[home].is_none() {
            self.slots[home] = Some(SetSlot {
                hash,
                key,
                probe_next: NIL,
                alive: true,
            });
            self.live += 1;
            self.used += 1;
            return Ok(true);
        }

        // Walk the probe chain. A tombstone holding an equal key is
        // revived in place; its chain position is still correct because
        // the key, and so the home slot, is unchanged.
        let mut idx = home;
        loop {
            let slot = self.slots[idx].as_mut().unwrap();
            if slot.hash == hash && self.equivalence.equals(&slot.key, &key) {
                if slot.alive {
                    return Ok(false);
                }
                slot.alive = true;
                self.live += 1;
                return Ok(true);
            }
            if slot.probe_next == NIL {
                break;
            }
            idx = slot.probe_next as usize;
        }

        let free = probe_free(&self.slots, self.range, home)?;
        self.slots[free] = Some(SetSlot {
            hash,
            key,
            probe_next: NIL,
            alive: true,
        });
        self.slots[idx].as_mut().unwrap().probe_next = free as i32;
        self.live += 1;
        self.used += 1;
        Ok(true)
    }

    /// Returns true if the key is present.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Removes a key. Returns true if it was present.
    ///
    /// Only logical occupancy is cleared: the slot keeps its place in the
    /// probe chain so entries inserted past it stay reachable.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.find(key) {
            Some(idx) => {
                self.slots[idx].as_mut().unwrap().alive = false;
                self.live -= 1;
                true
            }
            None => false,
        }
    }

    fn find(&self, key: &K) -> Option<usize> {
        let hash = fold_hash(self.equivalence.hash(key));
        let mut idx = self.range.home_slot(hash);
        self.slots[idx].as_ref()?;
        loop {
            let slot = self.slots[idx].as_ref().unwrap();
            if slot.alive && slot.hash == hash && self.equivalence.equals(&slot.key, key) {
                return Some(idx);
            }
            if slot.probe_next == NIL {
                return None;
            }
            idx = slot.probe_next as usize;
        }
    }

    /// Rehashes live keys into the next prime capacity, dropping
    /// tombstones.
    fn grow(&mut self) -> Result<()> {
        let old_capacity = self.range.capacity();
        let new_capacity = next_prime((old_capacity as u32).saturating_mul(2));
        tracing::debug!(
            "slim table resize: {} -> {} slots ({} live keys)",
            old_capacity,
            new_capacity,
            self.live
        );

        let range = SlotRange::new(new_capacity);
        let mut slots: Vec<Option<SetSlot<K>>> =
            std::iter::repeat_with(|| None).take(range.capacity()).collect();

        for old in self.slots.drain(..).flatten() {
            if !old.alive {
                continue;
            }
            let home = range.home_slot(old.hash);
            let fresh = SetSlot {
                hash: old.hash,
                key: old.key,
                probe_next: NIL,
                alive: true,
            };
            if slots[home].is_none() {
                slots[home] = Some(fresh);
                continue;
            }
            let mut idx = home;
            while slots[idx].as_ref().unwrap().probe_next != NIL {
                idx = slots[idx].as_ref().unwrap().probe_next as usize;
            }
            let free = probe_free(&slots, range, home)?;
            slots[free] = Some(fresh);
            slots[idx].as_mut().unwrap().probe_next = free as i32;
        }

        self.slots = slots;
        self.range = range;
        self.used = self.live;
        Ok(())
    }
}
