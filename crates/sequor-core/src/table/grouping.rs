//! Multi-value table with grouping semantics.

use super::{LOAD_DENOMINATOR, LOAD_NUMERATOR, NIL, SlotRange, fold_hash, next_prime, probe_free};
use sequor_common::{DefaultEquivalence, Equivalence, Result};

/// One group slot. `probe_next` chains colliding groups for lookup;
/// `order_next` chains groups in first-insertion order for enumeration.
/// The two chains have different invalidation rules (probe links are
/// rebuilt on resize, order links never change after group creation) and
/// are kept as separate fields.
#[derive(Debug)]
struct GroupSlot<K> {
    hash: u32,
    key: K,
    /// First and last node of this group's value chain.
    head: u32,
    tail: u32,
    probe_next: i32,
    order_next: i32,
}

/// One value in the shared pool, forward-linked within its group.
#[derive(Debug)]
struct ValueNode<V> {
    value: V,
    next: i32,
}

/// The values of one key in first-insertion order, with a link to the next
/// group in first-insertion order handled by the owning table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group<K, V> {
    key: K,
    values: Vec<V>,
}

impl<K, V> Group<K, V> {
    /// The group's key.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// The group's values, in insertion order.
    #[must_use]
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Number of values in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the group holds no values. Groups produced by the
    /// table always hold at least one.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Splits the group into its key and values.
    #[must_use]
    pub fn into_parts(self) -> (K, Vec<V>) {
        (self.key, self.values)
    }
}

/// An open-addressing grouping table used by GroupBy and the build side of
/// Join.
///
/// Values live in one shared pool as a forward-linked chain per group, so
/// appending to a group is O(1) with no per-entry heap node. Enumerating
/// groups reproduces first-insertion order, not slot order.
#[derive(Debug)]
pub struct GroupTable<K, V, E = DefaultEquivalence> {
    slots: Vec<Option<GroupSlot<K>>>,
    range: SlotRange,
    values: Vec<ValueNode<V>>,
    groups: usize,
    order_head: i32,
    order_tail: i32,
    equivalence: E,
}

impl<K, V> GroupTable<K, V, DefaultEquivalence> {
    /// Creates an empty table with the default equivalence contract.
    #[must_use]
    pub fn new() -> Self {
        Self::with_equivalence(DefaultEquivalence::new())
    }
}

impl<K, V> Default for GroupTable<K, V, DefaultEquivalence> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, E: Equivalence<K>> GroupTable<K, V, E> {
    /// Creates an empty table with a caller-supplied equivalence contract.
    #[must_use]
    pub fn with_equivalence(equivalence: E) -> Self {
        let range = SlotRange::new(next_prime(0));
        Self {
            slots: std::iter::repeat_with(|| None).take(range.capacity()).collect(),
            range,
            values: Vec::new(),
            groups: 0,
            order_head: NIL,
            order_tail: NIL,
            equivalence,
        }
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups
    }

    /// Total number of values across all groups.
    #[must_use]
    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no key has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups == 0
    }

    /// Adds a value under a key. Returns true if the key created a new
    /// group, false if it joined an existing one.
    ///
    /// # Errors
    ///
    /// Returns [`sequor_common::Error::TableFull`] if quadratic probing
    /// exhausts the table; the resize policy keeps this unreachable.
    pub fn add(&mut self, key: K, value: V) -> Result<bool> {
        if (self.groups + 1) * LOAD_DENOMINATOR > self.range.capacity() * LOAD_NUMERATOR {
            self.grow()?;
        }

        let hash = fold_hash(self.equivalence.hash(&key));
        let home = self.range.home_slot(hash);

        let node = self.values.len() as u32;

        if self.slots[home].is_none() {
            self.values.push(ValueNode { value, next: NIL });
            self.place_group(home, hash, key, node);
            return Ok(true);
        }

        let mut idx = home;
        loop {
            let slot = self.slots[idx].as_ref().unwrap();
            if slot.hash == hash && self.equivalence.equals(&slot.key, &key) {
                // Existing group: append to its value chain.
                self.values.push(ValueNode { value, next: NIL });
                let slot = self.slots[idx].as_mut().unwrap();
                self.values[slot.tail as usize].next = node as i32;
                slot.tail = node;
                return Ok(false);
            }
            if slot.probe_next == NIL {
                break;
            }
            idx = slot.probe_next as usize;
        }

        let free = probe_free(&self.slots, self.range, home)?;
        self.values.push(ValueNode { value, next: NIL });
        self.place_group(free, hash, key, node);
        self.slots[idx].as_mut().unwrap().probe_next = free as i32;
        Ok(true)
    }

    /// Places a brand-new group at `slot` and links it after the
    /// previously-last-inserted group.
    fn place_group(&mut self, slot: usize, hash: u32, key: K, node: u32) {
        self.slots[slot] = Some(GroupSlot {
            hash,
            key,
            head: node,
            tail: node,
            probe_next: NIL,
            order_next: NIL,
        });
        if self.order_tail == NIL {
            self.order_head = slot as i32;
        } else {
            self.slots[self.order_tail as usize].as_mut().unwrap().order_next = slot as i32;
        }
        self.order_tail = slot as i32;
        self.groups += 1;
    }

    /// Looks a key up, returning a handle usable with [`Self::values_of`].
    #[must_use]
    pub fn find(&self, key: &K) -> Option<usize> {
        let hash = fold_hash(self.equivalence.hash(key));
        let mut idx = self.range.home_slot(hash);
        self.slots[idx].as_ref()?;
        loop {
            let slot = self.slots[idx].as_ref().unwrap();
            if slot.hash == hash && self.equivalence.equals(&slot.key, key) {
                return Some(idx);
            }
            if slot.probe_next == NIL {
                return None;
            }
            idx = slot.probe_next as usize;
        }
    }

    /// Iterates one group's values in insertion order.
    pub fn values_of(&self, group: usize) -> impl Iterator<Item = &V> {
        let head = self.slots[group].as_ref().map_or(NIL, |s| s.head as i32);
        ValueChain {
            values: &self.values,
            cursor: head,
        }
    }

    /// Iterates `(key, values)` pairs in first-insertion order.
    pub fn groups(&self) -> impl Iterator<Item = (&K, impl Iterator<Item = &V>)> {
        let mut cursor = self.order_head;
        std::iter::from_fn(move || {
            if cursor == NIL {
                return None;
            }
            let slot = self.slots[cursor as usize].as_ref().unwrap();
            cursor = slot.order_next;
            Some((
                &slot.key,
                ValueChain {
                    values: &self.values,
                    cursor: slot.head as i32,
                },
            ))
        })
    }

    /// Consumes the table into owned groups in first-insertion order.
    #[must_use]
    pub fn into_groups(mut self) -> Vec<Group<K, V>> {
        let mut pool: Vec<Option<ValueNode<V>>> = self.values.drain(..).map(Some).collect();
        let mut out = Vec::with_capacity(self.groups);
        let mut cursor = self.order_head;
        while cursor != NIL {
            let slot = self.slots[cursor as usize].take().unwrap();
            cursor = slot.order_next;
            let mut values = Vec::new();
            let mut node = slot.head as i32;
            while node != NIL {
                // Each node belongs to exactly one chain, so the take
                // cannot see an emptied entry.
                let taken = pool[node as usize].take().unwrap();
                values.push(taken.value);
                node = taken.next;
            }
            out.push(Group {
                key: slot.key,
                values,
            });
        }
        out
    }

    /// Rehashes all groups into the next prime capacity, walking the
    /// insertion-order chain so first-seen order survives the move.
    fn grow(&mut self) -> Result<()> {
        let old_capacity = self.range.capacity();
        let new_capacity = next_prime((old_capacity as u32).saturating_mul(2));
        tracing::debug!(
            "group table resize: {} -> {} slots ({} groups)",
            old_capacity,
            new_capacity,
            self.groups
        );

        let range = SlotRange::new(new_capacity);
        let mut slots: Vec<Option<GroupSlot<K>>> =
            std::iter::repeat_with(|| None).take(range.capacity()).collect();
        let mut order_head = NIL;
        let mut order_tail = NIL;

        let mut cursor = self.order_head;
        while cursor != NIL {
            let old = self.slots[cursor as usize].take().unwrap();
            cursor = old.order_next;

            let home = range.home_slot(old.hash);
            let target = if slots[home].is_none() {
                home
            } else {
                let mut idx = home;
                while slots[idx].as_ref().unwrap().probe_next != NIL {
                    idx = slots[idx].as_ref().unwrap().probe_next as usize;
                }
                let free = probe_free(&slots, range, home)?;
                slots[idx].as_mut().unwrap().probe_next = free as i32;
                free
            };

            slots[target] = Some(GroupSlot {
                hash: old.hash,
                key: old.key,
                head: old.head,
                tail: old.tail,
                probe_next: NIL,
                order_next: NIL,
            });
            if order_tail == NIL {
                order_head = target as i32;
            } else {
                slots[order_tail as usize].as_mut().unwrap().order_next = target as i32;
            }
            order_tail = target as i32;
        }

        self.slots = slots;
        self.range = range;
        self.order_head = order_head;
        self.order_tail = order_tail;
        Ok(())
    }
}

/// Walks one group's forward-linked value chain.
struct ValueChain<'a, V> {
    values: &'a [ValueNode<V>],
    cursor: i32,
}

impl<'a, V> Iterator for ValueChain<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        if self.cursor == NIL {
            return None;
        }
        let node = &self.values[self.cursor as usize];
        self.cursor = node.next;
        Some(&node.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_insertion_order() {
        let mut table = GroupTable::new();
        for n in [3, 1, 3, 2, 1] {
            table.add(n, n * 10).unwrap();
        }

        let groups = table.into_groups();
        let keys: Vec<i32> = groups.iter().map(|g| *g.key()).collect();
        assert_eq!(keys, vec![3, 1, 2]);
        assert_eq!(groups[0].values(), &[30, 30]);
        assert_eq!(groups[1].values(), &[10, 10]);
        assert_eq!(groups[2].values(), &[20]);
    }

    #[test]
    fn test_add_reports_new_vs_existing() {
        let mut table = GroupTable::new();
        assert!(table.add("a", 1).unwrap());
        assert!(!table.add("a", 2).unwrap());
        assert!(table.add("b", 3).unwrap());
        assert_eq!(table.group_count(), 2);
        assert_eq!(table.value_count(), 3);
    }

    #[test]
    fn test_find_and_values_of() {
        let mut table = GroupTable::new();
        table.add("x", 1).unwrap();
        table.add("y", 2).unwrap();
        table.add("x", 3).unwrap();

        let group = table.find(&"x").unwrap();
        let values: Vec<i32> = table.values_of(group).copied().collect();
        assert_eq!(values, vec![1, 3]);
        assert!(table.find(&"z").is_none());
    }

    #[test]
    fn test_resize_preserves_order_and_lookup() {
        let mut table = GroupTable::new();
        // Forces several resizes from the initial 7 slots.
        for n in 0u32..300 {
            table.add(n, n).unwrap();
        }
        for n in 0u32..300 {
            assert!(table.find(&n).is_some(), "lost key {n} across resizes");
        }
        let keys: Vec<u32> = table.groups().map(|(k, _)| *k).collect();
        assert_eq!(keys, (0..300).collect::<Vec<_>>());
    }

    #[test]
    fn test_matches_reference_grouping() {
        let data = [(1, 'a'), (7, 'b'), (1, 'c'), (3, 'd'), (7, 'e'), (1, 'f')];

        let mut ours = GroupTable::new();
        let mut reference: indexmap::IndexMap<i32, Vec<char>> = indexmap::IndexMap::new();
        for (k, v) in data {
            ours.add(k, v).unwrap();
            reference.entry(k).or_default().push(v);
        }

        let groups = ours.into_groups();
        assert_eq!(groups.len(), reference.len());
        for (group, (key, values)) in groups.iter().zip(reference.iter()) {
            assert_eq!(group.key(), key);
            assert_eq!(group.values(), values.as_slice());
        }
    }
}
