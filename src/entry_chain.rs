//! EntryChain: generational arena of entries threaded in insertion order.
//!
//! Entries live in a `SlotMap`; `prev`/`next` are arena handles rather
//! than references, so unlinking is O(1) and a stale handle never resolves
//! to a later entry that reuses the same storage.

use crate::key::ArrayKey;
use crate::probe_table::Placement;
use slotmap::{DefaultKey, SlotMap};

#[derive(Clone, Debug)]
pub(crate) struct Entry<V> {
    pub(crate) key: ArrayKey,
    pub(crate) value: V,
    pub(crate) hash: u64,
    pub(crate) slot: usize,
    pub(crate) prev: Option<DefaultKey>,
    pub(crate) next: Option<DefaultKey>,
}

#[derive(Clone, Debug)]
pub(crate) struct EntryChain<V> {
    entries: SlotMap<DefaultKey, Entry<V>>,
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
}

impl<V> EntryChain<V> {
    pub(crate) fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
            head: None,
            tail: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn head(&self) -> Option<DefaultKey> {
        self.head
    }

    #[cfg(any(test, feature = "internal-debugging"))]
    pub(crate) fn tail(&self) -> Option<DefaultKey> {
        self.tail
    }

    pub(crate) fn get(&self, k: DefaultKey) -> Option<&Entry<V>> {
        self.entries.get(k)
    }

    pub(crate) fn get_mut(&mut self, k: DefaultKey) -> Option<&mut Entry<V>> {
        self.entries.get_mut(k)
    }

    pub(crate) fn key_is(&self, k: DefaultKey, key: &str) -> bool {
        self.entries
            .get(k)
            .map(|e| e.key.as_str() == key)
            .unwrap_or(false)
    }

    /// Append a new entry at the tail.
    pub(crate) fn push_back(&mut self, key: ArrayKey, value: V, hash: u64, slot: usize) -> DefaultKey {
        let prev = self.tail;
        let k = self.entries.insert(Entry {
            key,
            value,
            hash,
            slot,
            prev,
            next: None,
        });
        match prev {
            Some(p) => self.entries[p].next = Some(k),
            None => self.head = Some(k),
        }
        self.tail = Some(k);
        k
    }

    /// Splice `k` out of the chain and take it out of the arena. The
    /// returned entry has its links cleared.
    pub(crate) fn unlink(&mut self, k: DefaultKey) -> Option<Entry<V>> {
        let mut entry = self.entries.remove(k)?;
        match (entry.prev, entry.next) {
            (None, None) => {
                self.head = None;
                self.tail = None;
            }
            (None, Some(n)) => {
                self.entries[n].prev = None;
                self.head = Some(n);
            }
            (Some(p), None) => {
                self.entries[p].next = None;
                self.tail = Some(p);
            }
            (Some(p), Some(n)) => {
                self.entries[p].next = Some(n);
                self.entries[n].prev = Some(p);
            }
        }
        entry.prev = None;
        entry.next = None;
        Some(entry)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.head = None;
        self.tail = None;
    }

    pub(crate) fn iter(&self) -> Iter<'_, V> {
        Iter {
            entries: &self.entries,
            front: self.head,
            back: self.tail,
            remaining: self.entries.len(),
        }
    }

    pub(crate) fn into_ordered(self) -> IntoIter<V> {
        IntoIter {
            front: self.head,
            back: self.tail,
            entries: self.entries,
        }
    }
}

impl<V> Placement for EntryChain<V> {
    fn stored_hash(&self, k: DefaultKey) -> u64 {
        self.entries.get(k).map(|e| e.hash).unwrap_or(0)
    }

    fn set_slot(&mut self, k: DefaultKey, slot: usize) {
        if let Some(e) = self.entries.get_mut(k) {
            e.slot = slot;
        }
    }
}

/// Chain-order iterator over borrowed entries.
pub(crate) struct Iter<'a, V> {
    entries: &'a SlotMap<DefaultKey, Entry<V>>,
    front: Option<DefaultKey>,
    back: Option<DefaultKey>,
    remaining: usize,
}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Iter {
            entries: self.entries,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a Entry<V>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let e = self.entries.get(self.front?)?;
        self.front = e.next;
        self.remaining -= 1;
        Some(e)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> DoubleEndedIterator for Iter<'_, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let e = self.entries.get(self.back?)?;
        self.back = e.prev;
        self.remaining -= 1;
        Some(e)
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

/// Chain-order iterator that takes entries out of the arena.
pub(crate) struct IntoIter<V> {
    entries: SlotMap<DefaultKey, Entry<V>>,
    front: Option<DefaultKey>,
    back: Option<DefaultKey>,
}

impl<V> Iterator for IntoIter<V> {
    type Item = (ArrayKey, V);

    fn next(&mut self) -> Option<Self::Item> {
        let e = self.entries.remove(self.front?)?;
        self.front = e.next;
        if self.front.is_none() {
            self.back = None;
        }
        Some((e.key, e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.entries.len(), Some(self.entries.len()))
    }
}

impl<V> DoubleEndedIterator for IntoIter<V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let e = self.entries.remove(self.back?)?;
        self.back = e.prev;
        if self.back.is_none() {
            self.front = None;
        }
        Some((e.key, e.value))
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_of(keys: &[&str]) -> (EntryChain<i32>, Vec<DefaultKey>) {
        let mut c = EntryChain::new();
        let ks = keys
            .iter()
            .enumerate()
            .map(|(i, k)| c.push_back(ArrayKey::from(*k), i as i32, 0, i))
            .collect();
        (c, ks)
    }

    fn order(c: &EntryChain<i32>) -> Vec<&str> {
        c.iter().map(|e| e.key.as_str()).collect()
    }

    fn reverse_order(c: &EntryChain<i32>) -> Vec<&str> {
        c.iter().rev().map(|e| e.key.as_str()).collect()
    }

    /// Invariant: appends keep insertion order in both directions.
    #[test]
    fn push_back_preserves_order() {
        let (c, _) = chain_of(&["a", "b", "c"]);
        assert_eq!(order(&c), ["a", "b", "c"]);
        assert_eq!(reverse_order(&c), ["c", "b", "a"]);
        assert_eq!(c.iter().len(), 3);
    }

    /// Invariant: unlink handles singleton, head, tail and interior entries,
    /// and clears the removed entry's links.
    #[test]
    fn unlink_all_positions() {
        let (mut c, ks) = chain_of(&["only"]);
        let e = c.unlink(ks[0]).unwrap();
        assert!(e.prev.is_none() && e.next.is_none());
        assert!(c.head().is_none() && c.tail().is_none());

        let (mut c, ks) = chain_of(&["a", "b", "c", "d"]);
        let interior = c.unlink(ks[2]).unwrap();
        assert!(interior.prev.is_none() && interior.next.is_none());
        assert_eq!(order(&c), ["a", "b", "d"]);
        assert_eq!(reverse_order(&c), ["d", "b", "a"]);

        c.unlink(ks[0]).unwrap();
        assert_eq!(c.head(), Some(ks[1]));
        assert_eq!(order(&c), ["b", "d"]);

        c.unlink(ks[3]).unwrap();
        assert_eq!(c.tail(), Some(ks[1]));
        assert_eq!(order(&c), ["b"]);
        assert_eq!(reverse_order(&c), ["b"]);
    }

    /// Invariant: a removed handle never resolves, even after its storage
    /// is reused by a later append.
    #[test]
    fn stale_handle_does_not_alias() {
        let (mut c, ks) = chain_of(&["old"]);
        c.unlink(ks[0]).unwrap();
        let fresh = c.push_back(ArrayKey::from("new"), 9, 0, 0);
        assert_ne!(ks[0], fresh);
        assert!(c.get(ks[0]).is_none());
        assert!(c.unlink(ks[0]).is_none());
        assert_eq!(order(&c), ["new"]);
    }

    /// Invariant: owned iteration yields pairs in chain order from either end.
    #[test]
    fn into_ordered_both_ends() {
        let (c, _) = chain_of(&["a", "b", "c"]);
        let mut it = c.into_ordered();
        assert_eq!(it.len(), 3);
        assert_eq!(it.next().map(|(k, v)| (k.into_string(), v)), Some(("a".into(), 0)));
        assert_eq!(it.next_back().map(|(k, v)| (k.into_string(), v)), Some(("c".into(), 2)));
        assert_eq!(it.next().map(|(k, v)| (k.into_string(), v)), Some(("b".into(), 1)));
        assert!(it.next().is_none());
        assert!(it.next_back().is_none());
    }

    #[test]
    fn placement_updates_slot() {
        let (mut c, ks) = chain_of(&["a"]);
        c.set_slot(ks[0], 7);
        assert_eq!(c.get(ks[0]).unwrap().slot, 7);
        assert_eq!(c.stored_hash(ks[0]), 0);
    }
}
