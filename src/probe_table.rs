//! ProbeTable: open addressing with linear probing and no tombstones.
//!
//! Slots hold arena handles into the entry chain; the table itself never
//! sees keys or values. Callers supply an equality closure while probing,
//! and a [`Placement`] to read stored hashes and record slot moves when a
//! cluster is repaired.

use log::trace;
use slotmap::DefaultKey;

/// Access to per-entry bookkeeping the table needs but does not own.
pub(crate) trait Placement {
    /// Hash computed for the entry when it was inserted.
    fn stored_hash(&self, k: DefaultKey) -> u64;
    /// Record that the entry now lives at `slot`.
    fn set_slot(&mut self, k: DefaultKey, slot: usize);
}

#[derive(Clone, Debug)]
pub(crate) struct ProbeTable {
    slots: Vec<Option<DefaultKey>>,
}

impl ProbeTable {
    pub(crate) fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "probe table needs at least one slot");
        Self {
            slots: vec![None; capacity],
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Home slot of `hash`; the hash is treated as unsigned before reduction.
    #[inline]
    pub(crate) fn home(&self, hash: u64) -> usize {
        (hash % self.slots.len() as u64) as usize
    }

    #[inline]
    fn next(&self, i: usize) -> usize {
        (i + 1) % self.slots.len()
    }

    pub(crate) fn get(&self, i: usize) -> Option<DefaultKey> {
        self.slots.get(i).copied().flatten()
    }

    /// Walk from the home slot of `hash`. `Ok(i)` when `eq` accepts the
    /// occupant of slot `i`, `Err(i)` with the first empty slot otherwise.
    pub(crate) fn find_or_find_vacant<F>(&self, hash: u64, mut eq: F) -> Result<usize, usize>
    where
        F: FnMut(DefaultKey) -> bool,
    {
        let mut i = self.home(hash);
        for _ in 0..self.slots.len() {
            match self.slots[i] {
                None => return Err(i),
                Some(k) if eq(k) => return Ok(i),
                Some(_) => i = self.next(i),
            }
        }
        unreachable!("probe table is full: live count must stay below capacity")
    }

    pub(crate) fn find<F>(&self, hash: u64, eq: F) -> Option<usize>
    where
        F: FnMut(DefaultKey) -> bool,
    {
        self.find_or_find_vacant(hash, eq).ok()
    }

    pub(crate) fn first_vacant(&self, hash: u64) -> usize {
        match self.find_or_find_vacant(hash, |_| false) {
            Ok(i) | Err(i) => i,
        }
    }

    pub(crate) fn occupy(&mut self, i: usize, k: DefaultKey) {
        debug_assert!(self.slots[i].is_none(), "slot {i} already occupied");
        self.slots[i] = Some(k);
    }

    pub(crate) fn vacate(&mut self, i: usize) -> Option<DefaultKey> {
        self.slots.get_mut(i).and_then(Option::take)
    }

    /// Close the hole left at `hole` by re-probing every entry of the
    /// cluster that follows it. Stops at the first empty slot.
    pub(crate) fn repair_cluster<P: Placement>(&mut self, hole: usize, placement: &mut P) {
        debug_assert!(self.slots[hole].is_none());
        let mut j = self.next(hole);
        while let Some(k) = self.slots[j].take() {
            let to = self.first_vacant(placement.stored_hash(k));
            self.slots[to] = Some(k);
            if to != j {
                trace!("cluster repair moved entry from slot {j} to slot {to}");
                placement.set_slot(k, to);
            }
            j = self.next(j);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.slots.fill(None);
    }

    #[cfg(any(test, feature = "internal-debugging"))]
    pub(crate) fn occupied(&self) -> impl Iterator<Item = (usize, DefaultKey)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.map(|k| (i, k)))
    }

    /// True when every slot from the home of `hash` up to `slot` is occupied.
    #[cfg(any(test, feature = "internal-debugging"))]
    pub(crate) fn reachable(&self, hash: u64, slot: usize) -> bool {
        let mut i = self.home(hash);
        loop {
            if self.slots[i].is_none() {
                return false;
            }
            if i == slot {
                return true;
            }
            i = self.next(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    /// Arena of (hash, slot) records standing in for the entry chain.
    struct Records(SlotMap<DefaultKey, (u64, usize)>);

    impl Placement for Records {
        fn stored_hash(&self, k: DefaultKey) -> u64 {
            self.0[k].0
        }
        fn set_slot(&mut self, k: DefaultKey, slot: usize) {
            self.0[k].1 = slot;
        }
    }

    fn place(t: &mut ProbeTable, r: &mut Records, hash: u64) -> DefaultKey {
        let slot = t.first_vacant(hash);
        let k = r.0.insert((hash, slot));
        t.occupy(slot, k);
        k
    }

    /// Invariant: home slots reduce the full unsigned hash modulo capacity.
    #[test]
    fn home_is_unsigned_modulo() {
        let t = ProbeTable::new(8);
        assert_eq!(t.home(13), 5);
        assert_eq!(t.home(u64::MAX), (u64::MAX % 8) as usize);
    }

    /// Invariant: colliding hashes occupy consecutive slots with wraparound,
    /// and a probe stops at the first empty slot.
    #[test]
    fn linear_probe_wraps() {
        let mut t = ProbeTable::new(4);
        let mut r = Records(SlotMap::new());
        let a = place(&mut t, &mut r, 3);
        let b = place(&mut t, &mut r, 3);
        assert_eq!(t.get(3), Some(a));
        assert_eq!(t.get(0), Some(b));
        assert_eq!(t.find(3, |k| k == b), Some(0));
        assert_eq!(t.find_or_find_vacant(3, |_| false), Err(1));
    }

    /// Invariant: after vacating a slot inside a cluster, every later member
    /// is still reachable from its home and slot records follow the moves.
    #[test]
    fn repair_cluster_closes_hole() {
        let mut t = ProbeTable::new(8);
        let mut r = Records(SlotMap::new());
        let a = place(&mut t, &mut r, 1); // slot 1
        let b = place(&mut t, &mut r, 1); // slot 2
        let c = place(&mut t, &mut r, 2); // slot 3
        let d = place(&mut t, &mut r, 1); // slot 4
        let e = place(&mut t, &mut r, 6); // slot 6, separate cluster

        let hole = t.find(1, |k| k == b).unwrap();
        assert_eq!(t.vacate(hole), Some(b));
        r.0.remove(b);
        t.repair_cluster(hole, &mut r);

        for k in [a, c, d, e] {
            let (hash, slot) = r.0[k];
            assert_eq!(t.get(slot), Some(k));
            assert!(t.reachable(hash, slot));
        }
        assert_eq!(r.0[c].1, 2);
        assert_eq!(r.0[d].1, 3);
        assert_eq!(r.0[e].1, 6);
        assert_eq!(t.occupied().count(), 4);
    }

    /// Invariant: repair wraps past the end of the table.
    #[test]
    fn repair_cluster_wraps() {
        let mut t = ProbeTable::new(4);
        let mut r = Records(SlotMap::new());
        let a = place(&mut t, &mut r, 2); // slot 2
        let b = place(&mut t, &mut r, 2); // slot 3
        let c = place(&mut t, &mut r, 3); // slot 0
        let hole = t.find(2, |k| k == a).unwrap();
        t.vacate(hole);
        r.0.remove(a);
        t.repair_cluster(hole, &mut r);
        assert_eq!(t.get(2), Some(b));
        assert_eq!(t.get(3), Some(c));
        assert_eq!(t.get(0), None);
    }

    #[test]
    fn clear_empties_every_slot() {
        let mut t = ProbeTable::new(4);
        let mut r = Records(SlotMap::new());
        place(&mut t, &mut r, 0);
        place(&mut t, &mut r, 1);
        t.clear();
        assert_eq!(t.occupied().count(), 0);
        assert_eq!(t.capacity(), 4);
    }
}
