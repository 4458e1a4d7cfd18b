//! PhpArray: insertion-ordered map over a linear-probing table.
//!
//! Every mutation touches the probe table and the entry chain before it
//! returns; reads go through the table only and iteration walks the chain
//! only.

use crate::cursor::Cursor;
use crate::entry_chain::{self, EntryChain};
use crate::error::ArrayError;
use crate::key::{ArrayKey, AsArrayKey};
use crate::options::ArrayOptions;
use crate::probe_table::ProbeTable;
use core::fmt;
use core::hash::BuildHasher;
use core::ops::Index;
use hashbrown::hash_map::DefaultHashBuilder;
use log::debug;
use slotmap::DefaultKey;

/// Ordered map from string (or stringified integer) keys to `V`.
#[derive(Clone)]
pub struct PhpArray<V, S = DefaultHashBuilder> {
    hasher: S,
    table: ProbeTable,
    chain: EntryChain<V>,
    cursor: Cursor,
    options: ArrayOptions,
}

impl<V> PhpArray<V> {
    pub fn new() -> Self {
        Self::with_options(ArrayOptions::default())
    }

    /// Create an array whose table starts (and never shrinks below)
    /// `capacity` slots. A zero capacity is treated as 1.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_options(ArrayOptions::default().with_initial_capacity(capacity))
    }

    pub fn with_options(options: ArrayOptions) -> Self {
        Self::with_options_and_hasher(options, DefaultHashBuilder::default())
    }

    pub fn try_with_options(options: ArrayOptions) -> Result<Self, ArrayError> {
        options.validate()?;
        Ok(Self::with_options(options))
    }
}

impl<V> Default for PhpArray<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Borrowing iterator over `(key, value)` in insertion order.
pub struct Iter<'a, V> {
    it: entry_chain::Iter<'a, V>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a ArrayKey, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|e| (&e.key, &e.value))
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<V> DoubleEndedIterator for Iter<'_, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.it.next_back().map(|e| (&e.key, &e.value))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

/// Borrowing iterator over keys in insertion order.
pub struct Keys<'a, V> {
    it: entry_chain::Iter<'a, V>,
}

impl<'a, V> Iterator for Keys<'a, V> {
    type Item = &'a ArrayKey;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|e| &e.key)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<V> DoubleEndedIterator for Keys<'_, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.it.next_back().map(|e| &e.key)
    }
}

impl<V> ExactSizeIterator for Keys<'_, V> {}

/// Borrowing iterator over values in insertion order. This is what
/// `for v in &array` walks.
pub struct Values<'a, V> {
    it: entry_chain::Iter<'a, V>,
}

impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|e| &e.value)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<V> DoubleEndedIterator for Values<'_, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.it.next_back().map(|e| &e.value)
    }
}

impl<V> ExactSizeIterator for Values<'_, V> {}

/// Owning iterator over `(key, value)` in insertion order.
pub struct IntoIter<V> {
    it: entry_chain::IntoIter<V>,
}

impl<V> Iterator for IntoIter<V> {
    type Item = (ArrayKey, V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next()
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<V> DoubleEndedIterator for IntoIter<V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.it.next_back()
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}

impl<V, S> PhpArray<V, S>
where
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_options_and_hasher(ArrayOptions::default(), hasher)
    }

    pub fn with_options_and_hasher(options: ArrayOptions, hasher: S) -> Self {
        let options = options.clamped();
        Self {
            hasher,
            table: ProbeTable::new(options.initial_capacity()),
            chain: EntryChain::new(),
            cursor: Cursor::default(),
            options,
        }
    }

    fn make_hash(&self, key: &str) -> u64 {
        self.hasher.hash_one(key)
    }

    /// Slot and arena handle of `key`, if present.
    fn locate(&self, key: &str) -> Option<(usize, DefaultKey)> {
        let chain = &self.chain;
        let slot = self
            .table
            .find(self.make_hash(key), |k| chain.key_is(k, key))?;
        Some((slot, self.table.get(slot)?))
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current number of table slots.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn options(&self) -> &ArrayOptions {
        &self.options
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Insert `value` under `key`, or replace the value of an existing key
    /// in place. Returns the replaced value.
    ///
    /// A new key is appended to the end of the order, may grow the table,
    /// and (by default) rewinds the `each` cursor. Updating an existing key
    /// changes neither its position nor the cursor.
    ///
    /// The load check runs only once the key is known to be new, so an
    /// update never resizes, even on a table already at half load. PHP's
    /// own array grows before probing and can resize on an update; the two
    /// differ only in `capacity()`.
    pub fn put<K: Into<ArrayKey>>(&mut self, key: K, value: V) -> Option<V> {
        let key = key.into();
        let hash = self.make_hash(key.as_str());

        let chain = &self.chain;
        if let Ok(slot) = self
            .table
            .find_or_find_vacant(hash, |k| chain.key_is(k, key.as_str()))
        {
            let k = self.table.get(slot)?;
            let e = self.chain.get_mut(k)?;
            return Some(core::mem::replace(&mut e.value, value));
        }

        if self.len() >= self.capacity() / 2 {
            self.resize(self.capacity() * 2);
        }
        let slot = self.table.first_vacant(hash);
        let k = self.chain.push_back(key, value, hash, slot);
        self.table.occupy(slot, k);
        if self.options.reset_cursor_on_insert() {
            self.cursor.reset();
        }
        None
    }

    /// `put` for `Some`, `unset` for `None`: assigning "nothing" to a key
    /// deletes it.
    pub fn assign<K: Into<ArrayKey>>(&mut self, key: K, value: Option<V>) -> Option<V> {
        match value {
            Some(v) => self.put(key, v),
            None => {
                let key: ArrayKey = key.into();
                self.unset(&key)
            }
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: AsArrayKey + ?Sized,
    {
        let (_, k) = self.locate(&key.as_array_key())?;
        self.chain.get(k).map(|e| &e.value)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        Q: AsArrayKey + ?Sized,
    {
        let (_, k) = self.locate(&key.as_array_key())?;
        self.chain.get_mut(k).map(|e| &mut e.value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: AsArrayKey + ?Sized,
    {
        self.locate(&key.as_array_key()).is_some()
    }

    /// Remove `key` and return its value. Absent keys are a no-op.
    ///
    /// The entries following the vacated slot in its cluster are re-probed
    /// so every remaining key stays reachable from its home slot.
    pub fn unset<Q>(&mut self, key: &Q) -> Option<V>
    where
        Q: AsArrayKey + ?Sized,
    {
        let (slot, k) = self.locate(&key.as_array_key())?;
        let successor = self.chain.get(k).and_then(|e| e.next);
        self.table.vacate(slot);
        let entry = self.chain.unlink(k)?;
        self.cursor.on_unlink(k, successor);
        self.table.repair_cluster(slot, &mut self.chain);

        let n = self.len();
        let m = self.capacity();
        if n > 0 && n <= m / 8 && m / 2 >= self.options.initial_capacity() {
            self.resize(m / 2);
        }
        Some(entry.value)
    }

    /// Re-place every entry into a fresh table of `capacity` slots, walking
    /// the chain so placement follows insertion order. The chain and its
    /// handles are untouched.
    fn resize(&mut self, capacity: usize) {
        debug!(
            "resizing table from {} to {} slots with {} live entries",
            self.capacity(),
            capacity,
            self.len()
        );
        let mut table = ProbeTable::new(capacity);
        let mut cur = self.chain.head();
        while let Some(k) = cur {
            let Some(e) = self.chain.get_mut(k) else {
                break;
            };
            let slot = table.first_vacant(e.hash);
            table.occupy(slot, k);
            e.slot = slot;
            cur = e.next;
        }
        self.table = table;
    }

    /// Remove every entry; the table keeps its current capacity.
    pub fn clear(&mut self) {
        self.table.clear();
        self.chain.clear();
        self.cursor.reset();
    }

    /// Take every entry out in insertion order, leaving the array empty with
    /// its current capacity.
    pub fn drain(&mut self) -> IntoIter<V> {
        self.table.clear();
        self.cursor.reset();
        let chain = core::mem::replace(&mut self.chain, EntryChain::new());
        IntoIter {
            it: chain.into_ordered(),
        }
    }

    /// Pull the pair under the cursor and advance. `None` once past the last
    /// entry, until `reset`.
    pub fn each(&mut self) -> Option<(&ArrayKey, &V)> {
        self.cursor
            .advance(&self.chain)
            .map(|e| (&e.key, &e.value))
    }

    /// Rewind the `each` cursor to the first entry.
    pub fn reset(&mut self) {
        self.cursor.reset();
    }

    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            it: self.chain.iter(),
        }
    }

    pub fn iter_keys(&self) -> Keys<'_, V> {
        Keys {
            it: self.chain.iter(),
        }
    }

    pub fn iter_values(&self) -> Values<'_, V> {
        Values {
            it: self.chain.iter(),
        }
    }

    /// Visit every entry in order with mutable access to its value.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&ArrayKey, &mut V)) {
        let mut cur = self.chain.head();
        while let Some(e) = cur.and_then(|k| self.chain.get_mut(k)) {
            f(&e.key, &mut e.value);
            cur = e.next;
        }
    }

    /// Keys in insertion order, detached from the array.
    pub fn keys(&self) -> Vec<ArrayKey> {
        self.iter_keys().cloned().collect()
    }

    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.iter_values().cloned().collect()
    }

    pub fn pairs(&self) -> Vec<(ArrayKey, V)>
    where
        V: Clone,
    {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Assert the structural invariants: every slot is reachable from its
    /// home, the chain and table agree, and the load stays below capacity.
    #[cfg(any(test, feature = "internal-debugging"))]
    #[doc(hidden)]
    pub fn debug_validate(&self) {
        let m = self.capacity();
        let n = self.len();
        assert!(n < m, "live count {n} must stay below capacity {m}");
        assert!(m >= self.options.initial_capacity());

        let mut occupied = 0;
        for (slot, k) in self.table.occupied() {
            occupied += 1;
            let e = self.chain.get(k).expect("slot refers to a live entry");
            assert_eq!(e.slot, slot, "entry slot record out of date");
            assert_eq!(e.hash, self.make_hash(e.key.as_str()));
            assert!(
                self.table.reachable(e.hash, slot),
                "key {:?} unreachable from its home slot",
                e.key
            );
        }
        assert_eq!(occupied, n, "table and chain disagree on size");

        let mut prev = None;
        let mut walked = 0;
        let mut cur = self.chain.head();
        while let Some(k) = cur {
            let e = self.chain.get(k).expect("chain link refers to a live entry");
            assert_eq!(e.prev, prev, "broken back link");
            assert_eq!(self.table.get(e.slot), Some(k));
            assert_eq!(self.locate(e.key.as_str()).map(|(_, h)| h), Some(k));
            prev = Some(k);
            cur = e.next;
            walked += 1;
            assert!(walked <= n, "cycle in entry chain");
        }
        assert_eq!(walked, n);
        assert_eq!(self.chain.tail(), prev);
    }
}

impl<V, S> PartialEq for PhpArray<V, S>
where
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<V, S> Eq for PhpArray<V, S>
where
    V: Eq,
    S: BuildHasher,
{
}

impl<V, S> fmt::Debug for PhpArray<V, S>
where
    V: fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V, S, Q> Index<&Q> for PhpArray<V, S>
where
    S: BuildHasher,
    Q: AsArrayKey + ?Sized,
{
    type Output = V;

    /// Panics if the key is absent.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("key not present in PhpArray")
    }
}

impl<K, V, S> FromIterator<(K, V)> for PhpArray<V, S>
where
    K: Into<ArrayKey>,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut a = Self::with_hasher(S::default());
        a.extend(iter);
        a
    }
}

impl<K, V, S> Extend<(K, V)> for PhpArray<V, S>
where
    K: Into<ArrayKey>,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<'a, V, S> IntoIterator for &'a PhpArray<V, S>
where
    S: BuildHasher,
{
    type Item = &'a V;
    type IntoIter = Values<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_values()
    }
}

impl<V, S> IntoIterator for PhpArray<V, S> {
    type Item = (ArrayKey, V);
    type IntoIter = IntoIter<V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            it: self.chain.into_ordered(),
        }
    }
}
