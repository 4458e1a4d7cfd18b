//! php-array: an insertion-ordered map with PHP array semantics.
//!
//! Keys are strings; integer keys are stringified, so `5` and `"5"` name
//! the same entry. Lookups are O(1) on average through a linear-probing
//! table, and iteration follows first-insertion order through a
//! doubly-linked chain threaded over the same entries.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep the hash index and the order independent so each can be
//!   reasoned about on its own, and compose them in one owner.
//! - Layers:
//!   - ProbeTable: slot vector of arena handles. Open addressing with linear
//!     probing, no tombstones. Never sees keys or values.
//!   - EntryChain: `SlotMap` arena of entries plus head/tail; `prev`/`next`
//!     are generational handles, so unlink is O(1) and stale handles never
//!     alias a newer entry.
//!   - Cursor: the `each`/`reset` position, separate from the borrowing
//!     iterators.
//!   - PhpArray<V, S>: the public container; every mutation leaves table
//!     and chain consistent before returning.
//!
//! Constraints
//! - Single-threaded; no internal locking.
//! - Live count stays strictly below the table size: an insert doubles the
//!   table once `len >= capacity / 2`, an unset halves it once
//!   `len <= capacity / 8`, never below the initial capacity.
//! - Re-putting an existing key replaces its value in place; it neither
//!   moves in the order nor resizes the table.
//!
//! Deletion without tombstones
//! - Vacating a slot can cut the probe path of every later member of its
//!   cluster. After an unset, each entry following the hole up to the next
//!   empty slot is taken out and re-probed from its home slot.
//!
//! Hasher and rehashing invariants
//! - Each entry stores the hash computed at insert; resizes and cluster
//!   repair reuse it and never rehash the key.
//! - Resizes walk the chain, so entries are re-placed in insertion order;
//!   the chain and its handles are untouched, which keeps the cursor valid.
//!
//! Notes
//! - There is no null value. `assign(key, None)` deletes the key, which is
//!   the typed form of assigning null in PHP; `put` never deletes.
//! - By default inserting a new key rewinds the `each` cursor, as PHP does;
//!   `ArrayOptions::with_reset_cursor_on_insert(false)` turns that off.
//! - Whole-array operations (`sort`, `sum`, `flip`, ...) live in `bulk` and
//!   only use the public API.

pub mod bulk;
mod cursor;
mod entry_chain;
mod error;
mod key;
mod options;
mod php_array;
mod php_array_proptest;
mod probe_table;

// Public surface
pub use bulk::{KeyCase, Numeric};
pub use error::ArrayError;
pub use key::{ArrayKey, AsArrayKey};
pub use options::{ArrayOptions, DEFAULT_INITIAL_CAPACITY};
pub use php_array::{IntoIter, Iter, Keys, PhpArray, Values};
