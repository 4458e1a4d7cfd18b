//! Pull-style cursor behind `each`/`reset`.
//!
//! Kept apart from the borrowing iterators: it only stores a position in
//! the entry chain, so bulk iteration never disturbs it and it survives
//! across calls that mutate the array.

use crate::entry_chain::{Entry, EntryChain};
use slotmap::DefaultKey;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum Cursor {
    /// Next pull yields whatever is at the head at that moment.
    #[default]
    Head,
    /// Next pull yields this entry.
    At(DefaultKey),
    Exhausted,
}

impl Cursor {
    pub(crate) fn reset(&mut self) {
        *self = Cursor::Head;
    }

    fn position<V>(&self, chain: &EntryChain<V>) -> Option<DefaultKey> {
        match *self {
            Cursor::Head => chain.head(),
            Cursor::At(k) => Some(k),
            Cursor::Exhausted => None,
        }
    }

    /// Yield the entry under the cursor and step past it.
    pub(crate) fn advance<'a, V>(&mut self, chain: &'a EntryChain<V>) -> Option<&'a Entry<V>> {
        let Some(e) = self.position(chain).and_then(|k| chain.get(k)) else {
            if *self != Cursor::Head {
                *self = Cursor::Exhausted;
            }
            return None;
        };
        *self = e.next.map_or(Cursor::Exhausted, Cursor::At);
        Some(e)
    }

    /// Keep the cursor valid when `removed` leaves the chain.
    pub(crate) fn on_unlink(&mut self, removed: DefaultKey, successor: Option<DefaultKey>) {
        if *self == Cursor::At(removed) {
            *self = successor.map_or(Cursor::Exhausted, Cursor::At);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::ArrayKey;

    fn chain_of(keys: &[&str]) -> (EntryChain<i32>, Vec<DefaultKey>) {
        let mut c = EntryChain::new();
        let ks = keys
            .iter()
            .enumerate()
            .map(|(i, k)| c.push_back(ArrayKey::from(*k), i as i32, 0, i))
            .collect();
        (c, ks)
    }

    fn drain(cur: &mut Cursor, c: &EntryChain<i32>) -> Vec<String> {
        std::iter::from_fn(|| cur.advance(c).map(|e| e.key.to_string())).collect()
    }

    /// Invariant: pulls follow chain order, then report exhaustion until reset.
    #[test]
    fn pulls_in_order_then_exhausts() {
        let (c, _) = chain_of(&["a", "b"]);
        let mut cur = Cursor::default();
        assert_eq!(drain(&mut cur, &c), ["a", "b"]);
        assert_eq!(cur, Cursor::Exhausted);
        assert!(cur.advance(&c).is_none());
        cur.reset();
        assert_eq!(drain(&mut cur, &c), ["a", "b"]);
    }

    /// Invariant: a cursor at the head of an empty chain picks up entries
    /// appended later.
    #[test]
    fn head_is_resolved_lazily() {
        let mut c: EntryChain<i32> = EntryChain::new();
        let mut cur = Cursor::default();
        assert!(cur.advance(&c).is_none());
        assert_eq!(cur, Cursor::Head);
        c.push_back(ArrayKey::from("late"), 1, 0, 0);
        assert_eq!(drain(&mut cur, &c), ["late"]);
    }

    /// Invariant: removing the entry under the cursor moves it to the successor.
    #[test]
    fn unlink_under_cursor_advances() {
        let (mut c, ks) = chain_of(&["a", "b", "c"]);
        let mut cur = Cursor::default();
        cur.advance(&c).unwrap();
        assert_eq!(cur, Cursor::At(ks[1]));

        let succ = c.get(ks[1]).unwrap().next;
        c.unlink(ks[1]).unwrap();
        cur.on_unlink(ks[1], succ);
        assert_eq!(drain(&mut cur, &c), ["c"]);

        // Unrelated removals leave the position alone.
        cur.reset();
        cur.on_unlink(ks[2], None);
        assert_eq!(cur, Cursor::Head);
    }
}
