//! Whole-array operations built on the public contract only: ordered
//! iteration, `drain`/`clear`, and `put`.
//!
//! Each operation states the capability it needs from `V` as a trait bound.
//! Operations that rebuild the array in place go through `drain` + `put`,
//! so they also rewind the `each` cursor.

use crate::error::ArrayError;
use crate::key::ArrayKey;
use crate::options::ArrayOptions;
use crate::php_array::PhpArray;
use core::cmp::Ordering;
use core::hash::BuildHasher;
use rand::seq::SliceRandom;
use rand::Rng;

/// Values usable by `sum` and `product`.
pub trait Numeric {
    fn to_f64(&self) -> f64;
}

macro_rules! numeric {
    ($($t:ty),*) => {
        $(
            impl Numeric for $t {
                #[inline]
                fn to_f64(&self) -> f64 {
                    *self as f64
                }
            }
        )*
    };
}

numeric!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl<T: Numeric + ?Sized> Numeric for &T {
    fn to_f64(&self) -> f64 {
        (**self).to_f64()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyCase {
    Upper,
    Lower,
}

impl KeyCase {
    pub fn apply(self, key: &str) -> String {
        match self {
            KeyCase::Upper => key.to_uppercase(),
            KeyCase::Lower => key.to_lowercase(),
        }
    }
}

/// Stable bottom-up merge sort of `order` under a comparator that may fail.
///
/// Stops at the first pair `cmp` cannot order. A sorted result is then
/// checked link by link, so for a transitive partial order `Ok` means every
/// pair of values is comparable.
fn try_merge_sort<F>(order: &mut [usize], mut cmp: F) -> Result<(), (usize, usize)>
where
    F: FnMut(usize, usize) -> Option<Ordering>,
{
    let n = order.len();
    let mut buf = order.to_vec();
    let mut width = 1;
    while width < n {
        let mut lo = 0;
        while lo < n {
            let mid = (lo + width).min(n);
            let hi = (lo + 2 * width).min(n);
            let (mut i, mut j) = (lo, mid);
            for out in &mut buf[lo..hi] {
                let take_left = if i == mid {
                    false
                } else if j == hi {
                    true
                } else {
                    let (a, b) = (order[i], order[j]);
                    cmp(a, b).ok_or((a, b))? != Ordering::Greater
                };
                if take_left {
                    *out = order[i];
                    i += 1;
                } else {
                    *out = order[j];
                    j += 1;
                }
            }
            lo = hi;
        }
        order.copy_from_slice(&buf);
        width *= 2;
    }

    for w in order.windows(2) {
        match cmp(w[0], w[1]) {
            Some(Ordering::Less | Ordering::Equal) => {}
            _ => return Err((w[0], w[1])),
        }
    }
    Ok(())
}

impl<V, S> PhpArray<V, S>
where
    S: BuildHasher,
{
    pub fn sum(&self) -> f64
    where
        V: Numeric,
    {
        self.iter_values().map(Numeric::to_f64).sum()
    }

    pub fn product(&self) -> f64
    where
        V: Numeric,
    {
        self.iter_values().map(Numeric::to_f64).product()
    }

    /// Fold every key to one case. When two keys fold to the same spelling
    /// the later value wins, at the position of the earlier key.
    pub fn change_key_case(&mut self, case: KeyCase) {
        let pairs: Vec<_> = self.drain().collect();
        for (k, v) in pairs {
            self.put(case.apply(k.as_str()), v);
        }
    }

    /// Values become keys and keys become values. Later duplicates
    /// overwrite earlier ones.
    pub fn flip(&self) -> PhpArray<ArrayKey>
    where
        V: AsRef<str>,
    {
        let mut flipped =
            PhpArray::with_options(ArrayOptions::new().with_initial_capacity(self.capacity()));
        for (k, v) in self.iter() {
            flipped.put(AsRef::<str>::as_ref(v), k.clone());
        }
        flipped
    }

    /// Same pairs, last entry first.
    pub fn reversed(&self) -> PhpArray<V>
    where
        V: Clone,
    {
        let mut rev =
            PhpArray::with_options(ArrayOptions::new().with_initial_capacity(self.capacity()));
        for (k, v) in self.iter().rev() {
            rev.put(k.clone(), v.clone());
        }
        rev
    }

    /// Stable order of positions by value, or the first pair of keys whose
    /// values cannot be compared.
    fn value_order(&self) -> Result<Vec<usize>, ArrayError>
    where
        V: PartialOrd,
    {
        let values: Vec<&V> = self.iter_values().collect();
        let key_at = |i: usize| self.iter_keys().nth(i).cloned().unwrap_or_default();

        // Self-incomparable values (NaN) are reported against themselves.
        if let Some(i) = values.iter().position(|v| v.partial_cmp(v).is_none()) {
            return Err(ArrayError::Incomparable {
                left: key_at(i),
                right: key_at(i),
            });
        }

        let mut order: Vec<usize> = (0..values.len()).collect();
        try_merge_sort(&mut order, |a, b| values[a].partial_cmp(values[b])).map_err(
            |(a, b)| ArrayError::Incomparable {
                left: key_at(a),
                right: key_at(b),
            },
        )?;
        Ok(order)
    }

    /// Rebuild the array from `order`, a permutation of current positions,
    /// naming each entry with `rekey(new_position, old_key)`.
    fn rebuild<F>(&mut self, order: Vec<usize>, mut rekey: F)
    where
        F: FnMut(usize, ArrayKey) -> ArrayKey,
    {
        let mut taken: Vec<Option<(ArrayKey, V)>> = self.drain().map(Some).collect();
        for (n, i) in order.into_iter().enumerate() {
            if let Some((k, v)) = taken.get_mut(i).and_then(Option::take) {
                self.put(rekey(n, k), v);
            }
        }
    }

    /// Stable sort by value; keys are renumbered `0..len`. The array is left
    /// untouched if two values cannot be ordered.
    pub fn sort(&mut self) -> Result<(), ArrayError>
    where
        V: PartialOrd,
    {
        let order = self.value_order()?;
        self.rebuild(order, |n, _| ArrayKey::from(n));
        Ok(())
    }

    /// Stable sort by value keeping each value's key.
    pub fn asort(&mut self) -> Result<(), ArrayError>
    where
        V: PartialOrd,
    {
        let order = self.value_order()?;
        self.rebuild(order, |_, k| k);
        Ok(())
    }

    /// Randomly permute the order, keeping keys.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.shuffle(rng);
        self.rebuild(order, |_, k| k);
    }

    /// Pairs of `self` whose key is missing from `other` or maps to a
    /// different value there, in `self`'s order.
    pub fn diff_assoc<S2>(&self, other: &PhpArray<V, S2>) -> Vec<(ArrayKey, V)>
    where
        V: PartialEq + Clone,
        S2: BuildHasher,
    {
        self.iter()
            .filter(|(k, v)| other.get(*k) != Some(*v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}
