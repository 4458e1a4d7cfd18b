#![cfg(test)]

// Property tests for PhpArray kept inside the crate so the structural
// validator runs against the same build as the unit tests.

use crate::options::ArrayOptions;
use crate::php_array::PhpArray;
use proptest::prelude::*;
use std::hash::{BuildHasher, Hasher};

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, the pool shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i32),
    Unset(usize),
    Get(usize),
    Each,
    Reset,
    Clear,
    Snapshot,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z0-9]{0,4}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Put(i, v)),
            4 => idx.clone().prop_map(OpI::Unset),
            2 => idx.clone().prop_map(OpI::Get),
            2 => Just(OpI::Each),
            1 => Just(OpI::Reset),
            1 => Just(OpI::Clear),
            1 => Just(OpI::Snapshot),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

#[derive(Clone, Debug, PartialEq)]
enum ModelCursor {
    Head,
    At(String),
    Exhausted,
}

/// Insertion-ordered reference model.
#[derive(Default)]
struct Model {
    pairs: Vec<(String, i32)>,
}

impl Model {
    fn position(&self, k: &str) -> Option<usize> {
        self.pairs.iter().position(|(kk, _)| kk == k)
    }
}

fn run_scenario<S: BuildHasher>(
    mut sut: PhpArray<i32, S>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let initial = sut.capacity();
    let mut model = Model::default();
    let mut cursor = ModelCursor::Head;

    for op in ops {
        match op {
            OpI::Put(i, v) => {
                let k = &pool[i];
                let prev = sut.put(k.as_str(), v);
                match model.position(k) {
                    Some(p) => {
                        prop_assert_eq!(prev, Some(model.pairs[p].1));
                        model.pairs[p].1 = v;
                    }
                    None => {
                        prop_assert_eq!(prev, None);
                        model.pairs.push((k.clone(), v));
                        cursor = ModelCursor::Head;
                    }
                }
            }
            OpI::Unset(i) => {
                let k = &pool[i];
                let removed = sut.unset(k);
                match model.position(k) {
                    Some(p) => {
                        let (_, mv) = model.pairs.remove(p);
                        prop_assert_eq!(removed, Some(mv));
                        if cursor == ModelCursor::At(k.clone()) {
                            cursor = match model.pairs.get(p) {
                                Some((next, _)) => ModelCursor::At(next.clone()),
                                None => ModelCursor::Exhausted,
                            };
                        }
                    }
                    None => prop_assert_eq!(removed, None),
                }
            }
            OpI::Get(i) => {
                let k = &pool[i];
                let expected = model.position(k).map(|p| model.pairs[p].1);
                prop_assert_eq!(sut.get(k).copied(), expected);
                prop_assert_eq!(sut.contains_key(k), expected.is_some());
            }
            OpI::Each => {
                let pulled = sut.each().map(|(k, v)| (k.to_string(), *v));
                let at = match &cursor {
                    ModelCursor::Head => (!model.pairs.is_empty()).then_some(0),
                    ModelCursor::At(k) => model.position(k),
                    ModelCursor::Exhausted => None,
                };
                match at {
                    Some(p) => {
                        prop_assert_eq!(pulled, Some(model.pairs[p].clone()));
                        cursor = match model.pairs.get(p + 1) {
                            Some((next, _)) => ModelCursor::At(next.clone()),
                            None => ModelCursor::Exhausted,
                        };
                    }
                    None => prop_assert_eq!(pulled, None),
                }
            }
            OpI::Reset => {
                sut.reset();
                cursor = ModelCursor::Head;
            }
            OpI::Clear => {
                let cap = sut.capacity();
                sut.clear();
                prop_assert_eq!(sut.capacity(), cap);
                model.pairs.clear();
                cursor = ModelCursor::Head;
            }
            OpI::Snapshot => {
                let pairs: Vec<(String, i32)> = sut
                    .pairs()
                    .into_iter()
                    .map(|(k, v)| (k.into_string(), v))
                    .collect();
                prop_assert_eq!(&pairs, &model.pairs);
                let rev: Vec<i32> = sut.iter_values().rev().copied().collect();
                let model_rev: Vec<i32> = model.pairs.iter().rev().map(|(_, v)| *v).collect();
                prop_assert_eq!(rev, model_rev);
            }
        }

        // Post-conditions after each op.
        sut.debug_validate();
        prop_assert_eq!(sut.len(), model.pairs.len());
        prop_assert!(sut.capacity() >= initial);
        let keys: Vec<&str> = sut.iter_keys().map(|k| k.as_str()).collect();
        let model_keys: Vec<&str> = model.pairs.iter().map(|(k, _)| k.as_str()).collect();
        prop_assert_eq!(keys, model_keys);
    }
    Ok(())
}

// Property: state-machine equivalence against an insertion-ordered model.
// Invariants exercised across random operation sequences:
// - Order of first insertion survives updates, unsets and every resize.
// - `put` on an existing key returns the old value and keeps its position.
// - `unset` returns the removed value; absent keys are a no-op.
// - `each` follows the order, steps over unset entries and rewinds on insert.
// - Table/chain agreement and home-slot reachability after every step.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_scenario(PhpArray::new(), &pool, ops)?;
    }
}

// Collision variant: a constant hasher puts every key in one cluster, so
// every unset exercises cluster repair across the whole table.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Few distinct hashes: keys collide often but clusters interleave.
#[derive(Clone, Default)]
struct CoarseBuildHasher;
struct CoarseHasher(u64);
impl BuildHasher for CoarseBuildHasher {
    type Hasher = CoarseHasher;
    fn build_hasher(&self) -> Self::Hasher {
        CoarseHasher(0)
    }
}
impl Hasher for CoarseHasher {
    fn write(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.0 = self.0.wrapping_add(u64::from(*b));
        }
    }
    fn finish(&self) -> u64 {
        self.0 % 5
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_scenario(PhpArray::with_hasher(ConstBuildHasher), &pool, ops)?;
    }

    #[test]
    fn prop_state_machine_coarse_hash((pool, ops) in arb_scenario(), cap in 1usize..=16) {
        let sut = PhpArray::with_options_and_hasher(
            ArrayOptions::new().with_initial_capacity(cap),
            CoarseBuildHasher,
        );
        run_scenario(sut, &pool, ops)?;
    }
}
