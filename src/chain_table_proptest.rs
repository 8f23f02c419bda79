#![cfg(test)]

// Property tests for ChainTable kept inside the crate so they can reach the
// resize policy directly when building the model.

use crate::chain_table::ChainTable;
use crate::config::normalize_capacity;
use crate::error::TableError;
use proptest::prelude::*;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i32),
    PutIfAbsent(usize, i32),
    Remove(usize),
    Get(usize),
    ContainsValue(i32),
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (usize, Vec<String>, Vec<OpI>)> {
    (0usize..=6, proptest::collection::vec("[a-z]{1,5}", 1..=16)).prop_flat_map(|(cap, pool)| {
        let n = pool.len();
        // Narrow value range so equal-value updates are common.
        let op = prop_oneof![
            6 => (0..n, -2i32..=2).prop_map(|(i, v)| OpI::Put(i, v)),
            2 => (0..n, -2i32..=2).prop_map(|(i, v)| OpI::PutIfAbsent(i, v)),
            4 => (0..n).prop_map(OpI::Remove),
            2 => (0..n).prop_map(OpI::Get),
            1 => (-3i32..=3).prop_map(OpI::ContainsValue),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (cap, pool.clone(), ops))
    })
}

/// Capacity model: the same grow/shrink rule written out longhand.
struct CapModel {
    base: usize,
    cap: usize,
}

impl CapModel {
    fn after_insert(&mut self, size: usize) {
        let c = self.cap;
        if size > c / 2 + c / 4 || size >= c {
            self.cap = c * 2;
        }
    }

    fn after_remove(&mut self, size: usize) {
        if self.cap >= 2 && size < self.cap / 2 {
            self.cap /= 2;
        }
    }
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - `get`/`contains_key` agree with the model for every pool key.
// - `len` and `capacity` follow the grow/shrink/clear policy exactly.
// - Release is called once per displaced value: unequal overwrite, removal,
//   clear. Equal overwrite, put_if_absent on a present key, and migration
//   release nothing.
// - Iteration yields each live key exactly once.
proptest! {
    #![proptest_config(ProptestConfig { cases: 96, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((cap, pool, ops) in arb_scenario()) {
        let released = Rc::new(RefCell::new(Vec::new()));
        let sink = released.clone();
        let mut sut: ChainTable<i32> = ChainTable::builder()
            .initial_capacity(cap)
            .release_with(move |v| sink.borrow_mut().push(v))
            .compare_with(|a: &i32, b: &i32| a.cmp(b))
            .build()
            .unwrap();
        let mut model: HashMap<String, i32> = HashMap::new();
        let base = normalize_capacity(cap);
        let mut caps = CapModel { base, cap: base };
        let mut expect_released: Vec<i32> = Vec::new();

        for op in ops {
            match op {
                OpI::Put(i, v) => {
                    let k = &pool[i];
                    sut.put(k, v).unwrap();
                    match model.get(k).copied() {
                        Some(old) if old != v => {
                            expect_released.push(old);
                            model.insert(k.clone(), v);
                        }
                        Some(_) => {}
                        None => {
                            model.insert(k.clone(), v);
                            caps.after_insert(model.len());
                        }
                    }
                }
                OpI::PutIfAbsent(i, v) => {
                    let k = &pool[i];
                    let got = sut.put_if_absent(k, v).unwrap().copied();
                    match model.get(k).copied() {
                        Some(existing) => {
                            prop_assert_eq!(got, Some(existing));
                        }
                        None => {
                            prop_assert_eq!(got, None);
                            model.insert(k.clone(), v);
                            caps.after_insert(model.len());
                        }
                    }
                }
                OpI::Remove(i) => {
                    let k = &pool[i];
                    sut.remove(k).unwrap();
                    if let Some(old) = model.remove(k) {
                        expect_released.push(old);
                        caps.after_remove(model.len());
                    }
                }
                OpI::Get(i) => {
                    let k = &pool[i];
                    prop_assert_eq!(sut.get(k).unwrap().copied(), model.get(k).copied());
                }
                OpI::ContainsValue(v) => {
                    prop_assert_eq!(sut.contains_value(&v), model.values().any(|x| *x == v));
                }
                OpI::Clear => {
                    sut.clear().unwrap();
                    expect_released.extend(model.drain().map(|(_, v)| v));
                    caps.cap = caps.base;
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
            prop_assert_eq!(sut.capacity(), caps.cap);
            for k in &pool {
                prop_assert_eq!(sut.contains_key(k).unwrap(), model.contains_key(k));
            }
            let mut got = released.borrow().clone();
            let mut want = expect_released.clone();
            got.sort_unstable();
            want.sort_unstable();
            prop_assert_eq!(got, want);
        }

        let seen: Vec<&str> = sut.keys().collect();
        let unique: BTreeSet<&str> = seen.iter().copied().collect();
        prop_assert_eq!(seen.len(), unique.len());
        let expected: BTreeSet<&str> = model.keys().map(String::as_str).collect();
        prop_assert_eq!(unique, expected);
    }
}

// Property: invalid keys never change the table.
proptest! {
    #[test]
    fn prop_rejected_keys_leave_table_unchanged(n in 0usize..40, extra in 1usize..64) {
        let mut sut: ChainTable<usize> = ChainTable::builder()
            .initial_capacity(1)
            .compare_with(|a: &usize, b: &usize| a.cmp(b))
            .build()
            .unwrap();
        for i in 0..n {
            sut.put(&format!("k{i}"), i).unwrap();
        }
        let (len, cap) = (sut.len(), sut.capacity());
        let long = "q".repeat(crate::config::MAX_KEY_LEN + extra);
        prop_assert_eq!(sut.put("", 0), Err(TableError::InvalidKey));
        prop_assert_eq!(sut.put(&long, 0), Err(TableError::KeyTooLong { len: long.len() }));
        prop_assert_eq!(sut.remove(&long), Err(TableError::KeyTooLong { len: long.len() }));
        prop_assert_eq!((sut.len(), sut.capacity()), (len, cap));
    }
}
