use chain_dict::{describe_error, Dictionary, ErrorCode, TableError};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;

#[derive(Debug)]
struct Elem {
    name: &'static str,
    value: i32,
}

type Shared = Rc<Elem>;
type Released = Rc<RefCell<Vec<&'static str>>>;

fn by_value(a: &Shared, b: &Shared) -> Ordering {
    a.value.cmp(&b.value)
}

fn elems() -> Vec<Shared> {
    [
        ("aaa", 21),
        ("bee", 22),
        ("cee", 23),
        ("dee", 24),
        ("eee", 25),
        ("eff", 26),
        ("gee", 27),
    ]
    .into_iter()
    .map(|(name, value)| Rc::new(Elem { name, value }))
    .collect()
}

fn owning(cap: usize) -> (Dictionary<Shared>, Released) {
    let released: Released = Rc::new(RefCell::new(Vec::new()));
    let sink = released.clone();
    let mut d = Dictionary::new();
    d.create(
        cap,
        true,
        Some(Box::new(move |e: Shared| sink.borrow_mut().push(e.name))),
        Some(Box::new(by_value)),
    )
    .expect("create owning dictionary");
    (d, released)
}

fn borrowing(cap: usize) -> Dictionary<Shared> {
    let mut d = Dictionary::new();
    d.create(cap, false, None, Some(Box::new(by_value)))
        .expect("create borrowing dictionary");
    d
}

// Test: growth trace from a single bucket with repeated and updated keys.
// Assumes: owning dictionary created with capacity 1.
// Verifies: (len, capacity) after each put follows the grow rule; putting
// an equal value is a no-op; an unequal value replaces and releases once.
#[test]
fn put_walks_capacity_trace() {
    let (mut d, released) = owning(1);
    let e = elems();
    assert_eq!(d.capacity(), Ok(1));

    let trace = [(0, 1, 2), (1, 2, 4), (1, 2, 4), (2, 3, 4), (3, 4, 8), (4, 5, 8), (5, 6, 8)];
    for (i, len, cap) in trace {
        d.put(e[i].name, e[i].clone()).unwrap();
        assert_eq!((d.len(), d.capacity()), (Ok(len), Ok(cap)), "after {}", e[i].name);
        assert_eq!(d.last_error(), ErrorCode::NoError);
    }

    // "bee" updated with a different value: old one released, size unchanged
    let bee2 = Rc::new(Elem { name: "bee2", value: 1337 });
    d.put("bee", bee2.clone()).unwrap();
    assert!(Rc::ptr_eq(d.get("bee").unwrap().unwrap(), &bee2));
    assert_eq!((d.len(), d.capacity()), (Ok(6), Ok(8)));
    assert_eq!(*released.borrow(), vec!["bee"]);

    assert_eq!(d.put_if_absent("gee", e[6].clone()).unwrap().map(|v| v.value), None);
    assert_eq!((d.len(), d.capacity()), (Ok(7), Ok(16)));
    let existing = d.put_if_absent("gee", e[0].clone()).unwrap().unwrap();
    assert!(Rc::ptr_eq(existing, &e[6]));
    assert_eq!(d.len(), Ok(7));

    d.destroy();
    assert_eq!(released.borrow().len(), 8);
}

// Test: removal with a release function.
// Assumes: five entries inserted from capacity 1, so capacity is 8.
// Verifies: removing shrinks when under half full, removal of an absent key
// is a silent success, and each removed value is released once.
#[test]
fn remove_with_release() {
    let (mut d, released) = owning(1);
    let e = elems();
    for x in &e[..5] {
        d.put(x.name, x.clone()).unwrap();
    }
    assert_eq!((d.len(), d.capacity()), (Ok(5), Ok(8)));

    let steps = [("aaa", 4, 8), ("aaa", 4, 8), ("bee", 3, 4), ("eee", 2, 4)];
    for (key, len, cap) in steps {
        d.remove(key).unwrap();
        assert_eq!(d.last_error(), ErrorCode::NoError);
        assert_eq!(d.contains_key(key), Ok(false));
        assert_eq!((d.len(), d.capacity()), (Ok(len), Ok(cap)), "after removing {key}");
    }
    assert_eq!(*released.borrow(), vec!["aaa", "bee", "eee"]);

    d.put("bee", e[1].clone()).unwrap();
    assert_eq!((d.len(), d.capacity()), (Ok(3), Ok(4)));
    for key in ["bee", "cee", "dee"] {
        assert_eq!(d.contains_key(key), Ok(true));
    }
}

// Test: removal without a release function.
// Assumes: borrowing dictionary; the caller keeps every value alive.
// Verifies: same capacity trace as the owning case and no value is dropped
// by the dictionary beyond its own handle.
#[test]
fn remove_without_release() {
    let mut d = borrowing(1);
    let e = elems();
    for x in &e[..5] {
        d.put(x.name, x.clone()).unwrap();
    }
    for x in &e[..5] {
        assert_eq!(Rc::strong_count(x), 2);
    }
    d.remove("aaa").unwrap();
    d.remove("bee").unwrap();
    d.remove("eee").unwrap();
    assert_eq!((d.len(), d.capacity()), (Ok(2), Ok(4)));
    assert_eq!(Rc::strong_count(&e[0]), 1);
    assert_eq!(e[0].value, 21);
}

// Test: clear then reuse.
// Assumes: owning dictionary created with capacity 1.
// Verifies: clear releases everything, resets to capacity 1, and the first
// subsequent put grows to 2.
#[test]
fn clear_resets_to_initial_capacity() {
    let (mut d, released) = owning(1);
    for x in elems() {
        d.put(x.name, x).unwrap();
    }
    assert_eq!(d.capacity(), Ok(16));
    d.clear().unwrap();
    assert_eq!((d.len(), d.capacity(), d.is_empty()), (Ok(0), Ok(1), Ok(true)));
    assert_eq!(released.borrow().len(), 7);
    assert_eq!(d.contains_key("aaa"), Ok(false));

    d.put("bee", Rc::new(Elem { name: "bee", value: 22 })).unwrap();
    assert_eq!((d.len(), d.capacity()), (Ok(1), Ok(2)));
}

// Test: empty flag across insert and remove.
// Verifies: is_empty tracks len and latches NoError.
#[test]
fn is_empty_tracks_entries() {
    let mut d = borrowing(0);
    assert_eq!(d.is_empty(), Ok(true));
    d.put("aaa", elems().remove(0)).unwrap();
    assert_eq!(d.is_empty(), Ok(false));
    d.remove("aaa").unwrap();
    assert_eq!(d.is_empty(), Ok(true));
    assert_eq!(d.capacity(), Ok(chain_dict::DEFAULT_INITIAL_CAPACITY / 2));
    assert_eq!(d.last_error(), ErrorCode::NoError);
}

// Test: invalid keys across every keyed operation.
// Verifies: each call fails, latches InvalidKey, and leaves the table as is.
#[test]
fn invalid_keys_latch_invalid_key() {
    let (mut d, released) = owning(4);
    let e = elems();
    d.put("aaa", e[0].clone()).unwrap();
    let long = "z".repeat(chain_dict::MAX_KEY_LEN + 1);

    assert_eq!(d.put("", e[1].clone()), Err(TableError::InvalidKey));
    assert_eq!(d.last_error(), ErrorCode::InvalidKey);
    d.clear_error();
    assert!(d.get("").is_err());
    assert_eq!(d.last_error(), ErrorCode::InvalidKey);
    d.clear_error();
    assert!(d.contains_key("").is_err());
    assert_eq!(d.last_error(), ErrorCode::InvalidKey);
    d.clear_error();
    assert!(d.remove(&long).is_err());
    assert_eq!(d.last_error(), ErrorCode::InvalidKey);

    assert_eq!((d.len(), d.capacity()), (Ok(1), Ok(4)));
    assert!(released.borrow().is_empty());
    // the value handed to the rejected put was dropped, not released
    assert_eq!(Rc::strong_count(&e[1]), 1);
}

// Test: lookups report absence without error.
// Verifies: get yields None, get_or_default yields the default, and
// contains_value compares through the compare function.
#[test]
fn absent_lookups_are_not_errors() {
    let mut d = borrowing(0);
    let e = elems();
    let fallback = Rc::new(Elem { name: "fallback", value: -1 });
    assert_eq!(d.get("aaa").unwrap().map(|v| v.value), None);
    assert_eq!(d.get_or_default("aaa", &fallback).unwrap().value, -1);
    assert_eq!(d.last_error(), ErrorCode::NoError);

    d.put("aaa", e[0].clone()).unwrap();
    assert_eq!(d.get_or_default("aaa", &fallback).unwrap().value, 21);
    let twin = Rc::new(Elem { name: "twin", value: 21 });
    assert_eq!(d.contains_value(&twin), Ok(true));
    assert_eq!(d.contains_value(&fallback), Ok(false));
}

// Test: listing output.
// Verifies: one line per key, bucket index right-aligned to two columns.
#[test]
fn key_listing_lists_every_key() {
    let mut d = borrowing(16);
    for x in elems().into_iter().take(3) {
        d.put(x.name, x).unwrap();
    }
    let listing = d.key_listing().unwrap().to_string();
    let mut lines = listing.lines();
    assert_eq!(lines.next(), Some("Keys:"));
    let rest: Vec<&str> = lines.collect();
    assert_eq!(rest.len(), 3);
    assert!(rest.iter().all(|l| l.starts_with('[') && l.as_bytes()[3] == b']'));
    assert_eq!(d.iter().unwrap().count(), 3);
}

// Test: error descriptions.
// Verifies: every code has a description; unknown raw codes map to the
// "no such error" text.
#[test]
fn every_code_is_described() {
    for code in ErrorCode::ALL {
        assert!(!code.describe().is_empty());
        assert_eq!(describe_error(code.code()), code.describe());
    }
    assert_eq!(describe_error(99), ErrorCode::NoSuchError.describe());
    assert_eq!(describe_error(0), "No dictionary errors encountered");
}
