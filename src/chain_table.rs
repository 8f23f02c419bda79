//! ChainTable: bucket vector of doubly-linked chains over a slot arena.
//!
//! Entries live in a `SlotMap`; each bucket holds the key of its chain head
//! and every entry carries `prev`/`next` keys. Generational keys make a
//! stale link detectable (`EntryNull`) rather than aliasing a new entry.
//! Resizing relinks entries into a fresh bucket vector in place, so values
//! are never released while they are being relocated.

use crate::config::{
    normalize_capacity, resolve_callbacks, CompareFn, Ownership, ReleaseFn, TableBuilder, MAX_KEY_LEN,
};
use crate::error::{Result, TableError};
use crate::hasher::{bucket_index, hash_key, ShiftBuildHasher};
use crate::resize::{alloc_buckets, next_capacity, Action};
use core::cmp::Ordering;
use core::fmt;
use core::hash::BuildHasher;
use log::{debug, trace, warn};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    pub(crate) struct EntryKey;
}

#[derive(Debug)]
struct Entry<V> {
    key: Box<str>,
    value: V,
    hash: u64,
    prev: Option<EntryKey>,
    next: Option<EntryKey>,
}

pub struct ChainTable<V, S = ShiftBuildHasher> {
    buckets: Vec<Option<EntryKey>>, // chain heads
    entries: SlotMap<EntryKey, Entry<V>>,
    base_capacity: usize,
    ownership: Ownership<V>,
    compare: CompareFn<V>,
    hasher: S,
}

impl<V> ChainTable<V> {
    pub fn builder() -> TableBuilder<V> {
        TableBuilder::new()
    }

    /// Creates a table with the default hasher.
    ///
    /// `initial_capacity == 0` selects the default bucket count. Fails with
    /// `FreeValueMissing` when `owns_values` is set without `release`, and
    /// with `ValueCompareMissing` when `compare` is absent.
    pub fn create(
        initial_capacity: usize,
        owns_values: bool,
        release: Option<ReleaseFn<V>>,
        compare: Option<CompareFn<V>>,
    ) -> Result<Self> {
        let capacity = normalize_capacity(initial_capacity);
        let (ownership, compare) = resolve_callbacks(owns_values, release, compare)?;
        Self::from_parts(capacity, ownership, compare, ShiftBuildHasher)
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(TableError::InvalidKey);
    }
    if key.len() > MAX_KEY_LEN {
        warn!("rejecting {}-byte key (limit {})", key.len(), MAX_KEY_LEN);
        return Err(TableError::KeyTooLong { len: key.len() });
    }
    Ok(())
}

/// Appends `k` to the tail of the chain at `index`.
fn link_tail<V>(
    entries: &mut SlotMap<EntryKey, Entry<V>>,
    buckets: &mut [Option<EntryKey>],
    index: usize,
    k: EntryKey,
) -> Result<()> {
    let capacity = buckets.len();
    if index >= capacity {
        return Err(TableError::InvalidIndex { index, capacity });
    }
    if !entries.contains_key(k) {
        return Err(TableError::EntryNull);
    }
    match buckets[index] {
        None => {
            buckets[index] = Some(k);
            let e = &mut entries[k];
            e.prev = None;
            e.next = None;
        }
        Some(head) => {
            let mut tail = head;
            while let Some(n) = entries[tail].next {
                tail = n;
            }
            entries[tail].next = Some(k);
            let e = &mut entries[k];
            e.prev = Some(tail);
            e.next = None;
        }
    }
    Ok(())
}

// Operations that never hash: available without a `BuildHasher` bound so
// `Drop` can use them.
impl<V, S> ChainTable<V, S> {
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current number of buckets.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Bucket count restored by `clear`.
    #[inline]
    pub fn base_capacity(&self) -> usize {
        self.base_capacity
    }

    #[inline]
    pub fn owns_values(&self) -> bool {
        self.ownership.is_owned()
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Scans every chain for a value that compares `Equal` to `value`.
    pub fn contains_value(&self, value: &V) -> bool {
        self.iter()
            .any(|(_, stored)| (self.compare)(stored, value) == Ordering::Equal)
    }

    /// Entries by bucket index, then insertion order within the bucket.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            buckets: &self.buckets,
            entries: &self.entries,
            bucket: 0,
            next_bucket: 0,
            cur: None,
            remaining: self.entries.len(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(|(k, _)| k)
    }

    /// `(bucket index, key)` pairs in iteration order.
    pub fn bucket_layout(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        let mut it = self.iter();
        core::iter::from_fn(move || it.next_indexed().map(|(i, e)| (i, &*e.key)))
    }

    /// Printable dump of every key with its bucket index.
    pub fn key_listing(&self) -> KeyListing<'_, V> {
        KeyListing { iter: self.iter() }
    }

    /// Consumes the table, releasing every remaining value per ownership.
    pub fn destroy(self) {
        debug!(
            "destroying table ({} entries, {} buckets)",
            self.len(),
            self.capacity()
        );
        drop(self);
    }

    /// Unlinks and destroys every entry in bucket order, then chain order.
    /// Bucket slots are left empty; the vector itself is kept.
    fn release_all(&mut self) {
        if !self.ownership.is_owned() {
            self.entries.clear();
            self.buckets.iter_mut().for_each(|b| *b = None);
            return;
        }
        for i in 0..self.buckets.len() {
            let mut cur = self.buckets[i].take();
            while let Some(k) = cur {
                let Some(entry) = self.entries.remove(k) else {
                    break;
                };
                cur = entry.next;
                self.ownership.release(entry.value);
            }
        }
        debug_assert!(self.entries.is_empty(), "entry left outside any chain");
    }

    /// Installs `fresh` as the bucket vector and relinks every entry into it,
    /// walking the old vector in bucket order and each chain in order.
    fn migrate_into(&mut self, fresh: Vec<Option<EntryKey>>) -> Result<()> {
        if fresh.is_empty() {
            return Err(TableError::InvalidCapacity(0));
        }
        let old = core::mem::replace(&mut self.buckets, fresh);
        let capacity = self.buckets.len();
        let mut relinked = 0usize;
        for head in old {
            let mut cur = head;
            while let Some(k) = cur {
                let (next, hash) = {
                    let e = self.entries.get(k).ok_or(TableError::EntryNull)?;
                    (e.next, e.hash)
                };
                cur = next;
                link_tail(&mut self.entries, &mut self.buckets, bucket_index(hash, capacity), k)?;
                relinked += 1;
            }
        }
        debug_assert_eq!(relinked, self.entries.len(), "migration lost entries");
        trace!("relinked {} entries into {} buckets", relinked, capacity);
        Ok(())
    }

    /// Removes `k` from its chain and the arena, bridging its neighbours.
    fn unlink(&mut self, k: EntryKey) -> Result<Entry<V>> {
        let (prev, next, hash) = {
            let e = self.entries.get(k).ok_or(TableError::EntryNull)?;
            (e.prev, e.next, e.hash)
        };
        match prev {
            None => {
                let index = bucket_index(hash, self.capacity());
                debug_assert_eq!(self.buckets[index], Some(k));
                self.buckets[index] = next;
            }
            Some(p) => self.entries[p].next = next,
        }
        if let Some(n) = next {
            self.entries[n].prev = prev;
        }
        let entry = self.entries.remove(k).ok_or(TableError::EntryNull)?;
        trace!("unlinked {:?}", entry.key);
        Ok(entry)
    }

    fn resize_into(&mut self, fresh: Vec<Option<EntryKey>>) -> Result<()> {
        debug!(
            "resizing table from {} to {} buckets ({} entries)",
            self.capacity(),
            fresh.len(),
            self.len()
        );
        self.migrate_into(fresh)
    }
}

impl<V, S> ChainTable<V, S>
where
    S: BuildHasher,
{
    pub(crate) fn from_parts(
        capacity: usize,
        ownership: Ownership<V>,
        compare: CompareFn<V>,
        hasher: S,
    ) -> Result<Self> {
        let buckets = alloc_buckets(capacity)?;
        debug!(
            "created table with {} buckets, {} values",
            capacity,
            if ownership.is_owned() { "owned" } else { "borrowed" }
        );
        Ok(Self {
            buckets,
            entries: SlotMap::with_key(),
            base_capacity: capacity,
            ownership,
            compare,
            hasher,
        })
    }

    /// Validates `key`, hashes it and walks its chain.
    fn locate(&self, key: &str) -> Result<(u64, Option<EntryKey>)> {
        validate_key(key)?;
        let hash = hash_key(&self.hasher, key);
        let mut cur = self.buckets[bucket_index(hash, self.capacity())];
        while let Some(k) = cur {
            let e = self.entries.get(k).ok_or(TableError::EntryNull)?;
            if e.hash == hash && &*e.key == key {
                return Ok((hash, Some(k)));
            }
            cur = e.next;
        }
        Ok((hash, None))
    }

    pub fn contains_key(&self, key: &str) -> Result<bool> {
        Ok(self.locate(key)?.1.is_some())
    }

    /// Stored value for `key`; `Ok(None)` when absent.
    pub fn get(&self, key: &str) -> Result<Option<&V>> {
        Ok(self.locate(key)?.1.map(|k| &self.entries[k].value))
    }

    /// Stored value for `key`, or `default` when absent. Absence is not an
    /// error.
    pub fn get_or_default<'a>(&'a self, key: &str, default: &'a V) -> Result<&'a V> {
        Ok(self.get(key)?.unwrap_or(default))
    }

    /// Inserts or updates `key`.
    ///
    /// On an existing key the value is replaced (and the old one released)
    /// only when it compares unequal; an equal value leaves the stored one in
    /// place and `value` is dropped without being released.
    pub fn put(&mut self, key: &str, value: V) -> Result<()> {
        let (hash, found) = self.locate(key)?;
        match found {
            Some(k) => {
                self.update(k, value);
                Ok(())
            }
            None => self.insert_new(key, hash, value),
        }
    }

    /// Inserts only when `key` is absent. Returns the existing value, leaving
    /// the table untouched, or `None` when `value` was inserted.
    pub fn put_if_absent(&mut self, key: &str, value: V) -> Result<Option<&V>> {
        let (hash, found) = self.locate(key)?;
        if let Some(k) = found {
            return Ok(Some(&self.entries[k].value));
        }
        self.insert_new(key, hash, value)?;
        Ok(None)
    }

    /// Removes `key`, releasing its value when owned. Removing an absent key
    /// succeeds without effect.
    pub fn remove(&mut self, key: &str) -> Result<()> {
        let Some(k) = self.locate(key)?.1 else {
            return Ok(());
        };
        let shrunk = match next_capacity(Action::Remove, self.len() - 1, self.capacity())? {
            Some(cap) => Some(alloc_buckets(cap)?),
            None => None,
        };
        let entry = self.unlink(k)?;
        self.ownership.release(entry.value);
        if let Some(fresh) = shrunk {
            self.resize_into(fresh)?;
        }
        Ok(())
    }

    /// Destroys every entry and returns to the base capacity.
    pub fn clear(&mut self) -> Result<()> {
        let fresh = alloc_buckets(self.base_capacity)?;
        debug!("clearing {} entries", self.len());
        self.release_all();
        self.resize_into(fresh)
    }

    fn update(&mut self, k: EntryKey, value: V) {
        let slot = &mut self.entries[k].value;
        if (self.compare)(&*slot, &value) == Ordering::Equal {
            return;
        }
        let old = core::mem::replace(slot, value);
        self.ownership.release(old);
    }

    /// Appends a new entry to its chain, then applies the grow policy. The
    /// grown vector is reserved first so failure leaves the table unchanged.
    fn insert_new(&mut self, key: &str, hash: u64, value: V) -> Result<()> {
        let grown = match next_capacity(Action::Insert, self.len() + 1, self.capacity())? {
            Some(cap) => Some(alloc_buckets(cap)?),
            None => None,
        };
        let k = self.entries.insert(Entry {
            key: key.into(),
            value,
            hash,
            prev: None,
            next: None,
        });
        let index = bucket_index(hash, self.capacity());
        if let Err(e) = link_tail(&mut self.entries, &mut self.buckets, index, k) {
            self.entries.remove(k);
            return Err(e);
        }
        trace!("linked {:?} into bucket {}", key, index);
        if let Some(fresh) = grown {
            self.resize_into(fresh)?;
        }
        Ok(())
    }
}

impl<V, S> Drop for ChainTable<V, S> {
    fn drop(&mut self) {
        self.release_all();
    }
}

impl<V: fmt::Debug, S> fmt::Debug for ChainTable<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over `(key, value)` in bucket order, then chain order.
pub struct Iter<'a, V> {
    buckets: &'a [Option<EntryKey>],
    entries: &'a SlotMap<EntryKey, Entry<V>>,
    bucket: usize,
    next_bucket: usize,
    cur: Option<EntryKey>,
    remaining: usize,
}

impl<'a, V> Clone for Iter<'a, V> {
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets,
            entries: self.entries,
            bucket: self.bucket,
            next_bucket: self.next_bucket,
            cur: self.cur,
            remaining: self.remaining,
        }
    }
}

impl<'a, V> Iter<'a, V> {
    fn next_indexed(&mut self) -> Option<(usize, &'a Entry<V>)> {
        let entries = self.entries;
        loop {
            if let Some(k) = self.cur {
                let e = &entries[k];
                self.cur = e.next;
                self.remaining -= 1;
                return Some((self.bucket, e));
            }
            let head = *self.buckets.get(self.next_bucket)?;
            self.bucket = self.next_bucket;
            self.next_bucket += 1;
            self.cur = head;
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.next_indexed().map(|(_, e)| (&*e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, V> ExactSizeIterator for Iter<'a, V> {}

/// `Display` adapter listing keys with their bucket index.
pub struct KeyListing<'a, V> {
    iter: Iter<'a, V>,
}

impl<'a, V> fmt::Display for KeyListing<'a, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Keys:")?;
        let mut it = self.iter.clone();
        while let Some((i, e)) = it.next_indexed() {
            writeln!(f, "[{:2}] {}", i, e.key)?;
        }
        Ok(())
    }
}
