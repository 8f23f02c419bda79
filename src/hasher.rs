//! Shift-and-add string hash used to pick a key's bucket.
//!
//! `code = (code << 7) + byte` for every byte of the key, wrapping at 64
//! bits. Deterministic and unseeded: it is not resistant to crafted
//! collisions, which chaining tolerates at a performance cost only.

use core::hash::{BuildHasher, Hasher};

/// Streaming state for the shift-and-add hash.
#[derive(Debug, Copy, Clone, Default)]
pub struct ShiftHasher {
    code: u64,
}

impl ShiftHasher {
    pub const SHIFT: u32 = 7;

    pub fn new() -> Self {
        Self { code: 0 }
    }
}

impl Hasher for ShiftHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.code
    }

    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.code = (self.code << Self::SHIFT).wrapping_add(u64::from(b));
        }
    }
}

/// Builder for [`ShiftHasher`]; the default hasher of every table.
#[derive(Debug, Copy, Clone, Default)]
pub struct ShiftBuildHasher;

impl BuildHasher for ShiftBuildHasher {
    type Hasher = ShiftHasher;

    fn build_hasher(&self) -> Self::Hasher {
        ShiftHasher::new()
    }
}

/// Hash of the raw key bytes. Goes through `Hasher::write` directly rather
/// than `Hash for str`, which would append a terminator byte.
#[inline]
pub(crate) fn hash_key<S: BuildHasher>(build: &S, key: &str) -> u64 {
    let mut h = build.build_hasher();
    h.write(key.as_bytes());
    h.finish()
}

#[inline]
pub(crate) fn bucket_index(hash: u64, capacity: usize) -> usize {
    debug_assert!(capacity > 0);
    (hash % capacity as u64) as usize
}
