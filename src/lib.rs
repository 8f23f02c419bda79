//! chain-dict: a single-threaded, string-keyed dictionary with separate
//! chaining, an explicit grow/shrink policy, and optional ownership of the
//! stored values.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small hash table whose resize behaviour is exact and
//!   reproducible, so capacity traces can be asserted in tests.
//! - Layers:
//!   - ChainTable<V, S>: the engine. A vector of bucket heads; each bucket
//!     is a doubly-linked chain of entries stored in a generational slot
//!     arena. Every operation returns `Result<_, TableError>`.
//!   - Dictionary<V, S>: lifecycle wrapper. Starts uninitialized, gains a
//!     table on `create`, loses it on `destroy`, and latches the
//!     `ErrorCode` of the most recent call for callers that poll it.
//!
//! Resize policy
//! - Grow (double) after an insert when `size > cap/2 + cap/4` or
//!   `size >= cap`, using integer shifts. From capacity 1 the trace is
//!   1 → 2 → 4 → 4 → 8 → 8 → 8 → 16 over the first seven inserts.
//! - Shrink (halve) after a removal when `size < cap/2`; never below 1.
//! - `clear` returns to the capacity the table was created with.
//! - Every resize is a full migration: entries are relinked, in bucket
//!   order then chain order, into a freshly reserved vector. Entries are
//!   never recreated, so the release function cannot fire on relocation.
//!
//! Ownership
//! - `Ownership::Borrowed`: displaced values are dropped silently; values
//!   are typically references or shared handles kept alive by the caller.
//! - `Ownership::Owned(release)`: overwrite, removal, clear, destroy and
//!   drop pass each displaced value to `release` exactly once.
//! - A compare function is always required. `put` on an existing key only
//!   replaces (and releases) when the new value compares unequal.
//!
//! Keys
//! - Non-empty `&str` of at most `MAX_KEY_LEN` bytes, copied on insert.
//!   Longer keys are rejected with `KeyTooLong`, never truncated.
//!
//! Failure atomicity
//! - Bucket vectors are reserved before the first mutation of an
//!   operation, so a failing `put`, `remove` or `clear` leaves the table
//!   exactly as it was.
//!
//! Notes and non-goals
//! - Single-threaded: the boxed callbacks are not `Send`.
//! - The default hasher is a deterministic shift-and-add over key bytes;
//!   it is not collision-resistant. Any `BuildHasher` can be plugged in.
//! - No persistence and no ordering guarantee beyond bucket index, then
//!   insertion order within a bucket.

pub mod chain_table;
mod chain_table_proptest;
pub mod config;
mod dictionary;
pub mod error;
pub mod hasher;
mod resize;

// Public surface
pub use chain_table::{ChainTable, Iter, KeyListing};
pub use config::{
    CompareFn, Ownership, ReleaseFn, TableBuilder, DEFAULT_INITIAL_CAPACITY, MAX_KEY_LEN,
};
pub use dictionary::Dictionary;
pub use error::{describe_error, ErrorCode, TableError};
pub use hasher::{ShiftBuildHasher, ShiftHasher};
