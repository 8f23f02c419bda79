//! Dictionary: create/destroy lifecycle around a `ChainTable`, with a
//! latched diagnostic code.
//!
//! A `Dictionary` starts uninitialized. `create` installs a table (failing
//! with `Exists` if one is already installed) and `destroy` tears it down.
//! Every operation first latches `NoError`, then the code of the first
//! failure, so `last_error` always describes the most recent call. The
//! latch belongs to the instance: two dictionaries never share it.

use crate::chain_table::{ChainTable, Iter, KeyListing};
use crate::config::{CompareFn, ReleaseFn, TableBuilder};
use crate::error::{ErrorCode, Result, TableError};
use crate::hasher::ShiftBuildHasher;
use core::cell::Cell;
use core::hash::BuildHasher;
use log::debug;

pub struct Dictionary<V, S = ShiftBuildHasher> {
    table: Option<ChainTable<V, S>>,
    last_error: Cell<ErrorCode>,
}

/// Latches the outcome of `r` into `cell` and passes `r` through.
#[inline]
fn latch<T>(cell: &Cell<ErrorCode>, r: Result<T>) -> Result<T> {
    cell.set(match &r {
        Ok(_) => ErrorCode::NoError,
        Err(e) => e.code(),
    });
    r
}

impl<V> Dictionary<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a new table with the default hasher.
    ///
    /// Fails with `Exists` when a table is already installed; otherwise see
    /// [`ChainTable::create`].
    pub fn create(
        &mut self,
        initial_capacity: usize,
        owns_values: bool,
        release: Option<ReleaseFn<V>>,
        compare: Option<CompareFn<V>>,
    ) -> Result<()> {
        if self.table.is_some() {
            return latch(&self.last_error, Err(TableError::Exists));
        }
        let r = ChainTable::create(initial_capacity, owns_values, release, compare);
        self.install(r)
    }
}

impl<V, S> Default for Dictionary<V, S> {
    fn default() -> Self {
        Self {
            table: None,
            last_error: Cell::new(ErrorCode::NoError),
        }
    }
}

impl<V, S> Dictionary<V, S> {
    fn install(&mut self, r: Result<ChainTable<V, S>>) -> Result<()> {
        let r = r.map(|t| {
            self.table = Some(t);
        });
        latch(&self.last_error, r)
    }

    #[inline]
    fn table(&self) -> Result<&ChainTable<V, S>> {
        self.table.as_ref().ok_or(TableError::Uninitialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.table.is_some()
    }

    /// Installed table, for iteration and other read-only access.
    pub fn as_table(&self) -> Option<&ChainTable<V, S>> {
        self.table.as_ref()
    }

    /// Releases every entry and returns to the uninitialized state. A no-op
    /// when nothing is installed.
    pub fn destroy(&mut self) {
        if let Some(t) = self.table.take() {
            debug!("dictionary destroyed");
            t.destroy();
            self.last_error.set(ErrorCode::NoError);
        }
    }

    pub fn is_empty(&self) -> Result<bool> {
        latch(&self.last_error, self.table().map(ChainTable::is_empty))
    }

    pub fn len(&self) -> Result<usize> {
        latch(&self.last_error, self.table().map(ChainTable::len))
    }

    pub fn capacity(&self) -> Result<usize> {
        latch(&self.last_error, self.table().map(ChainTable::capacity))
    }

    pub fn contains_value(&self, value: &V) -> Result<bool> {
        latch(&self.last_error, self.table().map(|t| t.contains_value(value)))
    }

    pub fn iter(&self) -> Result<Iter<'_, V>> {
        latch(&self.last_error, self.table().map(ChainTable::iter))
    }

    pub fn key_listing(&self) -> Result<KeyListing<'_, V>> {
        latch(&self.last_error, self.table().map(ChainTable::key_listing))
    }

    /// Code latched by the most recent call.
    pub fn last_error(&self) -> ErrorCode {
        self.last_error.get()
    }

    pub fn is_error(&self) -> bool {
        self.last_error.get().is_error()
    }

    pub fn clear_error(&self) {
        self.last_error.set(ErrorCode::NoError);
    }

    /// Latches an arbitrary raw code; out-of-range codes latch `NoSuchError`.
    pub fn set_error(&self, raw: i32) {
        self.last_error.set(ErrorCode::from_raw(raw));
    }

    pub fn describe_error(&self, code: ErrorCode) -> &'static str {
        code.describe()
    }
}

impl<V, S> Dictionary<V, S>
where
    S: BuildHasher,
{
    /// Installs a table built from `builder`, e.g. with a custom hasher.
    pub fn create_with(&mut self, builder: TableBuilder<V, S>) -> Result<()> {
        if self.table.is_some() {
            return latch(&self.last_error, Err(TableError::Exists));
        }
        let r = builder.build();
        self.install(r)
    }

    pub fn contains_key(&self, key: &str) -> Result<bool> {
        latch(&self.last_error, self.table().and_then(|t| t.contains_key(key)))
    }

    pub fn get(&self, key: &str) -> Result<Option<&V>> {
        latch(&self.last_error, self.table().and_then(|t| t.get(key)))
    }

    pub fn get_or_default<'a>(&'a self, key: &str, default: &'a V) -> Result<&'a V> {
        latch(
            &self.last_error,
            self.table().and_then(|t| t.get_or_default(key, default)),
        )
    }

    pub fn put(&mut self, key: &str, value: V) -> Result<()> {
        let r = match self.table.as_mut() {
            Some(t) => t.put(key, value),
            None => Err(TableError::Uninitialized),
        };
        latch(&self.last_error, r)
    }

    pub fn put_if_absent(&mut self, key: &str, value: V) -> Result<Option<&V>> {
        let r = match self.table.as_mut() {
            Some(t) => t.put_if_absent(key, value),
            None => Err(TableError::Uninitialized),
        };
        latch(&self.last_error, r)
    }

    pub fn remove(&mut self, key: &str) -> Result<()> {
        let r = match self.table.as_mut() {
            Some(t) => t.remove(key),
            None => Err(TableError::Uninitialized),
        };
        latch(&self.last_error, r)
    }

    pub fn clear(&mut self) -> Result<()> {
        let r = match self.table.as_mut() {
            Some(t) => t.clear(),
            None => Err(TableError::Uninitialized),
        };
        latch(&self.last_error, r)
    }
}
