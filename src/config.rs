//! Construction-time configuration for [`ChainTable`].

use crate::chain_table::ChainTable;
use crate::error::{Result, TableError};
use crate::hasher::ShiftBuildHasher;
use core::cmp::Ordering;
use core::hash::BuildHasher;

/// Bucket count used when a caller asks for capacity 0.
pub const DEFAULT_INITIAL_CAPACITY: usize = 11;

/// Longest accepted key, in bytes. Longer keys are rejected, not truncated.
pub const MAX_KEY_LEN: usize = 255;

/// Receives every value the table discards when it owns its values.
pub type ReleaseFn<V> = Box<dyn FnMut(V)>;

/// Orders two values; `Ordering::Equal` means "same value".
pub type CompareFn<V> = Box<dyn Fn(&V, &V) -> Ordering>;

/// Whether displaced values are handed to a release function.
pub enum Ownership<V> {
    /// Values are references the caller keeps alive elsewhere; displaced
    /// values are dropped without notification.
    Borrowed,
    /// Every value displaced by overwrite, removal, clear, destroy or drop
    /// is passed to the release function exactly once.
    Owned(ReleaseFn<V>),
}

impl<V> Ownership<V> {
    #[inline]
    pub fn is_owned(&self) -> bool {
        matches!(self, Ownership::Owned(_))
    }

    pub(crate) fn release(&mut self, value: V) {
        match self {
            Ownership::Owned(f) => f(value),
            Ownership::Borrowed => drop(value),
        }
    }
}

impl<V> core::fmt::Debug for Ownership<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Ownership::Borrowed => f.write_str("Borrowed"),
            Ownership::Owned(_) => f.write_str("Owned"),
        }
    }
}

/// Normalizes a requested bucket count: 0 selects the default.
#[inline]
pub fn normalize_capacity(requested: usize) -> usize {
    if requested == 0 {
        DEFAULT_INITIAL_CAPACITY
    } else {
        requested
    }
}

/// Builder for [`ChainTable`].
///
/// ```
/// use chain_dict::ChainTable;
///
/// let mut t: ChainTable<i32> = ChainTable::builder()
///     .initial_capacity(4)
///     .compare_with(|a: &i32, b: &i32| a.cmp(b))
///     .build()
///     .unwrap();
/// t.put("answer", 42).unwrap();
/// assert_eq!(t.get("answer").unwrap(), Some(&42));
/// ```
pub struct TableBuilder<V, S = ShiftBuildHasher> {
    initial_capacity: usize,
    owns_values: bool,
    release: Option<ReleaseFn<V>>,
    compare: Option<CompareFn<V>>,
    hasher: S,
}

impl<V> Default for TableBuilder<V, ShiftBuildHasher> {
    fn default() -> Self {
        Self {
            initial_capacity: 0,
            owns_values: false,
            release: None,
            compare: None,
            hasher: ShiftBuildHasher,
        }
    }
}

impl<V> TableBuilder<V, ShiftBuildHasher> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<V, S: BuildHasher> TableBuilder<V, S> {
    /// Bucket count at creation and after `clear`; 0 selects
    /// [`DEFAULT_INITIAL_CAPACITY`].
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Marks values as owned by the table without supplying a release
    /// function; `build` then fails with `FreeValueMissing` unless
    /// `release_with` is also called.
    pub fn owns_values(mut self, owns: bool) -> Self {
        self.owns_values = owns;
        self
    }

    /// Table owns its values and hands each displaced one to `f`.
    pub fn release_with<F>(mut self, f: F) -> Self
    where
        F: FnMut(V) + 'static,
    {
        self.owns_values = true;
        self.release = Some(Box::new(f));
        self
    }

    pub fn compare_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&V, &V) -> Ordering + 'static,
    {
        self.compare = Some(Box::new(f));
        self
    }

    pub fn with_hasher<T: BuildHasher>(self, hasher: T) -> TableBuilder<V, T> {
        TableBuilder {
            initial_capacity: self.initial_capacity,
            owns_values: self.owns_values,
            release: self.release,
            compare: self.compare,
            hasher,
        }
    }

    pub fn build(self) -> Result<ChainTable<V, S>> {
        let capacity = normalize_capacity(self.initial_capacity);
        let (ownership, compare) = resolve_callbacks(self.owns_values, self.release, self.compare)?;
        ChainTable::from_parts(capacity, ownership, compare, self.hasher)
    }
}

/// Checks the callback configuration in creation order: a release function
/// when values are owned, then a compare function.
pub(crate) fn resolve_callbacks<V>(
    owns_values: bool,
    release: Option<ReleaseFn<V>>,
    compare: Option<CompareFn<V>>,
) -> Result<(Ownership<V>, CompareFn<V>)> {
    let ownership = match (owns_values, release) {
        (true, None) => return Err(TableError::FreeValueMissing),
        (true, Some(f)) => Ownership::Owned(f),
        (false, _) => Ownership::Borrowed,
    };
    let compare = compare.ok_or(TableError::ValueCompareMissing)?;
    Ok((ownership, compare))
}
