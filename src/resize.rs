//! Resize policy and bucket-vector allocation.
//!
//! Grow after an insert when the table is more than 75% full or full
//! (`size > (cap>>1) + (cap>>2) || size >= cap`); the second clause forces a
//! grow at capacities where the shifts round down to zero. Shrink after a
//! removal when less than half full, never below one bucket.

use crate::error::{Result, TableError};

/// Mutation that may trigger a resize.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Action {
    Insert,
    Remove,
}

/// Capacity the table should move to after `action` left it with `size`
/// live entries, or `None` when the current capacity stands.
pub(crate) fn next_capacity(action: Action, size: usize, capacity: usize) -> Result<Option<usize>> {
    if capacity == 0 {
        return Err(TableError::InvalidCapacity(capacity));
    }
    match action {
        Action::Insert => {
            let threshold = (capacity >> 1) + (capacity >> 2);
            if size > threshold || size >= capacity {
                capacity
                    .checked_mul(2)
                    .map(Some)
                    .ok_or(TableError::InvalidCapacity(capacity))
            } else {
                Ok(None)
            }
        }
        Action::Remove => {
            let half = capacity >> 1;
            if size < half && half >= 1 {
                Ok(Some(half))
            } else {
                Ok(None)
            }
        }
    }
}

/// Fresh bucket vector with every slot empty. Reservation is fallible so an
/// allocation failure surfaces before any entry is touched.
pub(crate) fn alloc_buckets<T>(capacity: usize) -> Result<Vec<Option<T>>> {
    if capacity == 0 {
        return Err(TableError::InvalidCapacity(capacity));
    }
    let mut v = Vec::new();
    v.try_reserve_exact(capacity)?;
    v.resize_with(capacity, || None);
    Ok(v)
}
