//! Error taxonomy: typed `TableError` for results, `ErrorCode` for the
//! latched diagnostic state kept by `Dictionary`.

use std::collections::TryReserveError;
use thiserror::Error;

/// Diagnostic code latched by [`Dictionary`](crate::Dictionary) after every
/// call. Numeric values are stable and contiguous.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    #[default]
    NoError = 0,
    GeneralError = 1,
    Uninitialized = 2,
    UnknownError = 3,
    InvalidKey = 4,
    InvalidValue = 5,
    EntryNull = 6,
    InvalidCapacity = 7,
    InvalidIndex = 8,
    NoValue = 9,
    InsufficientMemory = 10,
    FreeValueMissing = 11,
    ValueCompareMissing = 12,
    Exists = 13,
    NoSuchError = 14,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 15] = [
        ErrorCode::NoError,
        ErrorCode::GeneralError,
        ErrorCode::Uninitialized,
        ErrorCode::UnknownError,
        ErrorCode::InvalidKey,
        ErrorCode::InvalidValue,
        ErrorCode::EntryNull,
        ErrorCode::InvalidCapacity,
        ErrorCode::InvalidIndex,
        ErrorCode::NoValue,
        ErrorCode::InsufficientMemory,
        ErrorCode::FreeValueMissing,
        ErrorCode::ValueCompareMissing,
        ErrorCode::Exists,
        ErrorCode::NoSuchError,
    ];

    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Maps a raw code back to its variant; anything out of range becomes
    /// `NoSuchError`.
    pub fn from_raw(raw: i32) -> ErrorCode {
        usize::try_from(raw)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or(ErrorCode::NoSuchError)
    }

    pub fn describe(self) -> &'static str {
        match self {
            ErrorCode::NoError => "No dictionary errors encountered",
            ErrorCode::GeneralError => "An unspecified dictionary error was encountered",
            ErrorCode::Uninitialized => "The dictionary was not initialized",
            ErrorCode::UnknownError => "An unknown error was encountered",
            ErrorCode::InvalidKey => "The key is not valid",
            ErrorCode::InvalidValue => "The value is not valid",
            ErrorCode::EntryNull => "The entry passed in does not exist",
            ErrorCode::InvalidCapacity => "The capacity given is not valid",
            ErrorCode::InvalidIndex => "The index given is not valid",
            ErrorCode::NoValue => "The value given is not valid",
            ErrorCode::InsufficientMemory => "There was a memory error (insufficient memory)",
            ErrorCode::FreeValueMissing => "No function was given to release a value",
            ErrorCode::ValueCompareMissing => "No function was given to compare two values",
            ErrorCode::Exists => "The dictionary already exists",
            ErrorCode::NoSuchError => "No such error exists",
        }
    }

    #[inline]
    pub fn is_error(self) -> bool {
        self != ErrorCode::NoError
    }
}

impl core::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[error {:2}] {}", self.code(), self.describe())
    }
}

/// Description for a raw code, including codes outside the known range.
pub fn describe_error(raw: i32) -> &'static str {
    ErrorCode::from_raw(raw).describe()
}

/// Failure of a single table or dictionary operation.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum TableError {
    #[error("dictionary is not initialized")]
    Uninitialized,

    #[error("key must not be empty")]
    InvalidKey,

    #[error("key is {len} bytes long, limit is {}", crate::config::MAX_KEY_LEN)]
    KeyTooLong { len: usize },

    #[error("dictionary already exists")]
    Exists,

    #[error("value ownership requested without a release function")]
    FreeValueMissing,

    #[error("no value compare function given")]
    ValueCompareMissing,

    #[error("insufficient memory: {0}")]
    InsufficientMemory(#[from] TryReserveError),

    #[error("invalid bucket capacity {0}")]
    InvalidCapacity(usize),

    #[error("bucket index {index} out of range for capacity {capacity}")]
    InvalidIndex { index: usize, capacity: usize },

    #[error("entry is not linked in this table")]
    EntryNull,
}

impl TableError {
    /// Latched diagnostic code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            TableError::Uninitialized => ErrorCode::Uninitialized,
            TableError::InvalidKey | TableError::KeyTooLong { .. } => ErrorCode::InvalidKey,
            TableError::Exists => ErrorCode::Exists,
            TableError::FreeValueMissing => ErrorCode::FreeValueMissing,
            TableError::ValueCompareMissing => ErrorCode::ValueCompareMissing,
            TableError::InsufficientMemory(_) => ErrorCode::InsufficientMemory,
            TableError::InvalidCapacity(_) => ErrorCode::InvalidCapacity,
            TableError::InvalidIndex { .. } => ErrorCode::InvalidIndex,
            TableError::EntryNull => ErrorCode::EntryNull,
        }
    }
}

pub type Result<T> = std::result::Result<T, TableError>;
