use std::error::Error;
use std::fmt;

use crate::uint128::Uint128;

/// Runtime failure while adopting foreign record data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The source buffer carries a different type identity than the target
    /// record type.
    IdentityMismatch { expected: Uint128, found: Uint128 },
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::IdentityMismatch { expected, found } => {
                write!(f, "record identity mismatch: expected {}, found {}", expected, found)
            }
        }
    }
}

impl Error for RecordError {}
