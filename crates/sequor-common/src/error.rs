//! Error types shared by every pipeline operation.
//!
//! Every failure a pipeline can surface is one of the variants below, and
//! all of them are raised immediately at the point of detection. There is
//! no retry or partial-recovery mode: operations are pure, synchronous and
//! single-pass, so an error simply aborts the current pull and the pipeline
//! must not be pulled again.

use thiserror::Error;

/// Result alias used throughout Sequor.
pub type Result<T> = std::result::Result<T, Error>;

/// Error raised by a pipeline operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An element-required accessor (`first`, `single`, seedless `reduce`)
    /// found no element. The `*_or` accessor variants return the supplied
    /// default instead of raising this.
    #[error("sequence contains no elements")]
    Empty,

    /// A `single` accessor found more than one (matching) element.
    #[error("sequence contains more than one matching element")]
    MoreThanOne,

    /// Checked numeric accumulation exceeded the representable range.
    /// Wrapping reduction variants never raise this.
    #[error("numeric accumulation overflowed")]
    Overflow,

    /// Quadratic probing walked the whole table without finding a free
    /// slot. The resize policy keeps this unreachable in normal operation;
    /// seeing it means the table was driven past its load invariant.
    #[error("associative table probe sequence exhausted at capacity {capacity}")]
    TableFull {
        /// Slot capacity of the table at the time of the failure.
        capacity: usize,
    },

    /// A caller-supplied argument was outside its documented range.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(Error::Empty.to_string(), "sequence contains no elements");
        assert_eq!(
            Error::TableFull { capacity: 17 }.to_string(),
            "associative table probe sequence exhausted at capacity 17"
        );
        assert_eq!(
            Error::InvalidArgument("capacity must be non-zero").to_string(),
            "invalid argument: capacity must be non-zero"
        );
    }
}
