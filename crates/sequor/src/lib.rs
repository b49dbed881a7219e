//! # Sequor
//!
//! A pure-Rust, allocation-light, pull-based query-pipeline engine for
//! in-memory sequences.
//!
//! Pipelines compose lazily out of value-type stages - no per-stage heap
//! allocation, no virtual dispatch - and evaluate when a terminal pulls.
//! Simple pipelines over contiguous data collapse into tight vectorized
//! loops; grouping, joining and sorting run on purpose-built engines
//! (open-addressing tables, stable multi-key sort, quickselect).
//!
//! ## Quick Start
//!
//! ```rust
//! use sequor::{SequenceExt, from_slice};
//!
//! let data = [3, 1, 4, 1, 5, 9, 2, 6];
//!
//! let total: i32 = from_slice(&data)
//!     .filter(|n| n % 2 == 1)
//!     .map(|n| n * 10)
//!     .sum()?;
//! assert_eq!(total, 190);
//!
//! let sorted = from_slice(&data).order().take(3).to_vec();
//! assert_eq!(sorted, vec![1, 1, 2]);
//! # Ok::<(), sequor::Error>(())
//! ```

// Re-export the pipeline API
pub use sequor_core::{
    FromIter, FromSlice, FromVec, Group, GroupTable, Numeric, Sequence, SequenceExt, SlimSet,
    SpanOffset, from_iter, from_slice, from_vec,
};

// Re-export the contracts and error types - you'll need these for custom
// orders, custom key equality, and error handling
pub use sequor_common::{
    ByKey, DefaultEquivalence, Equivalence, Error, Natural, Ranker, Result, Reversed,
    SegmentedBuffer,
};
