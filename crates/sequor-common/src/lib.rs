//! # sequor-common
//!
//! Foundation layer for Sequor: errors, equality/ordering contracts, and
//! the segmented accumulation buffer.
//!
//! This crate provides the fundamental building blocks used by all other
//! Sequor crates. It has no internal dependencies and should be kept minimal.
//!
//! ## Modules
//!
//! - [`error`] - The error taxonomy shared by every pipeline operation
//! - [`equality`] - Hashing and equality contracts for keyed operators
//! - [`compare`] - Ordering contracts for sort and min/max operators
//! - [`memory`] - The growable segmented buffer for unknown-length output

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod compare;
pub mod equality;
pub mod error;
pub mod memory;

// Re-export commonly used types at crate root
pub use compare::{ByKey, Natural, Ranker, Reversed};
pub use equality::{DefaultEquivalence, Equivalence};
pub use error::{Error, Result};
pub use memory::SegmentedBuffer;
