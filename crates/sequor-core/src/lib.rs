//! # sequor-core
//!
//! Core layer for Sequor: the pull-based enumeration protocol, the operator
//! stages built on it, and the data engines behind the keyed and ordered
//! operators. It depends only on `sequor-common`.
//!
//! ## Modules
//!
//! - [`protocol`] - The enumeration contract every stage implements, plus
//!   the slice/vec/iterator sources
//! - [`operators`] - Pipeline stages (map, filter, group, join, sort, set
//!   operations) and the terminal consumers that drive them
//! - [`table`] - Open-addressing associative tables for keyed operators
//! - [`sort`] - Stable multi-key sorting and quickselect
//! - [`reduce`] - Lane-parallel numeric reduction kernels

pub mod operators;
pub mod protocol;
pub mod reduce;
pub mod sort;
pub mod table;

// Re-export commonly used types
pub use operators::SequenceExt;
pub use protocol::{FromIter, FromSlice, FromVec, Sequence, SpanOffset, from_iter, from_slice, from_vec};
pub use reduce::Numeric;
pub use table::{Group, GroupTable, SlimSet};
