//! Growable segmented buffer.
//!
//! Materializing terminals fall back to this buffer when a stage can offer
//! neither a contiguous view nor a remaining count: items accumulate across
//! a chain of doubling segments, and nothing is copied until the final
//! flatten into one exact-size allocation.
//!
//! Items never move between segments, so push is O(1) amortized with no
//! reallocation-copy, and the flatten is a single O(n) pass. Memory
//! overhead is bounded by the unused tail of the largest segment.

use crate::error::{Error, Result};
use smallvec::SmallVec;

/// Capacity of the first segment when the caller supplies none.
const DEFAULT_FIRST_CAPACITY: usize = 8;

/// Append-only storage for a sequence of unknown final length.
///
/// # Example
///
/// ```
/// use sequor_common::SegmentedBuffer;
///
/// let mut buf = SegmentedBuffer::new();
/// for i in 0..100 {
///     buf.push(i);
/// }
/// let flat = buf.into_vec();
/// assert_eq!(flat.len(), 100);
/// assert_eq!(flat[99], 99);
/// ```
#[derive(Debug)]
pub struct SegmentedBuffer<T> {
    /// Filled and in-progress segments, oldest first. The directory stays
    /// inline for short sequences.
    segments: SmallVec<[Vec<T>; 4]>,
    /// Total number of items pushed.
    len: usize,
    /// Capacity the first segment will be allocated with.
    first_capacity: usize,
}

impl<T> SegmentedBuffer<T> {
    /// Creates an empty buffer. No segment is allocated until the first push.
    #[must_use]
    pub fn new() -> Self {
        Self {
            segments: SmallVec::new(),
            len: 0,
            first_capacity: DEFAULT_FIRST_CAPACITY,
        }
    }

    /// Creates an empty buffer whose first segment will hold `capacity`
    /// items.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `capacity` is zero.
    pub fn with_first_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidArgument("segment capacity must be non-zero"));
        }
        Ok(Self {
            segments: SmallVec::new(),
            len: 0,
            first_capacity: capacity,
        })
    }

    /// Returns the number of items pushed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if nothing has been pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends an item.
    ///
    /// When the current segment is full a new one with double its capacity
    /// is linked; existing items stay where they are.
    pub fn push(&mut self, item: T) {
        let needs_segment = match self.segments.last() {
            Some(last) => last.len() == last.capacity(),
            None => true,
        };
        if needs_segment {
            let capacity = self
                .segments
                .last()
                .map_or(self.first_capacity, |last| last.capacity() * 2);
            self.segments.push(Vec::with_capacity(capacity));
        }
        // The last segment always has spare capacity here, so this push
        // never reallocates.
        self.segments.last_mut().unwrap().push(item);
        self.len += 1;
    }

    /// Flattens into one exact-size `Vec`, releasing the segments.
    ///
    /// An empty buffer produces an empty `Vec` without touching segment
    /// storage.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        if self.len == 0 {
            return Vec::new();
        }
        let mut flat = Vec::with_capacity(self.len);
        for segment in self.segments {
            flat.extend(segment);
        }
        flat
    }
}

impl<T> Default for SegmentedBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Extend<T> for SegmentedBuffer<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}
