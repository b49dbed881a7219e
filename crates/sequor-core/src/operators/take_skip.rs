//! Prefix and suffix slicing stages.
//!
//! Both are view-preserving: over a contiguous source they subslice the
//! source's view instead of degrading to sequential pulls, and they
//! translate bulk-copy offsets so single-element accessors keep their
//! fast path through them.

use crate::protocol::{Sequence, SpanOffset};

/// Yields at most the first `remaining` elements of the wrapped stage.
#[derive(Debug, Clone)]
pub struct Take<S> {
    source: S,
    remaining: usize,
}

impl<S> Take<S> {
    pub(crate) fn new(source: S, count: usize) -> Self {
        Self {
            source,
            remaining: count,
        }
    }
}

impl<S: Sequence> Sequence for Take<S> {
    type Item = S::Item;

    fn try_advance(&mut self) -> Option<S::Item> {
        if self.remaining == 0 {
            return None;
        }
        let item = self.source.try_advance()?;
        self.remaining -= 1;
        Some(item)
    }

    fn try_count(&mut self) -> Option<usize> {
        let remaining = self.remaining;
        self.source.try_count().map(|c| c.min(remaining))
    }

    fn try_view(&mut self) -> Option<&[S::Item]> {
        let remaining = self.remaining;
        self.source.try_view().map(|v| &v[..v.len().min(remaining)])
    }

    fn try_copy_into(&mut self, out: &mut Vec<S::Item>, offset: SpanOffset, count: usize) -> bool
    where
        S::Item: Clone,
    {
        // Offsets resolve against the truncated length, which needs the
        // source count; the copy itself is delegated.
        let Some(effective) = self.try_count() else {
            return false;
        };
        let Some(start) = offset.resolve(effective) else {
            return false;
        };
        if start.checked_add(count).is_none_or(|end| end > effective) {
            return false;
        }
        self.source.try_copy_into(out, SpanOffset::FromStart(start), count)
    }
}

/// Skips the first `pending` elements of the wrapped stage.
#[derive(Debug, Clone)]
pub struct Skip<S> {
    source: S,
    pending: usize,
}

impl<S> Skip<S> {
    pub(crate) fn new(source: S, count: usize) -> Self {
        Self {
            source,
            pending: count,
        }
    }
}

impl<S: Sequence> Sequence for Skip<S> {
    type Item = S::Item;

    fn try_advance(&mut self) -> Option<S::Item> {
        while self.pending > 0 {
            self.source.try_advance()?;
            self.pending -= 1;
        }
        self.source.try_advance()
    }

    fn try_count(&mut self) -> Option<usize> {
        let pending = self.pending;
        self.source.try_count().map(|c| c.saturating_sub(pending))
    }

    fn try_view(&mut self) -> Option<&[S::Item]> {
        let pending = self.pending;
        self.source.try_view().map(|v| &v[pending.min(v.len())..])
    }

    fn try_copy_into(&mut self, out: &mut Vec<S::Item>, offset: SpanOffset, count: usize) -> bool
    where
        S::Item: Clone,
    {
        let pending = self.pending;
        let Some(source_count) = self.source.try_count() else {
            return false;
        };
        let effective = source_count.saturating_sub(pending);
        let Some(start) = offset.resolve(effective) else {
            return false;
        };
        if start.checked_add(count).is_none_or(|end| end > effective) {
            return false;
        }
        self.source
            .try_copy_into(out, SpanOffset::FromStart(pending + start), count)
    }

    fn fold_remaining<B, G>(self, init: B, mut fold: G) -> B
    where
        G: FnMut(B, S::Item) -> B,
    {
        let mut pending = self.pending;
        self.source.fold_remaining(init, move |acc, item| {
            if pending > 0 {
                pending -= 1;
                acc
            } else {
                fold(acc, item)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{from_slice, from_iter};

    #[test]
    fn test_take_truncates() {
        let data = [1, 2, 3, 4, 5];
        let mut seq = Take::new(from_slice(&data), 3);
        assert_eq!(seq.try_count(), Some(3));
        assert_eq!(seq.try_view(), Some(&data[..3]));
        assert_eq!(seq.try_advance(), Some(1));
        assert_eq!(seq.try_advance(), Some(2));
        assert_eq!(seq.try_advance(), Some(3));
        assert_eq!(seq.try_advance(), None);
    }

    #[test]
    fn test_take_past_end() {
        let data = [1, 2];
        let mut seq = Take::new(from_slice(&data), 10);
        assert_eq!(seq.try_count(), Some(2));
        assert_eq!(seq.try_advance(), Some(1));
        assert_eq!(seq.try_advance(), Some(2));
        assert_eq!(seq.try_advance(), None);
    }

    #[test]
    fn test_skip_drops_prefix() {
        let data = [1, 2, 3, 4, 5];
        let mut seq = Skip::new(from_slice(&data), 2);
        assert_eq!(seq.try_count(), Some(3));
        assert_eq!(seq.try_view(), Some(&data[2..]));
        assert_eq!(seq.try_advance(), Some(3));
    }

    #[test]
    fn test_skip_past_end() {
        let data = [1, 2];
        let mut seq = Skip::new(from_slice(&data), 5);
        assert_eq!(seq.try_count(), Some(0));
        assert_eq!(seq.try_advance(), None);
    }

    #[test]
    fn test_take_skip_copy_offsets() {
        let data = [10, 20, 30, 40, 50, 60];
        let mut out = Vec::new();

        let mut seq = Take::new(from_slice(&data), 4);
        assert!(seq.try_copy_into(&mut out, SpanOffset::FromEnd(1), 1));
        assert_eq!(out, vec![40]);

        out.clear();
        let mut seq = Skip::new(from_slice(&data), 2);
        assert!(seq.try_copy_into(&mut out, SpanOffset::FromStart(0), 2));
        assert_eq!(out, vec![30, 40]);

        out.clear();
        let mut seq = Skip::new(from_slice(&data), 2);
        assert!(seq.try_copy_into(&mut out, SpanOffset::FromEnd(1), 1));
        assert_eq!(out, vec![60]);
    }

    #[test]
    fn test_copy_declines_without_count() {
        let mut seq = Skip::new(from_iter((0..5).map(|n| n * 2).filter(|n| *n > 0)), 1);
        let mut out = Vec::new();
        assert!(!seq.try_copy_into(&mut out, SpanOffset::FromStart(0), 1));
    }

    #[test]
    fn test_skip_fold() {
        let data = [1, 2, 3, 4];
        let seq = Skip::new(from_slice(&data), 2);
        assert_eq!(seq.fold_remaining(0, |acc, n| acc + n), 7);
    }
}
