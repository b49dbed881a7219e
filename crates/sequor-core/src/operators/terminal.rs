//! Terminal consumers that drive a pipeline to completion.
//!
//! Every consumer triages the protocol the same way: use a contiguous
//! view if one exists, otherwise preallocate from a known count, otherwise
//! fall back to sequential pulls (through the segmented buffer when the
//! output size is unknown). Single-element accessors go through the
//! bulk-copy capability first so a stage that can address the range
//! cheaply - a slice tail, an unsorted snapshot with quickselect - skips
//! the scan.

use crate::protocol::{Sequence, SpanOffset};
use crate::reduce::Numeric;
use sequor_common::{Error, Ranker, Result, SegmentedBuffer};
use std::cmp::Ordering;

/// Materializes the remaining elements into a `Vec`.
pub fn to_vec<S: Sequence>(mut seq: S) -> Vec<S::Item>
where
    S::Item: Clone,
{
    if let Some(view) = seq.try_view() {
        return view.to_vec();
    }
    if let Some(count) = seq.try_count() {
        let mut out = Vec::with_capacity(count);
        while let Some(item) = seq.try_advance() {
            out.push(item);
        }
        return out;
    }
    let mut buffer = SegmentedBuffer::new();
    while let Some(item) = seq.try_advance() {
        buffer.push(item);
    }
    buffer.into_vec()
}

/// Counts the remaining elements.
pub fn count<S: Sequence>(mut seq: S) -> usize {
    if let Some(count) = seq.try_count() {
        return count;
    }
    seq.fold_remaining(0, |acc, _| acc + 1)
}

/// The first element.
///
/// # Errors
///
/// [`Error::Empty`] if the sequence has no elements.
pub fn first<S: Sequence>(mut seq: S) -> Result<S::Item> {
    seq.try_advance().ok_or(Error::Empty)
}

/// The first element, or `default` when empty.
pub fn first_or<S: Sequence>(mut seq: S, default: S::Item) -> S::Item {
    seq.try_advance().unwrap_or(default)
}

/// The last element.
///
/// # Errors
///
/// [`Error::Empty`] if the sequence has no elements.
pub fn last<S: Sequence>(mut seq: S) -> Result<S::Item>
where
    S::Item: Clone,
{
    let mut out = Vec::with_capacity(1);
    if seq.try_copy_into(&mut out, SpanOffset::FromEnd(1), 1) {
        return Ok(out.pop().unwrap());
    }
    let mut latest = None;
    while let Some(item) = seq.try_advance() {
        latest = Some(item);
    }
    latest.ok_or(Error::Empty)
}

/// The last element, or `default` when empty.
pub fn last_or<S: Sequence>(seq: S, default: S::Item) -> S::Item
where
    S::Item: Clone,
{
    last(seq).unwrap_or(default)
}

/// The element at `index`.
///
/// # Errors
///
/// [`Error::Empty`] if the sequence ends before `index`.
pub fn element_at<S: Sequence>(mut seq: S, index: usize) -> Result<S::Item>
where
    S::Item: Clone,
{
    let mut out = Vec::with_capacity(1);
    if seq.try_copy_into(&mut out, SpanOffset::FromStart(index), 1) {
        return Ok(out.pop().unwrap());
    }
    let mut remaining = index;
    while let Some(item) = seq.try_advance() {
        if remaining == 0 {
            return Ok(item);
        }
        remaining -= 1;
    }
    Err(Error::Empty)
}

/// The element at `index`, or `default` when the sequence is shorter.
pub fn element_at_or<S: Sequence>(seq: S, index: usize, default: S::Item) -> S::Item
where
    S::Item: Clone,
{
    element_at(seq, index).unwrap_or(default)
}

/// The only element.
///
/// # Errors
///
/// [`Error::Empty`] on no elements, [`Error::MoreThanOne`] on several.
pub fn single<S: Sequence>(mut seq: S) -> Result<S::Item> {
    if let Some(count) = seq.try_count() {
        match count {
            0 => return Err(Error::Empty),
            1 => {}
            _ => return Err(Error::MoreThanOne),
        }
    }
    let item = seq.try_advance().ok_or(Error::Empty)?;
    if seq.try_advance().is_some() {
        return Err(Error::MoreThanOne);
    }
    Ok(item)
}

/// The only element, or `default` when empty.
///
/// # Errors
///
/// [`Error::MoreThanOne`] on several elements - that case is still a
/// cardinality violation, not a default.
pub fn single_or<S: Sequence>(mut seq: S, default: S::Item) -> Result<S::Item> {
    let Some(item) = seq.try_advance() else {
        return Ok(default);
    };
    if seq.try_advance().is_some() {
        return Err(Error::MoreThanOne);
    }
    Ok(item)
}

/// Folds the remaining elements from an explicit seed.
pub fn fold<S: Sequence, B, F>(seq: S, init: B, f: F) -> B
where
    F: FnMut(B, S::Item) -> B,
{
    seq.fold_remaining(init, f)
}

/// Reduces the remaining elements, seeding from the first.
///
/// # Errors
///
/// [`Error::Empty`] if the sequence has no elements.
pub fn reduce<S: Sequence, F>(mut seq: S, mut f: F) -> Result<S::Item>
where
    F: FnMut(S::Item, S::Item) -> S::Item,
{
    let seed = seq.try_advance().ok_or(Error::Empty)?;
    Ok(seq.fold_remaining(seed, |acc, item| f(acc, item)))
}

/// Checked sum. An empty sequence sums to zero.
///
/// # Errors
///
/// [`Error::Overflow`] when accumulation leaves the representable range.
pub fn sum<S: Sequence>(mut seq: S) -> Result<S::Item>
where
    S::Item: Numeric,
{
    if let Some(view) = seq.try_view() {
        return S::Item::vector_sum_checked(view);
    }
    seq.fold_remaining(Ok(S::Item::zero()), |acc, item| {
        acc.and_then(|total| Numeric::add_checked(total, item))
    })
}

/// Wrapping sum. Never overflows; an empty sequence sums to zero.
pub fn sum_wrapping<S: Sequence>(mut seq: S) -> S::Item
where
    S::Item: Numeric,
{
    if let Some(view) = seq.try_view() {
        return S::Item::vector_sum_wrapping(view);
    }
    seq.fold_remaining(S::Item::zero(), Numeric::add_wrapping)
}

/// Arithmetic mean, accumulated in a wider intermediate.
///
/// # Errors
///
/// [`Error::Empty`] on no elements, [`Error::Overflow`] if even the wide
/// accumulator overflows.
pub fn average<S: Sequence>(mut seq: S) -> Result<<S::Item as Numeric>::Mean>
where
    S::Item: Numeric,
{
    if let Some(view) = seq.try_view() {
        if view.is_empty() {
            return Err(Error::Empty);
        }
        let mut acc = S::Item::mean_zero();
        for &value in view {
            acc = S::Item::mean_accumulate(acc, value)?;
        }
        return Ok(S::Item::mean_finish(acc, view.len()));
    }
    let (acc, tally) = seq.fold_remaining(
        (Ok(S::Item::mean_zero()), 0usize),
        |(acc, tally), item| {
            (
                acc.and_then(|wide| S::Item::mean_accumulate(wide, item)),
                tally + 1,
            )
        },
    );
    if tally == 0 {
        return Err(Error::Empty);
    }
    Ok(S::Item::mean_finish(acc?, tally))
}

/// Smallest element under the numeric kernels.
///
/// # Errors
///
/// [`Error::Empty`] if the sequence has no elements.
pub fn min<S: Sequence>(mut seq: S) -> Result<S::Item>
where
    S::Item: Numeric,
{
    if let Some(view) = seq.try_view() {
        return S::Item::vector_min(view).ok_or(Error::Empty);
    }
    seq.fold_remaining(None, |best, item| {
        Some(match best {
            None => item,
            Some(current) => Numeric::scalar_min(current, item),
        })
    })
    .ok_or(Error::Empty)
}

/// Largest element under the numeric kernels.
///
/// # Errors
///
/// [`Error::Empty`] if the sequence has no elements.
pub fn max<S: Sequence>(mut seq: S) -> Result<S::Item>
where
    S::Item: Numeric,
{
    if let Some(view) = seq.try_view() {
        return S::Item::vector_max(view).ok_or(Error::Empty);
    }
    seq.fold_remaining(None, |best, item| {
        Some(match best {
            None => item,
            Some(current) => Numeric::scalar_max(current, item),
        })
    })
    .ok_or(Error::Empty)
}

/// Smallest element under a ranking contract; the first wins ties.
///
/// # Errors
///
/// [`Error::Empty`] if the sequence has no elements.
pub fn min_by<S: Sequence, R: Ranker<S::Item>>(seq: S, rank: R) -> Result<S::Item> {
    seq.fold_remaining(None, |best, item| {
        Some(match best {
            None => item,
            Some(current) => {
                if rank.compare(&item, &current) == Ordering::Less {
                    item
                } else {
                    current
                }
            }
        })
    })
    .ok_or(Error::Empty)
}

/// Largest element under a ranking contract; the first wins ties.
///
/// # Errors
///
/// [`Error::Empty`] if the sequence has no elements.
pub fn max_by<S: Sequence, R: Ranker<S::Item>>(seq: S, rank: R) -> Result<S::Item> {
    seq.fold_remaining(None, |best, item| {
        Some(match best {
            None => item,
            Some(current) => {
                if rank.compare(&item, &current) == Ordering::Greater {
                    item
                } else {
                    current
                }
            }
        })
    })
    .ok_or(Error::Empty)
}
