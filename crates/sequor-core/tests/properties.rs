//! Property tests for the protocol and engine invariants.

use proptest::prelude::*;
use sequor_core::{Sequence, SequenceExt, from_slice, from_vec};

fn drain_sequential<S: Sequence>(mut seq: S) -> Vec<S::Item> {
    let mut out = Vec::new();
    while let Some(item) = seq.try_advance() {
        out.push(item);
    }
    out
}

proptest! {
    #[test]
    fn view_and_sequential_drains_agree(
        data in prop::collection::vec(any::<i32>(), 0..200),
        skip in 0usize..64,
        take in 0usize..64,
    ) {
        let mut staged = from_slice(&data).skip(skip).take(take);
        let via_view = staged.try_view().unwrap().to_vec();
        let via_next = drain_sequential(from_slice(&data).skip(skip).take(take));
        prop_assert_eq!(via_view, via_next);
    }

    #[test]
    fn round_trip_preserves_any_source(data in prop::collection::vec(any::<i64>(), 0..300)) {
        let through = from_vec(from_slice(&data).to_vec()).to_vec();
        prop_assert_eq!(through, data);
    }

    #[test]
    fn quickselect_agrees_with_full_sort_at_every_rank(
        data in prop::collection::vec(any::<i16>(), 1..80),
    ) {
        let sorted = from_slice(&data).order().to_vec();
        for k in 0..data.len() {
            let picked = from_slice(&data).order().element_at(k).unwrap();
            prop_assert_eq!(picked, sorted[k]);
        }
    }

    #[test]
    fn sort_by_key_is_stable(data in prop::collection::vec(any::<(u8, u32)>(), 0..120)) {
        let sorted = from_slice(&data).order_by(|pair| pair.0).to_vec();

        // Keys ascend, and payloads within one key keep input order.
        prop_assert!(sorted.windows(2).all(|w| w[0].0 <= w[1].0));
        for key in sorted.iter().map(|pair| pair.0) {
            let ours: Vec<u32> = sorted.iter().filter(|p| p.0 == key).map(|p| p.1).collect();
            let input: Vec<u32> = data.iter().filter(|p| p.0 == key).map(|p| p.1).collect();
            prop_assert_eq!(ours, input);
        }
    }

    #[test]
    fn checked_sum_matches_scalar_reference(
        data in prop::collection::vec(-1000i32..1000, 0..300),
    ) {
        // Small values cannot overflow, so both paths must agree exactly.
        let expected: i32 = data.iter().sum();
        prop_assert_eq!(from_slice(&data).sum(), Ok(expected));
        prop_assert_eq!(from_slice(&data).sum_wrapping(), expected);
    }

    #[test]
    fn wrapping_sum_matches_wrapping_reference(
        data in prop::collection::vec(any::<i32>(), 0..120),
    ) {
        let expected = data.iter().fold(0i32, |acc, &v| acc.wrapping_add(v));
        prop_assert_eq!(from_slice(&data).sum_wrapping(), expected);
    }

    #[test]
    fn distinct_matches_reference_order(data in prop::collection::vec(0u16..40, 0..200)) {
        let ours = from_slice(&data).distinct().to_vec();

        let mut seen = hashbrown::HashSet::new();
        let reference: Vec<u16> = data.iter().copied().filter(|v| seen.insert(*v)).collect();
        prop_assert_eq!(ours, reference);
    }

    #[test]
    fn grouping_matches_reference_model(data in prop::collection::vec(0u8..16, 0..200)) {
        let groups = from_slice(&data).group_by(|v| *v).to_vec();

        let mut reference: indexmap::IndexMap<u8, Vec<u8>> = indexmap::IndexMap::new();
        for v in &data {
            reference.entry(*v).or_default().push(*v);
        }

        prop_assert_eq!(groups.len(), reference.len());
        for (group, (key, values)) in groups.iter().zip(reference.iter()) {
            prop_assert_eq!(group.key(), key);
            prop_assert_eq!(group.values(), values.as_slice());
        }
    }

    #[test]
    fn min_max_agree_with_reference(data in prop::collection::vec(any::<i64>(), 1..200)) {
        let expected_min = *data.iter().min().unwrap();
        let expected_max = *data.iter().max().unwrap();
        prop_assert_eq!(from_slice(&data).min(), Ok(expected_min));
        prop_assert_eq!(from_slice(&data).max(), Ok(expected_max));
    }
}
