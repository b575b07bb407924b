//! Property tests for the gap tracker's quantified invariants.

use std::ops::Range;

use proptest::prelude::*;

use crate::GapTracker;

fn is_sorted_and_disjoint(ranges: &[Range<u64>]) -> bool {
    ranges.windows(2).all(|pair| pair[0].end <= pair[1].start) && ranges.iter().all(|r| r.start < r.end)
}

proptest! {
    #[test]
    fn missing_is_always_sorted_disjoint_and_bounded(
        bound in 1u64..8192,
        segments in prop::collection::vec((0u64..8192, 1u64..512), 0..64),
    ) {
        let mut tracker = GapTracker::new(Some(bound));
        for (offset, len) in segments {
            let _ = tracker.mark_received(offset, offset.saturating_add(len));
        }
        let gaps = tracker.missing();
        prop_assert!(is_sorted_and_disjoint(&gaps));
        if let Some(last) = gaps.last() {
            prop_assert!(last.end <= bound);
        }
        if let Some(first) = gaps.first() {
            prop_assert!(first.start >= 0);
        }
    }

    #[test]
    fn order_of_application_does_not_affect_final_gap_set(
        bound in 1u64..4096,
        mut segments in prop::collection::vec((0u64..4096, 1u64..256), 0..32),
    ) {
        let forward = {
            let mut tracker = GapTracker::new(Some(bound));
            for (offset, len) in &segments {
                let _ = tracker.mark_received(*offset, offset.saturating_add(*len));
            }
            tracker.missing()
        };

        segments.reverse();
        let backward = {
            let mut tracker = GapTracker::new(Some(bound));
            for (offset, len) in &segments {
                let _ = tracker.mark_received(*offset, offset.saturating_add(*len));
            }
            tracker.missing()
        };

        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn duplicate_application_is_idempotent(
        bound in 1u64..4096,
        segments in prop::collection::vec((0u64..4096, 1u64..256), 0..32),
    ) {
        let mut once = GapTracker::new(Some(bound));
        for (offset, len) in &segments {
            let _ = once.mark_received(*offset, offset.saturating_add(*len));
        }
        let once_missing = once.missing();

        let mut twice = GapTracker::new(Some(bound));
        for (offset, len) in segments.iter().chain(segments.iter()) {
            let _ = twice.mark_received(*offset, offset.saturating_add(*len));
        }

        prop_assert_eq!(once_missing, twice.missing());
    }

    #[test]
    fn full_coverage_implies_complete(bound in 1u64..4096) {
        let mut tracker = GapTracker::new(Some(bound));
        let outcome = tracker.mark_received(0, bound);
        prop_assert!(outcome.is_ok());
        prop_assert!(tracker.is_complete());
        prop_assert!(tracker.missing().is_empty());
    }
}
