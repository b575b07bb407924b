#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cfdp_gap` tracks which byte ranges of a file-delivery transaction have
//! *not* yet arrived. It is the authoritative source the receiver state
//! machine consults to build NAK PDUs and to decide when a transaction has
//! collected every octet of its file.
//!
//! # Design
//!
//! Internally the tracker stores the *received* coverage as a sorted,
//! merged `Vec<Range<u64>>` rather than storing the gaps directly. Missing
//! ranges are the complement of that coverage within `[0, upper_bound)`,
//! computed on demand by [`GapTracker::missing`]. This keeps `mark_received`
//! a single interval-merge operation (binary search to the insertion point,
//! linear merge of overlapping/adjacent neighbours) and makes the rule that
//! the final gap extends to the upper bound fall out of the same complement
//! computation used for interior gaps, rather than needing special-case
//! code.
//!
//! # Invariants
//!
//! - [`GapTracker::missing`] always returns ranges that are non-empty,
//!   non-overlapping, and sorted by start.
//! - The union of those ranges is always a subset of `[0, upper_bound)` once
//!   the bound is known.
//! - [`GapTracker::mark_received`] and [`GapTracker::set_upper_bound`] are
//!   idempotent: repeating either call with the same arguments leaves the
//!   tracker in the same observable state.
//!
//! # Errors
//!
//! [`GapError`] is returned only for caller misuse (`start > end`); overruns
//! past a known upper bound are reported through the `file_size_error` flag
//! on [`MarkOutcome`] rather than as an `Err`, since they are a protocol
//! fault the receiver must still finish processing the segment for: it
//! truncates the segment to the bound and raises the fault separately.
//!
//! # Examples
//!
//! ```
//! use cfdp_gap::GapTracker;
//!
//! let mut tracker = GapTracker::new(Some(4096));
//! tracker.mark_received(0, 1024).unwrap();
//! tracker.mark_received(2048, 3072).unwrap();
//! assert_eq!(tracker.missing(), vec![1024..2048, 3072..4096]);
//! assert!(!tracker.is_complete());
//! ```
//!
//! # See also
//!
//! - [`cfdp_pdu::nak::NakPdu::from_gaps`] consumes [`GapTracker::missing`]'s
//!   output directly.
//! - [`cfdp_assembler`](https://docs.rs/cfdp_assembler) writes the segments
//!   this tracker accounts for.

use std::ops::Range;

mod error;
#[cfg(test)]
mod proptests;

pub use error::GapError;

/// Outcome of a [`GapTracker::mark_received`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkOutcome {
    /// Set when the segment extended past a known upper bound; the
    /// receiver should raise `FILE_SIZE_ERROR` for the transaction.
    pub file_size_error: bool,
}

impl MarkOutcome {
    const fn no_op() -> Self {
        Self {
            file_size_error: false,
        }
    }
}

/// Ordered set of missing half-open byte ranges over `[0, upper_bound)`.
///
/// See the module documentation for the representation and complexity
/// rationale.
#[derive(Debug, Clone)]
pub struct GapTracker {
    upper_bound: Option<u64>,
    received: Vec<Range<u64>>,
    reception_high_water: u64,
}

impl GapTracker {
    /// Creates a tracker. `upper_bound: Some(f)` pins the file size
    /// immediately, so `missing()` starts as `[0, f)`; `None` defers pinning
    /// until [`GapTracker::set_upper_bound`] is called, for the case where
    /// file-data segments arrive before metadata.
    #[must_use]
    pub const fn new(upper_bound: Option<u64>) -> Self {
        Self {
            upper_bound,
            received: Vec::new(),
            reception_high_water: 0,
        }
    }

    /// Pins (or re-pins) the upper bound. Truncates any received coverage
    /// at or past `bound` and reports whether data had already been
    /// observed beyond it (`FILE_SIZE_ERROR`). A no-op, and fault-free, if
    /// `bound` already equals the current bound.
    pub fn set_upper_bound(&mut self, bound: u64) -> bool {
        if self.upper_bound == Some(bound) {
            return false;
        }
        self.upper_bound = Some(bound);
        self.received.retain_mut(|range| {
            if range.start >= bound {
                false
            } else {
                range.end = range.end.min(bound);
                true
            }
        });
        self.reception_high_water > bound
    }

    /// Records that `[start, end)` has been received. Overlapping and
    /// duplicate marks are absorbed silently. `start == end` is a no-op.
    /// Returns an error only if `start > end`.
    pub fn mark_received(&mut self, start: u64, end: u64) -> Result<MarkOutcome, GapError> {
        if start > end {
            return Err(GapError::InvalidRange { start, end });
        }
        if start == end {
            return Ok(MarkOutcome::no_op());
        }

        self.reception_high_water = self.reception_high_water.max(end);

        let (clipped_end, file_size_error) = match self.upper_bound {
            Some(bound) if end > bound => (bound, true),
            _ => (end, false),
        };

        if start < clipped_end {
            self.insert_received(start, clipped_end);
        }

        Ok(MarkOutcome { file_size_error })
    }

    /// Returns the current list of missing ranges, sorted and
    /// non-overlapping. If the upper bound is known and coverage has not
    /// reached it yet, the final gap extends to the bound.
    #[must_use]
    pub fn missing(&self) -> Vec<Range<u64>> {
        let mut gaps = Vec::new();
        let mut cursor = 0u64;
        for range in &self.received {
            if range.start > cursor {
                gaps.push(cursor..range.start);
            }
            cursor = cursor.max(range.end);
        }
        if let Some(bound) = self.upper_bound {
            if cursor < bound {
                gaps.push(cursor..bound);
            }
        }
        gaps
    }

    /// True iff the upper bound is known and every octet in `[0, bound)`
    /// has been received.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        let Some(bound) = self.upper_bound else {
            return false;
        };
        let mut cursor = 0u64;
        for range in &self.received {
            if range.start > cursor {
                return false;
            }
            cursor = cursor.max(range.end);
        }
        cursor >= bound
    }

    /// The pinned upper bound, if any.
    #[must_use]
    pub const fn upper_bound(&self) -> Option<u64> {
        self.upper_bound
    }

    /// The highest `end` ever passed to [`GapTracker::mark_received`],
    /// clipped or not. Exposed so the receiver can log over-run attempts.
    #[must_use]
    pub const fn reception_high_water(&self) -> u64 {
        self.reception_high_water
    }

    fn insert_received(&mut self, mut start: u64, mut end: u64) {
        let first = self.received.partition_point(|range| range.end < start);
        let mut last = first;
        while last < self.received.len() && self.received[last].start <= end {
            start = start.min(self.received[last].start);
            end = end.max(self.received[last].end);
            last += 1;
        }
        self.received.splice(first..last, std::iter::once(start..end));
    }
}
