//! NAK PDU: selective retransmission request, emitted by the receiver.

use std::ops::Range;

use crate::PduError;

/// NAK PDU fields (CCSDS 727.0-B-4 §5.2.6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NakPdu {
    /// Start of the scope this NAK reports over.
    pub start_of_scope: u64,
    /// End of the scope this NAK reports over.
    pub end_of_scope: u64,
    segment_requests: Vec<Range<u64>>,
}

impl NakPdu {
    /// Constructs a NAK PDU from an already-sorted, non-overlapping list of
    /// half-open ranges. Ranges are validated but not re-sorted; callers
    /// that hold gaps from `cfdp_gap::GapTracker::missing` already satisfy
    /// the ordering contract.
    pub fn new(
        start_of_scope: u64,
        end_of_scope: u64,
        segment_requests: Vec<Range<u64>>,
    ) -> Result<Self, PduError> {
        for range in &segment_requests {
            if range.start >= range.end {
                return Err(PduError::InvalidSegmentRequest {
                    start: range.start,
                    end: range.end,
                });
            }
        }
        Ok(Self {
            start_of_scope,
            end_of_scope,
            segment_requests,
        })
    }

    /// Builds a NAK PDU directly from a gap list, treating the union of the
    /// gaps as the scope. Returns `None` if `gaps` is empty (nothing to
    /// request).
    #[must_use]
    pub fn from_gaps(gaps: &[Range<u64>]) -> Option<Self> {
        let first = gaps.first()?;
        let last = gaps.last()?;
        Some(Self {
            start_of_scope: first.start,
            end_of_scope: last.end,
            segment_requests: gaps.to_vec(),
        })
    }

    /// The requested ranges, in ascending order.
    #[must_use]
    pub fn segment_requests(&self) -> &[Range<u64>] {
        &self.segment_requests
    }
}
