//! File-data PDU: one payload segment.

use crate::PduError;

/// A single file-data segment: `data` occupies
/// `[segment_offset, segment_offset + data.len())`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDataPdu {
    segment_offset: u64,
    data: Vec<u8>,
}

impl FileDataPdu {
    /// Constructs a file-data segment. Rejects an empty payload, which
    /// carries no information and would otherwise be a no-op gap-tracker
    /// mark.
    pub fn new(segment_offset: u64, data: Vec<u8>) -> Result<Self, PduError> {
        if data.is_empty() {
            return Err(PduError::EmptySegment);
        }
        Ok(Self {
            segment_offset,
            data,
        })
    }

    /// Offset of the first octet of this segment.
    #[must_use]
    pub const fn segment_offset(&self) -> u64 {
        self.segment_offset
    }

    /// Offset one past the last octet of this segment.
    #[must_use]
    pub fn end_offset(&self) -> u64 {
        self.segment_offset + self.data.len() as u64
    }

    /// The segment's payload.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}
