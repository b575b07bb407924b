use thiserror::Error;

/// Errors returned while constructing a PDU from already-decoded fields.
///
/// The wire codec is responsible for structural framing errors (truncated
/// buffers, bad CRCs); this crate only rejects field combinations that would
/// violate a PDU's own invariants once decoded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PduError {
    /// A length-prefixed path field exceeded the 255-octet wire limit.
    #[error("path of {len} octets exceeds the 255-octet CCSDS limit")]
    PathTooLong {
        /// Length of the offending path, in octets.
        len: usize,
    },
    /// A file-data PDU was constructed with an empty payload.
    #[error("file-data segment must carry at least one octet of payload")]
    EmptySegment,
    /// A NAK's segment request had `start >= end`.
    #[error("NAK segment request [{start}, {end}) is empty or inverted")]
    InvalidSegmentRequest {
        /// Requested range start.
        start: u64,
        /// Requested range end.
        end: u64,
    },
}
