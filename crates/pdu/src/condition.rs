//! Condition codes the receiver raises or carries on outbound PDUs.
//!
//! This is the subset of the CFDP condition-code space the receiver core
//! handles; proxy and filestore-request condition codes are out of scope.

/// A CFDP condition code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConditionCode {
    /// Nominal outcome.
    NoError,
    /// A Finished PDU went unacknowledged past the configured attempt limit.
    PositiveAckLimitReached,
    /// A NAK was retransmitted past the configured attempt limit without
    /// progress.
    NakLimitReached,
    /// No PDU arrived within the inactivity timeout.
    InactivityDetected,
    /// The EOF checksum did not match the computed checksum.
    FileChecksumFailure,
    /// A received segment lies beyond the declared file size.
    FileSizeError,
    /// The assembler could not write or promote the file.
    FilestoreRejection,
    /// The outer entity issued a local cancel.
    CancelRequestReceived,
}

impl ConditionCode {
    /// Reports whether this code represents a fault (anything but
    /// [`ConditionCode::NoError`]).
    #[must_use]
    pub const fn is_fault(self) -> bool {
        !matches!(self, Self::NoError)
    }
}
