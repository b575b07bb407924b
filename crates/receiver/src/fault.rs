//! Fault-handler actions and their CFDP condition-code defaults.

use cfdp_pdu::condition::ConditionCode;

/// The action the receiver takes once a condition code has been raised.
/// Named directly after CFDP's enumerated handler actions
/// (`IGNORE`, `NOTICE_OF_CANCELLATION`, `NOTICE_OF_SUSPENSION`, `ABANDON`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FaultAction {
    /// Continue as if no fault had been raised.
    Ignore,
    /// Discard the temp file, notify the peer with an `INCOMPLETE` Finished,
    /// and await its ACK.
    Cancel,
    /// Cancel all timers and freeze the transaction until `E_RESUME`.
    Suspend,
    /// Discard the temp file, cancel all timers, and terminate without
    /// notifying the peer.
    Abandon,
}

impl FaultAction {
    /// The action CFDP's condition-code table implies for `code` absent an
    /// explicit [`crate::config::ReceiverConfig::fault_handlers`] override.
    ///
    /// `POSITIVE_ACK_LIMIT_REACHED` defaults to `Abandon`: the peer has
    /// already failed to acknowledge repeated Finished retransmissions, so a
    /// further `Cancel` round (which itself ends in a Finished the peer may
    /// never ACK) cannot make progress. Every other fault code defaults to
    /// `Cancel`, including `CANCEL_REQUEST_RECEIVED` itself, whose very
    /// purpose is to drive the transaction through the cancellation path.
    #[must_use]
    pub const fn default_for(code: ConditionCode) -> Self {
        match code {
            ConditionCode::NoError => Self::Ignore,
            ConditionCode::PositiveAckLimitReached => Self::Abandon,
            ConditionCode::NakLimitReached
            | ConditionCode::InactivityDetected
            | ConditionCode::FileChecksumFailure
            | ConditionCode::FileSizeError
            | ConditionCode::FilestoreRejection
            | ConditionCode::CancelRequestReceived => Self::Cancel,
        }
    }
}
