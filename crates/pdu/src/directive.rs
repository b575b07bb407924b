//! Directive codes identifying which directive PDU an ACK acknowledges.

/// Directive a receiver-emitted [`crate::ack::AckPdu`] can acknowledge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AckedDirective {
    /// Acknowledges an EOF PDU (sender acknowledging, in the nominal flow
    /// this receiver core does not send; kept for transmission-mode parity).
    Eof,
    /// Acknowledges a Finished PDU sent by this receiver.
    Finished,
}
