//! Inbound events and outbound PDUs.

use cfdp_pdu::ack::AckPdu;
use cfdp_pdu::eof::EofPdu;
use cfdp_pdu::filedata::FileDataPdu;
use cfdp_pdu::finished::FinishedPdu;
use cfdp_pdu::metadata::MetadataPdu;
use cfdp_pdu::nak::NakPdu;

/// An event the receiver state machine consumes. Peer-originated events
/// (`E10`..`E14`) carry the decoded PDU; timer events carry nothing beyond
/// the fact they fired; `Suspend`/`Resume`/`Cancel` come from the outer
/// entity.
#[derive(Debug, Clone, PartialEq)]
pub enum ReceiverEvent {
    /// `E10`: Metadata PDU.
    Metadata(MetadataPdu),
    /// `E11`: a file-data segment.
    FileData(FileDataPdu),
    /// `E12`: EOF carrying `NoError`.
    EofNoError(EofPdu),
    /// `E13`: EOF carrying a fault condition code.
    EofWithError(EofPdu),
    /// `E14`: ACK of this receiver's Finished PDU.
    AckFinished(AckPdu),
    /// Outer entity requests the transaction freeze in place.
    Suspend,
    /// Outer entity requests a frozen transaction resume.
    Resume,
    /// Outer entity requests the transaction be cancelled.
    Cancel,
    /// The NAK timer fired.
    NakTimer,
    /// The inactivity timer fired.
    InactivityTimer,
    /// The Finished-ACK wait timer fired.
    FinishedAckTimer,
}

/// The three timer keys a receiver schedules, one set per transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKey {
    /// Retransmit the current NAK if the gap set is still non-empty.
    Nak,
    /// No PDU arrived before this timer and metadata had not yet arrived.
    Inactivity,
    /// Retransmit the Finished PDU if it has not yet been ACKed.
    FinishedAckWait,
}

/// A PDU the receiver emits through its injected [`crate::sink::PduSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundPdu {
    /// A selective-retransmission request.
    Nak(NakPdu),
    /// The transaction outcome.
    Finished(FinishedPdu),
}
