//! PDU-common header fields.
//!
//! Every PDU the receiver observes or emits shares this envelope. Field
//! names and the `FILE_DIRECTIVE`/`FILE_DATA` split follow CCSDS 727.0-B-4
//! §5.1.

/// Direction a PDU travels, relative to the entity that originated it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Sent from the file sender towards the file receiver.
    TowardsReceiver,
    /// Sent from the file receiver towards the file sender.
    TowardsSender,
}

/// CFDP transmission mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransmissionMode {
    /// Class-1: no NAK/Finished handshake.
    Unacknowledged,
    /// Class-2: NAK-based selective retransmission, Finished/ACK handshake.
    Acknowledged,
}

/// Coarse PDU kind: directive PDUs carry a [`super::directive`]-adjacent
/// semantic payload (Metadata, EOF, NAK, Finished, ACK); file-data PDUs carry
/// raw file octets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PduType {
    /// A directive PDU (Metadata, EOF, NAK, Finished, ACK, ...).
    FileDirective,
    /// A file-data PDU.
    FileData,
}

/// Fields common to every PDU the receiver core consumes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Header {
    /// Direction the PDU travelled.
    pub direction: Direction,
    /// Entity ID of the file sender.
    pub source_entity_id: u64,
    /// Entity ID of the file receiver.
    pub destination_entity_id: u64,
    /// Sequence number identifying the transaction, scoped to
    /// `source_entity_id`.
    pub transaction_seq_no: u64,
    /// Directive vs. file-data.
    pub pdu_type: PduType,
    /// Acknowledged vs. unacknowledged delivery.
    pub transmission_mode: TransmissionMode,
}

impl Header {
    /// Returns the `(source_entity_id, transaction_seq_no)` pair that keys a
    /// transaction.
    #[must_use]
    pub const fn transaction_key(&self) -> (u64, u64) {
        (self.source_entity_id, self.transaction_seq_no)
    }
}
