//! Outbound PDU delivery.

use crate::event::OutboundPdu;

/// Receives PDUs the state machine emits. The wire codec and dispatch to the
/// transport are the implementation's responsibility; the receiver core only
/// needs somewhere to hand a structured PDU off to.
///
/// A blanket implementation over `FnMut(OutboundPdu)` and `Vec<OutboundPdu>`
/// is provided so a closure or a plain buffer both work without an adapter
/// type.
pub trait PduSink {
    /// Delivers one outbound PDU.
    fn send(&mut self, pdu: OutboundPdu);
}

impl<F: FnMut(OutboundPdu)> PduSink for F {
    fn send(&mut self, pdu: OutboundPdu) {
        self(pdu);
    }
}

/// Collects every outbound PDU in arrival order; convenient for tests and
/// for embeddings that want to batch PDUs rather than dispatch them
/// synchronously.
impl PduSink for Vec<OutboundPdu> {
    fn send(&mut self, pdu: OutboundPdu) {
        self.push(pdu);
    }
}
