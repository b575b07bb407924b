//! ACK PDU: acknowledges an EOF or Finished directive.

use crate::condition::ConditionCode;
use crate::directive::AckedDirective;

/// ACK PDU fields (CCSDS 727.0-B-4 §5.2.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AckPdu {
    /// Which directive is being acknowledged.
    pub acked_directive: AckedDirective,
    /// Condition code carried on the acknowledged directive.
    pub condition_code: ConditionCode,
}
