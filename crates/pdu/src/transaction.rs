//! Transaction identity.

use std::fmt;

/// Unique identity of a file-delivery transaction: `(source_entity_id,
/// transaction_seq_no)`. Immutable for the lifetime of a receiver instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId {
    /// Entity ID of the file sender.
    pub source_entity_id: u64,
    /// Sequence number, scoped to `source_entity_id`.
    pub transaction_seq_no: u64,
}

impl TransactionId {
    /// Constructs a transaction identity from its component parts.
    #[must_use]
    pub const fn new(source_entity_id: u64, transaction_seq_no: u64) -> Self {
        Self {
            source_entity_id,
            transaction_seq_no,
        }
    }

    /// Returns the temp-file stem this transaction's assembler uses:
    /// `tx_<source_id>_<seq>.part`.
    #[must_use]
    pub fn temp_file_name(&self) -> String {
        format!(
            "tx_{}_{}.part",
            self.source_entity_id, self.transaction_seq_no
        )
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source_entity_id, self.transaction_seq_no)
    }
}
