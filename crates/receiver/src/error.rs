//! Internal plumbing error type. See the crate-level `# Errors` section for
//! why this never crosses the public [`crate::Receiver::handle_event`]
//! boundary.

use cfdp_pdu::condition::ConditionCode;
use thiserror::Error;

/// Wraps the lower-level crates' error types so private helpers can use `?`.
/// Every variant resolves to a [`ConditionCode`] via
/// [`ReceiverError::condition_code`], which is how the failure actually
/// reaches the transaction: through the fault path, not a returned `Err`.
#[derive(Debug, Error)]
pub enum ReceiverError {
    /// A gap-tracker misuse (`start > end`). [`cfdp_pdu::filedata::FileDataPdu`]'s
    /// invariant (non-empty payload) already guarantees `start < end` for
    /// every segment the receiver constructs a mark from, so this should be
    /// unreachable in practice; it is still wired so a defensive
    /// caller-supplied range cannot panic.
    #[error(transparent)]
    Gap(#[from] cfdp_gap::GapError),
    /// The assembler could not write, finalize, or promote the file.
    #[error(transparent)]
    Assembler(#[from] cfdp_assembler::AssemblerError),
}

impl ReceiverError {
    /// The condition code this error should raise on the owning
    /// transaction.
    #[must_use]
    pub const fn condition_code(&self) -> ConditionCode {
        match self {
            Self::Gap(_) => ConditionCode::FileSizeError,
            Self::Assembler(_) => ConditionCode::FilestoreRejection,
        }
    }
}
