use thiserror::Error;

/// Errors [`crate::GapTracker`] can raise.
///
/// Overruns past a known upper bound are *not* modeled here; see
/// [`crate::MarkOutcome::file_size_error`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GapError {
    /// `mark_received` was called with `start > end`.
    #[error("received range [{start}, {end}) is inverted")]
    InvalidRange {
        /// The offending start offset.
        start: u64,
        /// The offending end offset.
        end: u64,
    },
}
