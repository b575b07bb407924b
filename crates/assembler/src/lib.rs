#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cfdp_assembler` is the incremental file assembler: it writes arriving
//! segments into a sparse temporary file, and at completion validates the
//! CFDP modular checksum and promotes the file to its destination.
//!
//! # Design
//!
//! [`Assembler::write`] seeks to the segment's offset and writes through,
//! relying on the filesystem to treat unwritten regions as holes rather than
//! maintaining its own sparse-file bookkeeping. [`Assembler::finalize`]
//! truncates to the declared size and streams the file back through
//! [`checksum::CfdpChecksum`] in fixed-size chunks rather than keeping a
//! running checksum across `write` calls, because overlapping/overwriting
//! segments (later byte wins) would otherwise require undoing a prior
//! word's contribution on every overwrite. [`Assembler::promote`] prefers an
//! atomic rename and falls back to copy-then-unlink across filesystems,
//! logging a structural warning via `tracing` rather than failing the
//! transaction.
//!
//! # Invariants
//!
//! - [`Assembler::write`] with identical bytes at the same offset, repeated
//!   any number of times, leaves the temp file contents unchanged.
//! - [`Assembler::finalize`] never promotes; promotion is always a separate,
//!   explicit call.
//! - The temp file is removed by the time an [`Assembler`] is dropped, via
//!   either an explicit [`Assembler::discard`]/[`Assembler::promote`] call or
//!   the `Drop` safety net (see module-level note on `Assembler::drop`).
//!
//! # Errors
//!
//! All fallible operations return [`AssemblerError`], which wraps the
//! underlying [`std::io::Error`] together with the path that failed.
//!
//! # Examples
//!
//! ```
//! use cfdp_assembler::{Assembler, checksum::CfdpChecksum};
//! use cfdp_pdu::transaction::TransactionId;
//! use tempfile::tempdir;
//!
//! let dir = tempdir().unwrap();
//! let id = TransactionId::new(1, 1);
//! let mut assembler = Assembler::open(dir.path(), &id).unwrap();
//! assembler.write(0, b"hello").unwrap();
//! let checksum = CfdpChecksum::digest(b"hello");
//! let outcome = assembler.finalize(5, checksum).unwrap();
//! assert!(outcome.checksum_matched());
//! ```
//!
//! # See also
//!
//! - [`cfdp_gap`](https://docs.rs/cfdp_gap) decides which offsets are worth
//!   writing at all.
//! - [`cfdp_receiver`](https://docs.rs/cfdp_receiver) drives `open`,
//!   `write`, `finalize`, `promote`/`discard` across a transaction's
//!   lifetime.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use cfdp_pdu::transaction::TransactionId;

/// The CFDP modular checksum.
pub mod checksum;
mod error;

pub use checksum::CfdpChecksum;
pub use error::AssemblerError;

const FINALIZE_CHUNK_SIZE: usize = 64 * 1024;

/// Result of [`Assembler::finalize`].
#[derive(Debug, Clone, Copy)]
pub struct FinalizeOutcome {
    expected_checksum: u32,
    computed_checksum: u32,
}

impl FinalizeOutcome {
    /// The checksum the sender declared on the EOF PDU.
    #[must_use]
    pub const fn expected_checksum(&self) -> u32 {
        self.expected_checksum
    }

    /// The checksum actually computed over the truncated temp file.
    #[must_use]
    pub const fn computed_checksum(&self) -> u32 {
        self.computed_checksum
    }

    /// Whether the computed checksum matched the expected one.
    #[must_use]
    pub const fn checksum_matched(&self) -> bool {
        self.expected_checksum == self.computed_checksum
    }
}

/// Result of [`Assembler::promote`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromoteOutcome {
    /// `false` when the rename had to fall back to copy-then-unlink because
    /// the destination lives on a different filesystem. The receiver should
    /// log this as a structural warning rather than a fault.
    pub atomic: bool,
}

/// Sparse-write incremental file assembler for one transaction's temp file.
#[derive(Debug)]
pub struct Assembler {
    file: File,
    temp_path: PathBuf,
    released: bool,
}

impl Assembler {
    /// Creates and truncates the transaction's temp file under `temp_dir`,
    /// named `tx_<source_id>_<seq>.part`.
    pub fn open(temp_dir: &Path, transaction_id: &TransactionId) -> Result<Self, AssemblerError> {
        fs::create_dir_all(temp_dir).map_err(|source| AssemblerError::io(temp_dir, source))?;
        let temp_path = temp_dir.join(transaction_id.temp_file_name());
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|source| AssemblerError::io(&temp_path, source))?;
        Ok(Self {
            file,
            temp_path,
            released: false,
        })
    }

    /// The temp file's path.
    #[must_use]
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Writes `bytes` at `offset`. Identical repeated writes are harmless;
    /// differing writes at the same offset overwrite — the EOF checksum
    /// compare is what ultimately detects disagreement.
    pub fn write(&mut self, offset: u64, bytes: &[u8]) -> Result<(), AssemblerError> {
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|source| AssemblerError::io(&self.temp_path, source))?;
        self.file
            .write_all(bytes)
            .map_err(|source| AssemblerError::io(&self.temp_path, source))?;
        Ok(())
    }

    /// Truncates to `expected_size`, computes the CFDP modular checksum over
    /// the result, and compares it against `expected_checksum`. Does not
    /// promote the file.
    pub fn finalize(
        &mut self,
        expected_size: u64,
        expected_checksum: u32,
    ) -> Result<FinalizeOutcome, AssemblerError> {
        self.file
            .set_len(expected_size)
            .map_err(|source| AssemblerError::io(&self.temp_path, source))?;
        self.file
            .seek(SeekFrom::Start(0))
            .map_err(|source| AssemblerError::io(&self.temp_path, source))?;

        let mut checksum = CfdpChecksum::new();
        let mut buffer = [0u8; FINALIZE_CHUNK_SIZE];
        loop {
            let read = self
                .file
                .read(&mut buffer)
                .map_err(|source| AssemblerError::io(&self.temp_path, source))?;
            if read == 0 {
                break;
            }
            checksum.update(&buffer[..read]);
        }

        let computed_checksum = checksum.finalize();
        tracing::debug!(
            path = %self.temp_path.display(),
            expected_checksum,
            computed_checksum,
            "finalized transaction temp file"
        );

        Ok(FinalizeOutcome {
            expected_checksum,
            computed_checksum,
        })
    }

    /// Moves the temp file to `destination_path`, creating parent
    /// directories as needed. Prefers an atomic rename; falls back to
    /// copy-then-unlink across filesystems.
    pub fn promote(mut self, destination_path: &Path) -> Result<PromoteOutcome, AssemblerError> {
        if let Some(parent) = destination_path.parent() {
            fs::create_dir_all(parent).map_err(|source| AssemblerError::io(parent, source))?;
        }

        match fs::rename(&self.temp_path, destination_path) {
            Ok(()) => {
                self.released = true;
                Ok(PromoteOutcome { atomic: true })
            }
            Err(_rename_err) => {
                fs::copy(&self.temp_path, destination_path)
                    .map_err(|source| AssemblerError::io(destination_path, source))?;
                fs::remove_file(&self.temp_path)
                    .map_err(|source| AssemblerError::io(&self.temp_path, source))?;
                tracing::warn!(
                    temp_path = %self.temp_path.display(),
                    destination = %destination_path.display(),
                    "promotion fell back to copy-then-unlink across filesystems; no longer atomic"
                );
                self.released = true;
                Ok(PromoteOutcome { atomic: false })
            }
        }
    }

    /// Unlinks the temp file without promoting it.
    pub fn discard(mut self) -> Result<(), AssemblerError> {
        fs::remove_file(&self.temp_path).map_err(|source| AssemblerError::io(&self.temp_path, source))?;
        self.released = true;
        Ok(())
    }

    /// Releases ownership of the temp file without unlinking it, for a
    /// caller that wants to keep it on disk (e.g. `retain_temp_on_fault`
    /// postmortem inspection) while still closing the file handle on drop,
    /// unlike [`std::mem::forget`].
    pub fn release_without_discard(mut self) -> PathBuf {
        self.released = true;
        self.temp_path.clone()
    }
}

impl Drop for Assembler {
    /// Safety net only: the receiver state machine is expected to call
    /// [`Assembler::promote`] or [`Assembler::discard`] on every terminal
    /// transition. If it did not — an early return on an unanticipated
    /// error path, say — this still guarantees the temp file does not leak.
    fn drop(&mut self) {
        if self.released {
            return;
        }
        match fs::remove_file(&self.temp_path) {
            Ok(()) => tracing::warn!(
                path = %self.temp_path.display(),
                "assembler dropped without an explicit promote/discard; temp file removed by the safety net"
            ),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => tracing::error!(
                path = %self.temp_path.display(),
                error = %err,
                "assembler dropped without an explicit promote/discard and cleanup failed"
            ),
        }
    }
}
