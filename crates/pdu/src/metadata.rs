//! Metadata PDU: announces the file the sender is about to transfer.

use crate::PduError;

const MAX_PATH_LEN: usize = 255;

/// Metadata PDU fields (CCSDS 727.0-B-4 §5.2.5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataPdu {
    source_path: Vec<u8>,
    destination_path: Vec<u8>,
    /// Declared file size. `0` means "unbounded" (unknown ahead of time);
    /// see `cfdp_gap`'s handling of an unpinned upper bound.
    pub file_size: u64,
}

impl MetadataPdu {
    /// Constructs a Metadata PDU, validating the CCSDS one-octet length
    /// prefix on both path fields.
    pub fn new(
        source_path: impl Into<Vec<u8>>,
        destination_path: impl Into<Vec<u8>>,
        file_size: u64,
    ) -> Result<Self, PduError> {
        let source_path = source_path.into();
        let destination_path = destination_path.into();
        if source_path.len() > MAX_PATH_LEN {
            return Err(PduError::PathTooLong {
                len: source_path.len(),
            });
        }
        if destination_path.len() > MAX_PATH_LEN {
            return Err(PduError::PathTooLong {
                len: destination_path.len(),
            });
        }
        Ok(Self {
            source_path,
            destination_path,
            file_size,
        })
    }

    /// Source path octets, as transmitted (no encoding is assumed).
    #[must_use]
    pub fn source_path(&self) -> &[u8] {
        &self.source_path
    }

    /// Destination path octets, as transmitted.
    #[must_use]
    pub fn destination_path(&self) -> &[u8] {
        &self.destination_path
    }

    /// Reports whether `file_size` is a real bound (`Some`) or unbounded
    /// (`None`, file_size `0`).
    #[must_use]
    pub const fn known_file_size(&self) -> Option<u64> {
        if self.file_size == 0 {
            None
        } else {
            Some(self.file_size)
        }
    }
}
