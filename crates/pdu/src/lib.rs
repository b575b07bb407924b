#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cfdp_pdu` describes the shape of the CCSDS File Delivery Protocol PDUs
//! that a Class-2 receiver entity consumes and emits. The wire codec
//! (octet-stream ⇄ structured PDU) is an external collaborator; this crate
//! only defines the structured form the receiver state machine operates on.
//!
//! # Design
//!
//! Each PDU gets its own module: [`header`] for the fields common to every
//! PDU, [`metadata`]/[`filedata`]/[`eof`] for the three inbound data-transfer
//! PDUs, and [`nak`]/[`finished`]/[`ack`] for the PDUs the receiver emits.
//! [`condition`] and [`directive`] hold the enumerated codes shared across
//! PDU kinds. [`transaction`] holds the transaction identity that keys every
//! receiver instance.
//!
//! # Invariants
//!
//! - Path fields ([`metadata::MetadataPdu::source_path`],
//!   [`metadata::MetadataPdu::destination_path`]) are never longer than 255
//!   octets, matching the one-octet length prefix CCSDS 727.0-B-4 mandates.
//! - [`filedata::FileDataPdu::data`] is never empty; a zero-length segment
//!   carries no information and is rejected at construction.
//! - [`nak::NakPdu::segment_requests`] is always sorted by start offset with
//!   non-overlapping ranges, mirroring [`nak::NakPdu::from_gaps`]'s contract.
//!
//! # Errors
//!
//! Construction helpers return [`PduError`] rather than panicking when a
//! caller supplies data that violates one of the above invariants.
//!
//! # Examples
//!
//! ```
//! use cfdp_pdu::filedata::FileDataPdu;
//!
//! let segment = FileDataPdu::new(1024, vec![0xAB; 512]).unwrap();
//! assert_eq!(segment.end_offset(), 1536);
//! ```
//!
//! # See also
//!
//! - [`cfdp_gap`](https://docs.rs/cfdp_gap) for the gap tracker that consumes
//!   [`filedata::FileDataPdu`] offsets.
//! - [`cfdp_receiver`](https://docs.rs/cfdp_receiver) for the state machine
//!   that drives PDU exchange end to end.

/// PDU-common header fields and enumerations.
pub mod header;
/// Condition codes carried on EOF/ACK/Finished PDUs.
pub mod condition;
/// Directive codes identifying which directive an ACK acknowledges.
pub mod directive;
/// Transaction identity.
pub mod transaction;
/// Metadata PDU (file size, source/destination paths).
pub mod metadata;
/// File-data PDU (one payload segment).
pub mod filedata;
/// EOF PDU (end-of-transmission announcement with checksum).
pub mod eof;
/// NAK PDU (selective retransmission request, receiver-emitted).
pub mod nak;
/// Finished PDU (transaction outcome, receiver-emitted).
pub mod finished;
/// ACK PDU (acknowledges EOF or Finished).
pub mod ack;

mod error;

pub use error::PduError;
