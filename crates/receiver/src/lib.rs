#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cfdp_receiver` is the CFDP Class-2 (acknowledged) receiver entity's core
//! state machine: it consumes PDU-arrival and timer-fire events, drives one
//! transaction through its lifecycle, and owns that transaction's
//! [`cfdp_gap::GapTracker`], [`cfdp_assembler::Assembler`], and
//! [`cfdp_timer::TimerService`].
//!
//! # Design
//!
//! [`Receiver`] holds a [`state::ReceiverState`] and dispatches events with
//! explicit transition functions via `match (self.state, event)` rather than
//! a dynamic event-to-handler table. Outbound PDUs are delivered through an
//! injected [`sink::PduSink`] rather than a stored closure, so the receiver
//! never owns a trait object or fights a closure's captured lifetime —
//! callers hand it a `Vec` or `FnMut` at the call site instead. A raised
//! condition code is resolved to one of [`fault::FaultAction`] via
//! [`config::ReceiverConfig::fault_handlers`] before the receiver decides
//! whether (and how) to notify the peer.
//!
//! # Invariants
//!
//! - [`Receiver::handle_event`] never panics on well-formed PDU input; a
//!   fallible internal operation (gap-tracker misuse, assembler I/O) is
//!   always resolved to a condition code and routed through the fault path
//!   rather than surfaced as a `Result::Err` to the caller.
//! - One event is processed to completion — including every mutation,
//!   emitted PDU, and timer reschedule — before
//!   [`Receiver::handle_event`] returns; callers choosing to run multiple
//!   transactions concurrently must serialize calls per transaction
//!   themselves.
//!
//! # Errors
//!
//! [`error::ReceiverError`] is an internal plumbing type: it is never
//! returned from [`Receiver::handle_event`] or [`Receiver::tick`]. It exists
//! so private helpers that call into [`cfdp_gap`]/[`cfdp_assembler`] can use
//! `?` and have the caller convert the failure into a condition code via
//! [`error::ReceiverError::condition_code`].
//!
//! # Examples
//!
//! ```
//! use std::time::Instant;
//! use tempfile::tempdir;
//!
//! use cfdp_pdu::metadata::MetadataPdu;
//! use cfdp_pdu::filedata::FileDataPdu;
//! use cfdp_pdu::eof::EofPdu;
//! use cfdp_pdu::transaction::TransactionId;
//! use cfdp_receiver::{Receiver, ReceiverConfig, ReceiverEvent, DataPaths};
//!
//! let dir = tempdir().unwrap();
//! let data_paths = DataPaths::new(
//!     dir.path().join("incoming"),
//!     dir.path().join("outgoing"),
//!     dir.path().join("tempfiles"),
//! );
//! let config = ReceiverConfig::new(data_paths);
//! let id = TransactionId::new(1, 1);
//! let now = Instant::now();
//! let mut receiver = Receiver::new(id, config, now);
//! let mut outbound = Vec::new();
//!
//! let metadata = MetadataPdu::new(b"src.bin".to_vec(), b"dst.bin".to_vec(), 5).unwrap();
//! receiver.handle_event(ReceiverEvent::Metadata(metadata), now, &mut outbound);
//! let segment = FileDataPdu::new(0, b"hello".to_vec()).unwrap();
//! receiver.handle_event(ReceiverEvent::FileData(segment), now, &mut outbound);
//! let checksum = cfdp_assembler::CfdpChecksum::digest(b"hello");
//! let eof = EofPdu::nominal(checksum, 5);
//! receiver.handle_event(ReceiverEvent::EofNoError(eof), now, &mut outbound);
//! assert!(receiver.is_awaiting_finished_ack());
//! ```
//!
//! # See also
//!
//! - [`cfdp_pdu`](https://docs.rs/cfdp_pdu) for the PDU envelope shapes this
//!   crate's events and outbound PDUs carry.
//! - this crate's `tests/` directory for the end-to-end scenarios exercising
//!   the full transition table.

/// Receiver configuration, filesystem layout, and fault-handler mapping.
pub mod config;
/// Raised-condition-code to fault-action dispatch.
pub mod fault;
/// Inbound events the state machine consumes and outbound PDUs it emits.
pub mod event;
/// Internal plumbing error type.
pub mod error;
/// The lifecycle states a transaction moves through.
pub mod state;
/// Outbound PDU delivery.
pub mod sink;
mod machine;

pub use config::{DataPaths, ReceiverConfig};
pub use error::ReceiverError;
pub use event::{OutboundPdu, ReceiverEvent, TimerKey};
pub use fault::FaultAction;
pub use machine::Receiver;
pub use sink::PduSink;
pub use state::ReceiverState;
