//! Receiver configuration: timers, fault handlers, and the filesystem layout.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cfdp_pdu::condition::ConditionCode;
use cfdp_pdu::header::TransmissionMode;

use crate::fault::FaultAction;

const DEFAULT_NAK_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_NAK_LIMIT: u32 = 10;
const DEFAULT_INACTIVITY_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_ACK_LIMIT: u32 = 5;
const DEFAULT_MAX_OUT_OF_ORDER_BUFFER: usize = 64;

/// The directories a receiver reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataPaths {
    /// Base directory that destination paths are rooted under.
    pub incoming: PathBuf,
    /// Base directory that source paths are rooted under (read by the
    /// sender side of a full CFDP entity; the receiver core only needs it to
    /// resolve a transaction's full source path for logging/audit).
    pub outgoing: PathBuf,
    /// Directory holding one transaction's in-progress temp file.
    pub tempfiles: PathBuf,
    /// Optional directory every emitted outbound PDU is also appended to,
    /// for audit. `None` disables the audit sink.
    pub pdusink: Option<PathBuf>,
}

impl DataPaths {
    /// Builds a [`DataPaths`] with no audit sink configured.
    pub fn new(
        incoming: impl Into<PathBuf>,
        outgoing: impl Into<PathBuf>,
        tempfiles: impl Into<PathBuf>,
    ) -> Self {
        Self {
            incoming: incoming.into(),
            outgoing: outgoing.into(),
            tempfiles: tempfiles.into(),
            pdusink: None,
        }
    }

    /// Enables the audit sink at `path`.
    #[must_use]
    pub fn with_pdusink(mut self, path: impl Into<PathBuf>) -> Self {
        self.pdusink = Some(path.into());
        self
    }

    /// Resolves a destination path (as carried on a Metadata PDU) against
    /// `incoming`.
    #[must_use]
    pub fn resolve_destination(&self, destination_path: &Path) -> PathBuf {
        self.incoming.join(destination_path)
    }
}

/// Receiver configuration. Constructed by explicit setter calls
/// (`with_*`), since the receiver core has no CLI of its own; an embedding
/// application with the `serde` feature enabled may instead deserialize one
/// from TOML/JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReceiverConfig {
    /// How long to wait for a NAK response before retransmitting.
    pub nak_timeout: Duration,
    /// Maximum number of NAK retransmissions before `NAK_LIMIT_REACHED`.
    pub nak_limit: NonZeroU32,
    /// How long to wait for any PDU before `INACTIVITY_DETECTED`.
    pub inactivity_timeout: Duration,
    /// How long to wait for an ACK of Finished before retransmitting.
    pub ack_timeout: Duration,
    /// Maximum number of Finished retransmissions before
    /// `POSITIVE_ACK_LIMIT_REACHED`.
    pub ack_limit: NonZeroU32,
    /// Transmission mode a transaction starts in absent header information
    /// overriding it.
    pub transmission_mode_default: TransmissionMode,
    /// Condition code to fault-handler-action mapping. Codes absent from
    /// this map use [`FaultAction::default_for`].
    pub fault_handlers: HashMap<ConditionCode, FaultAction>,
    /// Filesystem layout.
    pub data_paths: DataPaths,
    /// If `true`, `ABANDON`/cancellation fault paths do not unlink the temp
    /// file, to aid postmortem inspection.
    pub retain_temp_on_fault: bool,
    /// Bound on file-data PDUs buffered in `S1` before metadata arrives.
    pub max_out_of_order_buffer: NonZeroU32,
    /// In `UNACKNOWLEDGED` mode, whether to emit a courtesy Finished PDU on
    /// nominal completion even though no ACK is expected.
    pub unacknowledged_finished_courtesy: bool,
}

impl ReceiverConfig {
    /// Builds a config with reasonable ground-system defaults:
    /// `nak_timeout` 10s, `nak_limit` 10, `inactivity_timeout` 60s,
    /// `ack_timeout` 10s, `ack_limit` 5, `transmission_mode_default`
    /// `Acknowledged`, `max_out_of_order_buffer` 64,
    /// `retain_temp_on_fault` false.
    #[must_use]
    pub fn new(data_paths: DataPaths) -> Self {
        Self {
            nak_timeout: DEFAULT_NAK_TIMEOUT,
            nak_limit: NonZeroU32::new(DEFAULT_NAK_LIMIT).unwrap_or(NonZeroU32::MIN),
            inactivity_timeout: DEFAULT_INACTIVITY_TIMEOUT,
            ack_timeout: DEFAULT_ACK_TIMEOUT,
            ack_limit: NonZeroU32::new(DEFAULT_ACK_LIMIT).unwrap_or(NonZeroU32::MIN),
            transmission_mode_default: TransmissionMode::Acknowledged,
            fault_handlers: HashMap::new(),
            data_paths,
            retain_temp_on_fault: false,
            max_out_of_order_buffer: NonZeroU32::new(DEFAULT_MAX_OUT_OF_ORDER_BUFFER as u32)
                .unwrap_or(NonZeroU32::MIN),
            unacknowledged_finished_courtesy: true,
        }
    }

    /// Overrides the NAK retransmission timeout and attempt limit.
    #[must_use]
    pub const fn with_nak_policy(mut self, timeout: Duration, limit: NonZeroU32) -> Self {
        self.nak_timeout = timeout;
        self.nak_limit = limit;
        self
    }

    /// Overrides the inactivity timeout.
    #[must_use]
    pub const fn with_inactivity_timeout(mut self, timeout: Duration) -> Self {
        self.inactivity_timeout = timeout;
        self
    }

    /// Overrides the Finished-ACK retransmission timeout and attempt limit.
    #[must_use]
    pub const fn with_ack_policy(mut self, timeout: Duration, limit: NonZeroU32) -> Self {
        self.ack_timeout = timeout;
        self.ack_limit = limit;
        self
    }

    /// Overrides the default transmission mode.
    #[must_use]
    pub const fn with_transmission_mode_default(mut self, mode: TransmissionMode) -> Self {
        self.transmission_mode_default = mode;
        self
    }

    /// Installs an explicit handler action for `code`, overriding
    /// [`FaultAction::default_for`].
    #[must_use]
    pub fn with_fault_handler(mut self, code: ConditionCode, action: FaultAction) -> Self {
        self.fault_handlers.insert(code, action);
        self
    }

    /// Overrides `retain_temp_on_fault`.
    #[must_use]
    pub const fn with_retain_temp_on_fault(mut self, retain: bool) -> Self {
        self.retain_temp_on_fault = retain;
        self
    }

    /// Overrides the out-of-order file-data buffer bound.
    #[must_use]
    pub const fn with_max_out_of_order_buffer(mut self, bound: NonZeroU32) -> Self {
        self.max_out_of_order_buffer = bound;
        self
    }

    /// Resolves the fault-handler action for `code`: an explicit entry in
    /// [`ReceiverConfig::fault_handlers`], or [`FaultAction::default_for`].
    #[must_use]
    pub fn fault_action(&self, code: ConditionCode) -> FaultAction {
        self.fault_handlers
            .get(&code)
            .copied()
            .unwrap_or_else(|| FaultAction::default_for(code))
    }
}
