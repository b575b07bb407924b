//! The receiver state machine: the per-transaction event loop that drives
//! metadata, file-data, EOF, NAK, and Finished/ACK handling.

use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::Path;
use std::time::Instant;

use cfdp_assembler::Assembler;
use cfdp_gap::GapTracker;
use cfdp_pdu::condition::ConditionCode;
use cfdp_pdu::eof::EofPdu;
use cfdp_pdu::filedata::FileDataPdu;
use cfdp_pdu::finished::FinishedPdu;
use cfdp_pdu::header::TransmissionMode;
use cfdp_pdu::metadata::MetadataPdu;
use cfdp_pdu::nak::NakPdu;
use cfdp_pdu::transaction::TransactionId;
use cfdp_timer::TimerService;

use crate::config::ReceiverConfig;
use crate::error::ReceiverError;
use crate::event::{OutboundPdu, ReceiverEvent, TimerKey};
use crate::fault::FaultAction;
use crate::sink::PduSink;
use crate::state::{Outcome, ReceiverState};

/// One CFDP transaction's receiver-side state machine. Owns its
/// [`GapTracker`], [`Assembler`], and [`TimerService`] exclusively for the
/// transaction's lifetime.
#[derive(Debug)]
pub struct Receiver {
    transaction_id: TransactionId,
    config: ReceiverConfig,
    transmission_mode: TransmissionMode,
    state: ReceiverState,
    suspended: bool,
    metadata: Option<MetadataPdu>,
    gap: GapTracker,
    assembler: Option<Assembler>,
    timers: TimerService<TimerKey>,
    eof_checksum: Option<u32>,
    eof_file_size: Option<u64>,
    stashed_eof: Option<EofPdu>,
    nak_count: u32,
    finished_pdu: Option<FinishedPdu>,
    finished_retransmit_count: u32,
    out_of_order_buffer: VecDeque<FileDataPdu>,
    outcome: Option<Outcome>,
    span: tracing::Span,
}

impl Receiver {
    /// Creates a receiver for `transaction_id`, starting the inactivity
    /// timer immediately as `S1 AWAITING_METADATA` begins.
    #[must_use]
    pub fn new(transaction_id: TransactionId, config: ReceiverConfig, now: Instant) -> Self {
        let transmission_mode = config.transmission_mode_default;
        let mut timers = TimerService::new();
        timers.schedule_after(TimerKey::Inactivity, now, config.inactivity_timeout);
        let span = cfdp_logging::transaction_span(
            transaction_id.source_entity_id,
            transaction_id.transaction_seq_no,
        );
        Self {
            transaction_id,
            config,
            transmission_mode,
            state: ReceiverState::AwaitingMetadata,
            suspended: false,
            metadata: None,
            gap: GapTracker::new(None),
            assembler: None,
            timers,
            eof_checksum: None,
            eof_file_size: None,
            stashed_eof: None,
            nak_count: 0,
            finished_pdu: None,
            finished_retransmit_count: 0,
            out_of_order_buffer: VecDeque::new(),
            outcome: None,
            span,
        }
    }

    /// This transaction's identity.
    #[must_use]
    pub const fn transaction_id(&self) -> TransactionId {
        self.transaction_id
    }

    /// The current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ReceiverState {
        self.state
    }

    /// Whether the transaction is frozen awaiting `E_RESUME`.
    #[must_use]
    pub const fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Whether the transaction is in `S4`, awaiting an ACK of its Finished
    /// PDU.
    #[must_use]
    pub const fn is_awaiting_finished_ack(&self) -> bool {
        matches!(self.state, ReceiverState::SendingFinished)
    }

    /// How the transaction concluded, once it has reached a terminal state.
    #[must_use]
    pub const fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// The current missing-range list, for observability/testing.
    #[must_use]
    pub fn missing(&self) -> Vec<std::ops::Range<u64>> {
        self.gap.missing()
    }

    /// Number of NAKs sent so far.
    #[must_use]
    pub const fn nak_count(&self) -> u32 {
        self.nak_count
    }

    /// Drives every timer due at `now`, in scheduled-time order, feeding
    /// each fired key back in as the matching event — a timer fire is just
    /// another event from the receiver's point of view.
    pub fn tick(&mut self, now: Instant, sink: &mut impl PduSink) {
        let _guard = self.span.clone().entered();
        for key in self.timers.tick(now) {
            let event = match key {
                TimerKey::Nak => ReceiverEvent::NakTimer,
                TimerKey::Inactivity => ReceiverEvent::InactivityTimer,
                TimerKey::FinishedAckWait => ReceiverEvent::FinishedAckTimer,
            };
            self.handle_event(event, now, sink);
        }
    }

    /// Consumes one event, driving any state transition, gap/assembler
    /// mutation, timer (re)scheduling, and outbound PDU emission to
    /// completion before returning.
    pub fn handle_event(&mut self, event: ReceiverEvent, now: Instant, sink: &mut impl PduSink) {
        let _guard = self.span.clone().entered();
        if self.state.is_terminal() {
            tracing::trace!(transaction = %self.transaction_id, ?event, "ignoring event on closed transaction");
            return;
        }

        if self.suspended {
            match event {
                ReceiverEvent::Resume => self.resume(now),
                ReceiverEvent::Cancel => {
                    self.raise_fault(ConditionCode::CancelRequestReceived, now, sink);
                }
                _ => tracing::trace!(transaction = %self.transaction_id, ?event, "ignoring event while suspended"),
            }
            return;
        }

        match event {
            ReceiverEvent::Suspend => {
                self.notice_of_suspension();
                return;
            }
            ReceiverEvent::Cancel => {
                self.raise_fault(ConditionCode::CancelRequestReceived, now, sink);
                return;
            }
            ReceiverEvent::Resume => return,
            _ => {}
        }

        match self.state {
            ReceiverState::AwaitingMetadata => self.handle_s1(event, now, sink),
            ReceiverState::Receiving => self.handle_s2(event, now, sink),
            ReceiverState::AwaitingCompletion => {
                tracing::trace!(transaction = %self.transaction_id, ?event, "ignoring event during completion validation");
            }
            ReceiverState::SendingFinished => self.handle_s4(event, now, sink),
            ReceiverState::Closed => unreachable!("terminal state handled above"),
        }
    }

    // --- S1 AWAITING_METADATA ------------------------------------------

    fn handle_s1(&mut self, event: ReceiverEvent, now: Instant, sink: &mut impl PduSink) {
        match event {
            ReceiverEvent::Metadata(pdu) => self.on_metadata(pdu, now, sink),
            ReceiverEvent::FileData(pdu) => self.buffer_out_of_order(pdu, now),
            ReceiverEvent::EofNoError(pdu) | ReceiverEvent::EofWithError(pdu) => {
                self.stashed_eof = Some(pdu);
                self.restart_inactivity(now);
            }
            ReceiverEvent::InactivityTimer => {
                self.raise_fault(ConditionCode::InactivityDetected, now, sink);
            }
            _ => tracing::trace!(transaction = %self.transaction_id, ?event, "ignoring event while awaiting metadata"),
        }
    }

    fn on_metadata(&mut self, pdu: MetadataPdu, now: Instant, sink: &mut impl PduSink) {
        match Assembler::open(&self.config.data_paths.tempfiles, &self.transaction_id) {
            Ok(assembler) => self.assembler = Some(assembler),
            Err(err) => {
                tracing::error!(transaction = %self.transaction_id, error = %err, "failed to open assembler temp file");
                self.metadata = Some(pdu);
                self.raise_fault(ConditionCode::FilestoreRejection, now, sink);
                return;
            }
        }

        self.gap = GapTracker::new(pdu.known_file_size());
        self.metadata = Some(pdu);
        self.restart_inactivity(now);
        self.state = ReceiverState::Receiving;

        let buffered: Vec<_> = self.out_of_order_buffer.drain(..).collect();
        for segment in buffered {
            if self.state != ReceiverState::Receiving {
                break;
            }
            self.apply_file_data(segment, now, sink);
        }

        if self.state == ReceiverState::Receiving {
            if let Some(eof) = self.stashed_eof.take() {
                if eof.is_fault() {
                    self.restart_inactivity(now);
                    self.raise_fault(eof.condition_code, now, sink);
                } else {
                    self.apply_eof(eof, now, sink);
                }
            }
        }
    }

    fn buffer_out_of_order(&mut self, pdu: FileDataPdu, now: Instant) {
        let bound = self.config.max_out_of_order_buffer.get() as usize;
        if self.out_of_order_buffer.len() >= bound {
            self.out_of_order_buffer.pop_front();
            tracing::warn!(
                transaction = %self.transaction_id,
                bound,
                "out-of-order file-data buffer overflowed; oldest segment dropped (FILESTORE_REJECTION candidate)"
            );
        }
        self.out_of_order_buffer.push_back(pdu);
        self.restart_inactivity(now);
    }

    // --- S2 RECEIVING ----------------------------------------------------

    fn handle_s2(&mut self, event: ReceiverEvent, now: Instant, sink: &mut impl PduSink) {
        match event {
            ReceiverEvent::FileData(pdu) => self.apply_file_data(pdu, now, sink),
            ReceiverEvent::EofNoError(pdu) => self.apply_eof(pdu, now, sink),
            ReceiverEvent::EofWithError(pdu) => {
                self.restart_inactivity(now);
                self.raise_fault(pdu.condition_code, now, sink);
            }
            ReceiverEvent::NakTimer => self.on_nak_timer(now, sink),
            ReceiverEvent::InactivityTimer => {
                self.raise_fault(ConditionCode::InactivityDetected, now, sink);
            }
            ReceiverEvent::Metadata(_) => {
                tracing::trace!(transaction = %self.transaction_id, "duplicate metadata PDU ignored");
            }
            _ => tracing::trace!(transaction = %self.transaction_id, ?event, "ignoring event while receiving"),
        }
    }

    fn apply_file_data(&mut self, pdu: FileDataPdu, now: Instant, sink: &mut impl PduSink) {
        let offset = pdu.segment_offset();
        let end = pdu.end_offset();

        let outcome = match self.gap.mark_received(offset, end) {
            Ok(outcome) => outcome,
            Err(err) => {
                let err: ReceiverError = err.into();
                self.raise_fault(err.condition_code(), now, sink);
                return;
            }
        };

        if let Some(assembler) = self.assembler.as_mut() {
            if let Err(err) = assembler.write(offset, pdu.data()) {
                let err: ReceiverError = err.into();
                self.raise_fault(err.condition_code(), now, sink);
                return;
            }
        }

        if outcome.file_size_error {
            self.raise_fault(ConditionCode::FileSizeError, now, sink);
            return;
        }

        self.restart_inactivity(now);
        self.maybe_complete(now, sink);
    }

    fn apply_eof(&mut self, pdu: EofPdu, now: Instant, sink: &mut impl PduSink) {
        self.eof_checksum = Some(pdu.file_checksum);
        self.eof_file_size = Some(pdu.file_size);
        let overran = self.gap.set_upper_bound(pdu.file_size);
        self.restart_inactivity(now);

        if self.transmission_mode == TransmissionMode::Acknowledged {
            self.nak_count = 0;
            self.timers
                .schedule_after(TimerKey::Nak, now, self.config.nak_timeout);
        }

        if overran {
            self.raise_fault(ConditionCode::FileSizeError, now, sink);
            return;
        }

        self.maybe_complete(now, sink);
    }

    fn maybe_complete(&mut self, now: Instant, sink: &mut impl PduSink) {
        if self.state != ReceiverState::Receiving {
            return;
        }
        if self.gap.is_complete() && self.eof_file_size.is_some() {
            self.enter_awaiting_completion(now, sink);
        }
    }

    fn on_nak_timer(&mut self, now: Instant, sink: &mut impl PduSink) {
        let gaps = self.gap.missing();
        if gaps.is_empty() {
            return;
        }
        if let Some(nak) = NakPdu::from_gaps(&gaps) {
            self.emit(OutboundPdu::Nak(nak), sink);
        }
        self.nak_count += 1;
        self.timers
            .schedule_after(TimerKey::Nak, now, self.config.nak_timeout);
        if self.nak_count > self.config.nak_limit.get() {
            self.raise_fault(ConditionCode::NakLimitReached, now, sink);
        }
    }

    // --- S3 AWAITING_COMPLETION ------------------------------------------

    fn enter_awaiting_completion(&mut self, now: Instant, sink: &mut impl PduSink) {
        self.state = ReceiverState::AwaitingCompletion;

        let Some(mut assembler) = self.assembler.take() else {
            self.raise_fault(ConditionCode::FilestoreRejection, now, sink);
            return;
        };
        let expected_size = self.eof_file_size.unwrap_or(0);
        let expected_checksum = self.eof_checksum.unwrap_or(0);

        let outcome = match assembler.finalize(expected_size, expected_checksum) {
            Ok(outcome) => outcome,
            Err(err) => {
                let err: ReceiverError = err.into();
                self.raise_fault(err.condition_code(), now, sink);
                return;
            }
        };

        if !outcome.checksum_matched() {
            if let Err(err) = assembler.discard() {
                tracing::error!(transaction = %self.transaction_id, error = %err, "failed to discard temp file after checksum mismatch");
            }
            self.raise_fault(ConditionCode::FileChecksumFailure, now, sink);
            return;
        }

        let Some(metadata) = self.metadata.as_ref() else {
            self.raise_fault(ConditionCode::FilestoreRejection, now, sink);
            return;
        };
        let destination_str = String::from_utf8_lossy(metadata.destination_path()).into_owned();
        let destination = self
            .config
            .data_paths
            .resolve_destination(Path::new(&destination_str));

        match assembler.promote(&destination) {
            Ok(_promote_outcome) => {
                self.timers.cancel(&TimerKey::Nak);
                self.timers.cancel(&TimerKey::Inactivity);
                self.outcome = Some(Outcome::Complete);
                self.send_finished(FinishedPdu::complete(), now, sink);
            }
            Err(err) => {
                let err: ReceiverError = err.into();
                self.raise_fault(err.condition_code(), now, sink);
            }
        }
    }

    // --- S4 SENDING_FINISHED ---------------------------------------------

    fn handle_s4(&mut self, event: ReceiverEvent, now: Instant, sink: &mut impl PduSink) {
        match event {
            ReceiverEvent::AckFinished(_ack) => {
                self.timers.cancel(&TimerKey::FinishedAckWait);
                self.state = ReceiverState::Closed;
                if self.outcome.is_none() {
                    self.outcome = Some(Outcome::Complete);
                }
            }
            ReceiverEvent::FinishedAckTimer => self.on_finished_ack_timer(now, sink),
            _ => tracing::trace!(transaction = %self.transaction_id, ?event, "ignoring event while awaiting Finished ACK"),
        }
    }

    fn on_finished_ack_timer(&mut self, now: Instant, sink: &mut impl PduSink) {
        if self.finished_retransmit_count < self.config.ack_limit.get() {
            if let Some(finished) = self.finished_pdu {
                self.emit(OutboundPdu::Finished(finished), sink);
            }
            self.finished_retransmit_count += 1;
            self.timers
                .schedule_after(TimerKey::FinishedAckWait, now, self.config.ack_timeout);
        } else {
            self.raise_fault(ConditionCode::PositiveAckLimitReached, now, sink);
        }
    }

    fn send_finished(&mut self, finished: FinishedPdu, now: Instant, sink: &mut impl PduSink) {
        if self.transmission_mode == TransmissionMode::Unacknowledged {
            if self.config.unacknowledged_finished_courtesy {
                self.finished_pdu = Some(finished);
                self.emit(OutboundPdu::Finished(finished), sink);
            }
            self.timers.clear();
            self.state = ReceiverState::Closed;
            return;
        }

        self.finished_pdu = Some(finished);
        self.emit(OutboundPdu::Finished(finished), sink);
        self.finished_retransmit_count = 0;
        self.timers
            .schedule_after(TimerKey::FinishedAckWait, now, self.config.ack_timeout);
        self.state = ReceiverState::SendingFinished;
    }

    // --- SF FAULT ---------------------------------------------------------

    fn raise_fault(&mut self, code: ConditionCode, now: Instant, sink: &mut impl PduSink) {
        let action = self.config.fault_action(code);
        tracing::warn!(transaction = %self.transaction_id, ?code, ?action, "condition code raised");
        match action {
            FaultAction::Ignore => {}
            FaultAction::Cancel => self.notice_of_cancellation(code, now, sink),
            FaultAction::Suspend => self.notice_of_suspension(),
            FaultAction::Abandon => self.abandon(code),
        }
    }

    fn notice_of_cancellation(&mut self, code: ConditionCode, now: Instant, sink: &mut impl PduSink) {
        self.release_assembler();
        self.timers.cancel(&TimerKey::Nak);
        self.timers.cancel(&TimerKey::Inactivity);
        self.outcome = Some(Outcome::Faulted(code));
        self.send_finished(FinishedPdu::incomplete(code), now, sink);
    }

    fn notice_of_suspension(&mut self) {
        self.timers.clear();
        self.suspended = true;
    }

    fn resume(&mut self, now: Instant) {
        self.suspended = false;
        self.restart_inactivity(now);
        match self.state {
            ReceiverState::Receiving
                if self.transmission_mode == TransmissionMode::Acknowledged
                    && self.eof_file_size.is_some()
                    && !self.gap.missing().is_empty() =>
            {
                self.timers
                    .schedule_after(TimerKey::Nak, now, self.config.nak_timeout);
            }
            ReceiverState::SendingFinished => {
                self.timers
                    .schedule_after(TimerKey::FinishedAckWait, now, self.config.ack_timeout);
            }
            _ => {}
        }
    }

    fn abandon(&mut self, code: ConditionCode) {
        self.release_assembler();
        self.timers.clear();
        self.outcome = Some(Outcome::Faulted(code));
        self.state = ReceiverState::Closed;
    }

    fn release_assembler(&mut self) {
        let Some(assembler) = self.assembler.take() else {
            return;
        };
        if self.config.retain_temp_on_fault {
            let path = assembler.release_without_discard();
            tracing::info!(path = %path.display(), "retaining temp file for postmortem inspection");
        } else if let Err(err) = assembler.discard() {
            tracing::error!(transaction = %self.transaction_id, error = %err, "failed to discard temp file");
        }
    }

    fn restart_inactivity(&mut self, now: Instant) {
        self.timers
            .schedule_after(TimerKey::Inactivity, now, self.config.inactivity_timeout);
    }

    fn emit(&mut self, pdu: OutboundPdu, sink: &mut impl PduSink) {
        self.audit(&pdu);
        sink.send(pdu);
    }

    fn audit(&self, pdu: &OutboundPdu) {
        let Some(dir) = &self.config.data_paths.pdusink else {
            return;
        };
        if let Err(err) = self.append_audit_record(dir, pdu) {
            tracing::warn!(transaction = %self.transaction_id, error = %err, "failed to append pdusink audit record");
        }
    }

    fn append_audit_record(&self, dir: &Path, pdu: &OutboundPdu) -> std::io::Result<()> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!(
            "tx_{}_{}.pdusink",
            self.transaction_id.source_entity_id, self.transaction_id.transaction_seq_no
        ));
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{pdu:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DataPaths;
    use crate::sink::PduSink;
    use cfdp_assembler::CfdpChecksum;
    use std::time::Duration;
    use tempfile::tempdir;

    fn config(temp: &std::path::Path) -> ReceiverConfig {
        ReceiverConfig::new(DataPaths::new(
            temp.join("incoming"),
            temp.join("outgoing"),
            temp.join("tempfiles"),
        ))
    }

    fn id() -> TransactionId {
        TransactionId::new(1, 1)
    }

    #[test]
    fn nominal_in_order_transfer_completes() {
        let dir = tempdir().unwrap();
        let now = Instant::now();
        let mut receiver = Receiver::new(id(), config(dir.path()), now);
        let mut out = Vec::new();

        let data = vec![0xAB_u8; 4096];
        let checksum = CfdpChecksum::digest(&data);

        let meta = MetadataPdu::new(b"src".to_vec(), b"dst.bin".to_vec(), 4096).unwrap();
        receiver.handle_event(ReceiverEvent::Metadata(meta), now, &mut out);
        assert_eq!(receiver.state(), ReceiverState::Receiving);

        for offset in (0..4096u64).step_by(1024) {
            let chunk = data[offset as usize..offset as usize + 1024].to_vec();
            let fd = FileDataPdu::new(offset, chunk).unwrap();
            receiver.handle_event(ReceiverEvent::FileData(fd), now, &mut out);
        }

        let eof = EofPdu::nominal(checksum, 4096);
        receiver.handle_event(ReceiverEvent::EofNoError(eof), now, &mut out);

        assert!(receiver.missing().is_empty());
        assert!(receiver.is_awaiting_finished_ack());
        assert!(matches!(
            out.last(),
            Some(OutboundPdu::Finished(f)) if f.condition_code == ConditionCode::NoError
        ));

        let dest = dir.path().join("incoming").join("dst.bin");
        assert_eq!(fs::read(&dest).unwrap(), data);
    }

    #[test]
    fn gap_triggers_nak_emission() {
        let dir = tempdir().unwrap();
        let now = Instant::now();
        let mut receiver = Receiver::new(id(), config(dir.path()), now);
        let mut out = Vec::new();

        let meta = MetadataPdu::new(b"src".to_vec(), b"dst.bin".to_vec(), 4096).unwrap();
        receiver.handle_event(ReceiverEvent::Metadata(meta), now, &mut out);

        let fd0 = FileDataPdu::new(0, vec![0u8; 1024]).unwrap();
        receiver.handle_event(ReceiverEvent::FileData(fd0), now, &mut out);
        let eof = EofPdu::nominal(0, 4096);
        receiver.handle_event(ReceiverEvent::EofNoError(eof), now, &mut out);

        assert_eq!(receiver.missing(), vec![1024..4096]);

        let later = now + Duration::from_secs(11);
        receiver.tick(later, &mut out);
        assert_eq!(receiver.nak_count(), 1);
        assert!(matches!(out.last(), Some(OutboundPdu::Nak(n)) if n.segment_requests() == [1024..4096]));
    }

    #[test]
    fn nak_limit_reached_emits_incomplete_finished() {
        let dir = tempdir().unwrap();
        let now = Instant::now();
        let config = config(dir.path()).with_nak_policy(
            Duration::from_secs(1),
            std::num::NonZeroU32::new(2).unwrap(),
        );
        let mut receiver = Receiver::new(id(), config, now);
        let mut out = Vec::new();

        let meta = MetadataPdu::new(b"src".to_vec(), b"dst.bin".to_vec(), 4096).unwrap();
        receiver.handle_event(ReceiverEvent::Metadata(meta), now, &mut out);
        let fd0 = FileDataPdu::new(0, vec![0u8; 1024]).unwrap();
        receiver.handle_event(ReceiverEvent::FileData(fd0), now, &mut out);
        let eof = EofPdu::nominal(0, 4096);
        receiver.handle_event(ReceiverEvent::EofNoError(eof), now, &mut out);

        let mut t = now;
        for _ in 0..3 {
            t += Duration::from_secs(2);
            receiver.tick(t, &mut out);
        }

        assert_eq!(
            receiver.outcome(),
            Some(Outcome::Faulted(ConditionCode::NakLimitReached))
        );
        assert!(matches!(
            out.last(),
            Some(OutboundPdu::Finished(f))
                if f.condition_code == ConditionCode::NakLimitReached
        ));
    }

    #[test]
    fn checksum_mismatch_discards_and_reports_incomplete() {
        let dir = tempdir().unwrap();
        let now = Instant::now();
        let mut receiver = Receiver::new(id(), config(dir.path()), now);
        let mut out = Vec::new();

        let meta = MetadataPdu::new(b"src".to_vec(), b"dst.bin".to_vec(), 5).unwrap();
        receiver.handle_event(ReceiverEvent::Metadata(meta), now, &mut out);
        let fd = FileDataPdu::new(0, b"hello".to_vec()).unwrap();
        receiver.handle_event(ReceiverEvent::FileData(fd), now, &mut out);
        let eof = EofPdu::nominal(0xFFFF_FFFF, 5);
        receiver.handle_event(ReceiverEvent::EofNoError(eof), now, &mut out);

        assert_eq!(
            receiver.outcome(),
            Some(Outcome::Faulted(ConditionCode::FileChecksumFailure))
        );
        assert!(!dir.path().join("incoming").join("dst.bin").exists());
    }

    #[test]
    fn inactivity_before_metadata_cancels() {
        let dir = tempdir().unwrap();
        let now = Instant::now();
        let config = config(dir.path()).with_inactivity_timeout(Duration::from_secs(5));
        let mut receiver = Receiver::new(id(), config, now);
        let mut out = Vec::new();

        receiver.tick(now + Duration::from_secs(6), &mut out);

        assert_eq!(
            receiver.outcome(),
            Some(Outcome::Faulted(ConditionCode::InactivityDetected))
        );
        assert!(receiver.is_awaiting_finished_ack());
    }

    #[test]
    fn out_of_order_metadata_replays_buffered_segments() {
        let dir = tempdir().unwrap();
        let now = Instant::now();
        let mut receiver = Receiver::new(id(), config(dir.path()), now);
        let mut out = Vec::new();

        let data = vec![0x11_u8; 2048];
        let checksum = CfdpChecksum::digest(&data);

        for offset in (0..2048u64).step_by(1024) {
            let chunk = data[offset as usize..offset as usize + 1024].to_vec();
            let fd = FileDataPdu::new(offset, chunk).unwrap();
            receiver.handle_event(ReceiverEvent::FileData(fd), now, &mut out);
        }
        assert_eq!(receiver.state(), ReceiverState::AwaitingMetadata);

        let eof = EofPdu::nominal(checksum, 2048);
        receiver.handle_event(ReceiverEvent::EofNoError(eof), now, &mut out);
        assert_eq!(receiver.state(), ReceiverState::AwaitingMetadata);

        let meta = MetadataPdu::new(b"src".to_vec(), b"dst.bin".to_vec(), 2048).unwrap();
        receiver.handle_event(ReceiverEvent::Metadata(meta), now, &mut out);

        assert!(receiver.is_awaiting_finished_ack());
        let dest = dir.path().join("incoming").join("dst.bin");
        assert_eq!(fs::read(&dest).unwrap(), data);
    }

    #[test]
    fn ack_finished_closes_the_transaction() {
        let dir = tempdir().unwrap();
        let now = Instant::now();
        let mut receiver = Receiver::new(id(), config(dir.path()), now);
        let mut out = Vec::new();

        let meta = MetadataPdu::new(b"src".to_vec(), b"dst.bin".to_vec(), 5).unwrap();
        receiver.handle_event(ReceiverEvent::Metadata(meta), now, &mut out);
        let fd = FileDataPdu::new(0, b"hello".to_vec()).unwrap();
        receiver.handle_event(ReceiverEvent::FileData(fd), now, &mut out);
        let eof = EofPdu::nominal(CfdpChecksum::digest(b"hello"), 5);
        receiver.handle_event(ReceiverEvent::EofNoError(eof), now, &mut out);
        assert!(receiver.is_awaiting_finished_ack());

        let ack = cfdp_pdu::ack::AckPdu {
            acked_directive: cfdp_pdu::directive::AckedDirective::Finished,
            condition_code: ConditionCode::NoError,
        };
        receiver.handle_event(ReceiverEvent::AckFinished(ack), now, &mut out);
        assert_eq!(receiver.state(), ReceiverState::Closed);
        assert_eq!(receiver.outcome(), Some(Outcome::Complete));
    }

    #[test]
    fn cancel_request_discards_and_closes_after_ack() {
        let dir = tempdir().unwrap();
        let now = Instant::now();
        let mut receiver = Receiver::new(id(), config(dir.path()), now);
        let mut out = Vec::new();

        let meta = MetadataPdu::new(b"src".to_vec(), b"dst.bin".to_vec(), 4096).unwrap();
        receiver.handle_event(ReceiverEvent::Metadata(meta), now, &mut out);
        receiver.handle_event(ReceiverEvent::Cancel, now, &mut out);

        assert!(receiver.is_awaiting_finished_ack());
        assert_eq!(
            receiver.outcome(),
            Some(Outcome::Faulted(ConditionCode::CancelRequestReceived))
        );
        assert!(matches!(
            out.last(),
            Some(OutboundPdu::Finished(f)) if f.condition_code == ConditionCode::CancelRequestReceived
        ));
    }

    #[test]
    fn suspend_then_resume_restarts_nak_timer() {
        let dir = tempdir().unwrap();
        let now = Instant::now();
        let mut receiver = Receiver::new(id(), config(dir.path()), now);
        let mut out = Vec::new();

        let meta = MetadataPdu::new(b"src".to_vec(), b"dst.bin".to_vec(), 4096).unwrap();
        receiver.handle_event(ReceiverEvent::Metadata(meta), now, &mut out);
        let fd0 = FileDataPdu::new(0, vec![0u8; 1024]).unwrap();
        receiver.handle_event(ReceiverEvent::FileData(fd0), now, &mut out);
        let eof = EofPdu::nominal(0, 4096);
        receiver.handle_event(ReceiverEvent::EofNoError(eof), now, &mut out);

        receiver.handle_event(ReceiverEvent::Suspend, now, &mut out);
        assert!(receiver.is_suspended());

        receiver.tick(now + Duration::from_secs(20), &mut out);
        assert_eq!(receiver.nak_count(), 0, "suspended transaction must not fire timers");

        receiver.handle_event(ReceiverEvent::Resume, now + Duration::from_secs(20), &mut out);
        assert!(!receiver.is_suspended());

        receiver.tick(now + Duration::from_secs(31), &mut out);
        assert_eq!(receiver.nak_count(), 1);
    }

    #[test]
    fn unacknowledged_mode_closes_without_awaiting_ack() {
        let dir = tempdir().unwrap();
        let now = Instant::now();
        let config = config(dir.path())
            .with_transmission_mode_default(TransmissionMode::Unacknowledged);
        let mut receiver = Receiver::new(id(), config, now);
        let mut out = Vec::new();

        let meta = MetadataPdu::new(b"src".to_vec(), b"dst.bin".to_vec(), 5).unwrap();
        receiver.handle_event(ReceiverEvent::Metadata(meta), now, &mut out);
        let fd = FileDataPdu::new(0, b"hello".to_vec()).unwrap();
        receiver.handle_event(ReceiverEvent::FileData(fd), now, &mut out);
        let eof = EofPdu::nominal(CfdpChecksum::digest(b"hello"), 5);
        receiver.handle_event(ReceiverEvent::EofNoError(eof), now, &mut out);

        assert_eq!(receiver.state(), ReceiverState::Closed);
        assert_eq!(receiver.outcome(), Some(Outcome::Complete));
        assert!(matches!(out.last(), Some(OutboundPdu::Finished(_))));
    }

    #[test]
    fn file_size_error_truncates_and_faults() {
        let dir = tempdir().unwrap();
        let now = Instant::now();
        let mut receiver = Receiver::new(id(), config(dir.path()), now);
        let mut out = Vec::new();

        let meta = MetadataPdu::new(b"src".to_vec(), b"dst.bin".to_vec(), 1024).unwrap();
        receiver.handle_event(ReceiverEvent::Metadata(meta), now, &mut out);
        let fd = FileDataPdu::new(1000, vec![0xAAu8; 100]).unwrap();
        receiver.handle_event(ReceiverEvent::FileData(fd), now, &mut out);

        assert_eq!(
            receiver.outcome(),
            Some(Outcome::Faulted(ConditionCode::FileSizeError))
        );
    }

    #[test]
    fn retain_temp_on_fault_keeps_the_file_on_disk() {
        let dir = tempdir().unwrap();
        let now = Instant::now();
        let config = config(dir.path()).with_retain_temp_on_fault(true);
        let mut receiver = Receiver::new(id(), config, now);
        let mut out = Vec::new();

        let meta = MetadataPdu::new(b"src".to_vec(), b"dst.bin".to_vec(), 4096).unwrap();
        receiver.handle_event(ReceiverEvent::Metadata(meta), now, &mut out);
        receiver.handle_event(ReceiverEvent::Cancel, now, &mut out);

        let temp_path = dir.path().join("tempfiles").join("tx_1_1.part");
        assert!(temp_path.exists());
    }

    #[test]
    fn overlapping_out_of_order_segments_let_later_write_win() {
        let dir = tempdir().unwrap();
        let now = Instant::now();
        let mut receiver = Receiver::new(id(), config(dir.path()), now);
        let mut out = Vec::new();

        let meta = MetadataPdu::new(b"src".to_vec(), b"dst.bin".to_vec(), 4096).unwrap();
        receiver.handle_event(ReceiverEvent::Metadata(meta), now, &mut out);

        let fd1 = FileDataPdu::new(0, vec![0xAAu8; 1500]).unwrap();
        receiver.handle_event(ReceiverEvent::FileData(fd1), now, &mut out);
        let fd2 = FileDataPdu::new(1000, vec![0xBBu8; 1500]).unwrap();
        receiver.handle_event(ReceiverEvent::FileData(fd2), now, &mut out);
        let fd3 = FileDataPdu::new(2000, vec![0xCCu8; 2096]).unwrap();
        receiver.handle_event(ReceiverEvent::FileData(fd3), now, &mut out);

        assert!(receiver.missing().is_empty());

        let mut expected = vec![0xAAu8; 4096];
        expected[1000..2500].fill(0xBB);
        expected[2000..4096].fill(0xCC);
        let checksum = CfdpChecksum::digest(&expected);
        let eof = EofPdu::nominal(checksum, 4096);
        receiver.handle_event(ReceiverEvent::EofNoError(eof), now, &mut out);

        assert!(receiver.is_awaiting_finished_ack());
        let dest = dir.path().join("incoming").join("dst.bin");
        assert_eq!(fs::read(&dest).unwrap(), expected);
    }
}
