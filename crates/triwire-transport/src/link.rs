//! The H5 link transport: state-machine worker, inbound dispatcher, and
//! reliable transmission engine.
//!
//! Three execution contexts touch a link:
//!
//! 1. Caller threads invoke [`H5Transport::open`], [`close`](H5Transport::close)
//!    and [`send`](H5Transport::send).
//! 2. A dedicated worker thread runs the state machine, waiting on the sync
//!    condvar for its current state's exit criteria.
//! 3. The lower transport's callback thread feeds the frame accumulator and
//!    the inbound dispatcher.
//!
//! Callback sites set a flag on the current state's exit-criteria record and
//! notify the shared sync condvar; the worker re-evaluates the record on
//! every wake-up, so spurious wake-ups are harmless. The stop-and-wait
//! engine keeps at most one reliable packet in flight, serialized by the
//! send mutex.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use triwire_core::framing::slip::{slip_frame, slip_unframe};
use triwire_core::packet::link_control::{ConfigField, LinkControl};
use triwire_core::{H5Packet, PacketKind, SeqNum};

use crate::constants::{
    NON_ACTIVE_STATE_TIMEOUT, OPEN_WAIT_TIMEOUT, PACKET_RETRANSMISSIONS, RESET_WAIT_DURATION,
};
use crate::error::TransportError;
use crate::exit_criteria::ExitCriteria;
use crate::reassembly::FrameAccumulator;
use crate::state::LinkState;
use crate::stats::LinkStats;
use crate::trace;
use crate::traits::{
    DataCallback, LowerEvents, LowerTransport, StatusCallback, StatusCode, StatusEvent,
};

/// Construction-time configuration.
#[derive(Debug, Clone)]
pub struct H5Config {
    /// How long `send` waits for an acknowledgement before retransmitting.
    pub retransmission_timeout: Duration,
}

impl Default for H5Config {
    fn default() -> Self {
        H5Config {
            retransmission_timeout: crate::constants::DEFAULT_RETRANSMISSION_TIMEOUT,
        }
    }
}

/// Locks a mutex, ignoring poisoning. Every critical section below leaves
/// the guarded data consistent.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Exit-criteria record of the current state plus the worker run flag.
struct SyncState {
    criteria: ExitCriteria,
    run: bool,
}

/// Stop-and-wait engine state.
struct AckState {
    /// Sequence number stamped on the next outgoing reliable packet.
    tx_seq: SeqNum,
    /// Sequence number expected on the next inbound reliable packet; also
    /// the acknowledgement number stamped on outgoing packets.
    rx_ack: SeqNum,
    /// Retransmission slot: the framed reliable packet awaiting its ack.
    pending: Option<Vec<u8>>,
    /// Cleared when the worker leaves Active; wakes a blocked `send`.
    link_active: bool,
}

struct Callbacks {
    status: StatusCallback,
    data: DataCallback,
}

/// Non-reliable control packets the engine originates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ControlFrame {
    Reset,
    Sync,
    SyncRsp,
    Config,
    ConfigRsp,
    Ack,
}

impl ControlFrame {
    fn kind(self) -> PacketKind {
        match self {
            ControlFrame::Reset => PacketKind::Reset,
            ControlFrame::Ack => PacketKind::Ack,
            _ => PacketKind::LinkControl,
        }
    }

    fn payload(self) -> Vec<u8> {
        match self {
            ControlFrame::Reset | ControlFrame::Ack => Vec::new(),
            ControlFrame::Sync => LinkControl::Sync.payload(),
            ControlFrame::SyncRsp => LinkControl::SyncRsp.payload(),
            ControlFrame::Config => LinkControl::Config(ConfigField::default()).payload(),
            ControlFrame::ConfigRsp => LinkControl::ConfigRsp(ConfigField::default()).payload(),
        }
    }
}

struct Shared {
    lower: Box<dyn LowerTransport>,
    config: H5Config,

    state: Mutex<LinkState>,
    state_cv: Condvar,

    sync: Mutex<SyncState>,
    sync_cv: Condvar,

    ack: Mutex<AckState>,
    ack_cv: Condvar,

    /// Serializes callers of `send`: at most one reliable packet in flight.
    send_serial: Mutex<()>,

    callbacks: Mutex<Option<Callbacks>>,
    stats: Mutex<LinkStats>,
}

/// A reliable Three-Wire UART link over a byte-oriented lower transport.
///
/// The transport owns its lower transport for its lifetime and tears it
/// down in [`close`](Self::close).
pub struct H5Transport {
    shared: Arc<Shared>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
}

impl H5Transport {
    pub fn new(lower: Box<dyn LowerTransport>, config: H5Config) -> Self {
        H5Transport {
            shared: Arc::new(Shared {
                lower,
                config,
                state: Mutex::new(LinkState::Start),
                state_cv: Condvar::new(),
                sync: Mutex::new(SyncState {
                    criteria: ExitCriteria::for_state(LinkState::Start),
                    run: false,
                }),
                sync_cv: Condvar::new(),
                ack: Mutex::new(AckState {
                    tx_seq: SeqNum::ZERO,
                    rx_ack: SeqNum::ZERO,
                    pending: None,
                    link_active: false,
                }),
                ack_cv: Condvar::new(),
                send_serial: Mutex::new(()),
                callbacks: Mutex::new(None),
                stats: Mutex::new(LinkStats::default()),
            }),
            worker: Mutex::new(None),
        }
    }

    /// Bring the link up.
    ///
    /// Spawns the state-machine worker, opens the lower transport, and
    /// blocks until the link reaches `Active` or [`OPEN_WAIT_TIMEOUT`]
    /// expires.
    pub fn open(&self, status: StatusCallback, data: DataCallback) -> Result<(), TransportError> {
        let mut worker = lock(&self.worker);
        if worker.is_some() {
            return Err(TransportError::InvalidState {
                expected: LinkState::Start.name(),
                actual: "open",
            });
        }
        {
            let state = lock(&self.shared.state);
            if *state != LinkState::Start {
                return Err(TransportError::InvalidState {
                    expected: LinkState::Start.name(),
                    actual: state.name(),
                });
            }
        }

        *lock(&self.shared.callbacks) = Some(Callbacks { status, data });

        {
            let mut sync = lock(&self.shared.sync);
            sync.criteria = ExitCriteria::for_state(LinkState::Start);
            sync.run = true;
        }

        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("h5-link".into())
            .spawn(move || shared.worker_loop())
            .map_err(|e| TransportError::Internal(format!("failed to spawn link worker: {e}")))?;
        *worker = Some(handle);
        drop(worker);

        if let Err(e) = self.shared.lower.open(lower_events(&self.shared)) {
            let mut sync = lock(&self.shared.sync);
            sync.criteria.set_io_error();
            drop(sync);
            self.shared.sync_cv.notify_all();
            return Err(TransportError::Internal(format!(
                "lower transport open failed: {e}"
            )));
        }

        {
            let mut sync = lock(&self.shared.sync);
            if let ExitCriteria::Start(c) = &mut sync.criteria {
                c.opened = true;
            }
        }
        self.shared.sync_cv.notify_all();

        if self.wait_for_state(LinkState::Active, OPEN_WAIT_TIMEOUT) {
            Ok(())
        } else {
            Err(TransportError::Timeout)
        }
    }

    /// Tear the link down.
    ///
    /// Requests shutdown of the current state, joins the worker, and closes
    /// the lower transport. When invoked from a callback running on the
    /// worker thread itself, the worker is detached instead of self-joined.
    pub fn close(&self) -> Result<(), TransportError> {
        let Some(handle) = lock(&self.worker).take() else {
            return Err(TransportError::InvalidState {
                expected: "open",
                actual: "closed",
            });
        };

        {
            let mut sync = lock(&self.shared.sync);
            sync.criteria.set_close();
            sync.run = false;
        }
        self.shared.sync_cv.notify_all();

        {
            let mut ack = lock(&self.shared.ack);
            ack.link_active = false;
            ack.pending = None;
        }
        self.shared.ack_cv.notify_all();

        if handle.thread().id() == thread::current().id() {
            // Reentrant close from the worker thread: self-join would
            // deadlock, so the worker is detached.
            drop(handle);
        } else {
            let _ = handle.join();
        }

        let result = self.shared.lower.close();
        *lock(&self.shared.callbacks) = None;
        result
    }

    /// Send a reliable vendor-specific payload and wait for its
    /// acknowledgement.
    ///
    /// Transmits up to [`PACKET_RETRANSMISSIONS`] times, spacing attempts by
    /// the configured retransmission timeout. Fails with
    /// [`TransportError::InvalidState`] when the link is not active and with
    /// [`TransportError::Timeout`] when the retry budget is exhausted.
    pub fn send(&self, payload: &[u8]) -> Result<(), TransportError> {
        self.shared.send_reliable(payload)
    }

    /// The state the link is currently in.
    pub fn state(&self) -> LinkState {
        *lock(&self.shared.state)
    }

    /// Packet counters for this transport instance.
    pub fn stats(&self) -> LinkStats {
        *lock(&self.shared.stats)
    }

    /// Block until the link reaches `desired` or `timeout` expires.
    pub fn wait_for_state(&self, desired: LinkState, timeout: Duration) -> bool {
        let state = lock(&self.shared.state);
        let (state, _) = self
            .shared
            .state_cv
            .wait_timeout_while(state, timeout, |s| *s != desired)
            .unwrap_or_else(PoisonError::into_inner);
        *state == desired
    }
}

impl Drop for H5Transport {
    fn drop(&mut self) {
        if lock(&self.worker).is_some() {
            let _ = self.close();
        }
    }
}

/// Build the event sinks registered with the lower transport: the frame
/// accumulator feeding the dispatcher, and the status handler.
fn lower_events(shared: &Arc<Shared>) -> LowerEvents {
    let dispatch = Arc::clone(shared);
    let mut accumulator = FrameAccumulator::new();
    let data = Box::new(move |bytes: &[u8]| {
        for frame in accumulator.feed(bytes) {
            dispatch.process_frame(&frame);
        }
    });

    let status_shared = Arc::clone(shared);
    let status = Box::new(move |event: StatusEvent| {
        status_shared.handle_lower_status(event);
    });

    LowerEvents { data, status }
}

impl Shared {
    // -- State machine worker --

    fn worker_loop(self: Arc<Self>) {
        loop {
            let current = *lock(&self.state);
            if current == LinkState::Failed {
                break;
            }
            if !lock(&self.sync).run {
                break;
            }

            let next = match current {
                LinkState::Start => self.run_start(),
                LinkState::Reset => self.run_reset(),
                LinkState::Uninitialized => self.run_uninitialized(),
                LinkState::Initialized => self.run_initialized(),
                LinkState::Active => self.run_active(),
                LinkState::Failed => LinkState::Failed,
            };

            debug!(from = current.name(), to = next.name(), "link state transition");
            self.enter_state(next);
        }
        debug!(state = lock(&self.state).name(), "link worker exiting");
    }

    /// Install the next state: fresh exit criteria (carrying over a close or
    /// I/O error that raced the transition), counters zeroed on Active
    /// entry, and both condvars notified.
    fn enter_state(&self, next: LinkState) {
        {
            let mut sync = lock(&self.sync);
            let close = sync.criteria.close_requested();
            let io_error = sync.criteria.io_errored();
            sync.criteria = ExitCriteria::for_state(next);
            if close {
                sync.criteria.set_close();
            }
            if io_error {
                sync.criteria.set_io_error();
            }
        }

        if next == LinkState::Active {
            let mut ack = lock(&self.ack);
            ack.tx_seq = SeqNum::ZERO;
            ack.rx_ack = SeqNum::ZERO;
            ack.pending = None;
            ack.link_active = true;
        }

        {
            let mut state = lock(&self.state);
            *state = next;
        }
        self.state_cv.notify_all();
        self.sync_cv.notify_all();
    }

    fn wait_sync<'a>(&self, guard: MutexGuard<'a, SyncState>) -> MutexGuard<'a, SyncState> {
        self.sync_cv
            .wait(guard)
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn run_start(&self) -> LinkState {
        let mut sync = lock(&self.sync);
        while !sync.criteria.is_fulfilled() && sync.run {
            sync = self.wait_sync(sync);
        }
        match sync.criteria {
            ExitCriteria::Start(c) if c.io_error => LinkState::Failed,
            ExitCriteria::Start(c) if c.opened => LinkState::Reset,
            _ => LinkState::Failed,
        }
    }

    fn run_reset(&self) -> LinkState {
        self.send_control(ControlFrame::Reset);
        self.notify_status(StatusCode::ResetPerformed, "target reset performed");

        let mut sync = lock(&self.sync);
        if let ExitCriteria::Reset(c) = &mut sync.criteria {
            c.reset_sent = true;
        }

        // Give the target time to settle before resuming UART traffic.
        let (sync, _) = self
            .sync_cv
            .wait_timeout(sync, RESET_WAIT_DURATION)
            .unwrap_or_else(PoisonError::into_inner);

        if sync.criteria.io_errored() {
            LinkState::Failed
        } else {
            LinkState::Uninitialized
        }
    }

    fn run_uninitialized(&self) -> LinkState {
        let mut attempts = PACKET_RETRANSMISSIONS;
        let mut sync = lock(&self.sync);

        while !sync.criteria.is_fulfilled() && sync.run && attempts > 0 {
            drop(sync);
            self.send_control(ControlFrame::Sync);
            sync = lock(&self.sync);
            if let ExitCriteria::Uninitialized(c) = &mut sync.criteria {
                c.sync_sent = true;
            }
            attempts -= 1;

            let (guard, _) = self
                .sync_cv
                .wait_timeout_while(sync, NON_ACTIVE_STATE_TIMEOUT, |s| {
                    !s.criteria.is_fulfilled() && s.run
                })
                .unwrap_or_else(PoisonError::into_inner);
            sync = guard;
        }

        match sync.criteria {
            ExitCriteria::Uninitialized(c) if c.io_error => LinkState::Failed,
            ExitCriteria::Uninitialized(c) if c.sync_sent && c.sync_rsp_received => {
                LinkState::Initialized
            }
            _ => LinkState::Failed,
        }
    }

    fn run_initialized(&self) -> LinkState {
        self.send_control(ControlFrame::Config);
        {
            let mut sync = lock(&self.sync);
            if let ExitCriteria::Initialized(c) = &mut sync.criteria {
                c.config_sent = true;
            }
        }

        let mut resends = PACKET_RETRANSMISSIONS;
        let mut sync = lock(&self.sync);
        while !sync.criteria.is_fulfilled() && sync.run {
            let (guard, timeout) = self
                .sync_cv
                .wait_timeout_while(sync, NON_ACTIVE_STATE_TIMEOUT, |s| {
                    !s.criteria.is_fulfilled() && s.run
                })
                .unwrap_or_else(PoisonError::into_inner);
            sync = guard;

            if timeout.timed_out() {
                if resends == 0 {
                    break;
                }
                drop(sync);
                self.send_control(ControlFrame::Config);
                resends -= 1;
                sync = lock(&self.sync);
            }
        }

        match sync.criteria {
            ExitCriteria::Initialized(c) if c.io_error => LinkState::Failed,
            ExitCriteria::Initialized(c) if c.handshake_complete() => LinkState::Active,
            _ => LinkState::Failed,
        }
    }

    fn run_active(&self) -> LinkState {
        info!(transport = self.lower.name(), "link active");
        self.notify_status(StatusCode::ConnectionActive, "connection active");

        let mut sync = lock(&self.sync);
        while !sync.criteria.is_fulfilled() && sync.run {
            sync = self.wait_sync(sync);
        }
        let next = match sync.criteria {
            ExitCriteria::Active(c) if c.sync_received || c.irrecoverable_sync_error => {
                LinkState::Reset
            }
            ExitCriteria::Active(c) if c.close => LinkState::Start,
            _ => LinkState::Failed,
        };
        drop(sync);

        // The link is no longer active: cancel any caller blocked in `send`.
        {
            let mut ack = lock(&self.ack);
            ack.link_active = false;
            ack.pending = None;
        }
        self.ack_cv.notify_all();

        next
    }

    // -- Reliable transmission engine --

    fn send_reliable(&self, payload: &[u8]) -> Result<(), TransportError> {
        let _serial = lock(&self.send_serial);

        {
            let state = lock(&self.state);
            if *state != LinkState::Active {
                return Err(TransportError::InvalidState {
                    expected: LinkState::Active.name(),
                    actual: state.name(),
                });
            }
        }

        let mut ack = lock(&self.ack);
        if !ack.link_active {
            drop(ack);
            return Err(self.inactive_error());
        }

        let seq = ack.tx_seq;
        let packet = H5Packet {
            seq,
            ack: ack.rx_ack,
            integrity: false,
            reliable: true,
            kind: PacketKind::VendorSpecific,
            payload: payload.to_vec(),
        };
        let framed = slip_frame(&packet.serialize()?);
        ack.pending = Some(framed);

        let mut attempts = PACKET_RETRANSMISSIONS;
        while attempts > 0 {
            let Some(frame) = ack.pending.clone() else {
                break;
            };
            drop(ack);

            self.log_outgoing(&packet);
            if let Err(e) = self.lower.send(&frame) {
                let mut ack = lock(&self.ack);
                ack.pending = None;
                return Err(e);
            }

            ack = lock(&self.ack);
            let (guard, _) = self
                .ack_cv
                .wait_timeout_while(ack, self.config.retransmission_timeout, |a| {
                    a.link_active && a.tx_seq == seq
                })
                .unwrap_or_else(PoisonError::into_inner);
            ack = guard;

            if ack.tx_seq != seq {
                // The dispatcher saw the matching acknowledgement.
                ack.pending = None;
                return Ok(());
            }
            if !ack.link_active {
                ack.pending = None;
                drop(ack);
                return Err(self.inactive_error());
            }

            attempts -= 1;
            if attempts > 0 {
                debug!(seq = seq.value(), attempts_left = attempts, "ack timeout, retransmitting");
            }
        }

        ack.pending = None;
        Err(TransportError::Timeout)
    }

    fn inactive_error(&self) -> TransportError {
        TransportError::InvalidState {
            expected: LinkState::Active.name(),
            actual: lock(&self.state).name(),
        }
    }

    // -- Inbound dispatcher --

    fn process_frame(&self, frame: &[u8]) {
        let unframed = match slip_unframe(frame) {
            Ok(bytes) => bytes,
            Err(e) => {
                lock(&self.stats).decode_errors += 1;
                debug!(error = %e, frame = %trace::hex_bytes(frame), "dropping badly framed bytes");
                return;
            }
        };

        let packet = match H5Packet::parse(&unframed) {
            Ok(p) => p,
            Err(e) => {
                lock(&self.stats).decode_errors += 1;
                debug!(error = %e, "dropping packet with bad header");
                return;
            }
        };

        {
            let mut stats = lock(&self.stats);
            stats.rx_packets += 1;
            tracing::trace!(
                count = stats.rx_packets,
                errors = stats.decode_errors,
                packet = %trace::describe_packet(&packet),
                "<-"
            );
        }

        let state = *lock(&self.state);
        match state {
            LinkState::Reset => {
                // Nothing is processed in Reset; wake the worker so it can
                // re-check its exit criteria.
                self.sync_cv.notify_all();
            }
            LinkState::Uninitialized => self.dispatch_uninitialized(&packet),
            LinkState::Initialized => self.dispatch_initialized(&packet),
            LinkState::Active => self.dispatch_active(&packet),
            LinkState::Start | LinkState::Failed => {}
        }
    }

    fn dispatch_uninitialized(&self, packet: &H5Packet) {
        if packet.kind != PacketKind::LinkControl {
            return;
        }
        match LinkControl::classify(&packet.payload) {
            Some(LinkControl::SyncRsp) => {
                {
                    let mut sync = lock(&self.sync);
                    if let ExitCriteria::Uninitialized(c) = &mut sync.criteria {
                        c.sync_rsp_received = true;
                    }
                }
                self.sync_cv.notify_all();
            }
            Some(LinkControl::Sync) => {
                // The peer is probing us.
                self.send_control(ControlFrame::SyncRsp);
            }
            _ => {}
        }
    }

    fn dispatch_initialized(&self, packet: &H5Packet) {
        if packet.kind != PacketKind::LinkControl {
            return;
        }
        match LinkControl::classify(&packet.payload) {
            Some(LinkControl::ConfigRsp(_)) => {
                {
                    let mut sync = lock(&self.sync);
                    if let ExitCriteria::Initialized(c) = &mut sync.criteria {
                        c.config_rsp_received = true;
                    }
                }
                self.sync_cv.notify_all();
            }
            Some(LinkControl::Config(_)) => {
                {
                    let mut sync = lock(&self.sync);
                    if let ExitCriteria::Initialized(c) = &mut sync.criteria {
                        c.config_received = true;
                    }
                }
                self.send_control(ControlFrame::ConfigRsp);
                {
                    let mut sync = lock(&self.sync);
                    if let ExitCriteria::Initialized(c) = &mut sync.criteria {
                        c.config_rsp_sent = true;
                    }
                }
                self.sync_cv.notify_all();
            }
            Some(LinkControl::Sync) => {
                // The peer restarted its handshake.
                self.send_control(ControlFrame::SyncRsp);
            }
            _ => {}
        }
    }

    fn dispatch_active(&self, packet: &H5Packet) {
        match packet.kind {
            PacketKind::LinkControl => {
                if let Some(LinkControl::Sync) = LinkControl::classify(&packet.payload) {
                    warn!("sync message while active, peer lost synchronization");
                    {
                        let mut sync = lock(&self.sync);
                        if let ExitCriteria::Active(c) = &mut sync.criteria {
                            c.sync_received = true;
                        }
                    }
                    self.sync_cv.notify_all();
                }
            }
            PacketKind::VendorSpecific if packet.reliable => self.accept_reliable(packet),
            PacketKind::Ack => self.accept_ack(packet),
            _ => {}
        }
    }

    fn accept_reliable(&self, packet: &H5Packet) {
        let mut ack = lock(&self.ack);
        if packet.seq == ack.rx_ack {
            ack.rx_ack = ack.rx_ack.next();
            drop(ack);
            self.send_control(ControlFrame::Ack);

            let cb = lock(&self.callbacks).as_ref().map(|c| Arc::clone(&c.data));
            if let Some(cb) = cb {
                cb(&packet.payload);
            }
        } else if packet.seq == ack.rx_ack.prev() {
            // The peer retransmitted the packet we already acknowledged:
            // our ack was lost. Re-acknowledge, do not deliver again.
            drop(ack);
            debug!(seq = %packet.seq, "duplicate reliable packet, re-acknowledging");
            self.send_control(ControlFrame::Ack);
        } else {
            drop(ack);
            warn!(seq = %packet.seq, "reliable packet out of sequence");
            self.flag_irrecoverable();
        }
    }

    fn accept_ack(&self, packet: &H5Packet) {
        let mut ack = lock(&self.ack);
        if packet.ack == ack.tx_seq.next() {
            ack.tx_seq = ack.tx_seq.next();
            drop(ack);
            self.ack_cv.notify_all();
        } else if packet.ack == ack.tx_seq {
            // Acknowledgement of an already-acknowledged packet; ignore.
        } else {
            drop(ack);
            warn!(ack = %packet.ack, "acknowledgement out of sequence");
            self.flag_irrecoverable();
        }
    }

    fn flag_irrecoverable(&self) {
        {
            let mut sync = lock(&self.sync);
            if let ExitCriteria::Active(c) = &mut sync.criteria {
                c.irrecoverable_sync_error = true;
            }
        }
        self.sync_cv.notify_all();
    }

    // -- Outbound control packets and status events --

    fn send_control(&self, frame: ControlFrame) {
        let ack_num = if frame == ControlFrame::Ack {
            lock(&self.ack).rx_ack
        } else {
            SeqNum::ZERO
        };

        let packet = H5Packet {
            seq: SeqNum::ZERO,
            ack: ack_num,
            integrity: false,
            reliable: false,
            kind: frame.kind(),
            payload: frame.payload(),
        };
        let bytes = match packet.serialize() {
            Ok(raw) => slip_frame(&raw),
            Err(e) => {
                warn!(error = %e, control = ?frame, "control packet encode failed");
                return;
            }
        };

        self.log_outgoing(&packet);
        if let Err(e) = self.lower.send(&bytes) {
            warn!(error = %e, control = ?frame, "control packet transmit failed");
        }
    }

    fn handle_lower_status(&self, event: StatusEvent) {
        if event.code == StatusCode::IoResourcesUnavailable {
            warn!(message = %event.message, "lower transport lost I/O resources");
            {
                let mut sync = lock(&self.sync);
                sync.criteria.set_io_error();
            }
            self.sync_cv.notify_all();
        }
        self.forward_status(event);
    }

    fn notify_status(&self, code: StatusCode, message: &str) {
        self.forward_status(StatusEvent::new(code, message));
    }

    fn forward_status(&self, event: StatusEvent) {
        let cb = lock(&self.callbacks)
            .as_ref()
            .map(|c| Arc::clone(&c.status));
        if let Some(cb) = cb {
            cb(&event);
        }
    }

    fn log_outgoing(&self, packet: &H5Packet) {
        let mut stats = lock(&self.stats);
        stats.tx_packets += 1;
        tracing::trace!(
            count = stats.tx_packets,
            packet = %trace::describe_packet(packet),
            "->"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_frame_kinds() {
        assert_eq!(ControlFrame::Reset.kind(), PacketKind::Reset);
        assert_eq!(ControlFrame::Ack.kind(), PacketKind::Ack);
        assert_eq!(ControlFrame::Sync.kind(), PacketKind::LinkControl);
        assert_eq!(ControlFrame::SyncRsp.kind(), PacketKind::LinkControl);
        assert_eq!(ControlFrame::Config.kind(), PacketKind::LinkControl);
        assert_eq!(ControlFrame::ConfigRsp.kind(), PacketKind::LinkControl);
    }

    #[test]
    fn control_frame_payloads() {
        assert!(ControlFrame::Reset.payload().is_empty());
        assert!(ControlFrame::Ack.payload().is_empty());
        assert_eq!(ControlFrame::Sync.payload(), vec![0x01, 0x7E]);
        assert_eq!(ControlFrame::SyncRsp.payload(), vec![0x02, 0x7D]);
        // The advertised configuration: window 1, no OOF, no integrity check.
        assert_eq!(ControlFrame::Config.payload(), vec![0x03, 0xFC, 0x01]);
        assert_eq!(ControlFrame::ConfigRsp.payload(), vec![0x04, 0x7B, 0x01]);
    }
}
