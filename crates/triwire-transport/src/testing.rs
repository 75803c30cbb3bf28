//! In-memory test doubles: a scriptable lower transport and a model peer.
//!
//! [`FakeSerial`] stands in for the serial driver. Frames the engine writes
//! are handed to the test over a channel; the test (or the [`ModelPeer`])
//! injects inbound bytes as if they arrived on the driver's callback
//! thread. `ModelPeer` runs a well-behaved H5 target on its own thread:
//! it answers the handshake and acknowledges reliable packets, with
//! switches for fault injection.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use triwire_core::framing::slip::{slip_frame, slip_unframe};
use triwire_core::packet::link_control::{ConfigField, LinkControl};
use triwire_core::{H5Packet, PacketKind, SeqNum};

use crate::error::TransportError;
use crate::link::lock;
use crate::traits::{LowerEvents, LowerTransport, StatusEvent};

// ---------------------------------------------------------------------------
// FakeSerial
// ---------------------------------------------------------------------------

struct FakeSerialInner {
    events: Mutex<Option<LowerEvents>>,
    written_tx: Sender<Vec<u8>>,
}

/// An in-memory lower transport.
pub struct FakeSerial {
    inner: Arc<FakeSerialInner>,
}

impl FakeSerial {
    /// Create the transport plus the test-side handle for its wire.
    pub fn pair() -> (FakeSerial, SerialHandle) {
        let (written_tx, written_rx) = channel();
        let inner = Arc::new(FakeSerialInner {
            events: Mutex::new(None),
            written_tx,
        });
        (
            FakeSerial {
                inner: Arc::clone(&inner),
            },
            SerialHandle { written_rx, inner },
        )
    }
}

impl LowerTransport for FakeSerial {
    fn name(&self) -> &str {
        "fake-serial"
    }

    fn open(&self, events: LowerEvents) -> Result<(), TransportError> {
        *lock(&self.inner.events) = Some(events);
        Ok(())
    }

    fn close(&self) -> Result<(), TransportError> {
        *lock(&self.inner.events) = None;
        Ok(())
    }

    fn send(&self, frame: &[u8]) -> Result<(), TransportError> {
        self.inner
            .written_tx
            .send(frame.to_vec())
            .map_err(|_| TransportError::Internal("fake serial disconnected".into()))
    }
}

/// Test-side view of a [`FakeSerial`]: what the engine wrote, and a way to
/// inject inbound traffic.
pub struct SerialHandle {
    written_rx: Receiver<Vec<u8>>,
    inner: Arc<FakeSerialInner>,
}

impl SerialHandle {
    /// Next raw frame the engine wrote to the line.
    pub fn recv_frame(&self, timeout: Duration) -> Option<Vec<u8>> {
        self.written_rx.recv_timeout(timeout).ok()
    }

    /// Next frame, unframed and parsed. Frames that fail to decode are
    /// swallowed, like timeouts.
    pub fn recv_packet(&self, timeout: Duration) -> Option<H5Packet> {
        let frame = self.recv_frame(timeout)?;
        let raw = slip_unframe(&frame).ok()?;
        H5Packet::parse(&raw).ok()
    }

    /// A clonable handle for injecting inbound traffic.
    pub fn injector(&self) -> Injector {
        Injector {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Injects inbound bytes and status events into the engine, standing in for
/// the driver's callback thread.
#[derive(Clone)]
pub struct Injector {
    inner: Arc<FakeSerialInner>,
}

impl Injector {
    /// Deliver raw bytes to the engine's data sink.
    pub fn inject_bytes(&self, bytes: &[u8]) {
        let mut events = lock(&self.inner.events);
        if let Some(ev) = events.as_mut() {
            (ev.data)(bytes);
        }
    }

    /// Frame and deliver one H5 packet.
    pub fn inject_packet(&self, packet: &H5Packet) {
        let raw = packet.serialize().expect("test packet serializes");
        self.inject_bytes(&slip_frame(&raw));
    }

    /// Report a lower-transport status event.
    pub fn emit_status(&self, event: StatusEvent) {
        let events = lock(&self.inner.events);
        if let Some(ev) = events.as_ref() {
            (ev.status)(event);
        }
    }
}

// ---------------------------------------------------------------------------
// Packet builders
// ---------------------------------------------------------------------------

/// A non-reliable control packet as the peer would send it.
pub fn control_packet(kind: PacketKind, payload: Vec<u8>, ack: SeqNum) -> H5Packet {
    H5Packet {
        seq: SeqNum::ZERO,
        ack,
        integrity: false,
        reliable: false,
        kind,
        payload,
    }
}

/// The peer's acknowledgement packet.
pub fn ack_packet(ack: SeqNum) -> H5Packet {
    control_packet(PacketKind::Ack, Vec::new(), ack)
}

/// A reliable vendor-specific packet as the peer would send it.
pub fn reliable_packet(seq: SeqNum, ack: SeqNum, payload: &[u8]) -> H5Packet {
    H5Packet {
        seq,
        ack,
        integrity: false,
        reliable: true,
        kind: PacketKind::VendorSpecific,
        payload: payload.to_vec(),
    }
}

// ---------------------------------------------------------------------------
// ModelPeer
// ---------------------------------------------------------------------------

/// Behavior switches for [`ModelPeer`].
#[derive(Debug, Clone, Copy)]
pub struct PeerBehavior {
    /// Answer Sync with SyncRsp.
    pub answer_sync: bool,
    /// Answer Config with ConfigRsp, and send our own Config once.
    pub answer_config: bool,
    /// Acknowledge reliable packets.
    pub ack_reliable: bool,
}

impl Default for PeerBehavior {
    fn default() -> Self {
        PeerBehavior {
            answer_sync: true,
            answer_config: true,
            ack_reliable: true,
        }
    }
}

#[derive(Default)]
struct PeerRecord {
    /// Payloads of reliable packets accepted in order.
    accepted: Vec<Vec<u8>>,
    /// Sequence numbers of every reliable frame seen, duplicates included.
    reliable_seqs: Vec<u8>,
    /// Acknowledgement numbers of every ack packet seen.
    acks: Vec<u8>,
}

/// A well-behaved H5 target running on its own thread.
///
/// Dropped peers stop and join their thread.
pub struct ModelPeer {
    stop: Arc<AtomicBool>,
    record: Arc<Mutex<PeerRecord>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl ModelPeer {
    pub fn spawn(handle: SerialHandle, behavior: PeerBehavior) -> ModelPeer {
        let stop = Arc::new(AtomicBool::new(false));
        let record = Arc::new(Mutex::new(PeerRecord::default()));

        let thread_stop = Arc::clone(&stop);
        let thread_record = Arc::clone(&record);
        let thread = thread::Builder::new()
            .name("model-peer".into())
            .spawn(move || peer_loop(handle, behavior, &thread_stop, &thread_record))
            .expect("spawn model peer");

        ModelPeer {
            stop,
            record,
            thread: Some(thread),
        }
    }

    /// Payloads of reliable packets the peer accepted, in order.
    pub fn received(&self) -> Vec<Vec<u8>> {
        lock(&self.record).accepted.clone()
    }

    /// Sequence numbers of every reliable frame seen, duplicates included.
    pub fn reliable_seqs(&self) -> Vec<u8> {
        lock(&self.record).reliable_seqs.clone()
    }

    /// Acknowledgement numbers of every ack packet the engine sent.
    pub fn acks_seen(&self) -> Vec<u8> {
        lock(&self.record).acks.clone()
    }
}

impl Drop for ModelPeer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn peer_loop(
    handle: SerialHandle,
    behavior: PeerBehavior,
    stop: &AtomicBool,
    record: &Mutex<PeerRecord>,
) {
    let injector = handle.injector();
    let mut expected_seq = SeqNum::ZERO;
    let mut config_sent = false;

    while !stop.load(Ordering::SeqCst) {
        let Some(packet) = handle.recv_packet(Duration::from_millis(20)) else {
            continue;
        };

        match packet.kind {
            PacketKind::Reset => {
                expected_seq = SeqNum::ZERO;
                config_sent = false;
            }
            PacketKind::LinkControl => match LinkControl::classify(&packet.payload) {
                Some(LinkControl::Sync) if behavior.answer_sync => {
                    injector.inject_packet(&control_packet(
                        PacketKind::LinkControl,
                        LinkControl::SyncRsp.payload(),
                        SeqNum::ZERO,
                    ));
                }
                Some(LinkControl::Config(_)) if behavior.answer_config => {
                    injector.inject_packet(&control_packet(
                        PacketKind::LinkControl,
                        LinkControl::ConfigRsp(ConfigField::default()).payload(),
                        SeqNum::ZERO,
                    ));
                    if !config_sent {
                        config_sent = true;
                        injector.inject_packet(&control_packet(
                            PacketKind::LinkControl,
                            LinkControl::Config(ConfigField::default()).payload(),
                            SeqNum::ZERO,
                        ));
                    }
                }
                _ => {}
            },
            PacketKind::VendorSpecific if packet.reliable => {
                lock(record).reliable_seqs.push(packet.seq.value());
                if behavior.ack_reliable {
                    if packet.seq == expected_seq {
                        expected_seq = expected_seq.next();
                        lock(record).accepted.push(packet.payload.clone());
                    }
                    // The ack always carries the next expected sequence, so
                    // a duplicate gets the same ack again.
                    injector.inject_packet(&ack_packet(expected_seq));
                }
            }
            PacketKind::Ack => {
                lock(record).acks.push(packet.ack.value());
            }
            _ => {}
        }
    }
}
