//! Per-connection session value and its ordered outbound sender.

use crate::config::{FRAME_HEADER_SIZE, MAX_FRAME_SIZE};
use crate::error::{ProtocolError, Result};
use crate::protocol::outbound::{encode_packet, ServerPacket};
use crate::protocol::state::ConnectionState;
use crate::utils::metrics::global_metrics;
use bytes::Bytes;
use std::net::SocketAddr;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, trace};

/// Handle onto one connection's outbound queue.
///
/// Packets are serialized on the caller's side and queued as frame bodies;
/// the connection's single writer task drains the queue in order. Cloning the
/// sender lets game code outside the connection task push packets too.
#[derive(Debug, Clone)]
pub struct PacketSender {
    tx: mpsc::Sender<Bytes>,
    max_frame_size: usize,
}

impl PacketSender {
    pub fn new(tx: mpsc::Sender<Bytes>, max_frame_size: usize) -> Self {
        Self {
            tx,
            max_frame_size: max_frame_size.min(MAX_FRAME_SIZE),
        }
    }

    /// Sender plus the receiving end a writer task would own.
    pub fn channel(queue_limit: usize, max_frame_size: usize) -> (Self, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(queue_limit.max(1));
        (Self::new(tx, max_frame_size), rx)
    }

    /// Serialize and enqueue a packet without waiting.
    ///
    /// A full queue means the peer stopped reading; that is reported as
    /// [`ProtocolError::OutboundQueueFull`], which ends the connection.
    pub fn send<P>(&self, packet: &P) -> Result<()>
    where
        P: ServerPacket + ?Sized,
    {
        self.send_body(encode_packet(packet))
    }

    /// Enqueue an already serialized frame body.
    pub fn send_body(&self, body: Bytes) -> Result<()> {
        let frame_len = body.len() + FRAME_HEADER_SIZE;
        if frame_len > self.max_frame_size {
            return Err(ProtocolError::OversizedPacket(frame_len));
        }
        match self.tx.try_send(body) {
            Ok(()) => {
                global_metrics().packet_sent(frame_len as u64);
                trace!(bytes = frame_len, "Packet queued");
                Ok(())
            }
            Err(TrySendError::Full(_)) => Err(ProtocolError::OutboundQueueFull),
            Err(TrySendError::Closed(_)) => Err(ProtocolError::ConnectionClosed),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// State owned by one client connection.
///
/// Only the task that owns the connection touches a `Session`, so nothing in
/// here needs synchronization.
#[derive(Debug)]
pub struct Session {
    id: u64,
    peer: SocketAddr,
    state: ConnectionState,
    sender: PacketSender,
    violations: u32,
    close_requested: bool,
}

impl Session {
    pub fn new(id: u64, peer: SocketAddr, sender: PacketSender) -> Self {
        Self {
            id,
            peer,
            state: ConnectionState::Connected,
            sender,
            violations: 0,
            close_requested: false,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Move the session to another phase. Called by game code once login or
    /// world entry completes; the connection loop only uses it for teardown.
    pub fn set_state(&mut self, state: ConnectionState) {
        if self.state != state {
            debug!(session_id = self.id, from = %self.state, to = %state, "Session state changed");
            self.state = state;
        }
    }

    pub fn sender(&self) -> &PacketSender {
        &self.sender
    }

    pub fn send<P>(&self, packet: &P) -> Result<()>
    where
        P: ServerPacket + ?Sized,
    {
        self.sender.send(packet)
    }

    /// Ask the connection to close once the current request returns.
    /// Packets already queued are still flushed.
    pub fn close(&mut self) {
        self.close_requested = true;
    }

    /// Queue a final packet, then close.
    pub fn close_with<P>(&mut self, packet: &P) -> Result<()>
    where
        P: ServerPacket + ?Sized,
    {
        let sent = self.sender.send(packet);
        self.close();
        sent
    }

    pub fn is_closing(&self) -> bool {
        self.close_requested
            || matches!(
                self.state,
                ConnectionState::Closing | ConnectionState::Disconnected
            )
    }

    /// Count one protocol violation and return the running total.
    pub fn record_violation(&mut self) -> u32 {
        self.violations = self.violations.saturating_add(1);
        self.violations
    }

    pub fn violations(&self) -> u32 {
        self.violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::buffer::PacketWriter;
    use crate::protocol::opcode::Opcode;

    struct Blob(usize);

    impl ServerPacket for Blob {
        fn opcode(&self) -> Opcode {
            Opcode::Primary(0x7F)
        }

        fn write_body(&self, writer: &mut PacketWriter) {
            writer.write_bytes(&vec![0u8; self.0]);
        }
    }

    fn session(limit: usize) -> (Session, mpsc::Receiver<Bytes>) {
        let (sender, rx) = PacketSender::channel(limit, MAX_FRAME_SIZE);
        let peer = "127.0.0.1:40000".parse().unwrap();
        (Session::new(1, peer, sender), rx)
    }

    #[test]
    fn starts_connected() {
        let (session, _rx) = session(4);
        assert_eq!(session.state(), ConnectionState::Connected);
        assert!(!session.is_closing());
    }

    #[test]
    fn packets_queue_in_order() {
        let (session, mut rx) = session(4);
        session.send(&Blob(1)).unwrap();
        session.send(&Blob(3)).unwrap();
        assert_eq!(rx.try_recv().unwrap().len(), 2);
        assert_eq!(rx.try_recv().unwrap().len(), 4);
    }

    #[test]
    fn full_queue_is_reported() {
        let (session, _rx) = session(1);
        session.send(&Blob(0)).unwrap();
        assert!(matches!(
            session.send(&Blob(0)),
            Err(ProtocolError::OutboundQueueFull)
        ));
    }

    #[test]
    fn closed_queue_is_reported() {
        let (session, rx) = session(1);
        drop(rx);
        assert!(session.sender().is_closed());
        assert!(matches!(
            session.send(&Blob(0)),
            Err(ProtocolError::ConnectionClosed)
        ));
    }

    #[test]
    fn oversized_packets_are_refused() {
        let (session, mut rx) = session(1);
        assert!(matches!(
            session.send(&Blob(MAX_FRAME_SIZE)),
            Err(ProtocolError::OversizedPacket(_))
        ));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn close_with_queues_then_closes() {
        let (mut session, mut rx) = session(2);
        session.close_with(&Blob(0)).unwrap();
        assert!(session.is_closing());
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn violations_accumulate() {
        let (mut session, _rx) = session(1);
        assert_eq!(session.record_violation(), 1);
        assert_eq!(session.record_violation(), 2);
        assert_eq!(session.violations(), 2);
    }
}
