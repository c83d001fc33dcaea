//! # Connection Loop
//!
//! One task per connection reads frames and dispatches them in arrival
//! order; a second task owns the write half and sends queued packets in the
//! order they were queued.
//!
//! ## Lifecycle
//! 1. `GameWorld::on_connect`
//! 2. Read, dispatch, repeat until the peer leaves, the session asks to
//!    close, the idle timeout fires, the violation limit is reached or the
//!    server shuts down
//! 3. Session marked `Closing`, `GameWorld::on_disconnect`
//! 4. Outbound queue closed to new packets; what is already queued is flushed
//!    within the shutdown timeout, the rest is discarded
//! 5. Session marked `Disconnected`

use crate::config::NetworkConfig;
use crate::core::codec::FrameCodec;
use crate::error::{ProtocolError, Result};
use crate::packets::world::GameWorld;
use crate::protocol::dispatcher::{Dispatcher, FrameOutcome};
use crate::protocol::request::RequestContext;
use crate::protocol::state::ConnectionState;
use crate::service::session::{PacketSender, Session};
use crate::utils::metrics::global_metrics;
use crate::utils::timeout::with_timeout;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Everything a connection task shares with the rest of the server.
#[derive(Clone)]
pub struct ServiceContext {
    pub config: Arc<NetworkConfig>,
    pub dispatcher: Arc<Dispatcher>,
    pub world: Arc<dyn GameWorld>,
}

impl ServiceContext {
    pub fn new(
        config: NetworkConfig,
        dispatcher: Dispatcher,
        world: Arc<dyn GameWorld>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            dispatcher: Arc::new(dispatcher),
            world,
        }
    }
}

/// Why the read loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    PeerClosed,
    Requested,
    ViolationLimit,
    Shutdown,
}

/// Run one connection to completion.
///
/// Fatal errors (framing, I/O, idle timeout, full outbound queue) are
/// returned after the session has been torn down.
#[instrument(skip_all, fields(session_id = session_id, peer = %peer))]
pub async fn serve_connection<S>(
    stream: S,
    peer: SocketAddr,
    session_id: u64,
    ctx: ServiceContext,
    shutdown: CancellationToken,
) -> Result<CloseReason>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let server = &ctx.config.server;
    let max_frame_size = ctx.config.transport.max_frame_size;
    let (read_half, write_half) = tokio::io::split(stream);
    let mut frames = FramedRead::new(read_half, FrameCodec::new(max_frame_size));
    let sink = FramedWrite::new(write_half, FrameCodec::new(max_frame_size));

    let (sender, outbound) = PacketSender::channel(server.outbound_queue_limit, max_frame_size);
    let closing = CancellationToken::new();
    let mut writer = tokio::spawn(write_loop(sink, outbound, closing.clone()));

    let mut session = Session::new(session_id, peer, sender);
    global_metrics().connection_established();
    debug!("Connection opened");

    let result = match ctx.world.on_connect(&mut session) {
        Ok(()) => read_loop(&mut frames, &mut session, &ctx, &shutdown).await,
        Err(e) => Err(e),
    };

    session.set_state(ConnectionState::Closing);
    ctx.world.on_disconnect(&mut session);

    closing.cancel();
    match with_timeout(server.shutdown_timeout, &mut writer).await {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(e))) => debug!(error = %e, "Writer stopped with error"),
        Ok(Err(e)) => warn!(error = %e, "Writer task failed"),
        Err(_) => {
            warn!("Outbound flush timed out, discarding queued packets");
            writer.abort();
        }
    }

    session.set_state(ConnectionState::Disconnected);
    global_metrics().connection_closed();

    match &result {
        Ok(reason) => info!(reason = ?reason, "Connection closed"),
        Err(e) => info!(error = %e, "Connection closed"),
    }
    result
}

async fn read_loop<R>(
    frames: &mut FramedRead<R, FrameCodec>,
    session: &mut Session,
    ctx: &ServiceContext,
    shutdown: &CancellationToken,
) -> Result<CloseReason>
where
    R: AsyncRead + Unpin,
{
    let idle_timeout = ctx.config.server.idle_timeout;
    let violation_limit = ctx.config.server.violation_limit;
    let metrics = global_metrics();

    loop {
        if session.is_closing() {
            return Ok(CloseReason::Requested);
        }

        let next = tokio::select! {
            _ = shutdown.cancelled() => return Ok(CloseReason::Shutdown),
            next = tokio::time::timeout(idle_timeout, frames.next()) => next,
        };

        let frame = match next {
            Err(_) => return Err(ProtocolError::ConnectionTimeout),
            Ok(None) => return Ok(CloseReason::PeerClosed),
            Ok(Some(Err(e))) => return Err(e),
            Ok(Some(Ok(frame))) => frame,
        };
        metrics.frame_received(frame.len() as u64);

        let outcome = {
            let mut request_ctx = RequestContext::new(session, ctx.world.as_ref());
            ctx.dispatcher.dispatch(&frame, &mut request_ctx)?
        };

        if outcome.is_violation() {
            let violations = session.record_violation();
            if violation_limit > 0 && violations >= violation_limit {
                metrics.violation_disconnect();
                warn!(violations, outcome = ?outcome, "Violation limit reached, disconnecting");
                return Ok(CloseReason::ViolationLimit);
            }
        } else if let FrameOutcome::HandlerFailed { error, .. } = &outcome {
            debug!(error = %error, "Frame dropped after handler error");
        }
    }
}

async fn write_loop<W>(
    mut sink: FramedWrite<W, FrameCodec>,
    mut outbound: mpsc::Receiver<Bytes>,
    closing: CancellationToken,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    loop {
        tokio::select! {
            biased;
            body = outbound.recv() => match body {
                Some(body) => sink.send(body).await?,
                None => break,
            },
            _ = closing.cancelled() => {
                // Refuse new packets, then flush what is already queued.
                outbound.close();
                while let Some(body) = outbound.recv().await {
                    sink.feed(body).await?;
                }
                break;
            }
        }
    }
    sink.close().await
}
