//! TCP listener for game clients.

use crate::error::Result;
use crate::service::connection::{serve_connection, ServiceContext};
use crate::utils::metrics::{global_metrics, Timer};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Start the game listener on the configured address; stops on CTRL+C.
#[instrument(skip(ctx), fields(address = %ctx.config.server.address))]
pub async fn start_server(ctx: ServiceContext) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);

    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            info!("Received CTRL+C signal, shutting down");
            let _ = shutdown_tx.send(()).await;
        }
    });

    start_server_with_shutdown(ctx, shutdown_rx).await
}

/// Start the game listener with an external shutdown channel.
#[instrument(skip(ctx, shutdown_rx), fields(address = %ctx.config.server.address))]
pub async fn start_server_with_shutdown(
    ctx: ServiceContext,
    shutdown_rx: mpsc::Receiver<()>,
) -> Result<()> {
    let listener = TcpListener::bind(&ctx.config.server.address).await?;
    serve(listener, ctx, shutdown_rx).await
}

/// Accept connections on an already bound listener until shutdown, then
/// give open connections up to the shutdown timeout to finish.
pub async fn serve(
    listener: TcpListener,
    ctx: ServiceContext,
    mut shutdown_rx: mpsc::Receiver<()>,
) -> Result<()> {
    info!(address = %listener.local_addr()?, "Listening for game clients");

    let active_connections = Arc::new(AtomicUsize::new(0));
    let next_session_id = AtomicU64::new(1);
    let stop = CancellationToken::new();
    let max_connections = ctx.config.server.max_connections;

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("Shutting down server. Waiting for connections to close...");
                stop.cancel();
                drain(&active_connections, ctx.config.server.shutdown_timeout).await;
                global_metrics().log_metrics();
                return Ok(());
            }

            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        error!(error = %e, "Error accepting connection");
                        continue;
                    }
                };

                if active_connections.load(Ordering::Acquire) >= max_connections {
                    global_metrics().connection_rejected();
                    warn!(
                        peer = %peer,
                        max_connections,
                        "Connection limit reached, refusing client"
                    );
                    drop(stream);
                    continue;
                }

                if let Err(e) = stream.set_nodelay(true) {
                    debug!(peer = %peer, error = %e, "Failed to disable Nagle");
                }

                let session_id = next_session_id.fetch_add(1, Ordering::Relaxed);
                let active = active_connections.clone();
                active.fetch_add(1, Ordering::AcqRel);
                let ctx = ctx.clone();
                let shutdown = stop.child_token();

                tokio::spawn(async move {
                    let served = serve_connection(stream, peer, session_id, ctx, shutdown).await;
                    if let Err(e) = served {
                        debug!(peer = %peer, error = %e, "Connection ended with error");
                    }
                    active.fetch_sub(1, Ordering::AcqRel);
                });
            }
        }
    }
}

async fn drain(active_connections: &AtomicUsize, limit: Duration) {
    let _timer = Timer::start("drain");
    let timeout = tokio::time::sleep(limit);
    tokio::pin!(timeout);

    loop {
        tokio::select! {
            _ = &mut timeout => {
                warn!("Shutdown timeout reached, forcing exit");
                break;
            }
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                let connections = active_connections.load(Ordering::Acquire);
                if connections == 0 {
                    info!("All connections closed, shutting down");
                    break;
                }
                debug!(connections, "Waiting for connections to close");
            }
        }
    }
}
