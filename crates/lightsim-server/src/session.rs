//! One client connection, end to end.
//!
//! 1. Send the current snapshot.
//! 2. Read `\n`-delimited command frames in order.
//! 3. For each command: merge into the store, then send `ok` and the
//!    post-merge snapshot as one flushed pair.
//!
//! Frames that are not JSON, or JSON that is not a command, are logged and
//! dropped without a reply. The session ends on end of stream, on a network
//! error, or on shutdown.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use lightsim_core::{Command, DeviceOutput, MergeOutcome, Response, SessionId, StateStore};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::codec::{CodecError, JsonLinesCodec};
use crate::errors::ServerError;

/// Per-connection settings handed down from the listener.
#[derive(Clone, Debug, Default)]
pub struct SessionOptions {
    pub max_frame_len: Option<usize>,
}

/// Drive one connection until the client leaves or `shutdown` fires.
///
/// Only errors on this connection are returned; the store is never left
/// in a partial state by a failing session.
pub async fn run_session<S>(
    stream: S,
    peer: SocketAddr,
    store: Arc<StateStore>,
    options: SessionOptions,
    shutdown: CancellationToken,
) -> Result<(), ServerError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let session_id = SessionId::new();
    let span = tracing::info_span!("session", session_id = %session_id, peer = %peer);
    serve(stream, store, options, shutdown).instrument(span).await
}

async fn serve<S>(
    stream: S,
    store: Arc<StateStore>,
    options: SessionOptions,
    shutdown: CancellationToken,
) -> Result<(), ServerError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut framed = Framed::new(stream, JsonLinesCodec::with_max_frame_len(options.max_frame_len));

    let initial = framed.send(Response::state(store.snapshot()));
    if !unless_shutdown(&shutdown, initial).await? {
        return Ok(());
    }
    tracing::info!(lights = store.len(), "client connected, initial state sent");

    loop {
        let frame = tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("server shutting down, closing session");
                return Ok(());
            }
            frame = framed.next() => frame,
        };

        let frame = match frame {
            Some(Ok(frame)) => frame,
            Some(Err(e)) => {
                tracing::debug!(error = %e, "read failed, closing session");
                return Err(e.into());
            }
            None => {
                tracing::info!("client disconnected");
                return Ok(());
            }
        };

        let command = match Command::from_frame(&frame) {
            Ok(command) => command,
            Err(e) => {
                tracing::warn!(kind = e.error_kind(), error = %e, bytes = frame.len(), "discarding frame");
                continue;
            }
        };

        let (outcome, snapshot) = store.merge_and_snapshot(command.idx, &command.state);
        match outcome {
            MergeOutcome::Applied { idx } => {
                tracing::debug!(idx, fields = ?command.state.changed_fields(), "applied update");
                if let Some(output) = snapshot.get(idx).and_then(DeviceOutput::from_state) {
                    tracing::debug!(idx, ?output, "device output");
                }
            }
            MergeOutcome::OutOfRange { idx, len } => {
                tracing::debug!(idx, len, "index out of range, update skipped");
            }
        }

        // ok + state leave together in a single flush.
        let reply = async {
            framed.feed(Response::Ok).await?;
            framed.feed(Response::state(snapshot)).await?;
            SinkExt::<Response>::flush(&mut framed).await
        };
        if !unless_shutdown(&shutdown, reply).await? {
            return Ok(());
        }
    }
}

/// Run `write` unless `shutdown` fires first. `Ok(false)` means shutdown won.
///
/// A client that stops reading leaves the write parked on a full socket
/// buffer, so every write has to race the token too.
async fn unless_shutdown<F>(shutdown: &CancellationToken, write: F) -> Result<bool, ServerError>
where
    F: Future<Output = Result<(), CodecError>>,
{
    tokio::select! {
        _ = shutdown.cancelled() => {
            tracing::info!("server shutting down mid-write, closing session");
            Ok(false)
        }
        written = write => {
            written?;
            Ok(true)
        }
    }
}
