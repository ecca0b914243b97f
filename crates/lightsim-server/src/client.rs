//! Async client for the simulator protocol, the counterpart of a real
//! controller app. Handy for tests and manual probing.

use std::net::SocketAddr;

use futures::{SinkExt, StreamExt};
use lightsim_core::{Command, LightState, Response, StatePatch};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

use crate::codec::JsonLinesCodec;
use crate::errors::ServerError;

pub struct LightClient {
    framed: Framed<TcpStream, JsonLinesCodec>,
    initial: Vec<LightState>,
}

impl LightClient {
    /// Connect and consume the snapshot the server sends on accept.
    pub async fn connect(addr: SocketAddr) -> Result<Self, ServerError> {
        let stream = TcpStream::connect(addr).await?;
        let mut client = Self {
            framed: Framed::new(stream, JsonLinesCodec::new()),
            initial: Vec::new(),
        };
        client.initial = match client.recv().await? {
            Response::State { state } => state,
            other => {
                return Err(ServerError::Protocol(format!(
                    "expected initial state, got {other:?}"
                )))
            }
        };
        Ok(client)
    }

    /// Snapshot received when the connection was accepted.
    pub fn initial_state(&self) -> &[LightState] {
        &self.initial
    }

    pub async fn send(&mut self, command: &Command) -> Result<(), ServerError> {
        self.framed.send(command).await?;
        Ok(())
    }

    /// Write bytes as-is, without adding a delimiter.
    pub async fn send_raw(&mut self, raw: &[u8]) -> Result<(), ServerError> {
        let stream = self.framed.get_mut();
        stream.write_all(raw).await?;
        stream.flush().await?;
        Ok(())
    }

    pub async fn recv(&mut self) -> Result<Response, ServerError> {
        let frame = self.framed.next().await.ok_or(ServerError::Closed)??;
        serde_json::from_slice(&frame).map_err(|e| ServerError::Protocol(e.to_string()))
    }

    /// Send an update and wait for the `ok` + `state` pair. Returns the new snapshot.
    pub async fn update(&mut self, idx: i64, patch: StatePatch) -> Result<Vec<LightState>, ServerError> {
        self.send(&Command { idx, state: patch }).await?;
        match self.recv().await? {
            Response::Ok => {}
            other => return Err(ServerError::Protocol(format!("expected ok, got {other:?}"))),
        }
        match self.recv().await? {
            Response::State { state } => Ok(state),
            other => Err(ServerError::Protocol(format!("expected state, got {other:?}"))),
        }
    }

    /// Close the write side so the server sees end of stream.
    pub async fn close(mut self) -> Result<(), ServerError> {
        self.framed.get_mut().shutdown().await?;
        Ok(())
    }
}
