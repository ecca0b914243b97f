use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use lightsim_core::StateStore;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::config::ServerConfig;
use crate::errors::ServerError;
use crate::session::{self, SessionOptions};
use crate::shutdown::{ShutdownCoordinator, DEFAULT_SHUTDOWN_TIMEOUT};

/// TCP listener for the simulator. Holds no mutable state of its own.
pub struct LightServer {
    config: ServerConfig,
    store: Arc<StateStore>,
}

impl LightServer {
    pub fn new(config: ServerConfig, store: Arc<StateStore>) -> Self {
        Self { config, store }
    }

    /// Build a server whose store is seeded from `config.lights`.
    pub fn from_config(config: ServerConfig) -> Self {
        let store = Arc::new(StateStore::new(config.lights.clone()));
        Self::new(config, store)
    }

    /// Bind and start accepting in the background.
    ///
    /// A bind failure is returned as `ServerError::Bind`. A later accept
    /// failure surfaces through `ServerHandle::closed()`.
    pub async fn start(self) -> Result<ServerHandle, ServerError> {
        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener.local_addr()?;

        tracing::info!(addr = %local_addr, lights = self.store.len(), "light simulator listening");

        let options = SessionOptions {
            max_frame_len: self.config.max_frame_len,
        };
        let incoming = futures::stream::poll_fn(move |cx| listener.poll_accept(cx).map(Some));
        Ok(ServerHandle::spawn(local_addr, incoming, self.store, options))
    }
}

/// Handle returned by `LightServer::start()`, keeps the accept loop alive.
pub struct ServerHandle {
    local_addr: SocketAddr,
    store: Arc<StateStore>,
    shutdown: ShutdownCoordinator,
    sessions: TaskTracker,
    /// `None` once `closed()` has observed the accept loop ending.
    accept: Option<JoinHandle<Result<(), ServerError>>>,
}

impl ServerHandle {
    fn spawn<I, S>(
        local_addr: SocketAddr,
        incoming: I,
        store: Arc<StateStore>,
        options: SessionOptions,
    ) -> Self
    where
        I: Stream<Item = io::Result<(S, SocketAddr)>> + Unpin + Send + 'static,
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let shutdown = ShutdownCoordinator::new();
        let sessions = TaskTracker::new();
        let accept = tokio::spawn(accept_loop(
            incoming,
            Arc::clone(&store),
            options,
            sessions.clone(),
            shutdown.token(),
        ));

        Self {
            local_addr,
            store,
            shutdown,
            sessions,
            accept: Some(accept),
        }
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    /// Resolves when the accept loop stops on its own.
    ///
    /// While the server is running this only happens on an accept failure,
    /// returned as `ServerError::Accept`. Cancel safe; once it has resolved,
    /// later calls return `Ok(())` immediately.
    pub async fn closed(&mut self) -> Result<(), ServerError> {
        let Some(accept) = self.accept.as_mut() else {
            return Ok(());
        };
        let result = accept.await;
        self.accept = None;
        result.map_err(|e| ServerError::Io(io::Error::other(e)))?
    }

    /// Stop accepting, end every session, and wait a bounded time for them.
    pub async fn shutdown(mut self) {
        self.shutdown.shutdown();
        if let Some(accept) = self.accept.take() {
            match accept.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!(error = %e, "accept loop had already stopped"),
                Err(e) => tracing::warn!(error = %e, "accept loop ended abnormally"),
            }
        }
        self.shutdown.drain(&self.sessions, DEFAULT_SHUTDOWN_TIMEOUT).await;
        tracing::info!("light simulator stopped");
    }
}

async fn accept_loop<I, S>(
    mut incoming: I,
    store: Arc<StateStore>,
    options: SessionOptions,
    sessions: TaskTracker,
    shutdown: CancellationToken,
) -> Result<(), ServerError>
where
    I: Stream<Item = io::Result<(S, SocketAddr)>> + Unpin,
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    loop {
        let accepted = tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            accepted = incoming.next() => accepted,
        };

        match accepted {
            Some(Ok((stream, peer))) => {
                tracing::debug!(peer = %peer, "accepted connection");
                let store = Arc::clone(&store);
                let options = options.clone();
                let shutdown = shutdown.clone();
                let _ = sessions.spawn(async move {
                    if let Err(e) = session::run_session(stream, peer, store, options, shutdown).await {
                        tracing::warn!(peer = %peer, error = %e, "session ended with error");
                    }
                });
            }
            Some(Err(e)) => {
                tracing::error!(error = %e, "failed to accept connection, stopping listener");
                return Err(ServerError::Accept(e));
            }
            None => {
                tracing::warn!("listener closed, no more connections");
                return Ok(());
            }
        }
    }
}
