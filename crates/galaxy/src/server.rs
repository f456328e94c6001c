//! `GalaxyServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → session → room.

use std::net::SocketAddr;
use std::sync::Arc;

use galaxy_protocol::{Codec, JsonCodec};
use galaxy_room::{RoomConfig, RoomRegistry};
use galaxy_session::SessionManager;
use galaxy_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::{GalaxyError, ServerConfig};

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) sessions: Mutex<SessionManager>,
    pub(crate) rooms: Mutex<RoomRegistry>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a server.
///
/// ```rust,no_run
/// # async fn demo() -> Result<(), galaxy::GalaxyError> {
/// use galaxy::GalaxyServerBuilder;
///
/// let server = GalaxyServerBuilder::new().bind("0.0.0.0:3000").build().await?;
/// server.run().await
/// # }
/// ```
pub struct GalaxyServerBuilder {
    config: ServerConfig,
}

impl GalaxyServerBuilder {
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Starts from an existing configuration, e.g. one built from [`ServerArgs`](crate::ServerArgs).
    pub fn from_config(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.config.room = config;
        self
    }

    /// Binds the listener. Uses `JsonCodec` over `WebSocketTransport`.
    pub async fn build(self) -> Result<GalaxyServer<JsonCodec>, GalaxyError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;

        let state = Arc::new(ServerState {
            sessions: Mutex::new(SessionManager::new()),
            rooms: Mutex::new(RoomRegistry::new(self.config.room)),
            codec: JsonCodec,
        });

        Ok(GalaxyServer { transport, state })
    }
}

impl Default for GalaxyServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound server. Call [`run()`](Self::run) to start accepting.
pub struct GalaxyServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl GalaxyServer<JsonCodec> {
    pub fn builder() -> GalaxyServerBuilder {
        GalaxyServerBuilder::new()
    }
}

impl<C: Codec> GalaxyServer<C> {
    pub fn local_addr(&self) -> Result<SocketAddr, GalaxyError> {
        Ok(self.transport.local_addr()?)
    }

    /// Accepts connections forever, one handler task per connection.
    pub async fn run(mut self) -> Result<(), GalaxyError> {
        tracing::info!("galaxy-party server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
