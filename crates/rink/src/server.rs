//! `RinkServer` builder and accept loop.
//!
//! This is the entry point for running a Rink server. It ties together
//! all the layers: transport → protocol → hub → engine.

use std::sync::Arc;

use rink_session::Directory;
use rink_transport::{Transport, WebSocketTransport};

use crate::engine;
use crate::hub::{HubConfig, SessionHub};
use crate::RinkError;

/// Builder for configuring and starting a Rink server.
///
/// # Example
///
/// ```rust,ignore
/// use rink::{RinkServerBuilder, MemoryDirectory};
///
/// let server = RinkServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .build(MemoryDirectory::new())
///     .await?;
/// server.run().await
/// ```
pub struct RinkServerBuilder {
    bind_addr: String,
    config: HubConfig,
}

impl RinkServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            config: HubConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the hub configuration (mailbox sizing, room defaults,
    /// idle timeout).
    pub fn hub_config(mut self, config: HubConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listener and builds the server around the given
    /// directory.
    pub async fn build<D: Directory>(
        self,
        directory: D,
    ) -> Result<RinkServer<D>, RinkError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let hub = Arc::new(SessionHub::new(self.config, directory));
        Ok(RinkServer { transport, hub })
    }
}

impl Default for RinkServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Rink server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct RinkServer<D: Directory> {
    transport: WebSocketTransport,
    hub: Arc<SessionHub<D>>,
}

impl<D: Directory> RinkServer<D> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// A handle to the shared hub (registries, counters, directory).
    pub fn hub(&self) -> Arc<SessionHub<D>> {
        Arc::clone(&self.hub)
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns an engine task for each.
    /// Runs until the process is terminated; a failed accept is logged
    /// and the loop keeps going.
    pub async fn run(mut self) -> Result<(), RinkError> {
        tracing::info!("Rink server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let hub = Arc::clone(&self.hub);
                    tokio::spawn(async move {
                        if let Err(e) =
                            engine::run_connection(conn, hub).await
                        {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
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
