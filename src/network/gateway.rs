//! Gateway - TCP listener that accepts incoming connections.
//!
//! The Gateway binds to a socket and spawns a Connection task for each
//! incoming client until the shutdown signal fires.

use crate::network::Connection;
use crate::state::Hub;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tracing::{debug, error, info};

/// Accepts incoming TCP connections and spawns handlers.
pub struct Gateway {
    listener: TcpListener,
    acceptor: TlsAcceptor,
    hub: Arc<Hub>,
}

impl Gateway {
    /// Bind the gateway to the specified address.
    pub async fn bind(
        addr: SocketAddr,
        acceptor: TlsAcceptor,
        hub: Arc<Hub>,
    ) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "Gateway listening");
        Ok(Self {
            listener,
            acceptor,
            hub,
        })
    }

    /// Run the gateway, accepting connections until shutdown.
    pub async fn run(self) -> std::io::Result<()> {
        let mut shutdown_rx = self.hub.shutdown_signal();

        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        let conn_id = self.hub.next_conn_id();
                        info!(conn = %conn_id, %addr, "Connection accepted");

                        let hub = Arc::clone(&self.hub);
                        let acceptor = self.acceptor.clone();
                        tokio::spawn(async move {
                            let connection = Connection::new(conn_id, stream, addr, acceptor, hub);
                            if let Err(e) = connection.run().await {
                                // Handshake failures and broken pipes are a
                                // client problem, not a server one.
                                debug!(conn = %conn_id, %addr, error = %e, "Connection error");
                            }
                            info!(conn = %conn_id, %addr, "Connection closed");
                        });
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to accept connection");
                    }
                },
                _ = shutdown_rx.recv() => {
                    info!("Shutdown requested, closing listener");
                    break;
                }
            }
        }

        Ok(())
    }
}
