//! Connection - handles an individual client connection.
//!
//! Each connection runs in its own tokio task: TLS accept, then a unified
//! loop that selects between framed incoming lines (dispatched to a single
//! reply each) and the push queue filled by the fan-out engine. The framed
//! reader owns the line buffer; a single recv may yield zero, one or many
//! whole lines and the codec keeps the partial tail. All writes to the
//! socket go through this task, which serialises them per connection.

use crate::handlers::{self, Session};
use crate::state::{ConnId, Hub};
use chatter_proto::MAX_LINE_LEN;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_rustls::TlsAcceptor;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};
use tracing::{debug, instrument};

/// Pushes waiting for the writer before the fan-out engine starts dropping
/// them for this connection.
const PUSH_QUEUE: usize = 64;

/// A client connection handler.
pub struct Connection {
    conn_id: ConnId,
    stream: TcpStream,
    addr: SocketAddr,
    acceptor: TlsAcceptor,
    hub: Arc<Hub>,
}

impl Connection {
    pub fn new(
        conn_id: ConnId,
        stream: TcpStream,
        addr: SocketAddr,
        acceptor: TlsAcceptor,
        hub: Arc<Hub>,
    ) -> Self {
        Self {
            conn_id,
            stream,
            addr,
            acceptor,
            hub,
        }
    }

    /// Run the connection until EOF, a transport error, or teardown.
    #[instrument(skip(self), fields(conn = %self.conn_id, addr = %self.addr), name = "connection")]
    pub async fn run(self) -> anyhow::Result<()> {
        let tls_stream = self.acceptor.accept(self.stream).await?;
        debug!("TLS handshake complete");

        let (read_half, write_half) = tokio::io::split(tls_stream);
        let mut reader = FramedRead::new(read_half, LinesCodec::new_with_max_length(MAX_LINE_LEN));
        let mut writer = FramedWrite::new(write_half, LinesCodec::new());

        let (push_tx, mut push_rx) = mpsc::channel::<String>(PUSH_QUEUE);
        self.hub.registry.register_sender(self.conn_id, push_tx);

        let mut session = Session::new(self.conn_id);

        let result = loop {
            tokio::select! {
                incoming = reader.next() => match incoming {
                    Some(Ok(line)) => {
                        let reply =
                            handlers::dispatch(self.hub.as_ref(), &mut session, &line).await;
                        if let Err(e) = writer.send(reply).await {
                            break Err(e.into());
                        }
                    }
                    Some(Err(e)) => break Err(e.into()),
                    None => break Ok(()),
                },
                push = push_rx.recv() => match push {
                    Some(line) => {
                        if let Err(e) = writer.send(line).await {
                            break Err(e.into());
                        }
                    }
                    // Sender side gone; nothing left to deliver.
                    None => break Ok(()),
                },
            }
        };

        self.hub.registry.teardown(self.conn_id);
        debug!("Session torn down");
        result
    }
}
