//! Line-oriented TLS test client.
//!
//! Speaks the chatter wire protocol: send one line, read reply and push
//! lines with timeouts, plus convenience wrappers for the common flows.

#![allow(dead_code)]

use std::io::{BufReader as StdBufReader, Cursor};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::pki_types::{CertificateDer, ServerName};
use tokio_rustls::rustls::{ClientConfig, RootCertStore};

use rustls_pemfile::certs;

use super::tls::TlsTestPaths;

/// A test client holding one TLS connection to the server.
pub struct TestClient {
    reader: BufReader<ReadHalf<TlsStream<TcpStream>>>,
    writer: WriteHalf<TlsStream<TcpStream>>,
}

impl TestClient {
    /// Connect and complete the TLS handshake, trusting the test CA.
    pub async fn connect(address: &str, tls: &TlsTestPaths) -> anyhow::Result<Self> {
        let _ = tokio_rustls::rustls::crypto::aws_lc_rs::default_provider().install_default();

        let stream = TcpStream::connect(address).await?;

        let ca_data = tokio::fs::read(&tls.ca_path).await?;
        let ca_certs: Vec<CertificateDer> = certs(&mut StdBufReader::new(Cursor::new(ca_data)))
            .collect::<Result<Vec<_>, _>>()?;
        let mut root_store = RootCertStore::empty();
        for cert in ca_certs {
            root_store.add(cert)?;
        }

        let config = ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();
        let connector = TlsConnector::from(Arc::new(config));
        let server_name = ServerName::try_from(tls.server_name.clone())
            .map_err(|e| anyhow::anyhow!("Invalid TLS server name: {e}"))?;
        let tls_stream = connector.connect(server_name, stream).await?;

        let (read_half, write_half) = tokio::io::split(tls_stream);
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: write_half,
        })
    }

    /// Send one protocol line.
    pub async fn send_line(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Receive one line (reply or push) within the default timeout.
    pub async fn recv_line(&mut self) -> anyhow::Result<String> {
        self.recv_line_timeout(Duration::from_secs(15)).await
    }

    /// Receive one line within `dur`.
    pub async fn recv_line_timeout(&mut self, dur: Duration) -> anyhow::Result<String> {
        let mut line = String::new();
        let read = timeout(dur, self.reader.read_line(&mut line)).await??;
        if read == 0 {
            anyhow::bail!("Connection closed by server");
        }
        Ok(line.trim_end().to_string())
    }

    /// True when nothing arrives within `dur`.
    pub async fn expect_silence(&mut self, dur: Duration) -> bool {
        let mut line = String::new();
        timeout(dur, self.reader.read_line(&mut line)).await.is_err()
    }

    /// Send a command and read its single reply line.
    pub async fn request(&mut self, line: &str) -> anyhow::Result<String> {
        self.send_line(line).await?;
        self.recv_line().await
    }

    /// REGISTER, asserting success.
    pub async fn register(&mut self, username: &str, password_hash: &str) -> anyhow::Result<()> {
        let reply = self
            .request(&format!("REGISTER {} {}", username, password_hash))
            .await?;
        anyhow::ensure!(reply == "OK REG", "unexpected REGISTER reply: {}", reply);
        Ok(())
    }

    /// LOGIN, asserting success.
    pub async fn login(&mut self, username: &str, password_hash: &str) -> anyhow::Result<()> {
        let reply = self
            .request(&format!("LOGIN {} {}", username, password_hash))
            .await?;
        anyhow::ensure!(reply == "OK LOGIN", "unexpected LOGIN reply: {}", reply);
        Ok(())
    }

    /// GET_USER_ID, returning the numeric id.
    pub async fn user_id(&mut self, username: &str) -> anyhow::Result<i64> {
        let reply = self.request(&format!("GET_USER_ID {}", username)).await?;
        reply
            .parse()
            .map_err(|_| anyhow::anyhow!("unexpected GET_USER_ID reply: {}", reply))
    }

    /// CREATE_CHAT 0, returning the new chat id. The NEW_CHAT pushes stay
    /// queued for the caller to consume.
    pub async fn create_private_chat(&mut self, peer: i64) -> anyhow::Result<i64> {
        let reply = self.request(&format!("CREATE_CHAT 0 {}", peer)).await?;
        reply
            .parse()
            .map_err(|_| anyhow::anyhow!("unexpected CREATE_CHAT reply: {}", reply))
    }

    /// SEND, returning the assigned message id.
    pub async fn send_message(&mut self, chat_id: i64, text: &str) -> anyhow::Result<i64> {
        let reply = self.request(&format!("SEND {} {}", chat_id, text)).await?;
        let id = reply
            .strip_prefix("OK SENT ")
            .ok_or_else(|| anyhow::anyhow!("unexpected SEND reply: {}", reply))?;
        Ok(id.parse()?)
    }

    /// LIST_CHATS, returning the raw CHATS line. Also resubscribes this
    /// connection server-side.
    pub async fn list_chats(&mut self) -> anyhow::Result<String> {
        self.request("LIST_CHATS").await
    }

    /// HISTORY, returning the raw HISTORY line.
    pub async fn history(&mut self, chat_id: i64) -> anyhow::Result<String> {
        self.request(&format!("HISTORY {}", chat_id)).await
    }
}
