//! Test server management.
//!
//! Spawns and manages chatterd instances for integration testing. Each
//! server gets its own data directory, TLS assets and SQLite database; the
//! admin channel is reachable through the child's piped stdin.

#![allow(dead_code)]

use std::io::Write;
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::sleep;

use super::client::TestClient;
use super::tls::{TlsTestPaths, generate_tls_assets};

/// A spawned chatterd instance.
pub struct TestServer {
    child: Child,
    stdin: Option<ChildStdin>,
    port: u16,
    tls: TlsTestPaths,
    // Kept alive (and cleaned up) for servers that own their directory.
    data_dir: Option<TempDir>,
}

impl TestServer {
    /// Spawn a server on the given port with a fresh data directory.
    pub async fn spawn(port: u16) -> anyhow::Result<Self> {
        let data_dir = tempfile::tempdir()?;
        let tls = generate_tls_assets(&data_dir.path().join("tls"))?;
        let mut server = Self::spawn_at(port, data_dir.path(), tls).await?;
        server.data_dir = Some(data_dir);
        Ok(server)
    }

    /// Spawn a server against an existing data directory and TLS assets.
    /// Used to restart a server on the same database.
    pub async fn spawn_at(port: u16, dir: &Path, tls: TlsTestPaths) -> anyhow::Result<Self> {
        let config_path = dir.join("config.toml");
        let config_content = format!(
            r#"
[server]
listen = "127.0.0.1:{port}"
log_format = "pretty"

[tls]
cert_path = "{cert}"
key_path = "{key}"

[database]
path = "{db}"
"#,
            port = port,
            cert = tls.server_cert_path.display(),
            key = tls.server_key_path.display(),
            db = dir.join("chatter.db").display(),
        );
        std::fs::write(&config_path, config_content)?;

        let mut child = Command::new(env!("CARGO_BIN_EXE_chatterd"))
            .arg(&config_path)
            .stdin(Stdio::piped())
            .spawn()?;
        let stdin = child.stdin.take();

        let server = Self {
            child,
            stdin,
            port,
            tls,
            data_dir: None,
        };

        server.wait_until_ready().await?;
        Ok(server)
    }

    /// Wait until the server is accepting connections.
    async fn wait_until_ready(&self) -> anyhow::Result<()> {
        for _ in 0..50 {
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("Server failed to start within 5 seconds")
    }

    /// Get the server address.
    pub fn address(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    /// The TLS assets clients need to trust this server.
    pub fn tls(&self) -> &TlsTestPaths {
        &self.tls
    }

    /// Create a new test client connected to this server.
    pub async fn connect(&self) -> anyhow::Result<TestClient> {
        TestClient::connect(&self.address(), &self.tls).await
    }

    /// Send one admin command to the server's stdin.
    pub fn admin(&mut self, command: &str) -> anyhow::Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("admin stdin is closed"))?;
        writeln!(stdin, "{}", command)?;
        stdin.flush()?;
        Ok(())
    }

    /// Wait for the server process to exit.
    pub async fn wait_exit(&mut self, limit: Duration) -> anyhow::Result<()> {
        let deadline = std::time::Instant::now() + limit;
        loop {
            if self.child.try_wait()?.is_some() {
                return Ok(());
            }
            if std::time::Instant::now() >= deadline {
                anyhow::bail!("server did not exit within {:?}", limit);
            }
            sleep(Duration::from_millis(50)).await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
