//! TLS acceptor construction from PEM material.
//!
//! Server-authenticated TLS only; clients are expected to be configured to
//! trust the server certificate, which need not chain to a public root.

use rustls_pemfile::{certs, pkcs8_private_keys};
use std::io::Cursor;
use std::sync::Arc;
use thiserror::Error;
use tokio_rustls::TlsAcceptor;
use tokio_rustls::rustls::ServerConfig;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer};

/// Failures while loading TLS material. All of them abort boot.
#[derive(Debug, Error)]
pub enum TlsError {
    #[error("failed to read TLS material: {0}")]
    Io(#[from] std::io::Error),
    #[error("no certificates found in {0}")]
    NoCertificates(String),
    #[error("no private key found in {0}")]
    NoPrivateKey(String),
    #[error("TLS configuration rejected: {0}")]
    Rustls(#[from] tokio_rustls::rustls::Error),
}

/// Build the server-side acceptor from a PEM certificate chain and PKCS#8
/// private key. `with_single_cert` rejects a key that does not match the
/// certificate, so mismatched material fails here.
pub async fn build_acceptor(cert_path: &str, key_path: &str) -> Result<TlsAcceptor, TlsError> {
    let _ = tokio_rustls::rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cert_data = tokio::fs::read(cert_path).await?;
    let cert_chain: Vec<CertificateDer<'static>> = certs(&mut Cursor::new(&cert_data))
        .filter_map(|r| r.ok())
        .collect();
    if cert_chain.is_empty() {
        return Err(TlsError::NoCertificates(cert_path.to_string()));
    }

    let key_data = tokio::fs::read(key_path).await?;
    let key = pkcs8_private_keys(&mut Cursor::new(&key_data))
        .filter_map(|r| r.ok())
        .map(PrivateKeyDer::Pkcs8)
        .next()
        .ok_or_else(|| TlsError::NoPrivateKey(key_path.to_string()))?;

    let config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(cert_chain, key)?;

    Ok(TlsAcceptor::from(Arc::new(config)))
}
