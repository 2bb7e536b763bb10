//! Buffered TCP transport, optionally TLS-wrapped.
//!
//! An enum over the two stream kinds rather than a trait object: both
//! variants implement `Read`/`Write` directly, and the DSS framer only
//! ever talks to one `Transport` at a time.

use crate::conn::params::{ConnectParams, Tls};
use crate::error::{DrdaError, DrdaResult};
use rustls::{Certificate, ClientConfig, ClientConnection, RootCertStore, StreamOwned};
use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

/// A connected transport, plain or TLS-wrapped. Both variants offer the
/// same `Read`/`Write` surface to the DSS framer.
pub enum Transport {
    Plain(TcpStream),
    Tls(Box<StreamOwned<ClientConnection, TcpStream>>),
}

impl Transport {
    pub fn connect(params: &ConnectParams) -> DrdaResult<Self> {
        let addr = format!("{}:{}", params.host(), params.port());
        log::trace!("connecting to {addr}");
        let stream = TcpStream::connect(&addr)?;
        if let Some(timeout) = params.timeout() {
            stream.set_read_timeout(Some(timeout))?;
        }

        let transport = match params.tls() {
            Tls::Off => Self::Plain(stream),
            Tls::On { ca_certs } => {
                let config = build_client_config(ca_certs.as_deref())?;
                let server_name = rustls::ServerName::try_from(params.host())?;
                let conn = ClientConnection::new(Arc::new(config), server_name)?;
                Self::Tls(Box::new(StreamOwned::new(conn, stream)))
            }
        };
        log::debug!("transport established ({})", transport.kind());
        Ok(transport)
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Plain(_) => "plain TCP",
            Self::Tls(_) => "TLS",
        }
    }
}

/// This crate bundles no default CA store, so server validation always
/// requires an explicit `ca_certs` path.
fn build_client_config(ca_certs: Option<&std::path::Path>) -> DrdaResult<ClientConfig> {
    let path = ca_certs.ok_or_else(|| {
        DrdaError::Tls("TLS requested without a ca_certs bundle; this driver trusts no default roots".into())
    })?;
    let mut root_store = RootCertStore::empty();
    let file = std::fs::File::open(path)
        .map_err(|e| DrdaError::Tls(format!("opening CA bundle {path:?}: {e}")))?;
    let mut reader = std::io::BufReader::new(file);
    let certs = rustls_pemfile::certs(&mut reader)
        .map_err(|e| DrdaError::Tls(format!("parsing CA bundle {path:?}: {e}")))?;
    let (n_ok, n_err) =
        root_store.add_parsable_certificates(&certs.into_iter().map(Certificate).collect::<Vec<_>>());
    if n_ok == 0 {
        return Err(DrdaError::Tls(format!(
            "no usable certificates found in {path:?} ({n_err} rejected)"
        )));
    }
    Ok(ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(root_store)
        .with_no_client_auth())
}

impl Read for Transport {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Self::Plain(s) => s.read(buf),
            Self::Tls(s) => s.read(buf),
        }
    }
}

impl Write for Transport {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Self::Plain(s) => s.write(buf),
            Self::Tls(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Self::Plain(s) => s.flush(),
            Self::Tls(s) => s.flush(),
        }
    }
}
