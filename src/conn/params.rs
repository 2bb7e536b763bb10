//! Connection parameters.
//!
//! An immutable struct built through [`ConnectParamsBuilder`]; there is no
//! standard DRDA connection URL to parse, so parameters are built
//! programmatically or from the `DB2_*` environment variables instead.

use crate::dialect::Dialect;
use crate::error::{DrdaError, DrdaResult};
use secstr::SecUtf8;
use std::path::PathBuf;
use std::time::Duration;

/// Whether and how TLS is used for a connection.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Tls {
    #[default]
    Off,
    /// TLS with server validation against the given CA bundle, or the
    /// platform's default roots if `None`.
    On { ca_certs: Option<PathBuf> },
}

/// Immutable connection parameters, built via [`ConnectParamsBuilder`].
#[derive(Clone, Debug, PartialEq)]
pub struct ConnectParams {
    host: String,
    port: u16,
    dialect: Dialect,
    database: String,
    user: String,
    password: SecUtf8,
    tls: Tls,
    timeout: Option<Duration>,
}

impl ConnectParams {
    #[must_use]
    pub fn builder() -> ConnectParamsBuilder {
        ConnectParamsBuilder::default()
    }

    /// Builds parameters from the `DB2_HOST`/`DB2_DATABASE`/`DB2_USER`/
    /// `DB2_PASSWORD`/`DB2_PORT`/`DB2_SSL_CA_CERTS` environment variables,
    /// for use by integration tests gated on their presence.
    pub fn from_env() -> DrdaResult<Self> {
        let host = std::env::var("DB2_HOST")
            .map_err(|_| DrdaError::ConnParams("DB2_HOST not set".into()))?;
        let database = std::env::var("DB2_DATABASE")
            .map_err(|_| DrdaError::ConnParams("DB2_DATABASE not set".into()))?;
        let mut builder = ConnectParamsBuilder::default().host(&host).database(&database);
        if let Ok(user) = std::env::var("DB2_USER") {
            builder = builder.user(&user);
        }
        if let Ok(password) = std::env::var("DB2_PASSWORD") {
            builder = builder.password(&password);
        }
        if let Ok(port) = std::env::var("DB2_PORT") {
            let port: u16 = port
                .parse()
                .map_err(|_| DrdaError::ConnParams(format!("invalid DB2_PORT {port:?}")))?;
            builder = builder.port(port);
        }
        if let Ok(ca_certs) = std::env::var("DB2_SSL_CA_CERTS") {
            builder = builder.tls(Tls::On {
                ca_certs: Some(PathBuf::from(ca_certs)),
            });
        }
        builder.build()
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    #[must_use]
    pub fn database(&self) -> &str {
        &self.database
    }

    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    #[must_use]
    pub fn password(&self) -> &SecUtf8 {
        &self.password
    }

    #[must_use]
    pub fn tls(&self) -> &Tls {
        &self.tls
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// Builder for [`ConnectParams`]. Fields left unset fall back to the chosen
/// dialect's defaults.
#[derive(Clone, Debug, Default)]
pub struct ConnectParamsBuilder {
    host: Option<String>,
    port: Option<u16>,
    dialect: Option<Dialect>,
    database: Option<String>,
    user: Option<String>,
    password: Option<String>,
    tls: Tls,
    timeout: Option<Duration>,
}

impl ConnectParamsBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Forces the dialect rather than inferring it from `user`.
    #[must_use]
    pub fn db_type(mut self, dialect: Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    #[must_use]
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn tls(mut self, tls: Tls) -> Self {
        self.tls = tls;
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> DrdaResult<ConnectParams> {
        let host = self
            .host
            .ok_or_else(|| DrdaError::ConnParams("host is required".into()))?;
        let database = self
            .database
            .ok_or_else(|| DrdaError::ConnParams("database is required".into()))?;
        if database.len() > 18 {
            return Err(DrdaError::ConnParams(format!(
                "database name {database:?} is wider than the 18-byte PKGNAMCSN field"
            )));
        }
        let dialect = self.dialect.unwrap_or_else(|| Dialect::infer(self.user.as_deref()));
        let user = self.user.unwrap_or_else(|| dialect.default_user().to_string());
        let password = self.password.unwrap_or_default();
        let port = self.port.unwrap_or_else(|| dialect.default_port());

        Ok(ConnectParams {
            host,
            port,
            dialect,
            database,
            user,
            password: SecUtf8::from(password),
            tls: self.tls,
            timeout: self.timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_derby_when_user_absent() {
        let params = ConnectParams::builder()
            .host("localhost")
            .database("mydb")
            .build()
            .unwrap();
        assert_eq!(params.dialect(), Dialect::Derby);
        assert_eq!(params.port(), 1527);
    }

    #[test]
    fn infers_db2_when_user_present() {
        let params = ConnectParams::builder()
            .host("localhost")
            .database("mydb")
            .user("db2inst1")
            .build()
            .unwrap();
        assert_eq!(params.dialect(), Dialect::Db2);
        assert_eq!(params.port(), 50000);
    }

    #[test]
    fn rejects_overlong_database_name() {
        let err = ConnectParams::builder()
            .host("localhost")
            .database("a_database_name_far_too_long_for_pkgnamcsn")
            .build();
        assert!(err.is_err());
    }
}
