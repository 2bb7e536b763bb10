// advisable because not all test modules use all functions of this module:
#![allow(dead_code)]

use drda::{ConnectParams, Connection, Dialect};
use flexi_logger::Logger;

/// Starts a logger if one hasn't been configured already; everything a test
/// needs is in `DB2_*` environment variables, so there's no config file to
/// plumb through.
pub fn init_logger() {
    let _ = Logger::try_with_env_or_str("info").and_then(|l| l.start());
}

/// Connects using `DB2_HOST`/`DB2_DATABASE`/`DB2_USER`/`DB2_PASSWORD`/
/// `DB2_PORT`/`DB2_SSL_CA_CERTS`, forcing `dialect` rather than inferring
/// it, since one physical test machine may run both a Derby and a Db2
/// instance side by side.
///
/// Returns `None` when the required variables aren't set, so these tests
/// are skipped rather than failing `cargo test` on a machine with no live
/// server configured.
pub fn connect_from_env(dialect: Dialect) -> Option<Connection> {
    let host = std::env::var("DB2_HOST").ok()?;
    let database = std::env::var("DB2_DATABASE").ok()?;
    let mut builder = ConnectParams::builder()
        .host(host)
        .database(database)
        .db_type(dialect);
    if let Ok(user) = std::env::var("DB2_USER") {
        builder = builder.user(user);
    }
    if let Ok(password) = std::env::var("DB2_PASSWORD") {
        builder = builder.password(password);
    }
    if let Ok(port) = std::env::var("DB2_PORT") {
        builder = builder.port(port.parse().ok()?);
    }
    let params = builder.build().ok()?;
    match Connection::connect(params) {
        Ok(conn) => Some(conn),
        Err(e) => {
            log::warn!("skipping live-server test: connect failed: {e}");
            None
        }
    }
}
