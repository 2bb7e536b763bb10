//! The public connection surface exposed to the external cursor layer.
//! Translates the `Value`-typed parameter and result contract onto
//! [`crate::conn::session::Session`]'s wire-level request builders.
//!
//! A thin public wrapper around [`Session`]: this module owns no wire state
//! itself, it only shapes the API.

use crate::conn::params::ConnectParams;
use crate::conn::session::Session;
use crate::error::DrdaResult;
use crate::types::{ColumnDescription, ExecuteOutcome, Row, Value};

/// A live DRDA connection. Constructing one runs the full handshake
/// (EXCSAT/ACCSEC/SECCHK/ACCRDB, plus the Db2 `SET CLIENT` step); dropping
/// it without calling [`Connection::close`] leaves the socket to be reaped
/// by the OS rather than sending RDBCMM first.
pub struct Connection {
    session: Session,
}

impl Connection {
    /// Connects and runs the handshake.
    pub fn connect(params: ConnectParams) -> DrdaResult<Self> {
        Ok(Self {
            session: Session::connect(params)?,
        })
    }

    /// Runs DML/DDL; returns no rows; raises on server error.
    pub fn execute(&mut self, sql: &str, params: &[Value]) -> DrdaResult<ExecuteOutcome> {
        if params.is_empty() {
            self.session.execute(sql)
        } else {
            self.session.execute_with_params(sql, params)
        }
    }

    /// Returns a sequence of rows and a seven-field column description list.
    pub fn query(&mut self, sql: &str, params: &[Value]) -> DrdaResult<(Vec<Row>, Vec<ColumnDescription>)> {
        let result_set = if params.is_empty() {
            self.session.query(sql)?
        } else {
            self.session.query_with_params(sql, params)?
        };
        let description = result_set.columns.iter().map(ColumnDescription::from).collect();
        Ok((result_set.rows, description))
    }

    /// Issues `"START TRANSACTION"` via execute-immediate.
    pub fn begin(&mut self) -> DrdaResult<()> {
        self.session.execute("START TRANSACTION")?;
        Ok(())
    }

    pub fn commit(&mut self) -> DrdaResult<()> {
        self.session.commit()
    }

    pub fn rollback(&mut self) -> DrdaResult<()> {
        self.session.rollback()
    }

    /// Sends RDBCMM and shuts the socket. Idempotent.
    pub fn close(&mut self) -> DrdaResult<()> {
        self.session.close()
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }
}
