//! A client-side implementation of the DRDA wire protocol, speaking both the
//! Apache Derby and IBM Db2 dialects over a single codec.
//!
//! The crate root re-exports the surface a cursor-layer caller actually
//! needs: [`Connection`], [`ConnectParams`]/[`ConnectParamsBuilder`], the
//! [`Dialect`]/[`Tls`] enums, the [`DrdaError`]/[`DrdaResult`] error types,
//! and the [`Value`]/[`Row`]/[`ColumnDescription`] result types. Everything
//! else (`protocol::*`,
//! `security::*`, `conn::session`, `conn::tcp`) is exposed for integration
//! tests and advanced callers that want to drive the wire codec directly,
//! but is not part of the stability contract implied by this crate's
//! version number.

pub mod conn;
pub mod dialect;
pub mod error;
pub mod protocol;
pub mod security;
pub mod types;

pub use conn::connection::Connection;
pub use conn::params::{ConnectParams, ConnectParamsBuilder, Tls};
pub use dialect::Dialect;
pub use error::{DrdaError, DrdaResult};
pub use types::{ColumnDescription, ColumnDescriptor, ExecuteOutcome, ResultSet, Row, Value};
