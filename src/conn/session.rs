//! The connection state machine: drives the handshake, statement execution,
//! multi-block retrieval, and teardown. The only stateful component in the
//! crate; everything it calls is a pure codec over byte buffers.
//!
//! The single owner of session identity (package id, statement sequence
//! number) that every request builder reads but never mutates itself.

use crate::conn::params::ConnectParams;
use crate::conn::tcp::Transport;
use crate::dialect::{Dialect, SecMec};
use crate::error::{DrdaError, DrdaResult};
use crate::protocol::codepoint::*;
use crate::protocol::dss::{read_dss, write_dss, DssFrame};
use crate::protocol::field_codec::{self, FieldDescriptor};
use crate::protocol::packer::{self, BoundParameter};
use crate::protocol::reply;
use crate::security::dh;
use crate::types::{ColumnDescriptor, ExecuteOutcome, ResultSet, Row, Value};
use rand::RngCore;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum State {
    Init,
    Negotiated,
    Authenticated,
    Ready,
    Closed,
}

/// One request object plus whether the *next* object in the batch shares
/// its correlation id, e.g. PRPSQLSTT sharing an id with the SQLSTT that
/// follows it.
struct BatchItem {
    code_point: u16,
    body: Vec<u8>,
    same_id_as_next: bool,
}

impl BatchItem {
    fn new(code_point: u16, body: Vec<u8>) -> Self {
        Self {
            code_point,
            body,
            same_id_as_next: false,
        }
    }

    fn chained_to_next(mut self) -> Self {
        self.same_id_as_next = true;
        self
    }
}

/// A live DRDA connection. Owns the transport and all mutable session
/// identity.
pub struct Session {
    transport: Transport,
    dialect: Dialect,
    params: ConnectParams,
    state: State,
    statement_sequence_number: u16,
    secmec: SecMec,
    pending_server_sectkn: Option<Vec<u8>>,
    dh_keypair: Option<dh::DhKeyPair>,
}

impl Session {
    /// Runs the handshake: INIT → NEGOTIATED → AUTHENTICATED → READY (the
    /// READY step only applies to Db2, which needs a `SET CLIENT` round
    /// trip the Derby dialect doesn't).
    pub fn connect(params: ConnectParams) -> DrdaResult<Self> {
        let dialect = params.dialect();
        let transport = Transport::connect(&params)?;
        let mut session = Self {
            transport,
            dialect,
            params,
            state: State::Init,
            statement_sequence_number: 0,
            secmec: dialect.default_secmec(),
            pending_server_sectkn: None,
            dh_keypair: None,
        };
        session.negotiate()?;
        session.authenticate()?;
        if dialect.needs_set_client_init() {
            session.init_db2_client()?;
        }
        session.state = State::Ready;
        Ok(session)
    }

    fn negotiate(&mut self) -> DrdaResult<()> {
        let accsecrd = self.send_accsec(self.secmec)?;

        let mut server_sectkn = accsecrd.sectkn;
        if let Some(server_secmec) = SecMec::from_code(accsecrd.secmec) {
            if server_secmec != self.secmec {
                // Server proposed a different mechanism than requested;
                // resend ACCSEC under it.
                self.secmec = server_secmec;
                let accsecrd = self.send_accsec(self.secmec)?;
                server_sectkn = accsecrd.sectkn;
            }
        }
        self.pending_server_sectkn = server_sectkn;

        self.state = State::Negotiated;
        Ok(())
    }

    /// Sends one ACCSEC under `secmec`, generating (and caching) a DH
    /// keypair first when `secmec` is SECMEC 9.
    fn send_accsec(&mut self, secmec: SecMec) -> DrdaResult<reply::AccSecRd> {
        let manager_levels: &[(CodePoint, u16)] =
            &[(MGR_AGENT, 7), (MGR_SQLAM, 7), (MGR_CMNTCPIP, 5), (MGR_RDB, 7)];
        let excsat = packer::pack_excsat(self.params.host(), manager_levels, self.dialect);

        let dh_public = if secmec == SecMec::EUsridPwd {
            let keypair = dh::generate_private_key();
            let public = keypair.public;
            self.dh_keypair = Some(keypair);
            Some(public)
        } else {
            None
        };
        let accsec = packer::pack_accsec(
            secmec.code(),
            self.params.database(),
            dh_public.as_ref(),
            self.dialect,
        );

        let frames = self.send_batch(vec![
            BatchItem::new(EXCSAT, excsat).chained_to_next(),
            BatchItem::new(ACCSEC, accsec),
        ])?;
        let accsecrd_frame = frames
            .iter()
            .find(|f| f.code_point == ACCSECRD)
            .ok_or_else(|| DrdaError::protocol("handshake reply missing ACCSECRD"))?;
        reply::parse_accsecrd(&accsecrd_frame.body)
    }

    fn authenticate(&mut self) -> DrdaResult<()> {
        let crrtkn = random_crrtkn();
        let secchk = match self.secmec {
            SecMec::EUsridPwd => {
                let keypair = self
                    .dh_keypair
                    .take()
                    .ok_or_else(|| DrdaError::protocol("SECMEC 9 negotiated without a local DH keypair"))?;
                let server_sectkn = self
                    .pending_server_sectkn
                    .clone()
                    .ok_or_else(|| DrdaError::protocol("SECMEC 9 negotiated without a server SECTKN"))?;
                if server_sectkn.len() < 20 {
                    return Err(DrdaError::protocol("server SECTKN shorter than 20 bytes"));
                }

                let session_key = dh::calc_session_key(&server_sectkn, &keypair)?;
                let key = &session_key[12..20];
                let iv = &server_sectkn[12..20];
                let encrypted_user = dh::encrypt_des_cbc(key, iv, self.params.user().as_bytes())?;
                let encrypted_password =
                    dh::encrypt_des_cbc(key, iv, self.params.password().unsecure().as_bytes())?;
                packer::pack_secchk_encrypted(
                    self.secmec.code(),
                    self.params.database(),
                    &encrypted_user,
                    &encrypted_password,
                    self.dialect,
                )
            }
            _ => packer::pack_secchk_plain(
                self.secmec.code(),
                self.params.database(),
                self.params.user(),
                self.params.password().unsecure(),
                self.dialect,
            ),
        };
        let accrdb = packer::pack_accrdb(self.params.database(), self.dialect, &crrtkn);

        let frames = self.send_batch(vec![
            BatchItem::new(SECCHK, secchk).chained_to_next(),
            BatchItem::new(ACCRDB, accrdb),
        ])?;

        for frame in &frames {
            if frame.code_point == SQLCARD {
                reply::parse_sqlcard(&frame.body, self.dialect)?;
            }
            if frame.code_point == RDBNFNRM {
                return Err(DrdaError::DatabaseError(format!(
                    "database {:?} not found",
                    self.params.database()
                )));
            }
        }

        self.state = State::Authenticated;
        Ok(())
    }

    fn init_db2_client(&mut self) -> DrdaResult<()> {
        let excsat = packer::pack_excsat_ccsidmgr(1208);
        let pkgnamcsn = self.next_pkgnamcsn();
        let excsqlset = packer::pack_excsqlset(&pkgnamcsn);
        let wrkstn = packer::pack_sqlstt(
            &format!("SET CLIENT WRKSTNNAME '{}'", self.params.host()),
            self.dialect,
        );
        let locale = packer::pack_sqlstt("SET CURRENT LOCALE LC_CTYPE='en_US'", self.dialect);
        let rdbcmm = packer::pack_rdbcmm();

        self.send_batch(vec![
            BatchItem::new(EXCSAT, excsat).chained_to_next(),
            BatchItem::new(EXCSQLSET, excsqlset).chained_to_next(),
            BatchItem::new(SQLSTT, wrkstn).chained_to_next(),
            BatchItem::new(SQLSTT, locale).chained_to_next(),
            BatchItem::new(RDBCMM, rdbcmm),
        ])?;
        Ok(())
    }

    /// Executes DML/DDL with no parameters; returns no rows.
    pub fn execute(&mut self, sql: &str) -> DrdaResult<ExecuteOutcome> {
        let pkgnamcsn = self.next_pkgnamcsn();
        let excsqlimm = packer::pack_excsqlimm(&pkgnamcsn);
        let sqlstt = packer::pack_sqlstt(sql, self.dialect);
        let rdbcmm = packer::pack_rdbcmm();

        let frames = self.send_batch(vec![
            BatchItem::new(EXCSQLIMM, excsqlimm).chained_to_next(),
            BatchItem::new(SQLSTT, sqlstt).chained_to_next(),
            BatchItem::new(RDBCMM, rdbcmm),
        ])?;

        let mut outcome = ExecuteOutcome::default();
        for frame in &frames {
            if frame.code_point == SQLCARD {
                let card = reply::parse_sqlcard(&frame.body, self.dialect)?;
                outcome.row_count = Some(card.sqlerrd[2].max(0) as u64);
            }
        }
        Ok(outcome)
    }

    /// Runs PRPSQLSTT/SQLSTT/DSCSQLSTT, then binds each parameter to the
    /// real `(sqltype, precision, scale)` the server reported for it in the
    /// resulting SQLDARD, rather than discarding that describe step and
    /// guessing from the `Value` tag.
    fn prepare_and_describe_params(&mut self, sql: &str, params: &[Value]) -> DrdaResult<Vec<BoundParameter>> {
        let pkgnamcsn = self.next_pkgnamcsn();
        let prpsqlstt = packer::pack_prpsqlstt(&pkgnamcsn);
        let sqlstt = packer::pack_sqlstt(sql, self.dialect);
        let dscsqlstt = packer::pack_dscsqlstt(&pkgnamcsn);

        let frames = self.send_batch(vec![
            BatchItem::new(PRPSQLSTT, prpsqlstt).chained_to_next(),
            BatchItem::new(SQLSTT, sqlstt).chained_to_next(),
            BatchItem::new(DSCSQLSTT, dscsqlstt),
        ])?;

        let mut descriptors: Vec<ColumnDescriptor> = Vec::new();
        for frame in &frames {
            if frame.code_point == SQLDARD {
                descriptors = reply::parse_sqldard(&frame.body, self.dialect)?.columns;
            }
        }
        if descriptors.len() != params.len() {
            return Err(DrdaError::protocol(format!(
                "server described {} bind parameter(s) but {} were supplied",
                descriptors.len(),
                params.len()
            )));
        }

        descriptors
            .iter()
            .zip(params)
            .map(|(desc, value)| field_codec::encode_bound_param(desc, value))
            .collect()
    }

    /// Executes a statement with bound parameters and no result set.
    pub fn execute_with_params(&mut self, sql: &str, params: &[Value]) -> DrdaResult<ExecuteOutcome> {
        let bound = self.prepare_and_describe_params(sql, params)?;

        let pkgnamcsn2 = self.next_pkgnamcsn();
        let excsqlstt = packer::pack_excsqlstt(&pkgnamcsn2);
        let sqldta = packer::pack_sqldta(&bound);
        let rdbcmm = packer::pack_rdbcmm();

        let frames = self.send_batch(vec![
            BatchItem::new(EXCSQLSTT, excsqlstt).chained_to_next(),
            BatchItem::new(SQLDTA, sqldta).chained_to_next(),
            BatchItem::new(RDBCMM, rdbcmm),
        ])?;

        let mut outcome = ExecuteOutcome::default();
        for frame in &frames {
            if frame.code_point == SQLCARD {
                let card = reply::parse_sqlcard(&frame.body, self.dialect)?;
                outcome.row_count = Some(card.sqlerrd[2].max(0) as u64);
            }
        }
        Ok(outcome)
    }

    /// Opens a cursor with no parameters and retrieves all rows, requesting
    /// further blocks via CNTQRY as needed.
    pub fn query(&mut self, sql: &str) -> DrdaResult<ResultSet> {
        let pkgnamcsn = self.next_pkgnamcsn();
        let prpsqlstt = packer::pack_prpsqlstt(&pkgnamcsn);
        let sqlstt = packer::pack_sqlstt(sql, self.dialect);
        let opnqry = packer::pack_opnqry(&pkgnamcsn, false);

        let frames = self.send_batch(vec![
            BatchItem::new(PRPSQLSTT, prpsqlstt).chained_to_next(),
            BatchItem::new(SQLSTT, sqlstt).chained_to_next(),
            BatchItem::new(OPNQRY, opnqry),
        ])?;

        self.collect_result_set(frames)
    }

    /// Opens a cursor with bound parameters.
    pub fn query_with_params(&mut self, sql: &str, params: &[Value]) -> DrdaResult<ResultSet> {
        let bound = self.prepare_and_describe_params(sql, params)?;

        let pkgnamcsn2 = self.next_pkgnamcsn();
        let opnqry = packer::pack_opnqry(&pkgnamcsn2, true);
        let sqldta = packer::pack_sqldta(&bound);
        let rdbcmm = packer::pack_rdbcmm();

        let frames = self.send_batch(vec![
            BatchItem::new(OPNQRY, opnqry).chained_to_next(),
            BatchItem::new(SQLDTA, sqldta).chained_to_next(),
            BatchItem::new(RDBCMM, rdbcmm),
        ])?;

        self.collect_result_set(frames)
    }

    fn collect_result_set(&mut self, frames: Vec<DssFrame>) -> DrdaResult<ResultSet> {
        let mut columns: Vec<ColumnDescriptor> = Vec::new();
        let mut field_descriptors: Vec<FieldDescriptor> = Vec::new();
        let mut rows: Vec<Row> = Vec::new();
        let mut buffered_error: Option<DrdaError> = None;
        let mut needs_continuation = false;

        for frame in &frames {
            match frame.code_point {
                SQLDARD => match reply::parse_sqldard(&frame.body, self.dialect) {
                    Ok(describe) => columns = describe.columns,
                    Err(e) => {
                        buffered_error.get_or_insert(e);
                    }
                },
                QRYDSC => {
                    field_descriptors = reply::parse_qrydsc(&frame.body)?;
                }
                QRYDTA => {
                    rows.extend(reply::parse_qrydta(&frame.body, &field_descriptors, self.dialect)?);
                }
                SQLCARD => {
                    if let Err(e) = reply::parse_sqlcard(&frame.body, self.dialect) {
                        buffered_error.get_or_insert(e);
                    }
                }
                OPNQRYRM => {
                    let opnqryrm = reply::parse_opnqryrm(&frame.body, self.dialect)?;
                    let _ = opnqryrm;
                    needs_continuation = reply::OpnQryRm::requires_continuation(self.dialect);
                }
                _ => {}
            }
            if frame.more_data {
                needs_continuation = true;
            }
        }

        while needs_continuation {
            let pkgnamcsn = self.next_pkgnamcsn();
            let cntqry = packer::pack_cntqry(&pkgnamcsn);
            let frames = self.send_batch(vec![BatchItem::new(CNTQRY, cntqry)])?;
            needs_continuation = false;
            for frame in &frames {
                match frame.code_point {
                    QRYDTA => {
                        rows.extend(reply::parse_qrydta(&frame.body, &field_descriptors, self.dialect)?);
                    }
                    ENDQRYRM => {}
                    _ => {}
                }
                if frame.more_data {
                    needs_continuation = true;
                }
            }
        }

        if let Some(e) = buffered_error {
            return Err(e);
        }

        let mut result_set = ResultSet::new(columns);
        result_set.rows = rows;
        Ok(result_set)
    }

    /// Commits the current unit of work.
    pub fn commit(&mut self) -> DrdaResult<()> {
        self.send_batch(vec![BatchItem::new(RDBCMM, packer::pack_rdbcmm())])?;
        Ok(())
    }

    pub fn rollback(&mut self) -> DrdaResult<()> {
        self.send_batch(vec![BatchItem::new(RDBRLLBCK, packer::pack_rdbrllbck())])?;
        Ok(())
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state != State::Closed
    }

    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Sends RDBCMM then shuts down the socket. Idempotent: closing an
    /// already-closed session is a no-op.
    pub fn close(&mut self) -> DrdaResult<()> {
        if self.state == State::Closed {
            return Ok(());
        }
        let _ = self.send_batch(vec![BatchItem::new(RDBCMM, packer::pack_rdbcmm())]);
        self.state = State::Closed;
        Ok(())
    }

    fn next_pkgnamcsn(&mut self) -> Vec<u8> {
        self.statement_sequence_number = self.statement_sequence_number.wrapping_add(1);
        packer::pack_pkgnamcsn(
            self.params.database(),
            self.dialect.package_id(),
            self.dialect.package_consistency_token(),
            self.statement_sequence_number,
            self.dialect,
        )
    }

    /// Writes one correlated batch and reads back every DSS in the reply
    /// chain: the writer emits a list of DSS envelopes, the reader pulls
    /// them one at a time until the chained bit clears.
    fn send_batch(&mut self, items: Vec<BatchItem>) -> DrdaResult<Vec<DssFrame>> {
        let mut id = 1_u16;
        let last_index = items.len() - 1;
        for (i, item) in items.iter().enumerate() {
            id = write_dss(
                &mut self.transport,
                item.code_point,
                &item.body,
                id,
                item.same_id_as_next,
                i == last_index,
            )?;
        }

        let mut frames = Vec::new();
        loop {
            let frame = read_dss(&mut self.transport, self.dialect)?;
            let chained = frame.chained;
            frames.push(frame);
            if !chained {
                break;
            }
        }
        Ok(frames)
    }
}

fn random_crrtkn() -> [u8; 8] {
    let mut bytes = [0_u8; 8];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}
