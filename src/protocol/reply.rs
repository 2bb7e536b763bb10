//! Parses server DDM/DRDA reply objects into structured values.
//!
//! Each parser loops over the object's nested triplet/group items and
//! dispatches by the tag or marker byte leading each one.

use crate::dialect::Dialect;
use crate::error::{DrdaError, DrdaResult};
use crate::protocol::codepoint::*;
use crate::protocol::encoding::Endianness;
use crate::protocol::field_codec::{decode_field, FieldDescriptor};
use crate::types::{ColumnDescriptor, Row};
use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Parsed SQLCARD/SQLCAXGRP contents.
///
/// `warnings()` retains the raw `sqlwarn` bytes but the connection layer
/// does not raise or log above `warn!` for them; see DESIGN.md for the
/// reasoning.
#[derive(Clone, Debug, Default)]
pub struct SqlCard {
    pub sqlcode: i32,
    pub sqlstate: String,
    pub sqlerrproc: String,
    pub sqlerrd: [i32; 6],
    sqlwarn: [u8; 11],
    pub rdbname: String,
    pub message: String,
}

impl SqlCard {
    #[must_use]
    pub fn warnings(&self) -> &[u8; 11] {
        &self.sqlwarn
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.sqlcode >= 0
    }
}

fn read_i32_dialect(buf: &[u8], dialect: Dialect) -> i32 {
    match dialect.endianness() {
        Endianness::Big => BigEndian::read_i32(buf),
        Endianness::Little => LittleEndian::read_i32(buf),
    }
}

fn read_u16_dialect(buf: &[u8], dialect: Dialect) -> u16 {
    match dialect.endianness() {
        Endianness::Big => BigEndian::read_u16(buf),
        Endianness::Little => LittleEndian::read_u16(buf),
    }
}

/// Cursor over a reply body; panics are avoided in favor of `ProtocolError`
/// on short reads.
struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> DrdaResult<&'a [u8]> {
        if self.pos + n > self.buf.len() {
            return Err(DrdaError::protocol(format!(
                "reply body truncated: need {n} bytes at offset {}, have {}",
                self.pos,
                self.buf.len()
            )));
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn peek_u8(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }
}

/// Parses a SQLCARD object. A leading `0xFF` means "no error / empty card".
/// Returns `Err(OperationalError)` when `sqlcode < 0`; callers that need the
/// warning bytes of a *successful* call should inspect the `Ok` value before
/// acting on it.
pub fn parse_sqlcard(body: &[u8], dialect: Dialect) -> DrdaResult<SqlCard> {
    let (card, _consumed) = parse_sqlcard_inner(body, dialect)?;
    if card.sqlcode < 0 {
        return Err(DrdaError::OperationalError {
            sqlcode: card.sqlcode,
            sqlstate: card.sqlstate,
            message: card.message,
        });
    }
    Ok(card)
}

/// Inner parse that never errors on a negative sqlcode, returning the
/// number of bytes consumed so SQLDARD can continue reading after it.
fn parse_sqlcard_inner(body: &[u8], dialect: Dialect) -> DrdaResult<(SqlCard, usize)> {
    let mut c = Cursor::new(body);
    if c.peek_u8() == Some(0xFF) {
        c.take(1)?;
        return Ok((SqlCard::default(), c.pos));
    }

    let marker = c.take(1)?[0];
    if marker != 0x00 {
        return Err(DrdaError::protocol(format!(
            "unexpected SQLCAGRP marker {marker:#04x}"
        )));
    }
    let sqlcode = read_i32_dialect(c.take(4)?, dialect);
    let sqlstate = dialect.encoding().decode(c.take(5)?)?;
    let sqlerrproc = dialect.encoding().decode(c.take(8)?)?;

    let marker = c.take(1)?[0];
    if marker != 0x00 {
        return Err(DrdaError::protocol(format!(
            "unexpected SQLCAXGRP marker {marker:#04x}"
        )));
    }
    let mut sqlerrd = [0_i32; 6];
    for slot in &mut sqlerrd {
        *slot = read_i32_dialect(c.take(4)?, dialect);
    }
    let mut sqlwarn = [0_u8; 11];
    sqlwarn.copy_from_slice(c.take(11)?);

    c.take(18)?; // reserved

    let rdbname_len = read_u16_dialect(c.take(2)?, dialect) as usize;
    let rdbname = String::from_utf8(c.take(rdbname_len)?.to_vec())
        .map_err(|e| DrdaError::protocol(format!("invalid UTF-8 in SQLCARD rdbname: {e}")))?;

    let msg1_len = read_u16_dialect(c.take(2)?, dialect) as usize;
    let msg1 = dialect.encoding().decode(c.take(msg1_len)?)?;
    let msg2_len = read_u16_dialect(c.take(2)?, dialect) as usize;
    let msg2 = dialect.encoding().decode(c.take(msg2_len)?)?;
    let message = if msg1.is_empty() { msg2 } else { msg1 };

    if c.peek_u8() == Some(0xFF) {
        c.take(1)?; // SQLDIAGGRP absent
    }

    Ok((
        SqlCard {
            sqlcode,
            sqlstate,
            sqlerrproc,
            sqlerrd,
            sqlwarn,
            rdbname,
            message,
        },
        c.pos,
    ))
}

/// SQLDARD: a SQLCARD prefix plus column (or parameter) descriptors.
#[derive(Clone, Debug)]
pub struct SqlDescribe {
    pub sqlcard: SqlCard,
    pub columns: Vec<ColumnDescriptor>,
    /// `true` when `obj[0] == 0xFF`: the DARD describes bind parameters
    /// rather than result columns.
    pub describes_params: bool,
}

/// Bytes skipped before/after the core SQLDAGRP fields in the Db2 variant.
/// The precise SQLDOPTGRP/SQLDXGRP walk is undocumented, so these stay
/// named, conservative skip widths rather than a guessed field layout; see
/// DESIGN.md.
const DB2_SQLDAGRP_LEADING_SKIP: usize = 6;
const DB2_SQLDAGRP_TRAILING_SKIP: usize = 7;

pub fn parse_sqldard(body: &[u8], dialect: Dialect) -> DrdaResult<SqlDescribe> {
    let mut c = Cursor::new(body);

    let describes_params = c.peek_u8() == Some(0xFF);
    let (sqlcard, consumed) = parse_sqlcard_inner(&body[c.pos..], dialect)?;
    c.pos += consumed;

    // Optional SQLDHGRP header, following the protocol's established
    // 0xFF-absent / 0x00-present-then-length convention (mirrors the
    // SQLDIAGGRP marker used just above).
    if c.remaining() >= 1 {
        match c.peek_u8() {
            Some(0xFF) => {
                c.take(1)?;
            }
            Some(0x00) => {
                c.take(1)?;
                let len = read_u16_dialect(c.take(2)?, dialect) as usize;
                c.take(len)?;
            }
            _ => {}
        }
    }

    let mut columns = Vec::new();
    if c.remaining() >= 2 {
        let count = read_u16_dialect(c.take(2)?, dialect) as usize;
        for _ in 0..count {
            columns.push(read_column_descriptor(&mut c, dialect)?);
        }
    }

    Ok(SqlDescribe {
        sqlcard,
        columns,
        describes_params,
    })
}

fn read_column_descriptor(c: &mut Cursor<'_>, dialect: Dialect) -> DrdaResult<ColumnDescriptor> {
    if dialect == Dialect::Db2 {
        c.take(DB2_SQLDAGRP_LEADING_SKIP)?;
    }
    let drda_type = read_u16_dialect(c.take(2)?, dialect);
    let p1 = read_u16_dialect(c.take(2)?, dialect);
    let p2 = read_u16_dialect(c.take(2)?, dialect);
    c.take(2)?; // ccsid
    let name_len = c.take(1)?[0] as usize;
    let name = dialect.encoding().decode(c.take(name_len)?)?;

    match dialect {
        Dialect::Derby => {
            // SQLDOPTGRP + SQLUDTGRP + SQLDXGRP, each an optional group
            // behind the same 0xFF-absent / 0x00-present(len) marker.
            for _ in 0..3 {
                if c.remaining() == 0 {
                    break;
                }
                match c.peek_u8() {
                    Some(0xFF) => {
                        c.take(1)?;
                    }
                    Some(0x00) => {
                        c.take(1)?;
                        let len = c.take(1)?[0] as usize;
                        c.take(len)?;
                    }
                    _ => break,
                }
            }
        }
        Dialect::Db2 => {
            c.take(DB2_SQLDAGRP_TRAILING_SKIP)?;
        }
    }

    Ok(ColumnDescriptor::new(name, drda_type, p1, p2))
}

/// QRYDSC: a triplet stream describing the columns of the following QRYDTA
/// blocks.
///
/// Each triplet is one FD:OCA `lid` type byte followed by two raw parameter
/// bytes. Most families read those two bytes as one combined big-endian
/// length (`FieldDescriptor::combined_len`); DECIMAL/NDECIMAL is the
/// exception, where they are the full precision byte and the full scale
/// byte, e.g. `[0x0f, precision, scale]` for NDECIMAL — not nibbles of a
/// single byte, so no special-casing is needed here at all.
pub fn parse_qrydsc(body: &[u8]) -> DrdaResult<Vec<FieldDescriptor>> {
    if body.len() < 3 {
        return Err(DrdaError::protocol("QRYDSC body shorter than header"));
    }
    if body[1] != 0x76 || body[2] != 0xD0 {
        return Err(DrdaError::protocol(format!(
            "bad QRYDSC header bytes {:#04x} {:#04x}, expected 0x76 0xD0",
            body[1], body[2]
        )));
    }
    let mut out = Vec::new();
    let mut rest = &body[3..];
    while rest.len() >= 3 {
        let lid_type = rest[0];
        let p1 = u16::from(rest[1]);
        let p2 = u16::from(rest[2]);
        out.push(FieldDescriptor::new(lid_type, p1, p2));
        rest = &rest[3..];
    }
    Ok(out)
}

/// QRYDTA: decodes rows from a block given the current QRYDSC column list.
/// Stops at the first row prefix that isn't `0xFF 0x00`; the remaining
/// bytes (if any) are not part of this call's result.
pub fn parse_qrydta(body: &[u8], columns: &[FieldDescriptor], dialect: Dialect) -> DrdaResult<Vec<Row>> {
    let mut rdr = body;
    let mut rows = Vec::new();
    loop {
        if rdr.len() < 2 {
            break;
        }
        if rdr[0] != 0xFF || rdr[1] != 0x00 {
            break;
        }
        rdr = &rdr[2..];
        let mut values = Vec::with_capacity(columns.len());
        for desc in columns {
            values.push(decode_field(&mut rdr, *desc, dialect)?);
        }
        rows.push(Row(values));
    }
    Ok(rows)
}

/// ACCSECRD: the server's accepted/offered security mechanism and an
/// optional security token.
#[derive(Clone, Debug)]
pub struct AccSecRd {
    pub secmec: u16,
    pub sectkn: Option<Vec<u8>>,
}

pub fn parse_accsecrd(body: &[u8]) -> DrdaResult<AccSecRd> {
    let mut secmec = None;
    let mut sectkn = None;
    let mut rest = body;
    while rest.len() >= 4 {
        let len = BigEndian::read_u16(&rest[0..2]) as usize;
        let code_point = BigEndian::read_u16(&rest[2..4]);
        if len < 4 || rest.len() < len {
            return Err(DrdaError::protocol("truncated ACCSECRD item"));
        }
        let value = &rest[4..len];
        match code_point {
            SECMEC => secmec = Some(BigEndian::read_u16(value)),
            SECTKN => sectkn = Some(value.to_vec()),
            _ => {}
        }
        rest = &rest[len..];
    }
    Ok(AccSecRd {
        secmec: secmec.ok_or_else(|| DrdaError::protocol("ACCSECRD missing SECMEC"))?,
        sectkn,
    })
}

/// SQLERRRM: a server diagnostic message, decoded in the session's
/// encoding.
pub fn parse_sqlerrrm(body: &[u8], dialect: Dialect) -> DrdaResult<String> {
    dialect.encoding().decode(body)
}

/// OPNQRYRM: result of opening a cursor.
#[derive(Clone, Debug, Default)]
pub struct OpnQryRm {
    pub query_instance_id: u64,
}

impl OpnQryRm {
    /// For Db2, a successful OPNQRYRM implies further data is available
    /// and must be pulled via CNTQRY.
    #[must_use]
    pub fn requires_continuation(dialect: Dialect) -> bool {
        matches!(dialect, Dialect::Db2)
    }
}

pub fn parse_opnqryrm(body: &[u8], dialect: Dialect) -> DrdaResult<OpnQryRm> {
    let mut rest = body;
    let mut query_instance_id = 0;
    while rest.len() >= 4 {
        let len = BigEndian::read_u16(&rest[0..2]) as usize;
        let code_point = BigEndian::read_u16(&rest[2..4]);
        if len < 4 || rest.len() < len {
            break;
        }
        let value = &rest[4..len];
        if code_point == QRYINSID && value.len() >= 8 {
            query_instance_id = read_u64_dialect(value, dialect);
        }
        rest = &rest[len..];
    }
    Ok(OpnQryRm { query_instance_id })
}

fn read_u64_dialect(buf: &[u8], dialect: Dialect) -> u64 {
    match dialect.endianness() {
        Endianness::Big => BigEndian::read_u64(buf),
        Endianness::Little => LittleEndian::read_u64(buf),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_sqlcard_ok(dialect: Dialect) -> Vec<u8> {
        let mut body = Vec::new();
        body.push(0x00);
        body.extend_from_slice(&0_i32.to_be_bytes());
        body.extend_from_slice(b"00000");
        body.extend_from_slice(b"SQLPROC ");
        body.push(0x00);
        for _ in 0..6 {
            body.extend_from_slice(&0_i32.to_be_bytes());
        }
        body.extend_from_slice(&[0_u8; 11]);
        body.extend_from_slice(&[0_u8; 18]);
        body.extend_from_slice(&4_u16.to_be_bytes());
        body.extend_from_slice(b"TEST");
        body.extend_from_slice(&0_u16.to_be_bytes());
        body.extend_from_slice(&0_u16.to_be_bytes());
        body.push(0xFF);
        let _ = dialect;
        body
    }

    #[test]
    fn sqlcard_empty_marker_is_ok() {
        let card = parse_sqlcard(&[0xFF], Dialect::Derby).unwrap();
        assert!(card.is_ok());
        assert_eq!(card.sqlcode, 0);
    }

    #[test]
    fn sqlcard_success_parses_rdbname() {
        let body = sample_sqlcard_ok(Dialect::Derby);
        let card = parse_sqlcard(&body, Dialect::Derby).unwrap();
        assert_eq!(card.rdbname, "TEST");
        assert_eq!(card.sqlstate, "00000");
    }

    #[test]
    fn sqlcard_negative_code_is_operational_error() {
        let mut body = Vec::new();
        body.push(0x00);
        body.extend_from_slice(&(-204_i32).to_be_bytes());
        body.extend_from_slice(b"42704");
        body.extend_from_slice(b"SQLPROC ");
        body.push(0x00);
        for _ in 0..6 {
            body.extend_from_slice(&0_i32.to_be_bytes());
        }
        body.extend_from_slice(&[0_u8; 11]);
        body.extend_from_slice(&[0_u8; 18]);
        body.extend_from_slice(&0_u16.to_be_bytes());
        body.extend_from_slice(&4_u16.to_be_bytes());
        body.extend_from_slice(b"nope");
        body.extend_from_slice(&0_u16.to_be_bytes());
        body.push(0xFF);

        let err = parse_sqlcard(&body, Dialect::Derby).unwrap_err();
        let (sqlcode, sqlstate, message) = err.server_error().unwrap();
        assert_eq!(sqlcode, -204);
        assert_eq!(sqlstate, "42704");
        assert_eq!(message, "nope");
    }

    #[test]
    fn qrydsc_parses_triplets() {
        let mut body = vec![9, 0x76, 0xD0];
        body.push(lid::INTEGER);
        body.push(0x00);
        body.push(0x04);
        body.push(lid::DECIMAL);
        body.push(11); // precision, full byte
        body.push(2); // scale, full byte
        let fields = parse_qrydsc(&body).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].lid_type, lid::INTEGER);
        assert_eq!(fields[1].p1, 11);
        assert_eq!(fields[1].p2, 2);
    }

    #[test]
    fn qrydta_stops_at_terminator() {
        let mut body = vec![0xFF, 0x00];
        body.extend_from_slice(&42_i32.to_be_bytes());
        body.extend_from_slice(&[0x00, 0x00]); // terminator (not 0xFF 0x00)
        let columns = vec![FieldDescriptor::new(lid::INTEGER, 0, 4)];
        let rows = parse_qrydta(&body, &columns, Dialect::Derby).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn accsecrd_extracts_secmec_and_token() {
        let mut body = Vec::new();
        body.extend_from_slice(&6_u16.to_be_bytes());
        body.extend_from_slice(&SECMEC.to_be_bytes());
        body.extend_from_slice(&9_u16.to_be_bytes());
        body.extend_from_slice(&8_u16.to_be_bytes());
        body.extend_from_slice(&SECTKN.to_be_bytes());
        body.extend_from_slice(b"AB");
        let parsed = parse_accsecrd(&body).unwrap();
        assert_eq!(parsed.secmec, 9);
        assert_eq!(parsed.sectkn.unwrap(), b"AB");
    }
}
