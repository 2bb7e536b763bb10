//! DSS (Data Stream Structure) envelope framing: the six-byte header that
//! wraps every DDM object on the wire, plus the inner `{length, code point}`
//! pair that precedes the object's body.
//!
//! The write side mirrors a header-then-payload emitter over a byte sink;
//! the read side is a loop that keeps pulling DSS frames for as long as the
//! chained bit is set, handing each one back to the caller to dispatch by
//! code point.

use crate::dialect::Dialect;
use crate::error::{DrdaError, DrdaResult};
use crate::protocol::codepoint::{CodePoint, QRYDTA};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// DSS header magic byte.
pub const DSS_MAGIC: u8 = 0xD0;

/// DSS length value signalling a continued (multi-sub-block) object: the
/// true length didn't fit the 16-bit length field, so the object spans a
/// fixed first chunk plus one additional sub-block.
pub const DSS_CONTINUATION_LEN: u16 = 0xFFFF;

/// Db2's continuation inner-length magic (`0x8004`) and the fixed size of
/// the first chunk that follows it: `0x7FFF - 6 - 4`, i.e. the largest
/// sub-block size minus the six-byte DSS header and the four-byte inner
/// header already consumed.
pub const DB2_CONT_OBJ_LEN: u16 = 32772;
pub const DB2_CONT_FIRST_CHUNK_LEN: usize = 32757;
/// Trailing sub-block length that tells the caller a CNTQRY is needed to
/// pull the rest of the result set.
pub const DB2_CONT_TRAILER_LEN: u16 = 0x7FFE;

/// Derby's continuation inner-length magic, its secondary 4-byte length
/// (always this fixed value in practice), and the fixed first-chunk size
/// that follows both.
pub const DERBY_CONT_OBJ_LEN: u16 = 32776;
pub const DERBY_CONT_SECONDARY_LEN: u32 = 61515;
pub const DERBY_CONT_FIRST_CHUNK_LEN: usize = 32753;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DssType {
    Request,
    Reply,
    Object,
    RequestNoReply,
    Comm,
}

impl DssType {
    fn from_low_nibble(n: u8) -> DrdaResult<Self> {
        match n {
            1 => Ok(Self::Request),
            2 => Ok(Self::Reply),
            3 => Ok(Self::Object),
            4 => Ok(Self::RequestNoReply),
            5 => Ok(Self::Comm),
            other => Err(DrdaError::protocol(format!(
                "unknown DSS type nibble {other}"
            ))),
        }
    }

    fn low_nibble(self) -> u8 {
        match self {
            Self::Request => 1,
            Self::Reply => 2,
            Self::Object => 3,
            Self::RequestNoReply => 4,
            Self::Comm => 5,
        }
    }
}

/// A single parsed DSS frame.
#[derive(Debug)]
pub struct DssFrame {
    pub dss_type: DssType,
    pub chained: bool,
    pub continue_on_error: bool,
    pub same_correlator_next: bool,
    pub correlation_id: u16,
    pub code_point: CodePoint,
    pub body: Vec<u8>,
    /// Set when the server's continuation trailer signals the caller must
    /// send a CNTQRY to pull further blocks.
    pub more_data: bool,
}

/// Reads one header plus one inner `{length, code point, body}` from
/// `stream`, pulling the extra continuation sub-block when the DSS length
/// signals one.
pub fn read_dss(stream: &mut dyn Read, dialect: Dialect) -> DrdaResult<DssFrame> {
    let mut header = [0_u8; 6];
    read_exact_retrying(stream, &mut header)?;
    let dss_length = BigEndian::read_u16(&header[0..2]);
    if header[2] != DSS_MAGIC {
        return Err(DrdaError::protocol(format!(
            "bad DSS magic byte {:#04x}, expected {DSS_MAGIC:#04x}",
            header[2]
        )));
    }
    let flags = header[3];
    let dss_type = DssType::from_low_nibble(flags & 0x0F)?;
    let chained = (flags & 0b0100_0000) != 0;
    let continue_on_error = (flags & 0b0010_0000) != 0;
    let same_correlator_next = (flags & 0b0001_0000) != 0;
    let correlation_id = BigEndian::read_u16(&header[4..6]);

    let mut inner_header = [0_u8; 4];
    read_exact_retrying(stream, &mut inner_header)?;
    let inner_length = BigEndian::read_u16(&inner_header[0..2]);
    let code_point = BigEndian::read_u16(&inner_header[2..4]);

    if dss_length != DSS_CONTINUATION_LEN {
        if inner_length.wrapping_add(6) != dss_length {
            return Err(DrdaError::protocol(format!(
                "DSS inner_length({inner_length}) + 6 != dss_length({dss_length})"
            )));
        }
        let body_length = dss_length as usize - 6;
        let mut body = vec![0_u8; body_length.saturating_sub(4)];
        read_exact_retrying(stream, &mut body)?;
        return Ok(DssFrame {
            dss_type,
            chained,
            continue_on_error,
            same_correlator_next,
            correlation_id,
            code_point,
            body,
            more_data: false,
        });
    }

    // A continued object is only ever a QRYDTA row block that didn't fit in
    // one sub-block: a fixed first chunk, followed by one more sub-block
    // whose own 2-byte length prefix is read off the wire (not inferred from
    // `inner_length`, which only ever carries the dialect's fixed magic).
    if code_point != QRYDTA {
        return Err(DrdaError::protocol(format!(
            "continued DSS for unexpected code point {code_point:#06x}, expected QRYDTA"
        )));
    }
    let (body, more_data) = match dialect {
        Dialect::Db2 => read_db2_continuation(stream, inner_length)?,
        Dialect::Derby => read_derby_continuation(stream, inner_length)?,
    };

    Ok(DssFrame {
        dss_type,
        chained,
        continue_on_error,
        same_correlator_next,
        correlation_id,
        code_point,
        body,
        more_data,
    })
}

/// Reads a Db2-style continued QRYDTA: a fixed 32757-byte first chunk after
/// the `0x8004` magic, then one trailing sub-block (its own 2-byte length
/// prefix followed by `length - 2` bytes) appended unconditionally. The
/// trailing sub-block's length equalling `0x7FFE` only ever means "the
/// caller must CNTQRY for more data" — its payload bytes still belong to
/// this row block and must not be dropped.
fn read_db2_continuation(stream: &mut dyn Read, obj_len: u16) -> DrdaResult<(Vec<u8>, bool)> {
    if obj_len != DB2_CONT_OBJ_LEN {
        return Err(DrdaError::protocol(format!(
            "unexpected Db2 continuation obj_len {obj_len:#06x}, expected {DB2_CONT_OBJ_LEN:#06x}"
        )));
    }
    let mut body = vec![0_u8; DB2_CONT_FIRST_CHUNK_LEN];
    read_exact_retrying(stream, &mut body)?;

    let mut len_buf = [0_u8; 2];
    read_exact_retrying(stream, &mut len_buf)?;
    let next_len = BigEndian::read_u16(&len_buf);
    let mut extra = vec![0_u8; next_len as usize - 2];
    read_exact_retrying(stream, &mut extra)?;
    body.extend_from_slice(&extra);

    let more_data = next_len == DB2_CONT_TRAILER_LEN;
    Ok((body, more_data))
}

/// Reads a Derby-style continued QRYDTA: a secondary 4-byte length after the
/// `32776` magic, a fixed 32753-byte first chunk, then one trailing
/// sub-block appended unconditionally, mirroring the Db2 side's structure
/// but without a continuation-trailer signal of its own.
fn read_derby_continuation(stream: &mut dyn Read, obj_len: u16) -> DrdaResult<(Vec<u8>, bool)> {
    if obj_len != DERBY_CONT_OBJ_LEN {
        return Err(DrdaError::protocol(format!(
            "unexpected Derby continuation obj_len {obj_len:#06x}, expected {DERBY_CONT_OBJ_LEN:#06x}"
        )));
    }
    let mut secondary_len_buf = [0_u8; 4];
    read_exact_retrying(stream, &mut secondary_len_buf)?;
    let secondary_len = BigEndian::read_u32(&secondary_len_buf);
    if secondary_len != DERBY_CONT_SECONDARY_LEN {
        return Err(DrdaError::protocol(format!(
            "unexpected Derby continuation secondary length {secondary_len}, expected {DERBY_CONT_SECONDARY_LEN}"
        )));
    }

    let mut body = vec![0_u8; DERBY_CONT_FIRST_CHUNK_LEN];
    read_exact_retrying(stream, &mut body)?;

    let mut len_buf = [0_u8; 2];
    read_exact_retrying(stream, &mut len_buf)?;
    let next_len = BigEndian::read_u16(&len_buf);
    let mut extra = vec![0_u8; next_len as usize - 2];
    read_exact_retrying(stream, &mut extra)?;
    body.extend_from_slice(&extra);

    Ok((body, false))
}

/// Writes one DSS envelope wrapping `code_point`/`body`.
///
/// `next_has_same_id` sets the same-correlator-next bit; `last_packet`
/// clears the chained bit. Returns the correlation id the *next* object in
/// the batch should use.
pub fn write_dss(
    stream: &mut dyn Write,
    code_point: CodePoint,
    body: &[u8],
    correlation_id: u16,
    next_has_same_id: bool,
    last_packet: bool,
) -> DrdaResult<u16> {
    let inner_length = body.len() as u16 + 4;
    let dss_length = inner_length + 2;

    let mut flags = dss_type_for(code_point).low_nibble();
    if !last_packet {
        flags |= 0b0100_0000;
    }
    if next_has_same_id {
        flags |= 0b0001_0000;
    }

    stream.write_u16::<BigEndian>(dss_length)?;
    stream.write_u8(DSS_MAGIC)?;
    stream.write_u8(flags)?;
    stream.write_u16::<BigEndian>(correlation_id)?;
    stream.write_u16::<BigEndian>(inner_length)?;
    stream.write_u16::<BigEndian>(code_point)?;
    stream.write_all(body)?;

    Ok(if next_has_same_id {
        correlation_id
    } else {
        correlation_id + 1
    })
}

fn dss_type_for(code_point: CodePoint) -> DssType {
    use crate::protocol::codepoint::{SQLATTR, SQLDTA, SQLSTT};
    if matches!(code_point, SQLSTT | SQLATTR | SQLDTA) {
        DssType::Object
    } else {
        DssType::Request
    }
}

/// Accumulates until `buf` is filled; retries on zero-byte, non-EOF reads,
/// and gives up with `TransportClosed` after 16 consecutive empty reads.
fn read_exact_retrying(stream: &mut dyn Read, buf: &mut [u8]) -> DrdaResult<()> {
    const MAX_ZERO_READS: u32 = 16;
    let mut filled = 0;
    let mut zero_reads = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => {
                zero_reads += 1;
                if zero_reads >= MAX_ZERO_READS {
                    return Err(DrdaError::TransportClosed);
                }
            }
            Ok(n) => {
                filled += n;
                zero_reads = 0;
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(DrdaError::from(e)),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::codepoint::EXCSAT;

    #[test]
    fn write_then_read_round_trips() {
        let body = b"hello world".to_vec();
        let mut buf = Vec::new();
        let next_id = write_dss(&mut buf, EXCSAT, &body, 1, false, true).unwrap();
        assert_eq!(next_id, 2);

        let mut cursor = &buf[..];
        let frame = read_dss(&mut cursor, Dialect::Derby).unwrap();
        assert_eq!(frame.code_point, EXCSAT);
        assert_eq!(frame.body, body);
        assert!(!frame.chained);
        assert_eq!(frame.correlation_id, 1);
    }

    #[test]
    fn same_id_progression() {
        let mut buf = Vec::new();
        let id1 = write_dss(&mut buf, EXCSAT, b"a", 1, true, false).unwrap();
        assert_eq!(id1, 1);
        let id2 = write_dss(&mut buf, EXCSAT, b"b", id1, false, true).unwrap();
        assert_eq!(id2, 2);
    }

    #[test]
    fn correlation_id_progression_across_batch() {
        // k requests, j of them same-id: final id == 1 + (k - j).
        let k = 5;
        let same_id_flags = [true, false, true, false, false];
        let j = same_id_flags.iter().filter(|b| **b).count();
        let mut id = 1_u16;
        let mut buf = Vec::new();
        for (i, same) in same_id_flags.iter().enumerate() {
            id = write_dss(&mut buf, EXCSAT, b"x", id, *same, i == k - 1).unwrap();
        }
        assert_eq!(id as usize, 1 + (k - j));
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = vec![0_u8, 10, 0xAB, 0x01, 0, 1, 0, 4, 0x10, 0x41];
        bytes[2] = 0xAB;
        let mut cursor = &bytes[..];
        let err = read_dss(&mut cursor, Dialect::Derby);
        assert!(err.is_err());
    }

    fn continued_qrydta_header(dss_type_and_chained: u8) -> Vec<u8> {
        let mut header = Vec::new();
        header.write_u16::<BigEndian>(DSS_CONTINUATION_LEN).unwrap();
        header.push(DSS_MAGIC);
        header.push(dss_type_and_chained);
        header.write_u16::<BigEndian>(1).unwrap(); // correlation id
        header
    }

    #[test]
    fn db2_continuation_reads_trailer_payload_and_signals_more_data() {
        let mut wire = continued_qrydta_header(0x02); // reply, not chained
        wire.write_u16::<BigEndian>(DB2_CONT_OBJ_LEN).unwrap();
        wire.write_u16::<BigEndian>(QRYDTA).unwrap();
        wire.extend(std::iter::repeat(0xAB_u8).take(DB2_CONT_FIRST_CHUNK_LEN));
        // Trailing sub-block: length 0x7FFE including itself, so 0x7FFC
        // payload bytes must be read and appended, not dropped.
        wire.write_u16::<BigEndian>(DB2_CONT_TRAILER_LEN).unwrap();
        wire.extend(std::iter::repeat(0xCD_u8).take(DB2_CONT_TRAILER_LEN as usize - 2));

        let mut cursor = &wire[..];
        let frame = read_dss(&mut cursor, Dialect::Db2).unwrap();
        assert!(frame.more_data);
        assert_eq!(frame.body.len(), DB2_CONT_FIRST_CHUNK_LEN + DB2_CONT_TRAILER_LEN as usize - 2);
        assert!(frame.body[DB2_CONT_FIRST_CHUNK_LEN..].iter().all(|&b| b == 0xCD));
        assert_eq!(cursor.len(), 0, "all continuation bytes must be consumed");
    }

    #[test]
    fn db2_continuation_without_trailer_marker_appends_bytes_and_clears_more_data() {
        let mut wire = continued_qrydta_header(0x02);
        wire.write_u16::<BigEndian>(DB2_CONT_OBJ_LEN).unwrap();
        wire.write_u16::<BigEndian>(QRYDTA).unwrap();
        wire.extend(std::iter::repeat(0xAB_u8).take(DB2_CONT_FIRST_CHUNK_LEN));
        wire.write_u16::<BigEndian>(10).unwrap();
        wire.extend(std::iter::repeat(0xEF_u8).take(8));

        let mut cursor = &wire[..];
        let frame = read_dss(&mut cursor, Dialect::Db2).unwrap();
        assert!(!frame.more_data);
        assert_eq!(frame.body.len(), DB2_CONT_FIRST_CHUNK_LEN + 8);
        assert!(frame.body[DB2_CONT_FIRST_CHUNK_LEN..].iter().all(|&b| b == 0xEF));
    }

    #[test]
    fn derby_continuation_appends_trailing_sub_block() {
        let mut wire = continued_qrydta_header(0x02);
        wire.write_u16::<BigEndian>(DERBY_CONT_OBJ_LEN).unwrap();
        wire.write_u16::<BigEndian>(QRYDTA).unwrap();
        wire.write_u32::<BigEndian>(DERBY_CONT_SECONDARY_LEN).unwrap();
        wire.extend(std::iter::repeat(0xAB_u8).take(DERBY_CONT_FIRST_CHUNK_LEN));
        wire.write_u16::<BigEndian>(6).unwrap();
        wire.extend(std::iter::repeat(0x11_u8).take(4));

        let mut cursor = &wire[..];
        let frame = read_dss(&mut cursor, Dialect::Derby).unwrap();
        assert!(!frame.more_data);
        assert_eq!(frame.body.len(), DERBY_CONT_FIRST_CHUNK_LEN + 4);
        assert_eq!(cursor.len(), 0);
    }
}
