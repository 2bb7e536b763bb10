//! Encode/decode typed values. Distinct from framing: this module turns a
//! DRDA type code + length parameters into/from a [`crate::types::Value`],
//! given an already-sliced byte window.
//!
//! Decoding (QRYDSC/QRYDTA) and encoding (SQLDARD-described parameters,
//! FDODSC/FDODTA) key off two *different* DRDA registries: decode dispatches
//! on the one-byte FD:OCA `lid` type of a [`FieldDescriptor`]; encode
//! dispatches on the two-byte `sqltype` a [`crate::types::ColumnDescriptor`]
//! carries, since that is what the server's own SQLDARD parameter
//! description reports.

use crate::dialect::Dialect;
use crate::error::{DrdaError, DrdaResult};
use crate::protocol::codepoint::{lid, sqltype};
use crate::protocol::encoding::Endianness;
use crate::protocol::packer::BoundParameter;
use crate::types::{ColumnDescriptor, Value};
use bigdecimal::BigDecimal;
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use num_bigint::{BigInt, Sign};
use std::io::Read;
use time::{Date, Month, PrimitiveDateTime, Time};

/// One QRYDSC/FDODSC triplet: a one-byte FD:OCA `lid` type code plus its two
/// parameter bytes. For most types `(p1, p2)` combine as one big-endian
/// length via
/// [`FieldDescriptor::combined_len`]; DECIMAL/NDECIMAL is the exception,
/// where they are the full precision and scale bytes.
#[derive(Copy, Clone, Debug)]
pub struct FieldDescriptor {
    pub lid_type: u8,
    pub p1: u16,
    pub p2: u16,
}

impl FieldDescriptor {
    #[must_use]
    pub fn new(lid_type: u8, p1: u16, p2: u16) -> Self {
        Self { lid_type, p1, p2 }
    }

    #[must_use]
    pub fn nullable(&self) -> bool {
        lid::is_nullable(self.lid_type)
    }

    /// `(p1, p2)` read as one big-endian 16-bit length, the way most triplet
    /// families (everything but DECIMAL) use their two parameter bytes.
    #[must_use]
    pub fn combined_len(&self) -> usize {
        ((self.p1 as usize) << 8) | self.p2 as usize
    }
}

/// Reads one field from `rdr` as described by `desc`. Handles the null
/// indicator byte for nullable types: `0xFF` consumes one byte and yields
/// `Value::Null`; `0x00` consumes one byte and the typed value follows.
pub fn decode_field(
    rdr: &mut dyn Read,
    desc: FieldDescriptor,
    dialect: Dialect,
) -> DrdaResult<Value> {
    if desc.nullable() {
        let mut marker = [0_u8; 1];
        rdr.read_exact(&mut marker)?;
        if marker[0] == 0xFF {
            return Ok(Value::Null);
        } else if marker[0] != 0x00 {
            return Err(DrdaError::protocol(format!(
                "unexpected null indicator byte {:#04x}",
                marker[0]
            )));
        }
    }
    decode_value(rdr, desc, dialect)
}

fn decode_value(rdr: &mut dyn Read, desc: FieldDescriptor, dialect: Dialect) -> DrdaResult<Value> {
    use lid::*;
    let endian = dialect.endianness();
    match desc.lid_type & !1 {
        SMALL => Ok(Value::SmallInt(read_i16(rdr, endian)?)),
        INTEGER => Ok(Value::Integer(read_i32(rdr, endian)?)),
        INTEGER8 => Ok(Value::BigInt(read_i64(rdr, endian)?)),
        FLOAT4 => Ok(Value::Real(read_f32(rdr, endian)?)),
        FLOAT8 => Ok(Value::Double(read_f64(rdr, endian)?)),
        DECIMAL => {
            let precision = desc.p1;
            let scale = desc.p2 as i64;
            let nbytes = (precision as usize + 1).div_ceil(2);
            let mut buf = vec![0_u8; nbytes];
            rdr.read_exact(&mut buf)?;
            Ok(Value::Decimal(decode_packed_decimal(&buf, scale)?))
        }
        // Fixed-width, space-padded: the triplet's combined length is the
        // field width, decoded as UTF-8 unconditionally, never the
        // session's dialect encoding.
        CHAR | MIX => {
            let mut buf = vec![0_u8; desc.combined_len()];
            rdr.read_exact(&mut buf)?;
            Ok(Value::Varchar(decode_utf8(&buf, "CHAR/MIX")?.trim_end().to_string()))
        }
        // Variable-width: a fresh 2-byte length prefix precedes the payload
        // on the wire, always big-endian regardless of dialect
        // (`utils.py::read_field`), then UTF-8.
        VARCHAR | VARMIX | LONGMIX | LONG => {
            let len = read_u16_be(rdr)? as usize;
            let mut buf = vec![0_u8; len];
            rdr.read_exact(&mut buf)?;
            Ok(Value::Varchar(decode_utf8(&buf, "VARCHAR")?))
        }
        // GRAPHIC/VARGRAPHIC use the triplet's own combined length, not a
        // fresh inline length, despite VARGRAPH's "VAR" naming.
        GRAPHIC | VARGRAPH => {
            let mut buf = vec![0_u8; desc.combined_len()];
            rdr.read_exact(&mut buf)?;
            Ok(Value::Varchar(decode_utf8(&buf, "GRAPHIC")?))
        }
        BOOLEAN => {
            let len = desc.combined_len().max(1);
            let mut buf = vec![0_u8; len];
            rdr.read_exact(&mut buf)?;
            Ok(Value::Boolean(buf[0] != 0))
        }
        DATE => {
            let s = read_fixed_ascii(rdr, 10)?;
            Ok(Value::Date(parse_date(&s)?))
        }
        TIME => {
            let s = read_fixed_ascii(rdr, 8)?;
            Ok(Value::Time(parse_time(&s)?))
        }
        // 32 bytes: the real wire width is "%Y-%m-%d-%H.%M.%S.%f" (26 chars)
        // padded with 6 trailing spaces (`ddm.py::_fdodta`'s NTIMESTAMP
        // triplet declares length 0x20), not the naive 26.
        TIMESTAMP => {
            let s = read_fixed_ascii(rdr, 32)?;
            Ok(Value::Timestamp(parse_timestamp(&s)?))
        }
        FIXBYTE => {
            let mut buf = vec![0_u8; desc.combined_len()];
            rdr.read_exact(&mut buf)?;
            Ok(Value::Lob(buf))
        }
        VARBYTE | LONGVARBYTE => {
            let len = read_u16_be(rdr)? as usize;
            let mut buf = vec![0_u8; len];
            rdr.read_exact(&mut buf)?;
            Ok(Value::Lob(buf))
        }
        other => Err(DrdaError::protocol(format!(
            "unsupported FD:OCA lid type code {other:#04x}"
        ))),
    }
}

/// Builds one FDODSC triplet plus its FDODTA value for a bound parameter,
/// using the real `(sqltype, precision, scale)` the server reported for
/// that parameter position via SQLDARD instead of guessing from the
/// `Value` tag. String parameters are described with the `NVARGRAPH` lid
/// (not `NVARCHAR`'s own code) since the UTF-16BE payload is structurally
/// double-byte.
pub fn encode_bound_param(desc: &ColumnDescriptor, value: &Value) -> DrdaResult<BoundParameter> {
    let family = desc.drda_type & !1;
    let (lid_type, p1, p2) = fdodsc_triplet(family, desc)?;
    let bytes = if value.is_null() {
        vec![0xFF]
    } else {
        fdodta_bytes(family, desc, value)?
    };
    Ok(BoundParameter { lid_type, p1, p2, bytes })
}

fn fdodsc_triplet(family: u16, desc: &ColumnDescriptor) -> DrdaResult<(u8, u8, u8)> {
    Ok(match family {
        sqltype::VCSBCS | sqltype::VCMIXED | sqltype::LONGVARCHAR | sqltype::CSBCS | sqltype::MIXED => {
            (lid::NVARGRAPH, 0x3F, 0xFF)
        }
        sqltype::DECIMAL => (lid::NDECIMAL, desc.p1 as u8, desc.p2 as u8),
        sqltype::SMALLINT => (lid::NSMALL, 0x00, 0x02),
        sqltype::INTEGER => (lid::NINTEGER, 0x00, 0x04),
        sqltype::BIGINT => (lid::NINTEGER8, 0x00, 0x08),
        sqltype::FLOAT if desc.p1 == 4 => (lid::NFLOAT4, 0x00, 0x04),
        sqltype::FLOAT => (lid::NFLOAT8, 0x00, 0x08),
        sqltype::DATE => (lid::NDATE, 0x00, 0x0A),
        sqltype::TIME => (lid::NTIME, 0x00, 0x08),
        sqltype::TIMESTAMP => (lid::NTIMESTAMP, 0x00, 0x20),
        sqltype::BLOB | sqltype::CLOB => (lid::NLONGVARBYTE, 0x00, 0x00),
        sqltype::BOOLEAN => (lid::NBOOLEAN, 0x00, 0x01),
        other => {
            return Err(DrdaError::protocol(format!(
                "unsupported DRDA parameter type code {other:#06x}"
            )))
        }
    })
}

fn fdodta_bytes(family: u16, desc: &ColumnDescriptor, value: &Value) -> DrdaResult<Vec<u8>> {
    let mut out = vec![0x00_u8];
    match family {
        sqltype::VCSBCS | sqltype::VCMIXED | sqltype::LONGVARCHAR | sqltype::CSBCS | sqltype::MIXED => {
            let s = expect_str(value)?;
            write_u16_be(&mut out, s.chars().count() as u16);
            out.extend(utf16_be(s));
        }
        sqltype::DECIMAL => {
            let d = match value {
                Value::Decimal(d) => d.clone(),
                other => return Err(type_mismatch("Decimal", other)),
            };
            out.extend(encode_packed_decimal(&d, desc.p1, desc.p2)?);
        }
        sqltype::SMALLINT => write_i16_le(&mut out, expect_i16(value)?),
        sqltype::INTEGER => write_i32_le(&mut out, expect_i32(value)?),
        sqltype::BIGINT => write_i64_le(&mut out, expect_i64(value)?),
        sqltype::FLOAT if desc.p1 == 4 => write_f32_le(&mut out, expect_f32(value)?),
        sqltype::FLOAT => write_f64_le(&mut out, expect_f64(value)?),
        sqltype::DATE => {
            let d = match value {
                Value::Date(d) => *d,
                other => return Err(type_mismatch("Date", other)),
            };
            out.extend(format!("{:04}-{:02}-{:02}", d.year(), u8::from(d.month()), d.day()).into_bytes());
        }
        sqltype::TIME => {
            let t = match value {
                Value::Time(t) => *t,
                other => return Err(type_mismatch("Time", other)),
            };
            out.extend(format!("{:02}:{:02}:{:02}", t.hour(), t.minute(), t.second()).into_bytes());
        }
        sqltype::TIMESTAMP => {
            let ts = match value {
                Value::Timestamp(ts) => *ts,
                other => return Err(type_mismatch("Timestamp", other)),
            };
            let mut s = format!(
                "{:04}-{:02}-{:02}-{:02}.{:02}.{:02}.{:06}",
                ts.year(),
                u8::from(ts.month()),
                ts.day(),
                ts.hour(),
                ts.minute(),
                ts.second(),
                ts.microsecond()
            );
            s.push_str("      "); // pad the 26-char literal to the declared 32-byte width
            out.extend(s.into_bytes());
        }
        sqltype::BLOB | sqltype::CLOB => {
            let bytes = match value {
                Value::Lob(b) => b.clone(),
                other => return Err(type_mismatch("Lob", other)),
            };
            write_u16_be(&mut out, bytes.len() as u16);
            out.extend(bytes);
        }
        sqltype::BOOLEAN => {
            let b = match value {
                Value::Boolean(b) => *b,
                other => return Err(type_mismatch("Boolean", other)),
            };
            out.push(u8::from(b));
        }
        other => {
            return Err(DrdaError::protocol(format!(
                "unsupported DRDA parameter type code {other:#06x}"
            )))
        }
    }
    Ok(out)
}

fn type_mismatch(expected: &str, value: &Value) -> DrdaError {
    DrdaError::protocol(format!("expected a {expected} value, got {value:?}"))
}

fn expect_i16(v: &Value) -> DrdaResult<i16> {
    match v {
        Value::SmallInt(n) => Ok(*n),
        other => Err(type_mismatch("SmallInt", other)),
    }
}
fn expect_i32(v: &Value) -> DrdaResult<i32> {
    match v {
        Value::Integer(n) => Ok(*n),
        other => Err(type_mismatch("Integer", other)),
    }
}
fn expect_i64(v: &Value) -> DrdaResult<i64> {
    match v {
        Value::BigInt(n) => Ok(*n),
        other => Err(type_mismatch("BigInt", other)),
    }
}
fn expect_f32(v: &Value) -> DrdaResult<f32> {
    match v {
        Value::Real(n) => Ok(*n),
        other => Err(type_mismatch("Real", other)),
    }
}
fn expect_f64(v: &Value) -> DrdaResult<f64> {
    match v {
        Value::Double(n) => Ok(*n),
        other => Err(type_mismatch("Double", other)),
    }
}
fn expect_str(v: &Value) -> DrdaResult<&str> {
    match v {
        Value::Varchar(s) => Ok(s.as_str()),
        other => Err(type_mismatch("Varchar", other)),
    }
}

/// UTF-16BE code units, as `ddm.py::_fdodta`'s `v.encode('utf_16_be')` for
/// `DB2_SQLTYPE_NVARCHAR` parameters.
fn utf16_be(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len() * 2);
    for unit in s.encode_utf16() {
        out.extend_from_slice(&unit.to_be_bytes());
    }
    out
}

fn write_u16_be(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_be_bytes());
}
fn write_i16_le(out: &mut Vec<u8>, v: i16) {
    out.extend_from_slice(&v.to_le_bytes());
}
fn write_i32_le(out: &mut Vec<u8>, v: i32) {
    out.extend_from_slice(&v.to_le_bytes());
}
fn write_i64_le(out: &mut Vec<u8>, v: i64) {
    out.extend_from_slice(&v.to_le_bytes());
}
fn write_f32_le(out: &mut Vec<u8>, v: f32) {
    out.extend_from_slice(&v.to_le_bytes());
}
fn write_f64_le(out: &mut Vec<u8>, v: f64) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn read_i16(rdr: &mut dyn Read, endian: Endianness) -> DrdaResult<i16> {
    let mut buf = [0_u8; 2];
    rdr.read_exact(&mut buf)?;
    Ok(match endian {
        Endianness::Big => BigEndian::read_i16(&buf),
        Endianness::Little => LittleEndian::read_i16(&buf),
    })
}
fn read_u16_be(rdr: &mut dyn Read) -> DrdaResult<u16> {
    let mut buf = [0_u8; 2];
    rdr.read_exact(&mut buf)?;
    Ok(BigEndian::read_u16(&buf))
}
fn read_i32(rdr: &mut dyn Read, endian: Endianness) -> DrdaResult<i32> {
    let mut buf = [0_u8; 4];
    rdr.read_exact(&mut buf)?;
    Ok(match endian {
        Endianness::Big => BigEndian::read_i32(&buf),
        Endianness::Little => LittleEndian::read_i32(&buf),
    })
}
fn read_i64(rdr: &mut dyn Read, endian: Endianness) -> DrdaResult<i64> {
    let mut buf = [0_u8; 8];
    rdr.read_exact(&mut buf)?;
    Ok(match endian {
        Endianness::Big => BigEndian::read_i64(&buf),
        Endianness::Little => LittleEndian::read_i64(&buf),
    })
}
fn read_f32(rdr: &mut dyn Read, endian: Endianness) -> DrdaResult<f32> {
    let mut buf = [0_u8; 4];
    rdr.read_exact(&mut buf)?;
    Ok(match endian {
        Endianness::Big => BigEndian::read_f32(&buf),
        Endianness::Little => LittleEndian::read_f32(&buf),
    })
}
fn read_f64(rdr: &mut dyn Read, endian: Endianness) -> DrdaResult<f64> {
    let mut buf = [0_u8; 8];
    rdr.read_exact(&mut buf)?;
    Ok(match endian {
        Endianness::Big => BigEndian::read_f64(&buf),
        Endianness::Little => LittleEndian::read_f64(&buf),
    })
}

fn read_fixed_ascii(rdr: &mut dyn Read, len: usize) -> DrdaResult<String> {
    let mut buf = vec![0_u8; len];
    rdr.read_exact(&mut buf)?;
    String::from_utf8(buf)
        .map_err(|e| DrdaError::protocol(format!("non-ASCII temporal field: {e}")))
}

fn decode_utf8(buf: &[u8], context: &str) -> DrdaResult<String> {
    String::from_utf8(buf.to_vec())
        .map_err(|e| DrdaError::protocol(format!("invalid UTF-8 in {context} field: {e}")))
}

fn parse_date(s: &str) -> DrdaResult<Date> {
    let parts: Vec<&str> = s.trim().splitn(3, '-').collect();
    if parts.len() != 3 {
        return Err(DrdaError::protocol(format!("malformed DATE literal {s:?}")));
    }
    let year: i32 = parts[0]
        .parse()
        .map_err(|_| DrdaError::protocol("malformed DATE year"))?;
    let month: u8 = parts[1]
        .parse()
        .map_err(|_| DrdaError::protocol("malformed DATE month"))?;
    let day: u8 = parts[2]
        .parse()
        .map_err(|_| DrdaError::protocol("malformed DATE day"))?;
    let month = Month::try_from(month).map_err(|_| DrdaError::protocol("DATE month out of range"))?;
    Date::from_calendar_date(year, month, day)
        .map_err(|e| DrdaError::protocol(format!("invalid DATE: {e}")))
}

/// TIME accepts both `"HH:MM:SS"` and `"HH.MM.SS"`.
fn parse_time(s: &str) -> DrdaResult<Time> {
    let normalized = s.trim().replace('.', ":");
    let parts: Vec<&str> = normalized.splitn(3, ':').collect();
    if parts.len() != 3 {
        return Err(DrdaError::protocol(format!("malformed TIME literal {s:?}")));
    }
    let hour: u8 = parts[0]
        .parse()
        .map_err(|_| DrdaError::protocol("malformed TIME hour"))?;
    let minute: u8 = parts[1]
        .parse()
        .map_err(|_| DrdaError::protocol("malformed TIME minute"))?;
    let second: u8 = parts[2]
        .parse()
        .map_err(|_| DrdaError::protocol("malformed TIME second"))?;
    Time::from_hms(hour, minute, second).map_err(|e| DrdaError::protocol(format!("invalid TIME: {e}")))
}

fn parse_timestamp(s: &str) -> DrdaResult<PrimitiveDateTime> {
    let trimmed = s.trim();
    if trimmed.len() < 10 {
        return Err(DrdaError::protocol(format!(
            "malformed TIMESTAMP literal {trimmed:?}"
        )));
    }
    let (date_part, time_part) = trimmed.split_at(10);
    let date = parse_date(date_part)?;
    let rest = time_part.trim_start_matches(['-', ' ']);
    // `rest` is "HH.MM.SS.ffffff" (or "HH:MM:SS.ffffff"): split off the
    // fractional part at the *last* separator, not the first, since the
    // hour/minute/second separators are themselves dots in the
    // "HH.MM.SS" spelling.
    let (hms, frac) = rest.rsplit_once('.').unwrap_or((rest, "0"));
    let time = parse_time(hms)?;
    let micros: u32 = format!("{frac:0<6}")[..6]
        .parse()
        .map_err(|_| DrdaError::protocol("malformed TIMESTAMP fraction"))?;
    let time = time
        .replace_microsecond(micros)
        .map_err(|e| DrdaError::protocol(format!("invalid TIMESTAMP fraction: {e}")))?;
    Ok(PrimitiveDateTime::new(date, time))
}

/// Decodes a packed-decimal (BCD) field: `ceil((precision+1)/2)` bytes, with
/// the sign nibble (`0xC` = positive, `0xD` = negative) in the low nibble of
/// the last byte.
pub fn decode_packed_decimal(buf: &[u8], scale: i64) -> DrdaResult<BigDecimal> {
    let sign_nibble = buf[buf.len() - 1] & 0x0F;
    let negative = match sign_nibble {
        0x0C | 0x0F => false,
        0x0D => true,
        other => {
            return Err(DrdaError::protocol(format!(
                "invalid packed-decimal sign nibble {other:#x}"
            )))
        }
    };
    let mut digits = String::with_capacity(buf.len() * 2);
    for (i, byte) in buf.iter().enumerate() {
        let hi = byte >> 4;
        digits.push(char::from(b'0' + hi));
        if i + 1 < buf.len() {
            let lo = byte & 0x0F;
            digits.push(char::from(b'0' + lo));
        }
    }
    let digits = digits.trim_start_matches('0');
    let digits = if digits.is_empty() { "0" } else { digits };
    let magnitude = BigInt::parse_bytes(digits.as_bytes(), 10)
        .ok_or_else(|| DrdaError::protocol("malformed packed-decimal digits"))?;
    let magnitude = if negative {
        magnitude * BigInt::from(-1)
    } else {
        magnitude
    };
    Ok(BigDecimal::new(magnitude, scale))
}

/// Encodes a `BigDecimal` as packed decimal at the given `(precision,
/// scale)`, for FDODTA parameter marshalling.
pub fn encode_packed_decimal(value: &BigDecimal, precision: u16, scale: u16) -> DrdaResult<Vec<u8>> {
    let scaled = value.with_scale(scale as i64);
    let (mantissa, _) = scaled.as_bigint_and_exponent();
    let sign = mantissa.sign();
    let digits = mantissa.magnitude().to_string();
    let nbytes = (precision as usize + 1).div_ceil(2);
    let ndigits = nbytes * 2 - 1;
    if digits.len() > ndigits {
        return Err(DrdaError::protocol(format!(
            "decimal value has {} digits, exceeds precision {precision}",
            digits.len()
        )));
    }
    let padded = format!("{digits:0>ndigits$}");
    let mut all_digits: Vec<u8> = padded.bytes().map(|b| b - b'0').collect();
    all_digits.push(if sign == Sign::Minus { 0x0D } else { 0x0C });
    let mut out = vec![0_u8; nbytes];
    for (i, chunk) in all_digits.chunks(2).enumerate() {
        let hi = chunk[0];
        let lo = if chunk.len() == 2 { chunk[1] } else { 0 };
        out[i] = (hi << 4) | lo;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn packed_decimal_round_trips() {
        for (s, precision, scale) in [
            ("1.1", 2u16, 1u16),
            ("123456789.12", 11u16, 2u16),
            ("-42.00", 4u16, 2u16),
            ("0", 1u16, 0u16),
        ] {
            let d = BigDecimal::from_str(s).unwrap();
            let encoded = encode_packed_decimal(&d, precision, scale).unwrap();
            let decoded = decode_packed_decimal(&encoded, scale as i64).unwrap();
            assert_eq!(decoded, d, "round trip failed for {s}");
        }
    }

    #[test]
    fn time_accepts_colon_and_dot_separators() {
        assert_eq!(parse_time("12:34:56").unwrap(), parse_time("12.34.56").unwrap());
    }

    fn round_trip(bound: &BoundParameter, dialect: Dialect) -> Value {
        let desc = FieldDescriptor::new(bound.lid_type, u16::from(bound.p1), u16::from(bound.p2));
        let mut rdr = &bound.bytes[..];
        decode_field(&mut rdr, desc, dialect).unwrap()
    }

    #[test]
    fn timestamp_with_microseconds_round_trips() {
        use time::{Date, Month, PrimitiveDateTime, Time};
        let expected = PrimitiveDateTime::new(
            Date::from_calendar_date(2019, Month::April, 30).unwrap(),
            Time::from_hms_micro(12, 34, 56, 123_456).unwrap(),
        );
        let value = Value::Timestamp(expected);
        let desc = ColumnDescriptor::new("ts", sqltype::TIMESTAMPN, 0, 0);
        let bound = encode_bound_param(&desc, &value).unwrap();
        assert_eq!(round_trip(&bound, Dialect::Db2), value);
    }

    #[test]
    fn date_and_time_round_trip() {
        use time::{Date, Month, Time};
        let date = Value::Date(Date::from_calendar_date(2019, Month::April, 30).unwrap());
        let date_desc = ColumnDescriptor::new("d", sqltype::DATEN, 0, 0);
        let bound = encode_bound_param(&date_desc, &date).unwrap();
        assert_eq!(round_trip(&bound, Dialect::Db2), date);

        let time = Value::Time(Time::from_hms(12, 34, 56).unwrap());
        let time_desc = ColumnDescriptor::new("t", sqltype::TIMEN, 0, 0);
        let bound = encode_bound_param(&time_desc, &time).unwrap();
        assert_eq!(round_trip(&bound, Dialect::Db2), time);
    }

    #[test]
    fn null_marker_consumes_one_byte() {
        let desc = FieldDescriptor::new(lid::NINTEGER, 0, 4);
        let bytes = [0xFF_u8];
        let mut rdr = &bytes[..];
        let v = decode_field(&mut rdr, desc, Dialect::Derby).unwrap();
        assert!(matches!(v, Value::Null));
        assert_eq!(rdr.len(), 0);
    }

    #[test]
    fn present_marker_then_value() {
        let desc = FieldDescriptor::new(lid::NINTEGER, 0, 4);
        let mut bytes = vec![0x00_u8];
        bytes.extend_from_slice(&42_i32.to_be_bytes());
        let mut rdr = &bytes[..];
        let v = decode_field(&mut rdr, desc, Dialect::Derby).unwrap();
        assert!(matches!(v, Value::Integer(42)));
    }

    #[test]
    fn encode_then_decode_integer_round_trips() {
        let value = Value::Integer(-17);
        let desc = ColumnDescriptor::new("n", sqltype::INTEGERN, 0, 0);
        let bound = encode_bound_param(&desc, &value).unwrap();
        assert_eq!(round_trip(&bound, Dialect::Db2), value);
    }

    #[test]
    fn encode_null_emits_only_marker() {
        let desc = ColumnDescriptor::new("n", sqltype::INTEGERN, 0, 0);
        let bound = encode_bound_param(&desc, &Value::Null).unwrap();
        assert_eq!(bound.bytes, vec![0xFF]);
        // The FDODSC triplet still describes the parameter's real type even
        // when the value is null; only FDODTA collapses to the marker.
        assert_eq!(bound.lid_type, lid::NINTEGER);
    }

    #[test]
    fn encode_varchar_uses_utf16be_with_big_endian_length() {
        let desc = ColumnDescriptor::new("s", sqltype::VCSBCSN, 0, 0);
        let value = Value::Varchar("hi".to_string());
        let bound = encode_bound_param(&desc, &value).unwrap();
        assert_eq!(bound.lid_type, lid::NVARGRAPH);
        assert_eq!((bound.p1, bound.p2), (0x3F, 0xFF));
        assert_eq!(bound.bytes[0], 0x00);
        assert_eq!(u16::from_be_bytes([bound.bytes[1], bound.bytes[2]]), 2);
        assert_eq!(&bound.bytes[3..], [0x00, b'h', 0x00, b'i']);
    }

    #[test]
    fn encode_decimal_uses_server_reported_precision_and_scale() {
        let desc = ColumnDescriptor::new("d", sqltype::DECIMALN, 11, 2);
        let value = Value::Decimal(BigDecimal::from_str("123.45").unwrap());
        let bound = encode_bound_param(&desc, &value).unwrap();
        assert_eq!(bound.lid_type, lid::NDECIMAL);
        assert_eq!((bound.p1, bound.p2), (11, 2));
        assert_eq!(round_trip(&bound, Dialect::Db2), value);
    }
}
