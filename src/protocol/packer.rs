//! Builds nested DDM objects: `{length, code-point, body}` where the body is
//! a concatenation of further `{length, code-point, value}` items.
//!
//! A header-then-payload builder: each item writes its own `{len(2), cp(2),
//! body}` prefix, and objects nest by packing one builder's finished bytes
//! as a raw item inside another.

use crate::dialect::Dialect;
use crate::protocol::codepoint::*;
use byteorder::{BigEndian, WriteBytesExt};
use std::io::Write;

/// A builder for one DDM object (or nested item): writes `len(2) | cp(2) |
/// body` where `body` accumulates further packed items.
#[derive(Debug, Default)]
pub struct Packer {
    body: Vec<u8>,
}

impl Packer {
    #[must_use]
    pub fn new() -> Self {
        Self { body: Vec::new() }
    }

    /// Appends a generic inner item: `len(2) | cp(2) | bytes`.
    pub fn pack_item(&mut self, code_point: CodePoint, bytes: &[u8]) -> &mut Self {
        let len = bytes.len() as u16 + 4;
        self.body.write_u16::<BigEndian>(len).unwrap();
        self.body.write_u16::<BigEndian>(code_point).unwrap();
        self.body.extend_from_slice(bytes);
        self
    }

    /// Fixed-width big-endian unsigned integer inner item.
    pub fn pack_uint(&mut self, code_point: CodePoint, value: u32, width: usize) -> &mut Self {
        let mut buf = value.to_be_bytes().to_vec();
        buf.drain(0..4 - width);
        self.pack_item(code_point, &buf)
    }

    /// String inner item, encoded via the session's current encoding.
    pub fn pack_string(&mut self, code_point: CodePoint, s: &str, dialect: Dialect) -> &mut Self {
        let bytes = dialect.encoding().encode(s);
        self.pack_item(code_point, &bytes)
    }

    /// Null-string inner item: `0xFF` null sentinel, or `0x00 | len(4, BE) |
    /// bytes`.
    pub fn pack_null_string(
        &mut self,
        code_point: CodePoint,
        s: Option<&str>,
        dialect: Dialect,
    ) -> &mut Self {
        match s {
            None => self.pack_item(code_point, &[0xFF]),
            Some(s) => {
                let encoded = dialect.encoding().encode(s);
                let mut buf = Vec::with_capacity(5 + encoded.len());
                buf.push(0x00);
                buf.write_u32::<BigEndian>(encoded.len() as u32).unwrap();
                buf.extend_from_slice(&encoded);
                self.pack_item(code_point, &buf)
            }
        }
    }

    /// Appends raw bytes directly into the body (used for nested objects
    /// built by another `Packer`).
    pub fn pack_raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.body.extend_from_slice(bytes);
        self
    }

    /// Finishes this object: `len(2) | code_point(2) | body`.
    #[must_use]
    pub fn finish(self, code_point: CodePoint) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.body.len() + 4);
        out.write_u16::<BigEndian>(self.body.len() as u16 + 4).unwrap();
        out.write_u16::<BigEndian>(code_point).unwrap();
        out.extend_from_slice(&self.body);
        out
    }

    #[must_use]
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}

/// PKGNAMCSN layout: fixed 68 bytes.
pub fn pack_pkgnamcsn(
    database: &str,
    package_id: &str,
    consistency_token: &[u8; 8],
    sequence_number: u16,
    dialect: Dialect,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(68);
    out.extend_from_slice(&pad_or_truncate(database, 18, dialect));
    out.extend_from_slice(&pad_or_truncate("NULLID", 18, dialect));
    out.extend_from_slice(&pad_or_truncate(package_id, 18, dialect));
    out.extend_from_slice(consistency_token);
    out.write_u16::<BigEndian>(sequence_number).unwrap();
    debug_assert_eq!(out.len(), 68, "PKGNAMCSN must be exactly 68 bytes");
    out
}

fn pad_or_truncate(s: &str, width: usize, dialect: Dialect) -> Vec<u8> {
    let space = dialect.encoding().encode(" ")[0];
    let mut bytes = dialect.encoding().encode(s);
    bytes.truncate(width);
    bytes.resize(width, space);
    bytes
}

/// Pair `(manager code point, level)` for the EXCSAT manager-level list.
pub type ManagerLevel = (CodePoint, u16);

/// EXCSAT: exchange server attributes.
pub fn pack_excsat(host: &str, manager_levels: &[ManagerLevel], dialect: Dialect) -> Vec<u8> {
    let mut p = Packer::new();
    p.pack_string(EXTNAM, "pydrda", dialect);
    p.pack_string(SRVNAM, host, dialect);
    p.pack_string(SRVRLSLV, "0A00", dialect);
    p.pack_string(SRVCLSNM, "QDRDAAS", dialect);
    let mut mgr = Packer::new();
    for (cp, level) in manager_levels {
        mgr.pack_uint(*cp, u32::from(*level), 2);
    }
    p.pack_item(MGRLVLLS, &mgr.into_body());
    p.finish(EXCSAT)
}

/// ACCSEC: access security. `dh_public_key` is supplied only when SECMEC 9
/// is proposed.
pub fn pack_accsec(
    secmec: u16,
    rdbnam: &str,
    dh_public_key: Option<&[u8; 32]>,
    dialect: Dialect,
) -> Vec<u8> {
    let mut p = Packer::new();
    p.pack_uint(SECMEC, u32::from(secmec), 2);
    p.pack_string(RDBNAM, rdbnam, dialect);
    if let Some(key) = dh_public_key {
        p.pack_item(SECTKN, key);
    }
    p.finish(ACCSEC)
}

/// SECCHK: security check. For SECMEC 3/4, `user`/`password`
/// are sent in clear text; for SECMEC 9 the caller must pre-encrypt them and
/// pass the two SECTKN ciphertexts instead via [`pack_secchk_encrypted`].
pub fn pack_secchk_plain(secmec: u16, rdbnam: &str, user: &str, password: &str, dialect: Dialect) -> Vec<u8> {
    let mut p = Packer::new();
    p.pack_uint(SECMEC, u32::from(secmec), 2);
    p.pack_string(RDBNAM, rdbnam, dialect);
    p.pack_string(USRID, user, dialect);
    p.pack_string(PASSWORD, password, dialect);
    p.finish(SECCHK)
}

/// SECCHK variant for SECMEC 9: user and password are each DES-CBC
/// ciphertexts, sent as two `SECTKN` items.
pub fn pack_secchk_encrypted(
    secmec: u16,
    rdbnam: &str,
    encrypted_user: &[u8],
    encrypted_password: &[u8],
    dialect: Dialect,
) -> Vec<u8> {
    let mut p = Packer::new();
    p.pack_uint(SECMEC, u32::from(secmec), 2);
    p.pack_string(RDBNAM, rdbnam, dialect);
    p.pack_item(SECTKN, encrypted_user);
    p.pack_item(SECTKN, encrypted_password);
    p.finish(SECCHK)
}

/// ACCRDB: access RDB.
pub fn pack_accrdb(rdbnam: &str, dialect: Dialect, crrtkn: &[u8]) -> Vec<u8> {
    let mut p = Packer::new();
    p.pack_string(RDBNAM, rdbnam, dialect);
    p.pack_item(RDBACCCL, &2u16.to_be_bytes()); // SQLAM
    p.pack_string(PRDID, dialect.product_id(), dialect);
    // Always "QTDSQLX86" regardless of dialect; see DESIGN.md for why.
    p.pack_string(TYPDEFNAM, "QTDSQLX86", dialect);
    p.pack_item(CRRTKN, crrtkn);
    let mut ovr = Packer::new();
    ovr.pack_string(0x0006, "QTDSQLASC", dialect); // CCSID SBCS placeholder override tag
    p.pack_item(TYPDEFOVR, &ovr.into_body());
    p.finish(ACCRDB)
}

/// EXCSAT sent again with `CCSIDMGR` during Db2's `SET CLIENT` init step.
pub fn pack_excsat_ccsidmgr(ccsid: u16) -> Vec<u8> {
    let mut p = Packer::new();
    p.pack_uint(CCSIDMGR, u32::from(ccsid), 2);
    p.finish(EXCSAT)
}

/// PRPSQLSTT: prepare an SQL statement.
pub fn pack_prpsqlstt(pkgnamcsn: &[u8]) -> Vec<u8> {
    let mut p = Packer::new();
    p.pack_item(PKGNAMCSN, pkgnamcsn);
    p.finish(PRPSQLSTT)
}

/// DSCSQLSTT: describe a prepared SQL statement.
pub fn pack_dscsqlstt(pkgnamcsn: &[u8]) -> Vec<u8> {
    let mut p = Packer::new();
    p.pack_item(PKGNAMCSN, pkgnamcsn);
    p.finish(DSCSQLSTT)
}

/// EXCSQLIMM: execute immediate (no parameters, no cursor).
pub fn pack_excsqlimm(pkgnamcsn: &[u8]) -> Vec<u8> {
    let mut p = Packer::new();
    p.pack_item(PKGNAMCSN, pkgnamcsn);
    p.finish(EXCSQLIMM)
}

/// EXCSQLSTT: execute a previously prepared statement.
pub fn pack_excsqlstt(pkgnamcsn: &[u8]) -> Vec<u8> {
    let mut p = Packer::new();
    p.pack_item(PKGNAMCSN, pkgnamcsn);
    p.finish(EXCSQLSTT)
}

/// EXCSQLSET: execute a SET statement (session initialization).
pub fn pack_excsqlset(pkgnamcsn: &[u8]) -> Vec<u8> {
    let mut p = Packer::new();
    p.pack_item(PKGNAMCSN, pkgnamcsn);
    p.finish(EXCSQLSET)
}

const QRYBLKSZ_DEFAULT: u32 = 65535;
const MAXBLKEXT_DEFAULT: u32 = 65535;

/// OPNQRY: open a query cursor (no parameters).
pub fn pack_opnqry(pkgnamcsn: &[u8], with_params: bool) -> Vec<u8> {
    let mut p = Packer::new();
    p.pack_item(PKGNAMCSN, pkgnamcsn);
    p.pack_uint(QRYBLKSZ, QRYBLKSZ_DEFAULT, 4);
    p.pack_uint(MAXBLKEXT, MAXBLKEXT_DEFAULT, 4);
    p.pack_uint(QRYCLSIMP, 1, 1);
    if with_params {
        p.pack_uint(DYNDTAFMT, 0xF1, 1);
    }
    p.finish(OPNQRY)
}

/// CNTQRY: continue query (request next block).
pub fn pack_cntqry(pkgnamcsn: &[u8]) -> Vec<u8> {
    let mut p = Packer::new();
    p.pack_item(PKGNAMCSN, pkgnamcsn);
    p.pack_uint(QRYBLKSZ, QRYBLKSZ_DEFAULT, 4);
    p.pack_uint(QRYINSID, 0, 8);
    p.pack_uint(RTNEXTDTA, 1, 1);
    p.pack_uint(FREPRVREF, 1, 1);
    p.finish(CNTQRY)
}

/// RDBCMM: commit (also used to tear down a session before socket
/// shutdown).
pub fn pack_rdbcmm() -> Vec<u8> {
    let mut out = Vec::with_capacity(4);
    out.write_u16::<BigEndian>(4).unwrap();
    out.write_u16::<BigEndian>(RDBCMM).unwrap();
    out
}

/// RDBRLLBCK: rollback.
pub fn pack_rdbrllbck() -> Vec<u8> {
    let mut out = Vec::with_capacity(4);
    out.write_u16::<BigEndian>(4).unwrap();
    out.write_u16::<BigEndian>(RDBRLLBCK).unwrap();
    out
}

/// SQLSTT: the SQL text, as two null-strings (text + terminator marker).
pub fn pack_sqlstt(sql: &str, dialect: Dialect) -> Vec<u8> {
    let mut p = Packer::new();
    p.pack_null_string(0x0001, Some(sql), dialect);
    p.pack_null_string(0x0002, None, dialect);
    p.finish(SQLSTT)
}

/// One bound parameter's FDODSC triplet (a one-byte FD:OCA `lid` type plus
/// its two parameter bytes) and its already-encoded FDODTA value, including
/// that value's own leading null/present marker byte. Built by
/// [`crate::protocol::field_codec::encode_bound_param`].
pub struct BoundParameter {
    pub lid_type: u8,
    pub p1: u8,
    pub p2: u8,
    pub bytes: Vec<u8>,
}

/// SQLDTA: wraps FDODSC (triplet header + per-parameter triplets) and
/// FDODTA (concatenated values, each already carrying its own presence
/// marker byte) each as their own nested DDM object inside SQLDTA's body,
/// padded to an even total length before FDODSC's fixed trailer is
/// appended.
pub fn pack_sqldta(params: &[BoundParameter]) -> Vec<u8> {
    let n = params.len();
    let mut fdodsc = Vec::new();
    fdodsc.push(((1 + n) * 3) as u8);
    fdodsc.push(0x76);
    fdodsc.push(0xD0);
    for param in params {
        fdodsc.push(param.lid_type);
        fdodsc.push(param.p1);
        fdodsc.push(param.p2);
    }

    let mut fdodta = Vec::new();
    for param in params {
        fdodta.extend_from_slice(&param.bytes);
    }

    if (fdodsc.len() + fdodta.len()) % 2 != 0 {
        fdodta.insert(0, 0x00);
    }
    fdodsc.extend_from_slice(&[0x06, 0x71, 0xE4, 0xD0, 0x00, 0x01]);

    let mut p = Packer::new();
    p.pack_item(FDODSC, &fdodsc);
    p.pack_item(FDODTA, &fdodta);
    p.finish(SQLDTA)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pkgnamcsn_is_exactly_68_bytes() {
        for db in ["x", "a_very_long_database_name_indeed", ""] {
            let out = pack_pkgnamcsn(db, "SQLC2026", b"AAAAAfAd", 201, Dialect::Derby);
            assert_eq!(out.len(), 68);
        }
    }

    #[test]
    fn pack_item_round_trips_length() {
        let mut p = Packer::new();
        p.pack_item(0x1234, b"abc");
        let body = p.into_body();
        assert_eq!(&body[0..2], &7u16.to_be_bytes());
        assert_eq!(&body[2..4], &0x1234u16.to_be_bytes());
        assert_eq!(&body[4..], b"abc");
    }
}
