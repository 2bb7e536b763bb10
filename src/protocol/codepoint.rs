//! Numeric constants for the DDM/DRDA code points and SQL type codes used by
//! the codec.
//!
//! Only the subset of the DRDA/DDM code-point space this client emits or
//! parses is listed; the full registry (as published by the DDM reference
//! manuals) is far larger and mostly irrelevant to a client driver.

#![allow(dead_code)]

/// A 16-bit DDM/DRDA code point.
pub type CodePoint = u16;

// Handshake / security
pub const EXCSAT: CodePoint = 0x1041;
pub const ACCSEC: CodePoint = 0x106D;
pub const SECCHK: CodePoint = 0x106E;
pub const ACCRDB: CodePoint = 0x2001;
pub const ACCSECRD: CodePoint = 0x14AC;
pub const SECCHKRM: CodePoint = 0x1219;
pub const ACCRDBRM: CodePoint = 0x2201;
pub const RDBNFNRM: CodePoint = 0x2211;
pub const EXCSATRD: CodePoint = 0x1443;
pub const MGRLVLLS: CodePoint = 0x1404;
pub const EXTNAM: CodePoint = 0x115E;
pub const SRVNAM: CodePoint = 0x116D;
pub const SRVRLSLV: CodePoint = 0x115A;
pub const SRVCLSNM: CodePoint = 0x1147;
pub const SECMEC: CodePoint = 0x11A2;
pub const SECTKN: CodePoint = 0x11DC;
pub const USRID: CodePoint = 0x11A0;
pub const PASSWORD: CodePoint = 0x11A1;
pub const RDBNAM: CodePoint = 0x2110;
pub const RDBACCCL: CodePoint = 0x210F;
pub const PRDID: CodePoint = 0x112E;
pub const TYPDEFNAM: CodePoint = 0x002F;
pub const TYPDEFOVR: CodePoint = 0x0035;
pub const CRRTKN: CodePoint = 0x2135;
pub const CCSIDMGR: CodePoint = 0x147C;

// Manager-class identifiers carried as entries inside a MGRLVLLS list
// (distinct from the command/reply code points above).
pub const MGR_AGENT: CodePoint = 0x1403;
pub const MGR_SQLAM: CodePoint = 0x1405;
pub const MGR_CMNTCPIP: CodePoint = 0x1407;
pub const MGR_RDB: CodePoint = 0x1408;

// Statement execution
pub const PRPSQLSTT: CodePoint = 0x2007;
pub const DSCSQLSTT: CodePoint = 0x2008;
pub const EXCSQLIMM: CodePoint = 0x200A;
pub const EXCSQLSTT: CodePoint = 0x200B;
pub const EXCSQLSET: CodePoint = 0x2014;
pub const OPNQRY: CodePoint = 0x200C;
pub const CNTQRY: CodePoint = 0x200E;
pub const CLSQRY: CodePoint = 0x200F;
pub const RDBCMM: CodePoint = 0x200D;
pub const RDBRLLBCK: CodePoint = 0x2018;

pub const PKGNAMCSN: CodePoint = 0x2115;
pub const QRYBLKSZ: CodePoint = 0x2114;
pub const MAXBLKEXT: CodePoint = 0x2153;
pub const QRYCLSIMP: CodePoint = 0x215D;
pub const QRYINSID: CodePoint = 0x215B;
pub const RTNEXTDTA: CodePoint = 0x2152;
pub const FREPRVREF: CodePoint = 0x2153 + 1; // local convention: no formal DDM cp, reuses adjacent space
pub const DYNDTAFMT: CodePoint = 0x2149;

pub const SQLSTT: CodePoint = 0x2414;
pub const SQLATTR: CodePoint = 0x2450;
pub const SQLDTA: CodePoint = 0x2412;
pub const FDODSC: CodePoint = 0x2417;
pub const FDODTA: CodePoint = 0x2418;

// Replies / diagnostics
pub const SQLCARD: CodePoint = 0x2407;
pub const SQLDARD: CodePoint = 0x2411;
pub const SQLERRRM: CodePoint = 0x2213;
pub const OPNQRYRM: CodePoint = 0x2205;
pub const ENDQRYRM: CodePoint = 0x2208;
pub const QRYDSC: CodePoint = 0x241A;
pub const QRYDTA: CodePoint = 0x241B;
pub const QRYNOPRM: CodePoint = 0x2202;

pub const SQLCAGRP: CodePoint = 0x0016; // inner tag, appears only as leading byte 0x00 marker
pub const SQLCAXGRP: CodePoint = 0x0017;
pub const SQLDHGRP: CodePoint = 0x0022;
pub const SQLDIAGGRP: CodePoint = 0x0023;

/// DRDA SQL type codes used in SQLDARD column/parameter descriptors, as the
/// server actually reports them. Odd values are the nullable variant of the
/// preceding even value. Distinct from the [`lid`] registry used in
/// QRYDSC/FDODSC triplets.
pub mod sqltype {
    pub const DATE: u16 = 384;
    pub const DATEN: u16 = 385;
    pub const TIME: u16 = 388;
    pub const TIMEN: u16 = 389;
    pub const TIMESTAMP: u16 = 392;
    pub const TIMESTAMPN: u16 = 393;
    pub const DATALINK: u16 = 396;
    pub const DATALINKN: u16 = 397;
    pub const BLOB: u16 = 404;
    pub const BLOBN: u16 = 405;
    pub const CLOB: u16 = 408;
    pub const CLOBN: u16 = 409;
    pub const DBCLOB: u16 = 412;
    pub const DBCLOBN: u16 = 413;
    pub const VCSBCS: u16 = 448; // VARCHAR
    pub const VCSBCSN: u16 = 449;
    pub const CSBCS: u16 = 452; // fixed CHAR
    pub const CSBCSN: u16 = 453;
    pub const LONGVARCHAR: u16 = 456;
    pub const LONGVARCHARN: u16 = 457;
    pub const VCMIXED: u16 = 464; // VARGRAPHIC
    pub const VCMIXEDN: u16 = 465;
    pub const MIXED: u16 = 468; // GRAPHIC
    pub const MIXEDN: u16 = 469;
    pub const LONGRAPH: u16 = 472;
    pub const LONGRAPHN: u16 = 473;
    // The real registry has one `FLOAT` code for both REAL and DOUBLE; which
    // one a given column/parameter is comes from its declared length
    // (`sqllength`/`p1`: 4 or 8), not a second type code.
    pub const FLOAT: u16 = 480;
    pub const FLOATN: u16 = 481;
    pub const DECIMAL: u16 = 484;
    pub const DECIMALN: u16 = 485;
    pub const ZONED: u16 = 488;
    pub const ZONEDN: u16 = 489;
    pub const BIGINT: u16 = 492;
    pub const BIGINTN: u16 = 493;
    pub const INTEGER: u16 = 496;
    pub const INTEGERN: u16 = 497;
    pub const SMALLINT: u16 = 500;
    pub const SMALLINTN: u16 = 501;
    pub const NUMERIC: u16 = 504;
    pub const NUMERICN: u16 = 505;
    pub const ROWID: u16 = 904;
    pub const ROWIDN: u16 = 905;
    pub const BOOLEAN: u16 = 2436;
    pub const BOOLEANN: u16 = 2437;
    pub const GRAPHIC: u16 = 468;
    pub const GRAPHICN: u16 = 469;
    pub const VARGRAPHIC: u16 = 464;
    pub const VARGRAPHICN: u16 = 465;

    /// True for the odd "nullable" DRDA type codes.
    #[must_use]
    pub fn is_nullable(t: u16) -> bool {
        t % 2 == 1
    }
}

/// FD:OCA "LID" type codes used in the compact QRYDSC/QRYDTA/FDODSC/FDODTA
/// triplet streams — a distinct, one-byte registry from [`sqltype`]: a live
/// server describes result columns with [`sqltype`] codes in SQLDARD but
/// drives the row/parameter wire format with these codes in QRYDSC/FDODSC.
/// Odd values are the nullable variant.
pub mod lid {
    pub const INTEGER: u8 = 0x02;
    pub const NINTEGER: u8 = 0x03;
    pub const SMALL: u8 = 0x04;
    pub const NSMALL: u8 = 0x05;
    pub const FLOAT8: u8 = 0x0A;
    pub const NFLOAT8: u8 = 0x0B;
    pub const FLOAT4: u8 = 0x0C;
    pub const NFLOAT4: u8 = 0x0D;
    pub const DECIMAL: u8 = 0x0E;
    pub const NDECIMAL: u8 = 0x0F;
    pub const INTEGER8: u8 = 0x16;
    pub const NINTEGER8: u8 = 0x17;
    pub const DATE: u8 = 0x20;
    pub const NDATE: u8 = 0x21;
    pub const TIME: u8 = 0x22;
    pub const NTIME: u8 = 0x23;
    pub const TIMESTAMP: u8 = 0x24;
    pub const NTIMESTAMP: u8 = 0x25;
    pub const FIXBYTE: u8 = 0x26;
    pub const NFIXBYTE: u8 = 0x27;
    pub const VARBYTE: u8 = 0x28;
    pub const NVARBYTE: u8 = 0x29;
    pub const LONGVARBYTE: u8 = 0x2A;
    pub const NLONGVARBYTE: u8 = 0x2B;
    pub const CHAR: u8 = 0x30;
    pub const NCHAR: u8 = 0x31;
    pub const VARCHAR: u8 = 0x32;
    pub const NVARCHAR: u8 = 0x33;
    pub const LONG: u8 = 0x34;
    pub const NLONG: u8 = 0x35;
    pub const GRAPHIC: u8 = 0x36;
    pub const NGRAPHIC: u8 = 0x37;
    pub const VARGRAPH: u8 = 0x38;
    pub const NVARGRAPH: u8 = 0x39;
    pub const MIX: u8 = 0x3C;
    pub const NMIX: u8 = 0x3D;
    pub const VARMIX: u8 = 0x3E;
    pub const NVARMIX: u8 = 0x3F;
    pub const LONGMIX: u8 = 0x40;
    pub const NLONGMIX: u8 = 0x41;
    pub const BOOLEAN: u8 = 0xBE;
    pub const NBOOLEAN: u8 = 0xBF;

    /// True for the odd "nullable" LID codes (mirrors [`super::sqltype::is_nullable`]).
    #[must_use]
    pub fn is_nullable(t: u8) -> bool {
        t % 2 == 1
    }
}
