//! The Derby/Db2 dialect split, modeled as a tagged variant carrying a small
//! capability set. Every codec call that needs dialect-specific behavior
//! takes a `Dialect` value once, rather than branching deep inside the
//! codec.

use crate::protocol::encoding::{Encoding, Endianness};

/// Which server family a session is talking to. Selected at connect time and
/// frozen thereafter.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Dialect {
    Derby,
    Db2,
}

/// The default security mechanism a dialect proposes in ACCSEC.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SecMec {
    /// User id only, no password.
    UsridOnl = 4,
    /// User id + clear-text password.
    UsridPwd = 3,
    /// Ephemeral user/password encryption via Diffie-Hellman + DES.
    EUsridPwd = 9,
}

impl SecMec {
    #[must_use]
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            4 => Some(Self::UsridOnl),
            3 => Some(Self::UsridPwd),
            9 => Some(Self::EUsridPwd),
            _ => None,
        }
    }

    #[must_use]
    pub fn code(self) -> u16 {
        self as u16
    }
}

impl Dialect {
    /// Selected implicitly when the caller passes no dialect: the absence of
    /// a user name is the only signal available, so `user is None` picks
    /// Derby (whose default credentials need no user) and anything else
    /// picks Db2.
    #[must_use]
    pub fn infer(user: Option<&str>) -> Self {
        if user.is_none() {
            Self::Derby
        } else {
            Self::Db2
        }
    }

    #[must_use]
    pub fn encoding(self) -> Encoding {
        match self {
            Self::Derby => Encoding::Utf8,
            Self::Db2 => Encoding::Cp500,
        }
    }

    #[must_use]
    pub fn endianness(self) -> Endianness {
        match self {
            Self::Derby => Endianness::Big,
            Self::Db2 => Endianness::Little,
        }
    }

    #[must_use]
    pub fn product_id(self) -> &'static str {
        match self {
            Self::Derby => "DNC10130",
            Self::Db2 => "SQL11014",
        }
    }

    #[must_use]
    pub fn package_id(self) -> &'static str {
        match self {
            Self::Derby => "SQLC2026",
            Self::Db2 => "SYSSH200",
        }
    }

    #[must_use]
    pub fn package_consistency_token(self) -> &'static [u8; 8] {
        match self {
            Self::Derby => b"AAAAAfAd",
            Self::Db2 => b"SYSLVL01",
        }
    }

    #[must_use]
    pub fn package_sequence_number(self) -> u16 {
        match self {
            Self::Derby => 201,
            Self::Db2 => 65,
        }
    }

    #[must_use]
    pub fn default_secmec(self) -> SecMec {
        match self {
            Self::Derby => SecMec::UsridOnl,
            Self::Db2 => SecMec::EUsridPwd,
        }
    }

    #[must_use]
    pub fn default_port(self) -> u16 {
        match self {
            Self::Derby => 1527,
            Self::Db2 => 50000,
        }
    }

    #[must_use]
    pub fn default_user(self) -> &'static str {
        match self {
            Self::Derby => "APP",
            Self::Db2 => "",
        }
    }

    /// Whether the `SET CLIENT`/`SET CURRENT LOCALE` initialization step
    /// applies.
    #[must_use]
    pub fn needs_set_client_init(self) -> bool {
        matches!(self, Self::Db2)
    }
}
