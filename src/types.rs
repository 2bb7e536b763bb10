//! Row and value types exposed to callers.

use bigdecimal::BigDecimal;
use time::{Date, PrimitiveDateTime, Time};

/// One decoded column value. `Null` is a distinct variant rather than an
/// `Option` wrapper around the others, so a caller matches on one enum
/// instead of `Option<Enum>`.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    SmallInt(i16),
    Integer(i32),
    BigInt(i64),
    Real(f32),
    Double(f64),
    Decimal(BigDecimal),
    Varchar(String),
    Boolean(bool),
    Date(Date),
    Time(Time),
    Timestamp(PrimitiveDateTime),
    Lob(Vec<u8>),
}

impl Value {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrows the value as `&str` if it is a `Varchar`, `None` otherwise.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Varchar(s) => Some(s),
            _ => None,
        }
    }

    /// Widens any integral or floating variant to `f64`, for callers that
    /// don't care about the exact wire type.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::SmallInt(v) => Some(f64::from(*v)),
            Self::Integer(v) => Some(f64::from(*v)),
            Self::BigInt(v) => Some(*v as f64),
            Self::Real(v) => Some(f64::from(*v)),
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }
}

/// Describes one column of a result set, as reported by SQLDARD/QRYDSC.
#[derive(Clone, Debug)]
pub struct ColumnDescriptor {
    pub name: String,
    pub drda_type: u16,
    pub p1: u16,
    pub p2: u16,
    pub nullable: bool,
}

impl ColumnDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, drda_type: u16, p1: u16, p2: u16) -> Self {
        let nullable = crate::protocol::codepoint::sqltype::is_nullable(drda_type);
        Self {
            name: name.into(),
            drda_type,
            p1,
            p2,
            nullable,
        }
    }
}

/// One row of a result set: values in column order.
#[derive(Clone, Debug, Default)]
pub struct Row(pub Vec<Value>);

impl Row {
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for Row {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// A fully materialized result set: column descriptors plus all rows
/// retrieved so far.
#[derive(Clone, Debug, Default)]
pub struct ResultSet {
    pub columns: Vec<ColumnDescriptor>,
    pub rows: Vec<Row>,
}

impl ResultSet {
    #[must_use]
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// Outcome of an `EXCSQLIMM`/`EXCSQLSTT` that did not open a cursor.
#[derive(Clone, Debug, Default)]
pub struct ExecuteOutcome {
    pub row_count: Option<u64>,
    pub warnings: Vec<String>,
}

/// A seven-field column description, as returned by `query` alongside its
/// rows: name, sqltype, display size, internal size, precision, scale, and
/// null-ok. `null_ok` is always `None`: the wire protocol reports
/// nullability per-value via the odd/even type code, not as a fixed
/// per-column guarantee the driver can assert up front.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnDescription {
    pub name: String,
    pub sqltype: u16,
    pub display_size: u16,
    pub internal_size: u16,
    pub precision: u16,
    pub scale: u16,
    pub null_ok: Option<bool>,
}

impl From<&ColumnDescriptor> for ColumnDescription {
    fn from(c: &ColumnDescriptor) -> Self {
        let (precision, scale) = if c.drda_type & !1 == crate::protocol::codepoint::sqltype::DECIMAL {
            (c.p1, c.p2)
        } else {
            (0, 0)
        };
        Self {
            name: c.name.clone(),
            sqltype: c.drda_type,
            display_size: c.p1,
            internal_size: c.p1,
            precision,
            scale,
            null_ok: None,
        }
    }
}
