//! Core data structures for QVD format components.
//!
//! This module defines the fundamental types used throughout the library:
//! - Table and field metadata parsed from the XML header
//! - Symbols decoded from the per-field symbol tables
//! - Resolved cell values handed to callers

use std::borrow::Cow;
use std::fmt;

use super::error::{QvdError, Result};

/// Display hints attached to a field in the QVD header.
///
/// These never influence decoding; they are carried so callers can format
/// numbers the way the producing application did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberFormat {
    /// `UNKNOWN`, `DATE`, `TIME`, `TIMESTAMP`, `INTERVAL`, `MONEY`, `FIX`, `REAL`, `INTEGER` or `ASCII`.
    pub format_type: String,
    pub decimals: u32,
    pub use_thousands: bool,
    pub format: String,
    pub decimal_separator: String,
    pub thousands_separator: String,
}

/// Metadata for one column, taken from a `<QvdFieldHeader>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    /// Offset of this field's bits inside each row record.
    pub bit_offset: usize,
    /// Number of bits per row (0..=64).
    pub bit_width: u32,
    /// Added to the raw bit value to obtain the symbol index.
    pub bias: i64,
    pub symbol_count: usize,
    /// Start of the symbol table, relative to the binary section.
    pub offset: usize,
    /// Byte length of the symbol table.
    pub length: usize,
    pub number_format: NumberFormat,
    pub tags: Vec<String>,
    pub comment: Option<String>,
}

/// Parsed `<QvdTableHeader>`.
#[derive(Debug, Clone, PartialEq)]
pub struct QvdHeader {
    pub table_name: String,
    pub build_no: Option<String>,
    pub creator_doc: Option<String>,
    pub create_utc_time: Option<String>,
    pub source_file_utc_time: Option<String>,
    pub comment: Option<String>,
    pub tags: Vec<String>,
    pub fields: Vec<FieldDescriptor>,
    /// Width of one row record in bytes.
    pub record_byte_size: usize,
    pub no_of_records: usize,
    /// Start of the row section, relative to the binary section.
    pub offset: usize,
    /// Declared byte length of the row section.
    pub length: usize,
    /// Absolute file offset of the first byte after the header terminator.
    pub binary_start: usize,
}

impl QvdHeader {
    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Total number of row-section bytes implied by the geometry.
    pub fn row_section_len(&self) -> Result<usize> {
        self.no_of_records
            .checked_mul(self.record_byte_size)
            .ok_or_else(|| {
                QvdError::UnsupportedGeometry(format!(
                    "{} records of {} bytes overflow the address space",
                    self.no_of_records, self.record_byte_size
                ))
            })
    }
}

/// Type tags used in symbol tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolType {
    Integer = 0x01,
    Real = 0x02,
    Text = 0x04,
    DualInteger = 0x05,
    DualReal = 0x06,
}

impl TryFrom<u8> for SymbolType {
    type Error = u8;
    fn try_from(value: u8) -> std::result::Result<Self, u8> {
        match value {
            0x01 => Ok(Self::Integer),
            0x02 => Ok(Self::Real),
            0x04 => Ok(Self::Text),
            0x05 => Ok(Self::DualInteger),
            0x06 => Ok(Self::DualReal),
            other => Err(other),
        }
    }
}

/// One entry of a field's symbol table.
///
/// Dual symbols carry a number and its display text; both halves are kept.
/// Reals compare by bit pattern, so a NaN symbol equals itself.
#[derive(Debug, Clone)]
pub enum Symbol {
    Integer(i32),
    Real(f64),
    Text(String),
    DualInteger(i32, String),
    DualReal(f64, String),
}

impl Symbol {
    /// The textual representation used for matching and for text rendering.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Symbol::Integer(n) => Cow::Owned(n.to_string()),
            Symbol::Real(x) => Cow::Owned(x.to_string()),
            Symbol::Text(s) | Symbol::DualInteger(_, s) | Symbol::DualReal(_, s) => {
                Cow::Borrowed(s.as_str())
            }
        }
    }

    /// The numeric half, if the symbol has one.
    pub fn number(&self) -> Option<f64> {
        match self {
            Symbol::Integer(n) | Symbol::DualInteger(n, _) => Some(f64::from(*n)),
            Symbol::Real(x) | Symbol::DualReal(x, _) => Some(*x),
            Symbol::Text(_) => None,
        }
    }

    pub fn is_dual(&self) -> bool {
        matches!(self, Symbol::DualInteger(..) | Symbol::DualReal(..))
    }

    /// Renders the symbol as a cell value.
    pub fn to_value(&self, preference: DualPreference) -> Value {
        match (self, preference) {
            (Symbol::Integer(n), _) => Value::Integer(*n),
            (Symbol::Real(x), _) => Value::Real(*x),
            (Symbol::Text(s), _) => Value::Text(s.clone()),
            (Symbol::DualInteger(_, s) | Symbol::DualReal(_, s), DualPreference::Text) => {
                Value::Text(s.clone())
            }
            (Symbol::DualInteger(n, _), DualPreference::Number) => Value::Integer(*n),
            (Symbol::DualReal(x, _), DualPreference::Number) => Value::Real(*x),
            (Symbol::DualInteger(n, s), DualPreference::Both) => Value::DualInteger(*n, s.clone()),
            (Symbol::DualReal(x, s), DualPreference::Both) => Value::DualReal(*x, s.clone()),
        }
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Symbol::Integer(a), Symbol::Integer(b)) => a == b,
            (Symbol::Real(a), Symbol::Real(b)) => same_bits(*a, *b),
            (Symbol::Text(a), Symbol::Text(b)) => a == b,
            (Symbol::DualInteger(a, s), Symbol::DualInteger(b, t)) => a == b && s == t,
            (Symbol::DualReal(a, s), Symbol::DualReal(b, t)) => same_bits(*a, *b) && s == t,
            _ => false,
        }
    }
}

impl Eq for Symbol {}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Ordered dictionary of one field. Row data references entries by position.
pub type SymbolTable = Vec<Symbol>;

/// How dual symbols are rendered into table cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DualPreference {
    /// Use the display text.
    #[default]
    Text,
    /// Use the numeric half.
    Number,
    /// Keep both halves as [`Value::DualInteger`] / [`Value::DualReal`].
    Both,
}

/// A resolved table cell.
///
/// Like [`Symbol`], reals compare by bit pattern.
#[derive(Debug, Clone)]
pub enum Value {
    /// The row has no value for this field.
    Null,
    Integer(i32),
    Real(f64),
    Text(String),
    DualInteger(i32, String),
    DualReal(f64, String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::DualInteger(_, s) | Value::DualReal(_, s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) | Value::DualInteger(n, _) => Some(f64::from(*n)),
            Value::Real(x) | Value::DualReal(x, _) => Some(*x),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Real(a), Value::Real(b)) => same_bits(*a, *b),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::DualInteger(a, s), Value::DualInteger(b, t)) => a == b && s == t,
            (Value::DualReal(a, s), Value::DualReal(b, t)) => same_bits(*a, *b) && s == t,
            _ => false,
        }
    }
}

impl Eq for Value {}

fn same_bits(a: f64, b: f64) -> bool {
    a.to_bits() == b.to_bits()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Real(x) => write!(f, "{}", x),
            Value::Text(s) | Value::DualInteger(_, s) | Value::DualReal(_, s) => f.write_str(s),
        }
    }
}
