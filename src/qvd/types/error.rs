//! Custom error types for the qvd-reader crate.

use thiserror::Error;

/// The primary error type for all decode operations in this crate.
///
/// Every variant describes a file that cannot be read; none of them is
/// transient, so callers should not retry.
#[derive(Debug, Error)]
pub enum QvdError {
    /// The XML header is missing its terminator or is not well-formed.
    #[error("Invalid QVD header: {0}")]
    HeaderParse(String),

    /// Declared field bit ranges do not fit the declared record width.
    #[error("Unsupported record geometry: {0}")]
    UnsupportedGeometry(String),

    /// A symbol table contains a type tag this reader does not know.
    #[error("Unsupported symbol type {tag:#04x} in field '{field}' at byte {offset}")]
    UnsupportedSymbolType {
        field: String,
        tag: u8,
        offset: usize,
    },

    /// A symbol table ended before all declared symbols were decoded.
    #[error("Truncated symbol data in field '{field}': expected {expected} symbols, decoded {found}")]
    TruncatedSymbolData {
        field: String,
        expected: usize,
        found: usize,
    },

    /// The row section is shorter than `rows * record_byte_size`.
    #[error("Truncated row data: expected {expected} bytes, but found {found} bytes")]
    TruncatedRowData { expected: usize, found: usize },

    /// A row references a symbol beyond the end of its field's symbol table.
    #[error("Corrupt row data: row {row}, field '{field}' references symbol {index} of {symbol_count}")]
    CorruptRowData {
        row: usize,
        field: String,
        index: i64,
        symbol_count: usize,
    },
}

/// A convenience `Result` type alias using the crate's `QvdError` type.
pub type Result<T> = std::result::Result<T, QvdError>;
