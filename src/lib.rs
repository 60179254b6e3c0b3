//! # qvd-reader
//!
//! A decoder for QVD files: an XML header, per-field symbol tables and
//! bit-packed row records, turned into a column-oriented [`Table`].
//!
//! ```no_run
//! let bytes = std::fs::read("orders.qvd").unwrap();
//! let table = qvd_reader::decode_filtered(&bytes, "Oslo", false).unwrap();
//! println!("{:?}", table.column_names());
//! ```
//!
//! Compressed files and writing QVD files are not supported.
pub mod qvd;

// Re-export the main types for convenience
pub use qvd::{
    decode,
    decode_filtered,
    decode_with,
    codec::bits::BitReader,
    filter::{FilterOptions, MatchMode, RowFilter},
    format::rows::{RowDecoder, RowIndices},
    iter::{TableRow, TableRows},
    reader::{DecodeOptions, QvdReader},
    table::{Column, Table},
    types::{
        error::{QvdError, Result},
        models::{
            DualPreference,
            FieldDescriptor,
            NumberFormat,
            QvdHeader,
            Symbol,
            SymbolTable,
            Value,
        },
    },
};
