//! # Symbol Table Decoding
//!
//! Every field stores its distinct values once, in a symbol table located at
//! `binary_start + field.offset`. Each symbol is a one-byte type tag followed
//! by a tag-specific payload:
//!
//! ```text
//! 0x01  i32 (LE)
//! 0x02  f64 (LE)
//! 0x04  UTF-8 text, NUL-terminated
//! 0x05  i32 (LE) + text, NUL-terminated
//! 0x06  f64 (LE) + text, NUL-terminated
//! ```

use log::{debug, trace};

use crate::qvd::types::error::{QvdError, Result};
use crate::qvd::types::models::{FieldDescriptor, QvdHeader, Symbol, SymbolTable, SymbolType};
use crate::qvd::utils;

/// Decodes the symbol tables of every field, in header order.
pub fn decode_all(bytes: &[u8], header: &QvdHeader) -> Result<Vec<SymbolTable>> {
    header
        .fields
        .iter()
        .map(|field| {
            let range = symbol_range(bytes, header, field)?;
            decode(range, field)
        })
        .collect()
}

/// Returns the slice of `bytes` holding `field`'s symbol table.
///
/// The declared range may extend past the end of the file; only the
/// available bytes are returned and decoding reports truncation if the
/// declared symbols do not fit.
pub fn symbol_range<'a>(bytes: &'a [u8], header: &QvdHeader, field: &FieldDescriptor) -> Result<&'a [u8]> {
    let truncated = || QvdError::TruncatedSymbolData {
        field: field.name.clone(),
        expected: field.symbol_count,
        found: 0,
    };
    let start = header
        .binary_start
        .checked_add(field.offset)
        .filter(|&start| start <= bytes.len())
        .ok_or_else(truncated)?;
    let end = start.saturating_add(field.length).min(bytes.len());
    Ok(&bytes[start..end])
}

/// Decodes exactly `field.symbol_count` symbols from `data`.
///
/// Bytes after the last declared symbol are ignored.
pub fn decode(data: &[u8], field: &FieldDescriptor) -> Result<SymbolTable> {
    let expected = field.symbol_count;
    let mut symbols = Vec::with_capacity(expected.min(data.len()));
    let mut reader = data;

    while symbols.len() < expected {
        let offset = data.len() - reader.len();
        let truncated = |found: usize| QvdError::TruncatedSymbolData {
            field: field.name.clone(),
            expected,
            found,
        };

        let Some((&tag, rest)) = reader.split_first() else {
            return Err(truncated(symbols.len()));
        };
        reader = rest;

        let symbol_type = SymbolType::try_from(tag).map_err(|tag| QvdError::UnsupportedSymbolType {
            field: field.name.clone(),
            tag,
            offset,
        })?;

        let symbol = read_symbol(&mut reader, symbol_type).ok_or_else(|| truncated(symbols.len()))?;
        trace!("Field '{}' symbol {} at byte {}: {:?}", field.name, symbols.len(), offset, symbol);
        symbols.push(symbol);
    }

    if !reader.is_empty() {
        trace!("Field '{}': ignoring {} trailing symbol bytes", field.name, reader.len());
    }
    debug!("Decoded {} symbols for field '{}'", symbols.len(), field.name);
    Ok(symbols)
}

/// Reads one symbol payload; `None` if the slice ends first.
fn read_symbol(reader: &mut &[u8], symbol_type: SymbolType) -> Option<Symbol> {
    let symbol = match symbol_type {
        SymbolType::Integer => Symbol::Integer(utils::read_i32(reader)?),
        SymbolType::Real => Symbol::Real(utils::read_f64(reader)?),
        SymbolType::Text => Symbol::Text(read_text(reader)?),
        SymbolType::DualInteger => {
            let number = utils::read_i32(reader)?;
            Symbol::DualInteger(number, read_text(reader)?)
        }
        SymbolType::DualReal => {
            let number = utils::read_f64(reader)?;
            Symbol::DualReal(number, read_text(reader)?)
        }
    };
    Some(symbol)
}

fn read_text(reader: &mut &[u8]) -> Option<String> {
    utils::read_null_terminated(reader).map(|bytes| String::from_utf8_lossy(bytes).into_owned())
}
