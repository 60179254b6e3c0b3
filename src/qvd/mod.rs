//! Core QVD reader module

pub mod codec;
pub mod filter;
pub mod format;
pub mod iter;
pub mod reader;
pub mod table;
pub mod types;
mod utils;

use filter::{FilterOptions, MatchMode};
use reader::{DecodeOptions, QvdReader};
use table::Table;
use types::error::Result;

/// Decodes a complete QVD file.
///
/// Text is preferred for dual symbols. Fails if any part of the file is
/// malformed; no partial table is returned.
pub fn decode(bytes: &[u8]) -> Result<Table> {
    decode_with(bytes, &DecodeOptions::default())
}

/// Decodes a QVD file, keeping only rows where some field matches `search`.
///
/// With `use_wildcard` the search is a whole-text pattern (`*` any run, `?`
/// one character); otherwise it is a substring. An empty search keeps every
/// row.
pub fn decode_filtered(bytes: &[u8], search: &str, use_wildcard: bool) -> Result<Table> {
    let mode = if use_wildcard { MatchMode::Wildcard } else { MatchMode::Contains };
    let options = DecodeOptions::default().with_filter(FilterOptions::new(search, mode));
    decode_with(bytes, &options)
}

/// Decodes a QVD file with explicit filter and rendering options.
pub fn decode_with(bytes: &[u8], options: &DecodeOptions) -> Result<Table> {
    QvdReader::new(bytes)?.decode(options)
}
