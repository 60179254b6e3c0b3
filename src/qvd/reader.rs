use log::info;

use super::filter::{FilterOptions, RowFilter};
use super::format;
use super::format::rows::{RowDecoder, RowIndices};
use super::table::{self, Table};
use super::types::error::Result;
use super::types::models::*;

/// Options applied when turning a parsed file into a [`Table`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Keep only rows with a field matching this search. `None` keeps all rows.
    pub filter: Option<FilterOptions>,
    /// How dual symbols are rendered. Defaults to their text.
    pub dual_preference: DualPreference,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: FilterOptions) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_dual_preference(mut self, dual_preference: DualPreference) -> Self {
        self.dual_preference = dual_preference;
        self
    }
}

/// The main reader for QVD files.
///
/// Borrows the complete file contents (read into memory or memory-mapped by
/// the caller). Construction parses the header and every symbol table; rows
/// are decoded on demand.
#[derive(Debug, Clone)]
pub struct QvdReader<'a> {
    bytes: &'a [u8],
    header: QvdHeader,
    symbol_tables: Vec<SymbolTable>,
}

impl<'a> QvdReader<'a> {
    /// Parses the header and symbol tables of a QVD file.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The header is missing or malformed
    /// - A field's bit range does not fit the record width
    /// - A symbol table holds an unknown type tag or is truncated
    /// - The row section is shorter than the declared row count requires
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        info!("Opening QVD data: {} bytes", bytes.len());
        let header = format::header::parse(bytes)?;
        let symbol_tables = format::symbols::decode_all(bytes, &header)?;
        RowDecoder::new(bytes, &header)?;

        Ok(Self {
            bytes,
            header,
            symbol_tables,
        })
    }

    pub fn header(&self) -> &QvdHeader {
        &self.header
    }

    pub fn num_rows(&self) -> usize {
        self.header.no_of_records
    }

    /// Symbol tables of all fields, in header order.
    pub fn symbol_tables(&self) -> &[SymbolTable] {
        &self.symbol_tables
    }

    /// The symbol table of field `name`.
    pub fn symbol_table(&self, name: &str) -> Option<&SymbolTable> {
        let index = self.header.fields.iter().position(|f| f.name == name)?;
        self.symbol_tables.get(index)
    }

    /// A decoder over the row section, for callers that want to split the
    /// work with [`RowDecoder::decode_range`].
    pub fn row_decoder(&self) -> Result<RowDecoder<'_>> {
        RowDecoder::new(self.bytes, &self.header)
    }

    /// Resolved symbol indices of every row.
    pub fn row_indices(&self) -> Result<RowIndices> {
        self.row_decoder()?.decode()
    }

    /// Decodes all rows, applies the optional filter and assembles the table.
    pub fn decode(&self, options: &DecodeOptions) -> Result<Table> {
        let mut rows = self.row_indices()?;
        let filter = RowFilter::new(options.filter.as_ref(), &self.symbol_tables);
        filter.apply(&mut rows);
        table::assemble(
            self.header.clone(),
            &self.symbol_tables,
            &rows,
            options.dual_preference,
        )
    }

    /// Names of the fields whose symbol table holds a symbol matching `search`.
    ///
    /// Only symbol tables are inspected; rows are not decoded. An empty
    /// search text matches no field.
    pub fn search_fields(&self, search: &FilterOptions) -> Vec<&str> {
        RowFilter::new(Some(search), &self.symbol_tables)
            .matching_fields()
            .into_iter()
            .filter_map(|index| self.header.fields.get(index))
            .map(|field| field.name.as_str())
            .collect()
    }
}
