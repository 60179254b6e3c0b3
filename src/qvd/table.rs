//! Column-oriented result of a decode.
//!
//! [`assemble`] resolves every (row, field) symbol index into a [`Value`] and
//! lays the values out column by column in header order.

use log::info;

use super::format::rows::RowIndices;
use super::iter::{TableRow, TableRows};
use super::types::error::{QvdError, Result};
use super::types::models::{DualPreference, QvdHeader, SymbolTable, Value};

/// One decoded column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

/// A decoded QVD table.
///
/// Immutable once built; decode the file again to observe changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    header: QvdHeader,
    columns: Vec<Column>,
    num_rows: usize,
}

impl Table {
    /// Metadata from the file header.
    pub fn header(&self) -> &QvdHeader {
        &self.header
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    /// Row-major view of row `index`.
    pub fn row(&self, index: usize) -> Option<TableRow<'_>> {
        (index < self.num_rows).then(|| TableRow::new(self, index))
    }

    /// Iterates over rows in order.
    pub fn rows(&self) -> TableRows<'_> {
        TableRows::new(self)
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }
}

/// Builds the table from decoded symbol tables and the surviving rows.
///
/// Every index in `rows` must be valid for its field's symbol table, which
/// [`RowDecoder`](super::format::rows::RowDecoder) guarantees.
///
/// # Errors
/// Returns [`QvdError::UnsupportedGeometry`] if a column cannot be allocated.
pub fn assemble(
    header: QvdHeader,
    symbol_tables: &[SymbolTable],
    rows: &RowIndices,
    preference: DualPreference,
) -> Result<Table> {
    let columns = header
        .fields
        .iter()
        .zip(symbol_tables)
        .enumerate()
        .map(|(field_index, (field, symbols))| {
            let rendered: Vec<Value> = symbols.iter().map(|s| s.to_value(preference)).collect();
            let mut values = Vec::new();
            values.try_reserve_exact(rows.num_rows()).map_err(|e| {
                QvdError::UnsupportedGeometry(format!(
                    "Cannot allocate {} values for column '{}': {}",
                    rows.num_rows(),
                    field.name,
                    e
                ))
            })?;
            values.extend(rows.iter().map(|row| {
                row[field_index]
                    .and_then(|index| rendered.get(index).cloned())
                    .unwrap_or(Value::Null)
            }));
            Ok(Column {
                name: field.name.clone(),
                values,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    info!(
        "Assembled table '{}': {} columns, {} rows",
        header.table_name,
        header.fields.len(),
        rows.num_rows()
    );

    Ok(Table {
        num_rows: rows.num_rows(),
        header,
        columns,
    })
}
