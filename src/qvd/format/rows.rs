//! # Row Record Decoding
//!
//! The row section holds `no_of_records` fixed-width records. Inside a record
//! each field occupies `bit_width` bits at `bit_offset`; the unsigned value
//! stored there plus the field's `bias` is an index into the field's symbol
//! table. A negative index means the row has no value for that field.
//!
//! Rows are independent of one another, so [`RowDecoder::decode_range`] can be
//! used to split a large file across threads.

use std::ops::Range;

use log::{debug, info};

use crate::qvd::codec::bits::BitReader;
use crate::qvd::types::error::{QvdError, Result};
use crate::qvd::types::models::{FieldDescriptor, QvdHeader};

/// Resolved symbol indices for a block of rows, stored row-major.
///
/// `None` marks a cell without a value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowIndices {
    num_rows: usize,
    num_fields: usize,
    cells: Vec<Option<usize>>,
}

impl RowIndices {
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_fields(&self) -> usize {
        self.num_fields
    }

    /// The indices of row `row`, one per field in header order.
    pub fn row(&self, row: usize) -> Option<&[Option<usize>]> {
        if row >= self.num_rows {
            return None;
        }
        let start = row * self.num_fields;
        Some(&self.cells[start..start + self.num_fields])
    }

    pub fn get(&self, row: usize, field: usize) -> Option<Option<usize>> {
        if field >= self.num_fields {
            return None;
        }
        self.row(row).map(|cells| cells[field])
    }

    pub fn iter(&self) -> impl Iterator<Item = &[Option<usize>]> + '_ {
        (0..self.num_rows).filter_map(move |row| self.row(row))
    }

    /// Keeps only the rows for which `keep` returns `true`, preserving order.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[Option<usize>]) -> bool,
    {
        let width = self.num_fields;
        let mut kept = Vec::with_capacity(self.cells.len());
        let mut num_rows = 0;
        for row in 0..self.num_rows {
            let cells = &self.cells[row * width..(row + 1) * width];
            if keep(cells) {
                kept.extend_from_slice(cells);
                num_rows += 1;
            }
        }
        self.cells = kept;
        self.num_rows = num_rows;
    }

    /// Appends the rows of `other`, which must have the same field count.
    pub fn extend(&mut self, other: RowIndices) {
        debug_assert!(self.num_rows == 0 || self.num_fields == other.num_fields);
        self.num_fields = other.num_fields;
        self.num_rows += other.num_rows;
        self.cells.extend(other.cells);
    }
}

/// Extracts symbol indices from the row section.
#[derive(Debug, Clone, Copy)]
pub struct RowDecoder<'a> {
    data: &'a [u8],
    header: &'a QvdHeader,
}

impl<'a> RowDecoder<'a> {
    /// Locates the row section of `bytes` as declared by `header`.
    ///
    /// # Errors
    /// Returns [`QvdError::TruncatedRowData`] if the file holds fewer than
    /// `no_of_records * record_byte_size` bytes after the row section offset.
    pub fn new(bytes: &'a [u8], header: &'a QvdHeader) -> Result<Self> {
        let expected = header.row_section_len()?;
        let start = header.binary_start.saturating_add(header.offset);
        let found = bytes.len().saturating_sub(start);
        if found < expected {
            return Err(QvdError::TruncatedRowData { expected, found });
        }
        debug!("Row section: {} bytes at file offset {}", expected, start);
        Ok(Self {
            data: &bytes[start..start + expected],
            header,
        })
    }

    pub fn num_rows(&self) -> usize {
        self.header.no_of_records
    }

    /// Decodes every row.
    pub fn decode(&self) -> Result<RowIndices> {
        let rows = self.decode_range(0..self.num_rows())?;
        info!("Decoded {} rows x {} fields", rows.num_rows(), rows.num_fields());
        Ok(rows)
    }

    /// Decodes rows in `range`; the range is clamped to the declared row count.
    ///
    /// # Errors
    /// Returns [`QvdError::CorruptRowData`] if a row references a symbol past
    /// the end of its field's symbol table, or
    /// [`QvdError::UnsupportedGeometry`] if the index buffer cannot be
    /// allocated.
    pub fn decode_range(&self, range: Range<usize>) -> Result<RowIndices> {
        let end = range.end.min(self.num_rows());
        let start = range.start.min(end);
        let fields = &self.header.fields;
        let record_bits = self.header.record_byte_size * 8;
        let reader = BitReader::new(self.data);
        debug!("Decoding rows {}..{}", start, end);

        let mut cells = Vec::new();
        (end - start)
            .checked_mul(fields.len())
            .and_then(|len| cells.try_reserve_exact(len).ok())
            .ok_or_else(|| {
                QvdError::UnsupportedGeometry(format!(
                    "Cannot allocate indices for {} rows x {} fields",
                    end - start,
                    fields.len()
                ))
            })?;
        for row in start..end {
            let row_bit = row * record_bits;
            for field in fields {
                let raw = reader
                    .read_bits(row_bit + field.bit_offset, field.bit_width)
                    .ok_or_else(|| QvdError::TruncatedRowData {
                        expected: (row + 1) * self.header.record_byte_size,
                        found: self.data.len(),
                    })?;
                cells.push(resolve_index(raw, row, field)?);
            }
        }

        Ok(RowIndices {
            num_rows: end - start,
            num_fields: fields.len(),
            cells,
        })
    }
}

/// Applies the field bias to a raw bit value.
fn resolve_index(raw: u64, row: usize, field: &FieldDescriptor) -> Result<Option<usize>> {
    let index = i128::from(raw) + i128::from(field.bias);
    if index < 0 {
        return Ok(None);
    }
    match usize::try_from(index) {
        Ok(index) if index < field.symbol_count => Ok(Some(index)),
        _ => Err(QvdError::CorruptRowData {
            row,
            field: field.name.clone(),
            index: i64::try_from(index).unwrap_or(i64::MAX),
            symbol_count: field.symbol_count,
        }),
    }
}
