//! Row-major access to a decoded [`Table`].
//!
//! # Example
//! ```no_run
//! # let bytes: Vec<u8> = Vec::new();
//! let table = qvd_reader::decode(&bytes).unwrap();
//! for row in table.rows() {
//!     for (name, value) in row.iter() {
//!         println!("{}: {}", name, value);
//!     }
//! }
//! ```

use std::iter::FusedIterator;

use super::table::Table;
use super::types::models::Value;

/// A borrowed view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct TableRow<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> TableRow<'a> {
    pub(super) fn new(table: &'a Table, index: usize) -> Self {
        Self { table, index }
    }

    /// Position of this row in the table.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The value of column `name`, if that column exists.
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.table.column(name).map(|c| &c.values[self.index])
    }

    /// The value at column position `column`.
    pub fn value(&self, column: usize) -> Option<&'a Value> {
        self.table.columns().get(column).map(|c| &c.values[self.index])
    }

    /// `(column name, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        let index = self.index;
        self.table
            .columns()
            .iter()
            .map(move |c| (c.name.as_str(), &c.values[index]))
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.iter().map(|(_, v)| v.clone()).collect()
    }
}

/// Iterator over the rows of a [`Table`].
///
/// Created by [`Table::rows()`].
#[derive(Debug, Clone)]
pub struct TableRows<'a> {
    table: &'a Table,
    next: usize,
}

impl<'a> TableRows<'a> {
    pub(super) fn new(table: &'a Table) -> Self {
        Self { table, next: 0 }
    }
}

impl<'a> Iterator for TableRows<'a> {
    type Item = TableRow<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.table.row(self.next)?;
        self.next += 1;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.table.num_rows().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TableRows<'_> {}

impl FusedIterator for TableRows<'_> {}
