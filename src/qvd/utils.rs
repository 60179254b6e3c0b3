//! Low-level byte reading utilities

use byteorder::{LittleEndian, ReadBytesExt};

/// Read a 4 byte little-endian signed integer and advance the slice.
///
/// Returns `None` if fewer than 4 bytes remain.
pub fn read_i32(reader: &mut &[u8]) -> Option<i32> {
    reader.read_i32::<LittleEndian>().ok()
}

/// Read an 8 byte little-endian IEEE-754 double and advance the slice.
pub fn read_f64(reader: &mut &[u8]) -> Option<f64> {
    reader.read_f64::<LittleEndian>().ok()
}

/// Read bytes up to the next NUL and advance the slice past the terminator.
///
/// Returns `None` if no terminator is present.
pub fn read_null_terminated<'a>(reader: &mut &'a [u8]) -> Option<&'a [u8]> {
    let end = reader.iter().position(|&b| b == 0)?;
    let bytes = &reader[..end];
    *reader = &reader[end + 1..];
    Some(bytes)
}

/// Parse a trimmed decimal number from header text.
pub fn parse_number<T: std::str::FromStr>(text: &str) -> Option<T> {
    text.trim().parse().ok()
}
