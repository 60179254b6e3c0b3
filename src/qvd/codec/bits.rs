//! Bit extraction for QVD row records.
//!
//! Each row record is a little-endian integer: bit `p` of the stream is bit
//! `p % 8` of byte `p / 8`, and the first bit of a field is the least
//! significant bit of its value. Fields may start at any bit and span up to
//! nine bytes (a 64-bit field at alignment 7).

use byteorder::{ByteOrder, LittleEndian};

/// Random-access reader over a bit-packed byte slice.
#[derive(Debug, Clone, Copy)]
pub struct BitReader<'a> {
    buf: &'a [u8],
}

impl<'a> BitReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Number of addressable bits.
    pub fn bit_len(&self) -> usize {
        self.buf.len().saturating_mul(8)
    }

    /// Reads `width` bits starting at absolute bit position `bit_pos`.
    ///
    /// Returns `None` if `width > 64` or the range runs past the buffer.
    /// A zero width always reads as `0`.
    pub fn read_bits(&self, bit_pos: usize, width: u32) -> Option<u64> {
        if width == 0 {
            return Some(0);
        }
        if width > 64 {
            return None;
        }
        let end = bit_pos.checked_add(width as usize)?;
        if end > self.bit_len() {
            return None;
        }

        let first = bit_pos / 8;
        let last = (end - 1) / 8;
        let span = &self.buf[first..=last];
        let raw = LittleEndian::read_uint128(span, span.len());

        let value = (raw >> (bit_pos % 8)) as u64;
        Some(value & mask(width))
    }
}

/// Low `width` bits set.
fn mask(width: u32) -> u64 {
    if width >= 64 { u64::MAX } else { (1u64 << width) - 1 }
}
