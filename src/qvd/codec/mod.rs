//! Codec layer for low-level binary primitives.
//!
//! # Submodules
//!
//! - [`bits`][]: Least-significant-bit-first extraction of bit-packed row fields
//! - [`glob`][]: Translation of wildcard patterns into anchored regexes

pub mod bits;
pub mod glob;
