//! File format parsing layer for QVD files.
//!
//! This module provides the parsing layer between the raw file bytes and the
//! high-level [`QvdReader`](crate::qvd::reader::QvdReader).
//!
//! # Module Organization
//!
//! - [`header`]: Parses the XML header containing table and field metadata
//! - [`symbols`]: Decodes the per-field symbol tables
//! - [`rows`]: Extracts bit-packed symbol indices from row records
//!
//! # Architecture
//!
//! ```text
//! File Structure:
//! ┌─────────────────┐
//! │  XML Header     │ ← header::parse()
//! │  ... \r\n\0     │
//! ├─────────────────┤
//! │  Symbol Tables  │ ← symbols::decode_all()
//! │  (one per       │
//! │   field)        │
//! ├─────────────────┤
//! │  Row Records    │ ← rows::RowDecoder
//! │  (fixed width,  │
//! │   bit-packed)   │
//! └─────────────────┘
//! ```

pub mod header;
pub mod rows;
pub mod symbols;
