//! QVD XML header parsing.
//!
//! This module handles:
//! - Locating the XML header at the start of the file
//! - Extracting table and field metadata from `<QvdTableHeader>`
//! - Validating the declared record geometry
//!
//! # Header Structure
//! ```text
//! <?xml version="1.0" encoding="UTF-8" standalone="yes" ?>
//! <QvdTableHeader>
//!   <TableName>..</TableName>
//!   <Fields>
//!     <QvdFieldHeader>
//!       <FieldName/> <BitOffset/> <BitWidth/> <Bias/>
//!       <NumberFormat>..</NumberFormat>
//!       <NoOfSymbols/> <Offset/> <Length/>
//!     </QvdFieldHeader>
//!     ...
//!   </Fields>
//!   <RecordByteSize/> <NoOfRecords/> <Offset/> <Length/>
//! </QvdTableHeader>
//! \r\n\0                     <- first NUL ends the header
//! [symbol tables][row records]
//! ```

use std::str::FromStr;

use log::{debug, info, trace};
use quick_xml::{events::Event, Reader};

use crate::qvd::types::error::{QvdError, Result};
use crate::qvd::types::models::{FieldDescriptor, NumberFormat, QvdHeader};
use crate::qvd::utils;

const ROOT: &str = "QvdTableHeader";
const FIELDS: &str = "Fields";
const FIELD: &str = "QvdFieldHeader";

/// Parses the QVD header from the beginning of the file.
///
/// The header is everything before the first NUL byte. The returned
/// [`QvdHeader::binary_start`] points just past that byte.
pub fn parse(bytes: &[u8]) -> Result<QvdHeader> {
    info!("Parsing QVD header");

    let terminator = bytes
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| QvdError::HeaderParse("Missing NUL terminator after header XML".to_string()))?;
    trace!("Header terminator at byte {}", terminator);

    let xml = std::str::from_utf8(&bytes[..terminator])
        .map_err(|e| QvdError::HeaderParse(format!("Header XML is not valid UTF-8: {}", e)))?;

    let header = parse_xml(xml)?.build(terminator + 1)?;
    validate_geometry(&header)?;

    info!(
        "Header parsed successfully: table='{}', fields={}, records={}, record_byte_size={}",
        header.table_name,
        header.fields.len(),
        header.no_of_records,
        header.record_byte_size
    );
    Ok(header)
}

/// Walks the XML events and collects table and field elements.
fn parse_xml(xml: &str) -> Result<TableBuilder> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut state = ParseState::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                state.open(String::from_utf8_lossy(e.name().as_ref()).into_owned())?;
            }
            Ok(Event::Empty(e)) => {
                state.open(String::from_utf8_lossy(e.name().as_ref()).into_owned())?;
                state.close()?;
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| QvdError::HeaderParse(format!("Failed to decode XML text: {}", e)))?;
                state.text.push_str(&text);
            }
            Ok(Event::CData(e)) => state.text.push_str(&String::from_utf8_lossy(&e)),
            Ok(Event::End(_)) => state.close()?,
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(QvdError::HeaderParse(format!(
                    "Failed to read header XML at position {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
            _ => {}
        }
    }

    if let Some(open) = state.path.last() {
        return Err(QvdError::HeaderParse(format!("Unclosed element <{}> in header XML", open)));
    }
    if !state.root_seen {
        return Err(QvdError::HeaderParse(format!("No <{}> root element found in header XML", ROOT)));
    }
    Ok(state.table)
}

#[derive(Default)]
struct ParseState {
    path: Vec<String>,
    text: String,
    root_seen: bool,
    table: TableBuilder,
    field: Option<FieldBuilder>,
}

impl ParseState {
    fn open(&mut self, name: String) -> Result<()> {
        if self.path.is_empty() {
            if name != ROOT {
                return Err(QvdError::HeaderParse(format!(
                    "Unexpected root element <{}>, expected <{}>",
                    name, ROOT
                )));
            }
            if self.root_seen {
                return Err(QvdError::HeaderParse(format!("Multiple <{}> elements in header", ROOT)));
            }
            self.root_seen = true;
        }
        if name == FIELD && self.path.len() == 2 && self.path[1] == FIELDS {
            self.field = Some(FieldBuilder::default());
        }
        self.path.push(name);
        self.text.clear();
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let Some(name) = self.path.pop() else {
            return Err(QvdError::HeaderParse("Unbalanced closing tag in header XML".to_string()));
        };
        let value = std::mem::take(&mut self.text);
        let context: Vec<&str> = self.path.iter().map(String::as_str).collect();

        match (context.as_slice(), name.as_str()) {
            ([ROOT], element) => self.table.set(element, value)?,
            ([ROOT, FIELDS], FIELD) => {
                if let Some(field) = self.field.take() {
                    self.table.push_field(field.build()?)?;
                }
            }
            ([ROOT, FIELDS, FIELD], element) => {
                if let Some(field) = self.field.as_mut() {
                    field.set(element, value)?;
                }
            }
            ([ROOT, FIELDS, FIELD, "NumberFormat"], element) => {
                if let Some(field) = self.field.as_mut() {
                    set_number_format(&mut field.number_format, element, value)?;
                }
            }
            ([ROOT, FIELDS, FIELD, "Tags"], "String") => {
                if let Some(field) = self.field.as_mut() {
                    field.tags.push(value);
                }
            }
            ([ROOT, "TableTags" | "Tags"], "String") => self.table.tags.push(value),
            _ => trace!("Skipping header element <{}> under {:?}", name, context),
        }
        Ok(())
    }
}

#[derive(Default)]
struct FieldBuilder {
    name: Option<String>,
    bit_offset: Option<usize>,
    bit_width: Option<u32>,
    bias: Option<i64>,
    symbol_count: Option<usize>,
    offset: Option<usize>,
    length: Option<usize>,
    number_format: NumberFormat,
    tags: Vec<String>,
    comment: Option<String>,
}

impl FieldBuilder {
    fn set(&mut self, element: &str, value: String) -> Result<()> {
        match element {
            "FieldName" => self.name = Some(value),
            "BitOffset" => self.bit_offset = Some(number(element, &value)?),
            "BitWidth" => self.bit_width = Some(number(element, &value)?),
            "Bias" => self.bias = Some(number(element, &value)?),
            "NoOfSymbols" => self.symbol_count = Some(number(element, &value)?),
            "Offset" => self.offset = Some(number(element, &value)?),
            "Length" => self.length = Some(number(element, &value)?),
            "Comment" => self.comment = non_empty(value),
            _ => trace!("Skipping field element <{}>", element),
        }
        Ok(())
    }

    fn build(self) -> Result<FieldDescriptor> {
        let name = required(self.name, FIELD, "FieldName")?;
        let field = FieldDescriptor {
            bit_offset: required(self.bit_offset, &name, "BitOffset")?,
            bit_width: required(self.bit_width, &name, "BitWidth")?,
            bias: required(self.bias, &name, "Bias")?,
            symbol_count: required(self.symbol_count, &name, "NoOfSymbols")?,
            offset: required(self.offset, &name, "Offset")?,
            length: required(self.length, &name, "Length")?,
            number_format: self.number_format,
            tags: self.tags,
            comment: self.comment,
            name,
        };
        debug!(
            "Field '{}': bit_offset={}, bit_width={}, bias={}, symbols={}, symbol bytes {}+{}",
            field.name, field.bit_offset, field.bit_width, field.bias, field.symbol_count, field.offset, field.length
        );
        Ok(field)
    }
}

fn set_number_format(format: &mut NumberFormat, element: &str, value: String) -> Result<()> {
    match element {
        "Type" => format.format_type = value,
        "nDec" => format.decimals = number(element, &value)?,
        "UseThou" => format.use_thousands = number::<u8>(element, &value)? != 0,
        "Fmt" => format.format = value,
        "Dec" => format.decimal_separator = value,
        "Thou" => format.thousands_separator = value,
        _ => trace!("Skipping number format element <{}>", element),
    }
    Ok(())
}

#[derive(Default)]
struct TableBuilder {
    table_name: Option<String>,
    build_no: Option<String>,
    creator_doc: Option<String>,
    create_utc_time: Option<String>,
    source_file_utc_time: Option<String>,
    comment: Option<String>,
    compression: Option<String>,
    tags: Vec<String>,
    fields: Vec<FieldDescriptor>,
    record_byte_size: Option<usize>,
    no_of_records: Option<usize>,
    offset: Option<usize>,
    length: Option<usize>,
}

impl TableBuilder {
    fn set(&mut self, element: &str, value: String) -> Result<()> {
        match element {
            "TableName" => self.table_name = Some(value),
            "QvdBuildNo" => self.build_no = non_empty(value),
            "CreatorDoc" => self.creator_doc = non_empty(value),
            "CreateUtcTime" => self.create_utc_time = non_empty(value),
            "SourceFileUtcTime" => self.source_file_utc_time = non_empty(value),
            "Comment" => self.comment = non_empty(value),
            "Compression" => self.compression = non_empty(value),
            "RecordByteSize" => self.record_byte_size = Some(number(element, &value)?),
            "NoOfRecords" => self.no_of_records = Some(number(element, &value)?),
            "Offset" => self.offset = Some(number(element, &value)?),
            "Length" => self.length = Some(number(element, &value)?),
            _ => trace!("Skipping table element <{}>", element),
        }
        Ok(())
    }

    fn push_field(&mut self, field: FieldDescriptor) -> Result<()> {
        if self.fields.iter().any(|f| f.name == field.name) {
            return Err(QvdError::HeaderParse(format!("Duplicate field name '{}'", field.name)));
        }
        self.fields.push(field);
        Ok(())
    }

    fn build(self, binary_start: usize) -> Result<QvdHeader> {
        if let Some(compression) = self.compression {
            return Err(QvdError::HeaderParse(format!(
                "Compressed QVD files are not supported (compression '{}')",
                compression
            )));
        }

        let record_byte_size = required(self.record_byte_size, ROOT, "RecordByteSize")?;
        let no_of_records = required(self.no_of_records, ROOT, "NoOfRecords")?;

        // Without an explicit offset the rows follow the last symbol table.
        let offset = match self.offset {
            Some(offset) => offset,
            None => {
                let mut end = 0usize;
                for field in &self.fields {
                    let field_end = field.offset.checked_add(field.length).ok_or_else(|| {
                        QvdError::UnsupportedGeometry(format!("Symbol table of '{}' overflows", field.name))
                    })?;
                    end = end.max(field_end);
                }
                debug!("No row section offset in header, using end of symbol tables: {}", end);
                end
            }
        };

        let mut header = QvdHeader {
            table_name: self.table_name.unwrap_or_default(),
            build_no: self.build_no,
            creator_doc: self.creator_doc,
            create_utc_time: self.create_utc_time,
            source_file_utc_time: self.source_file_utc_time,
            comment: self.comment,
            tags: self.tags,
            fields: self.fields,
            record_byte_size,
            no_of_records,
            offset,
            length: 0,
            binary_start,
        };
        header.length = match self.length {
            Some(length) => length,
            None => header.row_section_len()?,
        };
        Ok(header)
    }
}

/// Checks that every field's bit range fits inside one record.
fn validate_geometry(header: &QvdHeader) -> Result<()> {
    let record_bits = header.record_byte_size.checked_mul(8).ok_or_else(|| {
        QvdError::UnsupportedGeometry(format!("Record byte size {} is too large", header.record_byte_size))
    })?;

    for field in &header.fields {
        if field.bit_width > 64 {
            return Err(QvdError::UnsupportedGeometry(format!(
                "Field '{}' has bit width {}, maximum is 64",
                field.name, field.bit_width
            )));
        }
        let end = field.bit_offset.checked_add(field.bit_width as usize);
        if end.is_none_or(|end| end > record_bits) {
            return Err(QvdError::UnsupportedGeometry(format!(
                "Field '{}' occupies bits {}..{} but records are only {} bits wide",
                field.name,
                field.bit_offset,
                field.bit_offset.saturating_add(field.bit_width as usize),
                record_bits
            )));
        }
    }

    if header.no_of_records.checked_mul(header.fields.len()).is_none() {
        return Err(QvdError::UnsupportedGeometry(format!(
            "{} records of {} fields overflow the address space",
            header.no_of_records,
            header.fields.len()
        )));
    }

    let needed = header.row_section_len()?;
    if header.length < needed {
        return Err(QvdError::UnsupportedGeometry(format!(
            "Row section length {} is smaller than {} records of {} bytes",
            header.length, header.no_of_records, header.record_byte_size
        )));
    }
    Ok(())
}

fn number<T: FromStr>(element: &str, text: &str) -> Result<T> {
    utils::parse_number(text)
        .ok_or_else(|| QvdError::HeaderParse(format!("Invalid value {:?} for <{}>", text, element)))
}

fn required<T>(value: Option<T>, owner: &str, element: &str) -> Result<T> {
    value.ok_or_else(|| QvdError::HeaderParse(format!("Missing <{}> in '{}'", element, owner)))
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
