//! Builds synthetic QVD files byte for byte.
#![allow(dead_code)]

/// A symbol to encode into a field's symbol table.
#[derive(Debug, Clone)]
pub enum Sym {
    Int(i32),
    Real(f64),
    Text(&'static str),
    DualInt(i32, &'static str),
    DualReal(f64, &'static str),
}

pub fn encode_symbols(symbols: &[Sym]) -> Vec<u8> {
    let mut out = Vec::new();
    for symbol in symbols {
        match symbol {
            Sym::Int(n) => {
                out.push(0x01);
                out.extend_from_slice(&n.to_le_bytes());
            }
            Sym::Real(x) => {
                out.push(0x02);
                out.extend_from_slice(&x.to_le_bytes());
            }
            Sym::Text(s) => {
                out.push(0x04);
                out.extend_from_slice(s.as_bytes());
                out.push(0);
            }
            Sym::DualInt(n, s) => {
                out.push(0x05);
                out.extend_from_slice(&n.to_le_bytes());
                out.extend_from_slice(s.as_bytes());
                out.push(0);
            }
            Sym::DualReal(x, s) => {
                out.push(0x06);
                out.extend_from_slice(&x.to_le_bytes());
                out.extend_from_slice(s.as_bytes());
                out.push(0);
            }
        }
    }
    out
}

/// Sets `width` bits at `bit_pos`, least significant bit first.
pub fn put_bits(buf: &mut [u8], bit_pos: usize, width: u32, value: u64) {
    for i in 0..width as usize {
        let p = bit_pos + i;
        let bit = (value >> i) & 1;
        if bit == 1 {
            buf[p / 8] |= 1 << (p % 8);
        } else {
            buf[p / 8] &= !(1 << (p % 8));
        }
    }
}

/// Reads bits one at a time; the reference the bit reader is checked against.
pub fn naive_bits(buf: &[u8], bit_pos: usize, width: u32) -> u64 {
    let mut value = 0u64;
    for i in 0..width as usize {
        let p = bit_pos + i;
        let bit = (buf[p / 8] >> (p % 8)) & 1;
        value |= u64::from(bit) << i;
    }
    value
}

pub struct FieldSpec {
    pub name: String,
    pub bit_offset: usize,
    pub bit_width: u32,
    pub bias: i64,
    pub symbol_count: usize,
    pub symbol_bytes: Vec<u8>,
}

pub struct QvdBuilder {
    table_name: String,
    fields: Vec<FieldSpec>,
    next_bit: usize,
    record_byte_size: Option<usize>,
    rows: Vec<Vec<u64>>,
    declare_row_offset: bool,
}

impl QvdBuilder {
    pub fn new(table_name: &str) -> Self {
        Self {
            table_name: table_name.to_string(),
            fields: Vec::new(),
            next_bit: 0,
            record_byte_size: None,
            rows: Vec::new(),
            declare_row_offset: true,
        }
    }

    /// Adds a field packed right after the previous one.
    pub fn field(self, name: &str, bit_width: u32, bias: i64, symbols: &[Sym]) -> Self {
        let bit_offset = self.next_bit;
        self.field_at(name, bit_offset, bit_width, bias, symbols)
    }

    pub fn field_at(self, name: &str, bit_offset: usize, bit_width: u32, bias: i64, symbols: &[Sym]) -> Self {
        let bytes = encode_symbols(symbols);
        self.raw_field_at(name, bit_offset, bit_width, bias, bytes, symbols.len())
    }

    /// Adds a field with a hand-made symbol table.
    pub fn raw_field(self, name: &str, bit_width: u32, bias: i64, symbol_bytes: Vec<u8>, symbol_count: usize) -> Self {
        let bit_offset = self.next_bit;
        self.raw_field_at(name, bit_offset, bit_width, bias, symbol_bytes, symbol_count)
    }

    pub fn raw_field_at(
        mut self,
        name: &str,
        bit_offset: usize,
        bit_width: u32,
        bias: i64,
        symbol_bytes: Vec<u8>,
        symbol_count: usize,
    ) -> Self {
        self.next_bit = self.next_bit.max(bit_offset + bit_width as usize);
        self.fields.push(FieldSpec {
            name: name.to_string(),
            bit_offset,
            bit_width,
            bias,
            symbol_count,
            symbol_bytes,
        });
        self
    }

    pub fn record_byte_size(mut self, size: usize) -> Self {
        self.record_byte_size = Some(size);
        self
    }

    /// Leaves the table-level `<Offset>` out of the header.
    pub fn without_row_offset(mut self) -> Self {
        self.declare_row_offset = false;
        self
    }

    /// Adds a row of raw (pre-bias) bit values, one per field.
    pub fn row(mut self, raw: &[u64]) -> Self {
        self.rows.push(raw.to_vec());
        self
    }

    pub fn rows(mut self, rows: &[&[u64]]) -> Self {
        for raw in rows {
            self.rows.push(raw.to_vec());
        }
        self
    }

    pub fn record_size(&self) -> usize {
        self.record_byte_size.unwrap_or(self.next_bit.div_ceil(8))
    }

    /// The header XML and the binary section, before they are joined.
    pub fn build_parts(&self) -> (String, Vec<u8>) {
        let record_size = self.record_size();
        let mut binary = Vec::new();
        let mut offsets = Vec::new();
        for field in &self.fields {
            offsets.push((binary.len(), field.symbol_bytes.len()));
            binary.extend_from_slice(&field.symbol_bytes);
        }
        let row_offset = binary.len();
        for raw in &self.rows {
            let mut record = vec![0u8; record_size];
            for (field, value) in self.fields.iter().zip(raw) {
                put_bits(&mut record, field.bit_offset, field.bit_width, *value);
            }
            binary.extend_from_slice(&record);
        }

        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n");
        xml.push_str("<QvdTableHeader>\r\n");
        xml.push_str("  <QvdBuildNo>50699</QvdBuildNo>\r\n");
        xml.push_str("  <CreatorDoc>c0ffee00-1234-5678-9abc-def012345678</CreatorDoc>\r\n");
        xml.push_str("  <CreateUtcTime>2024-03-01 12:00:00</CreateUtcTime>\r\n");
        xml.push_str("  <SourceCreateUtcTime></SourceCreateUtcTime>\r\n");
        xml.push_str("  <SourceFileUtcTime></SourceFileUtcTime>\r\n");
        xml.push_str("  <SourceFileSize>-1</SourceFileSize>\r\n");
        xml.push_str("  <StaleUtcTime></StaleUtcTime>\r\n");
        xml.push_str(&format!("  <TableName>{}</TableName>\r\n", escape(&self.table_name)));
        xml.push_str("  <Fields>\r\n");
        for (field, (offset, length)) in self.fields.iter().zip(&offsets) {
            xml.push_str("    <QvdFieldHeader>\r\n");
            xml.push_str(&format!("      <FieldName>{}</FieldName>\r\n", escape(&field.name)));
            xml.push_str(&format!("      <BitOffset>{}</BitOffset>\r\n", field.bit_offset));
            xml.push_str(&format!("      <BitWidth>{}</BitWidth>\r\n", field.bit_width));
            xml.push_str(&format!("      <Bias>{}</Bias>\r\n", field.bias));
            xml.push_str("      <NumberFormat>\r\n");
            xml.push_str("        <Type>INTEGER</Type>\r\n");
            xml.push_str("        <nDec>0</nDec>\r\n");
            xml.push_str("        <UseThou>1</UseThou>\r\n");
            xml.push_str("        <Fmt>###0</Fmt>\r\n");
            xml.push_str("        <Dec>.</Dec>\r\n");
            xml.push_str("        <Thou>,</Thou>\r\n");
            xml.push_str("      </NumberFormat>\r\n");
            xml.push_str(&format!("      <NoOfSymbols>{}</NoOfSymbols>\r\n", field.symbol_count));
            xml.push_str(&format!("      <Offset>{}</Offset>\r\n", offset));
            xml.push_str(&format!("      <Length>{}</Length>\r\n", length));
            xml.push_str("      <Comment></Comment>\r\n");
            xml.push_str("      <Tags>\r\n");
            xml.push_str("        <String>$numeric</String>\r\n");
            xml.push_str("        <String>$integer</String>\r\n");
            xml.push_str("      </Tags>\r\n");
            xml.push_str("    </QvdFieldHeader>\r\n");
        }
        xml.push_str("  </Fields>\r\n");
        xml.push_str("  <Compression></Compression>\r\n");
        xml.push_str(&format!("  <RecordByteSize>{}</RecordByteSize>\r\n", record_size));
        xml.push_str(&format!("  <NoOfRecords>{}</NoOfRecords>\r\n", self.rows.len()));
        if self.declare_row_offset {
            xml.push_str(&format!("  <Offset>{}</Offset>\r\n", row_offset));
        }
        xml.push_str(&format!("  <Length>{}</Length>\r\n", self.rows.len() * record_size));
        xml.push_str("  <Lineage>\r\n");
        xml.push_str("    <LineageInfo>\r\n");
        xml.push_str("      <Discriminator>LOAD * FROM orders.csv</Discriminator>\r\n");
        xml.push_str("      <Statement></Statement>\r\n");
        xml.push_str("    </LineageInfo>\r\n");
        xml.push_str("  </Lineage>\r\n");
        xml.push_str("  <Comment>synthetic test table</Comment>\r\n");
        xml.push_str("</QvdTableHeader>\r\n");
        (xml, binary)
    }

    pub fn build(&self) -> Vec<u8> {
        let (xml, binary) = self.build_parts();
        join(&xml, &binary)
    }
}

/// Joins header XML and binary section with the NUL terminator.
pub fn join(xml: &str, binary: &[u8]) -> Vec<u8> {
    let mut out = xml.as_bytes().to_vec();
    out.push(0);
    out.extend_from_slice(binary);
    out
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// The three-row ID table used by several tests: symbols [10, 20, 30].
pub fn id_table(raw_rows: &[u64]) -> Vec<u8> {
    let mut builder = QvdBuilder::new("Ids").field("ID", 8, 0, &[Sym::Int(10), Sym::Int(20), Sym::Int(30)]);
    for raw in raw_rows {
        builder = builder.row(&[*raw]);
    }
    builder.build()
}

/// A mixed-type customers table with a missing value and dual symbols.
pub fn customers() -> Vec<u8> {
    QvdBuilder::new("Customers")
        .field("CustomerID", 3, 0, &[Sym::Int(101), Sym::Int(102), Sym::Int(103), Sym::Int(104)])
        .field(
            "Name",
            5,
            0,
            &[Sym::Text("Alice"), Sym::Text("Bob"), Sym::Text("Carol"), Sym::Text("abc")],
        )
        .field("City", 3, -2, &[Sym::Text("Oslo"), Sym::Text("Bergen"), Sym::Text("Abacus City")])
        .field(
            "Balance",
            2,
            0,
            &[Sym::DualReal(1250.5, "1,250.50"), Sym::DualInt(7, "seven"), Sym::Real(420.0)],
        )
        .rows(&[
            &[0, 0, 2, 0],
            &[1, 1, 3, 1],
            &[2, 2, 0, 2],
            &[3, 3, 4, 0],
        ])
        .build()
}
