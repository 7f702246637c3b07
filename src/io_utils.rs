//! Loading delimited files into a [`Table`].
//!
//! - **Delimiter resolution**: extension-based detection (`.tsv` → tab,
//!   anything else → comma) unless a delimiter is given.
//! - **Encoding**: fields are decoded with `encoding_rs`, defaulting to UTF-8.
//! - **stdin**: the `-` path reads from standard input.
//! - **Cells**: blank fields become missing, numeric fields become numbers,
//!   everything else is kept as text.

use std::{
    borrow::Cow,
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use anyhow::{Context, Result, anyhow, ensure};
use encoding_rs::{Encoding, UTF_8};
use log::{debug, info};

use crate::data::{Table, Value};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

const STDIN_PATH: &str = "-";

/// Encoding named by `--input-encoding`, UTF-8 when absent.
pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    match label.map(str::trim) {
        None => Ok(UTF_8),
        Some(name) => Encoding::for_label(name.as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{name}'")),
    }
}

/// Explicit delimiter, else tab for `.tsv` files and comma otherwise.
pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    let is_tsv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("tsv"));
    match provided {
        Some(delimiter) => delimiter,
        None if is_tsv => DEFAULT_TSV_DELIMITER,
        None => DEFAULT_CSV_DELIMITER,
    }
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true)
        .from_reader(reader)
}

/// Reader over `path`, or over stdin when `path` is `-`.
pub fn open_csv_reader_from_path(path: &Path, delimiter: u8) -> Result<csv::Reader<Box<dyn Read>>> {
    let source: Box<dyn Read> = if path == Path::new(STDIN_PATH) {
        Box::new(std::io::stdin().lock())
    } else {
        let file = File::open(path).with_context(|| format!("Opening input file {path:?}"))?;
        Box::new(BufReader::new(file))
    };
    Ok(open_csv_reader(source, delimiter))
}

fn decode_field<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> Result<Cow<'a, str>> {
    let (text, _, had_errors) = encoding.decode(bytes);
    ensure!(
        !had_errors,
        "Field is not valid {} text",
        encoding.name()
    );
    Ok(text)
}

/// Header names with surrounding whitespace and any byte-order mark removed.
fn decode_headers(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| {
            let name = decode_field(field, encoding)?;
            Ok(name.trim_start_matches('\u{feff}').trim().to_string())
        })
        .collect()
}

/// Typed cells of one data record.
fn decode_cells(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<Value>> {
    record
        .iter()
        .map(|field| decode_field(field, encoding).map(|text| Value::from_field(&text)))
        .collect()
}

/// Reads every record of `reader` into a table. Rows shorter than the header
/// are padded with missing cells.
pub fn read_table<R>(reader: &mut csv::Reader<R>, encoding: &'static Encoding) -> Result<Table>
where
    R: Read,
{
    let headers = decode_headers(reader.byte_headers()?, encoding).context("Decoding header row")?;
    debug!("Headers: {:?}", headers);

    let mut rows = Vec::new();
    let mut record = csv::ByteRecord::new();
    while reader
        .read_byte_record(&mut record)
        .with_context(|| format!("Reading row {}", rows.len() + 2))?
    {
        let cells = decode_cells(&record, encoding)
            .with_context(|| format!("Decoding row {}", rows.len() + 2))?;
        rows.push(cells);
    }
    Ok(Table::from_rows(&headers, rows))
}

pub fn load_table(
    path: &Path,
    delimiter: Option<u8>,
    encoding: &'static Encoding,
) -> Result<Table> {
    let delimiter = resolve_input_delimiter(path, delimiter);
    let mut reader = open_csv_reader_from_path(path, delimiter)?;
    let table =
        read_table(&mut reader, encoding).with_context(|| format!("Loading table from {path:?}"))?;
    info!(
        "Loaded {} row(s) across {} column(s) from {:?}",
        table.row_count(),
        table.columns().len(),
        path
    );
    Ok(table)
}
