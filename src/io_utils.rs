//! CSV ingestion and export for the command-line front end.
//!
//! The analysis modules only see [`Dataset`] snapshots; this module turns a
//! delimited file (or stdin via `-`) into one and writes working views back
//! out. Delimiters follow the file extension unless overridden (`.tsv` reads
//! as tab, everything else as comma). Input may be in any `encoding_rs`
//! label; output is always UTF-8.

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};
use log::debug;

use crate::{
    data::{Dataset, Row},
    filter::FilterState,
};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    match label {
        Some(value) => Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'")),
        None => Ok(UTF_8),
    }
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or(if has_extension(path, "tsv") {
        DEFAULT_TSV_DELIMITER
    } else {
        DEFAULT_CSV_DELIMITER
    })
}

/// Output delimiter: explicit choice, then the output extension, then the
/// delimiter the input was read with.
pub fn resolve_output_delimiter(path: Option<&Path>, provided: Option<u8>, fallback: u8) -> u8 {
    match (provided, path) {
        (Some(delimiter), _) => delimiter,
        (None, Some(path)) if has_extension(path, "tsv") => DEFAULT_TSV_DELIMITER,
        (None, Some(path)) if has_extension(path, "csv") => DEFAULT_CSV_DELIMITER,
        _ => fallback,
    }
}

fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    if is_dash(path) {
        return Ok(Box::new(std::io::stdin().lock()));
    }
    let file = File::open(path).with_context(|| format!("Opening input file {path:?}"))?;
    Ok(Box::new(BufReader::new(file)))
}

fn decode_field(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(anyhow!("Failed to decode text with encoding {}", encoding.name()));
    }
    Ok(text.into_owned())
}

fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_field(field, encoding))
        .collect()
}

/// Reads a headed CSV file into a dataset. Every field is kept as text;
/// ragged rows are padded with Null or truncated to the header width.
pub fn read_dataset(
    path: &Path,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true)
        .from_reader(open_input(path)?);
    let headers = decode_record(
        reader
            .byte_headers()
            .with_context(|| format!("Reading headers from {path:?}"))?,
        encoding,
    )?;
    let mut records = Vec::new();
    for (idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {} of {path:?}", idx + 1))?;
        records.push(
            decode_record(&record, encoding)
                .with_context(|| format!("Decoding row {} of {path:?}", idx + 1))?,
        );
    }
    debug!(
        "Read {} row(s) with {} column(s) from {path:?}",
        records.len(),
        headers.len()
    );
    Ok(Dataset::from_text(headers, records))
}

pub fn open_csv_writer(path: Option<&Path>, delimiter: u8) -> Result<csv::Writer<Box<dyn Write>>> {
    let sink: Box<dyn Write> = match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(std::io::stdout()),
    };
    Ok(csv::WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true)
        .from_writer(sink))
}

pub fn write_rows(
    path: Option<&Path>,
    columns: &[String],
    rows: &[Row],
    delimiter: u8,
) -> Result<()> {
    let mut writer = open_csv_writer(path, delimiter)?;
    writer
        .write_record(columns)
        .context("Writing header row")?;
    for row in rows {
        writer
            .write_record(row.cells().iter().map(|cell| cell.to_text().into_owned()))
            .context("Writing data row")?;
    }
    writer.flush().context("Flushing CSV output")?;
    Ok(())
}

pub fn write_dataset(path: Option<&Path>, dataset: &Dataset, delimiter: u8) -> Result<()> {
    write_rows(path, dataset.columns(), dataset.rows(), delimiter)
}

/// Loads a saved filter state. `.yml`/`.yaml` files are YAML, anything else
/// is JSON.
pub fn load_filter_state(path: &Path) -> Result<FilterState> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("Reading filter state {path:?}"))?;
    let state = if has_extension(path, "yml") || has_extension(path, "yaml") {
        serde_yaml::from_str(&raw).with_context(|| format!("Parsing YAML filter state {path:?}"))?
    } else {
        serde_json::from_str(&raw).with_context(|| format!("Parsing JSON filter state {path:?}"))?
    };
    Ok(state)
}
