pub mod chart;
pub mod report;
pub mod transform;
pub mod view;

use std::{fs, path::Path};

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::{
    cli::{FilterArgs, InputArgs},
    data::Dataset,
    filter::{CrossFilter, FilterState, SortSpec, parse_column_filter},
    io_utils,
};

pub(crate) fn load_dataset(args: &InputArgs) -> Result<(Dataset, u8)> {
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    info!(
        "Reading '{}' with delimiter '{}'",
        args.input.display(),
        printable_delimiter(delimiter)
    );
    let dataset = io_utils::read_dataset(&args.input, delimiter, encoding)
        .with_context(|| format!("Loading dataset from {:?}", args.input))?;
    Ok((dataset, delimiter))
}

pub(crate) fn resolve_filter_state(args: &FilterArgs) -> Result<FilterState> {
    let mut state = match &args.state {
        Some(path) => io_utils::load_filter_state(path)?,
        None => FilterState::default(),
    };
    if let Some(search) = &args.search {
        state.search = search.clone();
    }
    for spec in &args.filters {
        let (column, text) = parse_column_filter(spec)?;
        state.column_filters.insert(column, text);
    }
    if let Some(spec) = &args.cross_filter {
        let (column, value) = parse_column_filter(spec)?;
        state.cross_filter = Some(CrossFilter { column, value });
    }
    if let Some(spec) = &args.sort {
        state.sort = Some(SortSpec::parse(spec)?);
    }
    Ok(state)
}

pub(crate) fn emit_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Serializing JSON output")?;
    match output {
        Some(path) if !io_utils::is_dash(path) => {
            fs::write(path, format!("{rendered}\n"))
                .with_context(|| format!("Writing JSON to {path:?}"))?;
        }
        _ => println!("{rendered}"),
    }
    Ok(())
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}
