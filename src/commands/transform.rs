use anyhow::{Result, anyhow};
use log::info;

use crate::{
    cli::{DeriveArgs, ImputeArgs},
    derive::ComputedColumn,
    impute::{FillMethod, fill_value, impute_missing},
    io_utils,
};

use super::load_dataset;

pub fn derive(args: &DeriveArgs) -> Result<()> {
    let (dataset, delimiter) = load_dataset(&args.input)?;
    let mut computed = if args.expr.contains('=') {
        ComputedColumn::parse(&args.expr)?
    } else {
        let name = args
            .name
            .as_deref()
            .ok_or_else(|| anyhow!("--name is required when --expr does not name the column"))?;
        ComputedColumn::parse(&format!("{name}={}", args.expr))?
    };
    if let Some(name) = &args.name {
        computed.name = name.trim().to_string();
    }
    for operand in [&computed.left, &computed.right] {
        if !dataset.has_column(operand) {
            return Err(anyhow!("Column '{operand}' not found in dataset"));
        }
    }

    let replaced = dataset.has_column(&computed.name);
    let next = computed.apply(&dataset);
    let output_delimiter =
        io_utils::resolve_output_delimiter(args.output.as_deref(), None, delimiter);
    io_utils::write_dataset(args.output.as_deref(), &next, output_delimiter)?;
    info!(
        "{} column '{}' = {} {} {} for {} row(s)",
        if replaced { "Overwrote" } else { "Added" },
        computed.name,
        computed.left,
        computed.op,
        computed.right,
        next.len()
    );
    Ok(())
}

pub fn impute(args: &ImputeArgs) -> Result<()> {
    let (dataset, delimiter) = load_dataset(&args.input)?;
    if !dataset.has_column(&args.column) {
        return Err(anyhow!("Column '{}' not found in dataset", args.column));
    }
    let method = args.method.parse::<FillMethod>()?;
    let missing = dataset
        .column_cells(&args.column)
        .filter(|cell| cell.is_missing())
        .count();
    let fill = fill_value(&dataset, &args.column, method, &args.value);
    let next = impute_missing(&dataset, &args.column, method, &args.value);
    let output_delimiter =
        io_utils::resolve_output_delimiter(args.output.as_deref(), None, delimiter);
    io_utils::write_dataset(args.output.as_deref(), &next, output_delimiter)?;
    info!(
        "Filled {missing} missing cell(s) in '{}' with {method} value {fill}",
        args.column
    );
    Ok(())
}
