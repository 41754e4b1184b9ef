use anyhow::Result;
use log::info;

use crate::{
    cli::ViewArgs,
    io_utils,
    table,
    view::build_working_view,
};

use super::{emit_json, load_dataset, resolve_filter_state};

const OUTLIER_MARKER: &str = "*";

pub fn execute(args: &ViewArgs) -> Result<()> {
    let (dataset, delimiter) = load_dataset(&args.input)?;
    let state = resolve_filter_state(&args.filter)?;
    let mut view = build_working_view(&dataset, &state);
    if let Some(limit) = args.limit {
        view.rows.truncate(limit);
        view.source_rows.truncate(limit);
    }

    if args.json {
        emit_json(&view, args.output.as_deref())?;
    } else if args.table {
        let mut headers = vec!["outlier".to_string()];
        headers.extend(view.columns.iter().cloned());
        let rows = table::row_strings(&view.rows)
            .into_iter()
            .enumerate()
            .map(|(position, cells)| {
                let marker = if view.is_outlier(position) { OUTLIER_MARKER } else { "" };
                std::iter::once(marker.to_string()).chain(cells).collect()
            })
            .collect::<Vec<Vec<String>>>();
        table::print_table(&headers, &rows);
    } else {
        let output_delimiter = io_utils::resolve_output_delimiter(
            args.output.as_deref(),
            args.output_delimiter,
            delimiter,
        );
        io_utils::write_rows(args.output.as_deref(), &view.columns, &view.rows, output_delimiter)?;
    }

    info!(
        "Emitted {} of {} row(s){}",
        view.len(),
        dataset.len(),
        view.sort
            .as_ref()
            .map(|sort| format!(" sorted by {} {}", sort.column, sort.direction))
            .unwrap_or_default()
    );
    Ok(())
}
