use std::{borrow::Cow, fmt::Write as _};

use crate::data::{Row, coerce_number};

const COLUMN_GAP: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(&flatten(cell)));
        }
    }
    let alignments = (0..headers.len())
        .map(|idx| {
            let numeric = !rows.is_empty()
                && rows.iter().all(|row| {
                    row.get(idx)
                        .is_some_and(|cell| coerce_number(cell).is_some())
                });
            if numeric { Align::Right } else { Align::Left }
        })
        .collect::<Vec<_>>();

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_line(headers, &widths, &alignments));
    let rule = widths.iter().map(|w| "-".repeat((*w).max(3))).collect::<Vec<_>>();
    let rule_widths = widths.iter().map(|w| (*w).max(3)).collect::<Vec<_>>();
    let _ = writeln!(
        output,
        "{}",
        format_line(&rule, &rule_widths, &vec![Align::Left; rule.len()])
    );
    for row in rows {
        let _ = writeln!(output, "{}", format_line(row, &widths, &alignments));
    }
    output
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

pub fn row_strings(rows: &[Row]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| {
            row.cells()
                .iter()
                .map(|cell| cell.to_text().into_owned())
                .collect()
        })
        .collect()
}

fn format_line(values: &[String], widths: &[usize], alignments: &[Align]) -> String {
    let cells = values
        .iter()
        .zip(widths)
        .zip(alignments)
        .map(|((value, width), align)| {
            let text = flatten(value);
            let pad = " ".repeat(width.saturating_sub(display_width(&text)));
            match align {
                Align::Left => format!("{text}{pad}"),
                Align::Right => format!("{pad}{text}"),
            }
        })
        .collect::<Vec<_>>();
    cells.join(COLUMN_GAP).trim_end().to_string()
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn flatten(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_columns_are_right_aligned() {
        let headers = vec!["name".to_string(), "fare".to_string()];
        let rows = vec![
            vec!["Ann".to_string(), "7.25".to_string()],
            vec!["Bartholomew".to_string(), "71.2833".to_string()],
        ];
        let rendered = render_table(&headers, &rows);
        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "name            fare");
        assert_eq!(lines[1], "-----------  -------");
        assert_eq!(lines[2], "Ann             7.25");
        assert_eq!(lines[3], "Bartholomew  71.2833");
    }

    #[test]
    fn embedded_newlines_are_flattened() {
        let headers = vec!["note".to_string()];
        let rows = vec![vec!["a\nb".to_string()]];
        assert_eq!(render_table(&headers, &rows).lines().nth(2), Some("a b"));
    }
}
