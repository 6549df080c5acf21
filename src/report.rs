//! Plain-text rendering of tables for console summaries

use polars::prelude::*;

/// Render a table as aligned text: header, divider, one line per row.
///
/// Columns whose cells are all numeric are right aligned, everything else
/// left aligned. Whole floats keep one decimal so `27.0` stays distinguishable
/// from an integer count.
pub fn render_table(df: &DataFrame) -> crate::Result<String> {
    let headers: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    let mut cells: Vec<Vec<String>> = Vec::with_capacity(df.width());
    let mut numeric: Vec<bool> = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        let mut rendered = Vec::with_capacity(df.height());
        let mut all_numeric = true;
        for row in 0..df.height() {
            let value = column.get(row)?;
            all_numeric &= is_numeric(&value);
            rendered.push(format_value(&value));
        }
        cells.push(rendered);
        numeric.push(all_numeric && df.height() > 0);
    }

    let widths: Vec<usize> = headers
        .iter()
        .zip(cells.iter())
        .map(|(header, column)| {
            column
                .iter()
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
                .max(header.chars().count())
        })
        .collect();

    let header_line = headers
        .iter()
        .enumerate()
        .map(|(i, header)| pad(header, widths[i], numeric[i]))
        .collect::<Vec<_>>()
        .join("  ");

    let mut lines = Vec::with_capacity(df.height() + 2);
    lines.push(header_line.trim_end().to_string());
    lines.push("-".repeat(widths.iter().sum::<usize>() + widths.len().saturating_sub(1) * 2));

    for row in 0..df.height() {
        let line = cells
            .iter()
            .enumerate()
            .map(|(i, column)| pad(&column[row], widths[i], numeric[i]))
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(line.trim_end().to_string());
    }

    Ok(lines.join("\n"))
}

/// Print a `=== TITLE ===` banner followed by the rendered table
pub fn print_section(title: &str, df: &DataFrame) -> crate::Result<()> {
    println!("=== {title} ===");
    println!("{}", render_table(df)?);
    Ok(())
}

/// Format a float the way the summaries show it: whole values keep one decimal
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

fn format_value(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => "null".to_string(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Float64(v) => format_float(*v),
        AnyValue::Float32(v) => format_float(f64::from(*v)),
        other => other.to_string(),
    }
}

fn is_numeric(value: &AnyValue) -> bool {
    matches!(
        value,
        AnyValue::Int32(_)
            | AnyValue::Int64(_)
            | AnyValue::UInt32(_)
            | AnyValue::UInt64(_)
            | AnyValue::Float32(_)
            | AnyValue::Float64(_)
    )
}

fn pad(text: &str, width: usize, right_align: bool) -> String {
    if right_align {
        format!("{text:>width$}")
    } else {
        format!("{text:<width$}")
    }
}
