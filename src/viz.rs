//! Chart rendering with Plotters: bar, line and scatter charts from a `ChartSpec`

use std::error::Error;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use polars::prelude::DataFrame;
use tracing::{debug, info};

use crate::chart::{BarMode, ChartKind, ChartSpec, Encoding, LegendPosition, Orientation};
use crate::data::{f64_values, parent_dir, require_columns, str_values};
use crate::error::InsightError;

type DrawResult<T> = std::result::Result<T, Box<dyn Error>>;
type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Share of a category slot covered by its bars
const GROUP_WIDTH: f64 = 0.8;
const LEGEND_HEIGHT: i32 = 40;
const COLOR_SCALE_WIDTH: i32 = 110;
const MIN_MARKER_RADIUS: f64 = 3.0;

/// Viridis colour scale sampled at nine evenly spaced stops
const VIRIDIS: [(u8, u8, u8); 9] = [
    (0x44, 0x01, 0x54),
    (0x47, 0x2D, 0x7B),
    (0x3B, 0x52, 0x8B),
    (0x2C, 0x72, 0x8E),
    (0x21, 0x91, 0x8C),
    (0x28, 0xAE, 0x80),
    (0x5E, 0xC9, 0x62),
    (0xAD, 0xDC, 0x30),
    (0xFD, 0xE7, 0x25),
];

/// Category labels plus one value vector per series, in row order
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryData {
    pub labels: Vec<String>,
    pub series: Vec<(String, Vec<f64>)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointData {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub size: Vec<f64>,
    pub color: Vec<f64>,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
enum PlotData {
    Categories(CategoryData),
    Points(PointData),
}

/// One bar in data space: `slot` along the category axis, `span` along the value axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarExtent {
    pub slot: (f64, f64),
    pub span: (f64, f64),
}

/// Render `df` to a PNG at `output_path` following `spec`
///
/// # Arguments
/// * `df` - Table holding every column the spec references
/// * `spec` - Visual encoding of the chart
/// * `output_path` - Destination image; replaced only when rendering succeeds
///
/// # Returns
/// * `ColumnMissing` before anything is written if a referenced column is absent,
///   `Render` if drawing or writing the image fails
pub fn render_chart(df: &DataFrame, spec: &ChartSpec, output_path: &Path) -> crate::Result<()> {
    require_columns(df, &spec.title, &spec.referenced_columns())?;

    if !encoding_fits_kind(spec) {
        return Err(InsightError::render(
            output_path,
            format!("{:?} chart cannot draw this column encoding", spec.kind),
        ));
    }

    let plot = extract_plot_data(df, spec)?;

    let temp_file = tempfile::Builder::new()
        .prefix(".chart-")
        .suffix(".png")
        .tempfile_in(parent_dir(output_path))
        .map_err(|e| InsightError::render(output_path, e))?;

    debug!(temp = %temp_file.path().display(), "drawing chart");
    draw_chart(temp_file.path(), spec, &plot).map_err(|e| InsightError::render(output_path, e))?;

    temp_file
        .persist(output_path)
        .map_err(|e| InsightError::render(output_path, e.error))?;

    info!(path = %output_path.display(), title = %spec.title, "chart saved");
    Ok(())
}

fn encoding_fits_kind(spec: &ChartSpec) -> bool {
    matches!(
        (spec.kind, &spec.encoding),
        (ChartKind::Bar | ChartKind::Line, Encoding::Categories { .. })
            | (ChartKind::Scatter, Encoding::Points { .. })
    )
}

fn extract_plot_data(df: &DataFrame, spec: &ChartSpec) -> crate::Result<PlotData> {
    match &spec.encoding {
        Encoding::Categories { category, series } => {
            let labels = str_values(df, &spec.title, category)?;
            let series = series
                .iter()
                .map(|s| Ok((s.name.clone(), f64_values(df, &spec.title, &s.column)?)))
                .collect::<crate::Result<Vec<_>>>()?;
            Ok(PlotData::Categories(CategoryData { labels, series }))
        }
        Encoding::Points {
            x,
            y,
            size,
            color,
            text,
            ..
        } => Ok(PlotData::Points(PointData {
            x: f64_values(df, &spec.title, x)?,
            y: f64_values(df, &spec.title, y)?,
            size: f64_values(df, &spec.title, size)?,
            color: f64_values(df, &spec.title, color)?,
            labels: str_values(df, &spec.title, text)?,
        })),
    }
}

fn draw_chart(path: &Path, spec: &ChartSpec, plot: &PlotData) -> DrawResult<()> {
    let root = BitMapBackend::new(path, spec.size).into_drawing_area();
    root.fill(&WHITE)?;
    let body = root.titled(&spec.title, ("sans-serif", 26))?;

    match plot {
        PlotData::Categories(data) => {
            let legend_rows = legend_height(spec);
            let area = if legend_rows > 0 {
                let (legend_area, rest) = body.split_vertically(legend_rows);
                let names: Vec<&str> = data.series.iter().map(|(name, _)| name.as_str()).collect();
                draw_legend(&legend_area, spec, &names)?;
                rest
            } else {
                body
            };

            match (spec.kind, spec.orientation) {
                (ChartKind::Line, _) => draw_lines(&area, spec, data)?,
                (_, Orientation::Vertical) => draw_vertical_bars(&area, spec, data)?,
                (_, Orientation::Horizontal) => draw_horizontal_bars(&area, spec, data)?,
            }
        }
        PlotData::Points(data) => {
            let (width, _) = body.dim_in_pixel();
            let split_at = (width as i32 - COLOR_SCALE_WIDTH).max(1);
            let (plot_area, scale_area) = body.split_horizontally(split_at);
            draw_scatter(&plot_area, spec, data)?;
            draw_color_scale(&scale_area, spec, data)?;
        }
    }

    root.present()?;
    Ok(())
}

/// Pixels reserved above the plot for the series legend.
///
/// Scatter charts have no series legend; their colour scale is always drawn.
fn legend_height(spec: &ChartSpec) -> i32 {
    match (&spec.encoding, spec.legend) {
        (Encoding::Categories { .. }, LegendPosition::TopCenter) => LEGEND_HEIGHT,
        _ => 0,
    }
}

/// Horizontal row of colour swatches and series names, centred in `area`
fn draw_legend(area: &Area, spec: &ChartSpec, names: &[&str]) -> DrawResult<()> {
    const SWATCH: i32 = 14;
    const GAP: i32 = 6;
    const SPACING: i32 = 24;

    let style = TextStyle::from(("sans-serif", 15).into_font());
    let mut widths = Vec::with_capacity(names.len());
    for name in names {
        let (w, _) = area.estimate_text_size(name, &style)?;
        widths.push(w as i32);
    }

    let total: i32 = widths.iter().map(|w| SWATCH + GAP + w + SPACING).sum::<i32>() - SPACING;
    let (area_width, area_height) = area.dim_in_pixel();
    let mut x = ((area_width as i32 - total) / 2).max(0);
    let y = area_height as i32 / 2;

    for (i, (name, width)) in names.iter().zip(widths.iter()).enumerate() {
        let color = spec.series_color(i);
        area.draw(&Rectangle::new(
            [(x, y - SWATCH / 2), (x + SWATCH, y + SWATCH / 2)],
            color.filled(),
        ))?;
        area.draw(&Text::new(
            *name,
            (x + SWATCH + GAP, y),
            style.clone().pos(Pos::new(HPos::Left, VPos::Center)),
        ))?;
        x += SWATCH + GAP + width + SPACING;
    }
    Ok(())
}

/// Rectangle extents for every bar, indexed `[series][row]`.
///
/// Grouped bars split the slot evenly between series; stacked bars share the
/// slot and start where the previous series ended. With a value range set,
/// both ends of every span are clamped into it.
pub fn bar_extents(
    data: &CategoryData,
    bar_mode: BarMode,
    value_range: Option<(f64, f64)>,
) -> Vec<Vec<BarExtent>> {
    let n_series = data.series.len().max(1) as f64;
    let half = GROUP_WIDTH / 2.0;
    let mut stack_tops = vec![0.0; data.labels.len()];

    let clamp = |v: f64| match value_range {
        Some((lo, hi)) => v.clamp(lo, hi),
        None => v,
    };

    data.series
        .iter()
        .enumerate()
        .map(|(j, (_, values))| {
            values
                .iter()
                .enumerate()
                .map(|(i, &value)| {
                    let center = i as f64;
                    let (slot, span) = match bar_mode {
                        BarMode::Group => {
                            let width = GROUP_WIDTH / n_series;
                            let start = center - half + j as f64 * width;
                            ((start, start + width), (0.0, value))
                        }
                        BarMode::Stack => {
                            let base = stack_tops[i];
                            stack_tops[i] = base + value;
                            ((center - half, center + half), (base, base + value))
                        }
                    };
                    BarExtent {
                        slot,
                        span: (clamp(span.0), clamp(span.1)),
                    }
                })
                .collect()
        })
        .collect()
}

/// Value-axis bounds: the configured range, else zero-based with 10% headroom
fn value_bounds(spec: &ChartSpec, extents: &[Vec<BarExtent>]) -> (f64, f64) {
    if let Some(range) = spec.value_range {
        return range;
    }
    let values = extents.iter().flatten().flat_map(|b| [b.span.0, b.span.1]);
    auto_bounds(values)
}

fn auto_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let lo = if min < 0.0 { min * 1.1 } else { 0.0 };
    let hi = if max > 0.0 { max * 1.1 } else { 1.0 };
    (lo, hi)
}

/// Label for a category-axis tick; blank for positions between categories
fn category_label(labels: &[String], position: f64) -> String {
    let index = position.round();
    if (position - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    labels.get(index as usize).cloned().unwrap_or_default()
}

fn category_range(n: usize) -> std::ops::Range<f64> {
    -0.5..(n.max(1) as f64 - 0.5)
}

fn draw_vertical_bars(area: &Area, spec: &ChartSpec, data: &CategoryData) -> DrawResult<()> {
    let n = data.labels.len();
    let extents = bar_extents(data, spec.bar_mode, spec.value_range);
    let (lo, hi) = value_bounds(spec, &extents);

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(category_range(n), lo..hi)?;

    let category_fmt = |v: &f64| category_label(&data.labels, *v);
    let value_fmt = |v: &f64| spec.ticks.apply(*v);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n + 1)
        .x_label_formatter(&category_fmt)
        .y_label_formatter(&value_fmt)
        .x_desc(spec.x_title.as_str())
        .y_desc(spec.y_title.as_str())
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for (j, bars) in extents.iter().enumerate() {
        let color = spec.series_color(j);
        chart.draw_series(bars.iter().map(|bar| {
            Rectangle::new(
                [(bar.slot.0, bar.span.0), (bar.slot.1, bar.span.1)],
                color.filled(),
            )
        }))?;
    }
    Ok(())
}

fn draw_horizontal_bars(area: &Area, spec: &ChartSpec, data: &CategoryData) -> DrawResult<()> {
    let n = data.labels.len();
    let extents = bar_extents(data, spec.bar_mode, spec.value_range);
    let (lo, hi) = value_bounds(spec, &extents);

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(150)
        .build_cartesian_2d(lo..hi, category_range(n))?;

    let category_fmt = |v: &f64| category_label(&data.labels, *v);
    let value_fmt = |v: &f64| spec.ticks.apply(*v);
    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(n + 1)
        .y_label_formatter(&category_fmt)
        .x_label_formatter(&value_fmt)
        .x_desc(spec.x_title.as_str())
        .y_desc(spec.y_title.as_str())
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for (j, bars) in extents.iter().enumerate() {
        let color = spec.series_color(j);
        chart.draw_series(bars.iter().map(|bar| {
            Rectangle::new(
                [(bar.span.0, bar.slot.0), (bar.span.1, bar.slot.1)],
                color.filled(),
            )
        }))?;
    }
    Ok(())
}

fn draw_lines(area: &Area, spec: &ChartSpec, data: &CategoryData) -> DrawResult<()> {
    let n = data.labels.len();
    let (lo, hi) = spec.value_range.unwrap_or_else(|| {
        auto_bounds(data.series.iter().flat_map(|(_, values)| values.iter().copied()))
    });

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(category_range(n), lo..hi)?;

    let category_fmt = |v: &f64| category_label(&data.labels, *v);
    let value_fmt = |v: &f64| spec.ticks.apply(*v);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n + 1)
        .x_label_formatter(&category_fmt)
        .y_label_formatter(&value_fmt)
        .x_desc(spec.x_title.as_str())
        .y_desc(spec.y_title.as_str())
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for (j, (_, values)) in data.series.iter().enumerate() {
        let color = spec.series_color(j);
        let points: Vec<(f64, f64)> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| (i as f64, v))
            .collect();

        chart.draw_series(LineSeries::new(points.clone(), color.stroke_width(3)))?;
        chart.draw_series(points.iter().map(|&p| Circle::new(p, 4, color.filled())))?;
    }
    Ok(())
}

/// Padded bounds around the data so markers at the edges stay inside the plot
fn padded_bounds(values: &[f64]) -> (f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((max - min) * 0.15).max(5.0);
    (min - pad, max + pad)
}

/// Marker radius in pixels; marker area is proportional to `value`
pub fn marker_radius(value: f64, max_value: f64, max_marker_px: u32) -> f64 {
    if max_value <= 0.0 || value <= 0.0 {
        return MIN_MARKER_RADIUS;
    }
    let radius = f64::from(max_marker_px) / 2.0 * (value / max_value).sqrt();
    radius.max(MIN_MARKER_RADIUS)
}

/// Position of `value` within `[min, max]` as a fraction, 0.5 when the range is empty
fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if max > min {
        (value - min) / (max - min)
    } else {
        0.5
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    })
}

fn draw_scatter(area: &Area, spec: &ChartSpec, data: &PointData) -> DrawResult<()> {
    let max_marker_px = match &spec.encoding {
        Encoding::Points { max_marker_px, .. } => *max_marker_px,
        Encoding::Categories { .. } => 20,
    };
    let (x_lo, x_hi) = padded_bounds(&data.x);
    let (y_lo, y_hi) = padded_bounds(&data.y);
    let max_size = data.size.iter().copied().fold(0.0, f64::max);
    let (c_min, c_max) = min_max(&data.color);

    let mut chart = ChartBuilder::on(area)
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

    chart
        .configure_mesh()
        .x_desc(spec.x_title.as_str())
        .y_desc(spec.y_title.as_str())
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series((0..data.x.len()).map(|i| {
        let radius = marker_radius(data.size[i], max_size, max_marker_px);
        let color = viridis(normalize(data.color[i], c_min, c_max));
        Circle::new(
            (data.x[i], data.y[i]),
            radius.round() as i32,
            color.mix(0.85).filled(),
        )
    }))?;

    let label_style = TextStyle::from(("sans-serif", 11).into_font())
        .pos(Pos::new(HPos::Center, VPos::Center));
    chart.draw_series((0..data.x.len()).map(|i| {
        Text::new(
            data.labels[i].clone(),
            (data.x[i], data.y[i]),
            label_style.clone(),
        )
    }))?;
    Ok(())
}

/// Vertical gradient bar mapping the colour channel back to values
fn draw_color_scale(area: &Area, spec: &ChartSpec, data: &PointData) -> DrawResult<()> {
    let title = match &spec.encoding {
        Encoding::Points { color_title, .. } => color_title.as_str(),
        Encoding::Categories { .. } => "",
    };
    let (c_min, c_max) = min_max(&data.color);
    let (_, height) = area.dim_in_pixel();
    let top = 60;
    let bottom = (height as i32 - 70).max(top + 1);
    let (left, right) = (16, 36);

    area.draw(&Text::new(title, (left - 6, top - 30), ("sans-serif", 14).into_font()))?;

    let steps = bottom - top;
    for step in 0..steps {
        let fraction = 1.0 - f64::from(step) / f64::from(steps);
        area.draw(&Rectangle::new(
            [(left, top + step), (right, top + step + 1)],
            viridis(fraction).filled(),
        ))?;
    }

    if c_min.is_finite() && c_max.is_finite() {
        let label_style = TextStyle::from(("sans-serif", 12).into_font())
            .pos(Pos::new(HPos::Left, VPos::Center));
        area.draw(&Text::new(
            spec.ticks.apply(c_max),
            (right + 6, top),
            label_style.clone(),
        ))?;
        area.draw(&Text::new(
            spec.ticks.apply(c_min),
            (right + 6, bottom),
            label_style,
        ))?;
    }
    Ok(())
}

/// Colour for `fraction` in `[0, 1]` on the Viridis scale
pub fn viridis(fraction: f64) -> RGBColor {
    let t = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    let f = scaled - i as f64;

    let (r0, g0, b0) = VIRIDIS[i];
    let (r1, g1, b1) = VIRIDIS[i + 1];
    let lerp = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * f).round() as u8;
    RGBColor(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
}
