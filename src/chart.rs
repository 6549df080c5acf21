//! Declarative chart specification: the visual options a render pipeline sets

use plotters::style::RGBColor;

/// Brand palette used across the research charts
pub const TEAL: RGBColor = RGBColor(0x1F, 0xB8, 0xCD);
pub const PEACH: RGBColor = RGBColor(0xFF, 0xC1, 0x85);
pub const SAND: RGBColor = RGBColor(0xEC, 0xEB, 0xD5);
pub const SLATE_CYAN: RGBColor = RGBColor(0x5D, 0x87, 0x8F);
pub const BRICK: RGBColor = RGBColor(0xB4, 0x41, 0x3C);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Line,
    Scatter,
}

/// How multiple bar series share a category slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarMode {
    Group,
    Stack,
}

/// Direction bars grow in; categories sit on the other axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// Placement of the series legend on bar and line charts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendPosition {
    /// One horizontal row, centred above the plot area
    TopCenter,
    Hidden,
}

/// How value-axis tick labels are written: prefix and suffix such as `$` or `%`,
/// an optional fixed number of decimals and optional thousands separators
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickFormat {
    pub prefix: String,
    pub suffix: String,
    /// Fixed decimals; `None` prints whole values bare and others with one decimal
    pub decimals: Option<usize>,
    pub grouped: bool,
}

impl TickFormat {
    pub fn prefix(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            ..Self::default()
        }
    }

    pub fn suffix(suffix: &str) -> Self {
        Self {
            suffix: suffix.to_string(),
            ..Self::default()
        }
    }

    pub fn decimals(mut self, decimals: usize) -> Self {
        self.decimals = Some(decimals);
        self
    }

    /// Separate thousands with commas
    pub fn grouped(mut self) -> Self {
        self.grouped = true;
        self
    }

    pub fn apply(&self, value: f64) -> String {
        let number = match self.decimals {
            Some(decimals) => format!("{value:.decimals$}"),
            None if value.fract().abs() < 1e-9 => format!("{value:.0}"),
            None => format!("{value:.1}"),
        };
        let number = if self.grouped {
            group_thousands(&number)
        } else {
            number
        };

        match number.strip_prefix('-') {
            Some(magnitude) => format!("-{}{}{}", self.prefix, magnitude, self.suffix),
            None => format!("{}{}{}", self.prefix, number, self.suffix),
        }
    }
}

/// Insert a comma every three digits of the integer part of a formatted number
fn group_thousands(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (integer, fraction) = match unsigned.find('.') {
        Some(dot) => unsigned.split_at(dot),
        None => (unsigned, ""),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("{sign}{grouped}{fraction}")
}

/// A value column drawn as one series, with the name shown in the legend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSeries {
    pub column: String,
    pub name: String,
}

impl ValueSeries {
    pub fn new(column: &str, name: &str) -> Self {
        Self {
            column: column.to_string(),
            name: name.to_string(),
        }
    }
}

/// Which table columns feed which visual channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoding {
    /// One slot per row labelled by `category`, one bar or line per series
    Categories {
        category: String,
        series: Vec<ValueSeries>,
    },
    /// One marker per row: position, radius and colour from numeric columns
    Points {
        x: String,
        y: String,
        size: String,
        color: String,
        text: String,
        /// Title of the colour scale legend
        color_title: String,
        /// Diameter in pixels of the marker with the largest `size` value
        max_marker_px: u32,
    },
}

/// Full description of one static chart
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub title: String,
    pub kind: ChartKind,
    pub bar_mode: BarMode,
    pub orientation: Orientation,
    pub palette: Vec<RGBColor>,
    pub x_title: String,
    pub y_title: String,
    pub legend: LegendPosition,
    /// Fixed bounds for the value axis; bar ends outside it are clamped
    pub value_range: Option<(f64, f64)>,
    pub ticks: TickFormat,
    pub encoding: Encoding,
    pub size: (u32, u32),
}

impl ChartSpec {
    pub fn new(title: &str, kind: ChartKind, encoding: Encoding) -> Self {
        Self {
            title: title.to_string(),
            kind,
            bar_mode: BarMode::Group,
            orientation: Orientation::Vertical,
            palette: vec![TEAL, PEACH, SAND],
            x_title: String::new(),
            y_title: String::new(),
            legend: LegendPosition::TopCenter,
            value_range: None,
            ticks: TickFormat::default(),
            encoding,
            size: (1000, 600),
        }
    }

    pub fn bar_mode(mut self, bar_mode: BarMode) -> Self {
        self.bar_mode = bar_mode;
        self
    }

    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn palette(mut self, palette: &[RGBColor]) -> Self {
        self.palette = palette.to_vec();
        self
    }

    pub fn axis_titles(mut self, x_title: &str, y_title: &str) -> Self {
        self.x_title = x_title.to_string();
        self.y_title = y_title.to_string();
        self
    }

    pub fn legend(mut self, legend: LegendPosition) -> Self {
        self.legend = legend;
        self
    }

    pub fn value_range(mut self, min: f64, max: f64) -> Self {
        self.value_range = Some((min, max));
        self
    }

    pub fn ticks(mut self, ticks: TickFormat) -> Self {
        self.ticks = ticks;
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    /// Every table column the chart reads, in encoding order
    pub fn referenced_columns(&self) -> Vec<&str> {
        match &self.encoding {
            Encoding::Categories { category, series } => std::iter::once(category.as_str())
                .chain(series.iter().map(|s| s.column.as_str()))
                .collect(),
            Encoding::Points {
                x,
                y,
                size,
                color,
                text,
                ..
            } => vec![x.as_str(), y.as_str(), size.as_str(), color.as_str(), text.as_str()],
        }
    }

    /// Colour for the `index`-th series, cycling through the palette
    pub fn series_color(&self, index: usize) -> RGBColor {
        if self.palette.is_empty() {
            TEAL
        } else {
            self.palette[index % self.palette.len()]
        }
    }
}
