//! The research pipelines: compute-and-export stages and chart render stages
//!
//! Every pipeline resolves its fixed file names against one working directory.
//! Render pipelines read files written by the compute pipelines.

use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::info;

use crate::chart::{
    BarMode, ChartKind, ChartSpec, Encoding, LegendPosition, Orientation, TickFormat, ValueSeries,
    BRICK, PEACH, SAND, SLATE_CYAN, TEAL,
};
use crate::data::{export_table, load_table, str_values, with_short_labels};
use crate::datasets::{self, *};
use crate::error::InsightError;
use crate::metrics::{rank_by_priority, top_features};
use crate::report::{print_section, render_table};
use crate::viz::render_chart;

/// Number of features listed in the priority summary
pub const TOP_FEATURES: usize = 3;

/// Marker shared by every retention metric label
const RETENTION_METRIC: &str = "Retention Rate";

/// Build the pain point, market metric, sentiment and pricing tables, print them and save them
pub fn research_tables(dir: &Path) -> crate::Result<Vec<PathBuf>> {
    let tables = [
        ("USER PAIN POINTS ANALYSIS", datasets::pain_points()?, PAIN_POINTS_CSV),
        ("FITNESS APP MARKET METRICS", datasets::market_metrics()?, MARKET_METRICS_CSV),
        ("X3 USER SENTIMENT", datasets::sentiment()?, SENTIMENT_CSV),
        ("PRICING ANALYSIS", datasets::pricing()?, PRICING_CSV),
    ];

    let mut written = Vec::with_capacity(tables.len());
    for (i, (title, mut df, file_name)) in tables.into_iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_section(title, &df)?;

        let path = dir.join(file_name);
        export_table(&mut df, &path)?;
        info!(path = %path.display(), rows = df.height(), "research table saved");
        written.push(path);
    }
    Ok(written)
}

/// Score and rank the candidate features, then save them with the user segment table
pub fn opportunity_matrix(dir: &Path) -> crate::Result<Vec<PathBuf>> {
    let mut ranked = rank_by_priority(&datasets::feature_opportunities()?)?;

    print_section("PRODUCT FEATURE OPPORTUNITY MATRIX", &ranked)?;
    println!("\nTop {TOP_FEATURES} Priority Features:");
    for (rank, (feature, score)) in top_features(&ranked, TOP_FEATURES)?.iter().enumerate() {
        println!("{}. {} (Score: {:.1})", rank + 1, feature, score);
    }

    let matrix_path = dir.join(OPPORTUNITY_CSV);
    export_table(&mut ranked, &matrix_path)?;

    let mut segments = datasets::user_segments()?;
    println!();
    print_section("TARGET USER SEGMENT ANALYSIS", &segments)?;

    let segments_path = dir.join(SEGMENTS_CSV);
    export_table(&mut segments, &segments_path)?;

    info!(features = ranked.height(), segments = segments.height(), "opportunity matrix saved");
    Ok(vec![matrix_path, segments_path])
}

/// Order pain points by mention count, least mentioned first, and add `Challenge_Short`.
///
/// Challenges with equal counts keep their input order.
pub fn pain_point_rows(pain_points: &DataFrame) -> crate::Result<DataFrame> {
    let mut df = pain_points.sort(
        ["Frequency_Mentioned"],
        SortMultipleOptions::default().with_maintain_order(true),
    )?;
    with_short_labels(&mut df, PAIN_POINTS_CSV, "Challenge", "Challenge_Short")?;
    Ok(df)
}

/// Horizontal grouped bars of mention frequency and severity per challenge
pub fn pain_points_chart(dir: &Path) -> crate::Result<PathBuf> {
    let df = load_table(&dir.join(PAIN_POINTS_CSV), &PAIN_POINT_COLUMNS[..3])?;
    // Horizontal bars are drawn bottom up, so the most mentioned challenge ends up on top
    let df = pain_point_rows(&df)?;

    let spec = ChartSpec::new(
        "X3 Resistance Band User Pain Points Analysis",
        ChartKind::Bar,
        Encoding::Categories {
            category: "Challenge_Short".to_string(),
            series: vec![
                ValueSeries::new("Frequency_Mentioned", "Freq Mentioned"),
                ValueSeries::new("Severity_Score", "Severity Score"),
            ],
        },
    )
    .bar_mode(BarMode::Group)
    .orientation(Orientation::Horizontal)
    .palette(&[TEAL, PEACH])
    .axis_titles("Score/Count", "Challenge")
    .size(1000, 650);

    let output = dir.join(PAIN_POINTS_CHART);
    render_chart(&df, &spec, &output)?;
    Ok(output)
}

/// Stacked horizontal bars of positive/neutral/negative share per category.
///
/// Rows are not required to sum to 100; the axis is clamped to 0–100 regardless.
pub fn sentiment_chart(dir: &Path) -> crate::Result<PathBuf> {
    let df = load_table(&dir.join(SENTIMENT_CSV), &SENTIMENT_COLUMNS)?;

    let spec = ChartSpec::new(
        "X3 User Sentiment Analysis by Category",
        ChartKind::Bar,
        Encoding::Categories {
            category: "Category".to_string(),
            series: vec![
                ValueSeries::new("Positive", "Positive"),
                ValueSeries::new("Neutral", "Neutral"),
                ValueSeries::new("Negative", "Negative"),
            ],
        },
    )
    .bar_mode(BarMode::Stack)
    .orientation(Orientation::Horizontal)
    .palette(&[SLATE_CYAN, PEACH, BRICK])
    .axis_titles("Percentage", "Category")
    .value_range(0.0, 100.0)
    .ticks(TickFormat::suffix("%"));

    let output = dir.join(SENTIMENT_CHART);
    render_chart(&df, &spec, &output)?;
    Ok(output)
}

/// Grouped vertical bars of low/average/high price per app category
pub fn pricing_chart(dir: &Path) -> crate::Result<PathBuf> {
    let df = load_table(&dir.join(PRICING_CSV), &PRICING_COLUMNS[..4])?;

    println!("Data preview:");
    println!("{}", render_table(&df.head(Some(5)))?);
    let columns: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| format!("'{name}'"))
        .collect();
    println!("\nData columns:");
    println!("[{}]", columns.join(", "));
    println!("\nData shape:");
    println!("({}, {})", df.height(), df.width());

    let spec = ChartSpec::new(
        "Fitness App Pricing by Category",
        ChartKind::Bar,
        Encoding::Categories {
            category: "App_Category".to_string(),
            series: vec![
                ValueSeries::new("Low_Price", "Low Price"),
                ValueSeries::new("Avg_Price", "Avg Price"),
                ValueSeries::new("High_Price", "High Price"),
            ],
        },
    )
    .bar_mode(BarMode::Group)
    .orientation(Orientation::Vertical)
    .palette(&[TEAL, PEACH, SAND])
    .axis_titles("App Category", "Price ($)")
    .ticks(TickFormat::prefix("$").decimals(0).grouped());

    let output = dir.join(PRICING_CHART);
    render_chart(&df, &spec, &output)?;
    println!("Chart saved successfully!");
    Ok(output)
}

/// Leading run of ASCII digits in `label`, e.g. 30 for "Day 30 Retention Rate"
pub fn day_number(label: &str) -> Option<i64> {
    let start = label.find(|c: char| c.is_ascii_digit())?;
    let digits: String = label[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Select the retention-rate metrics and order them by day, labelled `Day N`
///
/// A retention metric without a day number fails with `InvalidCell` at its row in `metrics`.
pub fn retention_rows(metrics: &DataFrame) -> crate::Result<DataFrame> {
    let days = str_values(metrics, MARKET_METRICS_CSV, "Metric")?
        .iter()
        .enumerate()
        .filter(|(_, label)| label.contains(RETENTION_METRIC))
        .map(|(row, label)| {
            day_number(label).ok_or_else(|| InsightError::invalid_cell("Metric", row, "day-numbered"))
        })
        .collect::<crate::Result<Vec<i64>>>()?;

    let retention = metrics
        .clone()
        .lazy()
        .filter(col("Metric").str().contains_literal(lit(RETENTION_METRIC)))
        .collect()?;
    let periods: Vec<String> = days.iter().map(|day| format!("Day {day}")).collect();

    let mut retention = retention;
    retention.with_column(Series::new("Day".into(), days))?;
    retention.with_column(Series::new("Period".into(), periods))?;

    Ok(retention.sort(["Day"], SortMultipleOptions::default().with_maintain_order(true))?)
}

/// Lines comparing day 1/7/30 retention across app cohorts
pub fn retention_chart(dir: &Path) -> crate::Result<PathBuf> {
    let metrics = load_table(&dir.join(MARKET_METRICS_CSV), &MARKET_METRIC_COLUMNS)?;
    let retention = retention_rows(&metrics)?;

    let spec = ChartSpec::new(
        "Fitness App Retention Comparison",
        ChartKind::Line,
        Encoding::Categories {
            category: "Period".to_string(),
            series: vec![
                ValueSeries::new("Fitness_Apps_General", "General Apps"),
                ValueSeries::new("Top_Performers", "Top Perform"),
                ValueSeries::new("Industry_Benchmark", "Industry Bmk"),
            ],
        },
    )
    .palette(&[TEAL, PEACH, SAND])
    .axis_titles("Time Period", "Retention %")
    .ticks(TickFormat::suffix("%"));

    let output = dir.join(RETENTION_CHART);
    render_chart(&retention, &spec, &output)?;

    println!("Chart saved successfully!");
    println!("Retention data:");
    println!("{}", render_table(&retention.select(MARKET_METRIC_COLUMNS)?)?);
    Ok(output)
}

/// Scatter of demand against revenue, sized by advantage and coloured by difficulty
pub fn opportunity_chart(dir: &Path) -> crate::Result<PathBuf> {
    let mut df = load_table(&dir.join(OPPORTUNITY_CSV), &OPPORTUNITY_COLUMNS)?;
    with_short_labels(&mut df, OPPORTUNITY_CSV, "Feature", "Feature_Short")?;

    let spec = ChartSpec::new(
        "Product Feature Opportunity Matrix",
        ChartKind::Scatter,
        Encoding::Points {
            x: "User_Demand".to_string(),
            y: "Revenue_Potential".to_string(),
            size: "Competitive_Advantage".to_string(),
            color: "Implementation_Difficulty".to_string(),
            text: "Feature_Short".to_string(),
            color_title: "Implement Diff".to_string(),
            max_marker_px: 40,
        },
    )
    .axis_titles("User Demand", "Revenue Pot")
    .legend(LegendPosition::Hidden)
    .size(1000, 700);

    let output = dir.join(OPPORTUNITY_CHART);
    render_chart(&df, &spec, &output)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::f64_values;

    #[test]
    fn test_day_number() {
        assert_eq!(day_number("Day 1 Retention Rate"), Some(1));
        assert_eq!(day_number("Day 30 Retention Rate"), Some(30));
        assert_eq!(day_number("Premium Conversion Rate"), None);
    }

    #[test]
    fn test_retention_rows() {
        let metrics = df!(
            "Metric" => &[
                "Day 30 Retention Rate",
                "Premium Conversion Rate",
                "Day 1 Retention Rate",
                "Day 7 Retention Rate",
            ],
            "Fitness_Apps_General" => &[8.0, 3.5, 27.0, 12.0],
            "Top_Performers" => &[15i64, 8, 45, 25],
            "Industry_Benchmark" => &[12.0, 5.5, 35.0, 18.0],
        )
        .unwrap();

        let retention = retention_rows(&metrics).unwrap();

        assert_eq!(
            str_values(&retention, MARKET_METRICS_CSV, "Period").unwrap(),
            vec!["Day 1", "Day 7", "Day 30"]
        );
        assert_eq!(
            f64_values(&retention, MARKET_METRICS_CSV, "Top_Performers").unwrap(),
            vec![45.0, 25.0, 15.0]
        );
    }

    #[test]
    fn test_retention_rows_requires_day_number() {
        let metrics = df!(
            "Metric" => &["Weekly Retention Rate"],
            "Fitness_Apps_General" => &[8.0],
            "Top_Performers" => &[15i64],
            "Industry_Benchmark" => &[12.0],
        )
        .unwrap();

        assert!(matches!(
            retention_rows(&metrics),
            Err(InsightError::InvalidCell { .. })
        ));
    }

    #[test]
    fn test_retention_error_reports_file_row() {
        let metrics = df!(
            "Metric" => &[
                "Day 1 Retention Rate",
                "Premium Conversion Rate",
                "Average Session Length (minutes)",
                "Weekly Retention Rate",
            ],
            "Fitness_Apps_General" => &[27.0, 3.5, 7.5, 8.0],
            "Top_Performers" => &[45i64, 8, 12, 15],
            "Industry_Benchmark" => &[35.0, 5.5, 9.0, 12.0],
        )
        .unwrap();

        match retention_rows(&metrics) {
            Err(InsightError::InvalidCell { column, row, .. }) => {
                assert_eq!(column, "Metric");
                assert_eq!(row, 3);
            }
            other => panic!("expected InvalidCell, got {other:?}"),
        }
    }

    #[test]
    fn test_pain_point_rows_ascending_and_stable() {
        let pain_points = df!(
            "Challenge" => &[
                "Equipment Durability Issues",
                "Workout Plateau",
                "Progress Tracking Difficulty",
                "Form",
            ],
            "Frequency_Mentioned" => &[85i64, 40, 85, 40],
            "Severity_Score" => &[9.2, 6.5, 7.1, 5.0],
        )
        .unwrap();

        let rows = pain_point_rows(&pain_points).unwrap();

        assert_eq!(
            str_values(&rows, PAIN_POINTS_CSV, "Challenge_Short").unwrap(),
            vec!["Workout Plateau", "Form", "Equipment Durab", "Progress Tracki"]
        );
        assert_eq!(
            f64_values(&rows, PAIN_POINTS_CSV, "Severity_Score").unwrap(),
            vec![6.5, 5.0, 9.2, 7.1]
        );
    }
}
