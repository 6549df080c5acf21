//! Integration tests for X3 Insights

use std::path::Path;

use polars::prelude::*;
use tempfile::tempdir;
use x3_insights::data::{f64_values, str_values};
use x3_insights::datasets::{
    MARKET_METRICS_CSV, OPPORTUNITY_CHART, OPPORTUNITY_CSV, PAIN_POINTS_CHART, PAIN_POINTS_CSV,
    PRICING_CHART, PRICING_CSV, RETENTION_CHART, SEGMENTS_CSV, SENTIMENT_CHART, SENTIMENT_CSV,
};
use x3_insights::{export_table, load_table, pipelines, InsightError, Pipeline};

fn assert_png(path: &Path) {
    let bytes = std::fs::read(path).unwrap();
    assert!(bytes.len() > 8, "{} is empty", path.display());
    assert_eq!(&bytes[..4], b"\x89PNG", "{} is not a PNG", path.display());
}

#[test]
fn test_end_to_end_pipeline() {
    let temp_dir = tempdir().unwrap();
    let dir = temp_dir.path();

    let written = Pipeline::All.run(dir).unwrap();
    assert_eq!(written.len(), 11);

    for csv in [
        PAIN_POINTS_CSV,
        MARKET_METRICS_CSV,
        SENTIMENT_CSV,
        PRICING_CSV,
        OPPORTUNITY_CSV,
        SEGMENTS_CSV,
    ] {
        assert!(dir.join(csv).is_file(), "missing {csv}");
    }
    for chart in [
        PAIN_POINTS_CHART,
        SENTIMENT_CHART,
        PRICING_CHART,
        RETENTION_CHART,
        OPPORTUNITY_CHART,
    ] {
        assert_png(&dir.join(chart));
    }
}

#[test]
fn test_opportunity_matrix_contract() {
    let temp_dir = tempdir().unwrap();
    let dir = temp_dir.path();

    pipelines::opportunity_matrix(dir).unwrap();
    let matrix = load_table(&dir.join(OPPORTUNITY_CSV), &[]).unwrap();

    let names: Vec<&str> = matrix.get_column_names().iter().map(|n| n.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Feature",
            "User_Demand",
            "Implementation_Difficulty",
            "Revenue_Potential",
            "Competitive_Advantage",
            "Priority_Score",
        ]
    );

    let features = str_values(&matrix, OPPORTUNITY_CSV, "Feature").unwrap();
    let scores = f64_values(&matrix, OPPORTUNITY_CSV, "Priority_Score").unwrap();
    assert_eq!(features[0], "X3-Specific Optimization");
    assert!((scores[0] - 58.5).abs() < 1e-9);

    let ai = features
        .iter()
        .position(|f| f == "AI Workout Adaptation")
        .unwrap();
    assert!((scores[ai] - 53.25).abs() < 1e-9);
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));

    let segments = load_table(&dir.join(SEGMENTS_CSV), &["User_Segment"]).unwrap();
    assert_eq!(segments.height(), 5);
}

#[test]
fn test_research_tables_round_trip() {
    let temp_dir = tempdir().unwrap();
    let dir = temp_dir.path();

    pipelines::research_tables(dir).unwrap();
    let metrics = load_table(&dir.join(MARKET_METRICS_CSV), &[]).unwrap();
    let seed = x3_insights::datasets::market_metrics().unwrap();

    assert_eq!(metrics.get_column_names(), seed.get_column_names());
    assert_eq!(
        str_values(&metrics, MARKET_METRICS_CSV, "Metric").unwrap(),
        str_values(&seed, MARKET_METRICS_CSV, "Metric").unwrap()
    );
    for column in ["Fitness_Apps_General", "Top_Performers", "Industry_Benchmark"] {
        assert_eq!(
            f64_values(&metrics, MARKET_METRICS_CSV, column).unwrap(),
            f64_values(&seed, MARKET_METRICS_CSV, column).unwrap(),
            "{column}"
        );
    }
}

#[test]
fn test_render_requires_producer_output() {
    let temp_dir = tempdir().unwrap();

    let result = pipelines::opportunity_chart(temp_dir.path());
    assert!(matches!(result, Err(InsightError::DataLoad { .. })));
    assert!(!temp_dir.path().join(OPPORTUNITY_CHART).exists());
}

#[test]
fn test_render_with_missing_column_writes_no_image() {
    let temp_dir = tempdir().unwrap();
    let dir = temp_dir.path();

    // A matrix written without the derived score column
    let mut matrix = x3_insights::datasets::feature_opportunities().unwrap();
    export_table(&mut matrix, &dir.join(OPPORTUNITY_CSV)).unwrap();

    let result = pipelines::opportunity_chart(dir);
    match result {
        Err(InsightError::ColumnMissing { column, .. }) => assert_eq!(column, "Priority_Score"),
        other => panic!("expected ColumnMissing, got {other:?}"),
    }
    assert!(!dir.join(OPPORTUNITY_CHART).exists());
}

#[test]
fn test_sentiment_rows_need_not_sum_to_100() {
    let temp_dir = tempdir().unwrap();
    let dir = temp_dir.path();

    let mut sentiment = df!(
        "Category" => &["Equipment Quality", "Marketing Claims", "Cost Value"],
        "Positive" => &[90i64, 10, 25],
        "Neutral" => &[30i64, 10, 35],
        "Negative" => &[10i64, 10, 40],
    )
    .unwrap();
    export_table(&mut sentiment, &dir.join(SENTIMENT_CSV)).unwrap();

    let output = pipelines::sentiment_chart(dir).unwrap();
    assert_png(&output);
}

#[test]
fn test_rerun_overwrites_outputs() {
    let temp_dir = tempdir().unwrap();
    let dir = temp_dir.path();

    pipelines::research_tables(dir).unwrap();
    let first = std::fs::read(dir.join(PRICING_CSV)).unwrap();
    pipelines::research_tables(dir).unwrap();
    let second = std::fs::read(dir.join(PRICING_CSV)).unwrap();
    assert_eq!(first, second);

    pipelines::pricing_chart(dir).unwrap();
    pipelines::pricing_chart(dir).unwrap();
    assert_png(&dir.join(PRICING_CHART));

    // Only the outputs remain: no temporary files left behind
    let leftovers = std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with('.'))
        .count();
    assert_eq!(leftovers, 0);
}
