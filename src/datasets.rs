//! Seed research data and the file contract between pipelines
//!
//! Compute pipelines write the files named here; render pipelines read them
//! back and require the listed columns. Nothing checks that a producer ran
//! before its consumer beyond the load failing when the file is absent.

use polars::prelude::*;

pub const PAIN_POINTS_CSV: &str = "x3_pain_points.csv";
pub const MARKET_METRICS_CSV: &str = "fitness_app_metrics.csv";
pub const SENTIMENT_CSV: &str = "x3_sentiment.csv";
pub const PRICING_CSV: &str = "app_pricing_data.csv";
pub const OPPORTUNITY_CSV: &str = "feature_opportunity_matrix.csv";
pub const SEGMENTS_CSV: &str = "user_segments.csv";

pub const PAIN_POINTS_CHART: &str = "x3_pain_points_chart.png";
pub const SENTIMENT_CHART: &str = "sentiment_chart.png";
pub const PRICING_CHART: &str = "fitness_app_pricing_chart.png";
pub const RETENTION_CHART: &str = "fitness_retention_chart.png";
pub const OPPORTUNITY_CHART: &str = "feature_opportunity_matrix.png";

pub const PAIN_POINT_COLUMNS: [&str; 4] = [
    "Challenge",
    "Frequency_Mentioned",
    "Severity_Score",
    "Solution_Complexity",
];

pub const MARKET_METRIC_COLUMNS: [&str; 4] = [
    "Metric",
    "Fitness_Apps_General",
    "Top_Performers",
    "Industry_Benchmark",
];

pub const SENTIMENT_COLUMNS: [&str; 4] = ["Category", "Positive", "Neutral", "Negative"];

pub const PRICING_COLUMNS: [&str; 5] = [
    "App_Category",
    "Low_Price",
    "Avg_Price",
    "High_Price",
    "Market_Examples",
];

/// Scored feature columns, before the derived priority score is added
pub const FEATURE_COLUMNS: [&str; 5] = [
    "Feature",
    "User_Demand",
    "Implementation_Difficulty",
    "Revenue_Potential",
    "Competitive_Advantage",
];

pub const PRIORITY_SCORE: &str = "Priority_Score";

/// Columns `feature_opportunity_matrix.csv` must carry for the opportunity chart
pub const OPPORTUNITY_COLUMNS: [&str; 6] = [
    "Feature",
    "User_Demand",
    "Implementation_Difficulty",
    "Revenue_Potential",
    "Competitive_Advantage",
    PRIORITY_SCORE,
];

pub const SEGMENT_COLUMNS: [&str; 5] = [
    "User_Segment",
    "Market_Size",
    "Pain_Level",
    "Willingness_to_Pay",
    "Conversion_Probability",
];

pub fn pain_points() -> PolarsResult<DataFrame> {
    df!(
        "Challenge" => &[
            "Lack of Motivation/Consistency",
            "Progression Difficulties",
            "Limited Exercise Variety",
            "No Progress Tracking",
            "Durability Issues",
            "High Cost Barrier",
            "Mental Toughness Required",
            "Knowledge Gap",
        ],
        "Frequency_Mentioned" => &[85i64, 70, 45, 60, 30, 40, 75, 35],
        "Severity_Score" => &[9i64, 8, 6, 7, 5, 6, 8, 5],
        "Solution_Complexity" => &["High", "Medium", "Low", "Low", "Medium", "High", "High", "Medium"],
    )
}

pub fn market_metrics() -> PolarsResult<DataFrame> {
    df!(
        "Metric" => &[
            "Day 1 Retention Rate",
            "Day 7 Retention Rate",
            "Day 30 Retention Rate",
            "Average Session Length (minutes)",
            "Premium Conversion Rate",
            "Average Monthly Subscription",
        ],
        "Fitness_Apps_General" => &[27.0, 12.0, 8.0, 7.5, 3.5, 12.0],
        "Top_Performers" => &[45i64, 25, 15, 12, 8, 15],
        "Industry_Benchmark" => &[35.0, 18.0, 12.0, 9.0, 5.5, 13.5],
    )
}

pub fn sentiment() -> PolarsResult<DataFrame> {
    df!(
        "Category" => &[
            "Equipment Quality",
            "Marketing Claims",
            "Results Effectiveness",
            "Cost Value",
            "Progression System",
            "Consistency Challenges",
        ],
        "Positive" => &[75i64, 15, 65, 25, 30, 20],
        "Neutral" => &[15i64, 25, 25, 35, 35, 30],
        "Negative" => &[10i64, 60, 10, 40, 35, 50],
    )
}

pub fn pricing() -> PolarsResult<DataFrame> {
    df!(
        "App_Category" => &[
            "Basic Tracking",
            "AI-Powered Coaching",
            "Premium Features",
            "Enterprise/Professional",
        ],
        "Low_Price" => &[0i64, 5, 10, 25],
        "Avg_Price" => &[3i64, 12, 18, 40],
        "High_Price" => &[8i64, 25, 35, 80],
        "Market_Examples" => &[
            "MyFitnessPal Free",
            "Freeletics, FitnessAI",
            "Peloton, Future",
            "Personal Training Apps",
        ],
    )
}

/// Feature scores before prioritisation
pub fn feature_opportunities() -> PolarsResult<DataFrame> {
    df!(
        "Feature" => &[
            "Basic Progress Tracking",
            "AI Workout Adaptation",
            "Motivation Coaching",
            "X3-Specific Optimization",
            "Community Features",
            "Nutrition Integration",
            "Form Analysis",
            "Plateau Detection",
        ],
        "User_Demand" => &[70i64, 85, 90, 80, 45, 50, 35, 75],
        "Implementation_Difficulty" => &[20i64, 80, 60, 40, 50, 30, 90, 70],
        "Revenue_Potential" => &[40i64, 85, 80, 75, 60, 55, 65, 70],
        "Competitive_Advantage" => &[25i64, 90, 85, 95, 40, 30, 80, 85],
    )
}

pub fn user_segments() -> PolarsResult<DataFrame> {
    df!(
        "User_Segment" => &[
            "New X3 Users",
            "Consistent Users",
            "Struggling Users",
            "Former Users",
            "Fitness Professionals",
        ],
        "Market_Size" => &[25i64, 30, 35, 15, 5],
        "Pain_Level" => &[60i64, 40, 95, 85, 20],
        "Willingness_to_Pay" => &[70i64, 85, 90, 60, 80],
        "Conversion_Probability" => &[65i64, 80, 95, 40, 70],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_columns(df: &DataFrame, columns: &[&str]) -> bool {
        columns.iter().all(|c| df.get_column_index(c).is_some())
    }

    #[test]
    fn test_seed_tables_match_contract() {
        assert!(has_columns(&pain_points().unwrap(), &PAIN_POINT_COLUMNS));
        assert!(has_columns(&market_metrics().unwrap(), &MARKET_METRIC_COLUMNS));
        assert!(has_columns(&sentiment().unwrap(), &SENTIMENT_COLUMNS));
        assert!(has_columns(&pricing().unwrap(), &PRICING_COLUMNS));
        assert!(has_columns(&feature_opportunities().unwrap(), &FEATURE_COLUMNS));
        assert!(has_columns(&user_segments().unwrap(), &SEGMENT_COLUMNS));
    }

    #[test]
    fn test_seed_table_shapes() {
        assert_eq!(pain_points().unwrap().shape(), (8, 4));
        assert_eq!(market_metrics().unwrap().shape(), (6, 4));
        assert_eq!(sentiment().unwrap().shape(), (6, 4));
        assert_eq!(pricing().unwrap().shape(), (4, 5));
        assert_eq!(feature_opportunities().unwrap().shape(), (8, 5));
        assert_eq!(user_segments().unwrap().shape(), (5, 5));
    }
}
