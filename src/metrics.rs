//! Feature prioritisation: weighted priority score and ranking

use polars::prelude::*;
use tracing::debug;

use crate::data::{f64_values, require_columns, str_values};
use crate::datasets::{FEATURE_COLUMNS, PRIORITY_SCORE};

pub const DEMAND_WEIGHT: f64 = 0.3;
pub const REVENUE_WEIGHT: f64 = 0.25;
pub const ADVANTAGE_WEIGHT: f64 = 0.25;
pub const DIFFICULTY_WEIGHT: f64 = 0.2;

const FEATURE_TABLE: &str = "feature opportunities";
const RANKED_TABLE: &str = "ranked features";

/// Scored dimensions of a single feature, each on a 0–100 scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureScores {
    pub user_demand: f64,
    pub implementation_difficulty: f64,
    pub revenue_potential: f64,
    pub competitive_advantage: f64,
}

impl FeatureScores {
    /// Weighted priority: demand, revenue and advantage count for, difficulty counts against.
    ///
    /// Terms are summed left to right in a fixed order so the result is reproducible bit-for-bit.
    pub fn priority_score(&self) -> f64 {
        self.user_demand * DEMAND_WEIGHT
            + self.revenue_potential * REVENUE_WEIGHT
            + self.competitive_advantage * ADVANTAGE_WEIGHT
            - self.implementation_difficulty * DIFFICULTY_WEIGHT
    }
}

/// Add a `Priority_Score` column and sort rows by it, highest first.
///
/// The sort is stable: features with equal scores keep their input order.
pub fn rank_by_priority(df: &DataFrame) -> crate::Result<DataFrame> {
    require_columns(df, FEATURE_TABLE, &FEATURE_COLUMNS)?;

    let demand = f64_values(df, FEATURE_TABLE, "User_Demand")?;
    let difficulty = f64_values(df, FEATURE_TABLE, "Implementation_Difficulty")?;
    let revenue = f64_values(df, FEATURE_TABLE, "Revenue_Potential")?;
    let advantage = f64_values(df, FEATURE_TABLE, "Competitive_Advantage")?;

    let scores: Vec<f64> = (0..df.height())
        .map(|i| {
            FeatureScores {
                user_demand: demand[i],
                implementation_difficulty: difficulty[i],
                revenue_potential: revenue[i],
                competitive_advantage: advantage[i],
            }
            .priority_score()
        })
        .collect();

    let mut scored = df.clone();
    scored.with_column(Series::new(PRIORITY_SCORE.into(), scores))?;

    let ranked = scored.sort(
        [PRIORITY_SCORE],
        SortMultipleOptions::default()
            .with_order_descending(true)
            .with_maintain_order(true),
    )?;

    debug!(features = ranked.height(), "ranked features by priority");
    Ok(ranked)
}

/// The first `n` rows of a ranked table as (feature, score) pairs
pub fn top_features(ranked: &DataFrame, n: usize) -> crate::Result<Vec<(String, f64)>> {
    let head = ranked.head(Some(n));
    let features = str_values(&head, RANKED_TABLE, "Feature")?;
    let scores = f64_values(&head, RANKED_TABLE, PRIORITY_SCORE)?;
    Ok(features.into_iter().zip(scores).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasets;

    #[test]
    fn test_priority_score_literal() {
        let scores = FeatureScores {
            user_demand: 85.0,
            implementation_difficulty: 80.0,
            revenue_potential: 85.0,
            competitive_advantage: 90.0,
        };
        assert!((scores.priority_score() - 53.25).abs() < 1e-9);
    }

    #[test]
    fn test_rank_matches_formula_for_every_row() {
        let ranked = rank_by_priority(&datasets::feature_opportunities().unwrap()).unwrap();

        let demand = f64_values(&ranked, RANKED_TABLE, "User_Demand").unwrap();
        let difficulty =
            f64_values(&ranked, RANKED_TABLE, "Implementation_Difficulty").unwrap();
        let revenue = f64_values(&ranked, RANKED_TABLE, "Revenue_Potential").unwrap();
        let advantage = f64_values(&ranked, RANKED_TABLE, "Competitive_Advantage").unwrap();
        let priority = f64_values(&ranked, RANKED_TABLE, PRIORITY_SCORE).unwrap();

        for i in 0..ranked.height() {
            let expected =
                0.30 * demand[i] + 0.25 * revenue[i] + 0.25 * advantage[i] - 0.20 * difficulty[i];
            assert!((priority[i] - expected).abs() < 1e-9, "row {i}");
        }
        assert!(priority.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_rank_order_of_seed_features() {
        let ranked = rank_by_priority(&datasets::feature_opportunities().unwrap()).unwrap();
        let features = str_values(&ranked, RANKED_TABLE, "Feature").unwrap();

        assert_eq!(
            features,
            vec![
                "X3-Specific Optimization",
                "Motivation Coaching",
                "AI Workout Adaptation",
                "Plateau Detection",
                "Basic Progress Tracking",
                "Nutrition Integration",
                "Form Analysis",
                "Community Features",
            ]
        );
    }

    #[test]
    fn test_rank_is_stable_for_ties() {
        let df = df!(
            "Feature" => &["First", "Second", "Third", "Fourth"],
            "User_Demand" => &[50i64, 60, 50, 50],
            "Implementation_Difficulty" => &[10i64, 10, 10, 10],
            "Revenue_Potential" => &[40i64, 40, 40, 40],
            "Competitive_Advantage" => &[40i64, 40, 40, 40],
        )
        .unwrap();

        let ranked = rank_by_priority(&df).unwrap();
        assert_eq!(
            str_values(&ranked, RANKED_TABLE, "Feature").unwrap(),
            vec!["Second", "First", "Third", "Fourth"]
        );
    }

    #[test]
    fn test_rank_requires_score_columns() {
        let df = df!("Feature" => &["Lonely"], "User_Demand" => &[10i64]).unwrap();
        assert!(matches!(
            rank_by_priority(&df),
            Err(crate::InsightError::ColumnMissing { .. })
        ));
    }

    #[test]
    fn test_top_features() {
        let ranked = rank_by_priority(&datasets::feature_opportunities().unwrap()).unwrap();
        let top = top_features(&ranked, 3).unwrap();

        assert_eq!(top.len(), 3);
        assert_eq!(top[0].0, "X3-Specific Optimization");
        assert!((top[0].1 - 58.5).abs() < 1e-9);
        assert!((top[2].1 - 53.25).abs() < 1e-9);
    }
}
