//! X3 Insights: market-research tables and charts for a resistance band training app
//!
//! Compute pipelines build the research tables, derive feature priority scores
//! and save them as CSV. Render pipelines load those files and draw static PNG
//! charts with Plotters.

pub mod chart;
pub mod cli;
pub mod data;
pub mod datasets;
pub mod error;
pub mod metrics;
pub mod pipelines;
pub mod report;
pub mod viz;

// Re-export public items for easier access
pub use chart::{ChartKind, ChartSpec, Encoding, ValueSeries};
pub use cli::{Args, Pipeline};
pub use data::{export_table, load_table, shorten_label, LABEL_MAX_CHARS};
pub use error::InsightError;
pub use metrics::{rank_by_priority, FeatureScores};
pub use viz::render_chart;

/// Common result type used throughout the library
pub type Result<T> = std::result::Result<T, InsightError>;
