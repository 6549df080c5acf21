//! Command-line interface definitions and pipeline dispatch

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::pipelines;

/// Market-research tables and charts for the X3 training app
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Pipeline to run; every pipeline runs when omitted
    #[command(subcommand)]
    pub pipeline: Option<Pipeline>,

    /// Directory every input and output file name is resolved against
    #[arg(short, long, default_value = ".", global = true)]
    pub dir: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Args {
    /// The selected pipeline, `All` when no subcommand was given
    pub fn selected(&self) -> Pipeline {
        self.pipeline.unwrap_or(Pipeline::All)
    }
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    /// Build and save the pain point, market metric, sentiment and pricing tables
    ResearchTables,
    /// Score and rank features, save the opportunity matrix and user segments
    OpportunityMatrix,
    /// Render the pain points bar chart
    PainPointsChart,
    /// Render the sentiment stacked bar chart
    SentimentChart,
    /// Render the pricing bar chart
    PricingChart,
    /// Render the retention line chart
    RetentionChart,
    /// Render the feature opportunity scatter chart
    OpportunityChart,
    /// Run every pipeline, producers before consumers
    All,
}

impl Pipeline {
    /// Pipelines in an order where every input file is written before it is read
    pub const ORDERED: [Pipeline; 7] = [
        Pipeline::ResearchTables,
        Pipeline::OpportunityMatrix,
        Pipeline::PainPointsChart,
        Pipeline::SentimentChart,
        Pipeline::PricingChart,
        Pipeline::RetentionChart,
        Pipeline::OpportunityChart,
    ];

    /// The concrete pipelines this selection runs
    pub fn expand(self) -> Vec<Pipeline> {
        match self {
            Pipeline::All => Self::ORDERED.to_vec(),
            single => vec![single],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Pipeline::ResearchTables => "research-tables",
            Pipeline::OpportunityMatrix => "opportunity-matrix",
            Pipeline::PainPointsChart => "pain-points-chart",
            Pipeline::SentimentChart => "sentiment-chart",
            Pipeline::PricingChart => "pricing-chart",
            Pipeline::RetentionChart => "retention-chart",
            Pipeline::OpportunityChart => "opportunity-chart",
            Pipeline::All => "all",
        }
    }

    /// Run one concrete pipeline in `dir`, returning the files it wrote
    pub fn run(self, dir: &Path) -> crate::Result<Vec<PathBuf>> {
        match self {
            Pipeline::ResearchTables => pipelines::research_tables(dir),
            Pipeline::OpportunityMatrix => pipelines::opportunity_matrix(dir),
            Pipeline::PainPointsChart => pipelines::pain_points_chart(dir).map(|p| vec![p]),
            Pipeline::SentimentChart => pipelines::sentiment_chart(dir).map(|p| vec![p]),
            Pipeline::PricingChart => pipelines::pricing_chart(dir).map(|p| vec![p]),
            Pipeline::RetentionChart => pipelines::retention_chart(dir).map(|p| vec![p]),
            Pipeline::OpportunityChart => pipelines::opportunity_chart(dir).map(|p| vec![p]),
            Pipeline::All => {
                let mut written = Vec::new();
                for pipeline in Self::ORDERED {
                    written.extend(pipeline.run(dir)?);
                }
                Ok(written)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = Args::try_parse_from(["x3-insights", "sentiment-chart"]).unwrap();
        assert_eq!(args.selected(), Pipeline::SentimentChart);
        assert_eq!(args.dir, PathBuf::from("."));
        assert!(!args.verbose);

        let args =
            Args::try_parse_from(["x3-insights", "all", "--dir", "out", "--verbose"]).unwrap();
        assert_eq!(args.selected(), Pipeline::All);
        assert_eq!(args.dir, PathBuf::from("out"));
        assert!(args.verbose);

        assert!(Args::try_parse_from(["x3-insights", "bubble-chart"]).is_err());
    }

    #[test]
    fn test_no_arguments_runs_everything() {
        let args = Args::try_parse_from(["x3-insights"]).unwrap();
        assert_eq!(args.pipeline, None);
        assert_eq!(args.selected(), Pipeline::All);
        assert_eq!(args.dir, PathBuf::from("."));
        assert!(!args.verbose);

        let args = Args::try_parse_from(["x3-insights", "--dir", "out"]).unwrap();
        assert_eq!(args.selected(), Pipeline::All);
        assert_eq!(args.dir, PathBuf::from("out"));
    }

    #[test]
    fn test_names_match_subcommands() {
        for pipeline in Pipeline::ORDERED {
            let args = Args::try_parse_from(["x3-insights", pipeline.name()]).unwrap();
            assert_eq!(args.pipeline, Some(pipeline));
        }
    }

    #[test]
    fn test_expand_all_runs_producers_first() {
        let order = Pipeline::All.expand();
        assert_eq!(order.len(), 7);
        assert_eq!(order[0], Pipeline::ResearchTables);
        assert_eq!(order[1], Pipeline::OpportunityMatrix);
        assert_eq!(Pipeline::RetentionChart.expand(), vec![Pipeline::RetentionChart]);
    }
}
