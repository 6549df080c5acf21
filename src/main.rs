//! X3 Insights: runs one research pipeline (or all of them) to completion
//!
//! Summaries go to stdout; diagnostics go to stderr through `tracing`,
//! filtered by `RUST_LOG`.

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use x3_insights::Args;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.verbose {
        println!("X3 Insights - Market Research Pipelines");
        println!("=======================================\n");
        println!("Working directory: {}", args.dir.display());
    }

    let start_time = Instant::now();
    let steps = args.selected().expand();

    for (i, pipeline) in steps.iter().enumerate() {
        if args.verbose {
            println!("\nStep {}: {}", i + 1, pipeline.name());
        }

        let step_start = Instant::now();
        let written = pipeline
            .run(&args.dir)
            .with_context(|| format!("pipeline '{}' failed", pipeline.name()))?;

        for path in &written {
            println!("✓ Saved {}", path.display());
        }
        if args.verbose {
            println!("  Processing time: {:.2}s", step_start.elapsed().as_secs_f64());
        }
    }

    if args.verbose {
        println!("\n=== Pipeline Complete ===");
        println!(
            "Total processing time: {:.2}s",
            start_time.elapsed().as_secs_f64()
        );
    }

    Ok(())
}
