//! Command-line interface definitions for benchgraph.

use std::path::PathBuf;

use clap::Parser;

/// Chart benchmark results with confidence intervals.
#[derive(Parser)]
#[command(name = "benchgraph", version, about)]
pub struct Cli {
    /// Benchmark result files (JSON) to merge and chart.
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// Output PDF path (default: graphs.pdf).
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Confidence level for the error bars, in (0, 1) (default: 0.99).
    #[arg(long, short = 'c')]
    pub confidence: Option<f64>,

    /// TOML file with `[chart]` settings.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print a per-benchmark summary table.
    #[arg(long)]
    pub summary: bool,

    /// Only report warnings and errors.
    #[arg(long, short = 'q', conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable verbose output with per-page details and timings.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inputs_are_required() {
        assert!(Cli::try_parse_from(["benchgraph"]).is_err());
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from([
            "benchgraph",
            "a.json",
            "b.json",
            "-o",
            "out.pdf",
            "-c",
            "0.95",
            "--summary",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.inputs, vec![PathBuf::from("a.json"), PathBuf::from("b.json")]);
        assert_eq!(cli.output, Some(PathBuf::from("out.pdf")));
        assert_eq!(cli.confidence, Some(0.95));
        assert!(cli.summary);
        assert!(cli.verbose);
        assert!(!cli.quiet);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["benchgraph", "a.json", "-q", "-v"]).is_err());
    }
}
