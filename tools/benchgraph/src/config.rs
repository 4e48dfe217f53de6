//! Chart configuration.
//!
//! Settings are layered: built-in defaults, then an optional TOML file given
//! with `--config`, then command-line flags.
//!
//! ```toml
//! [chart]
//! output = "graphs.pdf"
//! confidence = 0.99
//! page_width = 842
//! page_height = 595
//! label_prefix = "INITIAL_SIZE"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use benchgraph_perf::chart::{ChartOptions, DEFAULT_CONFIDENCE, DEFAULT_LABEL_PREFIX};
use benchgraph_perf::pdf::A4_LANDSCAPE;
use serde::Deserialize;

use crate::cli::Cli;

/// Output document written when neither the CLI nor the config names one.
pub const DEFAULT_OUTPUT: &str = "graphs.pdf";

/// Top-level configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Chart settings.
    #[serde(default)]
    pub chart: ChartSection,
}

/// The `[chart]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChartSection {
    /// Output PDF path.
    pub output: Option<PathBuf>,
    /// Confidence level for the error bars.
    pub confidence: Option<f64>,
    /// Page width in points.
    pub page_width: Option<u32>,
    /// Page height in points.
    pub page_height: Option<u32>,
    /// Legend label prefix (`<prefix>=<template>`).
    pub label_prefix: Option<String>,
}

impl FileConfig {
    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Parse configuration from TOML text.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Fully resolved settings for one run.
#[derive(Debug)]
pub struct ResolvedConfig {
    /// Input result files, in command-line order.
    pub inputs: Vec<PathBuf>,
    /// Output PDF path.
    pub output: PathBuf,
    /// Chart planning options.
    pub options: ChartOptions,
    /// Page size in points.
    pub page_size: (u32, u32),
    /// Whether to print the summary table.
    pub summary: bool,
}

/// Resolve the configuration for a parsed command line.
pub fn resolve(cli: &Cli) -> Result<ResolvedConfig> {
    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    resolve_layers(cli, file.chart)
}

fn resolve_layers(cli: &Cli, chart: ChartSection) -> Result<ResolvedConfig> {
    let confidence = cli
        .confidence
        .or(chart.confidence)
        .unwrap_or(DEFAULT_CONFIDENCE);
    if !(confidence > 0.0 && confidence < 1.0) {
        bail!("confidence level must be strictly between 0 and 1, got {confidence}");
    }

    let page_size = (
        chart.page_width.unwrap_or(A4_LANDSCAPE.0),
        chart.page_height.unwrap_or(A4_LANDSCAPE.1),
    );
    if page_size.0 == 0 || page_size.1 == 0 {
        bail!("page size must be non-zero, got {}x{}", page_size.0, page_size.1);
    }

    let output = cli
        .output
        .clone()
        .or(chart.output)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    Ok(ResolvedConfig {
        inputs: cli.inputs.clone(),
        output,
        options: ChartOptions {
            confidence,
            label_prefix: chart
                .label_prefix
                .unwrap_or_else(|| DEFAULT_LABEL_PREFIX.to_string()),
        },
        page_size,
        summary: cli.summary,
    })
}
