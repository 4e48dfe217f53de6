//! Benchmark charting tool.
//!
//! Reads benchmark result files, groups raw timing records by benchmark,
//! template argument and input size, and writes one log-log error-bar chart
//! per benchmark into a multi-page PDF.
//!
//! Pipeline: parse CLI → resolve config → load and merge inputs →
//!           summarize → render → write document.

mod cli;
mod config;
mod verbose;

use std::process::ExitCode;

use anyhow::Result;
use benchgraph_perf::bench_analysis::BenchDataset;
use benchgraph_perf::chart::{plan_pages, render_pages};
use benchgraph_perf::naming::NameError;
use benchgraph_perf::output::print_summary_table;
use benchgraph_perf::pdf::PdfDocument;
use benchgraph_perf::wire::load_results;
use clap::Parser;
use tracing::{info, warn};

use verbose::Timer;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    verbose::init(cli.quiet, cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(name_err) = err.downcast_ref::<NameError>() {
                println!("Error: {name_err}");
            } else {
                eprintln!("Error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &cli::Cli) -> Result<()> {
    let resolved = config::resolve(cli)?;

    let dataset = load_dataset(&resolved.inputs)?;
    if dataset.is_empty() {
        warn!("no raw benchmark records found, the document will have no pages");
    }

    let pages = {
        let _t = Timer::start("summarizing");
        plan_pages(&dataset, &resolved.options)?
    };

    if resolved.summary {
        print_summary_table(&pages);
    }

    let mut doc = PdfDocument::new(resolved.page_size).with_title("Benchmark results");
    {
        let _t = Timer::start("rendering");
        render_pages(&mut doc, &pages)?;
    }

    let page_count = doc.page_count();
    doc.save(&resolved.output)?;
    info!(
        "wrote {} ({page_count} page{})",
        resolved.output.display(),
        if page_count == 1 { "" } else { "s" }
    );
    Ok(())
}

/// Load every input file in order and merge the raw records.
///
/// Stops at the first naming violation, returning the [`NameError`] itself so
/// the caller can recognize it.
fn load_dataset(inputs: &[std::path::PathBuf]) -> Result<BenchDataset> {
    let _t = Timer::start("loading inputs");
    let mut dataset = BenchDataset::new();

    for path in inputs {
        let results = load_results(path)?;
        let total = results.benchmarks.len();
        let counts = dataset.extend_from_results(results)?;
        info!(
            "loaded {}: {total} records ({} raw, {} derived statistics skipped)",
            path.display(),
            counts.inserted,
            counts.skipped
        );
    }
    Ok(dataset)
}
