//! Benchmark grouping and confidence interval analysis.

use std::collections::BTreeMap;

use anyhow::{Result, anyhow, bail};
use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::statistics::Statistics;

use crate::naming::{BenchName, NameError};
use crate::wire::{BenchRecord, BenchResults};

/// Relative tolerance used when checking interval symmetry.
const SYMMETRY_TOLERANCE: f64 = 1e-6;

/// Records of one template, keyed by input size.
pub type SizeGroups = BTreeMap<u64, Vec<BenchRecord>>;

/// Size groups of one benchmark, keyed by template argument.
pub type TemplateGroups = BTreeMap<String, SizeGroups>;

/// Raw benchmark records grouped by name, template and size.
///
/// Iteration is ordered: names and templates lexicographically, sizes
/// numerically. Records sharing a key keep their insertion order.
#[derive(Debug, Clone, Default)]
pub struct BenchDataset {
    benchmarks: BTreeMap<String, TemplateGroups>,
}

/// Record counts from merging one result file into a dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeCounts {
    /// Raw records added to the dataset.
    pub inserted: usize,
    /// Derived aggregate records skipped.
    pub skipped: usize,
}

impl BenchDataset {
    /// Create an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a single record.
    ///
    /// Returns `Ok(true)` if the record was added and `Ok(false)` if it is a
    /// derived aggregate row (`_mean`, `_median`, `_stddev`) and was skipped.
    pub fn insert(&mut self, record: BenchRecord) -> Result<bool, NameError> {
        let id = BenchName::parse(&record.name)?;
        if !id.is_raw() {
            return Ok(false);
        }

        self.benchmarks
            .entry(id.name)
            .or_default()
            .entry(id.template)
            .or_default()
            .entry(id.size)
            .or_default()
            .push(record);
        Ok(true)
    }

    /// Merge every record of a result file, stopping at the first bad name.
    pub fn extend_from_results(&mut self, results: BenchResults) -> Result<MergeCounts, NameError> {
        let mut counts = MergeCounts::default();
        for record in results.benchmarks {
            if self.insert(record)? {
                counts.inserted += 1;
            } else {
                counts.skipped += 1;
            }
        }
        Ok(counts)
    }

    /// Iterate over benchmarks in name order.
    pub fn benchmarks(&self) -> impl Iterator<Item = (&str, &TemplateGroups)> {
        self.benchmarks.iter().map(|(name, groups)| (name.as_str(), groups))
    }

    /// Look up the template groups of one benchmark.
    pub fn get(&self, name: &str) -> Option<&TemplateGroups> {
        self.benchmarks.get(name)
    }

    /// `real_time` samples of one (name, template, size) group.
    pub fn samples(&self, name: &str, template: &str, size: u64) -> Option<Vec<f64>> {
        self.benchmarks
            .get(name)?
            .get(template)?
            .get(&size)
            .map(|records| records.iter().map(|r| r.real_time).collect())
    }

    /// Number of distinct benchmark names.
    pub fn len(&self) -> usize {
        self.benchmarks.len()
    }

    /// Returns `true` if no raw record has been inserted.
    pub fn is_empty(&self) -> bool {
        self.benchmarks.is_empty()
    }
}

/// Sample mean with the half-width of its confidence interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceSummary {
    /// Arithmetic mean of the samples.
    pub mean: f64,
    /// Distance from the mean to either end of the interval.
    pub half_width: f64,
}

impl ConfidenceSummary {
    /// A degenerate interval around a single value.
    pub fn point(mean: f64) -> Self {
        Self {
            mean,
            half_width: 0.0,
        }
    }

    /// Lower end of the interval.
    pub fn lower(&self) -> f64 {
        self.mean - self.half_width
    }

    /// Upper end of the interval.
    pub fn upper(&self) -> f64 {
        self.mean + self.half_width
    }
}

/// Compute the mean and two-sided Student's t confidence interval.
///
/// With one sample, or when every sample is equal, the interval collapses to
/// the mean (`half_width == 0`).
#[allow(clippy::float_cmp)]
pub fn mean_interval(confidence: f64, samples: &[f64]) -> Result<ConfidenceSummary> {
    if !(confidence > 0.0 && confidence < 1.0) {
        bail!("confidence level must be between 0 and 1 (exclusive), got {confidence}");
    }
    let Some(&first) = samples.first() else {
        bail!("cannot compute a confidence interval without samples");
    };

    let mean = samples.iter().mean();
    if samples.len() == 1 || samples.iter().all(|&s| s == first) {
        return Ok(ConfidenceSummary::point(mean));
    }

    let n = samples.len() as f64;
    let standard_error = samples.iter().std_dev() / n.sqrt();
    if standard_error == 0.0 {
        return Ok(ConfidenceSummary::point(mean));
    }

    let dist = StudentsT::new(mean, standard_error, n - 1.0)
        .map_err(|e| anyhow!("building t distribution (se = {standard_error}, n = {n}): {e}"))?;
    let tail = (1.0 - confidence) / 2.0;
    let lower = dist.inverse_cdf(tail);
    let upper = dist.inverse_cdf(1.0 - tail);

    let below = mean - lower;
    let above = upper - mean;
    if !is_close(below, above) {
        bail!("asymmetric confidence interval around {mean}: -{below} / +{above}");
    }

    Ok(ConfidenceSummary {
        mean,
        half_width: below,
    })
}

/// Relative closeness check.
fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= SYMMETRY_TOLERANCE * a.abs().max(b.abs())
}
