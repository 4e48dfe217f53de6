//! Benchmark result analysis and charting.
//!
//! Provides deserialization of benchmark result files, benchmark name
//! parsing, grouping by (name, template, size), Student's t confidence
//! intervals, log-log error-bar charts rendered into a multi-page PDF, and
//! terminal summary formatting.

pub mod bench_analysis;
pub mod chart;
pub mod naming;
pub mod output;
pub mod pdf;
pub mod wire;
