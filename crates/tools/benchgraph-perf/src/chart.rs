//! Chart planning and rendering.
//!
//! Planning turns a [`BenchDataset`] into one [`ChartPage`] per benchmark
//! with a confidence summary for every (template, size) group. Rendering
//! draws each page as a log-log error-bar chart with plotters onto a
//! [`PdfDocument`].

use std::ops::Range;

use anyhow::{Context, Result};
use plotters::prelude::*;
use tracing::{debug, warn};

use crate::bench_analysis::{BenchDataset, ConfidenceSummary, TemplateGroups, mean_interval};
use crate::pdf::PdfDocument;
use crate::wire::BenchRecord;

/// Confidence level used when none is configured.
pub const DEFAULT_CONFIDENCE: f64 = 0.99;

/// Series label prefix used when none is configured.
pub const DEFAULT_LABEL_PREFIX: &str = "INITIAL_SIZE";

// Font sizes, in points.
const TITLE_FONT_SIZE: u32 = 24;
const AXIS_LABEL_FONT_SIZE: u32 = 14;
const TICK_LABEL_FONT_SIZE: u32 = 11;
const LEGEND_FONT_SIZE: u32 = 12;

const MARGIN: u32 = 24;
const X_LABEL_AREA_SIZE: u32 = 48;
const Y_LABEL_AREA_SIZE: u32 = 72;

const LINE_WIDTH: u32 = 2;
const ERROR_BAR_WIDTH: u32 = 6;

/// Multiplicative padding around the data on both log axes.
const AXIS_PADDING: f64 = 1.25;

/// Settings shared by every page of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    /// Two-sided confidence level of the error bars.
    pub confidence: f64,
    /// Prefix of each series label, followed by `=<template>`.
    pub label_prefix: String,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            confidence: DEFAULT_CONFIDENCE,
            label_prefix: DEFAULT_LABEL_PREFIX.to_string(),
        }
    }
}

/// One error-bar point: the samples of a single input size.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    /// Input size (x coordinate).
    pub size: u64,
    /// Number of samples behind the summary.
    pub samples: usize,
    /// Mean and interval half-width (y coordinate and error bar).
    pub summary: ConfidenceSummary,
}

impl ChartPoint {
    /// Whether the point can be placed on log-scaled axes.
    pub fn is_plottable(&self) -> bool {
        self.size > 0
            && self.summary.mean > 0.0
            && self.summary.mean.is_finite()
            && self.summary.half_width.is_finite()
    }

    fn x(&self) -> f64 {
        self.size as f64
    }
}

/// One line on a chart: all sizes of a single template argument.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    /// Template argument.
    pub template: String,
    /// Legend label.
    pub label: String,
    /// Points ordered by size.
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    /// Input sizes covered by this series, ascending.
    pub fn sizes(&self) -> Vec<u64> {
        self.points.iter().map(|p| p.size).collect()
    }
}

/// Everything needed to draw one page.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPage {
    /// Benchmark name.
    pub benchmark: String,
    /// Page caption.
    pub title: String,
    /// Time unit shared by every record on the page, if any.
    pub time_unit: Option<String>,
    /// Series ordered by template argument.
    pub series: Vec<ChartSeries>,
}

impl ChartPage {
    /// Y axis description.
    pub fn y_desc(&self) -> String {
        match &self.time_unit {
            Some(unit) => format!("real_time ({unit})"),
            None => "real_time".to_string(),
        }
    }

    fn plottable_points(&self) -> impl Iterator<Item = &ChartPoint> {
        self.series
            .iter()
            .flat_map(|s| &s.points)
            .filter(|p| p.is_plottable())
    }

    /// Log-axis ranges covering every plottable point and error bar.
    ///
    /// Returns `None` when nothing on the page can be plotted.
    pub fn axis_ranges(&self) -> Option<(Range<f64>, Range<f64>)> {
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;

        for point in self.plottable_points() {
            let lower = point.summary.lower();
            let floor = if lower > 0.0 { lower } else { point.summary.mean };
            x_min = x_min.min(point.x());
            x_max = x_max.max(point.x());
            y_min = y_min.min(floor);
            y_max = y_max.max(point.summary.upper());
        }

        if !x_min.is_finite() {
            return None;
        }
        Some((
            x_min / AXIS_PADDING..x_max * AXIS_PADDING,
            y_min / AXIS_PADDING..y_max * AXIS_PADDING,
        ))
    }
}

/// Human-readable confidence annotation, e.g. `99% confidence`.
pub fn confidence_label(confidence: f64) -> String {
    let percent = (confidence * 100.0 * 1e6).round() / 1e6;
    format!("{percent}% confidence")
}

/// Build one page per benchmark, in name order.
pub fn plan_pages(dataset: &BenchDataset, options: &ChartOptions) -> Result<Vec<ChartPage>> {
    dataset
        .benchmarks()
        .map(|(name, templates)| plan_page(name, templates, options))
        .collect()
}

fn plan_page(name: &str, templates: &TemplateGroups, options: &ChartOptions) -> Result<ChartPage> {
    let mut series = Vec::with_capacity(templates.len());

    for (template, sizes) in templates {
        let mut points = Vec::with_capacity(sizes.len());
        for (&size, records) in sizes {
            let samples: Vec<f64> = records.iter().map(|r| r.real_time).collect();
            let summary = mean_interval(options.confidence, &samples)
                .with_context(|| format!("summarizing {name}<{template}>/{size}"))?;
            points.push(ChartPoint {
                size,
                samples: samples.len(),
                summary,
            });
        }

        series.push(ChartSeries {
            template: template.clone(),
            label: format!("{}={template}", options.label_prefix),
            points,
        });
    }

    let records = templates.values().flat_map(|sizes| sizes.values()).flatten();

    Ok(ChartPage {
        benchmark: name.to_string(),
        title: format!("{name} ({})", confidence_label(options.confidence)),
        time_unit: common_time_unit(records),
        series,
    })
}

/// The time unit every record agrees on, or `None`.
fn common_time_unit<'a>(records: impl IntoIterator<Item = &'a BenchRecord>) -> Option<String> {
    let mut common: Option<&str> = None;
    for record in records {
        let unit = record.time_unit.as_deref()?;
        match common {
            None => common = Some(unit),
            Some(seen) if seen == unit => {}
            Some(_) => return None,
        }
    }
    common.map(str::to_string)
}

/// Draw every page onto `doc`, one PDF page each.
pub fn render_pages(doc: &mut PdfDocument, pages: &[ChartPage]) -> Result<()> {
    for page in pages {
        render_page(doc, page).with_context(|| format!("rendering chart for {}", page.benchmark))?;
    }
    Ok(())
}

fn render_page(doc: &mut PdfDocument, page: &ChartPage) -> Result<()> {
    let skipped = page.series.iter().flat_map(|s| &s.points).filter(|p| !p.is_plottable());
    for point in skipped {
        warn!(
            "{}: size {} with mean {} cannot be drawn on log axes, skipping",
            page.benchmark, point.size, point.summary.mean
        );
    }

    let (x_range, y_range) = page.axis_ranges().unwrap_or_else(|| {
        warn!("{}: no plottable points, drawing empty axes", page.benchmark);
        (1.0..10.0, 1.0..10.0)
    });
    let y_floor = y_range.start;
    debug!(
        "{}: {} series, x {:?}, y {:?}",
        page.benchmark,
        page.series.len(),
        x_range,
        y_range
    );

    let root = doc.page().into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&page.title, ("sans-serif", TITLE_FONT_SIZE))
        .margin(MARGIN)
        .x_label_area_size(X_LABEL_AREA_SIZE)
        .y_label_area_size(Y_LABEL_AREA_SIZE)
        .build_cartesian_2d(x_range.log_scale(), y_range.log_scale())?;

    chart
        .configure_mesh()
        .x_desc("input size")
        .y_desc(page.y_desc())
        .x_label_formatter(&|x| format_tick(*x))
        .y_label_formatter(&|y| format_tick(*y))
        .label_style(("sans-serif", TICK_LABEL_FONT_SIZE))
        .axis_desc_style(("sans-serif", AXIS_LABEL_FONT_SIZE))
        .draw()?;

    for (idx, series) in page.series.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        let points: Vec<&ChartPoint> = series.points.iter().filter(|p| p.is_plottable()).collect();

        chart
            .draw_series(LineSeries::new(
                points.iter().map(|p| (p.x(), p.summary.mean)),
                color.stroke_width(LINE_WIDTH),
            ))?
            .label(series.label.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(LINE_WIDTH))
            });

        chart.draw_series(points.iter().map(|p| {
            ErrorBar::new_vertical(
                p.x(),
                p.summary.lower().max(y_floor),
                p.summary.mean,
                p.summary.upper(),
                color.stroke_width(1),
                ERROR_BAR_WIDTH,
            )
        }))?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", LEGEND_FONT_SIZE))
        .draw()?;

    root.present()?;
    Ok(())
}

/// Tick label for a log axis.
fn format_tick(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1e5 || (magnitude > 0.0 && magnitude < 1e-2) {
        return format!("{value:.0e}");
    }
    let text = format!("{value:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::BenchResults;

    fn dataset(records: Vec<BenchRecord>) -> BenchDataset {
        let mut dataset = BenchDataset::new();
        dataset
            .extend_from_results(BenchResults { benchmarks: records })
            .unwrap();
        dataset
    }

    fn record(name: &str, time: f64) -> BenchRecord {
        BenchRecord::new(name, time)
    }

    #[test]
    fn plans_one_page_per_benchmark() {
        let dataset = dataset(vec![
            record("Foo<8>/100", 10.0),
            record("Foo<8>/100", 12.0),
            record("Foo<8>/200", 20.0),
            record("Foo<8>/100_mean", 11.0),
        ]);
        let pages = plan_pages(&dataset, &ChartOptions::default()).unwrap();

        assert_eq!(pages.len(), 1);
        let page = &pages[0];
        assert_eq!(page.title, "Foo (99% confidence)");
        assert_eq!(page.series.len(), 1);
        assert_eq!(page.series[0].label, "INITIAL_SIZE=8");
        assert_eq!(page.series[0].sizes(), [100, 200]);

        let first = &page.series[0].points[0];
        assert_eq!(first.samples, 2);
        assert!((first.summary.mean - 11.0).abs() < 1e-12);
        assert!(first.summary.half_width > 0.0);
        assert_eq!(page.series[0].points[1].summary, ConfidenceSummary::point(20.0));
    }

    #[test]
    fn pages_and_series_are_sorted() {
        let dataset = dataset(vec![
            record("b<2>/1", 1.0),
            record("b<10>/1", 1.0),
            record("a<x>/8", 1.0),
            record("a<x>/2", 1.0),
        ]);
        let pages = plan_pages(&dataset, &ChartOptions::default()).unwrap();

        let titles: Vec<&str> = pages.iter().map(|p| p.benchmark.as_str()).collect();
        assert_eq!(titles, ["a", "b"]);
        assert_eq!(pages[0].series[0].sizes(), [2, 8]);
        // Lexicographic, not numeric.
        let labels: Vec<&str> = pages[1].series.iter().map(|s| s.template.as_str()).collect();
        assert_eq!(labels, ["10", "2"]);
    }

    #[test]
    fn options_change_title_and_labels() {
        let dataset = dataset(vec![record("Foo<8>/1", 1.0), record("Foo<8>/1", 2.0)]);
        let options = ChartOptions {
            confidence: 0.95,
            label_prefix: "N".to_string(),
        };
        let pages = plan_pages(&dataset, &options).unwrap();
        assert_eq!(pages[0].title, "Foo (95% confidence)");
        assert_eq!(pages[0].series[0].label, "N=8");
    }

    #[test]
    fn confidence_label_trims_float_noise() {
        assert_eq!(confidence_label(0.99), "99% confidence");
        assert_eq!(confidence_label(0.95), "95% confidence");
        assert_eq!(confidence_label(0.999), "99.9% confidence");
    }

    #[test]
    fn shared_time_unit_labels_the_axis() {
        let mut ns = record("Foo<8>/1", 1.0);
        ns.time_unit = Some("ns".to_string());
        let pages = plan_pages(&dataset(vec![ns.clone(), ns.clone()]), &ChartOptions::default())
            .unwrap();
        assert_eq!(pages[0].y_desc(), "real_time (ns)");

        let mut us = ns.clone();
        us.time_unit = Some("us".to_string());
        let pages = plan_pages(&dataset(vec![ns.clone(), us]), &ChartOptions::default()).unwrap();
        assert_eq!(pages[0].time_unit, None);

        let pages = plan_pages(
            &dataset(vec![ns, record("Foo<8>/1", 1.0)]),
            &ChartOptions::default(),
        )
        .unwrap();
        assert_eq!(pages[0].y_desc(), "real_time");
    }

    #[test]
    fn axis_ranges_cover_error_bars() {
        let dataset = dataset(vec![
            record("Foo<8>/100", 10.0),
            record("Foo<8>/100", 12.0),
            record("Foo<8>/200", 20.0),
        ]);
        let page = &plan_pages(&dataset, &ChartOptions::default()).unwrap()[0];
        let (x, y) = page.axis_ranges().unwrap();

        assert!(x.start < 100.0 && x.end > 200.0);
        // The 99% bar around 11 dips below zero, so the floor comes from the means.
        assert!(y.start > 0.0 && y.start < 11.0);
        assert!(y.end > page.series[0].points[0].summary.upper());
    }

    #[test]
    fn zero_size_is_not_plottable() {
        let dataset = dataset(vec![record("Foo<8>/0", 5.0)]);
        let page = &plan_pages(&dataset, &ChartOptions::default()).unwrap()[0];
        assert!(!page.series[0].points[0].is_plottable());
        assert!(page.axis_ranges().is_none());
    }

    #[test]
    fn renders_one_pdf_page_per_chart() {
        let dataset = dataset(vec![
            record("Foo<8>/100", 10.0),
            record("Foo<8>/100", 12.0),
            record("Foo<8>/200", 20.0),
            record("Foo<16>/100", 8.0),
            record("Bar<8>/1", 1.0),
            record("Baz<1>/0", 1.0),
        ]);
        let pages = plan_pages(&dataset, &ChartOptions::default()).unwrap();

        let mut doc = PdfDocument::new(crate::pdf::A4_LANDSCAPE);
        render_pages(&mut doc, &pages).unwrap();
        assert_eq!(doc.page_count(), 3);

        let pdf = doc.finish().unwrap();
        let has = |needle: &[u8]| pdf.windows(needle.len()).any(|w| w == needle);
        assert!(has(b"INITIAL_SIZE=8"));
        assert!(has(b"INITIAL_SIZE=16"));
        assert!(has(b"99% confidence"));
    }

    #[test]
    fn tick_labels() {
        assert_eq!(format_tick(100.0), "100");
        assert_eq!(format_tick(2.5), "2.5");
        assert_eq!(format_tick(1_000_000.0), "1e6");
        assert_eq!(format_tick(0.001), "1e-3");
    }
}
