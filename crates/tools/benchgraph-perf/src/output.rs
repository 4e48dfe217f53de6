//! Terminal output formatting for benchmark summaries.

use std::fmt::Write as _;

use crate::chart::ChartPage;

/// Render per-benchmark summary tables as text.
pub fn format_summary_table(pages: &[ChartPage]) -> String {
    let mut out = String::new();

    if pages.is_empty() {
        out.push_str("  No benchmark results to display.\n");
        return out;
    }

    for page in pages {
        let rows: Vec<[String; 5]> = page
            .series
            .iter()
            .flat_map(|series| {
                series.points.iter().map(|point| {
                    [
                        series.template.clone(),
                        point.size.to_string(),
                        point.samples.to_string(),
                        format!("{:.3}", point.summary.mean),
                        format!("{:.3}", point.summary.half_width),
                    ]
                })
            })
            .collect();

        // Compute column widths.
        let max_template = rows
            .iter()
            .map(|row| row[0].len())
            .max()
            .unwrap_or(8)
            .max(8);
        let unit = page.time_unit.as_deref().unwrap_or("");

        let _ = writeln!(out);
        let _ = writeln!(out, "  {}", page.title);
        let _ = writeln!(
            out,
            "  {:<width$}  {:>10}  {:>8}  {:>14}  {:>14}",
            "Template",
            "Size",
            "Samples",
            format!("Mean {unit}").trim_end(),
            format!("+/-CI {unit}").trim_end(),
            width = max_template
        );
        let _ = writeln!(
            out,
            "  {:-<width$}  {:->10}  {:->8}  {:->14}  {:->14}",
            "",
            "",
            "",
            "",
            "",
            width = max_template
        );

        for [template, size, samples, mean, half_width] in &rows {
            let _ = writeln!(
                out,
                "  {template:<width$}  {size:>10}  {samples:>8}  {mean:>14}  {half_width:>14}",
                width = max_template
            );
        }
    }
    out.push('\n');
    out
}

/// Print per-benchmark summary tables to stdout.
pub fn print_summary_table(pages: &[ChartPage]) {
    print!("{}", format_summary_table(pages));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench_analysis::ConfidenceSummary;
    use crate::chart::{ChartPoint, ChartSeries};

    fn page() -> ChartPage {
        ChartPage {
            benchmark: "Foo".to_string(),
            title: "Foo (99% confidence)".to_string(),
            time_unit: Some("ns".to_string()),
            series: vec![ChartSeries {
                template: "8".to_string(),
                label: "INITIAL_SIZE=8".to_string(),
                points: vec![
                    ChartPoint {
                        size: 100,
                        samples: 2,
                        summary: ConfidenceSummary {
                            mean: 11.0,
                            half_width: 63.657,
                        },
                    },
                    ChartPoint {
                        size: 200,
                        samples: 1,
                        summary: ConfidenceSummary::point(20.0),
                    },
                ],
            }],
        }
    }

    #[test]
    fn table_lists_every_point() {
        let table = format_summary_table(&[page()]);
        assert!(table.contains("Foo (99% confidence)"));
        assert!(table.contains("Mean ns"));

        let rows: Vec<&str> = table
            .lines()
            .filter(|line| line.trim_start().starts_with('8'))
            .collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains("100") && rows[0].contains("11.000") && rows[0].contains("63.657"));
        assert!(rows[1].contains("200") && rows[1].contains("20.000") && rows[1].contains("0.000"));
    }

    #[test]
    fn empty_table() {
        assert!(format_summary_table(&[]).contains("No benchmark results"));
    }
}
