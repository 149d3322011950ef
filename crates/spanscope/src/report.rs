//! Plain-text summaries printed alongside the chart

use std::io::{self, Write};
use span_tree::{Dataset, SpanStatistics};

pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

pub fn write_stats<W: Write>(out: &mut W, stats: &SpanStatistics, limit: usize) -> io::Result<()> {
    writeln!(
        out,
        "{:<40} {:>8} {:>12} {:>12} {:>12} {:>12}",
        "name", "calls", "total", "avg", "min", "max"
    )?;
    for row in stats.rows().iter().take(limit) {
        writeln!(
            out,
            "{:<40} {:>8} {:>12} {:>12} {:>12} {:>12}",
            row.name,
            row.call_count,
            format_value(row.total_duration),
            format_value(row.avg_duration),
            format_value(row.min_duration),
            format_value(row.max_duration),
        )?;
    }
    if stats.rows().len() > limit {
        writeln!(out, "... {} more", stats.rows().len() - limit)?;
    }
    Ok(())
}

pub fn write_summary<W: Write>(out: &mut W, dataset: &Dataset) -> io::Result<()> {
    let report = &dataset.report;
    write!(
        out,
        "loaded {} spans, {} root(s), depth {}",
        report.span_count,
        report.root_count,
        dataset.tree.depth()
    )?;
    if !report.duplicate_ids.is_empty() {
        write!(out, ", {} duplicate id(s) overwritten", report.duplicate_ids.len())?;
    }
    if !report.unreachable.is_empty() {
        write!(out, ", {} span(s) on parent cycles skipped", report.unreachable.len())?;
    }
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use span_tree::{DuplicatePolicy, SpanRecord};

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(12.0), "12");
        assert_eq!(format_value(2.0 / 3.0), "0.67");
    }

    #[test]
    fn test_summary_mentions_duplicates() {
        let dataset = Dataset::from_records(
            vec![SpanRecord::new(1, "a", 1.0), SpanRecord::new(1, "b", 2.0)],
            DuplicatePolicy::Overwrite,
        )
        .unwrap();

        let mut out = Vec::new();
        write_summary(&mut out, &dataset).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "loaded 1 spans, 1 root(s), depth 2, 1 duplicate id(s) overwritten\n"
        );
    }

    #[test]
    fn test_stats_limit() {
        let dataset = Dataset::from_records(
            vec![
                SpanRecord::new(1, "a", 3.0),
                SpanRecord::new(2, "b", 2.0),
                SpanRecord::new(3, "c", 1.0),
            ],
            DuplicatePolicy::Overwrite,
        )
        .unwrap();

        let mut out = Vec::new();
        write_stats(&mut out, &dataset.stats, 2).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 4);
        assert!(text.lines().nth(1).unwrap().starts_with("a "));
        assert_eq!(text.lines().last(), Some("... 1 more"));
    }
}
