//! Per-name aggregate statistics over a span collection

use std::collections::HashMap;
use crate::index::SpanIndex;

#[derive(Clone, Debug, PartialEq)]
pub struct NameStats {
    pub name: String,
    pub call_count: usize,
    pub total_duration: f64,
    pub avg_duration: f64,
    pub min_duration: f64,
    pub max_duration: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortColumn {
    Name,
    Calls,
    #[default]
    TotalTime,
    AvgTime,
}

#[derive(Clone, Debug, Default)]
pub struct SpanStatistics {
    rows: Vec<NameStats>,
    sort_by: SortColumn,
    ascending: bool,
}

impl SpanStatistics {
    /// Aggregate every indexed span by name, heaviest total first
    pub fn compute(index: &SpanIndex) -> Self {
        let mut by_name: HashMap<&str, (usize, f64, f64, f64)> = HashMap::new();

        for span in index.iter() {
            let record = span.record();
            let entry = by_name
                .entry(record.name.as_str())
                .or_insert((0, 0.0, f64::INFINITY, f64::NEG_INFINITY));
            entry.0 += 1;
            entry.1 += record.duration;
            entry.2 = entry.2.min(record.duration);
            entry.3 = entry.3.max(record.duration);
        }

        let rows = by_name
            .into_iter()
            .map(|(name, (count, total, min, max))| NameStats {
                name: name.to_string(),
                call_count: count,
                total_duration: total,
                avg_duration: total / count as f64,
                min_duration: min,
                max_duration: max,
            })
            .collect();

        let mut stats = Self {
            rows,
            sort_by: SortColumn::TotalTime,
            ascending: false,
        };
        stats.sort();
        stats
    }

    pub fn rows(&self) -> &[NameStats] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Selecting the current column again flips the direction
    pub fn set_sort(&mut self, column: SortColumn) {
        if self.sort_by == column {
            self.ascending = !self.ascending;
        } else {
            self.sort_by = column;
            self.ascending = false;
        }
        self.sort();
    }

    fn sort(&mut self) {
        let column = self.sort_by;
        let ascending = self.ascending;
        self.rows.sort_by(|a, b| {
            let cmp = match column {
                SortColumn::Name => a.name.cmp(&b.name),
                SortColumn::Calls => a.call_count.cmp(&b.call_count),
                SortColumn::TotalTime => a.total_duration.total_cmp(&b.total_duration),
                SortColumn::AvgTime => a.avg_duration.total_cmp(&b.avg_duration),
            };
            // name as tiebreak keeps output stable across HashMap orders
            let cmp = cmp.then_with(|| a.name.cmp(&b.name));
            if ascending {
                cmp
            } else {
                cmp.reverse()
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::DuplicatePolicy;
    use crate::record::SpanRecord;

    fn stats() -> SpanStatistics {
        let index = SpanIndex::build(
            vec![
                SpanRecord::new(1, "handler", 10.0),
                SpanRecord::new(2, "query", 2.0).with_parent(1),
                SpanRecord::new(3, "query", 6.0).with_parent(1),
                SpanRecord::new(4, "cache", 1.0).with_parent(1),
            ],
            DuplicatePolicy::Overwrite,
        )
        .unwrap();
        SpanStatistics::compute(&index)
    }

    #[test]
    fn test_aggregates_by_name() {
        let stats = stats();
        let query = stats.rows().iter().find(|r| r.name == "query").unwrap();
        assert_eq!(query.call_count, 2);
        assert_eq!(query.total_duration, 8.0);
        assert_eq!(query.avg_duration, 4.0);
        assert_eq!(query.min_duration, 2.0);
        assert_eq!(query.max_duration, 6.0);
    }

    #[test]
    fn test_default_order_is_total_descending() {
        let names: Vec<_> = stats().rows().iter().map(|r| r.name.clone()).collect();
        assert_eq!(names, vec!["handler", "query", "cache"]);
    }

    #[test]
    fn test_toggle_sort_direction() {
        let mut stats = stats();
        stats.set_sort(SortColumn::Calls);
        assert_eq!(stats.rows()[0].name, "query");
        stats.set_sort(SortColumn::Calls);
        assert_eq!(stats.rows()[0].name, "cache");
    }
}
