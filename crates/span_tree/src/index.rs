//! Id-keyed index over a flat span collection
//!
//! Spans live in an arena; parent and child links are arena slots, so the
//! index owns everything and holds no reference cycles. The index is built
//! once per load and never updated incrementally.

use std::collections::HashMap;
use thiserror::Error;
use crate::record::{SpanId, SpanRecord};

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Duplicate span id: {0}")]
    DuplicateId(SpanId),
}

/// What to do when two records share an id
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Last record wins; it keeps the slot of the first occurrence
    #[default]
    Overwrite,
    /// Fail the build
    Reject,
}

/// A span with its resolved links
#[derive(Debug, Clone)]
pub struct IndexedSpan {
    record: SpanRecord,
    parent: Option<usize>,
    children: Vec<usize>,
}

impl IndexedSpan {
    pub fn record(&self) -> &SpanRecord {
        &self.record
    }

    pub fn id(&self) -> &SpanId {
        &self.record.id
    }

    /// A span is a root when its parent id is absent or resolves to nothing
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

/// Summary of a build, for logging and display
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexReport {
    pub span_count: usize,
    pub root_count: usize,
    /// Ids seen more than once, in the order the repeats were encountered
    pub duplicate_ids: Vec<SpanId>,
    /// Spans on a parent cycle; no root leads to them
    pub unreachable: Vec<SpanId>,
}

#[derive(Debug, Clone, Default)]
pub struct SpanIndex {
    spans: Vec<IndexedSpan>,
    by_id: HashMap<SpanId, usize>,
    report: IndexReport,
}

impl SpanIndex {
    /// Index and link a merged span collection.
    pub fn build(records: Vec<SpanRecord>, policy: DuplicatePolicy) -> Result<Self, IndexError> {
        let mut index = Self {
            spans: Vec::with_capacity(records.len()),
            by_id: HashMap::with_capacity(records.len()),
            report: IndexReport::default(),
        };

        // Pass 1: key every record by id
        for record in records {
            match index.by_id.get(&record.id) {
                Some(&slot) => {
                    if policy == DuplicatePolicy::Reject {
                        return Err(IndexError::DuplicateId(record.id));
                    }
                    tracing::warn!("Duplicate span id {}, keeping the later record", record.id);
                    index.report.duplicate_ids.push(record.id.clone());
                    index.spans[slot].record = record;
                }
                None => {
                    index.by_id.insert(record.id.clone(), index.spans.len());
                    index.spans.push(IndexedSpan {
                        record,
                        parent: None,
                        children: Vec::new(),
                    });
                }
            }
        }

        // Pass 2: resolve parents
        for slot in 0..index.spans.len() {
            let parent = index.spans[slot]
                .record
                .parent_id
                .as_ref()
                .and_then(|parent_id| index.by_id.get(parent_id).copied());
            index.spans[slot].parent = parent;
        }

        // Pass 3: attach each span to its parent, in index order
        for slot in 0..index.spans.len() {
            if let Some(parent) = index.spans[slot].parent {
                index.spans[parent].children.push(slot);
            }
        }

        // Pass 4: order children by id, stable on ties
        for slot in 0..index.spans.len() {
            let mut children = std::mem::take(&mut index.spans[slot].children);
            children.sort_by(|&a, &b| index.spans[a].record.id.cmp(&index.spans[b].record.id));
            index.spans[slot].children = children;
        }

        index.report.span_count = index.spans.len();
        index.report.root_count = index.spans.iter().filter(|s| s.is_root()).count();
        index.report.unreachable = index.find_unreachable();

        if !index.report.unreachable.is_empty() {
            tracing::warn!(
                "{} span(s) sit on a parent cycle and will not be rendered: {:?}",
                index.report.unreachable.len(),
                index.report.unreachable
            );
        }

        tracing::debug!(
            "Indexed {} spans ({} roots, {} duplicates)",
            index.report.span_count,
            index.report.root_count,
            index.report.duplicate_ids.len()
        );

        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn report(&self) -> &IndexReport {
        &self.report
    }

    pub fn get(&self, id: &SpanId) -> Option<&IndexedSpan> {
        self.by_id.get(id).map(|&slot| &self.spans[slot])
    }

    pub fn parent_of(&self, span: &IndexedSpan) -> Option<&IndexedSpan> {
        span.parent.map(|slot| &self.spans[slot])
    }

    /// Children in ascending id order
    pub fn children_of<'a>(&'a self, span: &'a IndexedSpan) -> impl Iterator<Item = &'a IndexedSpan> + 'a {
        span.children.iter().map(move |&slot| &self.spans[slot])
    }

    /// Root spans in ascending id order
    pub fn roots(&self) -> Vec<&IndexedSpan> {
        let mut roots: Vec<&IndexedSpan> = self.spans.iter().filter(|s| s.is_root()).collect();
        roots.sort_by(|a, b| a.id().cmp(b.id()));
        roots
    }

    /// All spans in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &IndexedSpan> {
        self.spans.iter()
    }

    fn find_unreachable(&self) -> Vec<SpanId> {
        let mut reached = vec![false; self.spans.len()];
        let mut stack: Vec<usize> = (0..self.spans.len())
            .filter(|&slot| self.spans[slot].is_root())
            .collect();

        while let Some(slot) = stack.pop() {
            if reached[slot] {
                continue;
            }
            reached[slot] = true;
            stack.extend(self.spans[slot].children.iter().copied());
        }

        self.spans
            .iter()
            .zip(reached)
            .filter(|(_, reached)| !reached)
            .map(|(span, _)| span.record.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child_ids(index: &SpanIndex, id: impl Into<SpanId>) -> Vec<SpanId> {
        let span = index.get(&id.into()).unwrap();
        index.children_of(span).map(|c| c.id().clone()).collect()
    }

    #[test]
    fn test_links_parent_and_children() {
        let index = SpanIndex::build(
            vec![
                SpanRecord::new(1, "a", 10.0),
                SpanRecord::new(2, "b", 4.0).with_parent(1),
            ],
            DuplicatePolicy::Overwrite,
        )
        .unwrap();

        let child = index.get(&SpanId::from(2)).unwrap();
        assert_eq!(index.parent_of(child).unwrap().id(), &SpanId::from(1));
        assert_eq!(child_ids(&index, 1), vec![SpanId::from(2)]);
        assert_eq!(index.report().root_count, 1);
    }

    #[test]
    fn test_children_sorted_by_id() {
        let index = SpanIndex::build(
            vec![
                SpanRecord::new(1, "p", 1.0),
                SpanRecord::new(5, "x", 1.0).with_parent(1),
                SpanRecord::new(3, "y", 1.0).with_parent(1),
            ],
            DuplicatePolicy::Overwrite,
        )
        .unwrap();

        assert_eq!(child_ids(&index, 1), vec![SpanId::from(3), SpanId::from(5)]);
    }

    #[test]
    fn test_unresolved_parent_is_root() {
        let index = SpanIndex::build(
            vec![SpanRecord::new(7, "orphan", 1.0).with_parent(99)],
            DuplicatePolicy::Overwrite,
        )
        .unwrap();

        let span = index.get(&SpanId::from(7)).unwrap();
        assert!(span.is_root());
        assert_eq!(index.roots().len(), 1);
    }

    #[test]
    fn test_duplicate_overwrite_keeps_last_record() {
        let index = SpanIndex::build(
            vec![
                SpanRecord::new(1, "first", 1.0),
                SpanRecord::new(2, "other", 1.0),
                SpanRecord::new(1, "second", 2.0),
            ],
            DuplicatePolicy::Overwrite,
        )
        .unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(index.get(&SpanId::from(1)).unwrap().record().name, "second");
        assert_eq!(index.report().duplicate_ids, vec![SpanId::from(1)]);
        // slot of the first occurrence is kept
        assert_eq!(index.iter().next().unwrap().record().name, "second");
    }

    #[test]
    fn test_duplicate_reject() {
        let result = SpanIndex::build(
            vec![SpanRecord::new("a", "x", 1.0), SpanRecord::new("a", "y", 1.0)],
            DuplicatePolicy::Reject,
        );
        assert!(matches!(result, Err(IndexError::DuplicateId(SpanId::Text(ref id))) if id == "a"));
    }

    #[test]
    fn test_cycle_is_unreachable() {
        let index = SpanIndex::build(
            vec![
                SpanRecord::new(1, "root", 1.0),
                SpanRecord::new(2, "a", 1.0).with_parent(3),
                SpanRecord::new(3, "b", 1.0).with_parent(2),
                SpanRecord::new(4, "self", 1.0).with_parent(4),
            ],
            DuplicatePolicy::Overwrite,
        )
        .unwrap();

        assert_eq!(index.report().root_count, 1);
        assert_eq!(
            index.report().unreachable,
            vec![SpanId::from(2), SpanId::from(3), SpanId::from(4)]
        );
    }

    #[test]
    fn test_empty_input() {
        let index = SpanIndex::build(Vec::new(), DuplicatePolicy::Reject).unwrap();
        assert!(index.is_empty());
        assert!(index.roots().is_empty());
    }
}
