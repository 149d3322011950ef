//! Span hierarchy reconstruction for flamegraph rendering
//!
//! Turns the flat, unordered span list of one or more trace exports into a
//! single rooted tree, ordered by span id, that a flamegraph renderer can
//! consume directly.
//!
//! # Usage
//!
//! ```rust
//! use span_tree::{Dataset, DuplicatePolicy, SearchMatcher, SpanRecord};
//!
//! let records = vec![
//!     SpanRecord::new(1, "GET /orders", 10.0),
//!     SpanRecord::new(2, "db.query", 4.0).with_parent(1),
//! ];
//! let dataset = Dataset::from_records(records, DuplicatePolicy::Overwrite).unwrap();
//! assert_eq!(dataset.tree.node_count(), 2);
//!
//! let matcher = SearchMatcher::new("DB", true).unwrap();
//! assert_eq!(matcher.matching_ids(&dataset.tree).len(), 1);
//! ```

pub mod dataset;
pub mod index;
pub mod loader;
pub mod record;
pub mod search;
pub mod stats;
pub mod tooltip;
pub mod tree;

pub use dataset::{Dataset, DatasetError};
pub use index::{DuplicatePolicy, IndexError, IndexReport, IndexedSpan, SpanIndex};
pub use loader::{load_file, load_files, parse_export, LoadError, TraceExport};
pub use record::{Destination, Endpoint, Label, SpanId, SpanRecord};
pub use search::{search_match, SearchError, SearchMatcher};
pub use stats::{NameStats, SortColumn, SpanStatistics};
pub use tooltip::{Tooltip, TooltipRow, PLACEHOLDER};
pub use tree::{build_tree, RenderNode, RenderTree, TreeBuilder, ROOT_ID, ROOT_NAME};
