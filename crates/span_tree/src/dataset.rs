//! One-shot pipeline: records -> index -> render tree

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use crate::index::{DuplicatePolicy, IndexError, IndexReport, SpanIndex};
use crate::loader::{self, LoadError};
use crate::record::SpanRecord;
use crate::stats::SpanStatistics;
use crate::tree::{RenderTree, TreeBuilder};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Everything derived from one file selection
#[derive(Debug, Clone)]
pub struct Dataset {
    pub tree: Arc<RenderTree>,
    pub report: IndexReport,
    pub stats: SpanStatistics,
}

impl Dataset {
    pub fn from_records(records: Vec<SpanRecord>, policy: DuplicatePolicy) -> Result<Self, IndexError> {
        let index = SpanIndex::build(records, policy)?;
        let tree = Arc::new(TreeBuilder::new(&index).build());
        let stats = SpanStatistics::compute(&index);

        Ok(Self {
            tree,
            report: index.report().clone(),
            stats,
        })
    }

    pub fn load<P: AsRef<Path>>(paths: &[P], policy: DuplicatePolicy) -> Result<Self, DatasetError> {
        let records = loader::load_files(paths)?;
        Ok(Self::from_records(records, policy)?)
    }
}
