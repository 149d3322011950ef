//! A flamegraph view bound to the spans of the latest file selection
//!
//! Every selection discards the previous dataset and rebuilds it from
//! scratch. Loads are tagged with a generation: a load that finishes after a
//! newer selection was made is dropped instead of overwriting the newer one.

use std::path::PathBuf;
use std::sync::Arc;
use span_tree::{Dataset, DatasetError, DuplicatePolicy, SearchError, SearchMatcher, SpanId, Tooltip};
use thiserror::Error;
use crate::config::ChartConfig;
use crate::renderer::{FlamegraphRenderer, RenderError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No trace loaded")]
    NoData,

    #[error("No span with id {0}")]
    UnknownSpan(SpanId),

    #[error("Load #{ticket} was superseded by load #{current}")]
    StaleLoad { ticket: u64, current: u64 },

    #[error(transparent)]
    Load(#[from] DatasetError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// A pending file selection.
///
/// [`LoadTicket::run`] does the reading and may happen on another thread;
/// the result goes back through [`ChartSession::finish_load`].
#[derive(Debug, Clone)]
pub struct LoadTicket {
    generation: u64,
    paths: Vec<PathBuf>,
    policy: DuplicatePolicy,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn run(&self) -> Result<Dataset, DatasetError> {
        Dataset::load(&self.paths, self.policy)
    }
}

pub struct ChartSession<R: FlamegraphRenderer> {
    config: ChartConfig,
    renderer: R,
    dataset: Option<Arc<Dataset>>,
    generation: u64,
    term: String,
    auto_draw: bool,
}

impl<R: FlamegraphRenderer> ChartSession<R> {
    pub fn new(config: ChartConfig, renderer: R) -> Self {
        Self {
            config,
            renderer,
            dataset: None,
            generation: 0,
            term: String::new(),
            auto_draw: true,
        }
    }

    /// Draw after every operation (default), or only on [`ChartSession::draw`]
    pub fn with_auto_draw(mut self, auto_draw: bool) -> Self {
        self.auto_draw = auto_draw;
        self
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    pub fn dataset(&self) -> Option<&Arc<Dataset>> {
        self.dataset.as_ref()
    }

    pub fn search_term(&self) -> &str {
        &self.term
    }

    /// Start a new selection; the current view is dropped right away
    pub fn begin_load(&mut self, paths: Vec<PathBuf>) -> LoadTicket {
        self.generation += 1;
        self.dataset = None;
        self.term.clear();
        tracing::debug!("Load #{} started for {} file(s)", self.generation, paths.len());

        LoadTicket {
            generation: self.generation,
            paths,
            policy: self.config.duplicate_policy,
        }
    }

    /// Install the result of a load, unless a newer selection exists
    pub fn finish_load(
        &mut self,
        ticket: &LoadTicket,
        result: Result<Dataset, DatasetError>,
    ) -> Result<Arc<Dataset>, SessionError> {
        if ticket.generation != self.generation {
            tracing::warn!(
                "Discarding load #{}, load #{} is current",
                ticket.generation,
                self.generation
            );
            return Err(SessionError::StaleLoad {
                ticket: ticket.generation,
                current: self.generation,
            });
        }

        let dataset = Arc::new(result?);
        tracing::info!(
            "Rendering {} spans ({} roots, depth {})",
            dataset.report.span_count,
            dataset.report.root_count,
            dataset.tree.depth()
        );

        self.renderer.render(Arc::clone(&dataset.tree), &self.config)?;
        self.dataset = Some(Arc::clone(&dataset));
        self.auto_draw()?;
        Ok(dataset)
    }

    /// Rebuild everything from a new file selection
    pub fn on_files_selected(&mut self, paths: Vec<PathBuf>) -> Result<Arc<Dataset>, SessionError> {
        let ticket = self.begin_load(paths);
        let result = ticket.run();
        self.finish_load(&ticket, result)
    }

    /// Highlight nodes whose name matches `term`; returns the match count.
    ///
    /// An invalid pattern leaves the current highlight untouched.
    pub fn search(&mut self, term: &str) -> Result<usize, SessionError> {
        self.require_data()?;
        let matcher = SearchMatcher::new(term, self.config.ignore_case)?;
        let count = self.renderer.search(&matcher)?;
        self.term = term.to_string();
        tracing::debug!("Search '{}' matched {} node(s)", term, count);
        self.auto_draw()?;
        Ok(count)
    }

    /// Toggle case folding and re-apply the current search
    pub fn set_ignore_case(&mut self, ignore_case: bool) -> Result<(), SessionError> {
        self.config.ignore_case = ignore_case;
        if self.dataset.is_some() && !self.term.is_empty() {
            let term = self.term.clone();
            self.search(&term)?;
        }
        Ok(())
    }

    /// Empty the search term and drop highlights
    pub fn clear(&mut self) -> Result<(), SessionError> {
        self.term.clear();
        if self.dataset.is_some() {
            self.renderer.clear()?;
            self.auto_draw()?;
        }
        Ok(())
    }

    pub fn reset_zoom(&mut self) -> Result<(), SessionError> {
        self.require_data()?;
        self.renderer.reset_zoom()?;
        self.auto_draw()
    }

    /// Zoom into a node, as a click on its frame does
    pub fn click(&mut self, id: &SpanId) -> Result<(), SessionError> {
        let dataset = self.require_data()?;
        let node = dataset
            .tree
            .find(id)
            .ok_or_else(|| SessionError::UnknownSpan(id.clone()))?;
        tracing::info!("Clicked on {}", node.name);

        if !self.renderer.zoom_to(id)? {
            return Err(SessionError::UnknownSpan(id.clone()));
        }
        self.auto_draw()
    }

    /// Tooltip content for the details output
    pub fn details(&self, id: &SpanId) -> Result<Tooltip, SessionError> {
        let dataset = self.require_data()?;
        dataset
            .tree
            .find(id)
            .map(Tooltip::for_node)
            .ok_or_else(|| SessionError::UnknownSpan(id.clone()))
    }

    pub fn draw(&mut self) -> Result<(), SessionError> {
        self.require_data()?;
        self.renderer.draw()?;
        Ok(())
    }

    fn auto_draw(&mut self) -> Result<(), SessionError> {
        if self.auto_draw {
            self.renderer.draw()?;
        }
        Ok(())
    }

    fn require_data(&self) -> Result<Arc<Dataset>, SessionError> {
        self.dataset.clone().ok_or(SessionError::NoData)
    }
}
