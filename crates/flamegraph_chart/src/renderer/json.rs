//! JSON chart documents for a browser flamegraph front end

use std::io::Write;
use std::sync::Arc;
use serde::Serialize;
use span_tree::{RenderTree, SearchMatcher, SpanId};
use crate::config::ChartConfig;
use super::{FlamegraphRenderer, RenderError};

/// Deepest tree written as a document; serializing nests one call per level
pub const MAX_DOCUMENT_DEPTH: usize = 512;

/// Everything the front end needs to draw the current view
#[derive(Debug, Serialize)]
pub struct ChartDocument<'a> {
    pub config: &'a ChartConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_term: Option<&'a str>,
    pub highlighted: &'a [SpanId],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<&'a SpanId>,
    pub tree: &'a RenderTree,
}

pub struct JsonRenderer<W: Write> {
    out: W,
    pretty: bool,
    tree: Option<Arc<RenderTree>>,
    config: ChartConfig,
    highlighted: Vec<SpanId>,
    term: String,
    focus: Option<SpanId>,
}

impl<W: Write> JsonRenderer<W> {
    pub fn new(out: W, pretty: bool) -> Self {
        Self {
            out,
            pretty,
            tree: None,
            config: ChartConfig::default(),
            highlighted: Vec::new(),
            term: String::new(),
            focus: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FlamegraphRenderer for JsonRenderer<W> {
    fn render(&mut self, tree: Arc<RenderTree>, config: &ChartConfig) -> Result<(), RenderError> {
        self.tree = Some(tree);
        self.config = config.clone();
        self.highlighted.clear();
        self.term.clear();
        self.focus = None;
        Ok(())
    }

    fn search(&mut self, matcher: &SearchMatcher) -> Result<usize, RenderError> {
        let tree = self.tree.as_ref().ok_or(RenderError::NotRendered)?;
        self.highlighted = matcher.matching_ids(tree);
        self.term = matcher.term().to_string();
        Ok(self.highlighted.len())
    }

    fn clear(&mut self) -> Result<(), RenderError> {
        self.highlighted.clear();
        self.term.clear();
        Ok(())
    }

    fn reset_zoom(&mut self) -> Result<(), RenderError> {
        self.focus = None;
        Ok(())
    }

    fn zoom_to(&mut self, id: &SpanId) -> Result<bool, RenderError> {
        let tree = self.tree.as_ref().ok_or(RenderError::NotRendered)?;
        if tree.find(id).is_none() {
            return Ok(false);
        }
        self.focus = Some(id.clone());
        Ok(true)
    }

    fn draw(&mut self) -> Result<(), RenderError> {
        let tree = self.tree.as_ref().ok_or(RenderError::NotRendered)?;
        let depth = tree.depth();
        if depth > MAX_DOCUMENT_DEPTH {
            return Err(RenderError::TooDeep {
                depth,
                limit: MAX_DOCUMENT_DEPTH,
            });
        }

        let document = ChartDocument {
            config: &self.config,
            search_term: (!self.term.is_empty()).then_some(self.term.as_str()),
            highlighted: &self.highlighted,
            focus: self.focus.as_ref(),
            tree,
        };

        if self.pretty {
            serde_json::to_writer_pretty(&mut self.out, &document)?;
        } else {
            serde_json::to_writer(&mut self.out, &document)?;
        }
        self.out.write_all(b"\n")?;
        Ok(())
    }
}
