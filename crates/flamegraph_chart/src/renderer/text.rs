//! Terminal flamegraph: one row per frame, indented by depth, with a bar
//! proportional to the frame's share of the focused node.

use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;
use span_tree::{RenderNode, RenderTree, SearchMatcher, SpanId};
use crate::config::ChartConfig;
use super::{layout, FlamegraphRenderer, RenderError};

/// Horizontal pixels represented by one output column
pub const PIXELS_PER_COLUMN: u32 = 10;

const FRAME_FILL: char = '#';
const ANCESTOR_FILL: char = '-';

/// Deepest level still drawn with plain indentation
const MAX_INDENT_DEPTH: usize = 32;

pub struct TextRenderer<W: Write> {
    out: W,
    tree: Option<Arc<RenderTree>>,
    config: ChartConfig,
    highlighted: HashSet<SpanId>,
    term: String,
    focus: Option<SpanId>,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            tree: None,
            config: ChartConfig::default(),
            highlighted: HashSet::new(),
            term: String::new(),
            focus: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn highlighted(&self) -> &HashSet<SpanId> {
        &self.highlighted
    }

    pub fn focus(&self) -> Option<&SpanId> {
        self.focus.as_ref()
    }

    fn tree(&self) -> Result<Arc<RenderTree>, RenderError> {
        self.tree.clone().ok_or(RenderError::NotRendered)
    }

    fn view(&self, tree: &RenderTree) -> String {
        let path = self.focus.as_ref().and_then(|id| tree.path_to(id));
        let (ancestors, focused) = match path.as_deref() {
            Some([ancestors @ .., focused]) => (ancestors, *focused),
            _ => (&[][..], tree.root()),
        };

        let mut view = format!("{} spans, depth {}", tree.node_count(), tree.depth());
        if self.focus.is_some() {
            view.push_str(&format!(", zoomed to '{}'", focused.name));
        }
        if !self.term.is_empty() {
            view.push_str(&format!(", {} match(es) for '{}'", self.highlighted.len(), self.term));
        }
        view.push('\n');

        let full_width = self.max_columns();
        for (depth, node) in ancestors.iter().enumerate() {
            self.row(&mut view, depth, node, full_width, ANCESTOR_FILL);
        }

        let frames = layout(focused, &self.config);
        let total = frames.first().map_or(0.0, |frame| frame.value);
        // depth of a hidden frame; its whole subtree stays hidden
        let mut hidden_below: Option<usize> = None;

        for frame in &frames {
            if let Some(depth) = hidden_below {
                if frame.depth > depth {
                    continue;
                }
                hidden_below = None;
            }

            let pixels = if total > 0.0 {
                frame.value / total * self.config.width as f64
            } else {
                0.0
            };
            if pixels < self.config.min_frame_size {
                hidden_below = Some(frame.depth);
                continue;
            }

            let columns = if pixels.is_finite() {
                (pixels / PIXELS_PER_COLUMN as f64).round() as usize
            } else {
                full_width
            };
            let columns = if pixels > 0.0 { columns.clamp(1, full_width.max(1)) } else { 0 };
            self.row(&mut view, ancestors.len() + frame.depth, frame.node, columns, FRAME_FILL);
        }
        view
    }

    /// Columns of a frame spanning the whole chart
    fn max_columns(&self) -> usize {
        (self.config.width / PIXELS_PER_COLUMN) as usize
    }

    fn row(&self, view: &mut String, depth: usize, node: &RenderNode, columns: usize, fill: char) {
        let mark = if self.highlighted.contains(&node.id) { '*' } else { ' ' };
        let bar: String = std::iter::repeat(fill).take(columns).collect();
        view.push_str(&format!("{}{}{} {} ({})\n", indent(depth), mark, bar, node.name, node.value));
    }
}

/// Two spaces per level up to a cap; deeper rows show their level instead
fn indent(depth: usize) -> String {
    if depth <= MAX_INDENT_DEPTH {
        "  ".repeat(depth)
    } else {
        format!("{:<width$}", format!("[{}]", depth), width = 2 * MAX_INDENT_DEPTH)
    }
}

impl<W: Write> FlamegraphRenderer for TextRenderer<W> {
    fn render(&mut self, tree: Arc<RenderTree>, config: &ChartConfig) -> Result<(), RenderError> {
        self.tree = Some(tree);
        self.config = config.clone();
        self.highlighted.clear();
        self.term.clear();
        self.focus = None;
        Ok(())
    }

    fn search(&mut self, matcher: &SearchMatcher) -> Result<usize, RenderError> {
        let tree = self.tree()?;
        self.highlighted = matcher.matching_ids(&tree).into_iter().collect();
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
        let tree = self.tree()?;
        if tree.find(id).is_none() {
            return Ok(false);
        }
        self.focus = Some(id.clone());
        Ok(true)
    }

    fn draw(&mut self) -> Result<(), RenderError> {
        let tree = self.tree()?;
        let view = self.view(&tree);
        self.out.write_all(view.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}
