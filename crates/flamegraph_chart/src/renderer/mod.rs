//! The drawing side of a flamegraph
//!
//! A renderer receives the tree once per load and is then driven by the
//! session through search, clear, zoom and reset calls. State changes and
//! drawing are separate: [`FlamegraphRenderer::draw`] emits the current view.

mod json;
mod text;

use std::sync::Arc;
use span_tree::{RenderNode, RenderTree, SearchMatcher, SpanId};
use thiserror::Error;
use crate::config::ChartConfig;

pub use json::{ChartDocument, JsonRenderer, MAX_DOCUMENT_DEPTH};
pub use text::TextRenderer;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Nothing has been rendered yet")]
    NotRendered,

    #[error("Tree is {depth} levels deep, the chart document allows {limit}")]
    TooDeep { depth: usize, limit: usize },

    #[error("Failed to write chart: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode chart: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait FlamegraphRenderer {
    /// Replace the displayed tree, dropping highlights and zoom
    fn render(&mut self, tree: Arc<RenderTree>, config: &ChartConfig) -> Result<(), RenderError>;

    /// Highlight every node the matcher accepts; returns the highlight count
    fn search(&mut self, matcher: &SearchMatcher) -> Result<usize, RenderError>;

    fn clear(&mut self) -> Result<(), RenderError>;

    fn reset_zoom(&mut self) -> Result<(), RenderError>;

    /// Focus the view on a node; false when the node is not in the tree
    fn zoom_to(&mut self, id: &SpanId) -> Result<bool, RenderError>;

    fn draw(&mut self) -> Result<(), RenderError>;
}

/// A node placed in draw order
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub node: &'a RenderNode,
    /// Levels below the node the layout started from
    pub depth: usize,
    /// Width-bearing value, see [`frame_value`]
    pub value: f64,
}

/// Pre-order frames of the subtree under `node`, siblings in render order.
///
/// Values are summed in one backwards pass, so every node is visited once
/// however deep the tree is.
pub fn layout<'a>(node: &'a RenderNode, config: &ChartConfig) -> Vec<Frame<'a>> {
    layout_with(node, config.sort, config.self_value)
}

/// Width-bearing value of a node.
///
/// With `self_value` the node's own value is added to its children's. Without
/// it the value already includes the children, except for a zero-valued node
/// (the synthetic root) which takes the sum of its children.
pub fn frame_value(node: &RenderNode, self_value: bool) -> f64 {
    layout_with(node, false, self_value)
        .first()
        .map_or(0.0, |frame| frame.value)
}

fn layout_with(node: &RenderNode, sort: bool, self_value: bool) -> Vec<Frame<'_>> {
    let mut frames = Vec::new();
    let mut parents: Vec<Option<usize>> = Vec::new();
    let mut stack = vec![(node, 0, None)];

    while let Some((node, depth, parent)) = stack.pop() {
        let slot = frames.len();
        frames.push(Frame { node, depth, value: 0.0 });
        parents.push(parent);

        let mut children: Vec<&RenderNode> = node.children.iter().collect();
        if sort {
            children.sort_by(|a, b| a.name.cmp(&b.name));
        }
        stack.extend(children.into_iter().rev().map(|child| (child, depth + 1, Some(slot))));
    }

    // descendants always sit after their ancestor
    let mut children_sum = vec![0.0; frames.len()];
    for slot in (0..frames.len()).rev() {
        let own = frames[slot].node.value;
        let value = if self_value {
            own + children_sum[slot]
        } else if own > 0.0 {
            own
        } else {
            children_sum[slot]
        };
        frames[slot].value = value;
        if let Some(parent) = parents[slot] {
            children_sum[parent] += value;
        }
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, value: f64, children: Vec<RenderNode>) -> RenderNode {
        RenderNode {
            id: SpanId::text(name),
            name: name.to_string(),
            value,
            service_label: None,
            endpoint_label: None,
            endpoint_type: None,
            children,
        }
    }

    fn summary(frames: &[Frame<'_>]) -> Vec<(String, usize, f64)> {
        frames.iter().map(|f| (f.node.name.clone(), f.depth, f.value)).collect()
    }

    #[test]
    fn test_frame_value_modes() {
        let tree = node("root", 0.0, vec![node("a", 10.0, vec![node("b", 4.0, vec![])]), node("c", 5.0, vec![])]);
        assert_eq!(frame_value(&tree, false), 15.0);
        assert_eq!(frame_value(&tree, true), 19.0);
    }

    #[test]
    fn test_layout_orders_siblings_by_name() {
        let tree = node("root", 0.0, vec![node("zeta", 1.0, vec![node("z1", 1.0, vec![])]), node("alpha", 2.0, vec![])]);

        assert_eq!(
            summary(&layout(&tree, &ChartConfig::default())),
            vec![
                ("root".to_string(), 0, 3.0),
                ("alpha".to_string(), 1, 2.0),
                ("zeta".to_string(), 1, 1.0),
                ("z1".to_string(), 2, 1.0),
            ]
        );

        let config = ChartConfig { sort: false, ..ChartConfig::default() };
        assert_eq!(layout(&tree, &config)[1].node.name, "zeta");
    }
}
