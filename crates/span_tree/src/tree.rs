//! Render-ready flamegraph tree
//!
//! [`TreeBuilder`] walks a [`SpanIndex`] from its roots downward and emits one
//! [`RenderNode`] per reachable span. All roots hang under a single synthetic
//! node so a renderer always receives one tree, never a forest.
//!
//! Span chains can be arbitrarily deep, so nothing here recurses: building,
//! walking and dropping all run on explicit stacks.

use serde::{Deserialize, Serialize};
use crate::index::{IndexedSpan, SpanIndex};
use crate::record::SpanId;

pub const ROOT_ID: &str = "root";
pub const ROOT_NAME: &str = "root";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderNode {
    pub id: SpanId,
    pub name: String,
    /// Frame width, taken from the span duration
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_type: Option<String>,
    #[serde(default)]
    pub children: Vec<RenderNode>,
}

impl RenderNode {
    fn synthetic_root(children: Vec<RenderNode>) -> Self {
        Self {
            id: SpanId::text(ROOT_ID),
            name: ROOT_NAME.to_string(),
            value: 0.0,
            service_label: None,
            endpoint_label: None,
            endpoint_type: None,
            children,
        }
    }

    /// Sum of the children's values
    pub fn children_value(&self) -> f64 {
        self.children.iter().map(|c| c.value).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderTree {
    root: RenderNode,
}

impl RenderTree {
    pub fn root(&self) -> &RenderNode {
        &self.root
    }

    /// Number of span nodes, not counting the synthetic root
    pub fn node_count(&self) -> usize {
        self.walk().count() - 1
    }

    /// Number of levels, the synthetic root being level one
    pub fn depth(&self) -> usize {
        self.walk().map(|(depth, _)| depth + 1).max().unwrap_or(1)
    }

    /// Pre-order traversal yielding each node with its depth (root = 0)
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![(0, &self.root)],
        }
    }

    /// Look up a span node by id; the synthetic root is not a span
    pub fn find(&self, id: &SpanId) -> Option<&RenderNode> {
        self.walk()
            .skip(1)
            .map(|(_, node)| node)
            .find(|node| &node.id == id)
    }

    /// Chain of nodes from the synthetic root down to `id`, both inclusive
    pub fn path_to(&self, id: &SpanId) -> Option<Vec<&RenderNode>> {
        let mut path = Vec::new();
        for (depth, node) in self.walk() {
            path.truncate(depth);
            path.push(node);
            if depth > 0 && &node.id == id {
                return Some(path);
            }
        }
        None
    }
}

impl Drop for RenderTree {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.root.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

pub struct Walk<'a> {
    stack: Vec<(usize, &'a RenderNode)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a RenderNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|child| (depth + 1, child)));
        Some((depth, node))
    }
}

/// Serializes an indexed span collection into a [`RenderTree`]
pub struct TreeBuilder<'a> {
    index: &'a SpanIndex,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(index: &'a SpanIndex) -> Self {
        Self { index }
    }

    pub fn build(&self) -> RenderTree {
        let mut root = RenderNode::synthetic_root(Vec::new());
        let mut stack: Vec<Pending<'_>> = Vec::new();

        for span in self.index.roots() {
            stack.push(self.enter(span));
            loop {
                let next = match stack.last_mut() {
                    Some(top) => top.children.next(),
                    None => break,
                };
                if let Some(child) = next {
                    stack.push(self.enter(child));
                    continue;
                }

                // every child is built, so the node is complete
                let Some(done) = stack.pop() else { break };
                let mut node = done.node;
                node.children = done.built;
                match stack.last_mut() {
                    Some(parent) => parent.built.push(node),
                    None => root.children.push(node),
                }
            }
        }

        let tree = RenderTree { root };
        tracing::debug!(
            "Built render tree: {} nodes, depth {}",
            tree.node_count(),
            tree.depth()
        );
        tree
    }

    fn enter(&self, span: &'a IndexedSpan) -> Pending<'a> {
        let record = span.record();
        let children: Vec<&IndexedSpan> = self.index.children_of(span).collect();
        Pending {
            node: RenderNode {
                id: record.id.clone(),
                name: record.name.clone(),
                value: record.duration,
                service_label: record.service_label().map(str::to_string),
                endpoint_label: record.endpoint_label().map(str::to_string),
                endpoint_type: record.endpoint_type().map(str::to_string),
                children: Vec::new(),
            },
            built: Vec::with_capacity(children.len()),
            children: children.into_iter(),
        }
    }
}

/// A node whose children are still being built
struct Pending<'a> {
    node: RenderNode,
    children: std::vec::IntoIter<&'a IndexedSpan>,
    built: Vec<RenderNode>,
}

/// Shorthand for `TreeBuilder::new(index).build()`
pub fn build_tree(index: &SpanIndex) -> RenderTree {
    TreeBuilder::new(index).build()
}
