use crate::config::LayoutConfig;
use crate::ir::TreeNode;
use std::collections::HashMap;
use tracing::debug;

mod tidy;

use tidy::{Separation, tidy_positions};

/// A tree node with its computed position. Borrows the source node read-only.
#[derive(Debug, Clone)]
pub struct LayoutNode<'a> {
    pub node: &'a TreeNode,
    pub depth: usize,
    /// Depth axis.
    pub x: f32,
    /// Sibling axis.
    pub y: f32,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn union_point(&mut self, x: f32, y: f32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub(crate) fn empty() -> Self {
        Self {
            min_x: f32::MAX,
            min_y: f32::MAX,
            max_x: f32::MIN,
            max_y: f32::MIN,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }
}

/// Nodes in pre-order; index 0 is the root.
#[derive(Debug, Clone)]
pub struct Layout<'a> {
    pub nodes: Vec<LayoutNode<'a>>,
    pub bounds: Bounds,
}

impl<'a> Layout<'a> {
    pub fn root(&self) -> &LayoutNode<'a> {
        &self.nodes[0]
    }

    /// Parent/child index pairs, one per parent→child relationship.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(idx, node)| node.parent.map(|parent| (parent, idx)))
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn find(&self, id: &str) -> Option<&LayoutNode<'a>> {
        self.nodes.iter().find(|node| node.node.id == id)
    }

    pub fn positions(&self) -> HashMap<&'a str, (f32, f32)> {
        self.nodes
            .iter()
            .map(|node| (node.node.id.as_str(), (node.x, node.y)))
            .collect()
    }
}

/// Horizontal tidy tree: depth grows along x, siblings stack along y in input
/// order. The root sits at the origin. Label sizes play no part.
pub fn compute_layout<'a>(root: &'a TreeNode, config: &LayoutConfig) -> Layout<'a> {
    let mut nodes: Vec<LayoutNode<'a>> = Vec::new();
    let mut stack: Vec<(&'a TreeNode, usize, Option<usize>)> = vec![(root, 0, None)];
    while let Some((node, depth, parent)) = stack.pop() {
        let idx = nodes.len();
        if let Some(parent) = parent {
            nodes[parent].children.push(idx);
        }
        nodes.push(LayoutNode {
            node,
            depth,
            x: 0.0,
            y: 0.0,
            parent,
            children: Vec::with_capacity(node.children.len()),
        });
        for child in node.children.iter().rev() {
            stack.push((child, depth + 1, Some(idx)));
        }
    }

    let parents: Vec<Option<usize>> = nodes.iter().map(|node| node.parent).collect();
    let children: Vec<Vec<usize>> = nodes.iter().map(|node| node.children.clone()).collect();
    let breadth = tidy_positions(
        &parents,
        &children,
        Separation {
            siblings: config.sibling_separation,
            cousins: config.cousin_separation,
        },
    );

    let mut bounds = Bounds::empty();
    for (node, offset) in nodes.iter_mut().zip(breadth) {
        node.x = node.depth as f32 * config.level_spacing;
        node.y = offset * config.node_spacing;
        bounds.union_point(node.x, node.y);
    }

    debug!(
        nodes = nodes.len(),
        width = bounds.width(),
        height = bounds.height(),
        "computed tree layout"
    );

    Layout { nodes, bounds }
}
