//! Linear-time tidy tree placement (Reingold-Tilford, with the Buchheim,
//! Jünger and Leipert improvements to Walker's apportioning).
//!
//! Works on an arena of nodes in pre-order and returns one coordinate per node
//! along the sibling axis, measured in separation units. The caller scales it
//! and assigns the depth axis.
//!
//! Both walks are iterative so deep trees cannot exhaust the stack.

struct TidyNode {
    parent: Option<usize>,
    children: Vec<usize>,
    /// Index among siblings.
    number: usize,
    prelim: f32,
    modifier: f32,
    change: f32,
    shift: f32,
    thread: Option<usize>,
    ancestor: usize,
    /// Default ancestor for the children of this node, set during apportion.
    default_ancestor: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
pub(super) struct Separation {
    pub siblings: f32,
    pub cousins: f32,
}

/// `parents[i]` is the parent of node `i`; node 0 is the root and every
/// parent index is smaller than its child's (pre-order).
pub(super) fn tidy_positions(
    parents: &[Option<usize>],
    children: &[Vec<usize>],
    separation: Separation,
) -> Vec<f32> {
    let count = parents.len();
    if count == 0 {
        return Vec::new();
    }

    let mut nodes: Vec<TidyNode> = (0..count)
        .map(|idx| TidyNode {
            parent: parents[idx],
            children: children[idx].clone(),
            number: 0,
            prelim: 0.0,
            modifier: 0.0,
            change: 0.0,
            shift: 0.0,
            thread: None,
            ancestor: idx,
            default_ancestor: None,
        })
        .collect();
    for idx in 0..count {
        for (number, &child) in children[idx].iter().enumerate() {
            nodes[child].number = number;
        }
    }

    for v in post_order(children) {
        first_walk(&mut nodes, v, separation);
    }

    let mut positions = vec![0.0_f32; count];
    let root_shift = -nodes[0].prelim;
    for v in 0..count {
        let parent_modifier = match nodes[v].parent {
            Some(parent) => nodes[parent].modifier,
            None => root_shift,
        };
        positions[v] = nodes[v].prelim + parent_modifier;
        nodes[v].modifier += parent_modifier;
    }
    positions
}

fn post_order(children: &[Vec<usize>]) -> Vec<usize> {
    let mut order = Vec::with_capacity(children.len());
    let mut stack = vec![(0usize, 0usize)];
    while let Some((node, next_child)) = stack.pop() {
        if let Some(&child) = children[node].get(next_child) {
            stack.push((node, next_child + 1));
            stack.push((child, 0));
        } else {
            order.push(node);
        }
    }
    order
}

fn separation_between(nodes: &[TidyNode], a: usize, b: usize, separation: Separation) -> f32 {
    if nodes[a].parent == nodes[b].parent {
        separation.siblings
    } else {
        separation.cousins
    }
}

fn next_left(nodes: &[TidyNode], v: usize) -> Option<usize> {
    nodes[v].children.first().copied().or(nodes[v].thread)
}

fn next_right(nodes: &[TidyNode], v: usize) -> Option<usize> {
    nodes[v].children.last().copied().or(nodes[v].thread)
}

fn left_sibling(nodes: &[TidyNode], v: usize) -> Option<usize> {
    let parent = nodes[v].parent?;
    let number = nodes[v].number;
    if number == 0 {
        None
    } else {
        Some(nodes[parent].children[number - 1])
    }
}

fn first_walk(nodes: &mut [TidyNode], v: usize, separation: Separation) {
    let w = left_sibling(nodes, v);
    if let (Some(&first), Some(&last)) = (nodes[v].children.first(), nodes[v].children.last()) {
        execute_shifts(nodes, v);
        let midpoint = (nodes[first].prelim + nodes[last].prelim) / 2.0;
        if let Some(w) = w {
            nodes[v].prelim = nodes[w].prelim + separation_between(nodes, v, w, separation);
            nodes[v].modifier = nodes[v].prelim - midpoint;
        } else {
            nodes[v].prelim = midpoint;
        }
    } else if let Some(w) = w {
        nodes[v].prelim = nodes[w].prelim + separation_between(nodes, v, w, separation);
    }

    if let Some(parent) = nodes[v].parent {
        let fallback = nodes[parent]
            .default_ancestor
            .unwrap_or(nodes[parent].children[0]);
        let ancestor = apportion(nodes, v, w, fallback, separation);
        nodes[parent].default_ancestor = Some(ancestor);
    }
}

fn apportion(
    nodes: &mut [TidyNode],
    v: usize,
    w: Option<usize>,
    mut ancestor: usize,
    separation: Separation,
) -> usize {
    let Some(w) = w else {
        return ancestor;
    };
    let Some(parent) = nodes[v].parent else {
        return ancestor;
    };

    let mut vip = v;
    let mut vop = v;
    let mut vim = w;
    let mut vom = nodes[parent].children[0];
    let mut sip = nodes[vip].modifier;
    let mut sop = nodes[vop].modifier;
    let mut sim = nodes[vim].modifier;
    let mut som = nodes[vom].modifier;

    let (inner_left, inner_right) = loop {
        let next_vim = next_right(nodes, vim);
        let next_vip = next_left(nodes, vip);
        let (Some(next_vim), Some(next_vip)) = (next_vim, next_vip) else {
            break (next_vim, next_vip);
        };
        vim = next_vim;
        vip = next_vip;
        // The outer contours are at least as deep as the inner ones.
        vom = next_left(nodes, vom).unwrap_or(vom);
        vop = next_right(nodes, vop).unwrap_or(vop);
        nodes[vop].ancestor = v;

        let shift = nodes[vim].prelim + sim - nodes[vip].prelim - sip
            + separation_between(nodes, vim, vip, separation);
        if shift > 0.0 {
            let from = next_ancestor(nodes, vim, v, ancestor);
            move_subtree(nodes, from, v, shift);
            sip += shift;
            sop += shift;
        }
        sim += nodes[vim].modifier;
        sip += nodes[vip].modifier;
        som += nodes[vom].modifier;
        sop += nodes[vop].modifier;
    };

    if let Some(inner_left) = inner_left
        && next_right(nodes, vop).is_none()
    {
        nodes[vop].thread = Some(inner_left);
        nodes[vop].modifier += sim - sop;
    }
    if let Some(inner_right) = inner_right
        && next_left(nodes, vom).is_none()
    {
        nodes[vom].thread = Some(inner_right);
        nodes[vom].modifier += sip - som;
        ancestor = v;
    }
    ancestor
}

fn next_ancestor(nodes: &[TidyNode], vim: usize, v: usize, ancestor: usize) -> usize {
    let candidate = nodes[vim].ancestor;
    if nodes[candidate].parent == nodes[v].parent {
        candidate
    } else {
        ancestor
    }
}

fn move_subtree(nodes: &mut [TidyNode], wm: usize, wp: usize, shift: f32) {
    let subtrees = nodes[wp].number.saturating_sub(nodes[wm].number).max(1) as f32;
    let change = shift / subtrees;
    nodes[wp].change -= change;
    nodes[wp].shift += shift;
    nodes[wm].change += change;
    nodes[wp].prelim += shift;
    nodes[wp].modifier += shift;
}

fn execute_shifts(nodes: &mut [TidyNode], v: usize) {
    let mut shift = 0.0;
    let mut change = 0.0;
    for idx in (0..nodes[v].children.len()).rev() {
        let child = nodes[v].children[idx];
        nodes[child].prelim += shift;
        nodes[child].modifier += shift;
        change += nodes[child].change;
        shift += nodes[child].shift + change;
    }
}
