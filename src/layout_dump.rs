use crate::config::LayoutConfig;
use crate::layout::Layout;
use crate::render::node_box_width;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub label: String,
    pub depth: usize,
    pub x: f32,
    pub y: f32,
    pub box_width: f32,
    pub parent: Option<String>,
    pub children: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub from: String,
    pub to: String,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout<'_>, config: &LayoutConfig) -> Self {
        let nodes = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.node.id.clone(),
                label: node.node.label.clone(),
                depth: node.depth,
                x: node.x,
                y: node.y,
                box_width: node_box_width(&node.node.label, config),
                parent: node
                    .parent
                    .map(|parent| layout.nodes[parent].node.id.clone()),
                children: node
                    .children
                    .iter()
                    .map(|child| layout.nodes[*child].node.id.clone())
                    .collect(),
            })
            .collect();

        let edges = layout
            .edges()
            .map(|(parent, child)| EdgeDump {
                from: layout.nodes[parent].node.id.clone(),
                to: layout.nodes[child].node.id.clone(),
            })
            .collect();

        LayoutDump {
            width: layout.bounds.width(),
            height: layout.bounds.height(),
            nodes,
            edges,
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &Layout<'_>, config: &LayoutConfig) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, config);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::TreeNode;
    use crate::layout::compute_layout;

    #[test]
    fn dump_lists_every_node_and_edge() {
        let tree = TreeNode::new("r", "Root").with_children(vec![
            TreeNode::new("a", "A").with_children(vec![TreeNode::new("a1", "A1")]),
            TreeNode::new("b", "B"),
        ]);
        let config = LayoutConfig::default();
        let layout = compute_layout(&tree, &config);
        let dump = LayoutDump::from_layout(&layout, &config);
        assert_eq!(dump.nodes.len(), 4);
        assert_eq!(dump.edges.len(), 3);
        assert_eq!(dump.nodes[1].parent.as_deref(), Some("r"));
        assert_eq!(dump.nodes[0].children, vec!["a", "b"]);
        assert_eq!(dump.width, 400.0);
        let json = serde_json::to_value(&dump).unwrap();
        assert_eq!(json["edges"][2]["to"], "b");
    }
}
