use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use mindmap_rs_renderer::config::LayoutConfig;
use mindmap_rs_renderer::ir::DEFAULT_MAX_DEPTH;
use mindmap_rs_renderer::{
    Config, MindMap, RenderSession, TreeError, TreeNode, Viewport, compute_layout,
};

fn fixture_dir(kind: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(kind)
}

fn load_fixture(path: &Path) -> Result<MindMap, TreeError> {
    let input = std::fs::read_to_string(path).expect("fixture read failed");
    MindMap::from_json(&input, DEFAULT_MAX_DEPTH)
}

fn assert_valid_svg(svg: &str, fixture: &str) {
    assert!(svg.contains("<svg"), "{fixture}: missing <svg tag");
    assert!(svg.contains("</svg>"), "{fixture}: missing </svg tag");
}

fn fan_out(depth: usize, width: usize, prefix: &str) -> TreeNode {
    let children = if depth == 0 {
        Vec::new()
    } else {
        (0..width)
            .map(|idx| fan_out(depth - 1, width, &format!("{prefix}-{idx}")))
            .collect()
    };
    TreeNode::new(prefix, format!("Topic {prefix}")).with_children(children)
}

#[test]
fn render_all_fixtures() {
    // Keep this list explicit so new fixtures must be added intentionally.
    let candidates = [
        "basic.json",
        "single.json",
        "rust_notes.json",
        "long_labels.json",
    ];

    for rel in candidates {
        let path = fixture_dir("valid").join(rel);
        assert!(path.exists(), "fixture missing: {rel}");
        let map = load_fixture(&path).unwrap_or_else(|err| panic!("{rel}: {err}"));
        let session = RenderSession::new(&map, &Config::default()).expect("render failed");
        let svg = session.to_svg();
        assert_valid_svg(&svg, rel);
        let nodes = map.root.node_count();
        assert_eq!(svg.matches("class=\"node\"").count(), nodes, "{rel}");
        assert_eq!(svg.matches("class=\"link\"").count(), nodes - 1, "{rel}");
    }
}

#[test]
fn reject_invalid_fixtures() {
    let expectations: [(&str, fn(&TreeError) -> bool); 4] = [
        ("missing_label.json", |err| {
            matches!(err, TreeError::MissingField { field: "label", path } if path == "root.children[1]")
        }),
        ("missing_id.json", |err| {
            matches!(err, TreeError::MissingField { field: "id", .. })
        }),
        ("empty_root.json", |err| matches!(err, TreeError::EmptyTree)),
        ("children_not_array.json", |err| {
            matches!(err, TreeError::InvalidField { field: "children", .. })
        }),
    ];
    for (rel, check) in expectations {
        let err = load_fixture(&fixture_dir("invalid").join(rel)).expect_err(rel);
        assert!(check(&err), "{rel}: unexpected error {err:?}");
    }
}

#[test]
fn root_with_two_children_example() {
    let map = load_fixture(&fixture_dir("valid").join("basic.json")).unwrap();
    let session = RenderSession::new(&map, &Config::default()).unwrap();
    let scene = session.scene();
    assert_eq!(scene.nodes.len(), 3);
    assert_eq!(scene.links.len(), 2);

    let a = scene.nodes.iter().find(|n| n.label == "A").unwrap();
    let b = scene.nodes.iter().find(|n| n.label == "B").unwrap();
    assert_eq!((a.depth, b.depth), (1, 1));
    assert_ne!(a.y, b.y);
    // Boxes are the same height and stacked on the sibling axis.
    assert!((b.y - a.y).abs() >= a.height);
}

#[test]
fn single_node_renders_one_box_no_edges() {
    let map = load_fixture(&fixture_dir("valid").join("single.json")).unwrap();
    let session = RenderSession::new(&map, &Config::default()).unwrap();
    assert_eq!(session.scene().nodes.len(), 1);
    assert!(session.scene().links.is_empty());
    // Centered: the root sits on the viewport center.
    let (cx, cy) = session.viewport().center();
    assert_eq!(session.transform().apply(0.0, 0.0), (cx, cy));
}

#[test]
fn forty_node_tree_lays_out_within_budget() {
    let tree = fan_out(3, 3, "n");
    assert_eq!(tree.node_count(), 40);

    let config = LayoutConfig::default();
    let started = Instant::now();
    let layout = compute_layout(&tree, &config);
    let elapsed = started.elapsed();

    assert!(elapsed < Duration::from_millis(200), "layout took {elapsed:?}");
    assert_eq!(layout.nodes.len(), 40);
    assert_eq!(layout.edges().count(), 39);
}

#[test]
fn several_hundred_nodes_stay_fast() {
    let tree = fan_out(5, 3, "n");
    assert_eq!(tree.node_count(), 364);
    let started = Instant::now();
    let session = RenderSession::new(&MindMap::new(tree), &Config::default()).unwrap();
    let _ = session.to_svg();
    assert!(started.elapsed() < Duration::from_millis(200));
    assert_eq!(session.scene().links.len(), 363);
}

#[test]
fn depth_and_order_properties_hold_on_fixture() {
    let map = load_fixture(&fixture_dir("valid").join("rust_notes.json")).unwrap();
    let layout = compute_layout(&map.root, &LayoutConfig::default());
    assert_eq!(layout.root().depth, 0);
    for (parent, child) in layout.edges() {
        assert_eq!(layout.nodes[child].depth, layout.nodes[parent].depth + 1);
    }
    for node in &layout.nodes {
        let expected: Vec<&str> = node.node.children.iter().map(|c| c.id.as_str()).collect();
        let actual: Vec<&str> = node
            .children
            .iter()
            .map(|idx| layout.nodes[*idx].node.id.as_str())
            .collect();
        assert_eq!(expected, actual);
        let ys: Vec<f32> = node.children.iter().map(|idx| layout.nodes[*idx].y).collect();
        assert!(ys.windows(2).all(|pair| pair[0] < pair[1]));
    }
}

#[test]
fn resize_after_render_keeps_positions() {
    let map = load_fixture(&fixture_dir("valid").join("rust_notes.json")).unwrap();
    let mut session =
        RenderSession::with_viewport(&map, &Config::default(), Viewport::new(800.0, 600.0))
            .unwrap();
    session.wheel(-240.0, 200.0, 150.0);
    session.pointer_down(10.0, 10.0);
    session.pointer_move(60.0, 35.0);
    session.pointer_up();

    let positions: Vec<(f32, f32)> = session.scene().nodes.iter().map(|n| (n.x, n.y)).collect();
    let transform = session.transform();
    session.resize(Viewport::new(1600.0, 400.0)).unwrap();
    let after: Vec<(f32, f32)> = session.scene().nodes.iter().map(|n| (n.x, n.y)).collect();

    assert_eq!(positions, after);
    assert_eq!(session.transform(), transform);
    assert!(session.to_svg().contains("viewBox=\"0 0 1600 400\""));
}

#[test]
fn zoom_request_far_out_of_range_clamps() {
    let map = load_fixture(&fixture_dir("valid").join("basic.json")).unwrap();
    let mut session = RenderSession::new(&map, &Config::default()).unwrap();
    session.pinch(100.0, 0.0, 0.0);
    assert_eq!(session.transform().scale, 4.0);
    session.pinch(0.0001, 0.0, 0.0);
    assert_eq!(session.transform().scale, 0.1);
}

#[test]
fn duplicate_ids_render_every_node() {
    let input = r#"{"root":{"id":"r","label":"Root","children":[
        {"id":"dup","label":"First"},
        {"id":"dup","label":"Second"}
    ]}}"#;
    let map = MindMap::from_json(input, DEFAULT_MAX_DEPTH).unwrap();
    let session = RenderSession::new(&map, &Config::default()).unwrap();
    let scene = session.scene();
    assert_eq!(scene.nodes.len(), 3);
    assert_eq!(scene.links.len(), 2);
    assert_ne!(scene.nodes[1].y, scene.nodes[2].y);

    let svg = session.to_svg();
    assert_eq!(svg.matches("data-id=\"dup\"").count(), 2);
    assert!(svg.contains(">First<") && svg.contains(">Second<"));
}
