use crate::config::{LayoutConfig, RenderConfig};
use crate::layout::{Bounds, Layout};
use crate::theme::Theme;
use crate::view::{ViewTransform, Viewport};
use anyhow::Result;
use std::path::Path;
use tracing::debug;

/// A painted node: rounded box plus label, positioned at its layout point.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeBox {
    pub id: String,
    pub label: String,
    pub tooltip: String,
    pub depth: usize,
    pub x: f32,
    pub y: f32,
    /// Box geometry relative to `(x, y)`.
    pub rect_x: f32,
    pub rect_y: f32,
    pub width: f32,
    pub height: f32,
    pub fill: String,
}

/// A parent→child link, drawn as a horizontal cubic curve.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkPath {
    pub from: String,
    pub to: String,
    pub source: (f32, f32),
    pub target: (f32, f32),
}

impl LinkPath {
    pub fn path_data(&self) -> String {
        let (sx, sy) = self.source;
        let (tx, ty) = self.target;
        let mx = (sx + tx) / 2.0;
        format!("M{sx:.2},{sy:.2}C{mx:.2},{sy:.2} {mx:.2},{ty:.2} {tx:.2},{ty:.2}")
    }
}

/// Transform-independent vector scene in layout coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub nodes: Vec<NodeBox>,
    pub links: Vec<LinkPath>,
    pub bounds: Bounds,
}

pub fn node_box_width(label: &str, config: &LayoutConfig) -> f32 {
    let chars = label.chars().count() as f32;
    let node_box = &config.node_box;
    node_box.min_width.max(chars * node_box.char_width + node_box.padding)
}

pub fn paint(layout: &Layout<'_>, theme: &Theme, config: &LayoutConfig) -> Scene {
    let node_box = &config.node_box;
    let mut bounds = Bounds::empty();
    let mut nodes = Vec::with_capacity(layout.nodes.len());
    for node in &layout.nodes {
        let width = node_box_width(&node.node.label, config);
        let rect_x = node_box.offset_x;
        let rect_y = -node_box.height / 2.0;
        bounds.union_point(node.x + rect_x, node.y + rect_y);
        bounds.union_point(node.x + rect_x + width, node.y + rect_y + node_box.height);
        nodes.push(NodeBox {
            id: node.node.id.clone(),
            label: node.node.label.clone(),
            tooltip: node.node.tooltip().to_string(),
            depth: node.depth,
            x: node.x,
            y: node.y,
            rect_x,
            rect_y,
            width,
            height: node_box.height,
            fill: theme.fill_for_depth(node.depth).to_string(),
        });
    }

    let links: Vec<LinkPath> = layout
        .edges()
        .map(|(parent, child)| {
            let from = &layout.nodes[parent];
            let to = &layout.nodes[child];
            LinkPath {
                from: from.node.id.clone(),
                to: to.node.id.clone(),
                source: (from.x, from.y),
                target: (to.x, to.y),
            }
        })
        .collect();

    if bounds.is_empty() {
        bounds = Bounds {
            min_x: 0.0,
            min_y: 0.0,
            max_x: 0.0,
            max_y: 0.0,
        };
    }
    debug!(nodes = nodes.len(), links = links.len(), "painted scene");

    Scene {
        nodes,
        links,
        bounds,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SvgOptions {
    pub show_legend: bool,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self { show_legend: true }
    }
}

pub fn render_svg(
    scene: &Scene,
    transform: &ViewTransform,
    viewport: &Viewport,
    theme: &Theme,
    config: &LayoutConfig,
    options: SvgOptions,
) -> String {
    let width = viewport.width.max(1.0);
    let height = viewport.height.max(1.0);
    let mut svg = String::with_capacity(256 + scene.nodes.len() * 420 + scene.links.len() * 160);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));
    svg.push_str(&format!(
        "<defs><filter id=\"node-shadow\" x=\"-20%\" y=\"-20%\" width=\"140%\" height=\"160%\"><feDropShadow dx=\"0\" dy=\"4\" stdDeviation=\"3\" flood-color=\"#000000\" flood-opacity=\"{}\"/></filter></defs>",
        theme.shadow_opacity
    ));

    svg.push_str(&format!(
        "<g class=\"scene\" transform=\"{}\">",
        transform.to_svg_attr()
    ));

    for link in &scene.links {
        svg.push_str(&format!(
            "<path class=\"link\" d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>",
            link.path_data(),
            theme.line_color,
            theme.line_width
        ));
    }

    let corner = config.node_box.corner_radius;
    let baseline = config.node_box.label_baseline;
    for node in &scene.nodes {
        let label_x = node.rect_x + node.width / 2.0;
        svg.push_str(&format!(
            "<g class=\"node\" data-id=\"{}\" data-depth=\"{}\" transform=\"translate({:.2},{:.2})\">",
            escape_xml(&node.id),
            node.depth,
            node.x,
            node.y
        ));
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{corner}\" ry=\"{corner}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\" filter=\"url(#node-shadow)\"/>",
            node.rect_x,
            node.rect_y,
            node.width,
            node.height,
            node.fill,
            theme.node_stroke,
            theme.node_stroke_width
        ));
        svg.push_str(&format!(
            "<text x=\"{label_x:.2}\" dy=\"{baseline}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"{}\" fill=\"{}\" pointer-events=\"none\">{}</text>",
            escape_xml(&theme.font_family),
            theme.font_size,
            theme.font_weight,
            theme.label_color,
            escape_xml(&node.label)
        ));
        svg.push_str(&format!("<title>{}</title>", escape_xml(&node.tooltip)));
        svg.push_str("</g>");
    }
    svg.push_str("</g>");

    if options.show_legend {
        svg.push_str(&legend_svg(width, theme));
    }

    svg.push_str("</svg>");
    svg
}

fn legend_svg(viewport_width: f32, theme: &Theme) -> String {
    let legend_w = 150.0;
    let legend_h = 70.0;
    let x = (viewport_width - legend_w - 16.0).max(0.0);
    let y = 16.0;
    let mut out = String::new();
    out.push_str(&format!(
        "<g class=\"legend\" transform=\"translate({x:.2},{y:.2})\">"
    ));
    out.push_str(&format!(
        "<rect width=\"{legend_w}\" height=\"{legend_h}\" rx=\"8\" ry=\"8\" fill=\"{}\" fill-opacity=\"0.9\" stroke=\"{}\"/>",
        theme.legend_background, theme.legend_border
    ));
    let lines = [
        ("Navigation", "600", 22.0),
        ("\u{2022} Scroll/Pinch to Zoom", "400", 42.0),
        ("\u{2022} Drag to Pan", "400", 58.0),
    ];
    for (text, weight, dy) in lines {
        out.push_str(&format!(
            "<text x=\"12\" y=\"{dy}\" font-family=\"{}\" font-size=\"12\" font-weight=\"{weight}\" fill=\"{}\">{}</text>",
            escape_xml(&theme.font_family),
            theme.legend_text,
            escape_xml(text)
        ));
    }
    out.push_str("</g>");
    out
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "sans-serif".to_string();
    opt.fontdb_mut().load_system_fonts();
    if let Some(size) = usvg::Size::from_wh(render_cfg.width, render_cfg.height) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> Result<()> {
    Err(anyhow::anyhow!(
        "PNG output requires building with the `png` feature"
    ))
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
