use mindmap_rs_renderer::{
    MindMap, RenderOptions, RenderSession, Viewport, render_with_options,
};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MindMapRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    width: Option<f32>,
    height: Option<f32>,
    show_legend: Option<bool>,
}

fn parse_options(options_json: Option<String>) -> Result<MindMapRenderOptions, String> {
    match options_json {
        Some(raw_options) => serde_json::from_str::<MindMapRenderOptions>(&raw_options)
            .map_err(|error| error.to_string()),
        None => Ok(MindMapRenderOptions::default()),
    }
}

fn build_render_options(options: MindMapRenderOptions) -> RenderOptions {
    let mut render_options = if options.theme.as_deref() == Some("dark") {
        RenderOptions::dark()
    } else {
        RenderOptions::light()
    };

    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        render_options.theme.font_size = font_size;
    }
    if let Some(width) = options.width {
        render_options.width = width;
    }
    if let Some(height) = options.height {
        render_options.height = height;
    }
    if let Some(show_legend) = options.show_legend {
        render_options.view.show_legend = show_legend;
    }

    render_options
}

#[wasm_bindgen]
pub fn render_mindmap_svg(json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = parse_options(options_json).map_err(|error| JsValue::from_str(&error))?;
    render_with_options(json, build_render_options(options))
        .map_err(|error| JsValue::from_str(&error.to_string()))
}

/// Interactive view for a host page: feed it pointer and wheel events and
/// re-read `svg()` after every call that returns `true`.
#[wasm_bindgen]
pub struct MindMapView {
    options_json: Option<String>,
    session: Option<RenderSession>,
}

#[wasm_bindgen]
impl MindMapView {
    #[wasm_bindgen(constructor)]
    pub fn new(options_json: Option<String>) -> MindMapView {
        MindMapView {
            options_json,
            session: None,
        }
    }

    /// Replace the displayed tree. On failure the previous map is cleared so
    /// nothing stale stays on screen.
    pub fn load(&mut self, json: &str) -> Result<(), JsValue> {
        self.load_tree(json).map_err(|error| JsValue::from_str(&error))
    }

    pub fn is_loaded(&self) -> bool {
        self.session.is_some()
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        if let Some(session) = self.session.as_mut() {
            session.pointer_down(x, y);
        }
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        self.session
            .as_mut()
            .is_some_and(|session| session.pointer_move(x, y))
    }

    pub fn pointer_up(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.pointer_up();
        }
    }

    pub fn wheel(&mut self, delta_y: f32, x: f32, y: f32) -> bool {
        self.session
            .as_mut()
            .is_some_and(|session| session.wheel(delta_y, x, y))
    }

    pub fn pinch(&mut self, factor: f32, x: f32, y: f32) -> bool {
        self.session
            .as_mut()
            .is_some_and(|session| session.pinch(factor, x, y))
    }

    pub fn reset_view(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.reset_view();
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), JsValue> {
        match self.session.as_mut() {
            Some(session) => session
                .resize(Viewport::new(width, height))
                .map_err(|error| JsValue::from_str(&error.to_string())),
            None => Ok(()),
        }
    }

    /// Current frame, or an empty string before a tree has been loaded.
    pub fn svg(&self) -> String {
        self.session
            .as_ref()
            .map(RenderSession::to_svg)
            .unwrap_or_default()
    }
}

impl MindMapView {
    fn load_tree(&mut self, json: &str) -> Result<(), String> {
        self.session = None;
        let options = parse_options(self.options_json.clone())?;
        let config = build_render_options(options).into_config();
        let map = MindMap::from_json(json, config.layout.max_depth).map_err(|e| e.to_string())?;
        let session = RenderSession::new(&map, &config).map_err(|e| e.to_string())?;
        self.session = Some(session);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mindmap_rs_renderer::render_with_options;

    use crate::{MindMapRenderOptions, MindMapView, build_render_options, parse_options};

    const TREE: &str = r#"{"root":{"id":"r","label":"Rust","children":[
        {"id":"o","label":"Ownership","details":"Each value has one owner"},
        {"id":"t","label":"Traits","children":[{"id":"g","label":"Generics"}]}
    ]}}"#;

    #[test]
    fn renders_tree_with_default_options() {
        let svg = render_with_options(TREE, build_render_options(MindMapRenderOptions::default()))
            .expect("tree should render");

        assert!(svg.contains("<svg"));
        assert!(svg.contains("Ownership"));
        assert!(svg.contains("Each value has one owner"));
        assert!(svg.contains("Drag to Pan"));
    }

    #[test]
    fn options_are_camel_case() {
        let options = parse_options(Some(
            r#"{"theme":"dark","fontSize":18,"width":640,"showLegend":false}"#.to_string(),
        ))
        .unwrap();
        let render_options = build_render_options(options);
        assert_eq!(render_options.theme.font_size, 18.0);
        assert_eq!(render_options.width, 640.0);
        assert!(!render_options.view.show_legend);

        let svg = render_with_options(TREE, render_options).unwrap();
        assert!(!svg.contains("Drag to Pan"));
    }

    #[test]
    fn view_tracks_gestures_and_clears_on_bad_input() {
        let mut view = MindMapView::new(None);
        assert_eq!(view.svg(), "");
        assert!(!view.pointer_move(5.0, 5.0));

        view.load_tree(TREE).unwrap();
        let first = view.svg();
        view.pointer_down(10.0, 10.0);
        assert!(view.pointer_move(30.0, 25.0));
        view.pointer_up();
        assert!(!view.pointer_move(60.0, 60.0));
        assert_ne!(view.svg(), first);

        assert!(view.load_tree(r#"{"root":{"id":"r"}}"#).is_err());
        assert!(!view.is_loaded());
        assert_eq!(view.svg(), "");
    }
}
