#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
#[cfg(feature = "summarize")]
pub mod ingest;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod session;
#[cfg(feature = "summarize")]
pub mod summarize;
pub mod theme;
pub mod view;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, ViewConfig, load_config};
pub use ir::{MindMap, TreeError, TreeNode};
pub use layout::{Layout, LayoutNode, compute_layout};
pub use render::{Scene, paint, render_svg};
pub use session::{RenderError, RenderSession};
pub use theme::Theme;
pub use view::{PanZoomController, ViewTransform, Viewport};

/// Everything needed to turn tree JSON into an SVG in one call.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub view: ViewConfig,
    pub width: f32,
    pub height: f32,
}

impl RenderOptions {
    pub fn light() -> Self {
        Self {
            theme: Theme::light(),
            layout: LayoutConfig::default(),
            view: ViewConfig::default(),
            width: 1200.0,
            height: 800.0,
        }
    }

    pub fn dark() -> Self {
        Self {
            theme: Theme::dark(),
            ..Self::light()
        }
    }

    pub fn into_config(self) -> Config {
        let mut config = Config::default();
        config.render.background = self.theme.background.clone();
        config.render.width = self.width;
        config.render.height = self.height;
        config.theme = self.theme;
        config.layout = self.layout;
        config.view = self.view;
        config
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::light()
    }
}

/// Parse tree JSON and render it at the initial view transform.
pub fn render_with_options(input: &str, options: RenderOptions) -> Result<String, RenderError> {
    let config = options.into_config();
    let map = MindMap::from_json(input, config.layout.max_depth)?;
    let session = RenderSession::new(&map, &config)?;
    Ok(session.to_svg())
}
