use crate::ir::DEFAULT_MAX_DEPTH;
use crate::theme::Theme;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Node box geometry. Purely cosmetic: none of these feed back into positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeBoxConfig {
    pub min_width: f32,
    pub char_width: f32,
    pub padding: f32,
    pub height: f32,
    pub offset_x: f32,
    pub corner_radius: f32,
    pub label_baseline: f32,
}

impl Default for NodeBoxConfig {
    fn default() -> Self {
        Self {
            min_width: 100.0,
            char_width: 8.0,
            padding: 20.0,
            height: 40.0,
            offset_x: -10.0,
            corner_radius: 8.0,
            label_baseline: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Distance between adjacent sibling centers on the sibling axis.
    pub node_spacing: f32,
    /// Distance between consecutive depth levels.
    pub level_spacing: f32,
    /// Slots between nodes sharing a parent.
    pub sibling_separation: f32,
    /// Slots between neighbours with different parents.
    pub cousin_separation: f32,
    pub max_depth: usize,
    pub node_box: NodeBoxConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_spacing: 60.0,
            level_spacing: 200.0,
            sibling_separation: 1.0,
            cousin_separation: 2.0,
            max_depth: DEFAULT_MAX_DEPTH,
            node_box: NodeBoxConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    pub min_scale: f32,
    pub max_scale: f32,
    pub initial_scale: f32,
    /// Zoom exponent per wheel delta unit (pixel mode).
    pub wheel_sensitivity: f32,
    pub show_legend: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 4.0,
            initial_scale: 0.8,
            wheel_sensitivity: 0.002,
            show_legend: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#F8FAFC".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    pub model: String,
    pub base_url: String,
    pub timeout_ms: u64,
    /// Never read from the config file; filled from the environment.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub view: ViewConfig,
    pub render: RenderConfig,
    pub summarizer: SummarizerConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::light();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            view: ViewConfig::default(),
            render,
            summarizer: SummarizerConfig::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    view: Option<ViewConfigFile>,
    summarizer: Option<SummarizerConfigFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    label_color: Option<String>,
    line_color: Option<String>,
    node_stroke: Option<String>,
    depth_colors: Option<Vec<String>>,
    fallback_color: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    node_spacing: Option<f32>,
    level_spacing: Option<f32>,
    sibling_separation: Option<f32>,
    cousin_separation: Option<f32>,
    max_depth: Option<usize>,
    node_min_width: Option<f32>,
    node_height: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViewConfigFile {
    min_scale: Option<f32>,
    max_scale: Option<f32>,
    initial_scale: Option<f32>,
    wheel_sensitivity: Option<f32>,
    show_legend: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummarizerConfigFile {
    model: Option<String>,
    base_url: Option<String>,
    timeout_ms: Option<u64>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("invalid config file {}", path.display()))
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "dark" => config.theme = Theme::dark(),
            "default" | "light" => config.theme = Theme::light(),
            other => anyhow::bail!("unknown theme `{other}`; expected `default` or `dark`"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.label_color {
            config.theme.label_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.node_stroke {
            config.theme.node_stroke = v;
        }
        if let Some(v) = vars.depth_colors {
            config.theme.depth_fills = v;
        }
        if let Some(v) = vars.fallback_color {
            config.theme.fallback_fill = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.node_spacing {
            config.layout.node_spacing = v;
        }
        if let Some(v) = layout.level_spacing {
            config.layout.level_spacing = v;
        }
        if let Some(v) = layout.sibling_separation {
            config.layout.sibling_separation = v;
        }
        if let Some(v) = layout.cousin_separation {
            config.layout.cousin_separation = v;
        }
        if let Some(v) = layout.max_depth {
            config.layout.max_depth = v;
        }
        if let Some(v) = layout.node_min_width {
            config.layout.node_box.min_width = v;
        }
        if let Some(v) = layout.node_height {
            config.layout.node_box.height = v;
        }
    }

    if let Some(view) = parsed.view {
        if let Some(v) = view.min_scale {
            config.view.min_scale = v;
        }
        if let Some(v) = view.max_scale {
            config.view.max_scale = v;
        }
        if let Some(v) = view.initial_scale {
            config.view.initial_scale = v;
        }
        if let Some(v) = view.wheel_sensitivity {
            config.view.wheel_sensitivity = v;
        }
        if let Some(v) = view.show_legend {
            config.view.show_legend = v;
        }
    }

    if let Some(summarizer) = parsed.summarizer {
        if let Some(v) = summarizer.model {
            config.summarizer.model = v;
        }
        if let Some(v) = summarizer.base_url {
            config.summarizer.base_url = v;
        }
        if let Some(v) = summarizer.timeout_ms {
            config.summarizer.timeout_ms = v;
        }
    }

    anyhow::ensure!(
        config.layout.node_spacing > 0.0 && config.layout.level_spacing > 0.0,
        "layout spacing must be positive"
    );
    anyhow::ensure!(
        config.layout.sibling_separation > 0.0
            && config.layout.cousin_separation >= config.layout.sibling_separation,
        "layout separation must satisfy 0 < siblingSeparation <= cousinSeparation"
    );
    anyhow::ensure!(
        config.view.min_scale > 0.0
            && config.view.max_scale.is_finite()
            && config.view.min_scale <= config.view.max_scale,
        "view scale range must satisfy 0 < minScale <= maxScale < Infinity"
    );
    anyhow::ensure!(
        config.view.initial_scale.is_finite(),
        "view initialScale must be a finite number"
    );
    anyhow::ensure!(
        config.view.wheel_sensitivity.is_finite() && config.view.wheel_sensitivity > 0.0,
        "view wheelSensitivity must be a positive finite number"
    );

    config.render.background = config.theme.background.clone();

    Ok(config)
}
