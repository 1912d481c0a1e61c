use crate::config::{Config, LayoutConfig};
use crate::ir::{MindMap, TreeError};
use crate::layout::compute_layout;
use crate::render::{Scene, SvgOptions, paint, render_svg};
use crate::theme::Theme;
use crate::view::{GestureState, PanZoomController, ViewTransform, Viewport};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error("viewport must have a positive size, got {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },
}

/// One tree on screen: the painted scene plus its pan/zoom state.
///
/// Built in one step, so a tree that fails validation never produces a
/// partially drawn session. Supplying a new tree means building a new session.
#[derive(Debug, Clone)]
pub struct RenderSession {
    scene: Scene,
    controller: PanZoomController,
    theme: Theme,
    layout_config: LayoutConfig,
    show_legend: bool,
}

impl RenderSession {
    pub fn new(map: &MindMap, config: &Config) -> Result<Self, RenderError> {
        Self::with_viewport(
            map,
            config,
            Viewport::new(config.render.width, config.render.height),
        )
    }

    pub fn with_viewport(
        map: &MindMap,
        config: &Config,
        viewport: Viewport,
    ) -> Result<Self, RenderError> {
        if !viewport.is_valid() {
            return Err(RenderError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        map.validate(config.layout.max_depth)?;

        let layout = compute_layout(&map.root, &config.layout);
        let scene = paint(&layout, &config.theme, &config.layout);
        info!(
            root = %map.root.label,
            nodes = scene.nodes.len(),
            links = scene.links.len(),
            "rendered mind map"
        );

        Ok(Self {
            scene,
            controller: PanZoomController::new(viewport, config.view.clone()),
            theme: config.theme.clone(),
            layout_config: config.layout.clone(),
            show_legend: config.view.show_legend,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn transform(&self) -> ViewTransform {
        self.controller.transform()
    }

    pub fn viewport(&self) -> Viewport {
        self.controller.viewport()
    }

    pub fn gesture(&self) -> GestureState {
        self.controller.state()
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.controller.pointer_down(x, y);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        self.controller.pointer_move(x, y)
    }

    pub fn pointer_up(&mut self) {
        self.controller.pointer_up();
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) -> bool {
        self.controller.pan_by(dx, dy)
    }

    pub fn wheel(&mut self, delta_y: f32, x: f32, y: f32) -> bool {
        self.controller.wheel(delta_y, x, y)
    }

    pub fn pinch(&mut self, factor: f32, x: f32, y: f32) -> bool {
        self.controller.pinch(factor, x, y)
    }

    pub fn zoom_to(&mut self, scale: f32, x: f32, y: f32) -> bool {
        self.controller.zoom_to(scale, x, y)
    }

    pub fn reset_view(&mut self) {
        self.controller.reset();
    }

    /// Only the renderable area changes; layout and pan/zoom stay put.
    pub fn resize(&mut self, viewport: Viewport) -> Result<(), RenderError> {
        if !viewport.is_valid() {
            return Err(RenderError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        debug!(width = viewport.width, height = viewport.height, "viewport resized");
        self.controller.resize(viewport);
        Ok(())
    }

    pub fn to_svg(&self) -> String {
        render_svg(
            &self.scene,
            &self.controller.transform(),
            &self.controller.viewport(),
            &self.theme,
            &self.layout_config,
            SvgOptions {
                show_legend: self.show_legend,
            },
        )
    }
}
