use crate::config::{Config, load_config};
use crate::ir::MindMap;
use crate::layout::compute_layout;
use crate::layout_dump::write_layout_dump;
use crate::render::{write_output_png, write_output_svg};
use crate::session::RenderSession;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "mmap",
    version,
    about = "Turn a document or image into a mind map, or render an existing tree"
)]
pub struct Args {
    /// Tree JSON file ({"root": {...}} or a bare node) or '-' for stdin
    #[arg(short = 'i', long = "input", conflicts_with = "source")]
    pub input: Option<PathBuf>,

    /// Text or image file to summarize into a tree with the hosted model
    #[arg(short = 's', long = "source")]
    pub source: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config file (JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Viewport width
    #[arg(short = 'w', long = "width", default_value_t = 1200.0)]
    pub width: f32,

    /// Viewport height
    #[arg(short = 'H', long = "height", default_value_t = 800.0)]
    pub height: f32,

    /// Zoom level applied around the viewport center (clamped to the scale range)
    #[arg(long = "zoom")]
    pub zoom: Option<f32>,

    /// Horizontal pan in screen pixels
    #[arg(long = "pan-x", default_value_t = 0.0, allow_negative_numbers = true)]
    pub pan_x: f32,

    /// Vertical pan in screen pixels
    #[arg(long = "pan-y", default_value_t = 0.0, allow_negative_numbers = true)]
    pub pan_y: f32,

    /// Write the tree used for rendering as JSON
    #[arg(long = "save-tree")]
    pub save_tree: Option<PathBuf>,

    /// Write computed node positions as JSON
    #[arg(long = "dump-layout")]
    pub dump_layout: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing()?;
    run_with_args(args)
}

pub fn run_with_args(args: Args) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    config.render.width = args.width;
    config.render.height = args.height;

    let map = match args.source.as_deref() {
        Some(source) => summarize_source(source, &config)?,
        None => read_tree(args.input.as_deref(), config.layout.max_depth)?,
    };

    if let Some(path) = args.save_tree.as_deref() {
        std::fs::write(path, map.to_json_pretty()?)
            .with_context(|| format!("failed to write tree to {}", path.display()))?;
    }

    let mut session = RenderSession::new(&map, &config)?;
    if let Some(zoom) = args.zoom {
        let (cx, cy) = session.viewport().center();
        session.zoom_to(zoom, cx, cy);
    }
    session.pan_by(args.pan_x, args.pan_y);

    if let Some(path) = args.dump_layout.as_deref() {
        let layout = compute_layout(&map.root, &config.layout);
        write_layout_dump(path, &layout, &config.layout)?;
    }

    let svg = session.to_svg();
    match args.output_format {
        OutputFormat::Svg => write_output_svg(&svg, args.output.as_deref())?,
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_output_png(&svg, &output, &config.render)?;
        }
    }
    info!(
        nodes = session.scene().nodes.len(),
        format = ?args.output_format,
        "mind map written"
    );
    Ok(())
}

fn init_tracing() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,mindmap_rs_renderer=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))
}

fn read_tree(path: Option<&Path>, max_depth: usize) -> Result<MindMap> {
    let input = match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(MindMap::from_json(&input, max_depth)?)
}

#[cfg(feature = "summarize")]
fn summarize_source(path: &Path, config: &Config) -> Result<MindMap> {
    use crate::ingest::load_source;
    use crate::summarize::GeminiClient;
    use tracing::error;

    let source = load_source(path)?;
    let client = GeminiClient::from_env(config.summarizer.clone())
        .map_err(|err| anyhow::anyhow!(err.user_message()))?
        .with_max_depth(config.layout.max_depth);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    info!(source = %source.name, model = client.model(), "generating mind map");
    runtime
        .block_on(client.generate_tree(&source))
        .map_err(|err| {
            error!(error = %err, "generation failed");
            anyhow::anyhow!(err.user_message())
        })
}

#[cfg(not(feature = "summarize"))]
fn summarize_source(_path: &Path, _config: &Config) -> Result<MindMap> {
    Err(anyhow::anyhow!(
        "--source requires building with the `summarize` feature"
    ))
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
