use crate::config::load_config;
use crate::ir::FamilyGraph;
use crate::layout::compute_family_layout;
use crate::layout_dump::write_layout_dump;
use crate::render::{render_svg, write_output_svg};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ftl", version, about = "Family tree layout engine")]
pub struct Args {
    /// Input graph file (.json / .json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (themeVariables and layout overrides)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Measure names with the built-in character table instead of system fonts
    #[arg(long = "fastText", num_args = 0..=1, default_missing_value = "true")]
    pub fast_text: Option<bool>,

    /// PNG canvas width. SVG output is sized to the tree.
    #[arg(short = 'w', long = "width", default_value_t = 1200.0)]
    pub width: f32,

    /// PNG canvas height. SVG output is sized to the tree.
    #[arg(short = 'H', long = "height", default_value_t = 800.0)]
    pub height: f32,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

pub fn run() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .try_init();

    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    config.render.width = args.width;
    config.render.height = args.height;
    if let Some(fast_text) = args.fast_text {
        config.layout.fast_text_metrics = fast_text;
    }

    let graph = read_graph(args.input.as_deref())?;
    tracing::info!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "graph loaded"
    );
    let layout = compute_family_layout(&graph, &config.layout);

    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_svg(&layout, &graph, &config.theme, &config.render);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Json => match args.output.as_deref() {
            Some(path) => write_layout_dump(path, &layout, &graph)?,
            None => println!("{}", crate::layout_dump::layout_to_json(&layout, &graph)?),
        },
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_png(&layout, &graph, &config, &output)?;
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(
    layout: &crate::layout::FamilyLayout,
    graph: &FamilyGraph,
    config: &crate::config::Config,
    output: &Path,
) -> Result<()> {
    let svg = render_svg(layout, graph, &config.theme, &config.render);
    crate::render::write_output_png(&svg, output, &config.render)
}

#[cfg(not(feature = "png"))]
fn write_png(
    _layout: &crate::layout::FamilyLayout,
    _graph: &FamilyGraph,
    _config: &crate::config::Config,
    _output: &Path,
) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn read_graph(path: Option<&Path>) -> Result<FamilyGraph> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return Ok(FamilyGraph::from_path(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(FamilyGraph::from_json(&buf)?)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!(
        "Output path required for {} output",
        ext
    ))
}
