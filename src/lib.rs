#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig};
pub use error::InputError;
pub use ir::{FamilyGraph, Gender, Person};
pub use layout::{FamilyLayout, compute_family_layout};
pub use theme::Theme;

/// Everything needed to go from a JSON graph to output in one call.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::classic()
    }
}

impl RenderOptions {
    pub fn classic() -> Self {
        Self::from_theme(Theme::classic())
    }

    pub fn modern() -> Self {
        Self::from_theme(Theme::modern())
    }

    fn from_theme(theme: Theme) -> Self {
        let layout = LayoutConfig {
            font_family: theme.font_family.clone(),
            font_size: theme.font_size,
            ..Default::default()
        };
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout,
            render,
        }
    }
}

impl From<Config> for RenderOptions {
    fn from(config: Config) -> Self {
        Self {
            theme: config.theme,
            layout: config.layout,
            render: config.render,
        }
    }
}

pub fn render_with_options(json: &str, options: RenderOptions) -> anyhow::Result<String> {
    let graph = FamilyGraph::from_json(json)?;
    let layout = compute_family_layout(&graph, &options.layout);
    Ok(render::render_svg(
        &layout,
        &graph,
        &options.theme,
        &options.render,
    ))
}

/// Lays out a JSON graph and returns the serialized layout dump.
pub fn layout_with_options(json: &str, options: &RenderOptions) -> anyhow::Result<String> {
    let graph = FamilyGraph::from_json(json)?;
    let layout = compute_family_layout(&graph, &options.layout);
    layout_dump::layout_to_json(&layout, &graph)
}
