use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Floor for a person box, regardless of name length.
    pub node_min_width: f32,
    pub node_height: f32,
    /// Horizontal padding added on each side of the measured name.
    pub node_padding_x: f32,
    /// Vertical distance between generations; `y = generation * generation_gap`.
    pub generation_gap: f32,
    /// Gap between neighbouring couple-groups in one generation.
    pub sibling_gap: f32,
    /// Gap between spouses inside a couple-group.
    pub spouse_gap: f32,
    pub font_size: f32,
    pub font_family: String,
    /// Use the calibrated character table instead of system fonts.
    pub fast_text_metrics: bool,
    /// Vertical step between staggered family connector bars.
    pub connector_stagger: f32,
    pub arrow_size: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_min_width: 120.0,
            node_height: 60.0,
            node_padding_x: 16.0,
            generation_gap: 150.0,
            sibling_gap: 40.0,
            spouse_gap: 20.0,
            font_size: 14.0,
            font_family: "\"trebuchet ms\", verdana, arial, sans-serif".to_string(),
            fast_text_metrics: true,
            connector_stagger: 8.0,
            arrow_size: 6.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// PNG canvas size. SVG output always takes the tree's own extent.
    pub width: f32,
    pub height: f32,
    pub background: String,
    pub padding: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
            padding: 40.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        let layout = LayoutConfig {
            font_family: theme.font_family.clone(),
            font_size: theme.font_size,
            ..Default::default()
        };
        Self {
            theme,
            layout,
            render,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    male_fill: Option<String>,
    female_fill: Option<String>,
    unknown_fill: Option<String>,
    node_border: Option<String>,
    text_color: Option<String>,
    line_color: Option<String>,
    first_marriage_color: Option<String>,
    later_marriage_color: Option<String>,
    later_marriage_dasharray: Option<String>,
    consanguineous_color: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    node_min_width: Option<f32>,
    node_height: Option<f32>,
    node_padding_x: Option<f32>,
    generation_gap: Option<f32>,
    sibling_gap: Option<f32>,
    spouse_gap: Option<f32>,
    fast_text_metrics: Option<bool>,
    connector_stagger: Option<f32>,
    arrow_size: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "modern" {
            config.theme = Theme::modern();
        } else if theme_name == "classic" || theme_name == "default" {
            config.theme = Theme::classic();
        } else {
            tracing::warn!(theme = theme_name, "unknown theme preset, keeping default");
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.male_fill {
            config.theme.male_fill = v;
        }
        if let Some(v) = vars.female_fill {
            config.theme.female_fill = v;
        }
        if let Some(v) = vars.unknown_fill {
            config.theme.unknown_fill = v;
        }
        if let Some(v) = vars.node_border {
            config.theme.node_border = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.first_marriage_color {
            config.theme.first_marriage_color = v;
        }
        if let Some(v) = vars.later_marriage_color {
            config.theme.later_marriage_color = v;
        }
        if let Some(v) = vars.later_marriage_dasharray {
            config.theme.later_marriage_dasharray = v;
        }
        if let Some(v) = vars.consanguineous_color {
            config.theme.consanguineous_color = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
    }

    // Text measurement follows the theme font.
    config.layout.font_family = config.theme.font_family.clone();
    config.layout.font_size = config.theme.font_size;

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.node_min_width {
            config.layout.node_min_width = v;
        }
        if let Some(v) = layout.node_height {
            config.layout.node_height = v;
        }
        if let Some(v) = layout.node_padding_x {
            config.layout.node_padding_x = v;
        }
        if let Some(v) = layout.generation_gap {
            config.layout.generation_gap = v;
        }
        if let Some(v) = layout.sibling_gap {
            config.layout.sibling_gap = v;
        }
        if let Some(v) = layout.spouse_gap {
            config.layout.spouse_gap = v;
        }
        if let Some(v) = layout.fast_text_metrics {
            config.layout.fast_text_metrics = v;
        }
        if let Some(v) = layout.connector_stagger {
            config.layout.connector_stagger = v;
        }
        if let Some(v) = layout.arrow_size {
            config.layout.arrow_size = v;
        }
    }

    config.render.background = config.theme.background.clone();

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_keeps_defaults() {
        let config = parse_config("{}").unwrap();
        assert_eq!(config.layout.generation_gap, 150.0);
        assert_eq!(config.layout.font_family, config.theme.font_family);
    }

    #[test]
    fn overrides_merge_onto_preset() {
        let config = parse_config(
            r##"{
                "theme": "modern",
                "themeVariables": {"fontSize": 18, "background": "#000000"},
                "layout": {"siblingGap": 64, "fastTextMetrics": false}
            }"##,
        )
        .unwrap();
        assert_eq!(config.theme.male_fill, Theme::modern().male_fill);
        assert_eq!(config.layout.font_size, 18.0);
        assert_eq!(config.layout.sibling_gap, 64.0);
        assert!(!config.layout.fast_text_metrics);
        assert_eq!(config.render.background, "#000000");
    }

    #[test]
    fn missing_path_is_default() {
        let config = load_config(None).unwrap();
        assert_eq!(config.layout.spouse_gap, 20.0);
    }
}
