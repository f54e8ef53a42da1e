use family_tree_layout::{RenderOptions, layout_with_options, render_with_options};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FamilyTreeOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    fast_text: Option<bool>,
    generation_gap: Option<f32>,
    sibling_gap: Option<f32>,
    spouse_gap: Option<f32>,
}

fn build_render_options(options: FamilyTreeOptions) -> RenderOptions {
    let mut render_options = if options.theme.as_deref() == Some("modern") {
        RenderOptions::modern()
    } else {
        RenderOptions::classic()
    };

    if let Some(font_family) = options.font_family {
        render_options.layout.font_family = font_family.clone();
        render_options.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        render_options.layout.font_size = font_size;
        render_options.theme.font_size = font_size;
    }
    if let Some(fast_text) = options.fast_text {
        render_options.layout.fast_text_metrics = fast_text;
    }
    if let Some(gap) = options.generation_gap {
        render_options.layout.generation_gap = gap;
    }
    if let Some(gap) = options.sibling_gap {
        render_options.layout.sibling_gap = gap;
    }
    if let Some(gap) = options.spouse_gap {
        render_options.layout.spouse_gap = gap;
    }

    render_options
}

fn parse_options(options_json: Option<String>) -> Result<RenderOptions, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<FamilyTreeOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        FamilyTreeOptions::default()
    };
    Ok(build_render_options(options))
}

/// Returns the layout dump as a JSON string.
#[wasm_bindgen]
pub fn layout_family_tree(graph_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let render_options = parse_options(options_json)?;
    layout_with_options(graph_json, &render_options)
        .map_err(|error| JsValue::from_str(&error.to_string()))
}

#[wasm_bindgen]
pub fn render_family_tree_svg(graph_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let render_options = parse_options(options_json)?;
    render_with_options(graph_json, render_options)
        .map_err(|error| JsValue::from_str(&error.to_string()))
}

#[cfg(test)]
mod tests {
    use family_tree_layout::{layout_with_options, render_with_options};

    use crate::{FamilyTreeOptions, build_render_options};

    const GRAPH: &str = r#"{
        "nodes": [
            {"id": "1", "gender": "MALE", "name": "Arthur"},
            {"id": "2", "gender": "FEMALE", "name": "Molly"},
            {"id": "3", "gender": "MALE", "name": "Ron"}
        ],
        "edges": [
            {"source": "1", "target": "2", "type": "SPOUSE", "spouse_order": 1},
            {"source": "3", "target": "1", "type": "PARENT", "child_order": 1},
            {"source": "3", "target": "2", "type": "PARENT", "child_order": 1}
        ]
    }"#;

    #[test]
    fn renders_nuclear_family() {
        let svg = render_with_options(GRAPH, build_render_options(FamilyTreeOptions::default()))
            .expect("nuclear family should render");
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Molly"));
    }

    #[test]
    fn options_override_layout_gaps() {
        let options = build_render_options(FamilyTreeOptions {
            theme: Some("modern".to_string()),
            generation_gap: Some(200.0),
            ..Default::default()
        });
        assert_eq!(options.layout.font_size, 13.0);
        let dump = layout_with_options(GRAPH, &options).expect("layout should succeed");
        let value: serde_json::Value = serde_json::from_str(&dump).unwrap();
        let ron = value["nodes"]
            .as_array()
            .unwrap()
            .iter()
            .find(|node| node["id"] == "3")
            .unwrap();
        assert_eq!(ron["y"], 200.0);
    }
}
