use crate::config::RenderConfig;
use crate::ir::{FamilyGraph, Gender, Person};
use crate::layout::{FamilyLayout, MarriageLineStyle};
use crate::theme::Theme;
use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;

/// Draws a computed layout. Coordinates are shifted so the leftmost box sits
/// at `render_cfg.padding`.
pub fn render_svg(
    layout: &FamilyLayout,
    graph: &FamilyGraph,
    theme: &Theme,
    render_cfg: &RenderConfig,
) -> String {
    let padding = render_cfg.padding;
    let min_x = layout.horizontal_bounds().map_or(0.0, |(min_x, _)| min_x);
    let shift = (padding - min_x, padding);
    let width = (layout.width + padding * 2.0).max(200.0);
    let height = (layout.height + padding * 2.0).max(200.0);

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"0 0 {width:.2} {height:.2}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        render_cfg.background
    ));

    for edge in &layout.family_edges {
        for segment in [&edge.trunk, &edge.bar] {
            svg.push_str(&format!(
                "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.4\"/>",
                points_to_path(segment, shift),
                theme.line_color
            ));
        }
        for branch in &edge.branches {
            svg.push_str(&format!(
                "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.4\"/>",
                points_to_path(&branch.points, shift),
                theme.line_color
            ));
            svg.push_str(&format!(
                "<polygon points=\"{}\" fill=\"{}\"/>",
                points_to_list(&branch.arrow, shift),
                theme.line_color
            ));
        }
    }

    for edge in &layout.spouse_edges {
        let (color, dash) = match edge.style {
            MarriageLineStyle::First => (theme.first_marriage_color.as_str(), None),
            MarriageLineStyle::Subsequent => (
                theme.later_marriage_color.as_str(),
                Some(theme.later_marriage_dasharray.as_str()),
            ),
            MarriageLineStyle::Consanguineous => (theme.consanguineous_color.as_str(), None),
        };
        let dash = dash
            .map(|pattern| format!(" stroke-dasharray=\"{pattern}\""))
            .unwrap_or_default();
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"2\"{dash}/>",
            points_to_path(&edge.points, shift)
        ));
        if edge.style == MarriageLineStyle::Consanguineous {
            // Double line, offset below the first.
            svg.push_str(&format!(
                "<path d=\"{}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"2\"/>",
                points_to_path(&edge.points, (shift.0, shift.1 + 4.0))
            ));
        }
    }

    let persons = person_lookup(graph);
    for region in layout.hit_regions() {
        let person = persons.get(region.id).copied();
        let gender = person.map_or(Gender::Unknown, |p| p.gender);
        let name = person.map_or_else(|| region.id.to_string(), Person::display_name);
        let x = region.x + shift.0;
        let y = region.y + shift.1;
        svg.push_str(&format!(
            "<g class=\"person\" data-id=\"{}\"><rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"8\" ry=\"8\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1.2\"/>",
            escape_xml(region.id),
            region.width,
            region.height,
            theme.fill_for(gender),
            theme.node_border
        ));
        let center_x = x + region.width / 2.0;
        let baseline = y + region.height / 2.0 + theme.font_size * 0.35;
        svg.push_str(&format!(
            "<text x=\"{center_x:.2}\" y=\"{baseline:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text></g>",
            escape_xml(&theme.font_family),
            theme.font_size,
            theme.text_color,
            escape_xml(&name)
        ));
    }

    svg.push_str("</svg>");
    svg
}

fn person_lookup(graph: &FamilyGraph) -> HashMap<&str, &Person> {
    let mut persons = HashMap::with_capacity(graph.nodes.len());
    for person in &graph.nodes {
        persons.entry(person.id.as_str()).or_insert(person);
    }
    persons
}

fn points_to_path(points: &[(f32, f32)], shift: (f32, f32)) -> String {
    let mut d = String::new();
    for (idx, (x, y)) in points.iter().enumerate() {
        let command = if idx == 0 { "M" } else { " L" };
        d.push_str(&format!("{command} {:.2} {:.2}", x + shift.0, y + shift.1));
    }
    d
}

fn points_to_list(points: &[(f32, f32)], shift: (f32, f32)) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{:.2},{:.2}", x + shift.0, y + shift.1))
        .collect::<Vec<_>>()
        .join(" ")
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

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::compute_family_layout;

    fn remarried_family() -> FamilyGraph {
        let mut graph = FamilyGraph::new();
        let mut husband = Person::new("h", Gender::Male);
        husband.name = Some("Tom & Jerry".to_string());
        graph
            .add_person(husband)
            .add_person(Person::new("w1", Gender::Female))
            .add_person(Person::new("w2", Gender::Female))
            .add_person(Person::new("kid", Gender::Unknown));
        graph
            .add_spouse("h", "w1", Some(1))
            .add_spouse("h", "w2", Some(2))
            .add_parent("kid", "h", Some(1))
            .add_parent("kid", "w1", Some(1));
        graph
    }

    #[test]
    fn render_svg_basic() {
        let graph = remarried_family();
        let theme = Theme::classic();
        let layout = compute_family_layout(&graph, &LayoutConfig::default());
        let svg = render_svg(&layout, &graph, &theme, &RenderConfig::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("Tom &amp; Jerry"));
        assert_eq!(svg.matches("class=\"person\"").count(), 4);
        assert!(svg.contains(&theme.male_fill));
        assert!(svg.contains(&theme.female_fill));
        assert!(svg.contains("<polygon"));
    }

    #[test]
    fn later_marriages_are_dashed() {
        let graph = remarried_family();
        let theme = Theme::classic();
        let layout = compute_family_layout(&graph, &LayoutConfig::default());
        let svg = render_svg(&layout, &graph, &theme, &RenderConfig::default());
        assert!(svg.contains(&theme.first_marriage_color));
        assert!(svg.contains(&format!(
            "stroke=\"{}\" stroke-width=\"2\" stroke-dasharray=\"{}\"",
            theme.later_marriage_color, theme.later_marriage_dasharray
        )));
    }

    #[test]
    fn empty_layout_renders_blank_canvas() {
        let graph = FamilyGraph::new();
        let layout = compute_family_layout(&graph, &LayoutConfig::default());
        let svg = render_svg(&layout, &graph, &Theme::modern(), &RenderConfig::default());
        assert!(svg.contains("width=\"200.00\""));
        assert!(!svg.contains("class=\"person\""));
    }

    #[test]
    fn svg_size_follows_the_tree_not_the_png_canvas() {
        let graph = remarried_family();
        let layout = compute_family_layout(&graph, &LayoutConfig::default());
        let small = RenderConfig {
            width: 10.0,
            height: 10.0,
            ..Default::default()
        };
        let theme = Theme::classic();
        assert_eq!(
            render_svg(&layout, &graph, &theme, &small),
            render_svg(&layout, &graph, &theme, &RenderConfig::default())
        );
    }

    #[test]
    fn paths_are_shifted() {
        assert_eq!(
            points_to_path(&[(0.0, 0.0), (10.0, 5.0)], (2.0, 3.0)),
            "M 2.00 3.00 L 12.00 8.00"
        );
        assert_eq!(points_to_path(&[], (0.0, 0.0)), "");
    }
}
