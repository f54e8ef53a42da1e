use std::path::Path;

use family_tree_layout::layout::MarriageLineStyle;
use family_tree_layout::render::render_svg;
use family_tree_layout::{
    FamilyGraph, FamilyLayout, LayoutConfig, RenderConfig, Theme, compute_family_layout,
};

fn load_fixture(rel: &str) -> FamilyGraph {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(rel);
    assert!(path.exists(), "fixture missing: {}", rel);
    FamilyGraph::from_path(&path).expect("fixture parse failed")
}

fn layout_fixture(rel: &str) -> (FamilyGraph, FamilyLayout) {
    let graph = load_fixture(rel);
    let layout = compute_family_layout(&graph, &LayoutConfig::default());
    (graph, layout)
}

fn assert_rows_do_not_overlap(layout: &FamilyLayout, fixture: &str) {
    let mut boxes: Vec<(f32, f32, f32)> = layout
        .node_positions
        .iter()
        .map(|(id, pos)| (pos.y, pos.x, layout.node_widths[id]))
        .collect();
    boxes.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
    for pair in boxes.windows(2) {
        let (left, right) = (pair[0], pair[1]);
        if left.0 == right.0 {
            assert!(
                right.1 >= left.1 + left.2 - 1e-3,
                "{fixture}: boxes overlap at y={}",
                left.0
            );
        }
    }
}

#[test]
fn render_all_fixtures() {
    // Keep this list explicit so new fixtures must be added intentionally.
    let candidates = [
        "empty.json",
        "nuclear_family.json",
        "precomputed.json",
        "remarriage.json",
        "shared_child.json5",
        "three_generations.json",
    ];

    let config = LayoutConfig::default();
    for rel in candidates {
        let graph = load_fixture(rel);
        let layout = compute_family_layout(&graph, &config);
        assert_eq!(layout.node_positions.len(), graph.nodes.len(), "{rel}");
        for (id, pos) in &layout.node_positions {
            let generation = layout.generations[id];
            assert_eq!(pos.y, generation as f32 * config.generation_gap, "{rel}: {id}");
        }
        assert_rows_do_not_overlap(&layout, rel);

        let svg = render_svg(&layout, &graph, &Theme::modern(), &RenderConfig::default());
        assert!(svg.contains("<svg"), "{rel}: missing <svg tag");
        assert!(svg.contains("</svg>"), "{rel}: missing </svg tag");
    }
}

#[test]
fn nuclear_family_orders_children_by_birth() {
    let (_, layout) = layout_fixture("nuclear_family.json");
    let x = |id: &str| layout.node_positions[id].x;
    assert!(x("bill") < x("charlie"));
    assert!(x("charlie") < x("ginny"));
    assert!(x("arthur") < x("molly"));
    assert_eq!(layout.family_units.len(), 1);
    assert_eq!(layout.family_units[0].children, ["bill", "charlie", "ginny"]);

    let edge = &layout.family_edges[0];
    assert_eq!(edge.branches.len(), 3);
    assert!(edge.bar_y > layout.node_height);
    assert!(edge.bar_y < LayoutConfig::default().generation_gap);
}

#[test]
fn remarriage_keeps_marriage_order() {
    let (_, layout) = layout_fixture("remarriage.json");
    let info = &layout.spouse_edge_info;
    assert_eq!(info["h|w1"].index, 0);
    assert_eq!(info["h|w2"].index, 1);
    assert_eq!(info["h|w3"].index, 2);
    assert!(info.values().all(|entry| entry.total == 3));

    let ids: Vec<&str> = layout.family_units.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, ["h|w1", "h|w2", "h|w3"]);

    let x = |id: &str| layout.node_positions[id].x;
    assert!(x("w1") < x("w2") && x("w2") < x("w3"));
    assert!(x("c1") < x("c2") && x("c2") < x("c3"));

    let subsequent = layout
        .spouse_edges
        .iter()
        .filter(|edge| edge.style == MarriageLineStyle::Subsequent)
        .count();
    assert_eq!(subsequent, 2);
}

#[test]
fn married_in_spouses_join_partner_generation() {
    let (_, layout) = layout_fixture("three_generations.json");
    let generation = |id: &str| layout.generations[id];
    assert_eq!(generation("1"), 0);
    assert_eq!(generation("2"), 0);
    for id in ["3", "4", "5", "8"] {
        assert_eq!(generation(id), 1, "person {id}");
    }
    assert_eq!(generation("6"), 2);
    assert_eq!(generation("7"), 2);
    assert_eq!(layout.family_units.len(), 3);
}

#[test]
fn shared_child_gets_one_unit_per_couple() {
    let (_, layout) = layout_fixture("shared_child.json5");
    let ids: Vec<&str> = layout.family_units.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, ["p1|p2", "q1|q2"]);
    assert_eq!(layout.generations["kid"], 1);
    assert_eq!(layout.family_edges.len(), 2);
}

#[test]
fn precomputed_data_is_trusted() {
    let (_, layout) = layout_fixture("precomputed.json");
    assert_eq!(layout.generations["a"], 0);
    assert_eq!(layout.generations["c"], 1);
    assert_eq!(layout.family_units.len(), 1);
    assert_eq!(layout.family_units[0].id, "fam-ab");
    assert_eq!(layout.spouse_edges[0].style, MarriageLineStyle::Consanguineous);
}

#[test]
fn empty_fixture_has_empty_layout() {
    let (_, layout) = layout_fixture("empty.json");
    assert!(layout.is_empty());
    assert!(layout.spouse_edge_info.is_empty());
    assert!(layout.family_edges.is_empty());
}

#[test]
fn layout_is_deterministic() {
    for rel in ["remarriage.json", "three_generations.json"] {
        let (_, first) = layout_fixture(rel);
        let (_, second) = layout_fixture(rel);
        assert_eq!(first.node_positions, second.node_positions, "{rel}");
        assert_eq!(first.family_units, second.family_units, "{rel}");
    }
}
