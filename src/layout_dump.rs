use crate::ir::FamilyGraph;
use crate::layout::{FamilyEdgeLayout, FamilyLayout, FamilyUnit, SpouseEdgeInfo, SpouseEdgeLayout};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Renderer-facing snapshot of a layout, keyed the way web clients expect.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump<'a> {
    pub width: f32,
    pub height: f32,
    pub node_height: f32,
    pub nodes: Vec<NodeDump>,
    pub family_units: &'a [FamilyUnit],
    pub spouse_edge_info: &'a BTreeMap<String, SpouseEdgeInfo>,
    pub spouse_edges: &'a [SpouseEdgeLayout],
    pub family_edges: &'a [FamilyEdgeLayout],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDump {
    pub id: String,
    pub name: String,
    pub gender: String,
    pub generation: i32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
}

impl<'a> LayoutDump<'a> {
    pub fn from_layout(layout: &'a FamilyLayout, graph: &FamilyGraph) -> Self {
        let nodes = layout
            .node_positions
            .iter()
            .map(|(id, pos)| {
                let person = graph.person(id);
                NodeDump {
                    id: id.clone(),
                    name: person.map_or_else(|| id.clone(), |p| p.display_name()),
                    gender: person
                        .map(|p| format!("{:?}", p.gender))
                        .unwrap_or_else(|| "Unknown".to_string()),
                    generation: layout.generations.get(id).copied().unwrap_or(0),
                    x: pos.x,
                    y: pos.y,
                    width: layout.node_widths.get(id).copied().unwrap_or(0.0),
                }
            })
            .collect();

        LayoutDump {
            width: layout.width,
            height: layout.height,
            node_height: layout.node_height,
            nodes,
            family_units: &layout.family_units,
            spouse_edge_info: &layout.spouse_edge_info,
            spouse_edges: &layout.spouse_edges,
            family_edges: &layout.family_edges,
        }
    }
}

pub fn layout_to_json(layout: &FamilyLayout, graph: &FamilyGraph) -> anyhow::Result<String> {
    Ok(serde_json::to_string(&LayoutDump::from_layout(layout, graph))?)
}

pub fn write_layout_dump(path: &Path, layout: &FamilyLayout, graph: &FamilyGraph) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, graph);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
