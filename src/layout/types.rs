use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodePosition {
    /// Left edge of the person box.
    pub x: f32,
    /// Top edge of the person box, always `generation * generation_gap`.
    pub y: f32,
}

/// One parent-set together with the children they share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyUnit {
    pub id: String,
    pub parents: Vec<String>,
    pub children: Vec<String>,
    pub spouse_order: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpouseEdgeInfo {
    /// 0-based position among the source person's marriages.
    pub index: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MarriageLineStyle {
    First,
    Subsequent,
    Consanguineous,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpouseEdgeLayout {
    pub key: String,
    pub from: String,
    pub to: String,
    pub points: Vec<(f32, f32)>,
    pub marriage_index: usize,
    pub style: MarriageLineStyle,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildBranch {
    pub child: String,
    /// From the joining bar down to the arrow tip at the child's top edge.
    pub points: Vec<(f32, f32)>,
    pub arrow: [(f32, f32); 3],
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyEdgeLayout {
    pub unit_id: String,
    pub family_center_x: f32,
    pub bar_y: f32,
    pub offset_index: usize,
    /// Vertical drop from the parents to the joining bar.
    pub trunk: Vec<(f32, f32)>,
    /// Horizontal joining bar spanning the trunk and every child.
    pub bar: Vec<(f32, f32)>,
    pub branches: Vec<ChildBranch>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HitRegion<'a> {
    pub id: &'a str,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl HitRegion<'_> {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyLayout {
    pub node_positions: BTreeMap<String, NodePosition>,
    pub node_widths: BTreeMap<String, f32>,
    pub generations: BTreeMap<String, i32>,
    pub family_units: Vec<FamilyUnit>,
    pub spouse_edge_info: BTreeMap<String, SpouseEdgeInfo>,
    pub spouse_edges: Vec<SpouseEdgeLayout>,
    pub family_edges: Vec<FamilyEdgeLayout>,
    pub node_height: f32,
    pub width: f32,
    pub height: f32,
}

impl FamilyLayout {
    pub fn is_empty(&self) -> bool {
        self.node_positions.is_empty()
    }

    /// Clickable box per positioned person, in id order.
    pub fn hit_regions(&self) -> Vec<HitRegion<'_>> {
        self.node_positions
            .iter()
            .map(|(id, pos)| HitRegion {
                id: id.as_str(),
                x: pos.x,
                y: pos.y,
                width: self.node_widths.get(id).copied().unwrap_or(0.0),
                height: self.node_height,
            })
            .collect()
    }

    pub fn hit_test(&self, x: f32, y: f32) -> Option<&str> {
        self.hit_regions()
            .into_iter()
            .find(|region| region.contains(x, y))
            .map(|region| region.id)
    }

    /// Horizontal extent `(min_x, max_x)` of all boxes, if any.
    pub fn horizontal_bounds(&self) -> Option<(f32, f32)> {
        let mut bounds: Option<(f32, f32)> = None;
        for (id, pos) in &self.node_positions {
            let width = self.node_widths.get(id).copied().unwrap_or(0.0);
            let (min_x, max_x) = bounds.unwrap_or((pos.x, pos.x + width));
            bounds = Some((min_x.min(pos.x), max_x.max(pos.x + width)));
        }
        bounds
    }
}
