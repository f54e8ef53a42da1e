use std::collections::{BTreeMap, HashMap};

use crate::config::LayoutConfig;

use super::index::RelationshipIndex;
use super::{
    ChildBranch, FamilyEdgeLayout, FamilyUnit, MarriageLineStyle, NodePosition,
    SpouseEdgeLayout, pair_key,
};

pub(crate) struct GeometryInput<'a> {
    pub positions: &'a BTreeMap<String, NodePosition>,
    pub widths: &'a BTreeMap<String, f32>,
    pub units: &'a [FamilyUnit],
    pub index: &'a RelationshipIndex,
    pub config: &'a LayoutConfig,
}

#[derive(Debug, Clone, Copy)]
struct PlacedBox {
    x: f32,
    y: f32,
    width: f32,
}

impl PlacedBox {
    fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    fn right(&self) -> f32 {
        self.x + self.width
    }
}

impl GeometryInput<'_> {
    fn placed(&self, id: &str) -> Option<PlacedBox> {
        let pos = self.positions.get(id)?;
        Some(PlacedBox {
            x: pos.x,
            y: pos.y,
            width: self.widths.get(id).copied().unwrap_or(self.config.node_min_width),
        })
    }
}

/// Straight center-to-center lines at mid-height, styled by marriage order.
pub(crate) fn spouse_edges(input: &GeometryInput<'_>) -> Vec<SpouseEdgeLayout> {
    let mid = input.config.node_height / 2.0;
    let mut edges = Vec::new();
    for (a, b) in &input.index.spouse_pairs {
        let (Some(box_a), Some(box_b)) = (input.placed(a), input.placed(b)) else {
            continue;
        };
        let ((from, left), (to, right)) = if box_a.x <= box_b.x {
            ((a, box_a), (b, box_b))
        } else {
            ((b, box_b), (a, box_a))
        };
        let key = pair_key(a, b);
        let marriage_index = input
            .index
            .spouse_edge_info
            .get(&key)
            .map_or(0, |info| info.index);
        let style = if input.index.is_consanguineous(a, b) {
            MarriageLineStyle::Consanguineous
        } else if marriage_index == 0 {
            MarriageLineStyle::First
        } else {
            MarriageLineStyle::Subsequent
        };
        edges.push(SpouseEdgeLayout {
            key,
            from: from.clone(),
            to: to.clone(),
            points: vec![
                (left.center_x(), left.y + mid),
                (right.center_x(), right.y + mid),
            ],
            marriage_index,
            style,
        });
    }
    edges
}

/// Elbow connectors from each unit's parents down to its children.
///
/// Units sharing a parent band whose horizontal extents overlap get their
/// joining bars staggered downward, one step per earlier overlapping unit.
pub(crate) fn family_edges(input: &GeometryInput<'_>) -> Vec<FamilyEdgeLayout> {
    let config = input.config;
    let mut bands: HashMap<i64, Vec<(f32, f32)>> = HashMap::new();
    let mut edges = Vec::new();

    for unit in input.units {
        let parents: Vec<(&str, PlacedBox)> = unit
            .parents
            .iter()
            .filter_map(|id| Some((id.as_str(), input.placed(id)?)))
            .collect();
        let children: Vec<(&str, PlacedBox)> = unit
            .children
            .iter()
            .filter_map(|id| Some((id.as_str(), input.placed(id)?)))
            .collect();
        if parents.is_empty() || children.is_empty() {
            continue;
        }

        let parent_y = parents
            .iter()
            .map(|(_, placed)| placed.y)
            .fold(f32::MIN, f32::max);
        let child_top = children
            .iter()
            .map(|(_, placed)| placed.y)
            .fold(f32::MAX, f32::min);
        let center_x = family_center_x(input, &parents);
        let start_y = if parents.len() >= 2 {
            parent_y + config.node_height / 2.0
        } else {
            parent_y + config.node_height
        };

        let mut min_x = center_x;
        let mut max_x = center_x;
        for (_, child) in &children {
            min_x = min_x.min(child.center_x());
            max_x = max_x.max(child.center_x());
        }

        let band = bands.entry(band_key(parent_y)).or_default();
        let offset_index = band
            .iter()
            .filter(|(lo, hi)| *lo <= max_x && min_x <= *hi)
            .count();
        band.push((min_x, max_x));

        let parent_bottom = parent_y + config.node_height;
        let base = parent_bottom + (child_top - parent_bottom) / 2.0;
        let lowest = (child_top - config.arrow_size * 2.0).max(start_y);
        let bar_y = (base + offset_index as f32 * config.connector_stagger)
            .min(lowest)
            .max(start_y);

        let branches = children
            .iter()
            .map(|(id, child)| {
                let x = child.center_x();
                let half = config.arrow_size / 2.0;
                ChildBranch {
                    child: id.to_string(),
                    points: vec![(x, bar_y), (x, child.y)],
                    arrow: [
                        (x - half, child.y - config.arrow_size),
                        (x + half, child.y - config.arrow_size),
                        (x, child.y),
                    ],
                }
            })
            .collect();

        edges.push(FamilyEdgeLayout {
            unit_id: unit.id.clone(),
            family_center_x: center_x,
            bar_y,
            offset_index,
            trunk: vec![(center_x, start_y), (center_x, bar_y)],
            bar: vec![(min_x, bar_y), (max_x, bar_y)],
            branches,
        });
    }
    edges
}

/// Where a unit's trunk leaves its parents.
///
/// A couple drops from the middle of the gap between them. For a second or
/// later marriage the gap is measured from the previous spouse instead, so
/// each marriage's trunk sits in its own gap along the chain of spouses.
fn family_center_x(input: &GeometryInput<'_>, parents: &[(&str, PlacedBox)]) -> f32 {
    match parents {
        [] => 0.0,
        [(_, only)] => only.center_x(),
        [(a_id, a), (b_id, b)] => {
            let a_marriages = input.index.spouses_of(a_id).len();
            let b_marriages = input.index.spouses_of(b_id).len();
            let (hub, partner, partner_box) = if b_marriages > a_marriages {
                (*b_id, *a_id, *a)
            } else {
                (*a_id, *b_id, *b)
            };
            let hub_box = if hub == *a_id { *a } else { *b };
            let previous = previous_spouse(input, hub, partner).unwrap_or(hub_box);
            gap_midpoint(previous, partner_box)
        }
        many => {
            let sum: f32 = many.iter().map(|(_, placed)| placed.center_x()).sum();
            sum / many.len() as f32
        }
    }
}

/// The hub's spouse married just before `partner`, if placed.
fn previous_spouse(input: &GeometryInput<'_>, hub: &str, partner: &str) -> Option<PlacedBox> {
    let mut marriages: Vec<(i32, &String)> = input
        .index
        .spouses_of(hub)
        .iter()
        .map(|spouse| (input.index.spouse_order_of(hub, spouse), spouse))
        .collect();
    marriages.sort_by_key(|(order, _)| *order);
    let position = marriages.iter().position(|(_, spouse)| *spouse == partner)?;
    if position == 0 {
        return None;
    }
    input.placed(marriages[position - 1].1)
}

fn gap_midpoint(first: PlacedBox, second: PlacedBox) -> f32 {
    let (left, right) = if first.x <= second.x {
        (first, second)
    } else {
        (second, first)
    };
    if left.right() <= right.x {
        (left.right() + right.x) / 2.0
    } else {
        (left.center_x() + right.center_x()) / 2.0
    }
}

fn band_key(y: f32) -> i64 {
    (y * 100.0).round() as i64
}
