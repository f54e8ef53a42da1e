mod family;
mod generation;
mod index;
mod position;
mod routing;
mod text;
pub(crate) mod types;
pub use types::*;

use family::{FamilyIndex, build_family_units, units_from_groups};
use generation::assign_generations;
use index::RelationshipIndex;
use position::{PositionInput, compute_positions};
use routing::{GeometryInput, family_edges, spouse_edges};
use text::MeasureContext;

use crate::config::LayoutConfig;
use crate::ir::{FamilyGraph, Gender, Person};
use std::collections::{BTreeMap, HashMap};

/// Child order assumed when an edge carries none; sorts after real orders.
pub const CHILD_ORDER_SENTINEL: i32 = 999;

/// Order-independent key for a spouse pair.
pub fn pair_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{a}|{b}")
    } else {
        format!("{b}|{a}")
    }
}

/// Order-independent key for a parent-set; also the family unit id.
pub fn parent_set_key<S: AsRef<str>>(parents: &[S]) -> String {
    let mut sorted: Vec<&str> = parents.iter().map(AsRef::as_ref).collect();
    sorted.sort_unstable();
    sorted.join("|")
}

/// Persons addressed by slot. The first occurrence of a duplicated id wins.
pub(crate) struct NodeArena<'a> {
    persons: Vec<&'a Person>,
    slots: HashMap<&'a str, usize>,
}

impl<'a> NodeArena<'a> {
    pub fn new(nodes: &'a [Person]) -> Self {
        let mut persons = Vec::with_capacity(nodes.len());
        let mut slots = HashMap::with_capacity(nodes.len());
        for person in nodes {
            if slots.contains_key(person.id.as_str()) {
                tracing::warn!(id = %person.id, "duplicate person id, keeping the first");
                continue;
            }
            slots.insert(person.id.as_str(), persons.len());
            persons.push(person);
        }
        Self { persons, slots }
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn persons(&self) -> &[&'a Person] {
        &self.persons
    }

    pub fn id(&self, slot: usize) -> &'a str {
        self.persons[slot].id.as_str()
    }

    pub fn slot_of(&self, id: &str) -> Option<usize> {
        self.slots.get(id).copied()
    }

    pub fn gender(&self, slot: usize) -> Gender {
        self.persons[slot].gender
    }

    pub fn gender_of(&self, id: &str) -> Gender {
        self.slot_of(id).map_or(Gender::Unknown, |slot| self.gender(slot))
    }
}

/// Runs the whole pipeline: index, generations, family units, positions and
/// connector geometry. Always returns a complete layout, whatever the input.
pub fn compute_family_layout(graph: &FamilyGraph, config: &LayoutConfig) -> FamilyLayout {
    let arena = NodeArena::new(&graph.nodes);
    let index = RelationshipIndex::build(&graph.edges);

    let (generations, mode) = assign_generations(&arena, &index);
    tracing::debug!(nodes = arena.len(), ?mode, "assigned generations");

    let units = if graph.groups.is_empty() {
        build_family_units(&arena, &index)
    } else {
        units_from_groups(&graph.groups)
    };
    tracing::debug!(units = units.len(), precomputed = !graph.groups.is_empty(), "family units ready");
    let families = FamilyIndex::new(&units);

    let mut measure = MeasureContext::new(config);
    let widths: Vec<f32> = arena
        .persons()
        .iter()
        .map(|person| measure.node_width(&person.display_name()))
        .collect();

    let placed = compute_positions(&PositionInput {
        arena: &arena,
        index: &index,
        units: &units,
        families: &families,
        generations: &generations,
        widths: &widths,
        config,
    });

    let mut node_positions = BTreeMap::new();
    let mut node_widths = BTreeMap::new();
    let mut node_generations = BTreeMap::new();
    for (slot, position) in placed.into_iter().enumerate() {
        let id = arena.id(slot).to_string();
        node_widths.insert(id.clone(), widths[slot]);
        node_generations.insert(id.clone(), generations[slot]);
        node_positions.insert(id, position);
    }

    let geometry = GeometryInput {
        positions: &node_positions,
        widths: &node_widths,
        units: &units,
        index: &index,
        config,
    };
    let spouse_edges = spouse_edges(&geometry);
    let family_edges = family_edges(&geometry);
    tracing::debug!(
        spouse_edges = spouse_edges.len(),
        family_edges = family_edges.len(),
        "connector geometry built"
    );

    let mut layout = FamilyLayout {
        node_positions,
        node_widths,
        generations: node_generations,
        family_units: units,
        spouse_edge_info: index.spouse_edge_info,
        spouse_edges,
        family_edges,
        node_height: config.node_height,
        width: 0.0,
        height: 0.0,
    };
    if let Some((min_x, max_x)) = layout.horizontal_bounds() {
        layout.width = max_x - min_x;
        let deepest = layout.generations.values().copied().max().unwrap_or(0);
        layout.height = deepest as f32 * config.generation_gap + config.node_height;
    }
    layout
}
