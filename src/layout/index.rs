use std::collections::{BTreeMap, HashMap, HashSet};

use crate::ir::{Relation, RelationKind};

use super::{CHILD_ORDER_SENTINEL, SpouseEdgeInfo, pair_key};

/// Adjacency built from the raw edge list in one pass.
///
/// Edges pointing at ids that are not in the node list are kept as-is;
/// consumers look ids up and treat a miss as "no data".
#[derive(Debug, Default)]
pub(crate) struct RelationshipIndex {
    pub child_to_parents: HashMap<String, Vec<String>>,
    pub parent_to_children: HashMap<String, Vec<String>>,
    pub child_order: HashMap<String, i32>,
    pub spouses: HashMap<String, Vec<String>>,
    pub spouse_order: HashMap<String, i32>,
    pub spouse_edge_info: BTreeMap<String, SpouseEdgeInfo>,
    pub consanguineous: HashSet<String>,
    /// Distinct spouse pairs as first seen, in marriage-order processing order.
    pub spouse_pairs: Vec<(String, String)>,
}

impl RelationshipIndex {
    pub fn build(edges: &[Relation]) -> Self {
        let mut index = Self::default();

        for edge in edges.iter().filter(|edge| edge.kind == RelationKind::Parent) {
            let (child, parent) = (&edge.source, &edge.target);
            push_unique(&mut index.child_to_parents, child, parent);
            push_unique(&mut index.parent_to_children, parent, child);
            let order = edge.child_order.unwrap_or(CHILD_ORDER_SENTINEL);
            let current = index
                .child_order
                .entry(child.clone())
                .or_insert(CHILD_ORDER_SENTINEL);
            *current = (*current).min(order);
        }

        let mut spouse_edges: Vec<&Relation> = edges
            .iter()
            .filter(|edge| edge.kind == RelationKind::Spouse && edge.source != edge.target)
            .collect();
        // Stable: equal orders keep input order, so the first edge for a pair wins.
        spouse_edges.sort_by_key(|edge| marriage_order(edge));

        let mut info_sources: Vec<(String, String)> = Vec::new();
        for edge in spouse_edges {
            let (a, b) = (&edge.source, &edge.target);
            push_unique(&mut index.spouses, a, b);
            push_unique(&mut index.spouses, b, a);
            let key = pair_key(a, b);
            if edge.is_consanguineous {
                index.consanguineous.insert(key.clone());
            }
            if index.spouse_order.contains_key(&key) {
                continue;
            }
            let order = marriage_order(edge);
            index.spouse_order.insert(key.clone(), order);
            index.spouse_edge_info.insert(
                key.clone(),
                SpouseEdgeInfo {
                    index: (order - 1).max(0) as usize,
                    total: 0,
                },
            );
            info_sources.push((key, a.clone()));
            index.spouse_pairs.push((a.clone(), b.clone()));
        }

        // `total` is the final marriage count of the source person, filled in
        // once every spouse edge has been indexed.
        for (key, source) in info_sources {
            let total = index.spouses.get(&source).map_or(0, Vec::len);
            if let Some(info) = index.spouse_edge_info.get_mut(&key) {
                info.total = total;
            }
        }

        index
    }

    pub fn parents_of(&self, id: &str) -> &[String] {
        self.child_to_parents.get(id).map_or(&[], Vec::as_slice)
    }

    pub fn children_of(&self, id: &str) -> &[String] {
        self.parent_to_children.get(id).map_or(&[], Vec::as_slice)
    }

    pub fn spouses_of(&self, id: &str) -> &[String] {
        self.spouses.get(id).map_or(&[], Vec::as_slice)
    }

    pub fn child_order_of(&self, id: &str) -> i32 {
        self.child_order
            .get(id)
            .copied()
            .unwrap_or(CHILD_ORDER_SENTINEL)
    }

    pub fn spouse_order_of(&self, a: &str, b: &str) -> i32 {
        self.spouse_order.get(&pair_key(a, b)).copied().unwrap_or(1)
    }

    pub fn is_consanguineous(&self, a: &str, b: &str) -> bool {
        self.consanguineous.contains(&pair_key(a, b))
    }
}

fn marriage_order(edge: &Relation) -> i32 {
    edge.spouse_order.unwrap_or(1)
}

fn push_unique(map: &mut HashMap<String, Vec<String>>, key: &str, value: &str) {
    let list = map.entry(key.to_string()).or_default();
    if !list.iter().any(|existing| existing == value) {
        list.push(value.to_string());
    }
}
