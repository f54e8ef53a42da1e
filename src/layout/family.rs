use std::collections::{HashMap, HashSet};

use crate::ir::FamilyGroup;

use super::index::RelationshipIndex;
use super::{FamilyUnit, NodeArena, parent_set_key};

/// Groups children by the exact set of parents they share.
///
/// Parents are visited in node order, then parent ids missing from the node
/// list in sorted order, so children of unknown parents still get a unit.
pub(crate) fn build_family_units(
    arena: &NodeArena<'_>,
    index: &RelationshipIndex,
) -> Vec<FamilyUnit> {
    let mut processed: HashSet<(String, String)> = HashSet::new();
    let mut units: Vec<FamilyUnit> = Vec::new();
    let mut unit_by_key: HashMap<String, usize> = HashMap::new();

    let mut unknown_parents: Vec<&str> = index
        .parent_to_children
        .keys()
        .map(String::as_str)
        .filter(|id| arena.slot_of(id).is_none())
        .collect();
    unknown_parents.sort_unstable();
    let parent_ids = arena
        .persons()
        .iter()
        .map(|person| person.id.as_str())
        .chain(unknown_parents);

    for parent in parent_ids {
        for child in index.children_of(parent) {
            for set in parent_sets(index, child) {
                if !set.iter().any(|member| member == parent) {
                    continue;
                }
                let key = parent_set_key(&set);
                if processed.contains(&(child.clone(), key.clone())) {
                    continue;
                }

                let mut siblings: Vec<String> = Vec::new();
                for member in &set {
                    for candidate in index.children_of(member) {
                        if siblings.contains(candidate) {
                            continue;
                        }
                        let shares_set = parent_sets(index, candidate)
                            .iter()
                            .any(|other| parent_set_key(other) == key);
                        if shares_set {
                            processed.insert((candidate.clone(), key.clone()));
                            siblings.push(candidate.clone());
                        }
                    }
                }

                if let Some(&existing) = unit_by_key.get(&key) {
                    let unit = &mut units[existing];
                    for sibling in siblings {
                        if !unit.children.contains(&sibling) {
                            unit.children.push(sibling);
                        }
                    }
                    sort_children(&mut unit.children, index);
                    continue;
                }

                sort_children(&mut siblings, index);
                let spouse_order = if set.len() == 2 {
                    index.spouse_order_of(&set[0], &set[1])
                } else {
                    1
                };
                let mut parents = set;
                parents.sort_by_key(|id| arena.gender_of(id).rank());
                unit_by_key.insert(key.clone(), units.len());
                units.push(FamilyUnit {
                    id: key,
                    parents,
                    children: siblings,
                    spouse_order,
                });
            }
        }
    }

    units.sort_by_key(|unit| unit.spouse_order);
    units
}

/// Adopts data-source groups verbatim.
pub(crate) fn units_from_groups(groups: &[FamilyGroup]) -> Vec<FamilyUnit> {
    groups
        .iter()
        .map(|group| FamilyUnit {
            id: group.id.clone(),
            parents: group.parents.clone(),
            children: group.children.clone(),
            spouse_order: group.spouse_order,
        })
        .collect()
}

/// Sorted parent-sets a child belongs to.
///
/// One or two parents form a single set. With more (a data anomaly, or
/// biological plus adoptive couples) the parents are split into couples by
/// their spouse links, and parents with no spouse among them share a set.
pub(crate) fn parent_sets(index: &RelationshipIndex, child: &str) -> Vec<Vec<String>> {
    let parents = index.parents_of(child);
    if parents.is_empty() {
        return Vec::new();
    }
    if parents.len() <= 2 {
        let mut set = parents.to_vec();
        set.sort();
        return vec![set];
    }

    let mut assigned = vec![false; parents.len()];
    let mut sets = Vec::new();
    let mut loners = Vec::new();
    for start in 0..parents.len() {
        if assigned[start] {
            continue;
        }
        assigned[start] = true;
        let mut component = vec![parents[start].clone()];
        let mut cursor = 0;
        while cursor < component.len() {
            let spouses = index.spouses_of(&component[cursor]);
            cursor += 1;
            for (slot, parent) in parents.iter().enumerate() {
                if !assigned[slot] && spouses.contains(parent) {
                    assigned[slot] = true;
                    component.push(parent.clone());
                }
            }
        }
        if component.len() == 1 {
            loners.extend(component);
        } else {
            component.sort();
            sets.push(component);
        }
    }
    if !loners.is_empty() {
        loners.sort();
        sets.push(loners);
    }
    sets
}

fn sort_children(children: &mut [String], index: &RelationshipIndex) {
    children.sort_by_key(|child| index.child_order_of(child));
}

/// Reverse lookups over a finished unit list.
#[derive(Debug, Default)]
pub(crate) struct FamilyIndex {
    units_of_child: HashMap<String, Vec<usize>>,
    unit_by_parents: HashMap<String, usize>,
}

impl FamilyIndex {
    pub fn new(units: &[FamilyUnit]) -> Self {
        let mut lookup = Self::default();
        for (slot, unit) in units.iter().enumerate() {
            for child in &unit.children {
                lookup
                    .units_of_child
                    .entry(child.clone())
                    .or_default()
                    .push(slot);
            }
            lookup
                .unit_by_parents
                .entry(parent_set_key(&unit.parents))
                .or_insert(slot);
        }
        lookup
    }

    pub fn units_of_child(&self, id: &str) -> &[usize] {
        self.units_of_child.get(id).map_or(&[], Vec::as_slice)
    }

    pub fn unit_for_parents(&self, parents: &[&str]) -> Option<usize> {
        self.unit_by_parents.get(&parent_set_key(parents)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{FamilyGraph, Gender, Person};

    fn units_of(graph: &FamilyGraph) -> Vec<FamilyUnit> {
        let arena = NodeArena::new(&graph.nodes);
        let index = RelationshipIndex::build(&graph.edges);
        build_family_units(&arena, &index)
    }

    fn couple_with_kids() -> FamilyGraph {
        let mut graph = FamilyGraph::new();
        graph
            .add_person(Person::new("mom", Gender::Female))
            .add_person(Person::new("dad", Gender::Male))
            .add_person(Person::new("late", Gender::Unknown))
            .add_person(Person::new("early", Gender::Unknown))
            .add_person(Person::new("unordered", Gender::Unknown));
        graph
            .add_spouse("dad", "mom", Some(1))
            .add_parent("late", "mom", Some(2))
            .add_parent("late", "dad", Some(2))
            .add_parent("unordered", "mom", None)
            .add_parent("unordered", "dad", None)
            .add_parent("early", "dad", Some(1))
            .add_parent("early", "mom", Some(1));
        graph
    }

    #[test]
    fn groups_children_by_shared_parents() {
        let units = units_of(&couple_with_kids());
        assert_eq!(units.len(), 1);
        let unit = &units[0];
        assert_eq!(unit.id, "dad|mom");
        assert_eq!(unit.parents, ["dad", "mom"]);
        assert_eq!(unit.children, ["early", "late", "unordered"]);
        assert_eq!(unit.spouse_order, 1);
    }

    #[test]
    fn half_siblings_get_separate_units_sorted_by_marriage() {
        let mut graph = FamilyGraph::new();
        for (id, gender) in [
            ("a", Gender::Male),
            ("b", Gender::Female),
            ("d", Gender::Female),
            ("c", Gender::Unknown),
            ("e", Gender::Unknown),
        ] {
            graph.add_person(Person::new(id, gender));
        }
        graph
            .add_spouse("a", "d", Some(2))
            .add_spouse("a", "b", Some(1))
            .add_parent("e", "a", None)
            .add_parent("e", "d", None)
            .add_parent("c", "a", None)
            .add_parent("c", "b", None);
        let units = units_of(&graph);
        let ids: Vec<&str> = units.iter().map(|unit| unit.id.as_str()).collect();
        assert_eq!(ids, ["a|b", "a|d"]);
        assert_eq!(units[0].children, ["c"]);
        assert_eq!(units[1].children, ["e"]);
        assert_eq!(units[1].spouse_order, 2);
    }

    #[test]
    fn child_with_two_couples_appears_in_both_units() {
        let mut graph = FamilyGraph::new();
        for id in ["p1", "p2", "q1", "q2", "kid"] {
            graph.add_person(Person::new(id, Gender::Unknown));
        }
        graph
            .add_spouse("p1", "p2", Some(1))
            .add_spouse("q1", "q2", Some(1));
        for parent in ["p1", "p2", "q1", "q2"] {
            graph.add_parent("kid", parent, None);
        }
        let units = units_of(&graph);
        assert_eq!(units.len(), 2);
        assert!(units.iter().all(|unit| unit.children == ["kid"]));
        assert_eq!(units[0].id, "p1|p2");
        assert_eq!(units[1].id, "q1|q2");
    }

    #[test]
    fn single_parent_unit_defaults_to_first_marriage() {
        let mut graph = FamilyGraph::new();
        graph
            .add_person(Person::new("solo", Gender::Female))
            .add_person(Person::new("kid", Gender::Male));
        graph.add_parent("kid", "solo", None);
        let units = units_of(&graph);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].parents, ["solo"]);
        assert_eq!(units[0].spouse_order, 1);
    }

    #[test]
    fn children_of_unknown_parents_still_form_units() {
        let mut graph = FamilyGraph::new();
        graph
            .add_person(Person::new("dad", Gender::Male))
            .add_person(Person::new("kid", Gender::Unknown))
            .add_person(Person::new("stray", Gender::Unknown))
            .add_person(Person::new("stray-sib", Gender::Unknown));
        graph
            .add_parent("kid", "dad", None)
            .add_parent("stray-sib", "ghost-b", Some(2))
            .add_parent("stray-sib", "ghost-a", Some(2))
            .add_parent("stray", "ghost-a", Some(1))
            .add_parent("stray", "ghost-b", Some(1));
        let units = units_of(&graph);
        let ids: Vec<&str> = units.iter().map(|unit| unit.id.as_str()).collect();
        assert_eq!(ids, ["dad", "ghost-a|ghost-b"]);
        assert_eq!(units[1].children, ["stray", "stray-sib"]);
        assert_eq!(units[1].spouse_order, 1);
    }

    #[test]
    fn unit_ids_are_stable_across_runs() {
        let graph = couple_with_kids();
        let first: Vec<String> = units_of(&graph).into_iter().map(|u| u.id).collect();
        let second: Vec<String> = units_of(&graph).into_iter().map(|u| u.id).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn family_index_answers_reverse_lookups() {
        let units = units_of(&couple_with_kids());
        let lookup = FamilyIndex::new(&units);
        assert_eq!(lookup.units_of_child("late"), [0]);
        assert_eq!(lookup.unit_for_parents(&["mom", "dad"]), Some(0));
        assert_eq!(lookup.unit_for_parents(&["mom"]), None);
    }
}
