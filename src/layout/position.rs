//! Generation-by-generation x placement.
//!
//! The deepest generation is laid out first as a plain left-to-right row in
//! sibling order. Every generation above it is then placed bottom-up: couples
//! with placed children are centered over them, childless couples are slotted
//! between their siblings, and a single sweep pushes overlapping groups apart.
//! The finished layout is translated so its bounding box is centered on x = 0.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use crate::config::LayoutConfig;

use super::family::FamilyIndex;
use super::index::RelationshipIndex;
use super::{FamilyUnit, NodeArena, NodePosition};

pub(crate) struct PositionInput<'a> {
    pub arena: &'a NodeArena<'a>,
    pub index: &'a RelationshipIndex,
    pub units: &'a [FamilyUnit],
    pub families: &'a FamilyIndex,
    pub generations: &'a [i32],
    pub widths: &'a [f32],
    pub config: &'a LayoutConfig,
}

/// A person plus their same-generation spouses, placed as one unit.
/// `members` is in left-to-right order; the first two form the primary couple.
#[derive(Debug, Clone)]
struct CoupleGroup {
    members: Vec<usize>,
    width: f32,
    birth_key: (usize, usize),
}

/// Groups placed so far in the generation being processed.
#[derive(Debug, Default)]
struct Row {
    groups: Vec<Vec<usize>>,
    group_of: HashMap<usize, usize>,
}

impl Row {
    fn push(&mut self, members: Vec<usize>) {
        let idx = self.groups.len();
        for &member in &members {
            self.group_of.insert(member, idx);
        }
        self.groups.push(members);
    }
}

pub(crate) fn compute_positions(input: &PositionInput<'_>) -> Vec<NodePosition> {
    let count = input.arena.len();
    if count == 0 {
        return Vec::new();
    }

    let mut by_generation: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for slot in 0..count {
        by_generation
            .entry(input.generations[slot])
            .or_default()
            .push(slot);
    }

    let mut placer = Placer {
        input,
        x: vec![None; count],
    };
    for (depth, (generation, slots)) in by_generation.iter().rev().enumerate() {
        let groups = placer.couple_groups(slots);
        let row = if depth == 0 {
            placer.place_anchor_row(groups)
        } else {
            placer.place_row(groups)
        };
        placer.resolve_overlaps(&row);
        tracing::trace!(generation, groups = row.groups.len(), "placed generation");
    }
    placer.finish()
}

struct Placer<'p, 'a> {
    input: &'p PositionInput<'a>,
    x: Vec<Option<f32>>,
}

impl Placer<'_, '_> {
    fn width(&self, slot: usize) -> f32 {
        self.input.widths[slot]
    }

    fn id(&self, slot: usize) -> &str {
        self.input.arena.id(slot)
    }

    fn spouse_slots(&self, slot: usize) -> Vec<usize> {
        self.input
            .index
            .spouses_of(self.id(slot))
            .iter()
            .filter_map(|id| self.input.arena.slot_of(id))
            .collect()
    }

    fn child_slots(&self, slot: usize) -> Vec<usize> {
        self.input
            .index
            .children_of(self.id(slot))
            .iter()
            .filter_map(|id| self.input.arena.slot_of(id))
            .collect()
    }

    fn has_known_parents(&self, slot: usize) -> bool {
        self.input
            .index
            .parents_of(self.id(slot))
            .iter()
            .any(|id| self.input.arena.slot_of(id).is_some())
    }

    fn couple_groups(&self, slots: &[usize]) -> Vec<CoupleGroup> {
        let generations = self.input.generations;
        let mut grouped = vec![false; self.input.arena.len()];
        let mut groups = Vec::new();
        for &slot in slots {
            if grouped[slot] {
                continue;
            }
            grouped[slot] = true;
            let mut component = vec![slot];
            let mut cursor = 0;
            while cursor < component.len() {
                let member = component[cursor];
                cursor += 1;
                for spouse in self.spouse_slots(member) {
                    if !grouped[spouse] && generations[spouse] == generations[slot] {
                        grouped[spouse] = true;
                        component.push(spouse);
                    }
                }
            }
            let members = self.order_members(&component);
            let width = self.members_width(&members);
            let birth_key = self
                .birth_position(&members)
                .unwrap_or((usize::MAX, usize::MAX));
            groups.push(CoupleGroup {
                members,
                width,
                birth_key,
            });
        }
        groups.sort_by_key(|group| group.birth_key);
        groups
    }

    /// Left-to-right member order. The anchor is the member with the most
    /// marriages (then blood relative, then male, then input order); a lone
    /// couple puts the male on the left, otherwise spouses follow the anchor
    /// in marriage order and spouses-of-spouses sit right after their partner.
    fn order_members(&self, component: &[usize]) -> Vec<usize> {
        if component.len() == 1 {
            return component.to_vec();
        }
        let arena = self.input.arena;
        let spouses_within = |slot: usize| -> Vec<usize> {
            self.spouse_slots(slot)
                .into_iter()
                .filter(|spouse| component.contains(spouse))
                .collect()
        };

        let anchor = component
            .iter()
            .copied()
            .min_by_key(|&slot| {
                (
                    Reverse(spouses_within(slot).len()),
                    !self.has_known_parents(slot),
                    arena.gender(slot).rank(),
                    slot,
                )
            })
            .unwrap_or(component[0]);

        if component.len() == 2 {
            let other = component
                .iter()
                .copied()
                .find(|&slot| slot != anchor)
                .unwrap_or(anchor);
            return if arena.gender(other).rank() < arena.gender(anchor).rank() {
                vec![other, anchor]
            } else {
                vec![anchor, other]
            };
        }

        let mut spouses = spouses_within(anchor);
        spouses.sort_by_key(|&spouse| {
            (
                self.input
                    .index
                    .spouse_order_of(self.id(anchor), self.id(spouse)),
                spouse,
            )
        });
        let mut members = vec![anchor];
        members.extend(spouses);
        for &slot in component {
            if members.contains(&slot) {
                continue;
            }
            let partners = spouses_within(slot);
            match members.iter().position(|member| partners.contains(member)) {
                Some(position) => members.insert(position + 1, slot),
                None => members.push(slot),
            }
        }
        members
    }

    fn members_width(&self, members: &[usize]) -> f32 {
        let boxes: f32 = members.iter().map(|&slot| self.width(slot)).sum();
        boxes + self.input.config.spouse_gap * members.len().saturating_sub(1) as f32
    }

    /// `(unit, index among that unit's children)` for the first member that
    /// was born into a known family unit.
    fn birth_position(&self, members: &[usize]) -> Option<(usize, usize)> {
        members.iter().find_map(|&slot| {
            let id = self.id(slot);
            let unit = *self.input.families.units_of_child(id).first()?;
            let position = self.input.units[unit]
                .children
                .iter()
                .position(|child| child == id)?;
            Some((unit, position))
        })
    }

    fn place_members(&mut self, members: &[usize], left: f32) {
        let mut cursor = left;
        for &slot in members {
            self.x[slot] = Some(cursor);
            cursor += self.width(slot) + self.input.config.spouse_gap;
        }
    }

    fn place_anchor_row(&mut self, groups: Vec<CoupleGroup>) -> Row {
        let mut row = Row::default();
        let mut cursor = 0.0f32;
        for group in groups {
            self.place_members(&group.members, cursor);
            cursor += group.width + self.input.config.sibling_gap;
            row.push(group.members);
        }
        row
    }

    fn place_row(&mut self, groups: Vec<CoupleGroup>) -> Row {
        let (with_children, without_children): (Vec<_>, Vec<_>) = groups
            .into_iter()
            .partition(|group| self.has_placed_children(&group.members));

        let mut row = Row::default();
        for group in with_children {
            self.place_over_children(&group.members);
            row.push(group.members);
        }
        for group in without_children {
            let left = self.slot_between_siblings(&group, &row);
            self.place_members(&group.members, left);
            row.push(group.members);
        }
        row
    }

    fn has_placed_children(&self, members: &[usize]) -> bool {
        members.iter().any(|&slot| {
            self.child_slots(slot)
                .into_iter()
                .any(|child| self.x[child].is_some())
        })
    }

    fn span(&self, slots: impl IntoIterator<Item = usize>) -> Option<(f32, f32)> {
        let mut span: Option<(f32, f32)> = None;
        for slot in slots {
            let Some(left) = self.x[slot] else {
                continue;
            };
            let right = left + self.width(slot);
            span = Some(match span {
                Some((min, max)) => (min.min(left), max.max(right)),
                None => (left, right),
            });
        }
        span
    }

    fn unit_children_center(&self, parents: &[usize]) -> Option<f32> {
        let ids: Vec<&str> = parents.iter().map(|&slot| self.id(slot)).collect();
        let unit = self.input.families.unit_for_parents(&ids)?;
        let children = self.input.units[unit]
            .children
            .iter()
            .filter_map(|id| self.input.arena.slot_of(id));
        self.span(children).map(|(min, max)| (min + max) / 2.0)
    }

    fn place_over_children(&mut self, members: &[usize]) {
        let all_children: Vec<usize> = members
            .iter()
            .flat_map(|&slot| self.child_slots(slot))
            .collect();
        let fallback = self
            .span(all_children)
            .map(|(min, max)| (min + max) / 2.0)
            .unwrap_or(0.0);

        let primary = &members[..members.len().min(2)];
        let center = self.unit_children_center(primary).unwrap_or(fallback);
        let left = center - self.members_width(primary) / 2.0;
        self.place_members(primary, left);

        let spouse_gap = self.input.config.spouse_gap;
        let mut prev_right = self.span(primary.iter().copied()).map_or(left, |(_, max)| max);
        for (offset, &slot) in members[primary.len()..].iter().enumerate() {
            let min_x = prev_right + spouse_gap;
            let earlier = &members[..primary.len() + offset];
            let partners = self.spouse_slots(slot);
            let preferred = earlier
                .iter()
                .copied()
                .filter(|member| partners.contains(member))
                .find_map(|partner| self.unit_children_center(&[partner, slot]))
                .map(|center| center - self.width(slot) / 2.0);
            let x = preferred.map_or(min_x, |preferred| preferred.max(min_x));
            self.x[slot] = Some(x);
            prev_right = x + self.width(slot);
        }
    }

    fn group_bounds(&self, members: &[usize]) -> (f32, f32) {
        self.span(members.iter().copied()).unwrap_or((0.0, 0.0))
    }

    fn slot_between_siblings(&self, group: &CoupleGroup, row: &Row) -> f32 {
        let gap = self.input.config.sibling_gap;
        let extreme = || {
            row.groups
                .iter()
                .map(|members| self.group_bounds(members).1 + gap)
                .fold(None, |acc: Option<f32>, right| {
                    Some(acc.map_or(right, |acc| acc.max(right)))
                })
                .unwrap_or(0.0)
        };

        let Some((unit, position)) = self.birth_position(&group.members) else {
            return extreme();
        };
        let siblings = &self.input.units[unit].children;
        let placed_group = |id: &String| {
            let slot = self.input.arena.slot_of(id)?;
            let idx = *row.group_of.get(&slot)?;
            Some(self.group_bounds(&row.groups[idx]))
        };
        let left = siblings[..position].iter().rev().find_map(placed_group);
        let right = siblings[position + 1..].iter().find_map(placed_group);

        match (left, right) {
            (Some((_, left_edge)), Some((right_edge, _))) => {
                (left_edge + right_edge) / 2.0 - group.width / 2.0
            }
            (Some((_, left_edge)), None) => left_edge + gap,
            (None, Some((right_edge, _))) => right_edge - gap - group.width,
            (None, None) => extreme(),
        }
    }

    /// One left-to-right sweep: a group closer than `sibling_gap` to its
    /// left neighbour moves right, dragging every later group with it.
    fn resolve_overlaps(&mut self, row: &Row) {
        let gap = self.input.config.sibling_gap;
        let mut order: Vec<(f32, usize)> = row
            .groups
            .iter()
            .enumerate()
            .map(|(idx, members)| (self.group_bounds(members).0, idx))
            .collect();
        order.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut shift = 0.0f32;
        let mut prev_right: Option<f32> = None;
        for (left, idx) in order {
            let members = &row.groups[idx];
            let (_, right) = self.group_bounds(members);
            if let Some(prev) = prev_right {
                let overlap = prev + gap - (left + shift);
                if overlap > 0.0 {
                    shift += overlap;
                }
            }
            if shift != 0.0 {
                for &slot in members {
                    if let Some(x) = self.x[slot].as_mut() {
                        *x += shift;
                    }
                }
            }
            prev_right = Some(right + shift);
        }
    }

    fn finish(self) -> Vec<NodePosition> {
        let xs: Vec<f32> = self.x.iter().map(|x| x.unwrap_or(0.0)).collect();
        let (min, max) = self
            .span(0..xs.len())
            .unwrap_or((0.0, 0.0));
        let offset = -(min + max) / 2.0;
        let gap = self.input.config.generation_gap;
        xs.iter()
            .enumerate()
            .map(|(slot, x)| NodePosition {
                x: x + offset,
                y: self.input.generations[slot] as f32 * gap,
            })
            .collect()
    }
}
