use super::NodeArena;
use super::index::RelationshipIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GenerationMode {
    /// Every node carried a precomputed generation.
    Trusted,
    /// Generations were derived by traversal from root nodes.
    Computed,
}

/// Generation per arena slot, normalized so the minimum is 0.
pub(crate) fn assign_generations(
    arena: &NodeArena<'_>,
    index: &RelationshipIndex,
) -> (Vec<i32>, GenerationMode) {
    let trusted: Option<Vec<i32>> = arena
        .persons()
        .iter()
        .map(|person| person.generation)
        .collect();
    if let Some(generations) = trusted
        && !generations.is_empty()
    {
        return (normalize(generations), GenerationMode::Trusted);
    }

    let mut assigned: Vec<Option<i32>> = vec![None; arena.len()];
    for root in root_order(arena, index) {
        if assigned[root].is_none() {
            traverse(arena, index, root, &mut assigned);
        }
    }

    let unreached = assigned.iter().filter(|value| value.is_none()).count();
    if unreached > 0 {
        tracing::debug!(unreached, "nodes outside any rooted traversal default to generation 0");
    }
    let generations = assigned
        .into_iter()
        .map(|value| value.unwrap_or(0))
        .collect();
    (normalize(generations), GenerationMode::Computed)
}

/// Roots are nodes without a known parent. Married-in roots (whose spouse has
/// parents) go last so they inherit their partner's generation instead of
/// pinning the partner to generation 0.
fn root_order(arena: &NodeArena<'_>, index: &RelationshipIndex) -> Vec<usize> {
    let has_known_parent = |slot: usize| {
        index
            .parents_of(arena.id(slot))
            .iter()
            .any(|parent| arena.slot_of(parent).is_some())
    };
    let mut primary = Vec::new();
    let mut married_in = Vec::new();
    for slot in 0..arena.len() {
        if has_known_parent(slot) {
            continue;
        }
        let spouse_has_parents = index
            .spouses_of(arena.id(slot))
            .iter()
            .filter_map(|spouse| arena.slot_of(spouse))
            .any(has_known_parent);
        if spouse_has_parents {
            married_in.push(slot);
        } else {
            primary.push(slot);
        }
    }
    primary.extend(married_in);
    primary
}

/// Depth-first walk from `root`. A slot is assigned at most once, which both
/// makes the first visit win and stops cycles in malformed data.
fn traverse(
    arena: &NodeArena<'_>,
    index: &RelationshipIndex,
    root: usize,
    assigned: &mut [Option<i32>],
) {
    let mut stack = vec![(root, 0i32)];
    while let Some((slot, generation)) = stack.pop() {
        if assigned[slot].is_some() {
            continue;
        }
        assigned[slot] = Some(generation);

        // Spouses, and their spouses in turn, share the generation.
        let mut couple = vec![slot];
        let mut cursor = 0;
        while cursor < couple.len() {
            let member = couple[cursor];
            cursor += 1;
            for spouse in index.spouses_of(arena.id(member)) {
                let Some(spouse_slot) = arena.slot_of(spouse) else {
                    continue;
                };
                if assigned[spouse_slot].is_none() {
                    assigned[spouse_slot] = Some(generation);
                    couple.push(spouse_slot);
                }
            }
        }

        let mut children = Vec::new();
        for member in couple {
            for child in index.children_of(arena.id(member)) {
                if let Some(child_slot) = arena.slot_of(child)
                    && assigned[child_slot].is_none()
                    && !children.contains(&child_slot)
                {
                    children.push(child_slot);
                }
            }
        }
        // Reversed so the first child is visited first.
        stack.extend(children.into_iter().rev().map(|child| (child, generation + 1)));
    }
}

/// Shifts so the minimum is 0. The difference is taken in `i64` and clamped,
/// since trusted values may span more than `i32::MAX`.
fn normalize(mut generations: Vec<i32>) -> Vec<i32> {
    if let Some(min) = generations.iter().copied().min() {
        for value in &mut generations {
            let shifted = i64::from(*value) - i64::from(min);
            *value = i32::try_from(shifted).unwrap_or(i32::MAX);
        }
    }
    generations
}
