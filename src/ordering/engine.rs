//! Level-bucket sort followed by constraint-directed repositioning.

use std::collections::HashMap;

use crate::error::ConfigurationError;

/// Level assumed when an item does not declare one.
pub const DEFAULT_LEVEL: i32 = 3;

/// Registration metadata the engine orders by.
pub trait Placement {
    /// Name other items refer to in `before`/`after`.
    fn name(&self) -> &str;

    /// Coarse priority bucket; lower runs earlier.
    fn level(&self) -> Option<i32>;

    /// Pin this item immediately before the named sibling.
    fn before(&self) -> Option<&str> {
        None
    }

    /// Pin this item immediately after the named sibling.
    fn after(&self) -> Option<&str> {
        None
    }
}

#[derive(Debug, Clone, Copy)]
enum Anchor {
    Before(usize),
    After(usize),
}

/// Resolve `items` into one linear order.
///
/// Items are first sorted by level (stable, so registration order breaks
/// ties). Items with a `before`/`after` constraint on an existing sibling are
/// then moved next to that sibling regardless of their own level. Constraints
/// that can never be satisfied (`a before b`, `b before a`) yield
/// [`ConfigurationError::Cycle`] and no order. An item pinned before its
/// target cannot also anchor `after` constraints, and an item pinned after its
/// target cannot anchor `before` ones; either yields
/// [`ConfigurationError::Conflict`].
pub fn order<T: Placement>(items: Vec<T>) -> Result<Vec<T>, ConfigurationError> {
    let count = items.len();

    let mut baseline: Vec<usize> = (0..count).collect();
    baseline.sort_by_key(|&i| items[i].level().unwrap_or(DEFAULT_LEVEL));

    let mut by_name: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, item) in items.iter().enumerate() {
        by_name.entry(item.name()).or_default().push(i);
    }

    let mut anchors: Vec<Option<Anchor>> = vec![None; count];
    let mut self_pinned = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let (target, before) = match (item.before(), item.after()) {
            (Some(before), Some(after)) => {
                tracing::warn!(
                    name = item.name(),
                    before,
                    after,
                    "both before and after declared, using before"
                );
                (before, true)
            }
            (Some(before), None) => (before, true),
            (None, Some(after)) => (after, false),
            (None, None) => continue,
        };

        let Some(candidates) = by_name.get(target) else {
            tracing::warn!(
                name = item.name(),
                target,
                "ordering constraint refers to an unknown item, ignoring it"
            );
            continue;
        };

        match candidates.iter().copied().find(|&j| j != i) {
            Some(j) => anchors[i] = Some(if before { Anchor::Before(j) } else { Anchor::After(j) }),
            None => self_pinned.push(i),
        }
    }

    if !self_pinned.is_empty() {
        return Err(ConfigurationError::Cycle {
            names: self_pinned.iter().map(|&i| items[i].name().to_string()).collect(),
        });
    }

    let mut befores: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut afters: Vec<Vec<usize>> = vec![Vec::new(); count];
    for (i, anchor) in anchors.iter().enumerate() {
        match anchor {
            Some(Anchor::Before(j)) => befores[*j].push(i),
            Some(Anchor::After(j)) => afters[*j].push(i),
            None => {}
        }
    }

    let mut sequence = Vec::with_capacity(count);
    let mut placed = vec![false; count];
    for &i in baseline.iter().filter(|&&i| anchors[i].is_none()) {
        emit(i, &befores, &afters, &mut placed, &mut sequence);
    }

    if sequence.len() != count {
        let names = (0..count)
            .filter(|&i| !placed[i])
            .map(|i| items[i].name().to_string())
            .collect();
        return Err(ConfigurationError::Cycle { names });
    }

    for (i, anchor) in anchors.iter().enumerate() {
        let (side, pinned, target) = match anchor {
            Some(Anchor::Before(target)) => ("after", afters[i].first(), *target),
            Some(Anchor::After(target)) => ("before", befores[i].first(), *target),
            None => continue,
        };
        if let Some(&pinned) = pinned {
            return Err(ConfigurationError::Conflict {
                pinned: items[pinned].name().to_string(),
                side,
                anchor: items[i].name().to_string(),
                target: items[target].name().to_string(),
            });
        }
    }

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    Ok(sequence
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect())
}

fn emit(
    index: usize,
    befores: &[Vec<usize>],
    afters: &[Vec<usize>],
    placed: &mut [bool],
    sequence: &mut Vec<usize>,
) {
    placed[index] = true;
    for &i in &befores[index] {
        emit(i, befores, afters, placed, sequence);
    }
    sequence.push(index);
    for &i in &afters[index] {
        emit(i, befores, afters, placed, sequence);
    }
}
