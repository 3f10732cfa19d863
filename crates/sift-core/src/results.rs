//! Grouped result assembly
//!
//! Helpers for the fixed derivation pipeline: filtered entries are grouped
//! (first-seen key order), each group is sorted independently, and the
//! flattened sequence is sliced for pagination. A group whose membership is
//! emptied by the current pass never appears in the output.

use indexmap::IndexMap;
use std::cmp::Ordering;

/// One group of the derived result set. `key` is `None` when no group-key
/// extractor is configured (the whole result is a single anonymous group).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group<T> {
    /// Group key in first-seen order, or `None` for the ungrouped result.
    pub key: Option<String>,
    /// Members in derived order; never empty.
    pub items: Vec<T>,
}

/// A pipeline entry: the item, its match score, and its position in the base
/// set (the tiebreaker that keeps equal-score ordering deterministic).
#[derive(Debug, Clone)]
pub struct ScoredEntry<T> {
    /// The item itself.
    pub item: T,
    /// Match score; `1.0` when no query gates inclusion.
    pub score: f64,
    /// Index in the base set before filtering.
    pub index: usize,
}

/// Group `entries` (preserving first-seen key order), then sort each group:
/// by `comparator` when one is installed, else by descending score with
/// base-set order as tiebreaker when `rank_by_score` is set, else by
/// base-set order alone.
pub fn group_and_sort<T>(
    entries: Vec<ScoredEntry<T>>,
    group_key: Option<&dyn Fn(&T) -> String>,
    comparator: Option<&dyn Fn(&T, &T) -> Ordering>,
    rank_by_score: bool,
) -> Vec<Group<T>> {
    let mut grouped: IndexMap<Option<String>, Vec<ScoredEntry<T>>> = IndexMap::new();
    for entry in entries {
        let key = group_key.map(|f| f(&entry.item));
        grouped.entry(key).or_default().push(entry);
    }

    for members in grouped.values_mut() {
        if let Some(cmp) = comparator {
            members.sort_by(|a, b| cmp(&a.item, &b.item));
        } else if rank_by_score {
            members.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.index.cmp(&b.index))
            });
        }
    }

    grouped
        .into_iter()
        .map(|(key, members)| Group {
            key,
            items: members.into_iter().map(|e| e.item).collect(),
        })
        .collect()
}

/// Slice the first `limit` items across groups, preserving group structure.
/// Returns the sliced groups and whether anything was cut off.
#[must_use]
pub fn paginate<T: Clone>(groups: &[Group<T>], limit: usize) -> (Vec<Group<T>>, bool) {
    let total = total_items(groups);
    if limit >= total {
        return (groups.to_vec(), false);
    }

    let mut remaining = limit;
    let mut sliced = Vec::new();
    for group in groups {
        if remaining == 0 {
            break;
        }
        let take = group.items.len().min(remaining);
        sliced.push(Group {
            key: group.key.clone(),
            items: group.items[..take].to_vec(),
        });
        remaining -= take;
    }
    (sliced, true)
}

/// Flatten groups into the visible item sequence.
#[must_use]
pub fn flatten<T: Clone>(groups: &[Group<T>]) -> Vec<T> {
    groups.iter().flat_map(|g| g.items.iter().cloned()).collect()
}

/// Total item count across groups.
#[must_use]
pub fn total_items<T>(groups: &[Group<T>]) -> usize {
    groups.iter().map(|g| g.items.len()).sum()
}
