//! Bounded edit distance.
//!
//! The third matching phase only ever needs distances up to a small cap, so
//! the DP bails out as soon as a full row exceeds it. A cheap
//! [`distance_lower_bound`] lets callers skip the DP entirely for clearly
//! unrelated strings.

/// Cheap lower bound on the Levenshtein distance between two character
/// sequences.
///
/// Two bounds are combined, both O(|a| + |b|):
/// - the length difference (every missing character costs one edit), and
/// - `max_len - common`, where `common` is the multiset character overlap
///   (every non-shared character in the longer string costs one edit).
#[must_use]
pub fn distance_lower_bound(a: &[char], b: &[char]) -> usize {
    let len_diff = a.len().abs_diff(b.len());

    let mut counts: std::collections::HashMap<char, isize> = std::collections::HashMap::new();
    for &c in a {
        *counts.entry(c).or_insert(0) += 1;
    }
    let mut common = 0usize;
    for &c in b {
        if let Some(n) = counts.get_mut(&c) {
            if *n > 0 {
                *n -= 1;
                common += 1;
            }
        }
    }
    let overlap_bound = a.len().max(b.len()) - common;

    len_diff.max(overlap_bound)
}

/// Levenshtein distance between `a` and `b`, capped at `max`.
///
/// Returns `None` when the true distance exceeds `max`. Uses the classic
/// two-row DP with an early exit once the minimum of the current row passes
/// the cap.
#[must_use]
pub fn bounded_levenshtein(a: &[char], b: &[char], max: usize) -> Option<usize> {
    if a == b {
        return Some(0);
    }
    if a.len().abs_diff(b.len()) > max {
        return None;
    }
    if a.is_empty() {
        return (b.len() <= max).then_some(b.len());
    }
    if b.is_empty() {
        return (a.len() <= max).then_some(a.len());
    }

    let mut prev_row: Vec<usize> = (0..=b.len()).collect();
    let mut cur_row = vec![0usize; b.len() + 1];

    for (i, &a_ch) in a.iter().enumerate() {
        cur_row[0] = i + 1;
        let mut row_min = cur_row[0];
        for (j, &b_ch) in b.iter().enumerate() {
            let cost = usize::from(a_ch != b_ch);
            cur_row[j + 1] = (prev_row[j + 1] + 1)
                .min(cur_row[j] + 1)
                .min(prev_row[j] + cost);
            row_min = row_min.min(cur_row[j + 1]);
        }
        if row_min > max {
            return None;
        }
        prev_row.copy_from_slice(&cur_row);
    }

    let distance = prev_row[b.len()];
    (distance <= max).then_some(distance)
}
