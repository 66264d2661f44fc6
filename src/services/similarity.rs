//! Name similarity scoring.
//!
//! The score is a token-set ratio built on normalized Levenshtein distance,
//! in whole percent. Both sides are lowercased and split into whitespace
//! tokens; the shared tokens and each side's leftovers are compared in sorted
//! order and the best of the three pairings wins. A name that is a token
//! subset of another ("budget" in "Budget Review") therefore scores 100,
//! while single-word names reduce to the plain edit-distance ratio.

use std::collections::BTreeSet;

/// Minimum score for a fuzzy project/context match (inclusive).
pub const FUZZY_MATCH_THRESHOLD: u8 = 70;

/// Minimum score for a task title match (inclusive).
pub const TASK_MATCH_THRESHOLD: u8 = 50;

/// Similarity of two names, 0..=100.
pub fn ratio(a: &str, b: &str) -> u8 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    match (tokens_a.is_empty(), tokens_b.is_empty()) {
        (true, true) => return 100,
        (true, false) | (false, true) => return 0,
        (false, false) => {}
    }

    let shared = join(tokens_a.intersection(&tokens_b));
    let only_a = join(tokens_a.difference(&tokens_b));
    let only_b = join(tokens_b.difference(&tokens_a));
    let with_a = concat(&shared, &only_a);
    let with_b = concat(&shared, &only_b);

    edit_ratio(&shared, &with_a)
        .max(edit_ratio(&shared, &with_b))
        .max(edit_ratio(&with_a, &with_b))
}

/// `round(100 * (max_len - distance) / max_len)` over characters.
/// Two empty strings score 100.
pub fn edit_ratio(a: &str, b: &str) -> u8 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 100;
    }
    let distance = strsim::levenshtein(a, b).min(max_len);
    let same = max_len - distance;
    // Integer rounding, half up.
    let score = (same * 200 + max_len) / (max_len * 2);
    u8::try_from(score).unwrap_or(100)
}

fn join<'s, 't: 's>(tokens: impl Iterator<Item = &'s &'t str>) -> String {
    tokens.copied().collect::<Vec<_>>().join(" ")
}

fn concat(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (_, true) => head.to_string(),
        (true, false) => tail.to_string(),
        (false, false) => format!("{head} {tail}"),
    }
}

/// Best candidate scoring at least `threshold`.
///
/// Ties keep the earliest candidate, so callers that pass records in store
/// order get a stable answer.
pub fn best_match<'a, T>(
    query: &str,
    candidates: &'a [T],
    name_of: impl Fn(&T) -> &str,
    threshold: u8,
) -> Option<(&'a T, u8)> {
    let mut best: Option<(&T, u8)> = None;
    for candidate in candidates {
        let score = ratio(query, name_of(candidate));
        if score < threshold {
            continue;
        }
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((candidate, score));
        }
    }
    best
}
