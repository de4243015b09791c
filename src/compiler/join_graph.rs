//! Join inference from shared variable occurrences.
//!
//! A variable occurring in two predicates is a join: the two sites must be
//! equal. Pairs are deduplicated globally by *alias pair*, not by
//! variable: the first shared variable between any two aliases contributes
//! the ON condition, and later shared variables between the same pair are
//! dropped rather than ANDed in as extra conditions. Stricter multi-column
//! join semantics would change observable output and are out of scope.

use std::collections::HashSet;

use crate::goal::Predicate;

use super::locations::{LocationIndex, VariableLocation};

/// One inferred join edge: the later-introduced site joins against the
/// earlier one with an equality condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinPair<'a> {
    /// Site introduced earlier in variable first-seen order.
    pub left: &'a VariableLocation,
    /// Site on the table being brought into the plan.
    pub right: &'a VariableLocation,
}

/// Derives the deduplicated join pairs for the indexed variables.
///
/// For each variable with two or more locations, every unordered location
/// pair is generated in first-seen order; a pair survives only if no
/// earlier pair already connected the same two aliases. The symmetric
/// dedup key is the two aliases sorted lexicographically.
#[must_use]
pub fn join_pairs(index: &LocationIndex) -> Vec<JoinPair<'_>> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut pairs = Vec::new();

    for locations in index.iter() {
        if locations.len() < 2 {
            continue;
        }
        for (i, left) in locations.iter().enumerate() {
            for right in &locations[i + 1..] {
                let key = pair_key(&left.alias, &right.alias);
                if seen.insert(key) {
                    pairs.push(JoinPair { left, right });
                }
            }
        }
    }

    pairs
}

fn pair_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{a}::{b}")
    } else {
        format!("{b}::{a}")
    }
}

/// Tests whether the predicate set is fully disconnected: two or more
/// predicates, and no pair of them shares a variable.
///
/// Only total pairwise disjointness is detected. A mixed graph (some
/// predicates connected, one isolated) is not a disconnection here; its
/// isolated predicate simply contributes no join edge, and the resulting
/// plan is undefined for it.
#[must_use]
pub fn predicates_disconnected(predicates: &[Predicate]) -> bool {
    if predicates.len() < 2 {
        return false;
    }

    let var_sets: Vec<HashSet<uuid::Uuid>> = predicates
        .iter()
        .map(|p| p.bound_variables().map(crate::goal::Variable::id).collect())
        .collect();

    let any_shared = var_sets.iter().enumerate().any(|(i, set1)| {
        var_sets[i + 1..]
            .iter()
            .any(|set2| set1.intersection(set2).next().is_some())
    });

    !any_shared
}
