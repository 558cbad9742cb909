use crate::cancellation::CancellationToken;
use crate::core::ids::AccountId;
use crate::detection::finding::Finding;
use crate::error::{EngineError, Result};
use crate::graph::directed_graph::DirectedGraph;
use std::collections::HashSet;

/// Detect every simple directed cycle of length 3–5 (C2).
///
/// For each account (in deterministic insertion order) runs a
/// bounded-depth DFS back to that account. A cycle is only ever kept
/// once: every discovered path is rotated to its canonical form (the
/// rotation starting at the lexicographically smallest member,
/// direction preserved) before being inserted into a dedup set, so the
/// same cycle found from different starting nodes collapses to one
/// finding. 2-cycles (A↔B) never satisfy the length-3 floor and are
/// never reported; cycles sharing nodes but not edges are independent
/// findings.
///
/// Same DFS/backtrack shape and rotation-based canonicalization as a
/// bottleneck-cycle search over a currency graph, minus the
/// single-currency weighting (there is no currency here) and with the
/// length cap enforced by a depth prune instead of a post-hoc filter.
/// DFS is not restricted to neighbors greater than `start` — that
/// prune is only sound for undirected cycle enumeration, so here every
/// reachable extension is explored and duplicates are removed by
/// canonical form alone.
pub fn find_cycles(graph: &DirectedGraph, cancellation: Option<&CancellationToken>) -> Result<Vec<Finding>> {
    let mut canonical: HashSet<Vec<AccountId>> = HashSet::new();

    for start in graph.account_ids() {
        if cancellation.is_some_and(|c| c.is_cancelled()) {
            return Err(EngineError::Cancelled);
        }
        let mut path: Vec<AccountId> = vec![start.clone()];
        let mut path_set: HashSet<AccountId> = HashSet::from([start.clone()]);
        dfs(start, start, graph, &mut path, &mut path_set, &mut canonical);
    }

    let mut cycles: Vec<Vec<AccountId>> = canonical.into_iter().collect();
    cycles.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));

    Ok(cycles
        .into_iter()
        .map(|members| Finding::Cycle { members })
        .collect())
}

fn dfs(
    current: &AccountId,
    start: &AccountId,
    graph: &DirectedGraph,
    path: &mut Vec<AccountId>,
    path_set: &mut HashSet<AccountId>,
    canonical: &mut HashSet<Vec<AccountId>>,
) {
    for (next, _txn_idx) in graph.out_neighbors(current) {
        if next == start {
            if (3..=5).contains(&path.len()) {
                canonical.insert(canonical_form(path));
            }
            continue;
        }
        if path_set.contains(next) || path.len() >= 5 {
            continue;
        }
        path.push(next.clone());
        path_set.insert(next.clone());
        dfs(next, start, graph, path, path_set, canonical);
        path_set.remove(next);
        path.pop();
    }
}

/// Rotate `members` so the lexicographically smallest account starts
/// the sequence, preserving edge direction.
fn canonical_form(members: &[AccountId]) -> Vec<AccountId> {
    let min_idx = (0..members.len())
        .min_by_key(|&i| &members[i])
        .unwrap_or(0);
    members[min_idx..]
        .iter()
        .chain(members[..min_idx].iter())
        .cloned()
        .collect()
}
