use crate::cancellation::CancellationToken;
use crate::config::EngineConfig;
use crate::core::ids::AccountId;
use crate::detection::finding::Finding;
use crate::error::{EngineError, Result};
use crate::graph::directed_graph::DirectedGraph;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Detect linear shell/layering chains (C4).
///
/// Runs a bounded DFS from every account that is not itself a shell
/// (`tx_count > CHAIN_MAX_INTERMEDIATE_TX`) and has at least one
/// outgoing edge. The search only continues through a node if that
/// node is a shell — the moment it reaches a busy (non-shell) account
/// it may record a finding there but must stop extending, since a
/// busy account breaks the layering chain. Amount must drift by no
/// more than `CHAIN_AMOUNT_TOLERANCE` between adjacent hops and
/// timestamps must be non-decreasing along the path. Depth is capped
/// at `CHAIN_MIN_LENGTH + 3` edges.
///
/// Only maximal chains are kept: a finding whose node sequence appears
/// as a contiguous sub-path of another, longer finding is dropped.
pub fn find_shell_chains(
    graph: &DirectedGraph,
    config: &EngineConfig,
    cancellation: Option<&CancellationToken>,
) -> Result<Vec<Finding>> {
    let mut raw: Vec<Vec<AccountId>> = Vec::new();

    for start in graph.account_ids() {
        if cancellation.is_some_and(|c| c.is_cancelled()) {
            return Err(EngineError::Cancelled);
        }
        let Some(acc) = graph.account(start) else {
            continue;
        };
        if acc.out_edges().is_empty() || acc.tx_count() <= config.chain_max_intermediate_tx {
            continue;
        }
        let mut path = vec![start.clone()];
        dfs(graph, config, &mut path, None, &mut raw);
    }

    Ok(retain_maximal(raw)
        .into_iter()
        .map(|path| Finding::ShellChain { path })
        .collect())
}

fn dfs(
    graph: &DirectedGraph,
    config: &EngineConfig,
    path: &mut Vec<AccountId>,
    last_edge: Option<(DateTime<Utc>, Decimal)>,
    out: &mut Vec<Vec<AccountId>>,
) {
    let edge_count = path.len() - 1;
    if edge_count >= config.chain_min_length {
        out.push(path.clone());
    }

    let current = path.last().unwrap().clone();
    let is_source = path.len() == 1;
    if !is_source {
        let acc = graph.account(&current).unwrap();
        if acc.tx_count() > config.chain_max_intermediate_tx {
            // busy node: may terminate a chain here but never extends it
            return;
        }
    }
    if edge_count >= config.chain_min_length + 3 {
        return;
    }

    for (next, txn_idx) in graph.out_neighbors(&current) {
        if path.contains(next) {
            continue;
        }
        let txn = graph.transaction(txn_idx);
        if let Some((prev_ts, prev_amt)) = last_edge {
            if txn.timestamp() < prev_ts {
                continue;
            }
            if !within_tolerance(prev_amt, txn.amount(), config.chain_amount_tolerance) {
                continue;
            }
        }
        path.push(next.clone());
        dfs(graph, config, path, Some((txn.timestamp(), txn.amount())), out);
        path.pop();
    }
}

fn within_tolerance(prev: Decimal, next: Decimal, tolerance: f64) -> bool {
    if prev == Decimal::ZERO {
        return next == Decimal::ZERO;
    }
    let diff = (prev - next).abs();
    let ratio = diff / prev;
    ratio <= Decimal::try_from(tolerance).unwrap_or(Decimal::ZERO)
}

/// Keep only chains that are not a contiguous sub-path of a longer chain.
fn retain_maximal(mut chains: Vec<Vec<AccountId>>) -> Vec<Vec<AccountId>> {
    chains.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    chains.dedup();

    let mut accepted: Vec<Vec<AccountId>> = Vec::new();
    for chain in chains {
        let subsumed = accepted.iter().any(|longer| is_contiguous_subpath(&chain, longer));
        if !subsumed {
            accepted.push(chain);
        }
    }
    accepted
}

fn is_contiguous_subpath(small: &[AccountId], big: &[AccountId]) -> bool {
    if small.len() >= big.len() {
        return false;
    }
    big.windows(small.len()).any(|w| w == small)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::Transaction;
    use crate::graph::directed_graph::build;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn ts(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 18, h, 0, 0).unwrap()
    }

    fn txn(id: &str, s: &str, r: &str, amount: rust_decimal::Decimal, h: u32) -> Transaction {
        Transaction::new(id, AccountId::new(s), AccountId::new(r), amount, ts(h))
    }

    #[test]
    fn test_basic_shell_chain() {
        // A -> B -> C -> D -> E, B/C/D have tx_count=1 each.
        let txns = vec![
            txn("T1", "A", "B", dec!(10000), 1),
            txn("T2", "B", "C", dec!(9800), 2),
            txn("T3", "C", "D", dec!(9600), 3),
            txn("T4", "D", "E", dec!(9400), 4),
            // Give A and E extra activity so they aren't shells.
            txn("T5", "A", "Z1", dec!(1), 5),
            txn("T6", "A", "Z2", dec!(1), 6),
            txn("T7", "A", "Z3", dec!(1), 7),
            txn("T8", "E", "Z4", dec!(1), 8),
            txn("T9", "E", "Z5", dec!(1), 9),
            txn("T10", "E", "Z6", dec!(1), 10),
        ];
        let g = build(txns).unwrap();
        let cfg = EngineConfig::default();
        let chains = find_shell_chains(&g, &cfg, None).unwrap();
        assert_eq!(chains.len(), 1);
        match &chains[0] {
            Finding::ShellChain { path } => {
                assert_eq!(
                    path,
                    &vec![
                        AccountId::new("A"),
                        AccountId::new("B"),
                        AccountId::new("C"),
                        AccountId::new("D"),
                        AccountId::new("E"),
                    ]
                );
            }
            _ => panic!("expected shell chain"),
        }
    }

    #[test]
    fn test_busy_intermediate_breaks_chain() {
        let mut txns = vec![
            txn("T1", "A", "B", dec!(10000), 1),
            txn("T2", "B", "C", dec!(9800), 2),
            txn("T3", "C", "D", dec!(9600), 3),
            txn("T4", "D", "E", dec!(9400), 4),
        ];
        // Make C busy (tx_count > 3).
        for i in 0..5 {
            txns.push(txn(&format!("X{i}"), "C", "W", dec!(1), 5));
        }
        let g = build(txns).unwrap();
        let cfg = EngineConfig::default();
        assert!(find_shell_chains(&g, &cfg, None).unwrap().is_empty());
    }

    #[test]
    fn test_amount_tolerance_violation() {
        let txns = vec![
            txn("T1", "A", "B", dec!(10000), 1),
            txn("T2", "B", "C", dec!(5000), 2), // 50% drop, exceeds 10% tolerance
            txn("T3", "C", "D", dec!(4900), 3),
            txn("T4", "D", "E", dec!(4800), 4),
        ];
        let g = build(txns).unwrap();
        let cfg = EngineConfig::default();
        assert!(find_shell_chains(&g, &cfg, None).unwrap().is_empty());
    }

    #[test]
    fn test_maximal_chain_subsumes_prefix() {
        // A -> B -> C -> D -> E -> F, all within tolerance, B..E are shells.
        let txns = vec![
            txn("T1", "A", "B", dec!(10000), 1),
            txn("T2", "B", "C", dec!(9900), 2),
            txn("T3", "C", "D", dec!(9800), 3),
            txn("T4", "D", "E", dec!(9700), 4),
            txn("T5", "E", "F", dec!(9600), 5),
        ];
        let g = build(txns).unwrap();
        let cfg = EngineConfig::default();
        let chains = find_shell_chains(&g, &cfg, None).unwrap();
        // Only the maximal 6-node chain should survive, not its 5-node prefix.
        assert_eq!(chains.len(), 1);
        match &chains[0] {
            Finding::ShellChain { path } => assert_eq!(path.len(), 6),
            _ => panic!("expected shell chain"),
        }
    }
}
