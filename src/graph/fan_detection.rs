use crate::cancellation::CancellationToken;
use crate::config::EngineConfig;
use crate::core::ids::AccountId;
use crate::detection::finding::Finding;
use crate::error::{EngineError, Result};
use crate::graph::directed_graph::DirectedGraph;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;

enum Direction {
    FanIn,
    FanOut,
}

/// Detect fan-in and fan-out smurfing hubs (C3).
///
/// For every account, scans its incoming edges (fan-in) and outgoing
/// edges (fan-out) sorted by timestamp with a two-pointer sliding
/// window of width `FAN_WINDOW`, tracking the distinct-counterparty
/// count inside the window the way a running histogram is kept: grow
/// on the right, retire on the left. Every window position that meets
/// `FAN_MIN_SPOKES` and `FAN_MIN_VOLUME` is a *candidate*; candidates
/// are then reduced to the maximal, non-subsumed set so overlapping
/// near-duplicate windows collapse to one finding per genuinely
/// distinct hub event.
pub fn find_fans(
    graph: &DirectedGraph,
    config: &EngineConfig,
    cancellation: Option<&CancellationToken>,
) -> Result<Vec<Finding>> {
    let mut findings = Vec::new();
    for hub in graph.account_ids() {
        if cancellation.is_some_and(|c| c.is_cancelled()) {
            return Err(EngineError::Cancelled);
        }
        findings.extend(scan_hub(graph, config, hub, Direction::FanIn));
        findings.extend(scan_hub(graph, config, hub, Direction::FanOut));
    }
    Ok(findings)
}

struct Candidate {
    left: usize,
    right: usize,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    volume: Decimal,
    spokes: Vec<AccountId>,
}

fn scan_hub(
    graph: &DirectedGraph,
    config: &EngineConfig,
    hub: &AccountId,
    direction: Direction,
) -> Vec<Finding> {
    let mut incidents: Vec<(DateTime<Utc>, AccountId, Decimal)> = match direction {
        Direction::FanIn => graph
            .in_neighbors(hub)
            .into_iter()
            .map(|(sender, idx)| {
                let t = graph.transaction(idx);
                (t.timestamp(), sender.clone(), t.amount())
            })
            .collect(),
        Direction::FanOut => graph
            .out_neighbors(hub)
            .into_iter()
            .map(|(receiver, idx)| {
                let t = graph.transaction(idx);
                (t.timestamp(), receiver.clone(), t.amount())
            })
            .collect(),
    };
    incidents.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let window = config.fan_window();
    let mut candidates: Vec<Candidate> = Vec::new();
    let mut counts: HashMap<AccountId, u32> = HashMap::new();
    let mut volume = Decimal::ZERO;
    let mut left = 0usize;

    for right in 0..incidents.len() {
        let (right_ts, right_cp, right_amt) = &incidents[right];
        *counts.entry(right_cp.clone()).or_insert(0) += 1;
        volume += right_amt;

        while *right_ts - incidents[left].0 > window {
            let (_, left_cp, left_amt) = &incidents[left];
            if let Some(c) = counts.get_mut(left_cp) {
                *c -= 1;
                if *c == 0 {
                    counts.remove(left_cp);
                }
            }
            volume -= left_amt;
            left += 1;
        }

        if counts.len() >= config.fan_min_spokes && volume >= config.fan_min_volume {
            let mut spokes: Vec<AccountId> = counts.keys().cloned().collect();
            spokes.sort();
            candidates.push(Candidate {
                left,
                right,
                window_start: incidents[left].0,
                window_end: incidents[right].0,
                volume,
                spokes,
            });
        }
    }

    select_maximal(candidates)
        .into_iter()
        .map(|c| match direction {
            Direction::FanIn => Finding::FanIn {
                hub: hub.clone(),
                spokes: c.spokes,
                window_start: c.window_start,
                window_end: c.window_end,
                total_volume: c.volume,
            },
            Direction::FanOut => Finding::FanOut {
                hub: hub.clone(),
                spokes: c.spokes,
                window_start: c.window_start,
                window_end: c.window_end,
                total_volume: c.volume,
            },
        })
        .collect()
}

/// Reduce candidate windows to the maximal, non-subsumed set: widest
/// spoke set first (ties broken by earliest start), skipping any
/// candidate whose spoke set is a subset of one already accepted.
fn select_maximal(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| {
        b.spokes
            .len()
            .cmp(&a.spokes.len())
            .then_with(|| (b.right - b.left).cmp(&(a.right - a.left)))
            .then_with(|| a.window_start.cmp(&b.window_start))
    });

    let mut accepted: Vec<Candidate> = Vec::new();
    for c in candidates {
        let subsumed = accepted.iter().any(|a| {
            c.spokes.iter().all(|s| a.spokes.contains(s))
        });
        if !subsumed {
            accepted.push(c);
        }
    }
    accepted.sort_by(|a, b| a.window_start.cmp(&b.window_start));
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::Transaction;
    use crate::graph::directed_graph::build;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn ts(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 18, h, m, 0).unwrap()
    }

    #[test]
    fn test_fan_in_smurfing() {
        let mut txns = Vec::new();
        for i in 1..=12 {
            txns.push(Transaction::new(
                format!("T{i}"),
                AccountId::new(format!("S{i}")),
                AccountId::new("X"),
                dec!(900),
                ts(i % 20, 0),
            ));
        }
        let g = build(txns).unwrap();
        let cfg = EngineConfig::default();
        let fans = find_fans(&g, &cfg, None).unwrap();
        let fan_in: Vec<_> = fans
            .iter()
            .filter(|f| matches!(f, Finding::FanIn { .. }))
            .collect();
        assert_eq!(fan_in.len(), 1);
        match fan_in[0] {
            Finding::FanIn { spokes, hub, .. } => {
                assert_eq!(hub, &AccountId::new("X"));
                assert_eq!(spokes.len(), 12);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_below_threshold_not_flagged() {
        let mut txns = Vec::new();
        for i in 1..=5 {
            txns.push(Transaction::new(
                format!("T{i}"),
                AccountId::new(format!("S{i}")),
                AccountId::new("X"),
                dec!(900),
                ts(i, 0),
            ));
        }
        let g = build(txns).unwrap();
        let cfg = EngineConfig::default();
        assert!(find_fans(&g, &cfg, None).unwrap().is_empty());
    }

    #[test]
    fn test_min_volume_gate() {
        let mut txns = Vec::new();
        for i in 1..=12 {
            txns.push(Transaction::new(
                format!("T{i}"),
                AccountId::new(format!("S{i}")),
                AccountId::new("X"),
                dec!(1),
                ts(i % 20, 0),
            ));
        }
        let g = build(txns).unwrap();
        let cfg = EngineConfig {
            fan_min_volume: dec!(1000),
            ..Default::default()
        };
        assert!(find_fans(&g, &cfg, None).unwrap().is_empty());
    }

    #[test]
    fn test_fan_out_symmetric() {
        let mut txns = Vec::new();
        for i in 1..=10 {
            txns.push(Transaction::new(
                format!("T{i}"),
                AccountId::new("X"),
                AccountId::new(format!("R{i}")),
                dec!(500),
                ts(i % 20, 0),
            ));
        }
        let g = build(txns).unwrap();
        let cfg = EngineConfig::default();
        let fans = find_fans(&g, &cfg, None).unwrap();
        assert!(fans.iter().any(|f| matches!(f, Finding::FanOut { .. })));
    }
}
