use crate::assembly::ring_assembler::Ring;
use crate::config::EngineConfig;
use crate::core::ids::AccountId;
use crate::detection::finding::{Finding, PatternType};
use crate::graph::directed_graph::DirectedGraph;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;

/// An account whose final score cleared `SUSPICIOUS_THRESHOLD`.
#[derive(Debug, Clone)]
pub struct SuspiciousAccount {
    pub account_id: AccountId,
    pub score: u8,
    /// Pattern kinds of every ring this account belongs to, deduplicated and sorted.
    pub detected_patterns: Vec<PatternType>,
    /// The highest-risk ring containing the account, or `None`.
    pub ring_id: Option<String>,
}

/// Score every ring's structural base in place.
///
/// A ring's score is driven purely by the size of the pattern it was
/// built from — cycle length, spoke count, or chain length — with no
/// behavioral or dampening component; those apply only to account
/// scores. Clamped to `0..=100` and rounded half-to-even.
pub fn score_rings(rings: &mut [Ring], config: &EngineConfig) {
    for ring in rings.iter_mut() {
        ring.risk_score = clamp_round(structural_base(ring, config));
    }
}

/// Derive every account's suspicion score.
///
/// An account's score is its behavioral score (transaction velocity,
/// round-amount ratio, balanced in/out flow, nighttime activity) plus,
/// if it belongs to at least one ring, the highest `risk_score` among
/// those rings. False-positive dampening then applies: ×0.5 for an
/// account with more than `MERCHANT_COUNTERPARTY_THRESHOLD` distinct
/// counterparties, ×0.8 if its in/out volumes differ by more than 10×.
/// Only accounts clearing `SUSPICIOUS_THRESHOLD` are returned, sorted
/// by descending score then ascending account id.
pub fn score_accounts(
    rings: &[Ring],
    graph: &DirectedGraph,
    config: &EngineConfig,
) -> Vec<SuspiciousAccount> {
    let mut memberships: HashMap<&AccountId, Vec<&Ring>> = HashMap::new();
    for ring in rings {
        for member in &ring.member_accounts {
            memberships.entry(member).or_default().push(ring);
        }
    }

    let mut accounts = Vec::new();
    for account_id in graph.account_ids() {
        let Some(acc) = graph.account(account_id) else {
            continue;
        };

        let behavioral = behavioral_score(acc);
        let member_rings = memberships.get(account_id);

        let mut total = behavioral;
        let mut detected_patterns = Vec::new();
        let mut ring_id = None;
        if let Some(member_rings) = member_rings {
            let best = member_rings
                .iter()
                .max_by_key(|r| r.risk_score)
                .expect("non-empty membership list");
            total += best.risk_score as f64;
            ring_id = Some(best.ring_id.clone());
            detected_patterns = member_rings.iter().map(|r| r.pattern_type).collect();
            detected_patterns.sort_by_key(|p| p.merge_priority());
            detected_patterns.dedup();
        }
        total = total.min(100.0);

        if acc.distinct_counterparties() > config.merchant_counterparty_threshold {
            total *= 0.5;
        }
        if volume_ratio_exceeds_ten(acc.in_volume(), acc.out_volume()) {
            total *= 0.8;
        }

        let score = clamp_round(total);
        if score >= config.suspicious_threshold {
            accounts.push(SuspiciousAccount {
                account_id: account_id.clone(),
                score,
                detected_patterns,
                ring_id,
            });
        }
    }

    accounts.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.account_id.cmp(&b.account_id)));
    accounts
}

fn volume_ratio_exceeds_ten(in_volume: Decimal, out_volume: Decimal) -> bool {
    let lo = in_volume.min(out_volume);
    let hi = in_volume.max(out_volume);
    if hi <= Decimal::ZERO {
        return false;
    }
    lo == Decimal::ZERO || hi / lo > Decimal::from(10)
}

/// Structural component of a ring's score: §4.6's base value for the
/// ring's pattern type plus a per-unit-of-size bonus, capped. Delegates
/// to [`crate::detection::finding::base_score`], the same computation
/// the ring assembler uses to pick a merge's winning pattern type.
fn structural_base(ring: &Ring, config: &EngineConfig) -> f64 {
    crate::detection::finding::base_score(ring.pattern_type, &ring.findings, config)
}

/// Per-account behavioral score: velocity + round-amount ratio +
/// balanced in/out flow + nighttime ratio.
fn behavioral_score(acc: &crate::core::account::Account) -> f64 {
    let mut score = 0.0;

    let rate = acc.tx_count() as f64 / acc.hours_active().max(1.0);
    score += (rate * 3.0).round().min(15.0);

    if acc.tx_count() > 0 {
        let round_ratio = acc.round_amount_ratio();
        if round_ratio > 0.5 {
            score += 10.0;
        } else {
            score += (round_ratio * 10.0).round().min(5.0);
        }
    }

    let r = acc.balance_ratio().to_f64().unwrap_or(0.0);
    if r >= 0.8 {
        score += 8.0;
    } else if r >= 0.6 {
        score += 4.0;
    }

    if acc.tx_count() > 0 && acc.night_ratio() > 0.3 {
        score += 7.0;
    }

    score
}

fn clamp_round(value: f64) -> u8 {
    let clamped = value.clamp(0.0, 100.0);
    let decimal = Decimal::try_from(clamped).unwrap_or(Decimal::ZERO);
    decimal
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
        .to_u8()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::ring_assembler::assemble_rings;
    use crate::core::transaction::Transaction;
    use crate::graph::directed_graph::build;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn ts(h: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 18, h, 0, 0).unwrap()
    }

    #[test]
    fn test_three_cycle_ring_score_at_least_30() {
        let txns = vec![
            Transaction::new("T1", AccountId::new("A"), AccountId::new("B"), dec!(5000), ts(10)),
            Transaction::new("T2", AccountId::new("B"), AccountId::new("C"), dec!(4800), ts(11)),
            Transaction::new("T3", AccountId::new("C"), AccountId::new("A"), dec!(4700), ts(12)),
        ];
        let g = build(txns).unwrap();
        let config = EngineConfig::default();
        let mut rings = assemble_rings(
            vec![Finding::Cycle {
                members: vec![AccountId::new("A"), AccountId::new("B"), AccountId::new("C")],
            }],
            &config,
        );
        score_rings(&mut rings, &config);
        assert_eq!(rings[0].risk_score, 30);
        let _ = g;
    }

    #[test]
    fn test_fan_in_twelve_spokes_score_at_least_35() {
        let config = EngineConfig::default();
        let mut rings = assemble_rings(
            vec![Finding::FanIn {
                hub: AccountId::new("X"),
                spokes: (1..=12).map(|i| AccountId::new(format!("S{i}"))).collect(),
                window_start: ts(1),
                window_end: ts(2),
                total_volume: dec!(1000),
            }],
            &config,
        );
        score_rings(&mut rings, &config);
        assert!(rings[0].risk_score >= 35);
    }

    #[test]
    fn test_merchant_dampening_drops_below_threshold() {
        let mut txns = Vec::new();
        for i in 0..1500 {
            txns.push(Transaction::new(
                format!("T{i}"),
                AccountId::new(format!("C{i}")),
                AccountId::new("MERCHANT"),
                dec!(200),
                ts((i % 20) as u32),
            ));
        }
        let g = build(txns).unwrap();
        let config = EngineConfig::default();
        let accounts = score_accounts(&[], &g, &config);
        assert!(!accounts.iter().any(|a| a.account_id == AccountId::new("MERCHANT")));
    }

    #[test]
    fn test_empty_graph_yields_no_accounts() {
        let g = build(vec![]).unwrap();
        let config = EngineConfig::default();
        assert!(score_accounts(&[], &g, &config).is_empty());
    }

    #[test]
    fn test_purely_one_directional_volume_still_dampened() {
        // out_volume is exactly zero, not just small: still "differs by > 10x".
        assert!(volume_ratio_exceeds_ten(dec!(1000), Decimal::ZERO));
        assert!(!volume_ratio_exceeds_ten(Decimal::ZERO, Decimal::ZERO));
        assert!(!volume_ratio_exceeds_ten(dec!(100), dec!(50)));
    }
}
