use crate::assembly::ring_assembler::Ring;
use crate::graph::directed_graph::DirectedGraph;
use crate::scoring::suspicion_scorer::SuspiciousAccount;
use serde::Serialize;
use std::time::Duration;

/// The stable JSON report emitted by one `analyze` call.
#[derive(Debug, Serialize)]
pub struct Report {
    pub summary: Summary,
    pub suspicious_accounts: Vec<SuspiciousAccountOutput>,
    pub fraud_rings: Vec<FraudRing>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total_transactions: usize,
    pub total_accounts_analyzed: usize,
    pub suspicious_accounts_flagged: usize,
    pub fraud_rings_detected: usize,
    pub processing_time_seconds: f64,
}

#[derive(Debug, Serialize)]
pub struct SuspiciousAccountOutput {
    pub account_id: String,
    pub suspicion_score: u8,
    pub detected_patterns: Vec<String>,
    pub ring_id: String,
}

#[derive(Debug, Serialize)]
pub struct FraudRing {
    pub ring_id: String,
    pub pattern_type: String,
    pub member_accounts: Vec<String>,
    pub risk_score: u8,
    pub evidence: String,
}

/// Build the final report (C7): sort, stringify identifiers, and
/// stamp summary statistics.
///
/// `suspicious_accounts` is sorted by `suspicion_score` descending then
/// `account_id` ascending; `fraud_rings` by `risk_score` descending then
/// `ring_id` ascending. `member_accounts` arrives already sorted
/// lexicographically from the ring assembler.
pub fn build_report(
    graph: &DirectedGraph,
    rings: Vec<Ring>,
    mut accounts: Vec<SuspiciousAccount>,
    elapsed: Duration,
) -> Report {
    accounts.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.account_id.cmp(&b.account_id)));

    let suspicious_accounts: Vec<SuspiciousAccountOutput> = accounts
        .iter()
        .map(|a| SuspiciousAccountOutput {
            account_id: a.account_id.to_string(),
            suspicion_score: a.score,
            detected_patterns: a.detected_patterns.iter().map(|p| p.to_string()).collect(),
            ring_id: a.ring_id.clone().unwrap_or_default(),
        })
        .collect();

    let mut fraud_rings: Vec<FraudRing> = rings
        .iter()
        .map(|r| FraudRing {
            ring_id: r.ring_id.clone(),
            pattern_type: r.pattern_type.to_string(),
            member_accounts: r.member_accounts.iter().map(|a| a.to_string()).collect(),
            risk_score: r.risk_score,
            evidence: r.evidence.clone(),
        })
        .collect();
    fraud_rings.sort_by(|a, b| b.risk_score.cmp(&a.risk_score).then_with(|| a.ring_id.cmp(&b.ring_id)));

    let summary = Summary {
        total_transactions: graph.transaction_count(),
        total_accounts_analyzed: graph.account_count(),
        suspicious_accounts_flagged: suspicious_accounts.len(),
        fraud_rings_detected: fraud_rings.len(),
        processing_time_seconds: round_millis(elapsed.as_secs_f64()),
    };

    Report {
        summary,
        suspicious_accounts,
        fraud_rings,
    }
}

fn round_millis(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::directed_graph::build;

    #[test]
    fn test_empty_batch_yields_empty_report() {
        let g = build(vec![]).unwrap();
        let report = build_report(&g, Vec::new(), Vec::new(), Duration::from_secs(0));
        assert_eq!(report.summary.total_accounts_analyzed, 0);
        assert!(report.suspicious_accounts.is_empty());
        assert!(report.fraud_rings.is_empty());
    }

    #[test]
    fn test_round_millis() {
        assert_eq!(round_millis(0.123456), 0.123);
        assert_eq!(round_millis(1.0), 1.0);
    }
}
