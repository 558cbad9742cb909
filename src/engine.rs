//! Orchestrates the full pipeline: transactions → C1
//! builds the graph, C2/C3/C4 run over the shared immutable graph (in
//! parallel when configured), C5 assembles rings from their findings,
//! C6 scores rings and accounts, and C7 builds the final report.
//!
//! This module is the only place the seven components are wired
//! together; each component otherwise knows nothing about its neighbors.

use crate::assembly::ring_assembler::{assemble_rings, Ring};
use crate::cancellation::CancellationToken;
use crate::config::EngineConfig;
use crate::core::transaction::Transaction;
use crate::detection::finding::Finding;
use crate::error::Result;
use crate::graph::directed_graph::{self, DirectedGraph};
use crate::graph::{cycle_detection, fan_detection, shell_chain};
use crate::report::report_builder::{build_report, Report};
use crate::scoring::suspicion_scorer::{score_accounts, score_rings};
use std::time::Instant;

/// Run one full analysis: `transactions → report`.
///
/// Rejects an out-of-range `config` before touching the transactions
/// (`ConfigurationError`). An empty batch is not an error — it
/// yields a well-formed report with empty collections. If `cancellation`
/// is signalled while a detector is running, the
/// call returns `Err(EngineError::Cancelled)` and no report is built.
pub fn analyze(
    transactions: Vec<Transaction>,
    config: &EngineConfig,
    cancellation: Option<&CancellationToken>,
) -> Result<Report> {
    config.validate()?;
    let started = Instant::now();

    let graph = directed_graph::build(transactions)?;
    log::info!(
        "analysis starting: {} accounts, {} transactions, {} self-loops dropped",
        graph.account_count(),
        graph.transaction_count(),
        graph.dropped_self_loops(),
    );

    let findings = if config.parallel_detectors && graph.transaction_count() > 0 {
        run_detectors_parallel(&graph, config, cancellation)?
    } else {
        run_detectors_sequential(&graph, config, cancellation)?
    };
    log::debug!("{} raw findings before ring assembly", findings.len());

    let mut rings: Vec<Ring> = assemble_rings(findings, config);
    score_rings(&mut rings, config);
    let accounts = score_accounts(&rings, &graph, config);

    let report = build_report(&graph, rings, accounts, started.elapsed());
    log::info!(
        "analysis complete in {:.3}s: {} rings, {} suspicious accounts",
        report.summary.processing_time_seconds,
        report.summary.fraud_rings_detected,
        report.summary.suspicious_accounts_flagged,
    );
    Ok(report)
}

fn run_detectors_sequential(
    graph: &DirectedGraph,
    config: &EngineConfig,
    cancellation: Option<&CancellationToken>,
) -> Result<Vec<Finding>> {
    let mut findings = cycle_detection::find_cycles(graph, cancellation)?;
    findings.extend(fan_detection::find_fans(graph, config, cancellation)?);
    findings.extend(shell_chain::find_shell_chains(graph, config, cancellation)?);
    Ok(findings)
}

/// Run C2/C3/C4 on scoped threads over the shared, read-only graph
/// Detectors are read-only over the graph and safe to run concurrently.
/// `std::thread::scope` lets the
/// borrows of `graph`/`config`/`cancellation` outlive the spawned
/// threads without any `Arc`/clone, since the scope blocks until every
/// thread finishes.
fn run_detectors_parallel(
    graph: &DirectedGraph,
    config: &EngineConfig,
    cancellation: Option<&CancellationToken>,
) -> Result<Vec<Finding>> {
    log::debug!("dispatching cycle/fan/shell-chain detectors on scoped threads");
    let (cycles, fans, chains) = std::thread::scope(|scope| {
        let cycles = scope.spawn(|| cycle_detection::find_cycles(graph, cancellation));
        let fans = scope.spawn(|| fan_detection::find_fans(graph, config, cancellation));
        let chains = scope.spawn(|| shell_chain::find_shell_chains(graph, config, cancellation));
        (
            cycles.join().expect("cycle detector thread panicked"),
            fans.join().expect("fan detector thread panicked"),
            chains.join().expect("shell-chain detector thread panicked"),
        )
    });
    log::debug!("detector threads joined");

    let mut findings = cycles?;
    findings.extend(fans?);
    findings.extend(chains?);
    Ok(findings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ids::AccountId;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn ts(h: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 18, h, 0, 0).unwrap()
    }

    fn txn(id: &str, s: &str, r: &str, amount: rust_decimal::Decimal, h: u32) -> Transaction {
        Transaction::new(id, AccountId::new(s), AccountId::new(r), amount, ts(h))
    }

    #[test]
    fn test_empty_batch_yields_empty_report() {
        let report = analyze(Vec::new(), &EngineConfig::default(), None).unwrap();
        assert_eq!(report.summary.total_accounts_analyzed, 0);
        assert!(report.suspicious_accounts.is_empty());
        assert!(report.fraud_rings.is_empty());
    }

    #[test]
    fn test_three_cycle_end_to_end() {
        let txns = vec![
            txn("T1", "A", "B", dec!(5000), 10),
            txn("T2", "B", "C", dec!(4800), 11),
            txn("T3", "C", "A", dec!(4700), 12),
        ];
        let report = analyze(txns, &EngineConfig::default(), None).unwrap();
        assert_eq!(report.fraud_rings.len(), 1);
        let ring = &report.fraud_rings[0];
        assert_eq!(ring.pattern_type, "cycle");
        assert_eq!(ring.member_accounts, vec!["A", "B", "C"]);
        assert!(ring.risk_score >= 30);
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let txns = vec![
            txn("T1", "A", "B", dec!(5000), 10),
            txn("T2", "B", "C", dec!(4800), 11),
            txn("T3", "C", "A", dec!(4700), 12),
        ];
        let mut parallel_cfg = EngineConfig::default();
        parallel_cfg.parallel_detectors = true;
        let mut sequential_cfg = EngineConfig::default();
        sequential_cfg.parallel_detectors = false;

        let r1 = analyze(txns.clone(), &parallel_cfg, None).unwrap();
        let r2 = analyze(txns, &sequential_cfg, None).unwrap();
        // processing_time_seconds is wall-clock and may legitimately differ
        // between the two runs; compare everything else byte-for-byte.
        assert_eq!(r1.summary.total_transactions, r2.summary.total_transactions);
        assert_eq!(r1.summary.total_accounts_analyzed, r2.summary.total_accounts_analyzed);
        assert_eq!(r1.summary.suspicious_accounts_flagged, r2.summary.suspicious_accounts_flagged);
        assert_eq!(r1.summary.fraud_rings_detected, r2.summary.fraud_rings_detected);
        assert_eq!(
            serde_json::to_string(&r1.suspicious_accounts).unwrap(),
            serde_json::to_string(&r2.suspicious_accounts).unwrap()
        );
        assert_eq!(
            serde_json::to_string(&r1.fraud_rings).unwrap(),
            serde_json::to_string(&r2.fraud_rings).unwrap()
        );
    }

    #[test]
    fn test_invalid_config_rejected_before_building_graph() {
        let mut cfg = EngineConfig::default();
        cfg.fan_window_secs = 0;
        let err = analyze(Vec::new(), &cfg, None).unwrap_err();
        assert!(matches!(err, crate::error::EngineError::ConfigurationError(_)));
    }

    #[test]
    fn test_cancellation_before_any_work_is_observed() {
        let token = CancellationToken::new();
        token.cancel();
        let txns = vec![
            txn("T1", "A", "B", dec!(5000), 10),
            txn("T2", "B", "C", dec!(4800), 11),
            txn("T3", "C", "A", dec!(4700), 12),
        ];
        let err = analyze(txns, &EngineConfig::default(), Some(&token)).unwrap_err();
        assert!(matches!(err, crate::error::EngineError::Cancelled));
    }
}
