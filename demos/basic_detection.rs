//! Basic end-to-end detection example.
//!
//! Runs the full pipeline over a small synthetic batch containing a
//! 3-cycle and a fan-in hub, and prints the resulting report.

use chrono::{TimeZone, Utc};
use muling_graph_engine::core::ids::AccountId;
use muling_graph_engine::core::transaction::Transaction;
use muling_graph_engine::engine::analyze;
use muling_graph_engine::config::EngineConfig;
use rust_decimal_macros::dec;

fn ts(hour: u32, minute: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 18, hour, minute, 0).unwrap()
}

fn main() {
    println!("╔════════════════════════════════════════════╗");
    println!("║  muling-graph-engine: Basic Detection Demo  ║");
    println!("╚════════════════════════════════════════════╝\n");

    let mut transactions = vec![
        Transaction::new(
            "T1",
            AccountId::new("A"),
            AccountId::new("B"),
            dec!(5000),
            ts(10, 0),
        ),
        Transaction::new(
            "T2",
            AccountId::new("B"),
            AccountId::new("C"),
            dec!(4800),
            ts(11, 0),
        ),
        Transaction::new(
            "T3",
            AccountId::new("C"),
            AccountId::new("A"),
            dec!(4700),
            ts(12, 0),
        ),
    ];

    for i in 1..=12 {
        transactions.push(Transaction::new(
            format!("F{i}"),
            AccountId::new(format!("S{i}")),
            AccountId::new("HUB"),
            dec!(900),
            ts(i % 20, 0),
        ));
    }

    let report = analyze(transactions, &EngineConfig::default(), None)
        .expect("analysis over well-formed input cannot fail");

    println!("Accounts analyzed:    {}", report.summary.total_accounts_analyzed);
    println!("Fraud rings detected: {}", report.summary.fraud_rings_detected);
    println!("Suspicious accounts:  {}\n", report.summary.suspicious_accounts_flagged);

    for ring in &report.fraud_rings {
        println!(
            "{} [{}] risk={} members=[{}]",
            ring.ring_id,
            ring.pattern_type,
            ring.risk_score,
            ring.member_accounts.join(", ")
        );
        println!("  {}", ring.evidence);
    }

    println!();
    for acc in &report.suspicious_accounts {
        println!(
            "{:<6} score={:<4} patterns=[{}] ring={}",
            acc.account_id,
            acc.suspicion_score,
            acc.detected_patterns.join(","),
            acc.ring_id
        );
    }
}
