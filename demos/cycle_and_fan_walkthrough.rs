//! Shell-chain (layering) detection walkthrough.
//!
//! Builds a linear chain of low-activity intermediaries passing roughly
//! the same amount along each hop, and shows how `find_shell_chains`
//! recovers it directly (bypassing the full pipeline) before running
//! the same batch through `analyze` for the final report.

use chrono::{TimeZone, Utc};
use muling_graph_engine::config::EngineConfig;
use muling_graph_engine::core::ids::AccountId;
use muling_graph_engine::core::transaction::Transaction;
use muling_graph_engine::engine::analyze;
use muling_graph_engine::graph::{directed_graph, shell_chain};
use rust_decimal_macros::dec;

fn ts(hour: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 18, hour, 0, 0).unwrap()
}

fn main() {
    println!("╔═══════════════════════════════════════════════╗");
    println!("║  muling-graph-engine: Shell-Chain Walkthrough  ║");
    println!("╚═══════════════════════════════════════════════╝\n");

    let mut transactions = vec![
        Transaction::new("T1", AccountId::new("A"), AccountId::new("B"), dec!(10000), ts(1)),
        Transaction::new("T2", AccountId::new("B"), AccountId::new("C"), dec!(9800), ts(2)),
        Transaction::new("T3", AccountId::new("C"), AccountId::new("D"), dec!(9600), ts(3)),
        Transaction::new("T4", AccountId::new("D"), AccountId::new("E"), dec!(9400), ts(4)),
    ];
    // Give the endpoints extra activity so neither looks like a shell itself.
    for (i, z) in ["Z1", "Z2", "Z3"].iter().enumerate() {
        transactions.push(Transaction::new(
            format!("A{i}"),
            AccountId::new("A"),
            AccountId::new(*z),
            dec!(1),
            ts(5 + i as u32),
        ));
    }
    for (i, z) in ["Z4", "Z5", "Z6"].iter().enumerate() {
        transactions.push(Transaction::new(
            format!("E{i}"),
            AccountId::new("E"),
            AccountId::new(*z),
            dec!(1),
            ts(8 + i as u32),
        ));
    }

    let config = EngineConfig::default();
    let graph = directed_graph::build(transactions.clone()).unwrap();
    let chains = shell_chain::find_shell_chains(&graph, &config, None).unwrap();

    println!("Raw shell-chain findings: {}", chains.len());
    for chain in &chains {
        println!("  {}", chain.evidence_text());
    }

    println!();
    let report = analyze(transactions, &config, None).unwrap();
    for ring in &report.fraud_rings {
        println!(
            "{} [{}] risk={} members=[{}]",
            ring.ring_id,
            ring.pattern_type,
            ring.risk_score,
            ring.member_accounts.join(", ")
        );
    }
}
