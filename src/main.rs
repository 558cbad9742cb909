//! muling-graph-engine CLI
//!
//! Run the graph analytics engine against a batch of transactions from
//! the command line.
//!
//! # Usage
//!
//! ```bash
//! # Analyze a transaction batch, print a human summary
//! muling-graph-engine analyze --input transactions.json
//!
//! # Print the full report as JSON
//! muling-graph-engine analyze --input transactions.json --format json
//! ```
//!
//! CSV parsing, HTTP surfaces, and synthetic sample generation are
//! treated as external collaborators — this binary only consumes an
//! already-validated JSON transaction batch and prints the report this
//! crate computes from it.

use muling_graph_engine::config::EngineConfig;
use muling_graph_engine::core::ids::AccountId;
use muling_graph_engine::core::transaction::Transaction;
use muling_graph_engine::engine::analyze;
use muling_graph_engine::error::EngineError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"muling-graph-engine — money-muling network detection engine

USAGE:
    muling-graph-engine <COMMAND> [OPTIONS]

COMMANDS:
    analyze     Run the detection pipeline over a transaction batch
    help        Show this message

OPTIONS (analyze):
    --input <FILE>      Path to a JSON transaction batch (required)
    --config <FILE>     Path to a JSON engine configuration (optional; defaults apply)
    --format <FORMAT>   Output format: text (default) or json

EXAMPLES:
    muling-graph-engine analyze --input transactions.json
    muling-graph-engine analyze --input transactions.json --format json
    muling-graph-engine analyze --input transactions.json --config engine.json"#
    );
}

/// JSON schema for one input transaction. Amount is carried as a
/// string to avoid float precision loss, the same convention the
/// underlying `Transaction::amount` (a `rust_decimal::Decimal`) is built
/// for.
#[derive(serde::Deserialize)]
struct TransactionInput {
    txn_id: String,
    sender: String,
    receiver: String,
    amount: String,
    timestamp: DateTime<Utc>,
}

#[derive(serde::Deserialize)]
struct TransactionsFile {
    transactions: Vec<TransactionInput>,
}

fn load_transactions(path: &str) -> Vec<Transaction> {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    let file: TransactionsFile = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "transactions": [
    {{ "txn_id": "TXN001", "sender": "A", "receiver": "B", "amount": "5000", "timestamp": "2026-02-18T10:00:00Z" }}
  ]
}}"#
        );
        process::exit(1);
    });

    file.transactions
        .into_iter()
        .map(|t| {
            let amount: Decimal = t.amount.parse().unwrap_or_else(|e| {
                eprintln!("Invalid amount '{}': {}", t.amount, e);
                process::exit(1);
            });
            Transaction::new(
                t.txn_id,
                AccountId::new(t.sender),
                AccountId::new(t.receiver),
                amount,
                t.timestamp,
            )
        })
        .collect()
}

fn load_config(path: Option<&str>) -> EngineConfig {
    match path {
        None => EngineConfig::default(),
        Some(path) => {
            let content = fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Error reading config file '{}': {}", path, e);
                process::exit(1);
            });
            serde_json::from_str(&content).unwrap_or_else(|e| {
                eprintln!("Error parsing engine config: {}", e);
                process::exit(1);
            })
        }
    }
}

fn cmd_analyze(args: &[String]) {
    let mut input_path = None;
    let mut config_path = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--input requires a file path");
                    process::exit(1);
                }));
            }
            "--config" => {
                i += 1;
                config_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--config requires a file path");
                    process::exit(1);
                }));
            }
            "--format" => {
                i += 1;
                format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    let transactions = load_transactions(&path);
    let config = load_config(config_path.as_deref());

    let report = analyze(transactions, &config, None).unwrap_or_else(|e| {
        match e {
            EngineError::MalformedBatch(msg) => eprintln!("Malformed transaction batch: {}", msg),
            EngineError::ConfigurationError(msg) => eprintln!("Invalid configuration: {}", msg),
            EngineError::Cancelled => eprintln!("Analysis cancelled"),
        }
        process::exit(1);
    });

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&report).unwrap());
    } else {
        let s = &report.summary;
        println!("Transactions analyzed:      {}", s.total_transactions);
        println!("Accounts analyzed:          {}", s.total_accounts_analyzed);
        println!("Suspicious accounts:        {}", s.suspicious_accounts_flagged);
        println!("Fraud rings detected:       {}", s.fraud_rings_detected);
        println!("Processing time (s):        {:.3}", s.processing_time_seconds);
        println!();

        if report.fraud_rings.is_empty() {
            println!("No fraud rings detected.");
        } else {
            println!("━━━ Fraud Rings ━━━\n");
            for ring in &report.fraud_rings {
                println!(
                    "  {} [{}] risk={}  members={}",
                    ring.ring_id,
                    ring.pattern_type,
                    ring.risk_score,
                    ring.member_accounts.join(", ")
                );
                println!("    {}", ring.evidence);
            }
            println!();
        }

        if report.suspicious_accounts.is_empty() {
            println!("No suspicious accounts flagged.");
        } else {
            println!("━━━ Suspicious Accounts ━━━\n");
            for acc in &report.suspicious_accounts {
                println!(
                    "  {:<20} score={:<4} patterns=[{}] ring={}",
                    acc.account_id,
                    acc.suspicion_score,
                    acc.detected_patterns.join(","),
                    acc.ring_id,
                );
            }
        }
    }
}

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "analyze" => cmd_analyze(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
