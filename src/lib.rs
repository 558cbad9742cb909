//! # muling-graph-engine
//!
//! Graph analytics engine for detecting candidate money-muling networks
//! in a batch of financial transactions.
//!
//! Given a transaction stream (sender, receiver, amount, timestamp),
//! this engine builds a directed, time-stamped, weighted multigraph and
//! runs three structural detectors — cycle detection, fan-in/fan-out
//! aggregation, and shell-chain identification — over it, then
//! assembles overlapping findings into candidate fraud rings and scores
//! every implicated account. The result is advisory: a heuristic,
//! fully deterministic report, not a legal determination.
//!
//! ## Architecture
//!
//! - **core** — transaction and account identifiers, the raw
//!   transaction record, and per-account behavioral aggregates (C1's
//!   output shape).
//! - **graph** — the directed multigraph and the three structural
//!   detectors: cycles, fans, shell chains (C1–C4).
//! - **detection** — the shared `Finding` vocabulary every detector
//!   emits.
//! - **assembly** — merges overlapping findings into fraud rings (C5).
//! - **scoring** — heuristic per-ring and per-account suspicion scores (C6).
//! - **report** — the stable JSON report schema (C7).
//! - **engine** — wires C1–C7 into the single `analyze` entry point.
//!
//! ## Example
//!
//! ```
//! use muling_graph_engine::prelude::*;
//! use muling_graph_engine::core::ids::AccountId;
//! use chrono::{TimeZone, Utc};
//! use rust_decimal_macros::dec;
//!
//! let ts = |h: u32| Utc.with_ymd_and_hms(2026, 2, 18, h, 0, 0).unwrap();
//! let transactions = vec![
//!     Transaction::new("T1", AccountId::new("A"), AccountId::new("B"), dec!(5000), ts(10)),
//!     Transaction::new("T2", AccountId::new("B"), AccountId::new("C"), dec!(4800), ts(11)),
//!     Transaction::new("T3", AccountId::new("C"), AccountId::new("A"), dec!(4700), ts(12)),
//! ];
//!
//! let report = analyze(transactions, &EngineConfig::default(), None).unwrap();
//! assert_eq!(report.fraud_rings.len(), 1);
//! ```

pub mod assembly;
pub mod cancellation;
pub mod config;
pub mod core;
pub mod detection;
pub mod engine;
pub mod error;
pub mod graph;
pub mod report;
pub mod scoring;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::cancellation::CancellationToken;
    pub use crate::config::EngineConfig;
    pub use crate::core::ids::{AccountId, TxnId};
    pub use crate::core::transaction::Transaction;
    pub use crate::engine::analyze;
    pub use crate::error::{EngineError, Result};
    pub use crate::report::report_builder::Report;
}
