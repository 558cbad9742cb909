//! Heuristic suspicion scoring (C6): turns assembled rings and their
//! member accounts' behavioral aggregates into bounded `0..=100` scores.

pub mod suspicion_scorer;

pub use suspicion_scorer::{score_accounts, score_rings, SuspiciousAccount};
