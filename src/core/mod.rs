//! Foundational data types: account/transaction identifiers, the raw
//! transaction record, and per-account behavioral aggregates.

pub mod account;
pub mod ids;
pub mod transaction;
