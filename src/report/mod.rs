//! Assembles the final, schema-stable [`report_builder::Report`] from
//! scored rings and accounts (C7).

pub mod report_builder;

pub use report_builder::{build_report, FraudRing, Report, Summary};
