//! Shared detection vocabulary: the tagged [`finding::Finding`] type
//! every structural detector emits and ring assembly consumes.

pub mod finding;

pub use finding::{Finding, PatternType};
