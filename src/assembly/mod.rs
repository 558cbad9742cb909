//! Merges overlapping findings into the candidate fraud rings the
//! suspicion scorer and report builder operate on.

pub mod ring_assembler;

pub use ring_assembler::{assemble_rings, Ring};
