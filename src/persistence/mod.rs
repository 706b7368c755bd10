//! Persistence layer: the on-disk index artifact.

pub mod artifact;

pub use artifact::{read_artifact, write_artifact};
