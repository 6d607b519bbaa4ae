//! Re-identification dataset indexing.
//!
//! This crate provides the [`DataPack`] aggregate and the per-dataset
//! indexers that fill it from a dataset root on disk.

pub mod datapack;
pub mod index;
pub mod statistics;

pub use datapack::{CameraBucket, DataPack};
pub use index::{by_name, ImageIndex, IndexEntry, IndexSummary, DATASET_NAMES};
pub use statistics::{CameraStat, PackStatistics};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::datapack::*;
    pub use crate::index::*;
    pub use crate::statistics::*;
}
