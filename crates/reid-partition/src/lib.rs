//! Partitioning of a [`reid_dataset::DataPack`] into edge nodes, tasks and splits.
//!
//! Stages run in a fixed order: person relabeling, camera balancing, temporal
//! resampling and train/query/gallery assignment. [`Pipeline`] wires them
//! together and [`save`] turns the resulting records into a directory tree.

pub mod balance;
pub mod manifest;
pub mod pipeline;
pub mod relabel;
pub mod sampling;
pub mod save;
pub mod split;
pub mod temporal;

pub use balance::{BalanceReport, CameraBalancer};
pub use manifest::{PartitionManifest, MANIFEST_FILE};
pub use pipeline::{PartitionPlan, Pipeline};
pub use relabel::PersonRelabeler;
pub use sampling::{constrained_pair, MAX_PAIR_ATTEMPTS};
pub use save::{copy_images, destination_dir, materialize, plan_copies, CopyJob};
pub use split::{EmptySplit, PersonSplit, SplitOutput, SplitWriter, TaskSummary};
pub use temporal::{TemporalReport, TemporalSampler};
