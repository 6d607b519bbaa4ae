//! Configuration structures for the partitioner.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Full configuration of one partitioning run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionConfig {
    /// Root of the generated output tree
    pub output_dir: PathBuf,
    /// Source extra gallery images from the same person on other cameras
    pub cross_camera_gallery: bool,
    /// Shuffle person ids before balancing
    pub relabel_persons: bool,
    /// Apply temporal skew to each bucket's person order
    pub temporal_resampling: bool,
    /// Random seed for reproducibility
    pub seed: u64,
    /// Train/query/gallery fractions
    pub split_ratios: SplitRatios,
    /// Edge node and per-node task counts
    pub task_indices: TaskIndices,
    /// Temporal skew parameters, used when `temporal_resampling` is set
    pub temporal: TemporalIndices,
    /// Datasets to index, processed in order
    pub datasets: Vec<DatasetSource>,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            cross_camera_gallery: true,
            relabel_persons: true,
            temporal_resampling: true,
            seed: 0,
            split_ratios: SplitRatios::default(),
            task_indices: TaskIndices::default(),
            temporal: TemporalIndices::default(),
            datasets: Vec::new(),
        }
    }
}

impl PartitionConfig {
    /// Validates every section of the configuration
    pub fn validate(&self) -> Result<()> {
        if self.datasets.is_empty() {
            return Err(Error::Config("at least one dataset is required".to_string()));
        }
        for source in &self.datasets {
            if source.name.trim().is_empty() {
                return Err(Error::Config("dataset name must not be empty".to_string()));
            }
        }
        self.split_ratios.validate()?;
        self.task_indices.validate()?;
        if let Some(temporal) = self.temporal_indices() {
            temporal.validate()?;
        }
        Ok(())
    }

    /// Temporal parameters if resampling is enabled
    pub fn temporal_indices(&self) -> Option<TemporalIndices> {
        self.temporal_resampling.then_some(self.temporal)
    }
}

/// A dataset name paired with its root directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatasetSource {
    /// Indexer name, e.g. "market1501"
    pub name: String,
    /// Dataset root directory
    pub root: PathBuf,
}

impl DatasetSource {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
        }
    }

    /// Pairs dataset names with roots, rejecting mismatched lengths
    pub fn zip(names: &[String], roots: &[PathBuf]) -> Result<Vec<Self>> {
        if names.len() != roots.len() {
            return Err(Error::Config(format!(
                "got {} dataset names but {} roots",
                names.len(),
                roots.len()
            )));
        }
        Ok(names
            .iter()
            .zip(roots)
            .map(|(name, root)| Self::new(name.clone(), root.clone()))
            .collect())
    }
}

/// Train/query/gallery split ratios
///
/// `train` and `query` partition a person's images; `gallery` is the fraction
/// of extra images sampled on top of the leftover slice.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SplitRatios {
    /// Training data ratio
    pub train: f64,
    /// Query data ratio
    pub query: f64,
    /// Gallery resampling ratio
    pub gallery: f64,
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            train: 0.8,
            query: 0.1,
            gallery: 0.7,
        }
    }
}

impl SplitRatios {
    pub fn new(train: f64, query: f64, gallery: f64) -> Self {
        Self {
            train,
            query,
            gallery,
        }
    }

    /// Builds ratios from a CLI triple
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        match values {
            [train, query, gallery] => Ok(Self::new(*train, *query, *gallery)),
            _ => Err(Error::Config(format!(
                "split ratios need exactly 3 values, got {}",
                values.len()
            ))),
        }
    }

    /// Validates that every ratio lies in [0, 1] and train + query fits in 1.0
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("train", self.train),
            ("query", self.query),
            ("gallery", self.gallery),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!(
                    "{name} ratio must be between 0.0 and 1.0, got {value}"
                )));
            }
        }
        if self.train + self.query > 1.0 + 1e-9 {
            return Err(Error::Config(format!(
                "train + query ratios must not exceed 1.0, got {}",
                self.train + self.query
            )));
        }
        Ok(())
    }
}

/// Edge node and task counts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskIndices {
    /// Number of simulated edge nodes (camera buckets)
    pub edge_nodes: usize,
    /// Number of sequential tasks per edge node
    pub tasks_per_node: usize,
}

impl Default for TaskIndices {
    fn default() -> Self {
        Self {
            edge_nodes: 5,
            tasks_per_node: 10,
        }
    }
}

impl TaskIndices {
    pub fn from_slice(values: &[usize]) -> Result<Self> {
        match values {
            [edge_nodes, tasks_per_node] => Ok(Self {
                edge_nodes: *edge_nodes,
                tasks_per_node: *tasks_per_node,
            }),
            _ => Err(Error::Config(format!(
                "task indices need exactly 2 values, got {}",
                values.len()
            ))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.edge_nodes == 0 {
            return Err(Error::Config("edge node count must be positive".to_string()));
        }
        if self.tasks_per_node == 0 {
            return Err(Error::Config("task count must be positive".to_string()));
        }
        Ok(())
    }
}

/// Temporal skew parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TemporalIndices {
    /// Fraction of positions (and task slots) that get swapped
    pub ratio: f64,
    /// Maximum swap distance, in task widths
    pub distance: f64,
}

impl Default for TemporalIndices {
    fn default() -> Self {
        Self {
            ratio: 0.5,
            distance: 3.0,
        }
    }
}

impl TemporalIndices {
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        match values {
            [ratio, distance] => Ok(Self {
                ratio: *ratio,
                distance: *distance,
            }),
            _ => Err(Error::Config(format!(
                "temporal indices need exactly 2 values, got {}",
                values.len()
            ))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.ratio >= 0.0) {
            return Err(Error::Config(format!(
                "temporal ratio must be non-negative, got {}",
                self.ratio
            )));
        }
        if !(self.distance >= 1.0) {
            return Err(Error::Config(format!(
                "temporal distance must be at least 1.0, got {}",
                self.distance
            )));
        }
        Ok(())
    }
}
