//! Run metadata written next to the generated tree.

use std::fs;
use std::path::{Path, PathBuf};

use reid_core::{Result, Split, SplitRatios, TaskIndices, TemporalIndices};
use reid_dataset::{IndexSummary, PackStatistics};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::balance::BalanceReport;
use crate::split::{EmptySplit, SplitOutput, TaskSummary};
use crate::temporal::TemporalReport;

/// File name of the manifest inside the output directory
pub const MANIFEST_FILE: &str = "partition_info.json";

/// Everything needed to reproduce or audit one partitioning run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionManifest {
    pub seed: u64,
    pub split_ratios: SplitRatios,
    pub task_indices: TaskIndices,
    pub temporal: Option<TemporalIndices>,
    pub cross_camera_gallery: bool,
    pub relabel_persons: bool,
    pub datasets: Vec<IndexSummary>,
    pub balance: BalanceReport,
    pub temporal_report: Option<TemporalReport>,
    pub statistics: PackStatistics,
    pub train_count: usize,
    pub query_count: usize,
    pub gallery_count: usize,
    pub tasks: Vec<TaskSummary>,
    pub empty_splits: Vec<EmptySplit>,
}

impl PartitionManifest {
    /// Copies the split totals, task summaries and empty splits of `output`
    pub fn record_splits(&mut self, output: &SplitOutput) {
        self.train_count = output.count(Split::Train);
        self.query_count = output.count(Split::Query);
        self.gallery_count = output.count(Split::Gallery);
        self.tasks = output.tasks.clone();
        self.empty_splits = output.empty_splits.clone();
    }

    pub fn total_records(&self) -> usize {
        self.train_count + self.query_count + self.gallery_count
    }

    /// Writes the manifest as pretty JSON into `output_dir`
    pub fn save(&self, output_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(output_dir)?;
        let path = output_dir.join(MANIFEST_FILE);
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        info!("Manifest saved to {:?}", path);
        Ok(path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manifest() -> PartitionManifest {
        PartitionManifest {
            seed: 42,
            split_ratios: SplitRatios::default(),
            task_indices: TaskIndices::default(),
            temporal: None,
            cross_camera_gallery: true,
            relabel_persons: false,
            datasets: vec![IndexSummary {
                dataset: "Market1501".to_string(),
                cameras: 6,
                persons: 12,
                images: 120,
            }],
            balance: BalanceReport::default(),
            temporal_report: None,
            statistics: PackStatistics::default(),
            train_count: 0,
            query_count: 0,
            gallery_count: 0,
            tasks: Vec::new(),
            empty_splits: Vec::new(),
        }
    }

    #[test]
    fn test_manifest_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let mut manifest = manifest();
        manifest.empty_splits.push(EmptySplit {
            camera_id: 0,
            task_id: 2,
            person_id: 7,
            split: Split::Query,
        });

        let path = manifest.save(temp_dir.path()).unwrap();
        assert!(path.ends_with(MANIFEST_FILE));

        let loaded = PartitionManifest::load(&path).unwrap();
        assert_eq!(loaded, manifest);

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"split\": \"query\""));
    }

    #[test]
    fn test_record_splits_counts() {
        let mut output = SplitOutput::default();
        for split in [Split::Train, Split::Train, Split::Gallery] {
            output.records.push(reid_core::SplitRecord {
                split,
                person_id: 0,
                camera_id: 0,
                task_id: 0,
                image_path: PathBuf::from("a.jpg"),
            });
        }

        let mut manifest = manifest();
        manifest.record_splits(&output);
        assert_eq!(manifest.train_count, 2);
        assert_eq!(manifest.query_count, 0);
        assert_eq!(manifest.total_records(), 3);
    }
}
