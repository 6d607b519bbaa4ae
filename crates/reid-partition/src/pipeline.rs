//! End-to-end partitioning run.
//!
//! index → relabel → balance → temporal resample → split, driven by one
//! generator seeded from the configuration.

use std::path::Path;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use reid_core::{Error, PartitionConfig, Result, SplitRecord};
use reid_dataset::{by_name, DataPack, ImageIndex, IndexSummary, PackStatistics};
use tracing::{debug, info};

use crate::balance::CameraBalancer;
use crate::manifest::PartitionManifest;
use crate::relabel::PersonRelabeler;
use crate::save::{materialize, plan_copies, CopyJob};
use crate::split::SplitWriter;
use crate::temporal::TemporalSampler;

/// In-memory result of a run, before anything is written
#[derive(Debug, Clone)]
pub struct PartitionPlan {
    pub records: Vec<SplitRecord>,
    pub manifest: PartitionManifest,
}

impl PartitionPlan {
    pub fn copy_jobs(&self, output: &Path) -> Vec<CopyJob> {
        plan_copies(&self.records, output)
    }
}

pub struct Pipeline {
    config: PartitionConfig,
}

impl Pipeline {
    pub fn new(config: PartitionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PartitionConfig {
        &self.config
    }

    /// Indexes every configured dataset into a fresh pack.
    ///
    /// All names and roots are checked before the first scan, so a bad entry
    /// anywhere aborts the run without partial indexing.
    pub fn build_pack(&self) -> Result<(DataPack, Vec<IndexSummary>)> {
        let mut indexes: Vec<(Box<dyn ImageIndex>, &Path)> = Vec::new();
        for source in &self.config.datasets {
            let index = by_name(&source.name)?;
            if !source.root.exists() {
                return Err(Error::DatasetNotFound {
                    dataset: index.name().to_string(),
                    root: source.root.clone(),
                });
            }
            indexes.push((index, source.root.as_path()));
        }

        let mut datapack = DataPack::new();
        let mut summaries = Vec::with_capacity(indexes.len());
        for (index, root) in indexes {
            summaries.push(index.process(root, &mut datapack)?);
        }
        info!(
            "Indexed {} datasets: {} cameras, {} persons, {} images",
            summaries.len(),
            datapack.camera_count(),
            datapack.person_count(),
            datapack.image_count()
        );
        Ok((datapack, summaries))
    }

    /// Runs every in-memory stage over `datapack`
    pub fn partition(
        &self,
        mut datapack: DataPack,
        datasets: Vec<IndexSummary>,
    ) -> Result<PartitionPlan> {
        let config = &self.config;
        let tasks = config.task_indices;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

        if config.relabel_persons {
            let mapping = PersonRelabeler::new().relabel(&mut datapack, &mut rng);
            info!("Relabeled {} person ids", mapping.len());
        }

        let balance = CameraBalancer::new(tasks.edge_nodes).adjust(&mut datapack)?;
        let balanced = PackStatistics::from_pack(&datapack);
        let (fewest, most) = balanced.person_range();
        info!("  {} to {} persons per edge node", fewest, most);
        debug!("{}", balanced);

        let temporal_report = match config.temporal_indices() {
            Some(indices) => Some(
                TemporalSampler::new(tasks.tasks_per_node, indices)
                    .resample(&mut datapack, &mut rng)?,
            ),
            None => None,
        };

        let output = SplitWriter::new(config.split_ratios, tasks.tasks_per_node, config.seed)
            .with_cross_camera_gallery(config.cross_camera_gallery)
            .emit(&datapack)?;

        let mut manifest = PartitionManifest {
            seed: config.seed,
            split_ratios: config.split_ratios,
            task_indices: tasks,
            temporal: config.temporal_indices(),
            cross_camera_gallery: config.cross_camera_gallery,
            relabel_persons: config.relabel_persons,
            datasets,
            balance,
            temporal_report,
            statistics: PackStatistics::from_pack(&datapack),
            train_count: 0,
            query_count: 0,
            gallery_count: 0,
            tasks: Vec::new(),
            empty_splits: Vec::new(),
        };
        manifest.record_splits(&output);

        Ok(PartitionPlan {
            records: output.records,
            manifest,
        })
    }

    /// Indexes and partitions without touching the output directory
    pub fn plan(&self) -> Result<PartitionPlan> {
        let (datapack, summaries) = self.build_pack()?;
        self.partition(datapack, summaries)
    }

    /// Plans, copies every image sequentially and writes the manifest
    pub fn run(&self) -> Result<PartitionPlan> {
        let plan = self.plan()?;
        let output = &self.config.output_dir;
        let jobs = plan.copy_jobs(output);
        let copied = materialize(&jobs)?;
        info!(
            "Copied {} images into {} directories under {}",
            copied,
            jobs.len(),
            output.display()
        );
        plan.manifest.save(output)?;
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reid_core::{DatasetSource, TaskIndices};

    fn pack(cameras: usize, persons: usize, images: usize) -> DataPack {
        let mut pack = DataPack::new();
        let ids: Vec<_> = (0..persons).map(|_| pack.register_person()).collect();
        for _ in 0..cameras {
            let camera = pack.register_camera();
            for &person in &ids {
                let paths = (0..images).map(|i| format!("c{camera}/p{person}_{i}.jpg"));
                pack.add_image_paths(person, camera, paths).unwrap();
            }
        }
        pack
    }

    fn config() -> PartitionConfig {
        PartitionConfig {
            datasets: vec![DatasetSource::new("market1501", "/data/market")],
            task_indices: TaskIndices {
                edge_nodes: 2,
                tasks_per_node: 3,
            },
            seed: 5,
            ..PartitionConfig::default()
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = config();
        config.task_indices.tasks_per_node = 0;
        assert!(matches!(Pipeline::new(config), Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_root_aborts_before_indexing() {
        let pipeline = Pipeline::new(config()).unwrap();
        assert!(matches!(
            pipeline.build_pack(),
            Err(Error::DatasetNotFound { .. })
        ));
    }

    #[test]
    fn test_partition_is_reproducible() {
        let pipeline = Pipeline::new(config()).unwrap();
        let first = pipeline.partition(pack(3, 12, 6), Vec::new()).unwrap();
        let second = pipeline.partition(pack(3, 12, 6), Vec::new()).unwrap();

        assert_eq!(first.records, second.records);
        assert_eq!(first.manifest, second.manifest);
        assert_eq!(first.manifest.statistics.cameras.len(), 2);
        assert_eq!(first.manifest.statistics.total_images, 3 * 12 * 6);
        assert_eq!(first.manifest.total_records(), first.records.len());
    }

    #[test]
    fn test_partition_without_temporal_or_relabel() {
        let mut config = config();
        config.temporal_resampling = false;
        config.relabel_persons = false;
        let pipeline = Pipeline::new(config).unwrap();
        let plan = pipeline.partition(pack(2, 9, 10), Vec::new()).unwrap();

        assert!(plan.manifest.temporal_report.is_none());
        assert_eq!(plan.manifest.balance.merges, 0);
        // 9 persons over 3 tasks, in id order
        let task_of_person_4 = plan
            .records
            .iter()
            .find(|r| r.person_id == 4 && r.camera_id == 0)
            .map(|r| r.task_id);
        assert_eq!(task_of_person_4, Some(1));
    }
}
