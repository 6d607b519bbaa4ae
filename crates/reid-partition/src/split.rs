//! Task batching and train/query/gallery assignment.
//!
//! Persons of each camera bucket are cut into `task_count` sequential batches
//! in bucket order. Each person's images are then shuffled with a generator
//! derived from `(seed, camera, person)` and sliced into splits, so the
//! outcome for one person does not depend on how many persons came before.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::PathBuf;

use rand::seq::{index, SliceRandom};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use reid_core::{
    CameraId, Error, PersonId, Result, Split, SplitRatios, SplitRecord, TaskId,
};
use reid_dataset::DataPack;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// A query or gallery list that came out empty; informational only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptySplit {
    pub camera_id: CameraId,
    pub task_id: TaskId,
    pub person_id: PersonId,
    pub split: Split,
}

/// Image counts of one task on one edge node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub camera_id: CameraId,
    pub task_id: TaskId,
    pub persons: usize,
    pub train: usize,
    pub query: usize,
    pub gallery: usize,
}

impl TaskSummary {
    fn new(camera_id: CameraId, task_id: TaskId) -> Self {
        Self {
            camera_id,
            task_id,
            ..Self::default()
        }
    }
}

/// Everything [`SplitWriter::emit`] produced
#[derive(Debug, Clone, Default)]
pub struct SplitOutput {
    pub records: Vec<SplitRecord>,
    pub empty_splits: Vec<EmptySplit>,
    pub tasks: Vec<TaskSummary>,
}

impl SplitOutput {
    pub fn count(&self, split: Split) -> usize {
        self.records.iter().filter(|r| r.split == split).count()
    }
}

/// One person's images, sliced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonSplit {
    pub train: Vec<PathBuf>,
    pub query: Vec<PathBuf>,
    pub gallery: Vec<PathBuf>,
}

impl PersonSplit {
    fn get(&self, split: Split) -> &[PathBuf] {
        match split {
            Split::Train => &self.train,
            Split::Query => &self.query,
            Split::Gallery => &self.gallery,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SplitWriter {
    ratios: SplitRatios,
    task_count: usize,
    seed: u64,
    cross_camera_gallery: bool,
}

impl SplitWriter {
    pub fn new(ratios: SplitRatios, task_count: usize, seed: u64) -> Self {
        Self {
            ratios,
            task_count,
            seed,
            cross_camera_gallery: true,
        }
    }

    /// Chooses where extra gallery images come from: the person's images on
    /// other cameras (default) or a sample of its own train images
    pub fn with_cross_camera_gallery(mut self, enabled: bool) -> Self {
        self.cross_camera_gallery = enabled;
        self
    }

    /// Task of the person at `position` in a bucket of `persons` persons
    pub fn task_of(&self, position: usize, persons: usize) -> TaskId {
        let batch_size = persons.div_ceil(self.task_count.max(1)).max(1);
        (position / batch_size).min(self.task_count.saturating_sub(1))
    }

    /// Assigns every image of `datapack` to a task and split
    pub fn emit(&self, datapack: &DataPack) -> Result<SplitOutput> {
        if self.task_count == 0 {
            return Err(Error::Config("task count must be positive".to_string()));
        }
        info!(
            "Splitting {} cameras into {} tasks (train {}, query {}, gallery {})",
            datapack.camera_count(),
            self.task_count,
            self.ratios.train,
            self.ratios.query,
            self.ratios.gallery
        );

        let mut output = SplitOutput::default();
        for (camera_id, bucket) in datapack.buckets() {
            let mut current: Option<TaskSummary> = None;

            for (position, (&person_id, images)) in bucket.iter().enumerate() {
                let task_id = self.task_of(position, bucket.len());
                if current.as_ref().map_or(true, |t| t.task_id != task_id) {
                    if let Some(done) = current.take() {
                        finish_task(done, &mut output);
                    }
                    current = Some(TaskSummary::new(camera_id, task_id));
                }
                let Some(summary) = current.as_mut() else {
                    continue;
                };

                let person = self.split_person(datapack, camera_id, person_id, images);
                summary.persons += 1;
                summary.train += person.train.len();
                summary.query += person.query.len();
                summary.gallery += person.gallery.len();

                for split in Split::ALL {
                    let paths = person.get(split);
                    if paths.is_empty() {
                        if split != Split::Train {
                            output.empty_splits.push(EmptySplit {
                                camera_id,
                                task_id,
                                person_id,
                                split,
                            });
                        }
                        continue;
                    }
                    output.records.extend(paths.iter().map(|path| SplitRecord {
                        split,
                        person_id,
                        camera_id,
                        task_id,
                        image_path: path.clone(),
                    }));
                }
            }

            if let Some(done) = current.take() {
                finish_task(done, &mut output);
            }
        }

        info!(
            "  {} train, {} query, {} gallery records; {} empty splits",
            output.count(Split::Train),
            output.count(Split::Query),
            output.count(Split::Gallery),
            output.empty_splits.len()
        );
        Ok(output)
    }

    /// Generator for one person on one camera
    fn person_rng(&self, camera_id: CameraId, person_id: PersonId) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_stream(((camera_id as u64) << 32) | person_id as u64);
        rng
    }

    /// Shuffles and slices one person's images of `camera_id`.
    ///
    /// Train is `[0, b1)` and query `[b1, b2)` with `b = ceil(ratio * n)`, so
    /// the two never share an image. The rest goes to gallery, topped up with a
    /// `gallery` fraction sampled from other cameras or from train.
    ///
    /// Each list lands in one directory, so file names inside a list are kept
    /// unique: cross-camera samples are drawn only from names not yet in the
    /// gallery, and later duplicates are dropped.
    pub fn split_person(
        &self,
        datapack: &DataPack,
        camera_id: CameraId,
        person_id: PersonId,
        images: &[PathBuf],
    ) -> PersonSplit {
        let mut rng = self.person_rng(camera_id, person_id);
        let mut shuffled = images.to_vec();
        shuffled.shuffle(&mut rng);

        let n = shuffled.len();
        let train_end = ratio_boundary(self.ratios.train, n);
        let query_end = ratio_boundary(self.ratios.train + self.ratios.query, n).max(train_end);

        let train = unique_names(shuffled[..train_end].to_vec());
        let query = unique_names(shuffled[train_end..query_end].to_vec());
        let mut gallery = shuffled[query_end..].to_vec();

        if self.cross_camera_gallery {
            let mut taken: HashSet<OsString> = file_names(&gallery).collect();
            for (other_id, bucket) in datapack.buckets() {
                if other_id == camera_id {
                    continue;
                }
                let Some(other) = bucket.get(&person_id) else {
                    continue;
                };
                let candidates: Vec<&PathBuf> = other
                    .iter()
                    .filter(|path| path.file_name().map_or(true, |name| !taken.contains(name)))
                    .collect();
                let amount = sample_size(self.ratios.gallery, other.len()).min(candidates.len());
                for i in index::sample(&mut rng, candidates.len(), amount) {
                    let path = candidates[i];
                    if let Some(name) = path.file_name() {
                        if !taken.insert(name.to_os_string()) {
                            continue;
                        }
                    }
                    gallery.push(path.clone());
                }
            }
        } else {
            let amount = sample_size(self.ratios.gallery, train.len());
            gallery.extend(
                index::sample(&mut rng, train.len(), amount)
                    .into_iter()
                    .map(|i| train[i].clone()),
            );
        }

        PersonSplit {
            train,
            query,
            gallery: unique_names(gallery),
        }
    }
}

fn file_names(paths: &[PathBuf]) -> impl Iterator<Item = OsString> + '_ {
    paths
        .iter()
        .filter_map(|path| path.file_name().map(|name| name.to_os_string()))
}

/// Drops every path whose file name already appeared earlier in the list
fn unique_names(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let before = paths.len();
    let mut seen = HashSet::new();
    let kept: Vec<PathBuf> = paths
        .into_iter()
        .filter(|path| seen.insert(path.file_name().map(|name| name.to_os_string())))
        .collect();
    if kept.len() < before {
        debug!("Dropped {} images with duplicate file names", before - kept.len());
    }
    kept
}

fn finish_task(summary: TaskSummary, output: &mut SplitOutput) {
    let missing_queries = output
        .empty_splits
        .iter()
        .filter(|e| {
            e.camera_id == summary.camera_id
                && e.task_id == summary.task_id
                && e.split == Split::Query
        })
        .count();
    if missing_queries > 0 {
        warn!(
            "Camera {} task {}: {} of {} persons have no query images",
            summary.camera_id, summary.task_id, missing_queries, summary.persons
        );
    }
    debug!(
        "Camera {} task {}: {} persons, {}/{}/{} images",
        summary.camera_id,
        summary.task_id,
        summary.persons,
        summary.train,
        summary.query,
        summary.gallery
    );
    output.tasks.push(summary);
}

/// `ceil(ratio * n)`, except that products within float noise of an integer round to it
pub fn ratio_boundary(ratio: f64, n: usize) -> usize {
    let exact = ratio * n as f64;
    let nearest = exact.round();
    let boundary = if (exact - nearest).abs() < 1e-9 {
        nearest
    } else {
        exact.ceil()
    };
    (boundary.max(0.0) as usize).min(n)
}

fn sample_size(ratio: f64, n: usize) -> usize {
    ((ratio * n as f64).round().max(0.0) as usize).min(n)
}
