//! Camera bucket rebalancing.
//!
//! Each edge node owns exactly one camera bucket, so the number of buckets has
//! to match the edge node count. Surplus buckets are merged away, missing ones
//! are carved out of the most populated bucket.

use std::collections::HashSet;

use reid_core::{CameraId, Error, PersonId, Result};
use reid_dataset::DataPack;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// What the balancer did to reach its target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceReport {
    pub initial_buckets: usize,
    pub final_buckets: usize,
    pub merges: usize,
    pub splits: usize,
}

/// Merges or splits camera buckets until their count equals the target
#[derive(Debug, Clone, Copy)]
pub struct CameraBalancer {
    target_count: usize,
}

impl CameraBalancer {
    pub fn new(target_count: usize) -> Self {
        Self { target_count }
    }

    pub fn target_count(&self) -> usize {
        self.target_count
    }

    /// Rebalances `datapack` in place, then renumbers its cameras `0..target`.
    ///
    /// Images are only moved between buckets; the image count is unchanged.
    pub fn adjust(&self, datapack: &mut DataPack) -> Result<BalanceReport> {
        let target = self.target_count;
        if target == 0 {
            return Err(Error::Config(
                "edge node count must be positive".to_string(),
            ));
        }
        if target > datapack.camera_count() && target > datapack.assignment_count() {
            return Err(Error::Config(format!(
                "cannot spread {} camera/person assignments over {} edge nodes",
                datapack.assignment_count(),
                target
            )));
        }

        let mut report = BalanceReport {
            initial_buckets: datapack.camera_count(),
            ..BalanceReport::default()
        };
        info!(
            "Balancing {} camera buckets into {} edge nodes",
            report.initial_buckets, target
        );

        while datapack.camera_count() > target {
            merge_smallest(datapack)?;
            report.merges += 1;
        }
        while datapack.camera_count() < target {
            split_largest(datapack)?;
            report.splits += 1;
        }

        datapack.renumber_cameras();
        report.final_buckets = datapack.camera_count();
        info!(
            "  {} merges, {} splits, {} images kept",
            report.merges,
            report.splits,
            datapack.image_count()
        );
        Ok(report)
    }
}

fn person_set(datapack: &DataPack, camera_id: CameraId) -> HashSet<PersonId> {
    datapack
        .bucket(camera_id)
        .map(|bucket| bucket.keys().copied().collect())
        .unwrap_or_default()
}

/// Merges the smallest bucket into the bucket whose person set differs from it the most
fn merge_smallest(datapack: &mut DataPack) -> Result<()> {
    let mut by_size: Vec<(CameraId, usize)> = datapack
        .buckets()
        .map(|(camera_id, bucket)| (camera_id, bucket.len()))
        .collect();
    by_size.sort_by_key(|(_, persons)| *persons);

    let Some(&(source, _)) = by_size.first() else {
        return Err(Error::Config("no camera bucket to merge".to_string()));
    };
    let source_persons = person_set(datapack, source);

    let mut best: Option<(CameraId, usize)> = None;
    for &(candidate, _) in &by_size[1..] {
        let gap = person_set(datapack, candidate)
            .symmetric_difference(&source_persons)
            .count();
        if best.map_or(true, |(_, best_gap)| gap > best_gap) {
            best = Some((candidate, gap));
        }
    }
    let (target, gap) =
        best.ok_or_else(|| Error::Config("cannot merge the only camera bucket".to_string()))?;

    debug!(
        "Merging camera {} ({} persons) into camera {} (difference {})",
        source,
        source_persons.len(),
        target,
        gap
    );
    let bucket = datapack
        .remove_bucket(source)
        .ok_or(Error::UnknownCamera(source))?;
    for (person_id, images) in bucket {
        datapack.add_image_paths(person_id, target, images)?;
    }
    Ok(())
}

/// Moves the first half of the largest bucket's persons into a new bucket
fn split_largest(datapack: &mut DataPack) -> Result<()> {
    let mut largest: Option<(CameraId, usize)> = None;
    for (camera_id, bucket) in datapack.buckets() {
        if largest.map_or(true, |(_, persons)| bucket.len() > persons) {
            largest = Some((camera_id, bucket.len()));
        }
    }
    let (source, max_len) =
        largest.ok_or_else(|| Error::Config("no camera bucket to split".to_string()))?;
    if max_len < 2 {
        return Err(Error::Config(format!(
            "largest camera bucket {source} has {max_len} persons and cannot be split"
        )));
    }

    let movers: Vec<PersonId> = datapack
        .bucket(source)
        .map(|bucket| bucket.keys().take(max_len.div_ceil(2)).copied().collect())
        .unwrap_or_default();

    let new_camera = datapack.register_camera();
    debug!(
        "Splitting camera {} ({} persons): {} persons move to camera {}",
        source,
        max_len,
        movers.len(),
        new_camera
    );
    for person_id in movers {
        let images = datapack
            .take_person_images(source, person_id)
            .ok_or(Error::UnknownPerson(person_id))?;
        datapack.add_image_paths(person_id, new_camera, images)?;
    }
    Ok(())
}
