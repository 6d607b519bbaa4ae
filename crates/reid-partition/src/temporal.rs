//! Temporal skew of the person sequence inside each camera bucket.
//!
//! Persons are later cut into sequential tasks in bucket order. Swapping
//! positions a few task widths apart, then shuffling whole task slots, makes
//! identities recur across tasks the way they would in a live camera feed.

use rand::Rng;
use reid_core::{Error, PersonId, Result, TemporalIndices};
use reid_dataset::{CameraBucket, DataPack};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::sampling::constrained_pair;

/// Swap totals over all buckets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalReport {
    pub buckets: usize,
    pub position_swaps: usize,
    pub slot_swaps: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct TemporalSampler {
    task_count: usize,
    ratio: f64,
    distance: f64,
}

impl TemporalSampler {
    pub fn new(task_count: usize, indices: TemporalIndices) -> Self {
        Self {
            task_count,
            ratio: indices.ratio,
            distance: indices.distance,
        }
    }

    /// Width of one task block for a bucket of `persons` persons
    pub fn task_size(&self, persons: usize) -> usize {
        persons / self.task_count.max(1)
    }

    fn position_swaps(&self, persons: usize) -> usize {
        (self.ratio * self.task_size(persons) as f64).floor() as usize
    }

    fn slot_swaps(&self) -> usize {
        (self.ratio * self.task_count as f64).floor() as usize
    }

    /// Returns the skewed order of `persons`.
    ///
    /// Positions `x > y` are swapped when `task_size <= x - y <= distance * task_size`,
    /// then task slots `x > y` with `1 <= x - y <= distance`. Each full task block is
    /// emitted sorted; the tail past `task_count` blocks keeps its order.
    pub fn reorder<R: Rng + ?Sized>(
        &self,
        persons: &[PersonId],
        rng: &mut R,
    ) -> Result<Vec<PersonId>> {
        if self.task_count == 0 {
            return Err(Error::Config("task count must be positive".to_string()));
        }
        let n = persons.len();
        let task_size = self.task_size(n);
        let mut sequence = persons.to_vec();

        for _ in 0..self.position_swaps(n) {
            let (x, y) = constrained_pair(
                rng,
                n,
                task_size,
                self.distance * task_size as f64,
            )?;
            sequence.swap(x, y);
        }

        let mut slots: Vec<usize> = (0..self.task_count).collect();
        for _ in 0..self.slot_swaps() {
            let (x, y) = constrained_pair(rng, self.task_count, 1, self.distance)?;
            slots.swap(x, y);
        }

        let mut reordered = Vec::with_capacity(n);
        for slot in slots {
            let mut block = sequence[slot * task_size..(slot + 1) * task_size].to_vec();
            block.sort_unstable();
            reordered.extend(block);
        }
        reordered.extend_from_slice(&sequence[self.task_count * task_size..]);
        Ok(reordered)
    }

    /// Reorders every bucket of `datapack` independently
    pub fn resample<R: Rng + ?Sized>(
        &self,
        datapack: &mut DataPack,
        rng: &mut R,
    ) -> Result<TemporalReport> {
        info!(
            "Resampling person order: {} tasks, ratio {}, distance {}",
            self.task_count, self.ratio, self.distance
        );
        let mut report = TemporalReport::default();

        for (camera_id, bucket) in datapack.buckets_mut() {
            let persons: Vec<PersonId> = bucket.keys().copied().collect();
            let order = self.reorder(&persons, rng)?;

            let mut previous = std::mem::take(bucket);
            *bucket = order
                .into_iter()
                .map(|person_id| {
                    previous
                        .swap_remove(&person_id)
                        .map(|images| (person_id, images))
                        .ok_or(Error::UnknownPerson(person_id))
                })
                .collect::<Result<CameraBucket>>()?;

            report.buckets += 1;
            report.position_swaps += self.position_swaps(persons.len());
            report.slot_swaps += self.slot_swaps();
            debug!(
                "Camera {}: {} persons, task size {}",
                camera_id,
                persons.len(),
                self.task_size(persons.len())
            );
        }

        info!(
            "  {} position swaps, {} slot swaps over {} buckets",
            report.position_swaps, report.slot_swaps, report.buckets
        );
        Ok(report)
    }
}
