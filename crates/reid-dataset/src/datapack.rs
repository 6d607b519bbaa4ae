//! The in-memory camera → person → images aggregate.
//!
//! A [`DataPack`] is filled by an image index, then mutated in place by the
//! partitioning stages. Bucket order and the person order inside each bucket
//! are both significant: edge nodes and tasks are assigned from them.

use indexmap::IndexMap;
use reid_core::{CameraId, Error, PersonId, Result};
use std::path::PathBuf;

/// Person sequence of one camera: `person_id → ordered image list`
pub type CameraBucket = IndexMap<PersonId, Vec<PathBuf>>;

/// Camera/person/image aggregate with monotonically assigned ids
#[derive(Debug, Clone, Default)]
pub struct DataPack {
    next_camera: usize,
    next_person: usize,
    image_count: usize,
    pack: IndexMap<CameraId, CameraBucket>,
}

impl DataPack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a camera and creates its empty bucket
    pub fn register_camera(&mut self) -> CameraId {
        let camera_id = self.next_camera;
        self.next_camera += 1;
        self.pack.insert(camera_id, CameraBucket::new());
        camera_id
    }

    /// Registers a person; no bucket entry is created until images are added
    pub fn register_person(&mut self) -> PersonId {
        let person_id = self.next_person;
        self.next_person += 1;
        person_id
    }

    /// Appends one image to a person's list in a camera bucket
    pub fn add_image_path(
        &mut self,
        person_id: PersonId,
        camera_id: CameraId,
        path: impl Into<PathBuf>,
    ) -> Result<()> {
        self.add_image_paths(person_id, camera_id, [path.into()])
    }

    /// Appends several images to a person's list in a camera bucket
    pub fn add_image_paths<I, P>(
        &mut self,
        person_id: PersonId,
        camera_id: CameraId,
        paths: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        if person_id >= self.next_person {
            return Err(Error::UnknownPerson(person_id));
        }
        let bucket = self
            .pack
            .get_mut(&camera_id)
            .ok_or(Error::UnknownCamera(camera_id))?;

        let images = bucket.entry(person_id).or_default();
        let before = images.len();
        images.extend(paths.into_iter().map(Into::into));
        self.image_count += images.len() - before;
        Ok(())
    }

    /// Last registered camera id, `None` before any registration
    pub fn current_camera(&self) -> Option<CameraId> {
        self.next_camera.checked_sub(1)
    }

    /// Last registered person id, `None` before any registration
    pub fn current_person(&self) -> Option<PersonId> {
        self.next_person.checked_sub(1)
    }

    /// Number of registered person ids
    pub fn registered_persons(&self) -> usize {
        self.next_person
    }

    pub fn image_count(&self) -> usize {
        self.image_count
    }

    /// Number of camera buckets currently in the pack
    pub fn camera_count(&self) -> usize {
        self.pack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.image_count == 0
    }

    /// Number of distinct person ids referenced anywhere in the pack
    pub fn person_count(&self) -> usize {
        let mut seen = std::collections::HashSet::new();
        for bucket in self.pack.values() {
            seen.extend(bucket.keys().copied());
        }
        seen.len()
    }

    /// Total `(camera, person)` assignments, the upper bound for bucket splitting
    pub fn assignment_count(&self) -> usize {
        self.pack.values().map(|bucket| bucket.len()).sum()
    }

    pub fn bucket(&self, camera_id: CameraId) -> Option<&CameraBucket> {
        self.pack.get(&camera_id)
    }

    /// Camera buckets in their significant order
    pub fn buckets(&self) -> impl Iterator<Item = (CameraId, &CameraBucket)> {
        self.pack.iter().map(|(camera_id, bucket)| (*camera_id, bucket))
    }

    pub fn buckets_mut(&mut self) -> impl Iterator<Item = (CameraId, &mut CameraBucket)> {
        self.pack
            .iter_mut()
            .map(|(camera_id, bucket)| (*camera_id, bucket))
    }

    pub fn camera_ids(&self) -> Vec<CameraId> {
        self.pack.keys().copied().collect()
    }

    /// Removes a bucket, keeping the order of the remaining ones.
    ///
    /// The bucket's images leave the pack until they are added back.
    pub fn remove_bucket(&mut self, camera_id: CameraId) -> Option<CameraBucket> {
        let bucket = self.pack.shift_remove(&camera_id)?;
        self.image_count -= bucket.values().map(Vec::len).sum::<usize>();
        Some(bucket)
    }

    /// Detaches one person's images from a bucket, keeping the person order
    pub fn take_person_images(
        &mut self,
        camera_id: CameraId,
        person_id: PersonId,
    ) -> Option<Vec<PathBuf>> {
        let images = self.pack.get_mut(&camera_id)?.shift_remove(&person_id)?;
        self.image_count -= images.len();
        Some(images)
    }

    /// Renumbers cameras `0..len` in their current order, sorts each bucket's
    /// persons by id and resets the camera counter to match.
    pub fn renumber_cameras(&mut self) {
        let buckets = std::mem::take(&mut self.pack);
        self.pack = buckets
            .into_values()
            .enumerate()
            .map(|(camera_id, mut bucket)| {
                bucket.sort_keys();
                (camera_id, bucket)
            })
            .collect();
        self.next_camera = self.pack.len();
    }
}
