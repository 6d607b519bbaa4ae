//! Random person id permutation.

use rand::seq::SliceRandom;
use rand::Rng;
use reid_core::PersonId;
use reid_dataset::{CameraBucket, DataPack};
use tracing::debug;

/// Renames every person id through one random bijection over `0..registered_persons`
#[derive(Debug, Clone, Copy, Default)]
pub struct PersonRelabeler;

impl PersonRelabeler {
    pub fn new() -> Self {
        Self
    }

    /// Applies a fresh permutation to every bucket key and returns it.
    ///
    /// `mapping[old] == new`. Bucket order and the image lists are untouched,
    /// only the person keys change.
    pub fn relabel<R: Rng + ?Sized>(&self, datapack: &mut DataPack, rng: &mut R) -> Vec<PersonId> {
        let mut mapping: Vec<PersonId> = (0..datapack.registered_persons()).collect();
        mapping.shuffle(rng);

        for (camera_id, bucket) in datapack.buckets_mut() {
            let old = std::mem::take(bucket);
            *bucket = old
                .into_iter()
                .map(|(person_id, images)| (mapping[person_id], images))
                .collect::<CameraBucket>();
            debug!("Relabeled {} persons of camera {}", bucket.len(), camera_id);
        }
        mapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    fn pack_with_overlap() -> DataPack {
        let mut pack = DataPack::new();
        let persons: Vec<_> = (0..6).map(|_| pack.register_person()).collect();
        let first = pack.register_camera();
        let second = pack.register_camera();
        for &person in &persons[..4] {
            pack.add_image_path(person, first, format!("a_{person}.jpg")).unwrap();
        }
        for &person in &persons[2..] {
            pack.add_image_path(person, second, format!("b_{person}.jpg")).unwrap();
        }
        pack
    }

    #[test]
    fn test_mapping_is_a_bijection() {
        let mut pack = pack_with_overlap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mapping = PersonRelabeler::new().relabel(&mut pack, &mut rng);

        let targets: BTreeSet<_> = mapping.iter().copied().collect();
        assert_eq!(targets, (0..6).collect());
        assert_eq!(pack.person_count(), 6);
        assert_eq!(pack.image_count(), 8);
    }

    #[test]
    fn test_same_person_renamed_consistently() {
        let mut pack = pack_with_overlap();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mapping = PersonRelabeler::new().relabel(&mut pack, &mut rng);

        // persons 2 and 3 appear on both cameras and keep their images
        for old in [2usize, 3] {
            let new = mapping[old];
            assert_eq!(
                pack.bucket(0).unwrap()[&new],
                vec![PathBuf::from(format!("a_{old}.jpg"))]
            );
            assert_eq!(
                pack.bucket(1).unwrap()[&new],
                vec![PathBuf::from(format!("b_{old}.jpg"))]
            );
        }
    }

    #[test]
    fn test_same_seed_same_mapping() {
        let relabeler = PersonRelabeler::new();
        let mut first = pack_with_overlap();
        let mut second = pack_with_overlap();
        let a = relabeler.relabel(&mut first, &mut ChaCha8Rng::seed_from_u64(5));
        let b = relabeler.relabel(&mut second, &mut ChaCha8Rng::seed_from_u64(5));
        assert_eq!(a, b);
    }
}
