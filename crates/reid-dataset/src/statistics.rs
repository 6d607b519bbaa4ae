//! Per-camera statistics of a [`DataPack`].

use reid_core::CameraId;
use serde::{Deserialize, Serialize};

use crate::datapack::DataPack;

/// Person and image counts of one camera bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraStat {
    pub camera_id: CameraId,
    pub persons: usize,
    pub images: usize,
}

/// Snapshot of the pack's bucket sizes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackStatistics {
    pub cameras: Vec<CameraStat>,
    pub distinct_persons: usize,
    pub total_images: usize,
}

impl PackStatistics {
    pub fn from_pack(datapack: &DataPack) -> Self {
        let cameras = datapack
            .buckets()
            .map(|(camera_id, bucket)| CameraStat {
                camera_id,
                persons: bucket.len(),
                images: bucket.values().map(Vec::len).sum(),
            })
            .collect();

        Self {
            cameras,
            distinct_persons: datapack.person_count(),
            total_images: datapack.image_count(),
        }
    }

    /// Smallest and largest bucket, by person count
    pub fn person_range(&self) -> (usize, usize) {
        let min = self.cameras.iter().map(|c| c.persons).min().unwrap_or(0);
        let max = self.cameras.iter().map(|c| c.persons).max().unwrap_or(0);
        (min, max)
    }
}

impl std::fmt::Display for PackStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Pack Statistics:")?;
        writeln!(f, "  Cameras: {}", self.cameras.len())?;
        writeln!(f, "  Distinct persons: {}", self.distinct_persons)?;
        writeln!(f, "  Total images: {}", self.total_images)?;
        for camera in &self.cameras {
            writeln!(
                f,
                "  Camera {}: {} persons, {} images",
                camera.camera_id, camera.persons, camera.images
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_from_pack() {
        let mut pack = DataPack::new();
        let first = pack.register_camera();
        let second = pack.register_camera();
        let alice = pack.register_person();
        let bob = pack.register_person();
        pack.add_image_paths(alice, first, ["a1.jpg", "a2.jpg"]).unwrap();
        pack.add_image_path(bob, first, "b1.jpg").unwrap();
        pack.add_image_path(alice, second, "a3.jpg").unwrap();

        let stats = PackStatistics::from_pack(&pack);
        assert_eq!(stats.total_images, 4);
        assert_eq!(stats.distinct_persons, 2);
        assert_eq!(stats.person_range(), (1, 2));
        assert_eq!(
            stats.cameras[0],
            CameraStat {
                camera_id: 0,
                persons: 2,
                images: 3
            }
        );
        assert!(stats.to_string().contains("Camera 1: 1 persons, 1 images"));
    }
}
