//! PRID2011 indexer.
//!
//! ```text
//! root/
//!   multi_shot/cam_a/person_0001/0001.png
//!   single_shot/cam_a/person_0001.png
//! ```
//!
//! The same person directory name in `cam_a` and `cam_b` is the same identity.

use std::path::Path;

use regex::Regex;
use reid_core::Result;

use super::{matching_files, sorted_children, ImageIndex, IndexEntry};

const CAMERAS: [&str; 2] = ["cam_a", "cam_b"];

pub struct Prid2011 {
    multi_shot: Regex,
    single_shot: Regex,
}

impl Prid2011 {
    pub fn new() -> Result<Self> {
        Ok(Self {
            multi_shot: Regex::new(r"^(\d{4})\.png$")?,
            single_shot: Regex::new(r"^person_(\d{4})\.png$")?,
        })
    }

    fn scan_multi_shot(&self, root: &Path, camera: &str) -> Result<Vec<IndexEntry>> {
        let mut entries = Vec::new();
        for person_dir in sorted_children(self.name(), &root.join("multi_shot").join(camera))? {
            if !person_dir.is_dir() {
                continue;
            }
            let person = person_dir
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            for (path, _) in matching_files(self.name(), &person_dir, &self.multi_shot)? {
                entries.push(IndexEntry::new(camera, person.clone(), path));
            }
        }
        Ok(entries)
    }

    fn scan_single_shot(&self, root: &Path, camera: &str) -> Result<Vec<IndexEntry>> {
        let dir = root.join("single_shot").join(camera);
        Ok(matching_files(self.name(), &dir, &self.single_shot)?
            .into_iter()
            .map(|(path, _)| {
                let person = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default();
                IndexEntry::new(camera, person, path)
            })
            .collect())
    }
}

impl ImageIndex for Prid2011 {
    fn name(&self) -> &'static str {
        "PRID2011"
    }

    fn scan(&self, root: &Path) -> Result<Vec<IndexEntry>> {
        let mut entries = Vec::new();
        for camera in CAMERAS {
            entries.extend(self.scan_multi_shot(root, camera)?);
        }
        for camera in CAMERAS {
            entries.extend(self.scan_single_shot(root, camera)?);
        }
        Ok(entries)
    }
}
