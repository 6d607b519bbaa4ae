//! Image indexers for the supported re-identification datasets.
//!
//! Every dataset stores camera and person labels differently (directory
//! names, filename fields). An [`ImageIndex`] turns one dataset root into
//! `(camera_key, person_key, image_path)` entries; [`ImageIndex::process`]
//! then registers them in a [`DataPack`].

mod cuhk03;
mod duke;
mod ethz;
mod market1501;
mod pku;
mod prid2011;

pub use cuhk03::Cuhk03;
pub use duke::DukeMtmc;
pub use ethz::Ethz;
pub use market1501::Market1501;
pub use pku::PkuReid;
pub use prid2011::Prid2011;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use reid_core::{CameraId, Error, PersonId, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::datapack::DataPack;

/// One image with its dataset-local camera and person labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub camera: String,
    pub person: String,
    pub path: PathBuf,
}

impl IndexEntry {
    pub fn new(camera: impl Into<String>, person: impl Into<String>, path: PathBuf) -> Self {
        Self {
            camera: camera.into(),
            person: person.into(),
            path,
        }
    }
}

/// What one dataset contributed to the pack
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSummary {
    pub dataset: String,
    pub cameras: usize,
    pub persons: usize,
    pub images: usize,
}

/// Source of labeled images for one dataset format
pub trait ImageIndex {
    /// Human-readable dataset name used in logs and errors
    fn name(&self) -> &'static str;

    /// Lists every matching image under `root`, in a reproducible order
    fn scan(&self, root: &Path) -> Result<Vec<IndexEntry>>;

    /// Validates `root`, scans it and registers the entries in `datapack`.
    ///
    /// Cameras and persons are registered in first-seen order. Keys are local
    /// to this call, so two datasets never share a camera or person id.
    fn process(&self, root: &Path, datapack: &mut DataPack) -> Result<IndexSummary> {
        if !root.exists() {
            return Err(Error::DatasetNotFound {
                dataset: self.name().to_string(),
                root: root.to_path_buf(),
            });
        }

        info!("Indexing {} at {}", self.name(), root.display());
        let entries = self.scan(root)?;
        let summary = register_entries(self.name(), entries, datapack)?;
        info!(
            "  {}: {} cameras, {} persons, {} images",
            summary.dataset, summary.cameras, summary.persons, summary.images
        );
        Ok(summary)
    }
}

/// Names accepted by [`by_name`]
pub const DATASET_NAMES: [&str; 6] = ["market1501", "duke", "cuhk03", "ethz", "pku", "prid2011"];

/// Resolves a dataset name to its indexer
pub fn by_name(name: &str) -> Result<Box<dyn ImageIndex>> {
    let index: Box<dyn ImageIndex> = match name.to_lowercase().as_str() {
        "market1501" | "market" => Box::new(Market1501::new()?),
        "duke" | "dukemtmc" => Box::new(DukeMtmc::new()?),
        "cuhk03" => Box::new(Cuhk03::new()?),
        "ethz" => Box::new(Ethz::new()?),
        "pku" | "pku-reid" => Box::new(PkuReid::new()?),
        "prid2011" | "prid" => Box::new(Prid2011::new()?),
        _ => {
            return Err(Error::UnknownDataset(format!(
                "{name} (expected one of: {})",
                DATASET_NAMES.join(", ")
            )))
        }
    };
    Ok(index)
}

/// Registers entries in first-seen order of their camera and person keys
pub fn register_entries(
    dataset: &str,
    entries: Vec<IndexEntry>,
    datapack: &mut DataPack,
) -> Result<IndexSummary> {
    let mut cameras: HashMap<String, CameraId> = HashMap::new();
    let mut persons: HashMap<String, PersonId> = HashMap::new();
    let images = entries.len();

    for entry in entries {
        let camera_id = match cameras.get(&entry.camera) {
            Some(id) => *id,
            None => {
                let id = datapack.register_camera();
                cameras.insert(entry.camera, id);
                id
            }
        };
        let person_id = match persons.get(&entry.person) {
            Some(id) => *id,
            None => {
                let id = datapack.register_person();
                persons.insert(entry.person, id);
                id
            }
        };
        datapack.add_image_path(person_id, camera_id, entry.path)?;
    }

    Ok(IndexSummary {
        dataset: dataset.to_string(),
        cameras: cameras.len(),
        persons: persons.len(),
        images,
    })
}

/// Immediate children of `dir`, sorted by file name
pub(crate) fn sorted_children(dataset: &str, dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::DatasetNotFound {
            dataset: dataset.to_string(),
            root: dir.to_path_buf(),
        });
    }

    let mut children = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        children.push(entry.into_path());
    }
    Ok(children)
}

/// Files directly under `dir` whose name matches `pattern`, with their captures
pub(crate) fn matching_files(
    dataset: &str,
    dir: &Path,
    pattern: &Regex,
) -> Result<Vec<(PathBuf, Vec<String>)>> {
    let mut matches = Vec::new();
    for path in sorted_children(dataset, dir)? {
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(caps) = pattern.captures(file_name) {
            let fields = caps
                .iter()
                .skip(1)
                .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect();
            matches.push((path, fields));
        }
    }
    debug!(
        "{}: {} matching files in {}",
        dataset,
        matches.len(),
        dir.display()
    );
    Ok(matches)
}

/// Parses a numeric filename field
pub(crate) fn parse_field(field: &str, path: &Path) -> Result<u32> {
    field.parse::<u32>().map_err(|e| {
        Error::Other(format!(
            "Invalid numeric field '{field}' in {}: {e}",
            path.display()
        ))
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::fs;
    use std::path::Path;

    /// Creates an empty file, making parent directories as needed
    pub fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"").unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_by_name_resolves_aliases() {
        assert_eq!(by_name("Market1501").unwrap().name(), "Market1501");
        assert_eq!(by_name("dukemtmc").unwrap().name(), "DukeMTMC-reID");
        assert!(matches!(by_name("viper"), Err(Error::UnknownDataset(_))));
    }

    #[test]
    fn test_register_entries_first_seen_order() {
        let mut pack = DataPack::new();
        let entries = vec![
            IndexEntry::new("c2", "p7", PathBuf::from("a.jpg")),
            IndexEntry::new("c1", "p3", PathBuf::from("b.jpg")),
            IndexEntry::new("c2", "p3", PathBuf::from("c.jpg")),
        ];

        let summary = register_entries("test", entries, &mut pack).unwrap();
        assert_eq!(summary.cameras, 2);
        assert_eq!(summary.persons, 2);
        assert_eq!(summary.images, 3);

        // c2 -> camera 0, c1 -> camera 1; p7 -> person 0, p3 -> person 1
        let first = pack.bucket(0).unwrap();
        assert_eq!(first.keys().copied().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(pack.bucket(1).unwrap()[&1], vec![PathBuf::from("b.jpg")]);
    }

    #[test]
    fn test_two_datasets_never_share_ids() {
        let mut pack = DataPack::new();
        let entry = || vec![IndexEntry::new("c1", "p1", PathBuf::from("a.jpg"))];
        register_entries("first", entry(), &mut pack).unwrap();
        register_entries("second", entry(), &mut pack).unwrap();

        assert_eq!(pack.camera_count(), 2);
        assert_eq!(pack.person_count(), 2);
    }

    #[test]
    fn test_process_missing_root() {
        let mut pack = DataPack::new();
        let index = Market1501::new().unwrap();
        let result = index.process(Path::new("/nonexistent/market"), &mut pack);
        assert!(matches!(result, Err(Error::DatasetNotFound { .. })));
    }

    #[test]
    fn test_sorted_children_orders_by_name() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["b.jpg", "c.jpg", "a.jpg"] {
            test_support::touch(&temp_dir.path().join(name));
        }
        let children = sorted_children("test", temp_dir.path()).unwrap();
        let names: Vec<_> = children
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg", "c.jpg"]);
    }
}
