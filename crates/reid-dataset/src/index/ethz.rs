//! ETHZ indexer.
//!
//! `seq1..seq3/<person>/frameNNNNPersonNN.png`; all sequences come from a
//! single moving camera.

use std::path::Path;

use regex::Regex;
use reid_core::Result;

use super::{matching_files, sorted_children, ImageIndex, IndexEntry};

const SEQUENCES: [&str; 3] = ["seq1", "seq2", "seq3"];

pub struct Ethz {
    pattern: Regex,
}

impl Ethz {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(r"^frame(\d{4})Person(\d{2})\.png$")?,
        })
    }
}

impl ImageIndex for Ethz {
    fn name(&self) -> &'static str {
        "ETHZ"
    }

    fn scan(&self, root: &Path) -> Result<Vec<IndexEntry>> {
        let mut entries = Vec::new();
        for sequence in SEQUENCES {
            for person_dir in sorted_children(self.name(), &root.join(sequence))? {
                if !person_dir.is_dir() {
                    continue;
                }
                let person_name = person_dir
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                for (path, _) in matching_files(self.name(), &person_dir, &self.pattern)? {
                    entries.push(IndexEntry::new("0", format!("{sequence}{person_name}"), path));
                }
            }
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::test_support::touch;
    use crate::DataPack;
    use tempfile::TempDir;

    #[test]
    fn test_single_camera_per_sequence_persons() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("seq1/p001/frame0001Person01.png"));
        touch(&root.join("seq1/p001/frame0002Person01.png"));
        touch(&root.join("seq2/p001/frame0001Person01.png"));
        std::fs::create_dir_all(root.join("seq3")).unwrap();
        touch(&root.join("Readme.txt"));

        let mut pack = DataPack::new();
        let summary = Ethz::new().unwrap().process(root, &mut pack).unwrap();
        assert_eq!(summary.cameras, 1);
        assert_eq!(summary.persons, 2);
        assert_eq!(summary.images, 3);
    }
}
