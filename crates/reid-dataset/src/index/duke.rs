//! DukeMTMC-reID indexer.
//!
//! Filenames look like `0001_c2_f0046182.jpg`.

use std::path::Path;

use regex::Regex;
use reid_core::Result;

use super::{matching_files, parse_field, ImageIndex, IndexEntry};

const SUBSETS: [&str; 3] = ["bounding_box_train", "bounding_box_test", "query"];

pub struct DukeMtmc {
    pattern: Regex,
}

impl DukeMtmc {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(r"^(\d{4})_c(\d)_(\w+)\.jpg$")?,
        })
    }
}

impl ImageIndex for DukeMtmc {
    fn name(&self) -> &'static str {
        "DukeMTMC-reID"
    }

    fn scan(&self, root: &Path) -> Result<Vec<IndexEntry>> {
        let mut entries = Vec::new();
        for subset in SUBSETS {
            for (path, fields) in matching_files(self.name(), &root.join(subset), &self.pattern)? {
                let person = parse_field(&fields[0], &path)?;
                if person == 0 {
                    continue;
                }
                let camera = parse_field(&fields[1], &path)?;
                entries.push(IndexEntry::new(camera.to_string(), person.to_string(), path));
            }
        }
        Ok(entries)
    }
}
