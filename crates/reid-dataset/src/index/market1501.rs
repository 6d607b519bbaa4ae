//! Market-1501 indexer.
//!
//! ```text
//! root/
//!   bounding_box_train/0002_c1s1_000451_03.jpg
//!   bounding_box_test/0000_c1s1_000151_01.jpg
//!   gt_bbox/0001_c1s1_001051_00.jpg
//!   query/0001_c1s1_001051_00.jpg
//! ```

use std::path::Path;

use regex::Regex;
use reid_core::Result;

use super::{matching_files, parse_field, ImageIndex, IndexEntry};

const SUBSETS: [&str; 4] = ["bounding_box_train", "bounding_box_test", "gt_bbox", "query"];

pub struct Market1501 {
    pattern: Regex,
}

impl Market1501 {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(r"^(\d{4})_c(\d)s(\d)_(\w+)\.jpg$")?,
        })
    }
}

impl ImageIndex for Market1501 {
    fn name(&self) -> &'static str {
        "Market1501"
    }

    fn scan(&self, root: &Path) -> Result<Vec<IndexEntry>> {
        let mut entries = Vec::new();
        for subset in SUBSETS {
            for (path, fields) in matching_files(self.name(), &root.join(subset), &self.pattern)? {
                let person = parse_field(&fields[0], &path)?;
                // 0000 marks distractors
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
