//! CUHK03 indexer.
//!
//! `train/` and `val/` hold `PPPP_CC.jpg` files. Camera pairs are folded
//! into five views with `CC mod 5`, and person labels are kept per subset.

use std::path::Path;

use regex::Regex;
use reid_core::Result;

use super::{matching_files, parse_field, ImageIndex, IndexEntry};

const SUBSETS: [&str; 2] = ["train", "val"];
const VIEWS: u32 = 5;

pub struct Cuhk03 {
    pattern: Regex,
}

impl Cuhk03 {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(r"^(\d{4})_(\d{2})\.jpg$")?,
        })
    }
}

impl ImageIndex for Cuhk03 {
    fn name(&self) -> &'static str {
        "CUHK-03"
    }

    fn scan(&self, root: &Path) -> Result<Vec<IndexEntry>> {
        let mut entries = Vec::new();
        for subset in SUBSETS {
            for (path, fields) in matching_files(self.name(), &root.join(subset), &self.pattern)? {
                let person = parse_field(&fields[0], &path)?;
                let camera = parse_field(&fields[1], &path)? % VIEWS;
                entries.push(IndexEntry::new(
                    camera.to_string(),
                    format!("{subset}{person}"),
                    path,
                ));
            }
        }
        Ok(entries)
    }
}
