//! PKU-ReID indexer. Flat directory of `PPP_CC_N.png` files.

use std::path::Path;

use regex::Regex;
use reid_core::Result;

use super::{matching_files, parse_field, ImageIndex, IndexEntry};

pub struct PkuReid {
    pattern: Regex,
}

impl PkuReid {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(r"^(\d{3})_(\d{2})_(\d)\.png$")?,
        })
    }
}

impl ImageIndex for PkuReid {
    fn name(&self) -> &'static str {
        "PKU-ReID"
    }

    fn scan(&self, root: &Path) -> Result<Vec<IndexEntry>> {
        matching_files(self.name(), root, &self.pattern)?
            .into_iter()
            .map(|(path, fields)| {
                let person = parse_field(&fields[0], &path)?;
                let camera = parse_field(&fields[1], &path)?;
                Ok(IndexEntry::new(camera.to_string(), person.to_string(), path))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::test_support::touch;
    use tempfile::TempDir;

    #[test]
    fn test_scan_flat_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("001_01_1.png"));
        touch(&root.join("001_02_1.png"));
        touch(&root.join("002_01_3.png"));
        touch(&root.join("002_01_3.jpg"));

        let entries = PkuReid::new().unwrap().scan(root).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].camera, "2");
        assert_eq!(entries[2].person, "2");
    }
}
