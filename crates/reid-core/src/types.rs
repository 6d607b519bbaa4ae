//! Shared identifiers and record types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Camera bucket identifier; one bucket becomes one edge node.
pub type CameraId = usize;

/// Person identifier, assigned in registration order and later relabeled.
pub type PersonId = usize;

/// Index of a sequential task inside one edge node.
pub type TaskId = usize;

/// Output split of a single image
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    /// Training images
    Train,
    /// Query images for retrieval evaluation
    Query,
    /// Gallery images for retrieval evaluation
    Gallery,
}

impl Split {
    /// All splits in emission order
    pub const ALL: [Split; 3] = [Split::Train, Split::Query, Split::Gallery];

    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Query => "query",
            Split::Gallery => "gallery",
        }
    }
}

impl std::fmt::Display for Split {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One image assigned to a split of a task on an edge node
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SplitRecord {
    pub split: Split,
    pub person_id: PersonId,
    pub camera_id: CameraId,
    pub task_id: TaskId,
    pub image_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_display() {
        assert_eq!(Split::Train.to_string(), "train");
        assert_eq!(Split::Query.to_string(), "query");
        assert_eq!(Split::Gallery.to_string(), "gallery");
    }

    #[test]
    fn test_split_serializes_lowercase() {
        let json = serde_json::to_string(&Split::Gallery).unwrap();
        assert_eq!(json, "\"gallery\"");
    }
}
