//! Full run over a synthetic Market-1501 tree.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use reid_core::{DatasetSource, PartitionConfig, TaskIndices, TemporalIndices};
use reid_partition::{PartitionManifest, Pipeline, MANIFEST_FILE};
use tempfile::TempDir;
use walkdir::WalkDir;

const CAMERAS: usize = 3;
const PERSONS: usize = 12;
const FRAMES: usize = 4;

fn build_market(root: &Path) {
    for subset in ["bounding_box_train", "bounding_box_test", "gt_bbox", "query"] {
        fs::create_dir_all(root.join(subset)).unwrap();
    }
    for person in 1..=PERSONS {
        for camera in 1..=CAMERAS {
            for frame in 0..FRAMES {
                let name = format!("{person:04}_c{camera}s1_{frame:06}_01.jpg");
                fs::write(root.join("bounding_box_train").join(&name), name.as_bytes()).unwrap();
            }
        }
    }
    // distractor, never indexed
    fs::write(root.join("bounding_box_test/0000_c1s1_000001_01.jpg"), b"junk").unwrap();
}

fn config(dataset_root: &Path, output: &Path) -> PartitionConfig {
    PartitionConfig {
        output_dir: output.to_path_buf(),
        seed: 3,
        task_indices: TaskIndices {
            edge_nodes: 2,
            tasks_per_node: 2,
        },
        temporal: TemporalIndices {
            ratio: 0.5,
            distance: 2.0,
        },
        datasets: vec![DatasetSource::new("market1501", dataset_root)],
        ..PartitionConfig::default()
    }
}

fn relative_files(root: &Path) -> BTreeSet<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().strip_prefix(root).unwrap().to_path_buf())
        .collect()
}

fn file_names(dir: &Path) -> BTreeSet<String> {
    if !dir.is_dir() {
        return BTreeSet::new();
    }
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect()
}

#[test]
fn test_run_is_reproducible() {
    let temp_dir = TempDir::new().unwrap();
    let market = temp_dir.path().join("market");
    build_market(&market);

    let first_out = temp_dir.path().join("first");
    let second_out = temp_dir.path().join("second");
    Pipeline::new(config(&market, &first_out)).unwrap().run().unwrap();
    Pipeline::new(config(&market, &second_out)).unwrap().run().unwrap();

    let first = relative_files(&first_out);
    assert!(!first.is_empty());
    assert_eq!(first, relative_files(&second_out));
    for path in &first {
        assert_eq!(
            fs::read(first_out.join(path)).unwrap(),
            fs::read(second_out.join(path)).unwrap()
        );
    }
}

#[test]
fn test_run_layout_and_manifest() {
    let temp_dir = TempDir::new().unwrap();
    let market = temp_dir.path().join("market");
    let output = temp_dir.path().join("out");
    build_market(&market);

    let plan = Pipeline::new(config(&market, &output)).unwrap().run().unwrap();

    let manifest = PartitionManifest::load(&output.join(MANIFEST_FILE)).unwrap();
    assert_eq!(manifest, plan.manifest);
    assert_eq!(manifest.datasets[0].images, PERSONS * CAMERAS * FRAMES);
    assert_eq!(manifest.datasets[0].cameras, CAMERAS);
    assert_eq!(manifest.balance.merges, 1);
    assert_eq!(manifest.statistics.cameras.len(), 2);
    assert_eq!(manifest.statistics.total_images, PERSONS * CAMERAS * FRAMES);

    // only `<camera>-<task>` directories besides the manifest
    let mut top: Vec<String> = fs::read_dir(&output)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    top.sort();
    assert_eq!(top, vec!["0-0", "0-1", "1-0", "1-1", MANIFEST_FILE]);

    // train and query never share an image of the same person and task
    for node in ["0-0", "0-1", "1-0", "1-1"] {
        let train_root = output.join(node).join("train");
        for person in file_names(&train_root) {
            let train = file_names(&train_root.join(&person));
            let query = file_names(&output.join(node).join("query").join(&person));
            assert!(!train.is_empty());
            assert!(train.is_disjoint(&query), "{node}/{person} overlaps");
        }
    }
}

#[test]
fn test_missing_dataset_root_fails_without_output() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("out");
    let config = config(&temp_dir.path().join("absent"), &output);

    let result = Pipeline::new(config).unwrap().run();
    assert!(result.is_err());
    assert!(!output.exists());
}
