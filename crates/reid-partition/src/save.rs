//! Materializing split records as an image directory tree.
//!
//! Layout: `<output>/<camera>-<task>/<split>/<person>/<original file name>`.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use reid_core::{CameraId, Error, PersonId, Result, Split, SplitRecord, TaskId};
use tracing::{debug, warn};

/// One destination directory and the images copied into it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyJob {
    pub dest_dir: PathBuf,
    pub sources: Vec<PathBuf>,
}

impl CopyJob {
    pub fn execute(&self) -> Result<usize> {
        copy_images(&self.dest_dir, &self.sources)
    }
}

/// Directory of one `(camera, task, split, person)` group under `output`
pub fn destination_dir(
    output: &Path,
    camera_id: CameraId,
    task_id: TaskId,
    split: Split,
    person_id: PersonId,
) -> PathBuf {
    output
        .join(format!("{camera_id}-{task_id}"))
        .join(split.as_str())
        .join(person_id.to_string())
}

/// Groups records into one job per destination directory, in a stable order.
///
/// Sources sharing a file name inside one job overwrite each other; they are
/// reported but kept.
pub fn plan_copies(records: &[SplitRecord], output: &Path) -> Vec<CopyJob> {
    let mut groups: BTreeMap<(CameraId, TaskId, Split, PersonId), Vec<PathBuf>> = BTreeMap::new();
    for record in records {
        groups
            .entry((
                record.camera_id,
                record.task_id,
                record.split,
                record.person_id,
            ))
            .or_default()
            .push(record.image_path.clone());
    }

    groups
        .into_iter()
        .map(|((camera_id, task_id, split, person_id), sources)| {
            let dest_dir = destination_dir(output, camera_id, task_id, split, person_id);

            let mut names = HashSet::new();
            let duplicates = sources
                .iter()
                .filter(|src| !names.insert(src.file_name().map(|n| n.to_os_string())))
                .count();
            if duplicates > 0 {
                warn!(
                    "{} images share a file name in {}; later copies overwrite earlier ones",
                    duplicates,
                    dest_dir.display()
                );
            }

            CopyJob { dest_dir, sources }
        })
        .collect()
}

/// Copies `sources` into `dest_dir` under their original file names, creating
/// the directory first. Returns the number of files copied.
pub fn copy_images(dest_dir: &Path, sources: &[PathBuf]) -> Result<usize> {
    fs::create_dir_all(dest_dir)?;

    for src in sources {
        let file_name = src
            .file_name()
            .ok_or_else(|| Error::Other(format!("Image path has no file name: {}", src.display())))?;
        let dest = dest_dir.join(file_name);
        fs::copy(src, &dest).map_err(|source| Error::Copy {
            src: src.clone(),
            dest: dest.clone(),
            source,
        })?;
    }

    debug!("Copied {} images to {}", sources.len(), dest_dir.display());
    Ok(sources.len())
}

/// Runs every job in order, stopping at the first failure
pub fn materialize(jobs: &[CopyJob]) -> Result<usize> {
    let mut copied = 0;
    for job in jobs {
        copied += job.execute()?;
    }
    Ok(copied)
}
