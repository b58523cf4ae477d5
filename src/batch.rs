use crate::error::Result;
use crate::relink::{self, RelinkOptions, RelinkReport};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// File extension of the archives a batch picks up
pub const EPUB_EXTENSION: &str = ".epub";

/// Name of the output directory created inside the input directory
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Result for one archive in a batch
#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum BatchEntry {
    Ok(RelinkReport),
    Failed { source: PathBuf, error: String },
}

#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub output_dir: PathBuf,
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, BatchEntry::Ok(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.succeeded()
    }
}

/// Regular files directly inside `dir` whose name ends in `.epub`, by name.
pub fn list_epubs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut epubs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_epub = path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().ends_with(EPUB_EXTENSION));
        if is_epub && path.is_file() {
            epubs.push(path);
        }
    }
    epubs.sort();
    Ok(epubs)
}

/// Relink every EPUB in `dir`, one at a time, writing into `output_dir`.
///
/// A failure on one archive is recorded and the batch moves on; only
/// problems with the directories themselves abort it.
pub fn process_directory(
    dir: &Path,
    output_dir: &Path,
    options: &RelinkOptions,
) -> Result<BatchReport> {
    std::fs::create_dir_all(output_dir)?;
    let mut report = BatchReport {
        output_dir: output_dir.to_path_buf(),
        entries: Vec::new(),
    };

    for epub in list_epubs(dir)? {
        let entry = match relink::relink(&epub, output_dir, options) {
            Ok(done) => BatchEntry::Ok(done),
            Err(e) => BatchEntry::Failed {
                source: epub,
                error: e.to_string(),
            },
        };
        report.entries.push(entry);
    }

    Ok(report)
}
