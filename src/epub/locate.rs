use crate::epub::{CONTAINER_PATH, MANIFEST_EXTENSION, container, zip_utils};
use crate::error::Result;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};

/// How the package manifest is found inside an extracted EPUB
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ManifestLocator {
    /// First `.opf` file in a top-down walk of the tree
    #[default]
    Scan,
    /// The rootfile named by META-INF/container.xml, scanning if that fails
    Container,
}

/// Result of a manifest lookup
#[derive(Debug, Default)]
pub struct Located {
    pub manifest: Option<PathBuf>,
    pub warnings: Vec<String>,
}

/// Find the manifest document under an extracted package `root`.
pub fn find_manifest(root: &Path, locator: ManifestLocator) -> Result<Located> {
    let mut located = Located::default();

    if locator == ManifestLocator::Container {
        match from_container(root)? {
            Ok(path) => {
                located.manifest = Some(path);
                return Ok(located);
            }
            Err(reason) => located
                .warnings
                .push(format!("{reason}; falling back to {MANIFEST_EXTENSION} scan")),
        }
    }

    located.manifest = scan(root)?;
    Ok(located)
}

/// First file ending in `.opf`, files of a directory before its subdirectories.
pub fn scan(root: &Path) -> Result<Option<PathBuf>> {
    Ok(zip_utils::walk_files(root)?.into_iter().find(|p| {
        p.file_name()
            .is_some_and(|n| n.to_string_lossy().ends_with(MANIFEST_EXTENSION))
    }))
}

/// Resolve the container pointer. The inner `Err` carries a human-readable
/// reason the pointer could not be used.
fn from_container(root: &Path) -> Result<std::result::Result<PathBuf, String>> {
    let container_file = root.join(CONTAINER_PATH);
    if !container_file.is_file() {
        return Ok(Err(format!("{CONTAINER_PATH} not found")));
    }

    let rootfile = std::fs::read_to_string(&container_file)
        .map_err(|e| e.to_string())
        .and_then(|xml| container::rootfile_path(&xml).map_err(|e| e.to_string()));
    let full_path = match rootfile {
        Ok(Some(full_path)) => full_path,
        Ok(None) => return Ok(Err(format!("no rootfile in {CONTAINER_PATH}"))),
        Err(e) => return Ok(Err(format!("unreadable {CONTAINER_PATH}: {e}"))),
    };

    let rel = Path::new(&full_path);
    if rel
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Ok(Err(format!("rootfile path escapes the package: {full_path}")));
    }

    let path = root.join(rel);
    if !path.is_file() {
        return Ok(Err(format!("rootfile {full_path} does not exist")));
    }
    Ok(Ok(path))
}
