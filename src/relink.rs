//! Renaming an EPUB's cover image and relinking every reference to it.

use crate::epub::cover_page::{self, CoverPage};
use crate::epub::locate::{self, ManifestLocator};
use crate::epub::{opf, replace_file_name, zip_utils};
use crate::error::{CoverfixError, Result};
use percent_encoding::percent_decode_str;
use serde::Serialize;
use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

/// File name the cover image is renamed to unless told otherwise
pub const DEFAULT_COVER_NAME: &str = "cover.jpg";

#[derive(Debug, Clone)]
pub struct RelinkOptions {
    pub cover_name: String,
    pub locate: ManifestLocator,
    pub cover_page: Option<CoverPage>,
    /// Parent for the scratch extraction; the system temp dir when unset
    pub scratch_dir: Option<PathBuf>,
}

impl Default for RelinkOptions {
    fn default() -> Self {
        Self {
            cover_name: DEFAULT_COVER_NAME.to_string(),
            locate: ManifestLocator::default(),
            cover_page: Some(CoverPage::default()),
            scratch_dir: None,
        }
    }
}

/// What happened to the physical cover file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetStatus {
    Renamed,
    /// Already carried the target name
    Unchanged,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum CoverStatus {
    Relinked {
        old_href: String,
        new_href: String,
        asset: AssetStatus,
    },
    /// Another file already carries the target name; nothing was touched
    NameTaken {
        old_href: String,
        new_href: String,
    },
    NoCoverItem,
}

/// Outcome of relinking one archive
#[derive(Debug, Clone, Serialize)]
pub struct RelinkReport {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Manifest path inside the package
    pub manifest: String,
    pub cover: CoverStatus,
    /// `xlink:href` attributes rewritten in the cover page
    pub cover_page_links: usize,
    pub warnings: Vec<String>,
}

/// A cover name must be a single, non-empty path segment.
pub fn validate_cover_name(name: &str) -> Result<()> {
    let plain = !name.is_empty()
        && !name.contains(['/', '\\', '"', '\''])
        && name != "."
        && name != "..";
    if plain {
        Ok(())
    } else {
        Err(CoverfixError::InvalidCoverName(name.to_string()))
    }
}

/// Decode `%XX` escapes in a manifest href. Invalid UTF-8 keeps the raw href.
fn decode_href(href: &str) -> Cow<'_, str> {
    percent_decode_str(href)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(href))
}

/// Join `rel` onto `base` lexically, refusing results outside `root`.
fn resolve_within(root: &Path, base: &Path, rel: &str) -> Option<PathBuf> {
    let mut parts: Vec<_> = base
        .strip_prefix(root)
        .ok()?
        .components()
        .map(|c| c.as_os_str().to_os_string())
        .collect();

    for component in Path::new(rel).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_os_string()),
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    let mut path = root.to_path_buf();
    path.extend(parts);
    Some(path)
}

/// Rename the cover of the EPUB at `archive` and write the result to
/// `output_dir/<same file name>`.
///
/// A missing cover item or cover file is not an error: the archive is still
/// repackaged and the report says what was skipped. A missing manifest is
/// an error and no output is written. The scratch extraction is removed on
/// every path out of this function.
pub fn relink(
    archive: &Path,
    output_dir: &Path,
    options: &RelinkOptions,
) -> Result<RelinkReport> {
    validate_cover_name(&options.cover_name)?;
    let file_name = archive.file_name().ok_or_else(|| {
        CoverfixError::InvalidEpub(format!("not a file path: {}", archive.display()))
    })?;

    let mut builder = tempfile::Builder::new();
    builder.prefix("coverfix-");
    let scratch = match &options.scratch_dir {
        Some(dir) => builder.tempdir_in(dir)?,
        None => builder.tempdir()?,
    };
    let root = scratch.path();
    zip_utils::extract_to(archive, root)?;

    let located = locate::find_manifest(root, options.locate)?;
    let mut warnings = located.warnings;
    let Some(manifest_path) = located.manifest else {
        return Err(CoverfixError::ManifestNotFound(archive.display().to_string()));
    };
    let manifest = zip_utils::entry_name(root, &manifest_path).unwrap_or_default();
    let manifest_dir = manifest_path.parent().unwrap_or(root).to_path_buf();

    let xml = std::fs::read_to_string(&manifest_path)?;
    let mut cover_page_links = 0;

    let cover = match opf::find_cover_item(&xml)? {
        None => CoverStatus::NoCoverItem,
        Some(item) => {
            let old_file = item.file_name().to_string();
            let new_href = replace_file_name(&item.href, &options.cover_name);
            let old_path = resolve_within(root, &manifest_dir, &decode_href(&item.href));

            let taken = old_path.as_deref().and_then(|old_path| {
                let new_path = old_path.with_file_name(&options.cover_name);
                let clash = old_path.is_file() && new_path != old_path && new_path.exists();
                clash.then_some(new_path)
            });

            if let Some(taken) = taken {
                let taken = zip_utils::entry_name(root, &taken).unwrap_or_default();
                warnings.push(format!(
                    "{taken} already exists in {}; cover image {old_file} left as is",
                    archive.display()
                ));
                CoverStatus::NameTaken {
                    old_href: item.href,
                    new_href,
                }
            } else {
                if let Some(rewritten) = opf::rewrite_cover_href(&xml, &new_href)? {
                    std::fs::write(&manifest_path, rewritten)?;
                }

                let asset = match old_path {
                    Some(old_path) if old_path.is_file() => {
                        let new_path = old_path.with_file_name(&options.cover_name);
                        if old_path == new_path {
                            AssetStatus::Unchanged
                        } else {
                            std::fs::rename(&old_path, &new_path)?;
                            AssetStatus::Renamed
                        }
                    }
                    Some(_) => {
                        warnings.push(format!(
                            "cover image file {old_file} not found in {}",
                            archive.display()
                        ));
                        AssetStatus::Missing
                    }
                    None => {
                        warnings.push(format!(
                            "cover image href {} points outside the package",
                            item.href
                        ));
                        AssetStatus::Missing
                    }
                };

                if let Some(page) = &options.cover_page
                    && let Some(page_path) = resolve_within(root, &manifest_dir, &page.path)
                    && page_path.is_file()
                {
                    cover_page_links = cover_page::rewrite_file(
                        &page_path,
                        &old_file,
                        &options.cover_name,
                        page.mode,
                    )?;
                }

                CoverStatus::Relinked {
                    old_href: item.href,
                    new_href,
                    asset,
                }
            }
        }
    };

    let output = output_dir.join(file_name);
    zip_utils::pack_dir(root, &output)?;

    Ok(RelinkReport {
        source: archive.to_path_buf(),
        output,
        manifest,
        cover,
        cover_page_links,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cover_name_validation() {
        assert!(validate_cover_name("cover.jpg").is_ok());
        assert!(validate_cover_name("cover.png").is_ok());
        for bad in ["", ".", "..", "Images/cover.jpg", "a\\b.jpg", "x\".jpg"] {
            assert!(
                matches!(
                    validate_cover_name(bad),
                    Err(CoverfixError::InvalidCoverName(_))
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn resolve_relative_to_manifest_dir() {
        let root = Path::new("/scratch");
        let base = root.join("OEBPS");
        assert_eq!(
            resolve_within(root, &base, "Images/a.jpg"),
            Some(root.join("OEBPS").join("Images").join("a.jpg"))
        );
        assert_eq!(
            resolve_within(root, &base, "../Images/a.jpg"),
            Some(root.join("Images").join("a.jpg"))
        );
        assert_eq!(
            resolve_within(root, &base, "./a.jpg"),
            Some(root.join("OEBPS").join("a.jpg"))
        );
    }

    #[test]
    fn resolve_refuses_escape() {
        let root = Path::new("/scratch");
        assert_eq!(resolve_within(root, root, "../etc/passwd"), None);
        assert_eq!(resolve_within(root, &root.join("OEBPS"), "../../x"), None);
        assert_eq!(resolve_within(root, root, "/etc/passwd"), None);
    }

    #[test]
    fn default_options() {
        let options = RelinkOptions::default();
        assert_eq!(options.cover_name, "cover.jpg");
        assert_eq!(options.locate, ManifestLocator::Scan);
        assert_eq!(options.cover_page, Some(CoverPage::default()));
        assert_eq!(options.scratch_dir, None);
    }

    #[test]
    fn href_escapes_are_decoded() {
        assert_eq!(decode_href("Images/my%20cover.jpg"), "Images/my cover.jpg");
        assert_eq!(decode_href("Images/plain.jpg"), "Images/plain.jpg");
        // %FF alone is not UTF-8
        assert_eq!(decode_href("Images/%FF.jpg"), "Images/%FF.jpg");
    }
}
