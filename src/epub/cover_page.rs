//! Rewriting the image link inside a cover display page.
//!
//! The page is edited as raw text: only `xlink:href` attribute values are
//! touched, the rest of the document is left byte-for-byte intact.

use crate::epub::{href_file_name, replace_file_name};
use crate::error::Result;
use regex::{Captures, Regex};
use serde::Serialize;
use std::path::Path;

/// Default location of the cover page, relative to the manifest directory
pub const DEFAULT_COVER_PAGE: &str = "Text/cover.xhtml";

/// Directory the cover page links into when every link is rewritten
pub const COVER_IMAGE_DIR: &str = "../Images";

/// Which `xlink:href` attributes get rewritten
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoverPageMode {
    /// Only links whose filename matches the old cover filename
    #[default]
    Targeted,
    /// Every link, pointed at `../Images/<new name>`
    AllLinks,
}

/// A cover display page to keep in sync with the renamed cover
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverPage {
    pub path: String,
    pub mode: CoverPageMode,
}

impl Default for CoverPage {
    fn default() -> Self {
        Self {
            path: DEFAULT_COVER_PAGE.to_string(),
            mode: CoverPageMode::default(),
        }
    }
}

/// Rewrite `xlink:href` values in `xhtml`, returning the new text and the
/// number of attributes whose value changed.
pub fn rewrite_links(
    xhtml: &str,
    old_file: &str,
    new_file: &str,
    mode: CoverPageMode,
) -> Result<(String, usize)> {
    let re = Regex::new(r#"xlink:href\s*=\s*(?:"([^"]*)"|'([^']*)')"#)?;
    let mut count = 0;

    let out = re.replace_all(xhtml, |caps: &Captures| {
        let (value, quote) = match caps.get(1) {
            Some(m) => (m.as_str(), '"'),
            None => (caps.get(2).map_or("", |m| m.as_str()), '\''),
        };
        let new_value = match mode {
            CoverPageMode::AllLinks => Some(format!("{COVER_IMAGE_DIR}/{new_file}")),
            CoverPageMode::Targeted if href_file_name(value) == old_file => {
                Some(replace_file_name(value, new_file))
            }
            CoverPageMode::Targeted => None,
        };
        match new_value {
            Some(new_value) if new_value != value => {
                count += 1;
                format!("xlink:href={quote}{new_value}{quote}")
            }
            _ => caps[0].to_string(),
        }
    });

    Ok((out.into_owned(), count))
}

/// Rewrite the cover page at `path` in place. The file is only written when
/// something changed.
pub fn rewrite_file(
    path: &Path,
    old_file: &str,
    new_file: &str,
    mode: CoverPageMode,
) -> Result<usize> {
    let xhtml = std::fs::read_to_string(path)?;
    let (rewritten, count) = rewrite_links(&xhtml, old_file, new_file, mode)?;
    if count > 0 {
        std::fs::write(path, rewritten)?;
    }
    Ok(count)
}
