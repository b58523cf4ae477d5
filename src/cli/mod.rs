pub mod output;

use clap::Parser;
use coverfix::epub::cover_page::{CoverPage, CoverPageMode, DEFAULT_COVER_PAGE};
use coverfix::epub::locate::ManifestLocator;
use coverfix::relink::{DEFAULT_COVER_NAME, RelinkOptions};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "coverfix",
    version,
    about = "Rename EPUB cover images and relink their manifest references"
)]
pub struct Cli {
    /// Directory containing the EPUB files (defaults to the current directory)
    pub dir: Option<PathBuf>,

    /// File name the cover image is renamed to
    #[arg(long, env = "COVERFIX_COVER_NAME", default_value = DEFAULT_COVER_NAME)]
    pub cover_name: String,

    /// Output directory [default: <DIR>/output]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// How to find the package manifest
    #[arg(long, value_enum, default_value_t = ManifestLocator::Scan)]
    pub locate: ManifestLocator,

    /// Cover page to update, relative to the manifest directory
    #[arg(long, default_value = DEFAULT_COVER_PAGE)]
    pub cover_page: String,

    /// Leave the cover page alone
    #[arg(long, conflicts_with = "rewrite_all_links")]
    pub no_cover_page: bool,

    /// Point every xlink:href in the cover page at the new cover, not just the old cover link
    #[arg(long)]
    pub rewrite_all_links: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Verbose output
    #[arg(long, short)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short)]
    pub quiet: bool,
}

impl Cli {
    pub fn relink_options(&self) -> RelinkOptions {
        let cover_page = (!self.no_cover_page).then(|| CoverPage {
            path: self.cover_page.clone(),
            mode: if self.rewrite_all_links {
                CoverPageMode::AllLinks
            } else {
                CoverPageMode::Targeted
            },
        });
        RelinkOptions {
            cover_name: self.cover_name.clone(),
            locate: self.locate,
            cover_page,
            scratch_dir: None,
        }
    }
}
