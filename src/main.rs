mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use cli::output::OutputConfig;
use coverfix::batch::{self, BatchEntry};
use coverfix::relink::{AssetStatus, CoverStatus, RelinkReport};
use std::path::PathBuf;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = OutputConfig::from_global(cli.json, cli.verbose, cli.quiet);

    let dir = cli.dir.clone().unwrap_or_else(|| PathBuf::from("."));
    let output_dir = cli
        .output
        .clone()
        .unwrap_or_else(|| dir.join(batch::DEFAULT_OUTPUT_DIR));
    let options = cli.relink_options();

    let report = batch::process_directory(&dir, &output_dir, &options)
        .with_context(|| format!("processing {}", dir.display()))?;

    if output.json {
        output.print_json(&report)?;
        return Ok(());
    }

    for entry in &report.entries {
        match entry {
            BatchEntry::Ok(done) => print_report(done, &output),
            BatchEntry::Failed { source, error } => {
                output.error(&format!("skipped {}: {error}", source.display()));
            }
        }
    }

    output.detail(&format!(
        "{} processed, {} skipped, output in {}",
        report.succeeded(),
        report.failed(),
        report.output_dir.display()
    ));

    Ok(())
}

fn print_report(report: &RelinkReport, output: &OutputConfig) {
    let source = report.source.display();
    output.detail(&format!("{source}: manifest {}", report.manifest));

    match &report.cover {
        CoverStatus::Relinked {
            old_href,
            new_href,
            asset,
        } => {
            output.status(&format!(
                "Updated {} in {source}: cover reference {old_href} -> {new_href}",
                report.manifest
            ));
            if *asset == AssetStatus::Renamed {
                output.status(&format!("Renamed cover image {old_href} -> {new_href}"));
            }
            if report.cover_page_links > 0 {
                output.detail(&format!(
                    "  rewrote {} cover page link(s)",
                    report.cover_page_links
                ));
            }
        }
        CoverStatus::NameTaken { old_href, new_href } => {
            output.detail(&format!("  kept {old_href}, {new_href} is taken"));
        }
        CoverStatus::NoCoverItem => {
            output.warn(&format!(
                "no cover image item in {} of {source}; copied unchanged",
                report.manifest
            ));
        }
    }

    for warning in &report.warnings {
        output.warn(warning);
    }

    output.status(&format!("Created {}", report.output.display()));
}
