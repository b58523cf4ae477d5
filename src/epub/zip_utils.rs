use crate::error::{CoverfixError, Result};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub fn open_epub(path: &Path) -> Result<ZipArchive<File>> {
    let file = File::open(path)?;
    let archive = ZipArchive::new(file)?;
    Ok(archive)
}

/// Unpack every entry of the archive at `path` under `dest`.
///
/// Entry names that would land outside `dest` are rejected.
pub fn extract_to(path: &Path, dest: &Path) -> Result<usize> {
    let mut archive = open_epub(path)?;
    let mut files = 0;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let rel = entry.enclosed_name().ok_or_else(|| {
            CoverfixError::InvalidEpub(format!("unsafe entry path: {}", entry.name()))
        })?;
        let target = dest.join(rel);

        if entry.is_dir() {
            std::fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        io::copy(&mut entry, &mut out)?;
        files += 1;
    }

    Ok(files)
}

/// All regular files under `root`, top-down: a directory's own files (by
/// name) come before its subdirectories (by name).
pub fn walk_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk_into(root, &mut files)?;
    Ok(files)
}

fn walk_into(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = std::fs::read_dir(dir)?
        .map(|e| e.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()?;
    entries.sort();

    let (dirs, plain): (Vec<_>, Vec<_>) = entries.into_iter().partition(|p| p.is_dir());
    files.extend(plain);
    for sub in dirs {
        walk_into(&sub, files)?;
    }
    Ok(())
}

/// ZIP entry name of `path` relative to `root`, always `/`-separated.
pub fn entry_name(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Zip every file under `root` into a new archive at `output`.
///
/// `mimetype` goes first and uncompressed; everything else is deflated.
pub fn pack_dir(root: &Path, output: &Path) -> Result<usize> {
    let mut entries: Vec<(String, PathBuf)> = walk_files(root)?
        .into_iter()
        .filter_map(|p| entry_name(root, &p).map(|name| (name, p)))
        .collect();
    if let Some(idx) = entries.iter().position(|(name, _)| name == "mimetype") {
        let mimetype = entries.remove(idx);
        entries.insert(0, mimetype);
    }

    pack_files(&entries, output)?;
    Ok(entries.len())
}

/// Write `(entry name, source file)` pairs, in order, to an archive at `output`.
///
/// The archive is built in `<output>.tmp` and renamed into place; the
/// temporary file is removed if any step fails.
pub(crate) fn pack_files(entries: &[(String, PathBuf)], output: &Path) -> Result<()> {
    let tmp_path = output.with_extension("epub.tmp");
    let written = write_archive(entries, &tmp_path)
        .and_then(|()| std::fs::rename(&tmp_path, output).map_err(Into::into));
    if written.is_err() {
        let _ = std::fs::remove_file(&tmp_path);
    }
    written
}

fn write_archive(entries: &[(String, PathBuf)], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);

    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflate = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, source) in entries {
        let options = if name == "mimetype" { stored } else { deflate };
        zip.start_file(name.as_str(), options)?;
        let mut src = File::open(source)?;
        io::copy(&mut src, &mut zip)?;
    }

    zip.finish()?;
    Ok(())
}
