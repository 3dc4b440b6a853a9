//! Scratch staging and ZIP writing.

use std::fs;
use std::io::{Seek, Write};
use std::path::{Component, Path, PathBuf};

use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::{Error, Result};

/// Request-local staging directory for package files.
///
/// The directory and everything in it is removed when the value is dropped,
/// whether packaging succeeded or not.
#[derive(Debug)]
pub struct ScratchArea {
    dir: TempDir,
}

impl ScratchArea {
    pub fn new() -> Result<Self> {
        Self::allocated(tempfile::Builder::new().prefix("slidepack-").tempdir()?)
    }

    /// Allocate the scratch area under `root` instead of the system temp dir.
    pub fn new_in(root: &Path) -> Result<Self> {
        Self::allocated(tempfile::Builder::new().prefix("slidepack-").tempdir_in(root)?)
    }

    fn allocated(dir: TempDir) -> Result<Self> {
        tracing::debug!(path = %dir.path().display(), "allocated scratch area");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file at an archive-relative path inside the scratch area.
    pub fn write(&self, relative: &str, contents: &[u8]) -> Result<PathBuf> {
        let relative = archive_relative(relative)?;
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Remove the scratch area now, reporting any failure.
    pub fn close(self) -> Result<()> {
        self.dir.close()?;
        Ok(())
    }
}

/// Validate that a path stays inside the archive root.
pub fn archive_relative(path: &str) -> Result<&Path> {
    let candidate = Path::new(path);
    let ok = !path.is_empty()
        && candidate
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if ok {
        Ok(candidate)
    } else {
        Err(Error::InvalidManifest(format!(
            "{path:?} is not a relative path inside the package"
        )))
    }
}

/// Zip every file under `root`, naming entries relative to `root`.
///
/// Entries are written in sorted order with a fixed timestamp, so identical
/// inputs give identical archives.
pub fn write_archive<W: Write + Seek>(
    root: &Path,
    writer: W,
    compression_level: Option<u32>,
) -> Result<Vec<String>> {
    let mut files = Vec::new();
    collect_files(root, &mut files)?;
    files.sort();

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(compression_level.unwrap_or(6) as i64))
        .last_modified_time(DateTime::default());

    let mut zip = ZipWriter::new(writer);
    let mut names = Vec::with_capacity(files.len());
    for file in &files {
        let name = entry_name(root, file)?;
        zip.start_file(name.as_str(), options)?;
        zip.write_all(&fs::read(file)?)?;
        names.push(name);
    }
    zip.finish()?;

    Ok(names)
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_files(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

fn entry_name(root: &Path, file: &Path) -> Result<String> {
    let relative = file.strip_prefix(root).map_err(|_| {
        Error::InvalidManifest(format!("{} is outside the scratch area", file.display()))
    })?;
    Ok(relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    #[test]
    fn test_archive_relative() {
        assert!(archive_relative("index.html").is_ok());
        assert!(archive_relative("content/index.html").is_ok());
        assert!(archive_relative("/index.html").is_err());
        assert!(archive_relative("../index.html").is_err());
        assert!(archive_relative("./index.html").is_err());
        assert!(archive_relative("").is_err());
    }

    #[test]
    fn test_entries_are_root_relative() {
        let scratch = ScratchArea::new().unwrap();
        scratch.write("index.html", b"<html></html>").unwrap();
        scratch.write("imsmanifest.xml", b"<manifest/>").unwrap();
        scratch.write("assets/style.css", b"body{}").unwrap();

        let mut buffer = Cursor::new(Vec::new());
        let names = write_archive(scratch.path(), &mut buffer, None).unwrap();
        assert_eq!(names, vec!["assets/style.css", "imsmanifest.xml", "index.html"]);

        let mut archive = ZipArchive::new(Cursor::new(buffer.into_inner())).unwrap();
        assert_eq!(archive.len(), 3);
        let mut html = String::new();
        archive
            .by_name("index.html")
            .unwrap()
            .read_to_string(&mut html)
            .unwrap();
        assert_eq!(html, "<html></html>");
    }

    #[test]
    fn test_archive_is_deterministic() {
        let build = || {
            let scratch = ScratchArea::new().unwrap();
            scratch.write("b.txt", b"b").unwrap();
            scratch.write("a.txt", b"a").unwrap();
            let mut buffer = Cursor::new(Vec::new());
            write_archive(scratch.path(), &mut buffer, Some(9)).unwrap();
            buffer.into_inner()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_scratch_removed_on_drop() {
        let path = {
            let scratch = ScratchArea::new().unwrap();
            scratch.write("index.html", b"x").unwrap();
            scratch.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_scratch_in_root() {
        let root = tempfile::tempdir().unwrap();
        let scratch = ScratchArea::new_in(root.path()).unwrap();
        assert!(scratch.path().starts_with(root.path()));
        scratch.close().unwrap();
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_scratch_rejects_escaping_paths() {
        let scratch = ScratchArea::new().unwrap();
        assert!(scratch.write("../evil.html", b"x").is_err());
    }
}
