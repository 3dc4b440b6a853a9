//! Course packaging.
//!
//! Turns a markdown deck into a SCORM 1.2 content package: one
//! `imsmanifest.xml` and one self-contained HTML document, both at the root
//! of a ZIP archive.
//!
//! # Example
//!
//! ```no_run
//! use slidepack::export::{PackageConfig, ScormExporter};
//! use std::fs::File;
//!
//! let config = PackageConfig::default().with_course_title("Onboarding");
//! let mut file = File::create("course.zip")?;
//! ScormExporter::new()
//!     .with_config(config)
//!     .export("# Welcome\n---\n## Next steps", &mut file)?;
//! # Ok::<(), slidepack::Error>(())
//! ```

use std::io::{Cursor, Seek, Write};
use std::path::PathBuf;

use crate::deck::{build_toc, render_sidebar, segment};
use crate::error::Result;

mod archive;
mod document;
mod manifest;

pub use archive::{ScratchArea, archive_relative, write_archive};
pub use document::{DocumentParts, RUNTIME_SCRIPT, render_document};
pub use manifest::{MANIFEST_FILE, ManifestDescriptor, validate_manifest};

/// File name offered to clients downloading a package.
pub const PACKAGE_FILE_NAME: &str = "scorm_package.zip";

/// Configuration for package export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageConfig {
    /// Course title, used for the organization and the document title.
    pub course_title: String,
    /// Title of the single item.
    pub item_title: String,
    pub course_id: String,
    pub org_id: String,
    pub item_id: String,
    pub resource_id: String,
    /// Archive-relative path of the content document.
    pub document_name: String,
    /// Compression level for deflate (0-9, default 6).
    pub compression_level: Option<u32>,
    /// Directory the scratch area is created in (system temp dir if unset).
    pub scratch_root: Option<PathBuf>,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            course_title: "Your Course Title".to_string(),
            item_title: "Lesson 1".to_string(),
            course_id: "CourseID".to_string(),
            org_id: "ORG1".to_string(),
            item_id: "ITEM1".to_string(),
            resource_id: "RES1".to_string(),
            document_name: "index.html".to_string(),
            compression_level: None,
            scratch_root: None,
        }
    }
}

impl PackageConfig {
    pub fn with_course_title(mut self, title: impl Into<String>) -> Self {
        self.course_title = title.into();
        self
    }

    pub fn with_item_title(mut self, title: impl Into<String>) -> Self {
        self.item_title = title.into();
        self
    }

    pub fn with_document_name(mut self, name: impl Into<String>) -> Self {
        self.document_name = name.into();
        self
    }

    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = Some(level.min(9));
        self
    }

    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }
}

/// SCORM 1.2 package exporter.
#[derive(Debug, Clone, Default)]
pub struct ScormExporter {
    config: PackageConfig,
}

impl ScormExporter {
    /// Create a new exporter with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the exporter with custom settings.
    pub fn with_config(mut self, config: PackageConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PackageConfig {
        &self.config
    }

    /// Package `markdown` and write the archive to `writer`.
    ///
    /// Nothing is written unless the whole package was built.
    pub fn export<W: Write>(&self, markdown: &str, writer: &mut W) -> Result<()> {
        let archive = self.export_to_vec(markdown)?;
        writer.write_all(&archive)?;
        Ok(())
    }

    /// Package `markdown` into an in-memory archive.
    pub fn export_to_vec(&self, markdown: &str) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        let entries = self.package_into(markdown, &mut buffer)?;

        let archive = buffer.into_inner();
        tracing::info!(entries, bytes = archive.len(), "built course package");
        Ok(archive)
    }

    /// Build the package and zip it into `sink`. Returns the entry count.
    ///
    /// The scratch area is removed on every path out of this function.
    fn package_into<W: Write + Seek>(&self, markdown: &str, sink: W) -> Result<usize> {
        let descriptor = ManifestDescriptor::from_config(&self.config);
        archive_relative(&descriptor.href)?;

        // 1. Parse the deck
        let slides = segment(markdown);
        let toc = build_toc(&slides);
        tracing::debug!(slides = slides.len(), toc_entries = toc.len(), "parsed deck");

        // 2. Render the content document
        let sidebar = render_sidebar(&toc);
        let document = render_document(&DocumentParts {
            title: &self.config.course_title,
            sidebar: &sidebar,
            markdown,
            script: RUNTIME_SCRIPT,
        })?;

        // 3. Build and check the manifest
        let manifest = descriptor.render();
        validate_manifest(&manifest, &descriptor.href)?;

        // 4. Stage both files and zip them from the scratch root
        let scratch = match &self.config.scratch_root {
            Some(root) => ScratchArea::new_in(root)?,
            None => ScratchArea::new()?,
        };
        scratch.write(MANIFEST_FILE, manifest.as_bytes())?;
        scratch.write(&descriptor.href, document.as_bytes())?;

        let entries = write_archive(scratch.path(), sink, self.config.compression_level)?;
        scratch.close()?;
        Ok(entries.len())
    }
}
