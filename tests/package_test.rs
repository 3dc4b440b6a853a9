//! End-to-end packaging tests: markdown in, SCORM archive out.

use std::collections::HashSet;
use std::io::{Cursor, Read};

use slidepack::export::{MANIFEST_FILE, PackageConfig, ScormExporter, validate_manifest};
use tempfile::NamedTempFile;
use zip::ZipArchive;

const DECK: &str = "# Welcome\n\nType your **Markdown** here.\n\n---\n\n## Slide 2\n\n- one\n- two\n\n---\n\nno heading on this one";

fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
    let mut contents = String::new();
    archive
        .by_name(name)
        .unwrap_or_else(|_| panic!("missing entry {name}"))
        .read_to_string(&mut contents)
        .expect("entry is UTF-8");
    contents
}

fn open(bytes: Vec<u8>) -> ZipArchive<Cursor<Vec<u8>>> {
    ZipArchive::new(Cursor::new(bytes)).expect("valid zip")
}

#[test]
fn test_archive_contains_exactly_manifest_and_document() {
    let bytes = ScormExporter::new().export_to_vec(DECK).unwrap();
    let archive = open(bytes);

    let names: HashSet<_> = archive.file_names().map(str::to_string).collect();
    let expected: HashSet<_> = ["imsmanifest.xml", "index.html"]
        .into_iter()
        .map(str::to_string)
        .collect();
    assert_eq!(names, expected);
}

#[test]
fn test_entries_are_archive_root_relative() {
    let archive = open(ScormExporter::new().export_to_vec(DECK).unwrap());
    for name in archive.file_names() {
        assert!(!name.starts_with('/'), "{name} is absolute");
        assert!(!name.contains('\\'), "{name} has a backslash");
        assert!(!name.contains(".."), "{name} escapes the root");
        assert!(!name.contains("tmp"), "{name} leaks a scratch path");
    }
}

#[test]
fn test_manifest_href_matches_document() {
    let mut archive = open(ScormExporter::new().export_to_vec(DECK).unwrap());
    let manifest = read_entry(&mut archive, MANIFEST_FILE);

    validate_manifest(&manifest, "index.html").unwrap();
    assert!(manifest.contains(r#"href="index.html""#));
    assert!(archive.by_name("index.html").is_ok());
}

#[test]
fn test_custom_document_name() {
    let config = PackageConfig::default().with_document_name("course.html");
    let mut archive = open(
        ScormExporter::new()
            .with_config(config)
            .export_to_vec(DECK)
            .unwrap(),
    );
    let manifest = read_entry(&mut archive, MANIFEST_FILE);

    validate_manifest(&manifest, "course.html").unwrap();
    assert!(archive.by_name("course.html").is_ok());
    assert_eq!(archive.len(), 2);
}

#[test]
fn test_document_embeds_sidebar_markdown_and_runtime() {
    let mut archive = open(ScormExporter::new().export_to_vec(DECK).unwrap());
    let html = read_entry(&mut archive, "index.html");

    assert!(html.contains(r#"data-index="0">Welcome</a>"#));
    assert!(html.contains(r#"data-index="1">Slide 2</a>"#));
    assert!(!html.contains(r#"data-index="2""#));
    assert!(html.contains("Type your **Markdown** here."));
    assert!(html.contains("LMSInitialize"));
    assert!(html.contains("cmi.suspend_data"));
}

#[test]
fn test_titles_flow_into_manifest_and_document() {
    let config = PackageConfig::default()
        .with_course_title("Fire Safety")
        .with_item_title("Module 1");
    let mut archive = open(
        ScormExporter::new()
            .with_config(config)
            .export_to_vec(DECK)
            .unwrap(),
    );

    let manifest = read_entry(&mut archive, MANIFEST_FILE);
    assert!(manifest.contains("<title>Fire Safety</title>"));
    assert!(manifest.contains("<title>Module 1</title>"));
    let html = read_entry(&mut archive, "index.html");
    assert!(html.contains("<title>Fire Safety</title>"));
}

#[test]
fn test_packaging_is_deterministic() {
    let exporter = ScormExporter::new();
    assert_eq!(
        exporter.export_to_vec(DECK).unwrap(),
        exporter.export_to_vec(DECK).unwrap()
    );
}

#[test]
fn test_empty_deck_still_packages() {
    let archive = open(ScormExporter::new().export_to_vec("").unwrap());
    assert_eq!(archive.len(), 2);
}

#[test]
fn test_export_to_file() {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    ScormExporter::new().export(DECK, file.as_file_mut()).unwrap();

    let bytes = std::fs::read(file.path()).unwrap();
    assert_eq!(open(bytes).len(), 2);
}

#[test]
fn test_failed_export_writes_nothing() {
    let config = PackageConfig::default().with_document_name("../index.html");
    let mut out = Vec::new();
    assert!(
        ScormExporter::new()
            .with_config(config)
            .export(DECK, &mut out)
            .is_err()
    );
    assert!(out.is_empty());
}

#[test]
fn test_failure_while_staging_reclaims_scratch() {
    let scratch_root = tempfile::tempdir().unwrap();
    // The manifest occupies the name the document's directory would need.
    let config = PackageConfig::default()
        .with_document_name("imsmanifest.xml/index.html")
        .with_scratch_root(scratch_root.path());

    let mut out = Vec::new();
    let err = ScormExporter::new()
        .with_config(config)
        .export(DECK, &mut out)
        .unwrap_err();

    assert!(matches!(err, slidepack::Error::Io(_)), "{err}");
    assert!(out.is_empty());
    assert_eq!(std::fs::read_dir(scratch_root.path()).unwrap().count(), 0);
}
