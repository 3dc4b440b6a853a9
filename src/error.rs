//! Error types for slidepack operations.

use thiserror::Error;

/// Errors that can occur while building a course package.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("No markdown content provided")]
    MissingInput,

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("Template error: {0}")]
    Template(String),
}

pub type Result<T> = std::result::Result<T, Error>;
