//! Slide deck parsing.
//!
//! A deck is plain markdown in which slides are separated by `---` lines.
//! This module turns the raw text into indexed [`SlideRecord`]s and derives
//! the sidebar table of contents from their headings:
//!
//! - [`line`]: the line grammar (separator, heading, content)
//! - [`segment`]: splitting a deck into slides
//! - [`toc`]: table of contents and sidebar markup

pub mod line;
mod segment;
mod toc;

pub use segment::segment;
pub use toc::{TocEntry, build_toc, render_sidebar};

/// A single slide of a deck.
///
/// Slide records are produced by [`segment`] and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideRecord {
    index: usize,
    raw_content: String,
    title: Option<String>,
}

impl SlideRecord {
    pub(crate) fn new(index: usize, raw_content: String, title: Option<String>) -> Self {
        Self {
            index,
            raw_content,
            title,
        }
    }

    /// 0-based position of the slide in the deck.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Markdown body of the slide, without separators.
    pub fn raw_content(&self) -> &str {
        &self.raw_content
    }

    /// Text of the first heading on the slide, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// True if the slide has no visible content.
    pub fn is_empty(&self) -> bool {
        self.raw_content.trim().is_empty()
    }
}
