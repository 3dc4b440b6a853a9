//! Table of contents for the course sidebar.

use std::fmt::Write;

use serde::Serialize;

use super::SlideRecord;
use super::line::first_heading;
use crate::util::escape_xml;

/// Indent step (in sidebar utility units) applied per heading level below 1.
const INDENT_STEP: u8 = 4;

/// A sidebar entry pointing at a slide.
///
/// Slides without a heading have no entry, so entry positions and slide
/// indices are unrelated; always navigate by [`TocEntry::index`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// Index of the slide this entry navigates to.
    pub index: usize,
    /// Heading level (1 or 2). Only affects indentation.
    pub level: u8,
    /// Heading text.
    pub title: String,
}

impl TocEntry {
    pub fn new(index: usize, level: u8, title: impl Into<String>) -> Self {
        Self {
            index,
            level,
            title: title.into(),
        }
    }

    /// Sidebar indentation for this entry.
    pub fn indent(&self) -> u8 {
        self.level.saturating_sub(1) * INDENT_STEP
    }
}

/// Build the table of contents from the first heading of each slide.
///
/// # Examples
///
/// ```
/// use slidepack::deck::{build_toc, segment, TocEntry};
///
/// let toc = build_toc(&segment("# A\nbody\n---\nno heading\n---\n## C"));
/// assert_eq!(toc, vec![TocEntry::new(0, 1, "A"), TocEntry::new(2, 2, "C")]);
/// ```
pub fn build_toc(slides: &[SlideRecord]) -> Vec<TocEntry> {
    slides
        .iter()
        .filter_map(|slide| {
            first_heading(slide.raw_content())
                .map(|(level, title)| TocEntry::new(slide.index(), level, title))
        })
        .collect()
}

/// Render the sidebar list for the delivered document.
///
/// Each entry links to `#/{index}` and carries a `data-index` attribute the
/// runtime uses to lock and unlock it, plus a `progress-{index}` marker.
pub fn render_sidebar(toc: &[TocEntry]) -> String {
    let mut html = String::from(r#"<ul id="sidebar-list" class="space-y-2">"#);

    for entry in toc {
        let _ = write!(
            html,
            r##"<li class="ml-{indent} flex items-center"><a href="#/{index}" class="text-blue-500 hover:underline flex-1" data-index="{index}">{title}</a><span id="progress-{index}" class="ml-2 text-gray-400">&#9679;</span></li>"##,
            indent = entry.indent(),
            index = entry.index,
            title = escape_xml(&entry.title),
        );
    }

    html.push_str("</ul>");
    html
}
