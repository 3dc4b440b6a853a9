//! Slide segmentation.

use super::SlideRecord;
use super::line::{Line, classify, first_heading};

/// Split a markdown deck into slides.
///
/// Slides are separated by lines consisting of exactly `---`. Adjacent
/// separators produce empty slides; they keep their index and count toward
/// the deck total, so the number of slides is always the number of separator
/// lines plus one.
///
/// # Limitations
///
/// Separator recognition does not know about fenced code or quoted blocks. A
/// `---` line inside a code fence ends the slide just like any other
/// separator, and there is no way to escape it.
///
/// # Examples
///
/// ```
/// use slidepack::deck::segment;
///
/// let slides = segment("# A\nbody\n---\n## B\ntext");
/// assert_eq!(slides.len(), 2);
/// assert_eq!(slides[0].title(), Some("A"));
/// assert_eq!(slides[1].raw_content(), "## B\ntext");
/// ```
pub fn segment(markdown: &str) -> Vec<SlideRecord> {
    let mut slides = Vec::new();
    let mut body: Vec<&str> = Vec::new();

    for line in markdown.lines() {
        match classify(line) {
            Line::Separator => {
                push_slide(&mut slides, &body);
                body.clear();
            }
            Line::Heading { .. } | Line::Content(_) => body.push(line),
        }
    }
    push_slide(&mut slides, &body);

    slides
}

fn push_slide(slides: &mut Vec<SlideRecord>, body: &[&str]) {
    let index = slides.len();
    let raw_content = body.join("\n");
    let title = first_heading(&raw_content).map(|(_, text)| text.to_string());

    if raw_content.trim().is_empty() {
        tracing::debug!(index, "empty slide counts toward deck total");
    }

    slides.push(SlideRecord::new(index, raw_content, title));
}
