//! Line grammar for slide decks.
//!
//! Every input line is exactly one of:
//!
//! - **separator**: the line is `---` and nothing else
//! - **heading**: one or two `#` markers at the start of the line, then
//!   whitespace, then non-empty text
//! - **content**: anything else
//!
//! Classification is context-free. A `---` line inside a fenced code block is
//! still a separator; there is no escape for it.

/// The slide separator line.
pub const SEPARATOR: &str = "---";

/// Deepest heading level that names a slide.
pub const MAX_HEADING_LEVEL: u8 = 2;

/// A classified input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    Separator,
    Heading { level: u8, text: &'a str },
    Content(&'a str),
}

/// Classify a single line (without its trailing newline).
pub fn classify(line: &str) -> Line<'_> {
    let line = line.strip_suffix('\r').unwrap_or(line);

    if line == SEPARATOR {
        return Line::Separator;
    }

    let markers = line.bytes().take_while(|&b| b == b'#').count();
    if (1..=MAX_HEADING_LEVEL as usize).contains(&markers) {
        let rest = &line[markers..];
        if rest.starts_with(char::is_whitespace) {
            let text = rest.trim();
            if !text.is_empty() {
                return Line::Heading {
                    level: markers as u8,
                    text,
                };
            }
        }
    }

    Line::Content(line)
}

/// Find the first heading in a block of text, scanning top to bottom.
pub fn first_heading(text: &str) -> Option<(u8, &str)> {
    text.lines().find_map(|line| match classify(line) {
        Line::Heading { level, text } => Some((level, text)),
        _ => None,
    })
}
