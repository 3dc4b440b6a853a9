//! The delivered HTML document.
//!
//! Everything the course needs at delivery time is inlined: the sidebar, the
//! raw markdown (rendered in the browser by reveal.js), and the runtime
//! script that drives navigation locking and LMS tracking.

use crate::error::{Error, Result};
use crate::util::escape_xml;

/// Runtime script embedded in every package.
pub const RUNTIME_SCRIPT: &str = include_str!("runtime.js");

const TEMPLATE: &str = include_str!("template.html");

const TITLE_SLOT: &str = "{{ title }}";
const RUNTIME_SLOT: &str = "{{ runtime }}";
const SIDEBAR_SLOT: &str = "{{ sidebar }}";
const MARKDOWN_SLOT: &str = "{{ markdown }}";

/// Inputs of [`render_document`].
#[derive(Debug, Clone, Copy)]
pub struct DocumentParts<'a> {
    pub title: &'a str,
    /// Pre-rendered sidebar markup, inserted verbatim.
    pub sidebar: &'a str,
    /// Raw deck markdown.
    pub markdown: &'a str,
    /// Runtime script, inserted verbatim into a `<script>` element.
    pub script: &'a str,
}

/// Render the course document.
///
/// The markdown is escaped so it can never terminate the `<textarea>` it
/// lives in; the browser hands the unescaped text to the markdown plugin.
pub fn render_document(parts: &DocumentParts<'_>) -> Result<String> {
    if parts.script.contains("</script") {
        return Err(Error::Template(
            "runtime script must not contain a closing script tag".to_string(),
        ));
    }

    let title = escape_xml(parts.title);
    let markdown = escape_xml(parts.markdown);
    let slots: [(&str, &str); 4] = [
        (TITLE_SLOT, &title),
        (RUNTIME_SLOT, parts.script),
        (SIDEBAR_SLOT, parts.sidebar),
        (MARKDOWN_SLOT, &markdown),
    ];

    // Single left-to-right pass so inserted content is never rescanned.
    let mut html = String::with_capacity(TEMPLATE.len() + parts.markdown.len() + parts.script.len());
    let mut rest = TEMPLATE;
    let mut filled = [false; 4];
    while let Some((pos, slot)) = slots
        .iter()
        .enumerate()
        .filter_map(|(i, (name, _))| rest.find(name).map(|pos| (pos, i)))
        .min()
    {
        let (name, value) = slots[slot];
        html.push_str(&rest[..pos]);
        html.push_str(value);
        rest = &rest[pos + name.len()..];
        filled[slot] = true;
    }
    html.push_str(rest);

    if let Some(missing) = filled.iter().position(|&f| !f) {
        return Err(Error::Template(format!(
            "template has no {} slot",
            slots[missing].0
        )));
    }
    Ok(html)
}
