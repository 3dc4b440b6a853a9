//! SCORM 1.2 `imsmanifest.xml` generation.

use quick_xml::Reader;
use quick_xml::events::Event;

use super::PackageConfig;
use crate::error::{Error, Result};
use crate::util::escape_xml;

/// Name of the manifest file at the archive root.
pub const MANIFEST_FILE: &str = "imsmanifest.xml";

/// Identifiers and titles of a single-SCO package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestDescriptor {
    pub course_id: String,
    pub org_id: String,
    pub item_id: String,
    pub resource_id: String,
    pub course_title: String,
    pub item_title: String,
    /// Archive-root-relative path of the content document.
    pub href: String,
}

impl ManifestDescriptor {
    pub fn from_config(config: &PackageConfig) -> Self {
        Self {
            course_id: config.course_id.clone(),
            org_id: config.org_id.clone(),
            item_id: config.item_id.clone(),
            resource_id: config.resource_id.clone(),
            course_title: config.course_title.clone(),
            item_title: config.item_title.clone(),
            href: config.document_name.clone(),
        }
    }

    /// Render the manifest document.
    pub fn render(&self) -> String {
        let mut xml = String::new();

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(&format!(
            concat!(
                r#"<manifest identifier="{}" version="1.0" "#,
                r#"xmlns="http://www.imsproject.org/xsd/imscp_rootv1p1p2" "#,
                r#"xmlns:adlcp="http://www.adlnet.org/xsd/adlcp_rootv1p2" "#,
                r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" "#,
                r#"xsi:schemaLocation="http://www.imsproject.org/xsd/imscp_rootv1p1p2 ims_xml.xsd "#,
                r#"http://www.adlnet.org/xsd/adlcp_rootv1p2 adlcp_rootv1p2.xsd">"#,
                "\n"
            ),
            escape_xml(&self.course_id)
        ));

        xml.push_str("  <metadata>\n");
        xml.push_str("    <schema>ADL SCORM</schema>\n");
        xml.push_str("    <schemaversion>1.2</schemaversion>\n");
        xml.push_str("  </metadata>\n");

        xml.push_str(&format!(
            "  <organizations default=\"{}\">\n",
            escape_xml(&self.org_id)
        ));
        xml.push_str(&format!(
            "    <organization identifier=\"{}\">\n",
            escape_xml(&self.org_id)
        ));
        xml.push_str(&format!(
            "      <title>{}</title>\n",
            escape_xml(&self.course_title)
        ));
        xml.push_str(&format!(
            "      <item identifier=\"{}\" identifierref=\"{}\">\n",
            escape_xml(&self.item_id),
            escape_xml(&self.resource_id)
        ));
        xml.push_str(&format!(
            "        <title>{}</title>\n",
            escape_xml(&self.item_title)
        ));
        xml.push_str("      </item>\n");
        xml.push_str("    </organization>\n");
        xml.push_str("  </organizations>\n");

        xml.push_str("  <resources>\n");
        xml.push_str(&format!(
            "    <resource identifier=\"{}\" type=\"webcontent\" adlcp:scormtype=\"sco\" href=\"{}\">\n",
            escape_xml(&self.resource_id),
            escape_xml(&self.href)
        ));
        xml.push_str(&format!(
            "      <file href=\"{}\"/>\n",
            escape_xml(&self.href)
        ));
        xml.push_str("    </resource>\n");
        xml.push_str("  </resources>\n");
        xml.push_str("</manifest>\n");

        xml
    }
}

/// Check that a rendered manifest is well-formed and declares exactly one
/// organization, item and resource, with the resource pointing at `href`.
pub fn validate_manifest(xml: &str, href: &str) -> Result<()> {
    let mut reader = Reader::from_str(xml);
    let expected_href = escape_xml(href);

    let mut depth = 0usize;
    let mut organizations = 0;
    let mut items = 0;
    let mut resources = 0;
    let mut resource_href = None;

    loop {
        let (element, opens) = match reader.read_event()? {
            Event::Start(e) => (e, true),
            Event::Empty(e) => (e, false),
            Event::End(_) => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    Error::InvalidManifest("unbalanced closing tag".to_string())
                })?;
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };
        if opens {
            depth += 1;
        }

        match element.name().as_ref() {
            b"organization" => organizations += 1,
            b"item" => items += 1,
            b"resource" => {
                resources += 1;
                for attr in element.attributes() {
                    let attr = attr.map_err(quick_xml::Error::from)?;
                    if attr.key.as_ref() == b"href" {
                        resource_href = Some(String::from_utf8_lossy(&attr.value).into_owned());
                    }
                }
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(Error::InvalidManifest("unclosed element".to_string()));
    }
    if (organizations, items, resources) != (1, 1, 1) {
        return Err(Error::InvalidManifest(format!(
            "expected one organization, item and resource; found {organizations}, {items}, {resources}"
        )));
    }
    match resource_href {
        Some(found) if found == expected_href => Ok(()),
        Some(found) => Err(Error::InvalidManifest(format!(
            "resource href {found:?} does not match content document {href:?}"
        ))),
        None => Err(Error::InvalidManifest("resource has no href".to_string())),
    }
}
