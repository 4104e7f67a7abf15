//! Catalog manifest generation
//!
//! Renders the `fragment.xml` descriptor that contributes every schema to the
//! XML catalog: one `<uri>` record per converted package, mapping its target
//! namespace to the schema's location inside the bundle.

use quick_xml::events::{BytesDecl, BytesEnd, BytesPI, BytesStart, Event};
use quick_xml::Writer;
use serde::{Deserialize, Serialize};

use crate::config::validate_bundle_id;
use crate::error::Result;

/// Well-known archive path of the manifest
pub const FRAGMENT_XML_ENTRY: &str = "fragment.xml";

/// Extension point receiving catalog contributions
pub const CATALOG_EXTENSION_POINT: &str = "org.eclipse.wst.xml.core.catalogContributions";

/// Namespace-to-location mapping for one schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Target namespace of the schema
    pub namespace: String,
    /// Archive-relative path of the schema
    pub path: String,
}

impl CatalogEntry {
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            path: path.into(),
        }
    }

    /// Platform URI of the schema inside the installed bundle
    pub fn platform_uri(&self, bundle_id: &str) -> String {
        format!("platform:/fragment/{}/{}", bundle_id, self.path)
    }
}

/// Render the manifest for the given entries, in order
pub fn render(entries: &[CatalogEntry], bundle_id: &str) -> Result<String> {
    validate_bundle_id(bundle_id)?;

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::PI(BytesPI::new("eclipse version=\"3.0\"")))?;
    writer.write_event(Event::Start(BytesStart::new("plugin")))?;

    let mut extension = BytesStart::new("extension");
    extension.push_attribute(("point", CATALOG_EXTENSION_POINT));
    writer.write_event(Event::Start(extension))?;
    writer.write_event(Event::Start(BytesStart::new("catalogContribution")))?;

    for entry in entries {
        let uri = entry.platform_uri(bundle_id);
        let mut record = BytesStart::new("uri");
        record.push_attribute(("name", entry.namespace.as_str()));
        record.push_attribute(("uri", uri.as_str()));
        writer.write_event(Event::Empty(record))?;
    }

    writer.write_event(Event::End(BytesEnd::new("catalogContribution")))?;
    writer.write_event(Event::End(BytesEnd::new("extension")))?;
    writer.write_event(Event::End(BytesEnd::new("plugin")))?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
