//! XSD serializer
//!
//! Writes a [`SchemaDocument`] as an XML Schema 1.0 document using
//! `quick-xml`. Output only depends on the document and the options, so the
//! same document always serializes to the same bytes.

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde::{Deserialize, Serialize};

use crate::context::DocumentSerializer;
use crate::error::Result;
use crate::package::SCHEMA_EXTENSION;
use crate::schema::{ElementDecl, SchemaDocument, XSD_NAMESPACE, XSD_PREFIX};

/// Formatting options for the XSD serializer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XsdOptions {
    /// Spaces per nesting level; 0 writes everything on one line
    pub indent: usize,
}

impl Default for XsdOptions {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

/// Serializer registered under the "xsd" document type
#[derive(Debug, Clone, Default)]
pub struct XsdSerializer {
    options: XsdOptions,
}

impl XsdSerializer {
    pub fn new(options: XsdOptions) -> Self {
        Self { options }
    }
}

impl DocumentSerializer for XsdSerializer {
    fn document_type(&self) -> &'static str {
        SCHEMA_EXTENSION
    }

    fn serialize(&self, document: &SchemaDocument, out: &mut dyn Write) -> Result<()> {
        let mut writer = if self.options.indent == 0 {
            Writer::new(out)
        } else {
            Writer::new_with_indent(out, b' ', self.options.indent)
        };
        write_schema(&mut writer, document)?;
        writer.get_mut().write_all(b"\n")?;
        Ok(())
    }
}

fn q(local: &str) -> String {
    format!("{}:{}", XSD_PREFIX, local)
}

fn write_schema<W: Write>(writer: &mut Writer<W>, document: &SchemaDocument) -> Result<()> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let schema_tag = q("schema");
    let xmlns_xsd = format!("xmlns:{}", XSD_PREFIX);
    let xmlns_target = format!("xmlns:{}", document.prefix);
    let mut root = BytesStart::new(schema_tag.as_str());
    root.push_attribute((xmlns_xsd.as_str(), XSD_NAMESPACE));
    root.push_attribute((xmlns_target.as_str(), document.target_namespace.as_str()));
    root.push_attribute(("targetNamespace", document.target_namespace.as_str()));
    root.push_attribute(("elementFormDefault", "qualified"));

    if document.is_empty() && document.documentation.is_none() {
        writer.write_event(Event::Empty(root))?;
        return Ok(());
    }

    writer.write_event(Event::Start(root))?;
    write_documentation(writer, document.documentation.as_deref())?;

    for element in &document.elements {
        write_element(writer, element)?;
    }

    for complex in &document.complex_types {
        let tag = q("complexType");
        let mut start = BytesStart::new(tag.as_str());
        start.push_attribute(("name", complex.name.as_str()));

        if complex.sequence.is_empty() && complex.documentation.is_none() {
            writer.write_event(Event::Empty(start))?;
            continue;
        }

        writer.write_event(Event::Start(start))?;
        write_documentation(writer, complex.documentation.as_deref())?;
        if !complex.sequence.is_empty() {
            let sequence = q("sequence");
            writer.write_event(Event::Start(BytesStart::new(sequence.as_str())))?;
            for element in &complex.sequence {
                write_element(writer, element)?;
            }
            writer.write_event(Event::End(BytesEnd::new(sequence.as_str())))?;
        }
        writer.write_event(Event::End(BytesEnd::new(tag.as_str())))?;
    }

    for simple in &document.simple_types {
        let tag = q("simpleType");
        let restriction = q("restriction");
        let enumeration = q("enumeration");

        let mut start = BytesStart::new(tag.as_str());
        start.push_attribute(("name", simple.name.as_str()));
        writer.write_event(Event::Start(start))?;
        write_documentation(writer, simple.documentation.as_deref())?;

        let mut restriction_start = BytesStart::new(restriction.as_str());
        restriction_start.push_attribute(("base", simple.base.as_str()));
        writer.write_event(Event::Start(restriction_start))?;
        for value in &simple.values {
            let mut facet = BytesStart::new(enumeration.as_str());
            facet.push_attribute(("value", value.as_str()));
            writer.write_event(Event::Empty(facet))?;
        }
        writer.write_event(Event::End(BytesEnd::new(restriction.as_str())))?;
        writer.write_event(Event::End(BytesEnd::new(tag.as_str())))?;
    }

    writer.write_event(Event::End(BytesEnd::new(schema_tag.as_str())))?;
    Ok(())
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &ElementDecl) -> Result<()> {
    let tag = q("element");
    let min = element.min_occurs.to_string();
    let max = match element.max_occurs {
        Some(max) => max.to_string(),
        None => "unbounded".to_string(),
    };

    let mut start = BytesStart::new(tag.as_str());
    start.push_attribute(("name", element.name.as_str()));
    start.push_attribute(("type", element.type_name.as_str()));
    if element.min_occurs != 1 {
        start.push_attribute(("minOccurs", min.as_str()));
    }
    if element.max_occurs != Some(1) {
        start.push_attribute(("maxOccurs", max.as_str()));
    }

    match element.documentation.as_deref() {
        None => writer.write_event(Event::Empty(start))?,
        Some(text) => {
            writer.write_event(Event::Start(start))?;
            write_documentation(writer, Some(text))?;
            writer.write_event(Event::End(BytesEnd::new(tag.as_str())))?;
        }
    }
    Ok(())
}

fn write_documentation<W: Write>(writer: &mut Writer<W>, text: Option<&str>) -> Result<()> {
    let Some(text) = text else {
        return Ok(());
    };
    let annotation = q("annotation");
    let documentation = q("documentation");
    writer.write_event(Event::Start(BytesStart::new(annotation.as_str())))?;
    writer.write_event(Event::Start(BytesStart::new(documentation.as_str())))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(documentation.as_str())))?;
    writer.write_event(Event::End(BytesEnd::new(annotation.as_str())))?;
    Ok(())
}

/// Read the `targetNamespace` declared on the root `schema` element
pub fn read_target_namespace(xml: &[u8]) -> Result<Option<String>> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) => {
                if e.local_name().as_ref() != b"schema" {
                    return Ok(None);
                }
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"targetNamespace" {
                        return Ok(Some(attr.unescape_value()?.into_owned()));
                    }
                }
                return Ok(None);
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
        buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::{FieldDefinition, StructuralPackage, TypeDefinition};
    use crate::schema::transform;

    fn render(pkg: &StructuralPackage, options: XsdOptions) -> String {
        let doc = transform(pkg).unwrap();
        let mut out = Vec::new();
        XsdSerializer::new(options).serialize(&doc, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn invoice() -> StructuralPackage {
        StructuralPackage::new("INVOIC", "urn:edi:invoic")
            .with_documentation("Invoice message")
            .with_type(
                TypeDefinition::record(
                    "Invoice",
                    vec![
                        FieldDefinition::new("number", "string"),
                        FieldDefinition::new("line", "Line").unbounded(),
                        FieldDefinition::new("currency", "Currency").optional(),
                    ],
                )
                .as_root(),
            )
            .with_type(TypeDefinition::record(
                "Line",
                vec![FieldDefinition::new("amount", "decimal").with_documentation("Net & gross")],
            ))
            .with_type(TypeDefinition::enumeration("Currency", ["EUR", "USD"]))
    }

    #[test]
    fn test_schema_header() {
        let xml = render(&invoice(), XsdOptions::default());
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("xmlns:xsd=\"http://www.w3.org/2001/XMLSchema\""));
        assert!(xml.contains("xmlns:invoic=\"urn:edi:invoic\""));
        assert!(xml.contains("targetNamespace=\"urn:edi:invoic\""));
        assert!(xml.contains("elementFormDefault=\"qualified\""));
    }

    #[test]
    fn test_content_model() {
        let xml = render(&invoice(), XsdOptions::default());
        assert!(xml.contains("<xsd:element name=\"Invoice\" type=\"invoic:Invoice\"/>"));
        assert!(xml.contains("<xsd:complexType name=\"Invoice\">"));
        assert!(xml.contains("<xsd:element name=\"line\" type=\"invoic:Line\" maxOccurs=\"unbounded\"/>"));
        assert!(xml.contains("<xsd:element name=\"currency\" type=\"invoic:Currency\" minOccurs=\"0\"/>"));
        assert!(xml.contains("<xsd:restriction base=\"xsd:string\">"));
        assert!(xml.contains("<xsd:enumeration value=\"EUR\"/>"));
        assert!(xml.contains("<xsd:documentation>Net &amp; gross</xsd:documentation>"));
    }

    #[test]
    fn test_empty_package_writes_empty_schema() {
        let xml = render(&StructuralPackage::new("EMPTY", "urn:empty"), XsdOptions::default());
        assert!(xml.contains("<xsd:schema "));
        assert!(xml.trim_end().ends_with("/>"));
        assert!(!xml.contains("complexType"));
    }

    #[test]
    fn test_compact_output_has_no_indentation() {
        let xml = render(&invoice(), XsdOptions { indent: 0 });
        assert!(!xml.contains("\n  <"));
    }

    #[test]
    fn test_read_target_namespace() {
        let xml = render(&invoice(), XsdOptions::default());
        assert_eq!(
            read_target_namespace(xml.as_bytes()).unwrap(),
            Some("urn:edi:invoic".to_string())
        );
        assert_eq!(read_target_namespace(b"<plugin/>").unwrap(), None);
    }

    #[test]
    fn test_serialization_is_stable() {
        assert_eq!(
            render(&invoice(), XsdOptions::default()),
            render(&invoice(), XsdOptions::default())
        );
    }

    #[test]
    fn test_prohibited_field_occurs() {
        let pkg = StructuralPackage::new("OCC", "urn:occ").with_type(TypeDefinition::record(
            "A",
            vec![FieldDefinition::new("unused", "int").optional().repeated(0)],
        ));
        let xml = render(&pkg, XsdOptions::default());
        assert!(xml.contains("<xsd:element name=\"unused\" type=\"xsd:int\" minOccurs=\"0\" maxOccurs=\"0\"/>"));
    }
}
