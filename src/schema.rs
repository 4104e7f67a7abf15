//! Schema transform
//!
//! Turns a [`StructuralPackage`] into an in-memory [`SchemaDocument`]. The
//! transform is pure: it validates the package, resolves every type
//! reference and builds the declarations the XSD serializer writes out.
//! Running it twice on the same package yields equal documents.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{BundleError, Result, TransformCause};
use crate::package::{builtin_type, FieldDefinition, StructuralPackage, TypeContent};

/// XML Schema namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// Prefix bound to [`XSD_NAMESPACE`] in generated documents
pub const XSD_PREFIX: &str = "xsd";

static NCNAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$").unwrap());

/// Check that a name is usable as an XML NCName
pub fn is_ncname(name: &str) -> bool {
    NCNAME.is_match(name)
}

/// Schema document produced from one package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    /// Name of the source package
    pub package: String,
    /// Target namespace (always the package namespace)
    pub target_namespace: String,
    /// Prefix bound to the target namespace
    pub prefix: String,
    pub documentation: Option<String>,
    /// Global element declarations
    pub elements: Vec<ElementDecl>,
    pub complex_types: Vec<ComplexTypeDecl>,
    pub simple_types: Vec<SimpleTypeDecl>,
}

impl SchemaDocument {
    /// True when the document declares nothing
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.complex_types.is_empty() && self.simple_types.is_empty()
    }
}

/// An element declaration, global or inside a sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementDecl {
    pub name: String,
    /// Qualified type name (e.g., "xsd:string" or "orders:Party")
    pub type_name: String,
    pub min_occurs: u32,
    /// `None` means unbounded
    pub max_occurs: Option<u32>,
    pub documentation: Option<String>,
}

/// A complex type with a sequence content model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexTypeDecl {
    pub name: String,
    pub documentation: Option<String>,
    pub sequence: Vec<ElementDecl>,
}

/// A simple type restricting a builtin to enumerated values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleTypeDecl {
    pub name: String,
    pub documentation: Option<String>,
    /// Qualified base type (e.g., "xsd:string")
    pub base: String,
    pub values: Vec<String>,
}

/// Transform a structural package into a schema document
pub fn transform(package: &StructuralPackage) -> Result<SchemaDocument> {
    let fail = |cause| BundleError::transform(&package.name, &package.namespace, cause);

    if package.name.trim().is_empty() {
        return Err(fail(TransformCause::EmptyName));
    }
    if package.namespace.trim().is_empty() {
        return Err(fail(TransformCause::EmptyNamespace));
    }
    if !is_ncname(&package.name) {
        return Err(fail(TransformCause::InvalidName(package.name.clone())));
    }

    let prefix = package.prefix();
    if !is_ncname(&prefix)
        || prefix.eq_ignore_ascii_case(XSD_PREFIX)
        || matches!(prefix.as_str(), "xml" | "xmlns")
    {
        return Err(fail(TransformCause::InvalidName(prefix)));
    }

    // First pass: collect local type names
    let mut local_types = HashSet::new();
    for definition in &package.types {
        if !is_ncname(&definition.name) {
            return Err(fail(TransformCause::InvalidName(definition.name.clone())));
        }
        // Unqualified references resolve to builtins first
        if builtin_type(&definition.name).is_some() {
            return Err(fail(TransformCause::ReservedTypeName(definition.name.clone())));
        }
        if !local_types.insert(definition.name.as_str()) {
            return Err(fail(TransformCause::DuplicateType(definition.name.clone())));
        }
    }

    let mut document = SchemaDocument {
        package: package.name.clone(),
        target_namespace: package.namespace.clone(),
        prefix: prefix.clone(),
        documentation: package.documentation.clone(),
        elements: Vec::new(),
        complex_types: Vec::new(),
        simple_types: Vec::new(),
    };

    for definition in &package.types {
        let qualified = format!("{}:{}", prefix, definition.name);

        match &definition.content {
            TypeContent::Record { fields } => {
                let mut seen = HashSet::new();
                let mut sequence = Vec::with_capacity(fields.len());
                for field in fields {
                    if !seen.insert(field.name.as_str()) {
                        return Err(fail(TransformCause::DuplicateField {
                            owner: definition.name.clone(),
                            field: field.name.clone(),
                        }));
                    }
                    let element = field_element(&definition.name, field, &prefix, &local_types)
                        .map_err(fail)?;
                    sequence.push(element);
                }
                document.complex_types.push(ComplexTypeDecl {
                    name: definition.name.clone(),
                    documentation: definition.documentation.clone(),
                    sequence,
                });
            }
            TypeContent::Enumeration { base, values } => {
                if values.is_empty() {
                    return Err(fail(TransformCause::EmptyEnumeration(definition.name.clone())));
                }
                let builtin = builtin_type(base).ok_or_else(|| {
                    fail(TransformCause::InvalidEnumerationBase {
                        name: definition.name.clone(),
                        base: base.clone(),
                    })
                })?;
                document.simple_types.push(SimpleTypeDecl {
                    name: definition.name.clone(),
                    documentation: definition.documentation.clone(),
                    base: format!("{}:{}", XSD_PREFIX, builtin),
                    values: values.clone(),
                });
            }
        }

        if definition.root {
            document.elements.push(ElementDecl {
                name: definition.name.clone(),
                type_name: qualified,
                min_occurs: 1,
                max_occurs: Some(1),
                documentation: None,
            });
        }
    }

    Ok(document)
}

fn field_element(
    owner: &str,
    field: &FieldDefinition,
    prefix: &str,
    local_types: &HashSet<&str>,
) -> std::result::Result<ElementDecl, TransformCause> {
    if !is_ncname(&field.name) {
        return Err(TransformCause::InvalidName(field.name.clone()));
    }

    let type_name = if let Some(builtin) = builtin_type(&field.type_ref) {
        format!("{}:{}", XSD_PREFIX, builtin)
    } else if local_types.contains(field.type_ref.as_str()) {
        format!("{}:{}", prefix, field.type_ref)
    } else {
        return Err(TransformCause::UnresolvedType {
            owner: owner.to_string(),
            field: field.name.clone(),
            target: field.type_ref.clone(),
        });
    };

    if let Some(max) = field.max_occurs {
        if max < field.min_occurs {
            return Err(TransformCause::InvalidOccurs {
                owner: owner.to_string(),
                field: field.name.clone(),
                min: field.min_occurs,
                max,
            });
        }
    }

    Ok(ElementDecl {
        name: field.name.clone(),
        type_name,
        min_occurs: field.min_occurs,
        max_occurs: field.max_occurs,
        documentation: field.documentation.clone(),
    })
}
