//! Structural package types
//!
//! A [`StructuralPackage`] is the plain description of one message schema
//! handed over by the domain-model side: a name, a target namespace and the
//! type definitions that make up the message.

use serde::{Deserialize, Serialize};

/// XML Schema builtin types a field or enumeration may reference
pub const BUILTIN_TYPES: &[&str] = &[
    "string",
    "normalizedString",
    "token",
    "boolean",
    "decimal",
    "integer",
    "int",
    "long",
    "short",
    "byte",
    "nonNegativeInteger",
    "positiveInteger",
    "float",
    "double",
    "date",
    "time",
    "dateTime",
    "duration",
    "base64Binary",
    "hexBinary",
    "anyURI",
];

/// Extension used for schema documents, also the context's document type tag
pub const SCHEMA_EXTENSION: &str = "xsd";

/// One message schema to convert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralPackage {
    /// Package name (e.g., "ORDERS"), used for the schema file name
    pub name: String,
    /// Target namespace URI
    pub namespace: String,
    /// Namespace prefix used inside the schema document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Package-level documentation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    /// Nested type definitions, in declaration order
    #[serde(default)]
    pub types: Vec<TypeDefinition>,
}

impl StructuralPackage {
    /// Create an empty package
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            prefix: None,
            documentation: None,
            types: Vec::new(),
        }
    }

    /// Add a type definition
    pub fn with_type(mut self, definition: TypeDefinition) -> Self {
        self.types.push(definition);
        self
    }

    /// Set the namespace prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set the documentation
    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    /// Namespace prefix, defaulting to the lower-cased package name
    pub fn prefix(&self) -> String {
        match &self.prefix {
            Some(prefix) => prefix.clone(),
            None => self.name.to_lowercase(),
        }
    }

    /// File name of the generated schema (e.g., "ORDERS.xsd")
    pub fn schema_file_name(&self) -> String {
        format!("{}.{}", self.name, SCHEMA_EXTENSION)
    }

    /// Look up a type definition by name
    pub fn get_type(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.iter().find(|t| t.name == name)
    }
}

/// A named type inside a package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    /// Type name
    pub name: String,
    /// Documentation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    /// Whether the type is also exposed as a global element
    #[serde(default)]
    pub root: bool,
    /// Record or enumeration content
    #[serde(flatten)]
    pub content: TypeContent,
}

/// Content model of a type definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeContent {
    /// A record with an ordered sequence of fields
    Record {
        #[serde(default)]
        fields: Vec<FieldDefinition>,
    },
    /// A restriction of a builtin type to a fixed set of values
    Enumeration {
        #[serde(default = "default_enumeration_base")]
        base: String,
        values: Vec<String>,
    },
}

impl TypeDefinition {
    /// Create a record type
    pub fn record(name: impl Into<String>, fields: Vec<FieldDefinition>) -> Self {
        Self {
            name: name.into(),
            documentation: None,
            root: false,
            content: TypeContent::Record { fields },
        }
    }

    /// Create a string enumeration
    pub fn enumeration<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            documentation: None,
            root: false,
            content: TypeContent::Enumeration {
                base: default_enumeration_base(),
                values: values.into_iter().map(Into::into).collect(),
            },
        }
    }

    /// Expose this type as a global element
    pub fn as_root(mut self) -> Self {
        self.root = true;
        self
    }

    /// Set the documentation
    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }
}

/// A field of a record type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field (element) name
    pub name: String,
    /// Builtin type name (optionally "xsd:"-prefixed) or a type of the same package
    #[serde(rename = "type")]
    pub type_ref: String,
    /// Minimum occurrences
    #[serde(default = "default_min_occurs")]
    pub min_occurs: u32,
    /// Maximum occurrences; `None` means unbounded
    #[serde(default = "default_max_occurs")]
    pub max_occurs: Option<u32>,
    /// Documentation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

impl FieldDefinition {
    /// Create a mandatory, single-valued field
    pub fn new(name: impl Into<String>, type_ref: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_ref: type_ref.into(),
            min_occurs: default_min_occurs(),
            max_occurs: default_max_occurs(),
            documentation: None,
        }
    }

    /// Make the field optional
    pub fn optional(mut self) -> Self {
        self.min_occurs = 0;
        self
    }

    /// Allow the field to repeat up to `max` times
    pub fn repeated(mut self, max: u32) -> Self {
        self.max_occurs = Some(max);
        self
    }

    /// Allow the field to repeat without limit
    pub fn unbounded(mut self) -> Self {
        self.max_occurs = None;
        self
    }

    /// Set the documentation
    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }
}

/// Resolve a builtin type reference, accepting an optional "xsd:" prefix
pub fn builtin_type(type_ref: &str) -> Option<&'static str> {
    let local = type_ref.strip_prefix("xsd:").unwrap_or(type_ref);
    BUILTIN_TYPES.iter().copied().find(|b| *b == local)
}

fn default_min_occurs() -> u32 {
    1
}

fn default_max_occurs() -> Option<u32> {
    Some(1)
}

fn default_enumeration_base() -> String {
    "string".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_defaults_to_lowercase_name() {
        let pkg = StructuralPackage::new("ORDERS", "urn:orders");
        assert_eq!(pkg.prefix(), "orders");
        assert_eq!(pkg.with_prefix("ord").prefix(), "ord");
    }

    #[test]
    fn test_schema_file_name() {
        let pkg = StructuralPackage::new("INVOIC", "urn:invoic");
        assert_eq!(pkg.schema_file_name(), "INVOIC.xsd");
    }

    #[test]
    fn test_builtin_resolution() {
        assert_eq!(builtin_type("string"), Some("string"));
        assert_eq!(builtin_type("xsd:dateTime"), Some("dateTime"));
        assert_eq!(builtin_type("Party"), None);
    }

    #[test]
    fn test_deserialize_package_json() {
        let json = serde_json::json!({
            "name": "ORDERS",
            "namespace": "urn:orders",
            "types": [
                {
                    "name": "Order",
                    "kind": "record",
                    "root": true,
                    "fields": [
                        { "name": "id", "type": "string" },
                        { "name": "line", "type": "Line", "min_occurs": 0, "max_occurs": null }
                    ]
                },
                { "name": "Status", "kind": "enumeration", "values": ["open", "closed"] }
            ]
        });

        let pkg: StructuralPackage = serde_json::from_value(json).unwrap();
        assert_eq!(pkg.types.len(), 2);

        let order = pkg.get_type("Order").unwrap();
        assert!(order.root);
        match &order.content {
            TypeContent::Record { fields } => {
                assert_eq!(fields[0].min_occurs, 1);
                assert_eq!(fields[0].max_occurs, Some(1));
                assert_eq!(fields[1].min_occurs, 0);
                assert_eq!(fields[1].max_occurs, None);
            }
            other => panic!("Expected Record, got {:?}", other),
        }

        match &pkg.get_type("Status").unwrap().content {
            TypeContent::Enumeration { base, values } => {
                assert_eq!(base, "string");
                assert_eq!(values.len(), 2);
            }
            other => panic!("Expected Enumeration, got {:?}", other),
        }
    }
}
