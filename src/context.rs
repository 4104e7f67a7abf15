//! Conversion context
//!
//! A [`ConversionContext`] is the isolated workspace for one conversion: it
//! maps document type tags to serializers and holds the documents created
//! during that conversion, keyed by file name. Contexts are never shared;
//! the converter creates one per package and drops it once the document has
//! been written.

use std::collections::HashMap;
use std::io::Write;

use crate::error::{BundleError, Result};
use crate::package::StructuralPackage;
use crate::schema::{transform, SchemaDocument};
use crate::xsd::{XsdOptions, XsdSerializer};

/// Turns a schema document into bytes of one document type
pub trait DocumentSerializer {
    /// Document type tag, matched against the extension of the conversion key
    fn document_type(&self) -> &'static str;

    /// Write the document to `out`
    fn serialize(&self, document: &SchemaDocument, out: &mut dyn Write) -> Result<()>;
}

/// Per-conversion registry of serializers and created documents
#[derive(Default)]
pub struct ConversionContext {
    serializers: HashMap<String, Box<dyn DocumentSerializer>>,
    documents: HashMap<String, SchemaDocument>,
}

impl ConversionContext {
    /// Create an empty context with no serializers
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with the XSD serializer registered
    pub fn xsd(options: XsdOptions) -> Self {
        let mut context = Self::new();
        context.register(Box::new(XsdSerializer::new(options)));
        context
    }

    /// Register a serializer under its document type, replacing any previous one
    pub fn register(&mut self, serializer: Box<dyn DocumentSerializer>) {
        self.serializers
            .insert(serializer.document_type().to_string(), serializer);
    }

    /// Whether a serializer is registered for a document type
    pub fn supports(&self, document_type: &str) -> bool {
        self.serializers.contains_key(document_type)
    }

    /// Transform a package and keep the resulting document under its conversion key.
    ///
    /// Returns the key. A second document for the same key is rejected
    /// rather than overwriting the first.
    pub fn create_document(&mut self, package: &StructuralPackage) -> Result<String> {
        let key = package.schema_file_name();
        if self.documents.contains_key(&key) {
            return Err(BundleError::DuplicateSchema { key });
        }
        let document = transform(package)?;
        self.documents.insert(key.clone(), document);
        Ok(key)
    }

    /// Get a created document
    pub fn document(&self, key: &str) -> Option<&SchemaDocument> {
        self.documents.get(key)
    }

    /// Serialize a created document with the serializer matching its key's extension.
    ///
    /// Writer failures come back as [`BundleError::Serialize`] for the key.
    pub fn save(&self, key: &str, out: &mut dyn Write) -> Result<()> {
        let document = self
            .documents
            .get(key)
            .ok_or_else(|| BundleError::DocumentNotFound(key.to_string()))?;

        let document_type = key.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
        let serializer = self
            .serializers
            .get(document_type)
            .ok_or_else(|| BundleError::UnknownDocumentType(document_type.to_string()))?;

        serializer
            .serialize(document, out)
            .map_err(|e| match e {
                BundleError::Io(e) => BundleError::Serialize {
                    key: key.to_string(),
                    reason: e.to_string(),
                },
                BundleError::Xml(e) => BundleError::Serialize {
                    key: key.to_string(),
                    reason: e.to_string(),
                },
                other => other,
            })
    }

    /// Serialize a created document into a byte vector
    pub fn save_to_vec(&self, key: &str) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.save(key, &mut out)?;
        Ok(out)
    }

    /// Number of documents held
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
