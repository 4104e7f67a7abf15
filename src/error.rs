//! Error types for schema conversion and archive assembly

use thiserror::Error;

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, BundleError>;

/// Conversion and packaging errors
#[derive(Error, Debug)]
pub enum BundleError {
    #[error("Failed to generate schema for {package} ({namespace}): {cause}")]
    Transform {
        package: String,
        namespace: String,
        cause: TransformCause,
    },

    #[error("Duplicate schema {key}")]
    DuplicateSchema { key: String },

    #[error("Duplicate entry {path}")]
    DuplicateEntry { path: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("No serializer registered for document type '{0}'")]
    UnknownDocumentType(String),

    #[error("Schema document not found: {0}")]
    DocumentNotFound(String),

    #[error("Failed to serialize {key}: {reason}")]
    Serialize { key: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl BundleError {
    /// Build a transform failure for a package
    pub fn transform(
        package: impl Into<String>,
        namespace: impl Into<String>,
        cause: TransformCause,
    ) -> Self {
        BundleError::Transform {
            package: package.into(),
            namespace: namespace.into(),
            cause,
        }
    }

    /// Whether this error only affects the package being converted.
    ///
    /// The assembler skips such packages and keeps going; anything else
    /// aborts the run.
    pub fn is_package_local(&self) -> bool {
        matches!(
            self,
            BundleError::Transform { .. }
                | BundleError::DuplicateSchema { .. }
                | BundleError::Serialize { .. }
        )
    }
}

/// Why a structural package could not be turned into a schema document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformCause {
    #[error("package name is empty")]
    EmptyName,

    #[error("namespace URI is empty")]
    EmptyNamespace,

    #[error("'{0}' is not a valid XML name")]
    InvalidName(String),

    #[error("type '{0}' has the name of an XSD builtin")]
    ReservedTypeName(String),

    #[error("type '{0}' is defined more than once")]
    DuplicateType(String),

    #[error("field '{field}' is declared more than once in '{owner}'")]
    DuplicateField { owner: String, field: String },

    #[error("field '{field}' of '{owner}' references unknown type '{target}'")]
    UnresolvedType {
        owner: String,
        field: String,
        target: String,
    },

    #[error("field '{field}' of '{owner}' has maxOccurs {max} below minOccurs {min}")]
    InvalidOccurs {
        owner: String,
        field: String,
        min: u32,
        max: u32,
    },

    #[error("enumeration '{0}' has no values")]
    EmptyEnumeration(String),

    #[error("enumeration '{name}' restricts '{base}', which is not a builtin type")]
    InvalidEnumerationBase { name: String, base: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_local_classification() {
        let transform = BundleError::transform("A", "urn:a", TransformCause::EmptyName);
        assert!(transform.is_package_local());
        assert!(BundleError::DuplicateSchema { key: "A.xsd".into() }.is_package_local());
        assert!(BundleError::Serialize { key: "A.xsd".into(), reason: "closed".into() }.is_package_local());

        assert!(!BundleError::DuplicateEntry { path: "s/A.xsd".into() }.is_package_local());
        assert!(!BundleError::Config("bad".into()).is_package_local());
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert!(!BundleError::Io(io).is_package_local());
    }

    #[test]
    fn test_transform_message_names_package() {
        let err = BundleError::transform("ORDERS", "urn:orders", TransformCause::EmptyEnumeration("Code".into()));
        let message = err.to_string();
        assert!(message.contains("ORDERS"));
        assert!(message.contains("urn:orders"));
        assert!(message.contains("Code"));
    }
}
