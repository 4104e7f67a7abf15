//! Schema Fragments
//!
//! Converts structural message packages into XML Schema documents and bundles
//! them into an installable catalog fragment.
//!
//! ## Features
//!
//! - **Schema Transform**: one package in, one XSD document out, no shared state
//! - **Isolated Contexts**: every conversion gets its own serializer registry
//! - **Partial Failure**: a package that cannot be converted is logged and skipped
//! - **Catalog Manifest**: namespaces are mapped to `platform:/fragment/...` URIs
//! - **Versioned Archives**: `{bundle}_1.0.0.v{YYYYMMDD-HHMM}.jar`
//!
//! ## Archive Layout
//!
//! ```text
//! acme.edi_1.0.0.v20240301-1015.jar
//! ├── META-INF/MANIFEST.MF
//! ├── schemas/
//! │   ├── ORDERS.xsd
//! │   └── INVOIC.xsd
//! └── fragment.xml
//! ```

pub mod archive;
pub mod catalog;
pub mod checksum;
pub mod config;
pub mod context;
pub mod converter;
pub mod error;
pub mod loader;
pub mod package;
pub mod schema;
pub mod version;
pub mod xsd;

pub use archive::{Archive, ArchiveEntry};
pub use catalog::{CatalogEntry, FRAGMENT_XML_ENTRY};
pub use checksum::Checksum;
pub use config::{BundleConfig, PackageOrder};
pub use context::{ConversionContext, DocumentSerializer};
pub use converter::{AssemblyReport, ConverterOptions, SchemaConverter, SkippedPackage};
pub use error::{BundleError, Result, TransformCause};
pub use package::{FieldDefinition, StructuralPackage, TypeContent, TypeDefinition};
pub use schema::{transform, SchemaDocument};
pub use version::{BundleVersion, Clock, FixedClock, SystemClock};
pub use xsd::{XsdOptions, XsdSerializer};
