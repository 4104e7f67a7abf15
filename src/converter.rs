//! Schema converter
//!
//! [`SchemaConverter`] drives the schema transform over a set of packages and
//! assembles the results into an [`Archive`] together with the catalog
//! manifest. It holds no mutable state: every call builds its own archive,
//! and every package is converted in its own [`ConversionContext`], which is
//! dropped as soon as the document has been serialized.
//!
//! A package that fails to convert is logged and skipped. A naming collision
//! between two packages aborts the whole run.

use std::io::Write;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::archive::{Archive, DEFAULT_FRAGMENT_HOST};
use crate::catalog::{self, CatalogEntry, FRAGMENT_XML_ENTRY};
use crate::config::{normalize_path_prefix, validate_bundle_id, BundleConfig, PackageOrder};
use crate::context::ConversionContext;
use crate::error::{BundleError, Result};
use crate::package::StructuralPackage;
use crate::version::{BundleVersion, Clock, SystemClock};
use crate::xsd::XsdOptions;

/// Converter settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterOptions {
    /// Package processing order
    pub order: PackageOrder,
    /// XSD formatting
    pub xsd: XsdOptions,
    /// Host bundle written to the jar descriptor
    pub fragment_host: String,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            order: PackageOrder::default(),
            xsd: XsdOptions::default(),
            fragment_host: DEFAULT_FRAGMENT_HOST.to_string(),
        }
    }
}

impl From<&BundleConfig> for ConverterOptions {
    fn from(config: &BundleConfig) -> Self {
        Self {
            order: config.conversion.order,
            xsd: config.conversion.xsd_options(),
            fragment_host: config.bundle.fragment_host.clone(),
        }
    }
}

/// A package left out of the archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedPackage {
    pub name: String,
    pub namespace: String,
    /// Rendered failure cause
    pub reason: String,
}

/// Outcome of an archive run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyReport {
    /// Catalog entries of converted packages, in processing order
    pub converted: Vec<CatalogEntry>,
    /// Packages that failed to convert
    pub skipped: Vec<SkippedPackage>,
}

impl AssemblyReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Converts structural packages to XML Schema and bundles them
pub struct SchemaConverter {
    options: ConverterOptions,
    clock: Box<dyn Clock>,
}

impl Default for SchemaConverter {
    fn default() -> Self {
        Self::new(ConverterOptions::default())
    }
}

impl SchemaConverter {
    /// Create a converter using the system clock
    pub fn new(options: ConverterOptions) -> Self {
        Self {
            options,
            clock: Box::new(SystemClock),
        }
    }

    /// Replace the clock used for version qualifiers
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn options(&self) -> &ConverterOptions {
        &self.options
    }

    /// Convert all packages into an archive.
    ///
    /// Fails with a configuration error for an invalid bundle id or path
    /// prefix, with [`BundleError::DuplicateEntry`] when two packages map to
    /// the same archive path, and with I/O errors from the container.
    pub fn create_archive(
        &self,
        packages: &[StructuralPackage],
        bundle_id: &str,
        path_prefix: &str,
    ) -> Result<Archive> {
        self.create_archive_with_report(packages, bundle_id, path_prefix)
            .map(|(archive, _)| archive)
    }

    /// Convert all packages into an archive and report what was skipped
    pub fn create_archive_with_report(
        &self,
        packages: &[StructuralPackage],
        bundle_id: &str,
        path_prefix: &str,
    ) -> Result<(Archive, AssemblyReport)> {
        validate_bundle_id(bundle_id)?;
        let prefix = normalize_path_prefix(path_prefix)?;

        let version = BundleVersion::now(self.clock.as_ref());
        let mut archive =
            Archive::new(bundle_id, version).with_fragment_host(self.options.fragment_host.clone());
        let mut report = AssemblyReport::default();

        info!(archive = %archive.name(), packages = packages.len(), "Creating archive");

        let mut ordered: Vec<&StructuralPackage> = packages.iter().collect();
        if self.options.order == PackageOrder::Namespace {
            ordered.sort_by(|a, b| (&a.namespace, &a.name).cmp(&(&b.namespace, &b.name)));
        }

        for package in ordered {
            debug!(package = %package.name, "Schema generation start");
            let start = Instant::now();

            let converted = {
                let mut context = ConversionContext::xsd(self.options.xsd);
                self.add_schema(&mut context, &mut archive, package, &prefix)
            };

            let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
            match converted {
                Ok(entry) => {
                    info!(package = %package.name, namespace = %entry.namespace, path = %entry.path, elapsed_ms, "Schema generated");
                    report.converted.push(entry);
                }
                Err(err) if err.is_package_local() => {
                    warn!(package = %package.name, namespace = %package.namespace, elapsed_ms, error = %err, "Skipping package");
                    report.skipped.push(SkippedPackage {
                        name: package.name.clone(),
                        namespace: package.namespace.clone(),
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        let manifest = catalog::render(&report.converted, bundle_id)?;
        archive.add_entry(FRAGMENT_XML_ENTRY, manifest)?;

        info!(
            archive = %archive.name(),
            converted = report.converted.len(),
            skipped = report.skipped.len(),
            "Archive created"
        );

        Ok((archive, report))
    }

    /// Transform one package, check its path and write it into the archive
    fn add_schema(
        &self,
        context: &mut ConversionContext,
        archive: &mut Archive,
        package: &StructuralPackage,
        prefix: &str,
    ) -> Result<CatalogEntry> {
        let key = context.create_document(package)?;
        let entry_path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}/{}", prefix, key)
        };
        if archive.contains_entry(&entry_path) {
            return Err(BundleError::DuplicateEntry { path: entry_path });
        }

        let namespace = context
            .document(&key)
            .map(|doc| doc.target_namespace.clone())
            .ok_or_else(|| BundleError::DocumentNotFound(key.clone()))?;
        let bytes = context.save_to_vec(&key)?;
        archive.add_entry(entry_path.as_str(), bytes)?;

        Ok(CatalogEntry::new(namespace, entry_path))
    }

    /// Convert a single package and write the schema to `out`
    pub fn convert(&self, package: &StructuralPackage, out: &mut dyn Write) -> Result<()> {
        let start = Instant::now();
        let mut context = ConversionContext::xsd(self.options.xsd);
        let key = context.create_document(package)?;
        context.save(&key, out)?;
        debug!(
            package = %package.name,
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Schema converted"
        );
        Ok(())
    }

    /// Convert a single package into schema bytes
    pub fn convert_to_vec(&self, package: &StructuralPackage) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.convert(package, &mut out)?;
        Ok(out)
    }
}
