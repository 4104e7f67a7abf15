//! Configuration management for schema bundling
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (schema-bundle.toml)
//! - Environment variables (SCHEMA_BUNDLE__*)
//!
//! ## Example config file (schema-bundle.toml):
//! ```toml
//! [bundle]
//! id = "acme.edi.schemas"
//! path_prefix = "schemas"
//! fragment_host = "org.eclipse.wst.xml.core"
//!
//! [conversion]
//! order = "namespace"
//! indent = 2
//!
//! [output]
//! directory = "target/bundles"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{BundleError, Result};
use crate::xsd::XsdOptions;

static SYMBOLIC_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_\-]+(\.[A-Za-z0-9_\-]+)*$").unwrap());

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BundleConfig {
    /// Bundle settings
    #[serde(default)]
    pub bundle: BundleSettings,

    /// Conversion settings
    #[serde(default)]
    pub conversion: ConversionSettings,

    /// Output settings
    #[serde(default)]
    pub output: OutputSettings,
}

/// Bundle identity and layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleSettings {
    /// Bundle symbolic name (e.g., "acme.edi.schemas")
    #[serde(default)]
    pub id: Option<String>,

    /// Directory inside the archive holding the schemas
    #[serde(default = "default_path_prefix")]
    pub path_prefix: String,

    /// Host bundle of the generated fragment
    #[serde(default = "default_fragment_host")]
    pub fragment_host: String,
}

/// How packages are converted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionSettings {
    /// Package processing order
    #[serde(default)]
    pub order: PackageOrder,

    /// XSD indentation (0 = compact)
    #[serde(default = "default_indent")]
    pub indent: usize,
}

/// Order in which packages are converted and listed in the manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PackageOrder {
    /// Sorted by namespace, then name; manifests are reproducible
    #[default]
    Namespace,
    /// As supplied by the caller
    Input,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Directory archives are written to
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,
}

// Default value functions
fn default_path_prefix() -> String {
    "schemas".to_string()
}

fn default_fragment_host() -> String {
    "org.eclipse.wst.xml.core".to_string()
}

fn default_indent() -> usize {
    2
}

fn default_output_directory() -> PathBuf {
    PathBuf::from(".")
}

impl Default for BundleSettings {
    fn default() -> Self {
        Self {
            id: None,
            path_prefix: default_path_prefix(),
            fragment_host: default_fragment_host(),
        }
    }
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            order: PackageOrder::default(),
            indent: default_indent(),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

impl ConversionSettings {
    /// Serializer options derived from these settings
    pub fn xsd_options(&self) -> XsdOptions {
        XsdOptions { indent: self.indent }
    }
}

impl BundleConfig {
    /// Load configuration from default locations
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["schema-bundle.toml", ".schema-bundle.toml", "config/schema-bundle.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "schema-bundle") {
            let xdg_config = config_dir.config_dir().join("schema-bundle.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Environment variables (SCHEMA_BUNDLE__*)
        builder = builder.add_source(
            Environment::with_prefix("SCHEMA_BUNDLE")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Get the output directory (resolves relative paths)
    pub fn output_directory(&self) -> PathBuf {
        if self.output.directory.is_absolute() {
            self.output.directory.clone()
        } else {
            std::env::current_dir()
                .unwrap_or_default()
                .join(&self.output.directory)
        }
    }
}

/// Check that a bundle identifier is a dotted symbolic name
pub fn validate_bundle_id(bundle_id: &str) -> Result<()> {
    if bundle_id.is_empty() {
        return Err(BundleError::Config("bundle id must not be empty".to_string()));
    }
    if !SYMBOLIC_NAME.is_match(bundle_id) {
        return Err(BundleError::Config(format!(
            "bundle id '{}' is not a valid symbolic name",
            bundle_id
        )));
    }
    Ok(())
}

/// Normalize an archive path prefix.
///
/// Surrounding slashes are trimmed; the prefix must be relative and free of
/// `.`/`..` and empty segments. An empty prefix places schemas at the root.
pub fn normalize_path_prefix(prefix: &str) -> Result<String> {
    if prefix.starts_with('/') || prefix.contains('\\') {
        return Err(BundleError::Config(format!(
            "path prefix '{}' must be a relative archive path",
            prefix
        )));
    }

    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(String::new());
    }

    for segment in trimmed.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return Err(BundleError::Config(format!(
                "path prefix '{}' contains an invalid segment",
                prefix
            )));
        }
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BundleConfig::default();
        assert_eq!(config.bundle.path_prefix, "schemas");
        assert_eq!(config.bundle.fragment_host, "org.eclipse.wst.xml.core");
        assert_eq!(config.conversion.order, PackageOrder::Namespace);
        assert_eq!(config.conversion.xsd_options().indent, 2);
    }

    #[test]
    fn test_serialize_config() {
        let config = BundleConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[bundle]"));
        assert!(toml_str.contains("[conversion]"));
        assert!(toml_str.contains("order = \"namespace\""));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.toml");
        std::fs::write(
            &path,
            "[bundle]\nid = \"acme.edi\"\npath_prefix = \"xsd\"\n\n[conversion]\norder = \"input\"\n",
        )
        .unwrap();

        let config = BundleConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.bundle.id.as_deref(), Some("acme.edi"));
        assert_eq!(config.bundle.path_prefix, "xsd");
        assert_eq!(config.conversion.order, PackageOrder::Input);
        assert_eq!(config.conversion.indent, 2);
    }

    #[test]
    fn test_bundle_id_validation() {
        assert!(validate_bundle_id("acme.edi").is_ok());
        assert!(validate_bundle_id("demo").is_ok());
        assert!(validate_bundle_id("org.smooks-edi_d96a").is_ok());

        for bad in ["", "acme..edi", ".acme", "acme edi", "acme/edi"] {
            assert!(
                matches!(validate_bundle_id(bad), Err(BundleError::Config(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_path_prefix_normalization() {
        assert_eq!(normalize_path_prefix("schemas").unwrap(), "schemas");
        assert_eq!(normalize_path_prefix("schemas/").unwrap(), "schemas");
        assert_eq!(normalize_path_prefix("a/b").unwrap(), "a/b");
        assert_eq!(normalize_path_prefix("").unwrap(), "");

        for bad in ["/abs", "a//b", "../up", "a/./b", "a\\b"] {
            assert!(
                matches!(normalize_path_prefix(bad), Err(BundleError::Config(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }
}
