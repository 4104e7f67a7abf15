//! Package loading
//!
//! Reads structural packages from JSON files, one package per file.

use std::fs;
use std::path::Path;

use crate::error::{BundleError, Result};
use crate::package::StructuralPackage;

/// Load a single package file
pub fn load_package(path: impl AsRef<Path>) -> Result<StructuralPackage> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        BundleError::Config(format!("Failed to parse package {}: {}", path.display(), e))
    })
}

/// Load every `*.json` package below a directory, sorted by path
pub fn load_packages(dir: impl AsRef<Path>) -> Result<Vec<StructuralPackage>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(BundleError::Config(format!(
            "Package directory not found: {}",
            dir.display()
        )));
    }

    let mut paths = Vec::new();
    for entry in walkdir::WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.is_file() && path.extension().map_or(false, |e| e == "json") {
            paths.push(path.to_path_buf());
        }
    }
    paths.sort();

    paths.iter().map(load_package).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_load_packages_sorted() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        write(dir.path(), "b.json", r#"{"name": "B", "namespace": "urn:b"}"#);
        write(&dir.path().join("nested"), "a.json", r#"{"name": "A", "namespace": "urn:a"}"#);
        write(dir.path(), "README.md", "not a package");

        let packages = load_packages(dir.path()).unwrap();
        let names: Vec<_> = packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_malformed_package_names_file() {
        let dir = tempdir().unwrap();
        write(dir.path(), "bad.json", r#"{"name": 1}"#);

        match load_packages(dir.path()) {
            Err(BundleError::Config(msg)) => assert!(msg.contains("bad.json")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_directory() {
        assert!(matches!(
            load_packages("/definitely/not/here"),
            Err(BundleError::Config(_))
        ));
    }
}
