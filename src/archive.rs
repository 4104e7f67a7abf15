//! Archive container
//!
//! An [`Archive`] is the in-memory bundle built by the converter: an ordered
//! set of entries with unique paths. It is written out as a jar whose first
//! entry is the OSGi bundle descriptor, generated from the archive's
//! identity at write time.

use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};

use chrono::{Datelike, Timelike};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::checksum::Checksum;
use crate::error::{BundleError, Result};
use crate::version::BundleVersion;

/// Path of the bundle descriptor inside the jar
pub const DESCRIPTOR_ENTRY: &str = "META-INF/MANIFEST.MF";

/// Default host bundle for catalog fragments
pub const DEFAULT_FRAGMENT_HOST: &str = "org.eclipse.wst.xml.core";

/// A single file in the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Archive-relative path
    pub path: String,
    /// Raw content
    pub content: Vec<u8>,
    /// SHA256 of the content, computed on insertion
    pub checksum: Checksum,
}

/// A named, versioned bundle of entries
#[derive(Debug, Clone)]
pub struct Archive {
    bundle_id: String,
    version: BundleVersion,
    fragment_host: String,
    entries: Vec<ArchiveEntry>,
    index: HashMap<String, usize>,
}

impl Archive {
    /// Create an empty archive
    pub fn new(bundle_id: impl Into<String>, version: BundleVersion) -> Self {
        Self {
            bundle_id: bundle_id.into(),
            version,
            fragment_host: DEFAULT_FRAGMENT_HOST.to_string(),
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Set the host bundle written to the descriptor
    pub fn with_fragment_host(mut self, host: impl Into<String>) -> Self {
        self.fragment_host = host.into();
        self
    }

    /// Archive file name (e.g., "acme.edi_1.0.0.v20240301-1015.jar")
    pub fn name(&self) -> String {
        self.version.archive_name(&self.bundle_id)
    }

    pub fn bundle_id(&self) -> &str {
        &self.bundle_id
    }

    pub fn version(&self) -> &BundleVersion {
        &self.version
    }

    pub fn fragment_host(&self) -> &str {
        &self.fragment_host
    }

    /// Add an entry; paths must be unique
    pub fn add_entry(&mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Result<()> {
        let path = path.into();
        if self.index.contains_key(&path) {
            return Err(BundleError::DuplicateEntry { path });
        }
        let content = content.into();
        let checksum = Checksum::from_bytes(&content);
        self.index.insert(path.clone(), self.entries.len());
        self.entries.push(ArchiveEntry {
            path,
            content,
            checksum,
        });
        Ok(())
    }

    pub fn contains_entry(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// Get an entry by path
    pub fn entry(&self, path: &str) -> Option<&ArchiveEntry> {
        self.index.get(path).map(|&i| &self.entries[i])
    }

    /// All entries, in insertion order
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// All entry paths, in insertion order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.path.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Verify every entry against its checksum
    pub fn verify(&self) -> bool {
        self.entries.iter().all(|e| e.checksum.verify(&e.content))
    }

    /// OSGi bundle descriptor (META-INF/MANIFEST.MF)
    pub fn descriptor(&self) -> String {
        let lines = [
            "Manifest-Version: 1.0".to_string(),
            "Bundle-ManifestVersion: 2".to_string(),
            format!("Bundle-Name: {}", self.bundle_id),
            format!("Bundle-SymbolicName: {};singleton:=true", self.bundle_id),
            format!("Bundle-Version: {}", self.version),
            format!("Fragment-Host: {}", self.fragment_host),
        ];
        let mut descriptor = lines.join("\r\n");
        descriptor.push_str("\r\n\r\n");
        descriptor
    }

    /// Write the archive as a jar.
    ///
    /// Every entry is stamped with the version timestamp so the same archive
    /// always produces the same bytes.
    pub fn write_jar<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let timestamp = self.version.timestamp;
        let modified = zip::DateTime::from_date_and_time(
            u16::try_from(timestamp.year()).unwrap_or(1980),
            timestamp.month() as u8,
            timestamp.day() as u8,
            timestamp.hour() as u8,
            timestamp.minute() as u8,
            timestamp.second() as u8,
        )
        .unwrap_or_default();
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(modified);

        let mut zip = ZipWriter::new(writer);
        zip.start_file(DESCRIPTOR_ENTRY, options)?;
        zip.write_all(self.descriptor().as_bytes())?;

        for entry in &self.entries {
            zip.start_file(entry.path.as_str(), options)?;
            zip.write_all(&entry.content)?;
        }

        Ok(zip.finish()?)
    }

    /// Write the archive as jar bytes
    pub fn to_jar_bytes(&self) -> Result<Vec<u8>> {
        let cursor = self.write_jar(Cursor::new(Vec::new()))?;
        Ok(cursor.into_inner())
    }

    /// Write the jar into a directory under its archive name
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(self.name());
        let file = fs::File::create(&path)?;
        self.write_jar(file)?;
        Ok(path)
    }
}

/// Read every file of a jar, in stored order
pub fn read_jar_entries<R: Read + Seek>(reader: R) -> Result<Vec<(String, Vec<u8>)>> {
    let mut jar = ZipArchive::new(reader)?;
    let mut entries = Vec::with_capacity(jar.len());
    for i in 0..jar.len() {
        let mut file = jar.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        entries.push((file.name().to_string(), content));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn version() -> BundleVersion {
        BundleVersion::from_timestamp(
            NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(10, 15, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_archive_name() {
        let archive = Archive::new("acme.edi", version());
        assert_eq!(archive.name(), "acme.edi_1.0.0.v20240301-1015.jar");
    }

    #[test]
    fn test_duplicate_entry_rejected() {
        let mut archive = Archive::new("demo", version());
        archive.add_entry("schemas/A.xsd", "a").unwrap();

        match archive.add_entry("schemas/A.xsd", "b") {
            Err(BundleError::DuplicateEntry { path }) => assert_eq!(path, "schemas/A.xsd"),
            other => panic!("Expected DuplicateEntry, got {:?}", other),
        }
        assert_eq!(archive.entry("schemas/A.xsd").unwrap().content, b"a");
        assert_eq!(archive.len(), 1);
    }

    #[test]
    fn test_entries_keep_insertion_order() {
        let mut archive = Archive::new("demo", version());
        archive.add_entry("b", "2").unwrap();
        archive.add_entry("a", "1").unwrap();
        assert_eq!(archive.paths().collect::<Vec<_>>(), vec!["b", "a"]);
        assert!(archive.verify());
    }

    #[test]
    fn test_descriptor() {
        let archive = Archive::new("demo", version()).with_fragment_host("org.example.host");
        let descriptor = archive.descriptor();
        assert!(descriptor.contains("Bundle-SymbolicName: demo;singleton:=true\r\n"));
        assert!(descriptor.contains("Bundle-Version: 1.0.0.v20240301-1015\r\n"));
        assert!(descriptor.contains("Fragment-Host: org.example.host\r\n"));
    }

    #[test]
    fn test_jar_roundtrip_and_reproducibility() {
        let mut archive = Archive::new("demo", version());
        archive.add_entry("schemas/A.xsd", "<a/>").unwrap();
        archive.add_entry("fragment.xml", "<plugin/>").unwrap();

        let bytes = archive.to_jar_bytes().unwrap();
        let entries = read_jar_entries(Cursor::new(bytes.clone())).unwrap();
        let names: Vec<_> = entries.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec![DESCRIPTOR_ENTRY, "schemas/A.xsd", "fragment.xml"]);
        assert_eq!(entries[1].1, b"<a/>");

        assert_eq!(bytes, archive.to_jar_bytes().unwrap());
    }

    #[test]
    fn test_save_writes_named_jar() {
        let dir = tempfile::tempdir().unwrap();
        let mut archive = Archive::new("demo", version());
        archive.add_entry("fragment.xml", "<plugin/>").unwrap();

        let path = archive.save(dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "demo_1.0.0.v20240301-1015.jar");
        assert!(path.exists());
    }
}
