//! Manifest file writing and update operations
//!
//! This module provides:
//! - ManifestWriter for applying a requirement to requirements.txt
//! - Dry-run mode support (no actual file modifications)
//! - Creation of the manifest when it does not exist yet

use crate::domain::ManifestChange;
use crate::error::ManifestError;
use crate::manifest::{Requirement, RequirementsFile};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Writer for requirements.txt that applies a single requirement
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestWriter {
    /// Whether to run in dry-run mode (no file modifications)
    dry_run: bool,
}

/// Result of applying a requirement to a manifest file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResult {
    /// Path to the manifest file
    pub path: PathBuf,
    /// What changed in the file
    pub change: ManifestChange,
    /// Whether the file was actually written
    pub file_modified: bool,
    /// The rendered file content
    pub content: String,
}

impl ManifestWriter {
    /// Create a new ManifestWriter
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Create a ManifestWriter in dry-run mode
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }

    /// Check if this writer is in dry-run mode
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Read, update and write back the manifest at `path`
    ///
    /// A missing file is treated as empty and created.
    pub fn apply(&self, path: &Path, requirement: &Requirement) -> Result<WriteResult, ManifestError> {
        let original = match fs::read_to_string(path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(ManifestError::read_error(path, e)),
        };

        let mut file = RequirementsFile::parse(original.as_deref().unwrap_or_default());
        let mut change = file.upsert(requirement);
        if original.is_none() {
            change = ManifestChange::Created;
        }

        // An unchanged requirement leaves the file byte for byte as it was
        let content = match (&change, &original) {
            (ManifestChange::Unchanged, Some(original)) => original.clone(),
            _ => file.render(),
        };
        let needs_write = original.as_deref() != Some(content.as_str());

        let mut file_modified = false;
        if needs_write && !self.dry_run {
            write_manifest(path, &content)?;
            file_modified = true;
        }

        Ok(WriteResult {
            path: path.to_path_buf(),
            change,
            file_modified,
            content,
        })
    }
}

/// Read a manifest file content safely
pub fn read_manifest(path: &Path) -> Result<String, ManifestError> {
    fs::read_to_string(path).map_err(|e| ManifestError::read_error(path, e))
}

/// Write content to a manifest file, creating parent directories as needed
pub fn write_manifest(path: &Path, content: &str) -> Result<(), ManifestError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ManifestError::write_error(path, e))?;
    }
    fs::write(path, content).map_err(|e| ManifestError::write_error(path, e))
}

/// Apply `requirement` to the manifest at `path`
pub fn update_requirements(
    path: &Path,
    requirement: &Requirement,
    dry_run: bool,
) -> Result<WriteResult, ManifestError> {
    ManifestWriter::new(dry_run).apply(path, requirement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn django(version: &str) -> Requirement {
        Requirement::django(version.parse().unwrap())
    }

    fn create_temp_requirements(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("requirements.txt");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_manifest_writer_new() {
        let writer = ManifestWriter::new(false);
        assert!(!writer.is_dry_run());

        let writer = ManifestWriter::new(true);
        assert!(writer.is_dry_run());
    }

    #[test]
    fn test_manifest_writer_dry_run_constructor() {
        let writer = ManifestWriter::dry_run();
        assert!(writer.is_dry_run());
    }

    #[test]
    fn test_apply_creates_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("requirements.txt");

        let result = ManifestWriter::new(false).apply(&path, &django("1.11")).unwrap();

        assert_eq!(result.change, ManifestChange::Created);
        assert!(result.file_modified);
        assert_eq!(fs::read_to_string(&path).unwrap(), "Django~=1.11\n");
    }

    #[test]
    fn test_apply_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("backend").join("requirements.txt");

        update_requirements(&path, &django("2.0"), false).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "Django~=2.0\n");
    }

    #[test]
    fn test_apply_replaces_existing_entry() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_requirements(&temp_dir, "pytz\nDjango==1.8\ngunicorn\n");

        let result = ManifestWriter::new(false).apply(&path, &django("2.1")).unwrap();

        assert_eq!(
            result.change,
            ManifestChange::Replaced {
                previous: "Django==1.8".to_string()
            }
        );
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "pytz\nDjango~=2.1\ngunicorn\n"
        );
    }

    #[test]
    fn test_apply_dry_run_leaves_file_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_requirements(&temp_dir, "Django==1.8\n");

        let result = ManifestWriter::dry_run().apply(&path, &django("2.1")).unwrap();

        assert!(!result.file_modified);
        assert_eq!(result.content, "Django~=2.1\n");
        assert_eq!(fs::read_to_string(&path).unwrap(), "Django==1.8\n");
    }

    #[test]
    fn test_apply_dry_run_does_not_create_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("requirements.txt");

        let result = ManifestWriter::dry_run().apply(&path, &django("1.11")).unwrap();

        assert_eq!(result.change, ManifestChange::Created);
        assert!(!path.exists());
    }

    #[test]
    fn test_apply_twice_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_requirements(&temp_dir, "# deps\nrequests\ndjango>=1.0");

        let writer = ManifestWriter::new(false);
        writer.apply(&path, &django("1.11")).unwrap();
        let once = fs::read_to_string(&path).unwrap();

        let second = writer.apply(&path, &django("1.11")).unwrap();
        let twice = fs::read_to_string(&path).unwrap();

        assert_eq!(once, twice);
        assert_eq!(second.change, ManifestChange::Unchanged);
        assert!(!second.file_modified);
    }

    #[test]
    fn test_apply_unchanged_does_not_rewrite() {
        let temp_dir = TempDir::new().unwrap();
        let content = "requests\nDjango~=1.11\n\n\n";
        let path = create_temp_requirements(&temp_dir, content);

        let result = ManifestWriter::new(false).apply(&path, &django("1.11")).unwrap();

        assert_eq!(result.change, ManifestChange::Unchanged);
        assert!(!result.file_modified);
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn test_apply_keeps_crlf_and_byte_order_mark() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_requirements(&temp_dir, "\u{feff}Django==1.8\r\nrequests\r\n");

        let result = ManifestWriter::new(false).apply(&path, &django("2.1")).unwrap();

        assert!(result.file_modified);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "\u{feff}Django~=2.1\r\nrequests\r\n"
        );
    }

    #[test]
    fn test_apply_unreadable_path_errors() {
        let temp_dir = TempDir::new().unwrap();
        // A directory cannot be read as a file
        let result = ManifestWriter::new(false).apply(temp_dir.path(), &django("1.11"));
        assert!(matches!(result, Err(ManifestError::ReadError { .. })));
    }

    #[test]
    fn test_read_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_requirements(&temp_dir, "requests\n");

        assert_eq!(read_manifest(&path).unwrap(), "requests\n");
    }

    #[test]
    fn test_read_manifest_not_found() {
        let result = read_manifest(Path::new("/nonexistent/path/requirements.txt"));
        assert!(result.is_err());
    }

    #[test]
    fn test_write_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("requirements.txt");

        write_manifest(&path, "Django~=2.0\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "Django~=2.0\n");
    }
}
