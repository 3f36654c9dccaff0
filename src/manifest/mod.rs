//! requirements.txt management
//!
//! This module provides functionality to:
//! - Locate the Django entry in a requirements file by normalized name
//! - Replace it in place or append it, keeping all other lines
//! - Write the result back (or only report it in dry-run mode)

mod requirements;
mod writer;

pub use requirements::{normalize_name, package_name, Requirement, RequirementsFile};
pub use writer::{read_manifest, update_requirements, write_manifest, ManifestWriter, WriteResult};
