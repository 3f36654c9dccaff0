//! Settings resolution
//!
//! Every option is resolved with the precedence CLI flag > settings file >
//! built-in default. The settings file is TOML with the same keys as
//! [`Settings`], all optional:
//!
//! ```toml
//! django_version = "2.1"
//! python = "python3"
//! python_version = 3
//! venv = "create"        # create | existing | none
//! venv_path = "venv/"
//! requirements = "requirements.txt"
//! project_name = "mysite"
//! ```

use crate::bootstrap::{derive_project_name, validate_project_name};
use crate::cli::CliArgs;
use crate::domain::{DjangoVersion, PythonMajor, VenvMode};
use crate::environment::normalize_venv_path;
use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings file looked up in the project root when `--config` is not given
pub const CONFIG_FILENAME: &str = "djboot.toml";

const DEFAULT_PYTHON: &str = "python";
const DEFAULT_VENV_PATH: &str = "venv/";
const DEFAULT_REQUIREMENTS: &str = "requirements.txt";

/// Contents of a settings file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub django_version: Option<DjangoVersion>,
    pub python: Option<String>,
    pub python_version: Option<PythonMajor>,
    pub venv: Option<VenvMode>,
    pub venv_path: Option<String>,
    pub requirements: Option<String>,
    pub project_name: Option<String>,
}

impl FileConfig {
    /// Parse settings file content; `path` is only used for error messages
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::parse_error(path, e.to_string()))
    }

    /// Read and parse a settings file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content, path)
    }
}

/// Fully resolved configuration for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory the project lives in; all commands run here
    pub project_root: PathBuf,
    /// Django release line to require
    pub django_version: DjangoVersion,
    /// Interpreter command
    pub python: String,
    /// Explicitly requested major version, if any
    pub python_version: Option<PythonMajor>,
    /// Virtual environment handling
    pub venv: VenvMode,
    /// Venv location relative to the project root, normalized with a trailing `/`
    pub venv_path: String,
    /// Requirements file relative to the project root
    pub requirements: String,
    /// Django project name
    pub project_name: String,
    /// Write and execute nothing
    pub dry_run: bool,
    /// Skip pip install
    pub skip_install: bool,
    /// Skip django-admin startproject
    pub skip_bootstrap: bool,
}

impl Settings {
    /// Resolve settings from CLI arguments and the settings file, if any
    pub fn resolve(args: &CliArgs) -> Result<Self, ConfigError> {
        let root = &args.path;
        if !root.is_dir() {
            return Err(ConfigError::invalid_path(root, "not a directory"));
        }

        let config_path = match &args.config {
            Some(path) => Some(path.clone()),
            None => {
                let default = root.join(CONFIG_FILENAME);
                default.is_file().then_some(default)
            }
        };

        let file = match config_path {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading settings file");
                FileConfig::load(&path)?
            }
            None => FileConfig::default(),
        };

        Self::merge(args, file)
    }

    /// Merge CLI arguments over file settings over defaults
    pub fn merge(args: &CliArgs, file: FileConfig) -> Result<Self, ConfigError> {
        let project_root = args.path.clone();

        let project_name = match args.project_name.clone().or(file.project_name) {
            Some(name) => {
                validate_project_name(&name)?;
                name
            }
            None => derive_project_name(&directory_name(&project_root)),
        };

        let requirements = args
            .requirements
            .clone()
            .or(file.requirements)
            .unwrap_or_else(|| DEFAULT_REQUIREMENTS.to_string());
        if requirements.trim().is_empty() {
            return Err(ConfigError::invalid_path(requirements, "empty requirements path"));
        }

        let venv_path = args
            .venv_path
            .as_deref()
            .or(file.venv_path.as_deref())
            .unwrap_or(DEFAULT_VENV_PATH);

        Ok(Self {
            django_version: args
                .django_version
                .or(file.django_version)
                .unwrap_or_default(),
            python: args
                .python
                .clone()
                .or(file.python)
                .unwrap_or_else(|| DEFAULT_PYTHON.to_string()),
            python_version: args.python_version.or(file.python_version),
            venv: args.venv.or(file.venv).unwrap_or_default(),
            venv_path: normalize_venv_path(venv_path),
            requirements,
            project_name,
            dry_run: args.dry_run,
            skip_install: args.skip_install,
            skip_bootstrap: args.skip_bootstrap,
            project_root,
        })
    }

    /// Absolute-or-root-relative venv directory
    pub fn venv_dir(&self) -> PathBuf {
        self.project_root.join(&self.venv_path)
    }

    /// Path of the requirements file
    pub fn requirements_path(&self) -> PathBuf {
        self.project_root.join(&self.requirements)
    }
}

/// Last component of `root`, resolving `.` and `..` through the filesystem
fn directory_name(root: &Path) -> String {
    let resolved = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
    resolved
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
