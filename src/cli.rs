//! CLI argument parsing module for djboot

use crate::domain::{DjangoVersion, PythonMajor, VenvMode};
use clap::Parser;
use std::path::PathBuf;

/// Parse a Django `major.minor` release line
fn parse_django_version(s: &str) -> Result<DjangoVersion, String> {
    s.parse().map_err(|e: crate::error::ConfigError| e.to_string())
}

/// Parse a Python major version (`2` or `3`)
fn parse_python_version(s: &str) -> Result<PythonMajor, String> {
    s.parse().map_err(|e: crate::error::ConfigError| e.to_string())
}

/// Django project bootstrapper
///
/// Unset options fall back to the settings file, then to built-in defaults.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "djboot",
    version,
    about = "Set up a virtualenv, requirements.txt and a Django project skeleton"
)]
pub struct CliArgs {
    /// Project root (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    // Project options
    /// Django release line to require, e.g. 1.11 (LTS), 2.0, 2.1 [default: 1.11]
    #[arg(long, value_name = "X.Y", value_parser = parse_django_version)]
    pub django_version: Option<DjangoVersion>,

    /// Command used to run the Python interpreter, e.g. python, py3 [default: python]
    #[arg(long, value_name = "CMD")]
    pub python: Option<String>,

    /// Require this Python major version instead of auto-detecting it
    #[arg(long, value_name = "2|3", value_parser = parse_python_version)]
    pub python_version: Option<PythonMajor>,

    /// Virtual environment handling [default: create]
    #[arg(long, value_enum)]
    pub venv: Option<VenvMode>,

    /// Virtual environment location relative to the project root [default: venv/]
    #[arg(long, value_name = "DIR")]
    pub venv_path: Option<String>,

    /// Requirements file relative to the project root [default: requirements.txt]
    #[arg(short = 'r', long, value_name = "FILE")]
    pub requirements: Option<String>,

    /// Django project name [default: derived from the directory name]
    #[arg(long, value_name = "NAME")]
    pub project_name: Option<String>,

    /// Settings file [default: <PATH>/djboot.toml if present]
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    // General options
    /// Dry run mode - show what would be done without changing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Enable quiet mode - errors only
    #[arg(short, long)]
    pub quiet: bool,

    /// Output the run report in JSON format
    #[arg(long)]
    pub json: bool,

    // Step toggles
    /// Do not run pip install
    #[arg(long)]
    pub skip_install: bool,

    /// Do not run django-admin startproject
    #[arg(long)]
    pub skip_bootstrap: bool,
}
