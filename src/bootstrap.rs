//! Django project skeleton creation via `django-admin startproject`

use crate::environment::Activation;
use crate::error::{CommandError, ConfigError};
use crate::process::{execute, CommandRunner, CommandSpec, Executed};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// File whose presence means the project was already bootstrapped
pub const MANAGE_PY: &str = "manage.py";

/// Name used when nothing usable can be derived from the directory
const FALLBACK_PROJECT_NAME: &str = "project";

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Check that `name` can be used as a Django project (Python package) name
pub fn validate_project_name(name: &str) -> Result<(), ConfigError> {
    if IDENTIFIER_RE.is_match(name) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProjectName {
            value: name.to_string(),
        })
    }
}

/// Derive a project name from a directory name, e.g. `my-site` -> `my_site`
pub fn derive_project_name(dir_name: &str) -> String {
    let mut name: String = dir_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if name.trim_matches('_').is_empty() {
        return FALLBACK_PROJECT_NAME.to_string();
    }

    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

/// Returns true if `root` already contains a Django project
pub fn project_exists(root: &Path) -> bool {
    root.join(MANAGE_PY).is_file()
}

/// Build `django-admin startproject <name> .`, activated when a venv is used
pub fn startproject_command(project_name: &str, activation: Option<&Activation>) -> CommandSpec {
    let command = CommandSpec::new("django-admin").args(["startproject", project_name, "."]);
    match activation {
        Some(activation) => activation.wrap(&command),
        None => command,
    }
}

/// Create the project skeleton in `root`
pub fn bootstrap_project(
    runner: &dyn CommandRunner,
    project_name: &str,
    activation: Option<&Activation>,
    root: &Path,
) -> Result<Executed, CommandError> {
    let command = startproject_command(project_name, activation);
    tracing::info!(command = %command, "bootstrapping project");
    execute(runner, command, root)
}
