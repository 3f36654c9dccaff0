//! Activation script discovery
//!
//! A venv is activated by sourcing its script in the same shell invocation as
//! the command that needs it.

use crate::error::EnvironmentError;
use crate::process::{posix_quote, windows_quote, CommandSpec};
use std::path::{Path, PathBuf};

/// Activation script of a POSIX venv, relative to the venv root
pub const POSIX_ACTIVATE: &str = "bin/activate";

/// Activation script of a Windows venv, relative to the venv root
pub const WINDOWS_ACTIVATE: &str = "Scripts/activate.bat";

/// How to activate a given venv
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// `. <venv>/bin/activate` in `sh`
    Posix(PathBuf),
    /// `<venv>\Scripts\activate.bat` in `cmd`
    Windows(PathBuf),
}

impl Activation {
    /// The activation script this resolves to on the current platform
    pub fn for_host(venv_dir: &Path) -> Self {
        if cfg!(windows) {
            Activation::Windows(venv_dir.join(WINDOWS_ACTIVATE))
        } else {
            Activation::Posix(venv_dir.join(POSIX_ACTIVATE))
        }
    }

    /// Path to the activation script
    pub fn script(&self) -> &Path {
        match self {
            Activation::Posix(path) | Activation::Windows(path) => path,
        }
    }

    /// Chain `command` after the activation in a single shell invocation
    pub fn wrap(&self, command: &CommandSpec) -> CommandSpec {
        match self {
            Activation::Posix(script) => {
                let script = script.to_string_lossy();
                CommandSpec::new("sh").arg("-c").arg(format!(
                    ". {} && {}",
                    posix_quote(&script),
                    command.to_posix_line()
                ))
            }
            Activation::Windows(script) => {
                let script = script.to_string_lossy().replace('/', "\\");
                CommandSpec::new("cmd")
                    .arg("/C")
                    .arg(format!(
                        "{} && {}",
                        windows_quote(&script),
                        command.to_windows_line()
                    ))
                    .raw()
            }
        }
    }
}

/// Find the activation script inside `venv_dir`
///
/// The POSIX location is checked before the Windows one.
pub fn resolve_activation(venv_dir: &Path) -> Result<Activation, EnvironmentError> {
    let posix = venv_dir.join(POSIX_ACTIVATE);
    if posix.is_file() {
        return Ok(Activation::Posix(posix));
    }

    let windows = venv_dir.join(WINDOWS_ACTIVATE);
    if windows.is_file() {
        return Ok(Activation::Windows(windows));
    }

    Err(EnvironmentError::activation_not_found(venv_dir))
}
