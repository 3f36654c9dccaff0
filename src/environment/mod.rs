//! Python interpreter and virtual environment handling
//!
//! This module provides:
//! - Interpreter major version detection with a versioned-command fallback
//! - Virtual environment creation (venv module or virtualenv)
//! - Activation script discovery and command wrapping

mod activation;
mod interpreter;
mod venv;

pub use activation::{resolve_activation, Activation, POSIX_ACTIVATE, WINDOWS_ACTIVATE};
pub use interpreter::{detect_interpreter, parse_major, resolve_interpreter, version_query, Interpreter};
pub use venv::{create_venv, creation_commands, normalize_venv_path};
