//! Dependency installation from requirements.txt

use crate::environment::Activation;
use crate::error::CommandError;
use crate::process::{execute, CommandRunner, CommandSpec, Executed};
use std::path::Path;

/// Build the pip invocation for `requirements`
///
/// Inside a venv the activated `pip` is used; otherwise pip runs as a module
/// of the configured interpreter.
pub fn install_command(requirements: &str, activation: Option<&Activation>, python: &str) -> CommandSpec {
    match activation {
        Some(activation) => {
            activation.wrap(&CommandSpec::new("pip").args(["install", "-r", requirements]))
        }
        None => CommandSpec::new(python).args(["-m", "pip", "install", "-r", requirements]),
    }
}

/// Install everything listed in `requirements`
pub fn install_dependencies(
    runner: &dyn CommandRunner,
    requirements: &str,
    activation: Option<&Activation>,
    python: &str,
    working_dir: &Path,
) -> Result<Executed, CommandError> {
    let command = install_command(requirements, activation, python);
    tracing::info!(command = %command, "installing dependencies");
    execute(runner, command, working_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::testing::MockRunner;
    use crate::process::CommandOutput;
    use std::path::PathBuf;

    #[test]
    fn test_install_command_with_activation() {
        let activation = Activation::Posix(PathBuf::from("venv/bin/activate"));
        let cmd = install_command("requirements.txt", Some(&activation), "python");

        assert_eq!(cmd.program(), "sh");
        assert!(cmd.arguments()[1].ends_with("&& pip install -r requirements.txt"));
    }

    #[test]
    fn test_install_command_without_venv() {
        let cmd = install_command("requirements.txt", None, "python3");
        assert_eq!(cmd.to_string(), "python3 -m pip install -r requirements.txt");
    }

    #[test]
    fn test_install_dependencies_success() {
        let runner = MockRunner::new().respond(
            "pip install",
            CommandOutput::success("Successfully installed Django-1.11.29"),
        );

        let executed =
            install_dependencies(&runner, "requirements.txt", None, "python", Path::new("."))
                .unwrap();

        assert!(executed.output.stdout.contains("Django-1.11.29"));
    }

    #[test]
    fn test_install_dependencies_failure() {
        let runner = MockRunner::new().respond(
            "pip install",
            CommandOutput::failure(1, "No matching distribution found for Django~=9.9"),
        );

        let err = install_dependencies(&runner, "requirements.txt", None, "python", Path::new("."))
            .unwrap_err();

        assert!(err.to_string().contains("No matching distribution"));
    }
}
