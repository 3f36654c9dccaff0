//! djboot - Django project bootstrapper CLI tool
//!
//! Pins Django in requirements.txt, sets up a virtual environment,
//! installs dependencies and creates the project skeleton.

use clap::Parser;
use djboot::cli::CliArgs;
use djboot::config::Settings;
use djboot::orchestrator::Orchestrator;
use djboot::output::{create_formatter, OutputConfig};
use djboot::process::SystemRunner;
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    init_tracing(args.verbose, args.quiet);

    // Run the main logic and handle errors
    match run(args) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize tracing on stderr; `RUST_LOG` overrides the flags
fn init_tracing(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if quiet {
            EnvFilter::new("error")
        } else if verbose {
            EnvFilter::new("djboot=debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .init();
}

/// Main application logic
fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let settings = match Settings::resolve(&args) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(ExitCode::from(2));
        }
    };

    // Print resolved settings in verbose mode
    if args.verbose {
        eprintln!("djboot v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("Target: {}", settings.project_root.display());
        eprintln!(
            "Django {}, venv: {} at {}",
            settings.django_version.label(),
            settings.venv,
            settings.venv_path
        );
        if settings.dry_run {
            eprintln!("Mode: dry-run");
        }
    }

    let runner = SystemRunner::new();
    let show_progress = !args.quiet && !args.verbose && !args.json;
    let orchestrator = Orchestrator::new(settings, &runner);
    let report = orchestrator.run_with_progress(show_progress);

    // Create output formatter based on CLI options
    let mut output_config =
        OutputConfig::from_cli(args.json, args.verbose, args.quiet, args.dry_run);
    output_config.color = io::stdout().is_terminal();
    let formatter = create_formatter(output_config);

    // Output results
    let mut stdout = io::stdout().lock();
    formatter.format(&report, &mut stdout)?;
    stdout.flush()?;

    if report.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
