//! Core domain models for djboot
//!
//! This module contains the fundamental types used throughout the application:
//! - Django version selection and the requirement it renders to
//! - Python major version and virtual environment mode
//! - Pipeline step identifiers, statuses and the run report

mod django_version;
mod python;
mod report;

pub use django_version::{DjangoVersion, DJANGO_PACKAGE};
pub use python::{PythonMajor, VenvMode};
pub use report::{ManifestChange, RunReport, Step, StepReport, StepStatus};
