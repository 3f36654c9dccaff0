//! djboot - Django project bootstrapper library
//!
//! This library provides the steps needed to start a Django project:
//! - Pinning Django in requirements.txt
//! - Detecting the Python interpreter
//! - Creating and activating a virtual environment
//! - Installing dependencies and running `django-admin startproject`

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod domain;
pub mod environment;
pub mod error;
pub mod installer;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod process;
pub mod progress;
