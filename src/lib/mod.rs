//! Environment variable setup library.
//!
//! Given a set of required variable names grouped into sections, this library keeps
//! two files in line with it:
//!
//! - a sectioned `.env` file, created when missing, where every declared key gets an
//!   entry while existing values and custom entries are kept
//! - a webpack config whose `EnvironmentPlugin({ ... })` call must list every key
//!
//! # Features
//!
//! - **Deterministic output**: the env file is regenerated the same way on every run
//! - **Value preservation**: existing assignments are never rewritten
//! - **Minimal patching**: only the plugin call of the webpack config is touched
//! - **Optional tracing**: detailed logging when the `tracing` feature is enabled
//!
//! # Example
//!
//! ```rust,no_run
//! use env_setup::config::SetupConfig;
//! use env_setup::format::CommandFormatter;
//! use env_setup::setup::EnvSetup;
//! use std::path::Path;
//!
//! let config = SetupConfig::load("env-setup.json").unwrap();
//! let formatter = CommandFormatter::prettier("prettier", Path::new("webpack.config.js"));
//!
//! EnvSetup::run(&config, &formatter);
//! ```

pub mod config;
pub mod declaration;
pub mod format;
pub mod parse;
pub mod patch;
pub mod reconcile;
pub mod render;
pub mod setup;
