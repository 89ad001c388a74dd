//! Configuration loading
//!
//! The built-in settings live in `defaults/jsplay.default.toml`, compiled into the crate.
//! The binary layers a `jsplay.toml` from the working directory on top, or the file named
//! by `--config` instead, then applies `--format` as an override. Every table
//! (`[transform]`, `[executor]`, `[watch]`, `[output]`) is always present after the
//! defaults, so a user file only needs the keys it changes.

use std::path::Path;
use std::time::Duration;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;

use crate::playground::processor::OutputFormat;

const DEFAULT_TOML: &str = include_str!("../../defaults/jsplay.default.toml");

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PlaygroundConfig {
    pub transform: TransformConfig,
    pub executor: ExecutorConfig,
    pub watch: WatchConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransformConfig {
    pub strip_script_tags: bool,
    pub max_source_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecutorConfig {
    pub program: String,
    pub args: Vec<String>,
    pub timeout_ms: u64,
}

impl ExecutorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    pub debounce_ms: u64,
    pub poll_interval_ms: u64,
}

impl WatchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

/// Layers jsplay settings, lowest precedence first.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Seeded with `jsplay.default.toml`
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a TOML file that must exist, as with `--config`.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer a TOML file if it exists, as with `./jsplay.toml`.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Override one dotted key, e.g. `output.format` or `executor.timeout_ms`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<PlaygroundConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The built-in settings alone
pub fn load_defaults() -> Result<PlaygroundConfig, ConfigError> {
    Loader::new().build()
}
