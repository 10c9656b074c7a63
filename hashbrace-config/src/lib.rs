//! Shared configuration loader for the hashbrace template engine.
//!
//! `defaults/hashbrace.default.toml` is embedded into every consumer so that
//! documented defaults and runtime behavior stay in sync. Hosts layer a TOML
//! file and `HASHBRACE_*` environment variables on top of those defaults via
//! [`Loader`] before deserializing into [`HashbraceConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat, Map};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub use config::ConfigError;

const DEFAULT_TOML: &str = include_str!("../defaults/hashbrace.default.toml");

/// Top-level configuration consumed by the template engine.
#[derive(Debug, Clone, Deserialize)]
pub struct HashbraceConfig {
    pub cache: CacheConfig,
    pub grammar: GrammarConfig,
}

/// Knobs for the process-wide parsed template cache.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Seconds of inactivity after which an entry expires.
    pub sliding_expiration_secs: u64,
    /// Ceiling for the summed weight of all entries.
    pub max_weight: usize,
}

/// Bounds applied before and during grammar evaluation.
#[derive(Debug, Clone, Deserialize)]
pub struct GrammarConfig {
    pub max_nesting_depth: usize,
    pub max_template_length: usize,
}

/// Environment variable naming a TOML file that hosts layer over the
/// defaults.
pub const CONFIG_PATH_VAR: &str = "HASHBRACE_CONFIG";

/// Prefix of per-key environment overrides. Sections are separated by a
/// double underscore: `HASHBRACE_CACHE__MAX_WEIGHT=1048576`.
pub const ENV_PREFIX: &str = "HASHBRACE";

/// Layers host settings over the embedded defaults: first files, then
/// environment variables, each later source winning per key.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a TOML file. A missing file is an error when the loader is built.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).format(FileFormat::Toml));
        self
    }

    /// Layer `HASHBRACE_<SECTION>__<KEY>` variables from the process
    /// environment.
    pub fn with_environment(self) -> Self {
        self.with_environment_source(None)
    }

    fn with_environment_source(mut self, source: Option<Map<String, String>>) -> Self {
        let environment = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(source);
        self.builder = self.builder.add_source(environment);
        self
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<HashbraceConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The embedded defaults alone.
pub fn load_defaults() -> Result<HashbraceConfig, ConfigError> {
    Loader::new().build()
}

/// Settings for a host process: the defaults, then the file named by
/// [`CONFIG_PATH_VAR`] when it is set, then `HASHBRACE_*` overrides.
pub fn load_host() -> Result<HashbraceConfig, ConfigError> {
    let mut loader = Loader::new();
    if let Some(path) = std::env::var_os(CONFIG_PATH_VAR) {
        loader = loader.with_file(PathBuf::from(path));
    }
    loader.with_environment().build()
}
