//! Generator configuration management for `pagehouse.toml`.
//!
//! # Sections
//!
//! | Section      | Purpose                                          |
//! |--------------|--------------------------------------------------|
//! | `[paths]`    | Root, data, fragments, templates and target      |
//! | `[resolve]`  | Fragment and directive processing                |
//! | `[document]` | Document uri/url generation                      |
//! | `[render]`   | Template lookup and document output              |
//! | `[report]`   | Strict, silent and verbose reporting             |
//!
//! # Phases
//!
//! ```text
//! pagehouse.toml ──► ConfigBuilder ──► cli overrides ──► setup hooks ──► build() ──► Config
//!                    (mutable)                            (plugins)      validate   (frozen, Arc)
//! ```
//!
//! Once built, a [`Config`] only hands out shared references, so nothing
//! downstream of plugin setup can change an option.
//!
//! # Example
//!
//! ```toml
//! [paths]
//! data = "data"
//! fragments = "fragments"
//! target = "dist"
//!
//! [resolve]
//! ignore_directives = true
//!
//! [document]
//! domain = "https://example.com"
//! omit_index = true
//!
//! [report]
//! strict = false
//! verbose = true
//! ```

mod defaults;
mod document;
mod error;
mod paths;
mod render;
mod report;
mod resolve;

pub use document::DocumentConfig;
pub use error::ConfigError;
pub use paths::PathsConfig;
pub use render::{OutputKind, RenderConfig};
pub use report::ReportConfig;
pub use resolve::ResolveConfig;

use serde::{Deserialize, Serialize};
use std::{
    fs,
    ops::{Deref, DerefMut},
    path::{Path, PathBuf},
    sync::Arc,
};

/// Default config file name, looked up below the project root.
pub const CONFIG_FILE: &str = "pagehouse.toml";

// ============================================================================
// Settings
// ============================================================================

/// All recognized options, as stored in `pagehouse.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Source and target locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Fragment and directive processing
    #[serde(default)]
    pub resolve: ResolveConfig,

    /// Document uri/url generation
    #[serde(default)]
    pub document: DocumentConfig,

    /// Template lookup and output
    #[serde(default)]
    pub render: RenderConfig,

    /// Reporting mode
    #[serde(default)]
    pub report: ReportConfig,
}

// ============================================================================
// Builder (mutable phase)
// ============================================================================

/// Mutable configuration, used only while the generator is being set up.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    /// Path of the loaded config file, empty when built from defaults.
    pub config_path: PathBuf,
    settings: Settings,
}

impl ConfigBuilder {
    /// Builder with every option at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content)?;
        Ok(Self {
            config_path: PathBuf::new(),
            settings,
        })
    }

    /// Load configuration from a file path.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let mut builder = Self::from_str(&content)?;
        builder.config_path = path.to_path_buf();
        Ok(builder)
    }

    /// Load `<root>/<file>` if it exists, defaults otherwise, with `paths.root` set to `root`.
    ///
    /// A `~` in `root` is expanded to the home directory.
    pub fn load(root: &Path, file: &Path) -> Result<Self, ConfigError> {
        let root = expand_tilde(root);
        let config_path = root.join(file);
        let mut builder = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };
        if builder.settings.paths.root.as_os_str().is_empty() {
            builder.settings.paths.root = root;
        } else if builder.settings.paths.root.is_relative() {
            builder.settings.paths.root = root.join(&builder.settings.paths.root);
        }
        Ok(builder)
    }

    /// Serialize current settings, used to write a starter config.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(&self.settings)
            .map_err(|err| ConfigError::Validation(format!("cannot serialize config: {err}")))
    }

    /// Validate option combinations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let resolve = &self.settings.resolve;
        if resolve.fragment_property.is_empty() {
            return Err(ConfigError::Validation(
                "[resolve.fragment_property] must not be empty".into(),
            ));
        }
        if resolve.directives_property.is_empty() {
            return Err(ConfigError::Validation(
                "[resolve.directives_property] must not be empty".into(),
            ));
        }
        if resolve.fragment_property == resolve.directives_property {
            return Err(ConfigError::Validation(
                "[resolve.fragment_property] and [resolve.directives_property] must differ".into(),
            ));
        }

        let document = &self.settings.document;
        if document.index.is_empty() {
            return Err(ConfigError::Validation(
                "[document.index] must not be empty".into(),
            ));
        }
        if !document.ext.is_empty() && !document.ext.starts_with('.') {
            return Err(ConfigError::Validation(
                "[document.ext] must be empty or start with `.`".into(),
            ));
        }

        let render = &self.settings.render;
        if render.template_property.is_empty() || render.minify_property.is_empty() {
            return Err(ConfigError::Validation(
                "[render] property names must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Validate and freeze into an immutable [`Config`].
    pub fn build(self) -> Result<Config, ConfigError> {
        self.validate()?;
        Ok(Config {
            config_path: Arc::from(self.config_path),
            settings: Arc::new(self.settings),
        })
    }
}

impl Deref for ConfigBuilder {
    type Target = Settings;

    fn deref(&self) -> &Settings {
        &self.settings
    }
}

impl DerefMut for ConfigBuilder {
    fn deref_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }
}

// ============================================================================
// Frozen config
// ============================================================================

/// Immutable configuration shared by every part of a generation run.
///
/// Cloning is cheap. There is no way back to a [`ConfigBuilder`].
#[derive(Debug, Clone)]
pub struct Config {
    config_path: Arc<Path>,
    settings: Arc<Settings>,
}

impl Config {
    /// Path of the config file this was loaded from, empty for defaults.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: Arc::from(PathBuf::new()),
            settings: Arc::new(Settings::default()),
        }
    }
}

impl Deref for Config {
    type Target = Settings;

    fn deref(&self) -> &Settings {
        &self.settings
    }
}

/// Expand a leading `~` in a path.
fn expand_tilde(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(raw) => PathBuf::from(shellexpand::tilde(raw).into_owned()),
        None => path.to_path_buf(),
    }
}

// ============================================================================
// Tests
// ============================================================================
