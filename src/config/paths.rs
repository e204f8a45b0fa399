//! `[paths]` section configuration.
//!
//! Source and target locations. `data` and `fragments` may also be
//! `http(s)://` locations, in which case they are fetched remotely.

use super::defaults;
use crate::io::is_url;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// `[paths]` section in pagehouse.toml.
///
/// # Example
/// ```toml
/// [paths]
/// root = "site"
/// data = "data"                               # relative to root
/// fragments = "https://cdn.example.com/frags" # remote location
/// target = "dist"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Project root directory, every other local path is nested below it.
    #[serde(default = "defaults::paths::root")]
    #[educe(Default = defaults::paths::root())]
    pub root: PathBuf,

    /// Page data directory or url.
    #[serde(default = "defaults::paths::data")]
    #[educe(Default = defaults::paths::data())]
    pub data: String,

    /// Fragments directory or url.
    #[serde(default = "defaults::paths::fragments")]
    #[educe(Default = defaults::paths::fragments())]
    pub fragments: String,

    /// Template directory.
    #[serde(default = "defaults::paths::templates")]
    #[educe(Default = defaults::paths::templates())]
    pub templates: PathBuf,

    /// Output directory, not nested below root.
    #[serde(default = "defaults::paths::target")]
    #[educe(Default = defaults::paths::target())]
    pub target: PathBuf,
}

impl PathsConfig {
    /// Data location as a string, joined below root unless absolute or remote.
    pub fn data_location(&self) -> String {
        self.nested(&self.data)
    }

    /// Fragments location as a string, joined below root unless absolute or remote.
    pub fn fragments_location(&self) -> String {
        self.nested(&self.fragments)
    }

    /// Template directory joined below root unless absolute.
    pub fn templates_dir(&self) -> PathBuf {
        self.root.join(&self.templates)
    }

    fn nested(&self, location: &str) -> String {
        if is_url(location) || Path::new(location).is_absolute() {
            return location.to_owned();
        }
        self.root.join(location).to_string_lossy().into_owned()
    }
}
