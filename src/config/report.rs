//! `[report]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[report]` section in pagehouse.toml - how errors and diagnostics surface.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// Abort the run on the first error.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub strict: bool,

    /// Suppress everything except errors.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub silent: bool,

    /// Emit diagnostic detail.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub verbose: bool,
}
