//! `[resolve]` section configuration.
//!
//! Controls fragment expansion and directive processing while page data
//! trees are resolved.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[resolve]` section in pagehouse.toml.
///
/// # Example
/// ```toml
/// [resolve]
/// fragment_property = "__fragment"
/// directives_property = "__directives"
/// ignore_directives = true
/// builtin_directives = ["setFromDoc", "sort"]
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ResolveConfig {
    /// Expand fragment references.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub fragments: bool,

    /// Property naming the fragment to merge into a mapping.
    #[serde(default = "defaults::resolve::fragment_property")]
    #[educe(Default = defaults::resolve::fragment_property())]
    pub fragment_property: String,

    /// Run directives after a container is resolved.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub directives: bool,

    /// Only log unknown directives in verbose mode instead of warning.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub ignore_directives: bool,

    /// Property holding the directive list of a mapping.
    #[serde(default = "defaults::resolve::directives_property")]
    #[educe(Default = defaults::resolve::directives_property())]
    pub directives_property: String,

    /// Namespace prefix directive names are registered under.
    #[serde(default = "defaults::resolve::directive_prefix")]
    #[educe(Default = defaults::resolve::directive_prefix())]
    pub directive_prefix: String,

    /// Built-in directives to register, `"all"` registers every one.
    #[serde(default = "defaults::resolve::builtin_directives")]
    #[educe(Default = defaults::resolve::builtin_directives())]
    pub builtin_directives: Vec<String>,

    /// Restrict registrations to these names, empty allows any.
    #[serde(default)]
    pub allowed_directives: Vec<String>,
}
