//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [paths] Section Defaults
// ============================================================================

pub mod paths {
    use std::path::PathBuf;

    pub fn root() -> PathBuf {
        "".into()
    }

    pub fn data() -> String {
        "data".into()
    }

    pub fn fragments() -> String {
        "fragments".into()
    }

    pub fn templates() -> PathBuf {
        "templates".into()
    }

    pub fn target() -> PathBuf {
        "dist".into()
    }
}

// ============================================================================
// [resolve] Section Defaults
// ============================================================================

pub mod resolve {
    pub fn fragment_property() -> String {
        "__fragment".into()
    }

    pub fn directives_property() -> String {
        "__directives".into()
    }

    pub fn directive_prefix() -> String {
        "".into()
    }

    pub fn builtin_directives() -> Vec<String> {
        vec!["all".into()]
    }
}

// ============================================================================
// [document] Section Defaults
// ============================================================================

pub mod document {
    pub fn root() -> String {
        "/".into()
    }

    pub fn domain() -> String {
        "".into()
    }

    pub fn ext() -> String {
        ".html".into()
    }

    pub fn index() -> String {
        "index".into()
    }
}

// ============================================================================
// [render] Section Defaults
// ============================================================================

pub mod render {
    use crate::config::OutputKind;

    pub fn default_template() -> String {
        "__page".into()
    }

    pub fn template_ext() -> String {
        ".twig".into()
    }

    pub fn template_property() -> String {
        "__template".into()
    }

    pub fn minify_property() -> String {
        "__minify".into()
    }

    pub fn output() -> OutputKind {
        OutputKind::Json
    }
}
