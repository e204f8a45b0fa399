//! Pagehouse - static site generator core.
//!
//! Page data lives in JSON files. Before a page is rendered its tree is
//! compiled: named fragments are merged in and directives rewrite parts of
//! the tree. Every page gets a [`Document`] with its reference, uri and url.
//!
//! ```text
//! data/*.json ──► Document ──► Resolver ──► compiled page ──► Renderer ──► target/<ref>.html
//!                              │  fragments                  (or json)
//!                              └─ directives
//! ```
//!
//! # Example
//!
//! ```no_run
//! use pagehouse::{ConfigBuilder, Generator, OutputKind};
//! use std::path::Path;
//!
//! let config = ConfigBuilder::load(Path::new("site"), Path::new("pagehouse.toml"))?;
//! let mut generator = Generator::builder(config)
//!     .directive_fn("upper", |call| {
//!         if let Some(serde_json::Value::String(s)) = call.value_mut() {
//!             *s = s.to_uppercase();
//!         }
//!         Ok(())
//!     })
//!     .build()?;
//! generator.load(&[], None)?;
//! generator.write_documents(Path::new("dist"), OutputKind::Json)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod attributes;
pub mod collector;
pub mod config;
pub mod directives;
pub mod document;
pub mod error;
pub mod fragments;
pub mod generator;
pub mod io;
pub mod logger;
pub mod plugins;
pub mod render;
pub mod report;
pub mod resolver;

pub use collector::{CollectSummary, LoadedPage};
pub use config::{CONFIG_FILE, Config, ConfigBuilder, OutputKind};
pub use directives::{Context, Directive, DirectiveCall, DirectiveRegistry};
pub use document::Document;
pub use error::{EngineError, Result};
pub use generator::{Generator, GeneratorBuilder};
pub use io::{DataSource, FsSource};
pub use plugins::{HookKind, Plugin};
pub use render::Renderer;
pub use report::Reporter;
