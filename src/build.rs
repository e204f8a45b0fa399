//! Build orchestration for the command line.
//!
//! ```text
//! build_site()
//!     │
//!     ├── Generator::builder(config).build()   builtins, freeze config
//!     ├── load(limit, sources)                 collect compiled pages
//!     └── write_documents(target, Json)        target/<ref>.json
//! ```
//!
//! The binary carries no template engine, so documents are always the
//! compiled page data.

use crate::cli::BuildArgs;
use anyhow::{Context, Result, bail};
use pagehouse::{ConfigBuilder, Generator, OutputKind, log};

/// Build every page, returning how many documents were written.
pub fn build_site(config: ConfigBuilder, args: &BuildArgs) -> Result<usize> {
    let mut generator = Generator::builder(config)
        .build()
        .context("Failed to set up generator")?;

    let sources = (!args.sources.is_empty()).then(|| args.sources.clone());
    let summary = generator.load(&args.limit, sources)?;

    let config = generator.config().clone();
    let reporter = generator.reporter();
    if config.render.output == OutputKind::Html {
        reporter.warn("no template engine available, writing json documents");
    }

    let target = &config.paths.target;
    let written = generator.write_documents(target, OutputKind::Json)?;
    reporter.status(
        "build",
        format!(
            "{} collected, {} skipped, {} failed, {written} written to {}",
            summary.collected,
            summary.skipped,
            summary.failed,
            target.display()
        ),
    );

    let stats = generator.directive_stats();
    if reporter.is_verbose() && !stats.is_empty() {
        for (name, count) in stats.iter() {
            log!("stats"; "{name}: {count}");
        }
    }

    let errors = reporter.errors();
    if errors > 0 {
        bail!("Build finished with {errors} errors");
    }
    Ok(written)
}
