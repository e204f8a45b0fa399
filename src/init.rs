//! Site initialization module.
//!
//! Creates the config file and the directory layout it points at.

use anyhow::{Context, Result, bail};
use pagehouse::{ConfigBuilder, io::is_url};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Files to write ignore patterns to
const IGNORE_FILES: &[&str] = &[".gitignore", ".ignore"];

/// Starter page written to `<data>/index.json`
const SAMPLE_PAGE: &str = "{\n  \"title\": \"Home\"\n}\n";

/// Create a new site below `config.paths.root`, writing the config to `config_path`.
pub fn new_site(config: &ConfigBuilder, config_path: &Path) -> Result<()> {
    if config_path.exists() {
        bail!(
            "Config file `{}` already exists. Remove it manually or init in a different path.",
            config_path.display()
        );
    }

    init_site_structure(config)?;
    init_default_config(config, config_path)?;
    init_ignored_files(&config.paths.root, &[config.paths.target.as_path()])?;
    Ok(())
}

/// Write default configuration file
fn init_default_config(config: &ConfigBuilder, path: &Path) -> Result<()> {
    let content = config.to_toml()?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Create data, fragments and templates directories plus a starter page.
///
/// Remote locations are left alone.
fn init_site_structure(config: &ConfigBuilder) -> Result<()> {
    let paths = &config.paths;
    let dirs: Vec<PathBuf> = [paths.data_location(), paths.fragments_location()]
        .into_iter()
        .filter(|location| !is_url(location))
        .map(PathBuf::from)
        .chain([paths.templates_dir()])
        .collect();

    for dir in &dirs {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let data = paths.data_location();
    if !is_url(&data) {
        let page = Path::new(&data).join("index.json");
        if !page.exists() {
            fs::write(&page, SAMPLE_PAGE)
                .with_context(|| format!("Failed to write {}", page.display()))?;
        }
    }
    Ok(())
}

/// Initialize .gitignore and .ignore files with specified paths
fn init_ignored_files(root: &Path, paths: &[&Path]) -> Result<()> {
    let content = paths
        .iter()
        .filter_map(|p| p.to_str())
        .collect::<Vec<_>>()
        .join("\n");

    for filename in IGNORE_FILES {
        let path = root.join(filename);
        if !path.exists() {
            fs::write(&path, &content)?;
        }
    }

    Ok(())
}
