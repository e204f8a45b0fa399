//! Filesystem and remote I/O.
//!
//! The engine never touches `std::fs` or the network directly; everything
//! goes through a [`DataSource`] so embedders can serve page data from
//! elsewhere and tests can count accesses.

use crate::error::{EngineError, Result};
use reqwest::blocking::Client;
use serde_json::Value;
use std::{
    fs,
    path::{Component, Path, PathBuf},
    sync::OnceLock,
};
use walkdir::WalkDir;

/// Whether `location` is an `http://` or `https://` url.
pub fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// `path` relative to `root`, `/` separated.
///
/// Local paths are compared component-wise, ignoring `.` components. A
/// path that is not below `root` is returned unchanged. Urls are stripped
/// as plain string prefixes.
pub fn rel_path(path: &str, root: &str) -> String {
    if is_url(path) || is_url(root) {
        return path
            .strip_prefix(root)
            .unwrap_or(path)
            .trim_matches('/')
            .to_owned();
    }

    let path_parts = normal_components(Path::new(path));
    let root_parts = normal_components(Path::new(root));
    let rest = if path_parts.starts_with(&root_parts) {
        &path_parts[root_parts.len()..]
    } else {
        &path_parts[..]
    };
    rest.join("/")
}

fn normal_components(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::CurDir => None,
            Component::RootDir => Some(String::new()),
            other => Some(other.as_os_str().to_string_lossy().into_owned()),
        })
        .collect()
}

/// Storage the engine reads page data, fragments and templates from, and
/// writes documents to.
pub trait DataSource {
    fn exists(&self, path: &Path) -> bool;

    fn read_text(&self, path: &Path) -> Result<String>;

    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>>;

    /// Fetch and parse a remote JSON document.
    fn remote_json(&self, url: &str) -> Result<Value>;

    /// Write `content`, creating parent directories as needed.
    fn write(&self, path: &Path, content: &[u8]) -> Result<()>;

    /// Files below `dir` with extension `ext`, recursively, sorted.
    fn file_list(&self, dir: &Path, ext: &str) -> Result<Vec<PathBuf>>;

    fn read_json(&self, path: &Path) -> Result<Value> {
        let text = self.read_text(path)?;
        serde_json::from_str(&text).map_err(|err| EngineError::io(path, err))
    }

    /// Local file or remote url, decided by the shape of `location`.
    fn load_json(&self, location: &str) -> Result<Value> {
        if is_url(location) {
            self.remote_json(location)
        } else {
            self.read_json(Path::new(location))
        }
    }
}

/// Default [`DataSource`]: local filesystem plus blocking http.
#[derive(Debug, Default)]
pub struct FsSource {
    client: OnceLock<Client>,
}

impl FsSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn client(&self) -> Result<&Client> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = Client::builder()
            .user_agent(concat!("pagehouse/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| EngineError::io("<http client>", err))?;
        Ok(self.client.get_or_init(|| client))
    }
}

impl DataSource for FsSource {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_text(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|err| EngineError::io(path, err))
    }

    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).map_err(|err| EngineError::io(path, err))
    }

    fn remote_json(&self, url: &str) -> Result<Value> {
        let text = self
            .client()?
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(|err| EngineError::io(url, err))?;
        serde_json::from_str(&text).map_err(|err| EngineError::io(url, err))
    }

    fn write(&self, path: &Path, content: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| EngineError::io(parent, err))?;
        }
        fs::write(path, content).map_err(|err| EngineError::io(path, err))
    }

    fn file_list(&self, dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(EngineError::io(dir, "not a directory"));
        }
        let ext = ext.trim_start_matches('.');
        let mut files = Vec::new();
        for entry in WalkDir::new(dir) {
            let entry = entry.map_err(|err| EngineError::io(dir, err))?;
            let path = entry.path();
            if entry.file_type().is_file() && path.extension().is_some_and(|e| e == ext) {
                files.push(path.to_path_buf());
            }
        }
        files.sort();
        Ok(files)
    }
}
