//! Scratch fixture directories.
//!
//! Request clients read their default entities from a fixture directory.
//! Tests that need a different default, or a broken one, write it into a
//! temporary directory instead of touching the repository's `data/` files.

use anyhow::{Context, Result, anyhow};
use camino::Utf8PathBuf;
use std::fs;
use tempfile::TempDir;

/// Temporary directory holding fixture files, removed on drop.
#[derive(Debug)]
pub struct FixtureDir {
    _temp: TempDir,
    path: Utf8PathBuf,
}

impl FixtureDir {
    /// Create a directory containing each `(file name, contents)` pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or any file cannot be written, or if
    /// the temporary path is not valid UTF-8.
    pub fn with_files(files: &[(&str, &str)]) -> Result<Self> {
        let temp = TempDir::new().context("create fixture tempdir")?;
        let path = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
            .map_err(|path| anyhow!("tempdir path not valid UTF-8: {path:?}"))?;
        for (name, contents) in files {
            let target = path.join(name);
            fs::write(&target, contents).with_context(|| format!("write fixture {target}"))?;
        }
        Ok(Self { _temp: temp, path })
    }

    /// UTF-8 path of the directory.
    #[must_use]
    pub fn path(&self) -> &Utf8PathBuf {
        &self.path
    }
}
