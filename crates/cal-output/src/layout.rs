//! Per-iteration output paths.
//!
//! ```text
//! <root>/ITERS/it.<i>/<i>.<name>
//! ```

use std::path::{Path, PathBuf};

use crate::OutputResult;

/// Resolves artifact names to paths inside an iteration directory.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn iteration_dir(&self, iteration: u32) -> PathBuf {
        self.root.join("ITERS").join(format!("it.{iteration}"))
    }

    /// Path of `name` for `iteration`.  Does not touch the filesystem.
    pub fn iteration_file(&self, iteration: u32, name: &str) -> PathBuf {
        self.iteration_dir(iteration).join(format!("{iteration}.{name}"))
    }

    /// Create the iteration directory if it does not exist yet.
    pub fn prepare_iteration(&self, iteration: u32) -> OutputResult<PathBuf> {
        let dir = self.iteration_dir(iteration);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
