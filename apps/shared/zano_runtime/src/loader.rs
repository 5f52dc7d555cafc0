//! Script source loading
//!
//! Script files are resolved in two steps: first relative to the program's base
//! directory (the directory containing the running executable), then as given,
//! relative to the current working directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, RuntimeError};

/// Source of script text
pub trait ScriptLoader {
    /// Directory tried first when resolving relative paths
    fn base_dir(&self) -> Option<&Path>;

    fn exists(&self, path: &Path) -> bool;

    fn load_text(&self, path: &Path) -> io::Result<String>;
}

/// Filesystem-backed loader
#[derive(Debug, Clone)]
pub struct FsScriptLoader {
    base_dir: Option<PathBuf>,
}

impl FsScriptLoader {
    /// Loader whose base directory is the directory of the running executable
    pub fn new() -> Self {
        let base_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        Self { base_dir }
    }

    /// Loader with an explicit base directory
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }
}

impl Default for FsScriptLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptLoader for FsScriptLoader {
    fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn load_text(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

/// Resolve and read a script
///
/// # Returns
/// The path the script was found at and its contents
///
/// # Errors
/// [`RuntimeError::ScriptNotFound`] naming every location tried, or
/// [`RuntimeError::ScriptRead`] if the file exists but cannot be read
pub fn resolve_script(loader: &dyn ScriptLoader, path: &Path) -> Result<(PathBuf, String)> {
    let mut tried = Vec::with_capacity(2);

    if let Some(base_dir) = loader.base_dir() {
        let candidate = base_dir.join(path);
        if loader.exists(&candidate) {
            return read_script(loader, candidate);
        }
        tried.push(candidate);
    }

    if loader.exists(path) {
        return read_script(loader, path.to_path_buf());
    }
    tried.push(path.to_path_buf());

    Err(RuntimeError::ScriptNotFound {
        path: path.to_path_buf(),
        tried,
    })
}

fn read_script(loader: &dyn ScriptLoader, path: PathBuf) -> Result<(PathBuf, String)> {
    debug!("Loading script from {}", path.display());
    match loader.load_text(&path) {
        Ok(source) => Ok((path, source)),
        Err(source) => Err(RuntimeError::ScriptRead { path, source }),
    }
}
