use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

/// Resolve the directory the executable is installed into.
#[tracing::instrument(skip(runtime, bin_dir))]
pub fn resolve_bin_dir<R: Runtime>(runtime: &R, bin_dir: Option<PathBuf>) -> Result<PathBuf> {
    let dir = match bin_dir {
        Some(path) => path,
        None => default_bin_dir(runtime)?,
    };
    info!("Using bin directory: {}", dir.display());
    Ok(dir)
}

/// `/usr/local/bin` when running privileged, `~/.local/bin` otherwise.
#[tracing::instrument(skip(runtime))]
pub fn default_bin_dir<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    if runtime.is_privileged() {
        Ok(system_bin_dir())
    } else {
        let home_dir = runtime
            .home_dir()
            .context("Could not find home directory")?;
        Ok(home_dir.join(".local").join("bin"))
    }
}

#[cfg(target_os = "windows")]
fn system_bin_dir() -> PathBuf {
    PathBuf::from(r"C:\Program Files\sticks\bin")
}

#[cfg(not(target_os = "windows"))]
fn system_bin_dir() -> PathBuf {
    PathBuf::from("/usr/local/bin")
}

/// Where the executable named `name` lives inside `bin_dir`.
pub fn installed_path(bin_dir: &Path, name: &str) -> PathBuf {
    bin_dir.join(name)
}

/// Hidden sibling the artifact is streamed into before verification.
pub fn partial_path(bin_dir: &Path, name: &str) -> PathBuf {
    bin_dir.join(format!(".{}.part", name))
}
