//! The install pipeline: resolve, fetch, verify, place, chmod.

use anyhow::Result;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{
    checksum::compute_sha256,
    cleanup::{self, CleanupGuard},
    download::download_file,
    formula::{Formula, ReleaseArtifact},
    http::HttpClient,
    platform::{Platform, Target},
    runtime::Runtime,
};

pub mod config;
mod error;
pub mod paths;

pub use error::InstallError;
use paths::{installed_path, partial_path};

/// Permission bits of an installed binary: read and execute for everyone,
/// writable by no one.
pub const INSTALLED_MODE: u32 = 0o555;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledBinary {
    pub path: PathBuf,
    pub mode: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// A fresh binary was written.
    Installed {
        binary: InstalledBinary,
        artifact: ReleaseArtifact,
    },
    /// A binary already exists and replacing it was not requested.
    AlreadyInstalled { path: PathBuf },
    /// No artifact is published for this platform; nothing was touched.
    Skipped { platform: Platform },
}

#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Replace an existing binary.
    pub force: bool,
    /// Treat a missing checksum as an error instead of skipping verification.
    pub require_checksum: bool,
}

pub struct Installer<R: Runtime> {
    pub runtime: R,
    pub http_client: HttpClient,
    pub formula: Formula,
    pub bin_dir: PathBuf,
}

impl<R: Runtime> Installer<R> {
    #[tracing::instrument(skip(runtime, http_client, formula))]
    pub fn new(runtime: R, http_client: HttpClient, formula: Formula, bin_dir: PathBuf) -> Self {
        Self {
            runtime,
            http_client,
            formula,
            bin_dir,
        }
    }

    pub fn installed_path(&self) -> PathBuf {
        installed_path(&self.bin_dir, &self.formula.name)
    }

    #[tracing::instrument(skip(self, options))]
    pub async fn install(
        &self,
        platform: &Platform,
        options: &InstallOptions,
    ) -> Result<InstallOutcome> {
        println!("   resolving {} {} for {}", self.formula.name, self.formula.tag(), platform);

        let Some(arch) = Target::resolve(platform).arch() else {
            info!(
                "No {} artifact is published for {}; nothing to install.",
                self.formula.name, platform
            );
            return Ok(InstallOutcome::Skipped {
                platform: platform.clone(),
            });
        };
        let artifact = self.formula.artifact(arch);
        debug!("Selected artifact {:?}", artifact);

        if artifact.checksum.is_none() {
            if options.require_checksum {
                return Err(InstallError::MissingChecksum {
                    file_name: artifact.file_name.clone(),
                }
                .into());
            }
            warn!(
                "No checksum configured for {}; skipping integrity verification.",
                artifact.file_name
            );
        }

        let dest = self.installed_path();
        if self.runtime.exists(&dest) && !options.force {
            println!(
                "   {} is already installed at {}",
                self.formula.name,
                dest.display()
            );
            return Ok(InstallOutcome::AlreadyInstalled { path: dest });
        }

        self.runtime
            .create_dir_all(&self.bin_dir)
            .map_err(|source| InstallError::Filesystem {
                path: self.bin_dir.clone(),
                source,
            })?;

        let partial = partial_path(&self.bin_dir, &self.formula.name);
        // Left behind by a killed run, and read-only once chmodded
        self.discard_partial(&partial);

        let cleanup_ctx = cleanup::new_shared();
        let guard = CleanupGuard::new(Arc::clone(&cleanup_ctx), partial.clone());
        let ctrl_c_handler = cleanup::spawn_interrupt_handler(Arc::clone(&cleanup_ctx));

        let result = self.fetch_and_place(&artifact, &partial, &dest).await;

        ctrl_c_handler.abort();
        if result.is_err() {
            self.discard_partial(&partial);
        }
        guard.commit();
        result?;

        println!(
            "   installed {} {} to {}",
            self.formula.name,
            self.formula.tag(),
            dest.display()
        );

        Ok(InstallOutcome::Installed {
            binary: InstalledBinary {
                path: dest,
                mode: INSTALLED_MODE,
            },
            artifact,
        })
    }

    /// Download into `partial`, verify it, chmod it, and move it to `dest`.
    /// `dest` only ever appears with its final mode.
    async fn fetch_and_place(
        &self,
        artifact: &ReleaseArtifact,
        partial: &Path,
        dest: &Path,
    ) -> Result<()> {
        download_file(&self.runtime, &artifact.url, partial, &self.http_client)
            .await
            .map_err(|source| InstallError::Fetch {
                url: artifact.url.clone(),
                source,
            })?;

        if let Some(expected) = &artifact.checksum {
            let actual = compute_sha256(&self.runtime, partial).map_err(|source| {
                InstallError::Filesystem {
                    path: partial.to_path_buf(),
                    source,
                }
            })?;
            if &actual != expected {
                return Err(InstallError::Integrity {
                    file_name: artifact.file_name.clone(),
                    expected: expected.clone(),
                    actual,
                }
                .into());
            }
            info!("Checksum verified for {}", artifact.file_name);
        }

        self.runtime
            .set_permissions(partial, INSTALLED_MODE)
            .map_err(|source| InstallError::Filesystem {
                path: partial.to_path_buf(),
                source,
            })?;

        self.runtime
            .rename(partial, dest)
            .map_err(|source| InstallError::Filesystem {
                path: dest.to_path_buf(),
                source,
            })?;
        Ok(())
    }

    fn discard_partial(&self, partial: &Path) {
        if self.runtime.exists(partial) {
            if let Err(e) = self.runtime.remove_file(partial) {
                warn!("Failed to remove {}: {}", partial.display(), e);
            }
        }
    }

    /// Remove the installed binary. Returns the removed path, or `None` if
    /// nothing was installed.
    #[tracing::instrument(skip(self))]
    pub fn uninstall(&self) -> Result<Option<PathBuf>> {
        let dest = self.installed_path();
        if !self.runtime.exists(&dest) {
            info!("{} is not installed at {}", self.formula.name, dest.display());
            return Ok(None);
        }
        self.runtime
            .remove_file(&dest)
            .map_err(|source| InstallError::Filesystem {
                path: dest.clone(),
                source,
            })?;
        Ok(Some(dest))
    }
}

/// Run `<path> --version` and require a zero exit status. Output is not inspected.
#[tracing::instrument(skip(runtime))]
pub fn smoke_test<R: Runtime>(runtime: &R, path: &Path) -> Result<()> {
    if !runtime.exists(path) {
        return Err(InstallError::NotInstalled {
            path: path.to_path_buf(),
        }
        .into());
    }
    let code = runtime.run_status(path, &["--version".to_string()])?;
    match code {
        Some(0) => Ok(()),
        code => Err(InstallError::SmokeTest {
            path: path.to_path_buf(),
            code,
        }
        .into()),
    }
}
