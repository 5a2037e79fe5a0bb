//! Release configuration for the `sticks` binary.
//!
//! A [`Formula`] is built once at startup, from built-in defaults optionally
//! merged with a JSON file and command line overrides, and is never mutated
//! afterwards. It knows how to turn a resolved [`Target`] into the
//! [`ReleaseArtifact`] to download.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::Path;

use crate::checksum::{self, Sha256Digest};
use crate::platform::{Arch, Target};
use crate::runtime::Runtime;

pub const DEFAULT_NAME: &str = "sticks";
pub const DEFAULT_VERSION: &str = "0.3.6";
pub const DEFAULT_BASE_URL: &str = "https://github.com/mAmineChniti/sticks/releases/download";

/// Expected digests per architecture. Empty strings mean "not yet published".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Checksums {
    #[serde(deserialize_with = "checksum::deserialize_optional")]
    pub x86_64: Option<Sha256Digest>,
    #[serde(deserialize_with = "checksum::deserialize_optional")]
    pub aarch64: Option<Sha256Digest>,
}

impl Checksums {
    pub fn get(&self, arch: Arch) -> Option<&Sha256Digest> {
        match arch {
            Arch::Intel => self.x86_64.as_ref(),
            Arch::Arm => self.aarch64.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Formula {
    /// Name of the installed executable.
    pub name: String,
    pub description: String,
    pub homepage: String,
    pub license: String,
    pub version: String,
    /// Prefix of the download URLs, up to and excluding `/v{version}`.
    pub base_url: String,
    pub checksums: Checksums,
}

impl Default for Formula {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            description: "A tool for managing C and C++ projects".to_string(),
            homepage: "https://github.com/mAmineChniti/sticks".to_string(),
            license: "MIT".to_string(),
            version: DEFAULT_VERSION.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            checksums: Checksums::default(),
        }
    }
}

/// A prebuilt binary for one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseArtifact {
    pub arch: Arch,
    /// Asset file name as published, e.g. `sticks-darwin-aarch64`.
    pub file_name: String,
    pub url: String,
    pub checksum: Option<Sha256Digest>,
}

impl Formula {
    /// Load a formula from a JSON file. Fields absent from the file keep
    /// their default values.
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let content = runtime.read_to_string(path)?;
        let formula: Formula = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse formula {}", path.display()))?;
        formula.validate()?;
        Ok(formula)
    }

    /// Return a copy with the version replaced. A leading `v` is dropped,
    /// since the tag prefix is added when building URLs.
    pub fn with_version(mut self, version: &str) -> Self {
        self.version = normalize_version(version).to_string();
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Reject values that would produce a bogus URL or an install path
    /// outside the bin directory.
    pub(crate) fn validate(&self) -> Result<()> {
        let bare_file_name = Path::new(&self.name).file_name() == Some(OsStr::new(&self.name));
        if self.name.trim().is_empty() || !bare_file_name || self.name.contains('\\') {
            anyhow::bail!("Invalid executable name '{}' in formula", self.name);
        }
        if normalize_version(&self.version).is_empty() {
            anyhow::bail!("Formula version must not be empty");
        }
        if self.base_url.trim().is_empty() {
            anyhow::bail!("Formula base_url must not be empty");
        }
        Ok(())
    }

    /// Release tag, e.g. `v0.3.6`.
    pub fn tag(&self) -> String {
        format!("v{}", normalize_version(&self.version))
    }

    /// The artifact for a macOS CPU family.
    pub fn artifact(&self, arch: Arch) -> ReleaseArtifact {
        let file_name = format!("{}-darwin-{}", self.name, arch.suffix());
        let url = format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.tag(),
            file_name
        );
        ReleaseArtifact {
            arch,
            file_name,
            url,
            checksum: self.checksums.get(arch).cloned(),
        }
    }

    /// The artifact to install for a target, or `None` when the target is
    /// not served by any published artifact.
    pub fn resolve(&self, target: Target) -> Option<ReleaseArtifact> {
        match target {
            Target::MacosIntel => Some(self.artifact(Arch::Intel)),
            Target::MacosArm => Some(self.artifact(Arch::Arm)),
            Target::Unsupported => None,
        }
    }

    /// All artifacts this formula publishes.
    pub fn artifacts(&self) -> Vec<ReleaseArtifact> {
        Arch::ALL.iter().map(|arch| self.artifact(*arch)).collect()
    }
}

fn normalize_version(version: &str) -> &str {
    let trimmed = version.trim();
    trimmed.strip_prefix('v').unwrap_or(trimmed)
}
