use std::fmt;
use std::path::PathBuf;

use crate::checksum::Sha256Digest;

/// Failures of the install pipeline that callers may want to tell apart.
#[derive(Debug)]
pub enum InstallError {
    /// The artifact could not be downloaded, after retries.
    Fetch { url: String, source: anyhow::Error },
    /// The downloaded artifact does not match its published digest.
    Integrity {
        file_name: String,
        expected: Sha256Digest,
        actual: Sha256Digest,
    },
    /// A digest is required but the formula does not provide one.
    MissingChecksum { file_name: String },
    /// Writing, moving or chmod-ing the binary failed.
    Filesystem {
        path: PathBuf,
        source: anyhow::Error,
    },
    /// `sticks --version` did not exit successfully.
    SmokeTest { path: PathBuf, code: Option<i32> },
    /// There is no installed binary to test.
    NotInstalled { path: PathBuf },
}

impl fmt::Display for InstallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallError::Fetch { url, .. } => write!(f, "Failed to download {}", url),
            InstallError::Integrity {
                file_name,
                expected,
                actual,
            } => write!(
                f,
                "Checksum mismatch for {}: expected {}, got {}",
                file_name, expected, actual
            ),
            InstallError::MissingChecksum { file_name } => write!(
                f,
                "No checksum is configured for {} and verification is required",
                file_name
            ),
            InstallError::Filesystem { path, .. } => {
                write!(f, "Failed to install {}", path.display())
            }
            InstallError::SmokeTest { path, code } => match code {
                Some(code) => write!(
                    f,
                    "{} --version exited with status {}",
                    path.display(),
                    code
                ),
                None => write!(f, "{} --version was terminated by a signal", path.display()),
            },
            InstallError::NotInstalled { path } => {
                write!(f, "Nothing is installed at {}", path.display())
            }
        }
    }
}

impl std::error::Error for InstallError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InstallError::Fetch { source, .. } | InstallError::Filesystem { source, .. } => {
                Some(&**source)
            }
            _ => None,
        }
    }
}
