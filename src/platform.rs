//! Host platform detection and artifact target resolution.
//!
//! Release artifacts only exist for macOS, one per CPU family. Resolution is
//! a closed enumeration so the "nothing to install" path is an explicit
//! branch rather than the fallthrough of nested conditionals.

use std::fmt;

/// Operating system and CPU architecture of the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Detect the current platform
    pub fn detect() -> Self {
        Self {
            os: Self::detect_os(),
            arch: Self::detect_arch(),
        }
    }

    /// Detect the current platform, replacing either half with an override.
    pub fn detect_with(os: Option<String>, arch: Option<String>) -> Self {
        let detected = Self::detect();
        Self {
            os: os.unwrap_or(detected.os),
            arch: arch.unwrap_or(detected.arch),
        }
    }

    fn detect_os() -> String {
        #[cfg(target_os = "macos")]
        {
            "macos".to_string()
        }
        #[cfg(target_os = "linux")]
        {
            "linux".to_string()
        }
        #[cfg(target_os = "windows")]
        {
            "windows".to_string()
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            std::env::consts::OS.to_string()
        }
    }

    fn detect_arch() -> String {
        #[cfg(target_arch = "x86_64")]
        {
            "x86_64".to_string()
        }
        #[cfg(target_arch = "aarch64")]
        {
            "aarch64".to_string()
        }
        #[cfg(target_arch = "x86")]
        {
            "i686".to_string()
        }
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64", target_arch = "x86")))]
        {
            std::env::consts::ARCH.to_string()
        }
    }

    fn is_macos(&self) -> bool {
        matches!(
            self.os.to_ascii_lowercase().as_str(),
            "macos" | "darwin" | "osx" | "mac"
        )
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

/// CPU family of a macOS artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    Intel,
    Arm,
}

impl Arch {
    /// Architecture suffix used in release asset names (`sticks-darwin-{suffix}`).
    pub fn suffix(self) -> &'static str {
        match self {
            Arch::Intel => "x86_64",
            Arch::Arm => "aarch64",
        }
    }

    pub const ALL: [Arch; 2] = [Arch::Intel, Arch::Arm];

    fn from_arch_str(arch: &str) -> Option<Self> {
        match arch.to_ascii_lowercase().as_str() {
            "x86_64" | "amd64" | "x64" | "x86" | "i386" | "i686" => Some(Arch::Intel),
            "aarch64" | "arm64" | "arm64e" => Some(Arch::Arm),
            _ => None,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arch::Intel => write!(f, "macOS Intel"),
            Arch::Arm => write!(f, "macOS ARM"),
        }
    }
}

/// Result of resolving a host platform against the published artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    MacosIntel,
    MacosArm,
    Unsupported,
}

impl Target {
    pub fn resolve(platform: &Platform) -> Self {
        if !platform.is_macos() {
            return Target::Unsupported;
        }
        match Arch::from_arch_str(&platform.arch) {
            Some(Arch::Intel) => Target::MacosIntel,
            Some(Arch::Arm) => Target::MacosArm,
            None => Target::Unsupported,
        }
    }

    /// The artifact architecture, or `None` when nothing should be installed.
    pub fn arch(self) -> Option<Arch> {
        match self {
            Target::MacosIntel => Some(Arch::Intel),
            Target::MacosArm => Some(Arch::Arm),
            Target::Unsupported => None,
        }
    }
}
