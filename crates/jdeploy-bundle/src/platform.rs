//! Target platform identification.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Publish targets a platform bundle can be split for.
///
/// [`Platform::Default`] is a sentinel meaning "no platform split": only the
/// global rules apply to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Platform {
    /// macOS on x64 (Intel).
    MacX64,
    /// macOS on ARM64 (Apple Silicon).
    MacArm64,
    /// Windows on x64.
    WinX64,
    /// Windows on ARM64.
    WinArm64,
    /// Linux on x64.
    LinuxX64,
    /// Linux on ARM64.
    LinuxArm64,
    /// No platform split, global rules only.
    Default,
}

impl Platform {
    /// Get the platform identifier (e.g., "mac-x64").
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MacX64 => "mac-x64",
            Self::MacArm64 => "mac-arm64",
            Self::WinX64 => "win-x64",
            Self::WinArm64 => "win-arm64",
            Self::LinuxX64 => "linux-x64",
            Self::LinuxArm64 => "linux-arm64",
            Self::Default => "default",
        }
    }

    /// Parse a platform from its identifier.
    ///
    /// Parsing is exact: no trimming, no case folding.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mac-x64" => Some(Self::MacX64),
            "mac-arm64" => Some(Self::MacArm64),
            "win-x64" => Some(Self::WinX64),
            "win-arm64" => Some(Self::WinArm64),
            "linux-x64" => Some(Self::LinuxX64),
            "linux-arm64" => Some(Self::LinuxArm64),
            "default" => Some(Self::Default),
            _ => None,
        }
    }

    /// Name of the `jdeploy` manifest key holding this platform's package
    /// name override (e.g., `packageMacX64`).
    ///
    /// # Example
    ///
    /// ```
    /// use jdeploy_bundle::Platform;
    ///
    /// assert_eq!(Platform::MacX64.package_property_name(), "packageMacX64");
    /// assert_eq!(Platform::LinuxArm64.package_property_name(), "packageLinuxArm64");
    /// ```
    #[must_use]
    pub fn package_property_name(&self) -> &'static str {
        match self {
            Self::MacX64 => "packageMacX64",
            Self::MacArm64 => "packageMacArm64",
            Self::WinX64 => "packageWinX64",
            Self::WinArm64 => "packageWinArm64",
            Self::LinuxX64 => "packageLinuxX64",
            Self::LinuxArm64 => "packageLinuxArm64",
            Self::Default => "packageDefault",
        }
    }

    /// Human readable name used in generated rule files.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::MacX64 => "macOS Intel",
            Self::MacArm64 => "macOS Silicon",
            Self::WinX64 => "Windows x64",
            Self::WinArm64 => "Windows ARM64",
            Self::LinuxX64 => "Linux x64",
            Self::LinuxArm64 => "Linux ARM64",
            Self::Default => "default",
        }
    }

    /// Whether this is the [`Platform::Default`] sentinel.
    #[must_use]
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    /// Get all concrete platforms (the sentinel excluded).
    #[must_use]
    pub fn all() -> &'static [Platform] {
        &[
            Self::MacX64,
            Self::MacArm64,
            Self::WinX64,
            Self::WinArm64,
            Self::LinuxX64,
            Self::LinuxArm64,
        ]
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Platform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Platform {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Platform::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown platform: {s}")))
    }
}
