//! Publish platform selection from `jdeploy.downloadPage.platforms`.

use crate::{Platform, Project};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;

/// Source of the platforms a project publishes for.
///
/// Consulted when bundle splitting is driven by ignore files rather than
/// declared `nativeNamespaces`.
pub trait PublishPlatforms {
    /// Concrete platforms the project publishes for, in stable order.
    fn publish_platforms(&self, project: &Project) -> Vec<Platform>;
}

/// A download-page platform name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BundlePlatform {
    WindowsX64,
    WindowsArm64,
    MacX64,
    MacArm64,
    LinuxX64,
    LinuxArm64,
    /// Every concrete platform.
    All,
    /// The default selection.
    Default,
}

impl BundlePlatform {
    /// Parse a download-page name, ignoring ASCII case.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        match name.as_str() {
            "windows-x64" => Some(Self::WindowsX64),
            "windows-arm64" => Some(Self::WindowsArm64),
            "mac-x64" => Some(Self::MacX64),
            "mac-arm64" => Some(Self::MacArm64),
            "linux-x64" => Some(Self::LinuxX64),
            "linux-arm64" => Some(Self::LinuxArm64),
            "all" => Some(Self::All),
            "default" => Some(Self::Default),
            _ => None,
        }
    }

    /// The bundle platform this name maps to, if it names one.
    #[must_use]
    pub fn platform(self) -> Option<Platform> {
        match self {
            Self::WindowsX64 => Some(Platform::WinX64),
            Self::WindowsArm64 => Some(Platform::WinArm64),
            Self::MacX64 => Some(Platform::MacX64),
            Self::MacArm64 => Some(Platform::MacArm64),
            Self::LinuxX64 => Some(Platform::LinuxX64),
            Self::LinuxArm64 => Some(Platform::LinuxArm64),
            Self::All | Self::Default => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct DownloadPageSection {
    #[serde(default)]
    platforms: Vec<Value>,
}

/// The `jdeploy.downloadPage` settings of a project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadPageSettings {
    enabled: BTreeSet<BundlePlatform>,
}

impl DownloadPageSettings {
    /// Read settings from a parsed `package.json`.
    ///
    /// Unknown names and non-string values are skipped. A malformed section
    /// is treated as absent.
    #[must_use]
    pub fn from_package_json(package_json: &Value) -> Self {
        let section = package_json
            .get("jdeploy")
            .and_then(|jdeploy| jdeploy.get("downloadPage"))
            .cloned()
            .map(serde_json::from_value::<DownloadPageSection>)
            .transpose()
            .unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed jdeploy.downloadPage: {}", e);
                None
            })
            .unwrap_or_default();

        let enabled = section
            .platforms
            .iter()
            .filter_map(Value::as_str)
            .filter_map(|name| {
                let parsed = BundlePlatform::parse(name);
                if parsed.is_none() {
                    tracing::debug!("Download page platform '{}' has no bundle platform", name);
                }
                parsed
            })
            .collect();

        Self { enabled }
    }

    /// Build settings from explicit names.
    #[must_use]
    pub fn with_platforms(platforms: impl IntoIterator<Item = BundlePlatform>) -> Self {
        Self {
            enabled: platforms.into_iter().collect(),
        }
    }

    /// The enabled names; an empty selection reads as `default`.
    #[must_use]
    pub fn enabled_platforms(&self) -> BTreeSet<BundlePlatform> {
        if self.enabled.is_empty() {
            BTreeSet::from([BundlePlatform::Default])
        } else {
            self.enabled.clone()
        }
    }

    /// Concrete bundle platforms. `all` and `default` expand to every
    /// concrete platform.
    #[must_use]
    pub fn resolved_platforms(&self) -> Vec<Platform> {
        let enabled = self.enabled_platforms();
        if enabled.contains(&BundlePlatform::All) || enabled.contains(&BundlePlatform::Default) {
            return Platform::all().to_vec();
        }

        let mut platforms: Vec<Platform> = enabled.iter().filter_map(|p| p.platform()).collect();
        platforms.sort();
        platforms
    }
}

/// [`PublishPlatforms`] backed by the project's download-page settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct DownloadPageReader;

impl PublishPlatforms for DownloadPageReader {
    fn publish_platforms(&self, project: &Project) -> Vec<Platform> {
        DownloadPageSettings::from_package_json(project.package_json()).resolved_platforms()
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("windows-x64", Some(BundlePlatform::WindowsX64) ; "windows")]
    #[test_case("MAC-ARM64", Some(BundlePlatform::MacArm64) ; "upper case")]
    #[test_case("All", Some(BundlePlatform::All) ; "all")]
    #[test_case("mac-high-sierra", None ; "installer only name")]
    #[test_case("debian-x64", None ; "distribution name")]
    fn BundlePlatform___parse___names(name: &str, expected: Option<BundlePlatform>) {
        assert_eq!(BundlePlatform::parse(name), expected);
    }

    #[test]
    fn DownloadPageSettings___from_package_json___reads_platforms() {
        let settings = DownloadPageSettings::from_package_json(&json!({
            "jdeploy": { "downloadPage": { "platforms": ["windows-x64", null, 3, "mac-arm64", "unknown"] } }
        }));

        assert_eq!(
            settings.resolved_platforms(),
            vec![Platform::MacArm64, Platform::WinX64]
        );
    }

    #[test]
    fn DownloadPageSettings___resolved_platforms___missing_section_is_every_platform() {
        let settings = DownloadPageSettings::from_package_json(&json!({ "name": "myapp" }));

        assert_eq!(settings.enabled_platforms(), BTreeSet::from([BundlePlatform::Default]));
        assert_eq!(settings.resolved_platforms(), Platform::all().to_vec());
    }

    #[test]
    fn DownloadPageSettings___resolved_platforms___all_wins_over_explicit() {
        let settings =
            DownloadPageSettings::with_platforms([BundlePlatform::All, BundlePlatform::MacX64]);

        assert_eq!(settings.resolved_platforms().len(), 6);
    }

    #[test]
    fn DownloadPageReader___publish_platforms___reads_project() {
        let project = Project::from_json(
            "/p/package.json",
            json!({
                "name": "myapp",
                "jdeploy": { "downloadPage": { "platforms": ["linux-arm64"] } }
            }),
        )
        .unwrap();

        assert_eq!(DownloadPageReader.publish_platforms(&project), vec![Platform::LinuxArm64]);
    }
}
