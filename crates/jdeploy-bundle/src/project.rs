//! Project manifest (`package.json`) model.
//!
//! Only the `jdeploy` keys the bundle engine consumes are given a typed view;
//! the full document is kept as JSON so it can be inspected by other
//! collaborators (e.g. [`crate::DownloadPageSettings`]).

use crate::{BundleError, BundleResult, Platform};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Manifest file name.
pub const PACKAGE_JSON: &str = "package.json";

/// Version assumed when the manifest does not declare one.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Key of the global list inside `jdeploy.nativeNamespaces`.
const IGNORE_KEY: &str = "ignore";

/// Typed view of `jdeploy.nativeNamespaces`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NativeNamespaces {
    ignore: Vec<String>,
    platforms: BTreeMap<Platform, Vec<String>>,
}

/// Strip and keep namespaces resolved for one platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedLists {
    /// Namespaces removed from every archive.
    pub strip: Vec<String>,
    /// Namespaces retained even when they also match `strip`.
    pub keep: Vec<String>,
}

impl ResolvedLists {
    /// Whether there is nothing to strip or keep.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strip.is_empty() && self.keep.is_empty()
    }
}

impl NativeNamespaces {
    /// Build from the raw JSON object (`ignore` plus one key per platform).
    ///
    /// Unknown keys, including `default`, are rejected. Blank entries are
    /// dropped.
    pub fn from_map(map: BTreeMap<String, Vec<String>>) -> BundleResult<Self> {
        let mut namespaces = Self::default();

        for (key, values) in map {
            let values: Vec<String> = values
                .into_iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect();

            if key == IGNORE_KEY {
                namespaces.ignore = values;
                continue;
            }

            match Platform::parse(&key) {
                Some(platform) if !platform.is_default() => {
                    namespaces.platforms.insert(platform, values);
                }
                _ => {
                    return Err(BundleError::InvalidManifest(format!(
                        "jdeploy.nativeNamespaces: unknown platform key '{key}'"
                    )));
                }
            }
        }

        Ok(namespaces)
    }

    /// Namespaces stripped from every platform.
    #[must_use]
    pub fn ignore(&self) -> &[String] {
        &self.ignore
    }

    /// Namespaces declared for one platform (empty when not declared).
    #[must_use]
    pub fn declared(&self, platform: Platform) -> &[String] {
        self.platforms.get(&platform).map_or(&[], Vec::as_slice)
    }

    /// Platforms explicitly keyed in the declaration, in stable order.
    #[must_use]
    pub fn platforms(&self) -> Vec<Platform> {
        self.platforms.keys().copied().collect()
    }

    /// Whether at least one platform-specific list is declared.
    #[must_use]
    pub fn has_platform_namespaces(&self) -> bool {
        !self.platforms.is_empty()
    }

    /// Whether nothing at all is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ignore.is_empty() && self.platforms.is_empty()
    }

    /// Namespaces to strip for `platform`: the global ignore list plus every
    /// other platform's declarations.
    ///
    /// [`Platform::Default`] only gets the global ignore list.
    #[must_use]
    pub fn namespaces_to_strip(&self, platform: Platform) -> Vec<String> {
        let mut strip: Vec<String> = Vec::new();
        let others = self
            .platforms
            .iter()
            .filter(|(other, _)| !platform.is_default() && **other != platform)
            .flat_map(|(_, values)| values.iter());

        for namespace in self.ignore.iter().chain(others) {
            if !strip.contains(namespace) {
                strip.push(namespace.clone());
            }
        }
        strip
    }

    /// Namespaces to keep for `platform`: its own declarations.
    #[must_use]
    pub fn namespaces_to_keep(&self, platform: Platform) -> Vec<String> {
        self.declared(platform).to_vec()
    }

    /// Resolve both lists for `platform`.
    #[must_use]
    pub fn resolve(&self, platform: Platform) -> ResolvedLists {
        ResolvedLists {
            strip: self.namespaces_to_strip(platform),
            keep: self.namespaces_to_keep(platform),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JdeploySection {
    #[serde(default)]
    platform_bundles_enabled: bool,

    #[serde(default)]
    native_namespaces: BTreeMap<String, Vec<String>>,

    #[serde(flatten)]
    extra: serde_json::Map<String, Value>,
}

/// Typed `jdeploy` configuration, built once at project load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectConfig {
    /// `jdeploy.platformBundlesEnabled`.
    pub platform_bundles_enabled: bool,

    /// `jdeploy.nativeNamespaces`.
    pub native_namespaces: NativeNamespaces,

    /// `jdeploy.package<Platform>` overrides.
    pub package_names: BTreeMap<Platform, String>,
}

impl ProjectConfig {
    /// Extract the configuration from a parsed `package.json`.
    pub fn from_package_json(package_json: &Value) -> BundleResult<Self> {
        let Some(section) = package_json.get("jdeploy") else {
            return Ok(Self::default());
        };

        let section: JdeploySection = serde_json::from_value(section.clone())
            .map_err(|e| BundleError::InvalidManifest(format!("jdeploy: {e}")))?;

        let package_names = Platform::all()
            .iter()
            .filter_map(|platform| {
                section
                    .extra
                    .get(platform.package_property_name())
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(|name| (*platform, name.to_string()))
            })
            .collect();

        Ok(Self {
            platform_bundles_enabled: section.platform_bundles_enabled,
            native_namespaces: NativeNamespaces::from_map(section.native_namespaces)?,
            package_names,
        })
    }
}

/// A project: its manifest location, raw manifest and typed configuration.
#[derive(Debug, Clone)]
pub struct Project {
    manifest_path: PathBuf,
    package_json: Value,
    config: ProjectConfig,
}

impl Project {
    /// Load a project from its `package.json` path or from the directory
    /// containing it.
    pub fn load<P: AsRef<Path>>(path: P) -> BundleResult<Self> {
        let path = path.as_ref();
        let manifest_path = if path.is_dir() {
            path.join(PACKAGE_JSON)
        } else {
            path.to_path_buf()
        };

        if !manifest_path.is_file() {
            return Err(BundleError::MissingFile(format!(
                "{}",
                manifest_path.display()
            )));
        }

        let content = fs::read_to_string(&manifest_path)?;
        let package_json: Value = serde_json::from_str(&content)?;
        Self::from_json(manifest_path, package_json)
    }

    /// Build a project from an already parsed manifest.
    pub fn from_json<P: Into<PathBuf>>(
        manifest_path: P,
        package_json: Value,
    ) -> BundleResult<Self> {
        if !package_json.is_object() {
            return Err(BundleError::InvalidManifest(
                "package.json must be a JSON object".to_string(),
            ));
        }

        let config = ProjectConfig::from_package_json(&package_json)?;
        Ok(Self {
            manifest_path: manifest_path.into(),
            package_json,
            config,
        })
    }

    /// Path of the project's `package.json`.
    #[must_use]
    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Directory holding the manifest and the ignore files.
    #[must_use]
    pub fn project_dir(&self) -> &Path {
        self.manifest_path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// The raw manifest.
    #[must_use]
    pub fn package_json(&self) -> &Value {
        &self.package_json
    }

    /// The typed `jdeploy` configuration.
    #[must_use]
    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// The declared package name.
    ///
    /// A missing or blank name is a configuration error.
    pub fn package_name(&self) -> BundleResult<&str> {
        self.package_json
            .get("name")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                BundleError::InvalidConfig("package.json must declare a name".to_string())
            })
    }

    /// The declared version, or [`DEFAULT_VERSION`].
    #[must_use]
    pub fn version(&self) -> &str {
        self.package_json
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_VERSION)
    }

    /// `jdeploy.platformBundlesEnabled`.
    #[must_use]
    pub fn is_platform_bundles_enabled(&self) -> bool {
        self.config.platform_bundles_enabled
    }

    /// `jdeploy.nativeNamespaces`.
    #[must_use]
    pub fn native_namespaces(&self) -> &NativeNamespaces {
        &self.config.native_namespaces
    }

    /// Package name override configured for `platform`, if any.
    #[must_use]
    pub fn platform_package_name(&self, platform: Platform) -> Option<&str> {
        self.config.package_names.get(&platform).map(String::as_str)
    }
}
