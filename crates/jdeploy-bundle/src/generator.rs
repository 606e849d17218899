//! Per-platform bundle generation.
//!
//! A generation run copies the universal bundle once per target platform,
//! filters every archive in the copy for that platform, patches the copy's
//! `package.json`, optionally re-signs it and optionally packs it into a
//! tarball.
//!
//! # Example
//!
//! ```no_run
//! use jdeploy_bundle::{PlatformBundleGenerator, Project};
//!
//! let project = Project::load("my-app/package.json")?;
//! let generator = PlatformBundleGenerator::new();
//!
//! let bundles =
//!     generator.generate_platform_bundles(&project, "jdeploy/publish", "jdeploy/bundles")?;
//! for bundle in bundles {
//!     println!("{}: {}", bundle.platform, bundle.directory.display());
//! }
//! # Ok::<(), jdeploy_bundle::BundleError>(())
//! ```

use crate::archive::{EntryFilter, NamespaceRules, find_archives, process_archive_with};
use crate::ignore::global_ignore_file;
use crate::{
    BundleError, BundleResult, BundleSigner, DownloadPageReader, IgnoreRules, IgnoreService,
    PACKAGE_JSON, Packer, Platform, Project, PublishPlatforms,
};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// Subdirectory of a bundle holding the signed application payload.
pub const SIGNED_BUNDLE_DIR: &str = "jdeploy-bundle";

/// A generated platform bundle directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformBundle {
    pub platform: Platform,
    pub directory: PathBuf,
}

/// A generated platform tarball.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformTarball {
    pub platform: Platform,
    pub tarball: PathBuf,
}

/// Generates platform-specific bundles from a universal bundle.
pub struct PlatformBundleGenerator<P = DownloadPageReader> {
    publish_platforms: P,
    signer: Option<Box<dyn BundleSigner>>,
}

impl PlatformBundleGenerator<DownloadPageReader> {
    /// Create a generator reading publish platforms from the project's
    /// download-page settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_publish_platforms(DownloadPageReader)
    }
}

impl Default for PlatformBundleGenerator<DownloadPageReader> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PublishPlatforms> PlatformBundleGenerator<P> {
    /// Create a generator with a custom publish platform source.
    pub fn with_publish_platforms(publish_platforms: P) -> Self {
        Self {
            publish_platforms,
            signer: None,
        }
    }

    /// Re-sign each bundle's `jdeploy-bundle` directory after filtering.
    #[must_use]
    pub fn with_signer(mut self, signer: Box<dyn BundleSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Whether platform bundles are wanted: the project enables them and
    /// declares platform namespaces or has ignore files.
    #[must_use]
    pub fn should_generate_platform_bundles(&self, project: &Project) -> bool {
        project.is_platform_bundles_enabled()
            && (project.native_namespaces().has_platform_namespaces()
                || IgnoreService::new().has_ignore_files(project))
    }

    /// Whether the default bundle gets global-only filtering.
    #[must_use]
    pub fn should_filter_default_bundle(&self, project: &Project) -> bool {
        global_ignore_file(project.project_dir()).is_file()
    }

    /// Platforms to build: those keyed in `nativeNamespaces`, or every
    /// publish platform when the project relies on ignore files.
    #[must_use]
    pub fn platforms_for_bundle_generation(&self, project: &Project) -> Vec<Platform> {
        let namespaces = project.native_namespaces();
        if namespaces.has_platform_namespaces() {
            namespaces.platforms()
        } else {
            self.publish_platforms.publish_platforms(project)
        }
    }

    /// Namespaces stripped from `platform`'s archives.
    #[must_use]
    pub fn namespaces_to_strip(&self, project: &Project, platform: Platform) -> Vec<String> {
        project.native_namespaces().namespaces_to_strip(platform)
    }

    /// Namespaces kept in `platform`'s archives.
    #[must_use]
    pub fn namespaces_to_keep(&self, project: &Project, platform: Platform) -> Vec<String> {
        project.native_namespaces().namespaces_to_keep(platform)
    }

    /// Generate one platform bundle under `output_dir`.
    ///
    /// `platform` is required and must be a concrete platform. A missing
    /// universal directory is a configuration error.
    pub fn generate_platform_bundle<U: AsRef<Path>, O: AsRef<Path>>(
        &self,
        project: &Project,
        universal_dir: U,
        output_dir: O,
        platform: Option<Platform>,
    ) -> BundleResult<PlatformBundle> {
        let platform = platform
            .ok_or_else(|| BundleError::InvalidConfig("Target platform is required".to_string()))?;
        self.build_bundle(
            project,
            universal_dir.as_ref(),
            output_dir.as_ref(),
            platform,
            &mut IgnoreService::new(),
        )
    }

    /// Generate a bundle for every platform of
    /// [`Self::platforms_for_bundle_generation`].
    ///
    /// Returns an empty list without touching the filesystem when
    /// [`Self::should_generate_platform_bundles`] is false.
    pub fn generate_platform_bundles<U: AsRef<Path>, O: AsRef<Path>>(
        &self,
        project: &Project,
        universal_dir: U,
        output_dir: O,
    ) -> BundleResult<Vec<PlatformBundle>> {
        if !self.should_generate_platform_bundles(project) {
            tracing::debug!("Platform bundles not enabled for this project");
            return Ok(Vec::new());
        }

        let mut ignore_service = IgnoreService::new();
        self.platforms_for_bundle_generation(project)
            .into_iter()
            .map(|platform| {
                self.build_bundle(
                    project,
                    universal_dir.as_ref(),
                    output_dir.as_ref(),
                    platform,
                    &mut ignore_service,
                )
            })
            .collect()
    }

    /// Generate platform bundles in a staging directory and pack each one
    /// into `output_dir`.
    ///
    /// With `exit_on_fail` a packer failure aborts the run; otherwise it is
    /// logged and the platform is left out of the result.
    pub fn generate_platform_tarballs<U: AsRef<Path>, O: AsRef<Path>>(
        &self,
        project: &Project,
        universal_dir: U,
        output_dir: O,
        packer: &dyn Packer,
        exit_on_fail: bool,
    ) -> BundleResult<Vec<PlatformTarball>> {
        let output_dir = output_dir.as_ref();
        let staging = TempDir::new()?;
        let bundles = self.generate_platform_bundles(project, universal_dir, staging.path())?;

        let mut tarballs = Vec::with_capacity(bundles.len());
        for bundle in bundles {
            let packed = packer
                .pack(&bundle.directory, output_dir)
                .and_then(|packed| rename_tarball(project, bundle.platform, &packed));

            match packed {
                Ok(tarball) => {
                    tracing::info!("Created {} tarball {}", bundle.platform, tarball.display());
                    tarballs.push(PlatformTarball {
                        platform: bundle.platform,
                        tarball,
                    });
                }
                Err(e) if exit_on_fail => return Err(e),
                Err(e) => {
                    tracing::warn!("Skipping {} tarball: {}", bundle.platform, e);
                }
            }
        }

        Ok(tarballs)
    }

    /// Apply global-only ignore rules to every archive under `dir`.
    ///
    /// Returns the number of archives that changed. Does nothing unless
    /// [`Self::should_filter_default_bundle`] holds.
    pub fn filter_default_bundle<D: AsRef<Path>>(
        &self,
        project: &Project,
        dir: D,
    ) -> BundleResult<usize> {
        let dir = dir.as_ref();
        if !self.should_filter_default_bundle(project) {
            return Ok(0);
        }

        let rules = IgnoreService::new().rules_for(project, Platform::Default);
        let modified = filter_archives(dir, &rules)?;
        tracing::info!("Filtered {} archives in default bundle {}", modified, dir.display());
        Ok(modified)
    }

    fn build_bundle(
        &self,
        project: &Project,
        universal_dir: &Path,
        output_dir: &Path,
        platform: Platform,
        ignore_service: &mut IgnoreService,
    ) -> BundleResult<PlatformBundle> {
        if platform.is_default() {
            return Err(BundleError::UnsupportedPlatform(
                "the default platform has no platform bundle".to_string(),
            ));
        }
        if !universal_dir.is_dir() {
            return Err(BundleError::InvalidConfig(format!(
                "Universal publish directory must exist: {}",
                universal_dir.display()
            )));
        }

        let package_name = project.package_name()?;
        let override_name = project.platform_package_name(platform);
        let directory = output_dir.join(
            override_name
                .map(str::to_string)
                .unwrap_or_else(|| format!("{package_name}-{}", platform.as_str())),
        );

        if directory.exists() {
            fs::remove_dir_all(&directory)?;
        }
        copy_dir(universal_dir, &directory)?;

        patch_package_json(&directory, package_name, override_name, platform)?;

        let lists = project.native_namespaces().resolve(platform);
        let namespace_rules = NamespaceRules::new(&lists.strip, &lists.keep);
        let ignore_rules = if ignore_service.has_ignore_files(project) {
            ignore_service.rules_for(project, platform)
        } else {
            IgnoreRules::default()
        };

        let modified = if namespace_rules.is_empty() && ignore_rules.is_empty() {
            0
        } else {
            filter_archives(&directory, &(namespace_rules, ignore_rules))?
        };

        self.resign(project, &directory, platform)?;

        tracing::info!(
            "Generated {} bundle {} ({} archives filtered)",
            platform,
            directory.display(),
            modified
        );
        Ok(PlatformBundle { platform, directory })
    }

    fn resign(&self, project: &Project, directory: &Path, platform: Platform) -> BundleResult<()> {
        let Some(signer) = &self.signer else {
            return Ok(());
        };
        let signed_dir = directory.join(SIGNED_BUNDLE_DIR);
        if !signed_dir.is_dir() {
            return Ok(());
        }

        let version = project.version();
        signer.sign(version, &signed_dir)?;
        if !signer.verify(version, &signed_dir)?.is_verified() {
            return Err(BundleError::SignatureMismatch {
                path: signed_dir.display().to_string(),
            });
        }

        tracing::debug!("Re-signed {} bundle after filtering", platform);
        Ok(())
    }
}

/// Rewrite every archive under `dir` with `filter`.
///
/// Archives that cannot be processed are left as they are; only
/// configuration errors abort.
fn filter_archives(dir: &Path, filter: &dyn EntryFilter) -> BundleResult<usize> {
    let mut modified = 0;
    for archive in find_archives(dir) {
        match process_archive_with(&archive, filter) {
            Ok(summary) if summary.is_modified() => modified += 1,
            Ok(_) => {}
            Err(e) if e.is_configuration() => return Err(e),
            Err(e) => tracing::warn!("Failed to process archive {}: {}", archive.display(), e),
        }
    }
    Ok(modified)
}

fn copy_dir(source: &Path, destination: &Path) -> BundleResult<()> {
    for entry in WalkDir::new(source) {
        let entry = entry.map_err(std::io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| BundleError::InvalidConfig(e.to_string()))?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

fn patch_package_json(
    bundle_dir: &Path,
    package_name: &str,
    override_name: Option<&str>,
    platform: Platform,
) -> BundleResult<()> {
    let path = bundle_dir.join(PACKAGE_JSON);
    if !path.is_file() {
        return Ok(());
    }

    let mut package_json: Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
    let Some(root) = package_json.as_object_mut() else {
        return Err(BundleError::InvalidManifest(format!(
            "{} must be a JSON object",
            path.display()
        )));
    };

    let name = override_name
        .map(str::to_string)
        .unwrap_or_else(|| format!("{package_name}-temp-{}", platform.as_str()));
    root.insert("name".to_string(), Value::String(name));

    let jdeploy = root
        .entry("jdeploy")
        .or_insert_with(|| Value::Object(Map::new()));
    if !jdeploy.is_object() {
        *jdeploy = Value::Object(Map::new());
    }
    if let Value::Object(jdeploy) = jdeploy {
        jdeploy.insert(
            "platformVariant".to_string(),
            Value::String(platform.as_str().to_string()),
        );
        jdeploy.insert(
            "universalPackage".to_string(),
            Value::String(package_name.to_string()),
        );
    }

    fs::write(&path, serde_json::to_string_pretty(&package_json)?)?;
    Ok(())
}

/// Final tarball name: `<override>-<version>.tgz` with a platform package
/// name, else `<name>-<version>-<platform>.tgz`.
fn tarball_name(project: &Project, platform: Platform) -> BundleResult<String> {
    let version = project.version();
    Ok(match project.platform_package_name(platform) {
        Some(name) => format!("{name}-{version}.tgz"),
        None => format!("{}-{version}-{}.tgz", project.package_name()?, platform.as_str()),
    })
}

fn rename_tarball(project: &Project, platform: Platform, packed: &Path) -> BundleResult<PathBuf> {
    let target = packed.with_file_name(tarball_name(project, platform)?);
    if target == packed {
        return Ok(target);
    }
    if target.exists() {
        fs::remove_file(&target)?;
    }
    fs::rename(packed, &target)?;
    Ok(target)
}
