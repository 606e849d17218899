//! Platform-specific bundle generation for jDeploy packages
//!
//! This crate splits a universal application bundle into one slimmed bundle
//! per target platform. Archives (`.jar` files) in the universal bundle carry
//! native libraries for every platform; declarative namespace rules decide
//! which entries each platform keeps.
//!
//! # Rule sources
//!
//! Rules come from the project's `package.json`:
//!
//! ```json
//! {
//!   "name": "myapp",
//!   "jdeploy": {
//!     "platformBundlesEnabled": true,
//!     "nativeNamespaces": {
//!       "ignore": ["com.myapp.debug"],
//!       "mac-arm64": ["com.myapp.native.mac.arm64"],
//!       "win-x64": ["com.myapp.native.win.x64"]
//!     }
//!   }
//! }
//! ```
//!
//! or from `.jdpignore` / `.jdpignore.<platform>` files next to it:
//!
//! ```text
//! # strip every Windows library except the x64 one
//! *.dll
//! !/native/windows/x64/
//! ```
//!
//! # Example
//!
//! ```no_run
//! use jdeploy_bundle::{PlatformBundleGenerator, Project, TarballPacker};
//!
//! let project = Project::load("my-app")?;
//! let generator = PlatformBundleGenerator::new();
//!
//! let tarballs = generator.generate_platform_tarballs(
//!     &project,
//!     "my-app/jdeploy/publish",
//!     "my-app/jdeploy/github-release-files",
//!     &TarballPacker,
//!     true,
//! )?;
//! # Ok::<(), jdeploy_bundle::BundleError>(())
//! ```

mod error;
mod ignore_service;
mod pattern;
mod platform;
mod project;

pub mod archive;
pub mod download_page;
pub mod generator;
pub mod ignore;
pub mod packer;
pub mod recommended;
pub mod scanner;
pub mod signing;

pub use archive::{EntryFilter, NamespaceRules, RewriteSummary};
pub use download_page::{BundlePlatform, DownloadPageReader, DownloadPageSettings, PublishPlatforms};
pub use error::BundleError;
pub use generator::{PlatformBundle, PlatformBundleGenerator, PlatformTarball, SIGNED_BUNDLE_DIR};
pub use ignore_service::{
    IgnoreRules, IgnoreService, PatternCounts, PatternStatistics, PlatformCounts,
};
pub use packer::{NpmPacker, Packer, TarballPacker};
pub use pattern::{NamespacePattern, Notation, matches_any};
pub use platform::Platform;
pub use project::{
    DEFAULT_VERSION, NativeNamespaces, PACKAGE_JSON, Project, ProjectConfig, ResolvedLists,
};
pub use signing::{BundleSigner, DigestSigner, Verification};

/// Result type for bundle operations.
pub type BundleResult<T> = Result<T, BundleError>;
