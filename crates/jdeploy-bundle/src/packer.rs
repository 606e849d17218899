//! Tarball packers.
//!
//! A packer turns a bundle directory into `<name>-<version>.tgz` in an
//! output directory, using the name and version of the directory's
//! `package.json` the way `npm pack` does.

use crate::{BundleError, BundleResult, PACKAGE_JSON};
use flate2::Compression;
use flate2::write::GzEncoder;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use tar::HeaderMode;
use walkdir::WalkDir;

/// Root directory of entries inside an npm tarball.
const TARBALL_ROOT: &str = "package";

/// Produces a tarball from a bundle directory.
pub trait Packer {
    /// Pack `source_dir` into `output_dir` and return the tarball path.
    fn pack(&self, source_dir: &Path, output_dir: &Path) -> BundleResult<PathBuf>;
}

/// Packs with the external `npm pack` command.
#[derive(Debug, Clone)]
pub struct NpmPacker {
    program: PathBuf,
}

impl Default for NpmPacker {
    fn default() -> Self {
        let program = if cfg!(windows) { "npm.cmd" } else { "npm" };
        Self {
            program: PathBuf::from(program),
        }
    }
}

impl NpmPacker {
    /// Use a specific `npm` executable.
    #[must_use]
    pub fn with_program<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Packer for NpmPacker {
    fn pack(&self, source_dir: &Path, output_dir: &Path) -> BundleResult<PathBuf> {
        let tarball = output_dir.join(npm_tarball_name(source_dir)?);
        fs::create_dir_all(output_dir)?;

        let output = Command::new(&self.program)
            .arg("pack")
            .arg("--pack-destination")
            .arg(output_dir)
            .current_dir(source_dir)
            .output()
            .map_err(|e| {
                pack_error(
                    source_dir,
                    format!("failed to run {}: {e}", self.program.display()),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(pack_error(
                source_dir,
                format!("npm pack exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        if !tarball.is_file() {
            return Err(pack_error(
                source_dir,
                format!("expected tarball not found: {}", tarball.display()),
            ));
        }

        Ok(tarball)
    }
}

/// Built-in packer writing an npm-compatible gzip tarball.
///
/// Every file of the source directory is stored under `package/`, in sorted
/// order with deterministic headers.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarballPacker;

impl Packer for TarballPacker {
    fn pack(&self, source_dir: &Path, output_dir: &Path) -> BundleResult<PathBuf> {
        let tarball = output_dir.join(npm_tarball_name(source_dir)?);
        fs::create_dir_all(output_dir)?;

        let encoder = GzEncoder::new(File::create(&tarball)?, Compression::default());
        let mut tar = tar::Builder::new(encoder);

        for entry in WalkDir::new(source_dir).sort_by_file_name() {
            let entry = entry.map_err(io::Error::from)?;
            let path = entry.path();
            if path == source_dir {
                continue;
            }

            let relative = path
                .strip_prefix(source_dir)
                .map_err(|e| pack_error(source_dir, e.to_string()))?;
            let archive_path = Path::new(TARBALL_ROOT).join(relative);

            let metadata = fs::metadata(path)?;
            let mut header = tar::Header::new_gnu();
            header.set_metadata_in_mode(&metadata, HeaderMode::Deterministic);

            if entry.file_type().is_dir() {
                tar.append_data(&mut header, &archive_path, &mut io::empty())?;
            } else {
                let mut file = File::open(path)?;
                tar.append_data(&mut header, &archive_path, &mut file)?;
            }
        }

        let encoder = tar.into_inner()?;
        let mut file = encoder.finish()?;
        file.flush()?;

        Ok(tarball)
    }
}

/// File name `npm pack` gives the tarball of `dir`: `<name>-<version>.tgz`,
/// with a scope `@scope/name` flattened to `scope-name`.
pub fn npm_tarball_name(dir: &Path) -> BundleResult<String> {
    let manifest = dir.join(PACKAGE_JSON);
    if !manifest.is_file() {
        return Err(BundleError::MissingFile(format!("{}", manifest.display())));
    }

    let package_json: Value = serde_json::from_str(&fs::read_to_string(&manifest)?)?;
    let name = package_json
        .get("name")
        .and_then(Value::as_str)
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| {
            BundleError::InvalidManifest(format!("{}: missing name", manifest.display()))
        })?;
    let version = package_json
        .get("version")
        .and_then(Value::as_str)
        .unwrap_or(crate::project::DEFAULT_VERSION);

    let name = name.trim_start_matches('@').replace('/', "-");
    Ok(format!("{name}-{version}.tgz"))
}

fn pack_error(source_dir: &Path, reason: String) -> BundleError {
    BundleError::Pack {
        path: source_dir.display().to_string(),
        reason,
    }
}
