//! Bundle signing seam.
//!
//! Signatures cover the on-disk bytes of a bundle, so any archive rewrite
//! must happen before signing, or the bundle must be signed again after the
//! rewrite. [`crate::PlatformBundleGenerator`] re-signs through a
//! [`BundleSigner`] once filtering is done.

use crate::BundleResult;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// File written by [`DigestSigner`] at the root of a signed directory.
pub const SIGNATURE_FILE: &str = "jdeploy.signatures.json";

/// Outcome of verifying a signed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// Every file matches its recorded signature.
    SignedCorrectly,
    /// A file was added, removed or changed after signing.
    SignatureMismatch { path: String },
    /// The directory carries no signature.
    NotSigned,
}

impl Verification {
    /// Whether verification passed.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::SignedCorrectly)
    }
}

/// Signs and verifies a bundle directory.
pub trait BundleSigner {
    /// Sign every file under `dir` for `version`.
    fn sign(&self, version: &str, dir: &Path) -> BundleResult<()>;

    /// Verify the signature of `dir` for `version`.
    fn verify(&self, version: &str, dir: &Path) -> BundleResult<Verification>;
}

#[derive(Debug, Serialize, Deserialize)]
struct SignatureFile {
    version: String,
    files: BTreeMap<String, String>,
}

/// SHA-256 digest signer.
///
/// Each file's signature is the SHA-256 of `version || path || bytes`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigestSigner;

impl DigestSigner {
    fn digests(version: &str, dir: &Path) -> BundleResult<BTreeMap<String, String>> {
        let mut digests = BTreeMap::new();

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = relative_path(dir, entry.path());
            if relative == SIGNATURE_FILE {
                continue;
            }

            let contents = fs::read(entry.path())?;
            let mut hasher = Sha256::new();
            hasher.update(version.as_bytes());
            hasher.update(relative.as_bytes());
            hasher.update(&contents);
            digests.insert(relative, hex::encode(hasher.finalize()));
        }

        Ok(digests)
    }
}

impl BundleSigner for DigestSigner {
    fn sign(&self, version: &str, dir: &Path) -> BundleResult<()> {
        let signatures = SignatureFile {
            version: version.to_string(),
            files: Self::digests(version, dir)?,
        };

        let json = serde_json::to_string_pretty(&signatures)?;
        fs::write(dir.join(SIGNATURE_FILE), json)?;

        tracing::debug!("Signed {} files in {}", signatures.files.len(), dir.display());
        Ok(())
    }

    fn verify(&self, version: &str, dir: &Path) -> BundleResult<Verification> {
        let path = dir.join(SIGNATURE_FILE);
        if !path.is_file() {
            return Ok(Verification::NotSigned);
        }

        let recorded: SignatureFile = serde_json::from_str(&fs::read_to_string(&path)?)?;
        if recorded.version != version {
            return Ok(Verification::SignatureMismatch {
                path: SIGNATURE_FILE.to_string(),
            });
        }

        let actual = Self::digests(version, dir)?;

        let changed = recorded
            .files
            .iter()
            .find(|(file, digest)| actual.get(*file) != Some(*digest))
            .map(|(file, _)| file)
            .or_else(|| actual.keys().find(|file| !recorded.files.contains_key(*file)));

        Ok(match changed {
            Some(file) => Verification::SignatureMismatch { path: file.clone() },
            None => Verification::SignedCorrectly,
        })
    }
}

fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
