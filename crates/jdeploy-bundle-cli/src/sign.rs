//! Bundle signing commands.

use anyhow::{Context, Result};
use jdeploy_bundle::{BundleSigner, DigestSigner, Verification};
use std::path::Path;

/// Run the sign command.
pub fn sign(dir: &str, version: &str) -> Result<()> {
    DigestSigner
        .sign(version, Path::new(dir))
        .with_context(|| format!("Failed to sign {dir}"))?;

    println!("Signed {dir} for version {version}");
    Ok(())
}

/// Run the verify command. Fails unless the bundle is signed correctly.
pub fn verify(dir: &str, version: &str) -> Result<()> {
    let verification = DigestSigner
        .verify(version, Path::new(dir))
        .with_context(|| format!("Failed to verify {dir}"))?;

    match verification {
        Verification::SignedCorrectly => {
            println!("✓ {dir} is signed correctly");
            Ok(())
        }
        Verification::SignatureMismatch { path } => {
            anyhow::bail!("Signature mismatch in {dir}: {path}")
        }
        Verification::NotSigned => anyhow::bail!("{dir} is not signed"),
    }
}
